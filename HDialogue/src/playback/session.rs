//! Sequential playback over a playlist of dialogue sets

use std::io::{self, Write};
use std::time::Duration;

use super::subtitle::{SUBTITLE_INDENT, SUBTITLE_WIDTH, wrap};
use crate::audio::MediaPlayer;
use crate::catalog::{Category, DialogueSet, Entity};
use crate::error::{Error, Result};

/// One playable item: a dialogue set and the heading printed above it.
#[derive(Debug, Clone, Copy)]
pub struct PlaylistEntry<'c> {
    pub label: &'c str,
    pub set: &'c DialogueSet,
}

impl<'c> PlaylistEntry<'c> {
    /// Entry labelled with the set's id.
    #[must_use]
    pub fn new(set: &'c DialogueSet) -> Self {
        Self { label: &set.id, set }
    }
}

/// Ordered dialogue sets to play.
#[derive(Debug, Clone, Default)]
pub struct Playlist<'c> {
    entries: Vec<PlaylistEntry<'c>>,
}

impl<'c> Playlist<'c> {
    pub fn from_sets<I>(sets: I) -> Self
    where
        I: IntoIterator<Item = &'c DialogueSet>,
    {
        Self {
            entries: sets.into_iter().map(PlaylistEntry::new).collect(),
        }
    }

    /// Every set of one category.
    #[must_use]
    pub fn from_category(category: &'c Category) -> Self {
        Self::from_sets(&category.sets)
    }

    /// Every set of every category of an entity, category by category.
    #[must_use]
    pub fn from_entity(entity: &'c Entity) -> Self {
        Self::from_sets(entity.dialogue_sets().map(|(_, set)| set))
    }

    /// Keep only sets whose id starts with `prefix`.
    #[must_use]
    pub fn filter_prefix(mut self, prefix: &str) -> Self {
        self.entries.retain(|e| e.set.id.starts_with(prefix));
        self
    }

    #[must_use]
    pub fn entries(&self) -> &[PlaylistEntry<'c>] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'c> FromIterator<PlaylistEntry<'c>> for Playlist<'c> {
    fn from_iter<I: IntoIterator<Item = PlaylistEntry<'c>>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The cursor moved to this index.
    Moved(usize),
    /// The cursor was already at the first or last entry.
    AtBoundary,
}

/// A cursor over a playlist that plays sets through a [`MediaPlayer`],
/// printing cue labels and subtitles as it goes.
pub struct PlaybackSession<'c, P> {
    entries: Vec<PlaylistEntry<'c>>,
    cursor: usize,
    last_played: Option<usize>,
    player: P,
    out: Box<dyn Write + 'c>,
    wait_delays: bool,
}

impl<'c, P: MediaPlayer> PlaybackSession<'c, P> {
    /// Start a session at the first entry, printing to stdout.
    ///
    /// # Errors
    /// Returns [`Error::EmptyPlaylist`] if the playlist has no entries.
    pub fn new(playlist: Playlist<'c>, player: P) -> Result<Self> {
        if playlist.is_empty() {
            return Err(Error::EmptyPlaylist);
        }
        Ok(Self {
            entries: playlist.entries,
            cursor: 0,
            last_played: None,
            player,
            out: Box::new(io::stdout()),
            wait_delays: true,
        })
    }

    /// Print to `out` instead of stdout.
    #[must_use]
    pub fn with_output(mut self, out: impl Write + 'c) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Whether to sleep for each cue's pre-line delay (on by default).
    #[must_use]
    pub fn with_delays(mut self, wait_delays: bool) -> Self {
        self.wait_delays = wait_delays;
        self
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; sessions reject empty playlists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn last_played(&self) -> Option<usize> {
        self.last_played
    }

    #[must_use]
    pub fn current(&self) -> &PlaylistEntry<'c> {
        &self.entries[self.cursor]
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.cursor + 1 == self.entries.len()
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// Play every cue of the entry under the cursor.
    ///
    /// Missing audio and player failures are printed and logged; playback
    /// carries on with the next cue.
    ///
    /// # Errors
    /// Returns an error only if writing to the output fails.
    pub fn play_current(&mut self) -> Result<()> {
        let entry = self.entries[self.cursor];
        writeln!(self.out, "{}", entry.label)?;
        writeln!(self.out, "{}", "-".repeat(entry.label.chars().count()))?;

        for cue in &entry.set.cues {
            writeln!(self.out, "  -> {}", cue.label())?;
            if let Some(text) = &cue.text {
                for line in wrap(text, SUBTITLE_WIDTH, SUBTITLE_INDENT) {
                    writeln!(self.out, "{line}")?;
                }
            }
            self.out.flush()?;

            if self.wait_delays && cue.delay > 0.0 {
                match Duration::try_from_secs_f64(cue.delay) {
                    Ok(delay) => std::thread::sleep(delay),
                    Err(_) => {
                        tracing::debug!(
                            "Skipping unusable delay {} before {}",
                            cue.delay,
                            cue.audio_id
                        );
                    }
                }
            }

            if cue.has_audio() {
                match &cue.audio_path {
                    Some(path) => match self.player.play(path) {
                        Ok(status) if status.success() => {}
                        Ok(status) => {
                            let code = status
                                .code
                                .map_or_else(|| "a signal".to_string(), |c| format!("status {c}"));
                            tracing::warn!("Player exited with {} for {}", code, path.display());
                            writeln!(self.out, "     ERROR: player exited with {code}")?;
                        }
                        Err(e) => {
                            tracing::warn!("{}", e);
                            writeln!(self.out, "     ERROR: {e}")?;
                        }
                    },
                    None => writeln!(self.out, "     ERROR: {} not found", cue.audio_id)?,
                }
            }
            writeln!(self.out)?;
        }

        self.out.flush()?;
        self.last_played = Some(self.cursor);
        Ok(())
    }

    /// Play the current entry again without moving.
    ///
    /// # Errors
    /// See [`PlaybackSession::play_current`].
    pub fn replay(&mut self) -> Result<()> {
        self.play_current()
    }

    pub fn next(&mut self) -> Step {
        if self.is_at_end() {
            Step::AtBoundary
        } else {
            self.cursor += 1;
            Step::Moved(self.cursor)
        }
    }

    pub fn prev(&mut self) -> Step {
        if self.cursor == 0 {
            Step::AtBoundary
        } else {
            self.cursor -= 1;
            Step::Moved(self.cursor)
        }
    }

    /// # Errors
    /// Returns [`Error::OutOfRange`] if `index` is not a playlist position.
    pub fn jump(&mut self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(Error::OutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.cursor = index;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::audio::PlayerStatus;
    use crate::catalog::Cue;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    /// Records every path it is asked to play.
    #[derive(Default, Clone)]
    pub(crate) struct RecordingPlayer {
        pub played: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl MediaPlayer for RecordingPlayer {
        fn play(&mut self, path: &Path) -> Result<PlayerStatus> {
            self.played.borrow_mut().push(path.to_path_buf());
            Ok(PlayerStatus::SUCCESS)
        }
    }

    pub(crate) fn cue(id: &str, text: Option<&str>, found: bool) -> Cue {
        Cue {
            audio_id: id.to_string(),
            speaker: String::new(),
            text: text.map(str::to_string),
            audio_path: found.then(|| PathBuf::from(format!("/ogg/{id}.ogg"))),
            delay: 0.0,
            start_sound: None,
            choice: None,
        }
    }

    pub(crate) fn sets(n: usize) -> Vec<DialogueSet> {
        (0..n)
            .map(|i| DialogueSet {
                id: format!("Set{i:02}"),
                cues: vec![cue(&format!("Hermes_{i:04}"), None, true)],
                pool: None,
            })
            .collect()
    }

    #[test]
    fn test_navigation_bounds() {
        let sets = sets(3);
        let mut session =
            PlaybackSession::new(Playlist::from_sets(&sets), RecordingPlayer::default()).unwrap();

        assert_eq!(session.prev(), Step::AtBoundary);
        assert_eq!(session.next(), Step::Moved(1));
        assert_eq!(session.next(), Step::Moved(2));
        assert_eq!(session.next(), Step::AtBoundary);
        assert_eq!(session.cursor(), 2);
        assert_eq!(session.prev(), Step::Moved(1));

        session.jump(0).unwrap();
        assert_eq!(session.cursor(), 0);
        assert!(matches!(
            session.jump(3),
            Err(Error::OutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_empty_playlist_rejected() {
        let sets = sets(2);
        let playlist = Playlist::from_sets(&sets).filter_prefix("Nope");
        assert!(matches!(
            PlaybackSession::new(playlist, RecordingPlayer::default()),
            Err(Error::EmptyPlaylist)
        ));
    }

    #[test]
    fn test_play_current_output() {
        let set = DialogueSet {
            id: "HermesFirstMeeting".into(),
            cues: vec![
                cue("Hermes_0001", Some("Hey there!"), true),
                cue("ZagreusHome_0001", None, false),
                cue("", Some("(silence)"), false),
            ],
            pool: None,
        };
        let player = RecordingPlayer::default();
        let played = Rc::clone(&player.played);
        let out = Rc::new(RefCell::new(Vec::new()));

        let mut session = PlaybackSession::new(Playlist::from_sets([&set]), player)
            .unwrap()
            .with_output(SharedBuf(Rc::clone(&out)))
            .with_delays(false);
        assert_eq!(session.last_played(), None);
        session.play_current().unwrap();

        let text = String::from_utf8(out.borrow().clone()).unwrap();
        assert_eq!(
            text,
            "HermesFirstMeeting\n\
             ------------------\n  \
             -> Hermes_0001\n     \
             Hey there!\n\
             \n  \
             -> ZagreusHome_0001\n     \
             ERROR: ZagreusHome_0001 not found\n\
             \n  \
             -> (no audio)\n     \
             (silence)\n\
             \n"
        );
        assert_eq!(*played.borrow(), vec![PathBuf::from("/ogg/Hermes_0001.ogg")]);
        assert_eq!(session.last_played(), Some(0));

        session.replay().unwrap();
        assert_eq!(played.borrow().len(), 2);
    }

    #[test]
    fn test_oversized_delay_is_skipped() {
        let mut long_wait = cue("Hermes_0002", None, true);
        long_wait.delay = 1e20;
        let set = DialogueSet {
            id: "HermesLongPause".into(),
            cues: vec![long_wait],
            pool: None,
        };
        let player = RecordingPlayer::default();
        let played = Rc::clone(&player.played);

        let mut session = PlaybackSession::new(Playlist::from_sets([&set]), player)
            .unwrap()
            .with_output(SharedBuf(Rc::new(RefCell::new(Vec::new()))))
            .with_delays(true);
        session.play_current().unwrap();

        assert_eq!(*played.borrow(), vec![PathBuf::from("/ogg/Hermes_0002.ogg")]);
    }

    #[test]
    fn test_playlist_sources() {
        let sets = sets(4);
        let entity = Entity {
            kind: crate::catalog::EntityKind::Npc,
            id: "NPC_Hermes_01".into(),
            display_name: "Hermes".into(),
            categories: vec![
                Category {
                    name: "Interacts".into(),
                    source_key: "InteractTextLineSets".into(),
                    sets: sets[..2].to_vec(),
                },
                Category {
                    name: "Gifts".into(),
                    source_key: "GiftTextLineSets".into(),
                    sets: sets[2..].to_vec(),
                },
            ],
        };

        assert_eq!(Playlist::from_category(&entity.categories[1]).len(), 2);
        let all = Playlist::from_entity(&entity);
        let labels: Vec<&str> = all.entries().iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["Set00", "Set01", "Set02", "Set03"]);
        assert_eq!(Playlist::from_entity(&entity).filter_prefix("Set0").len(), 4);
        assert_eq!(Playlist::from_entity(&entity).filter_prefix("Set03").len(), 1);
    }

    /// Writer appending to a shared buffer the test can inspect.
    pub(crate) struct SharedBuf(pub Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
