//! Unattended playback with an interruptible pause between sets
//!
//! ```text
//! Idle -> Playing(i) -> Waiting(i) -> Playing(i + 1) -> ... -> Idle
//! ```
//!
//! The final set goes straight back to `Idle`; an interrupt during
//! `Waiting` does too.

use std::time::Duration;

use super::session::{PlaybackSession, Step};
use crate::audio::MediaPlayer;
use crate::error::Result;

/// Default pause between sets.
pub const DEFAULT_AUTOPLAY_DELAY: Duration = Duration::from_secs(2);

/// Something that can cut a pause short, such as a key press.
pub trait Interrupt {
    /// Block for up to `timeout`. Returns `true` if interrupted.
    fn wait(&mut self, timeout: Duration) -> bool;
}

impl<T: Interrupt + ?Sized> Interrupt for &mut T {
    fn wait(&mut self, timeout: Duration) -> bool {
        (**self).wait(timeout)
    }
}

/// Pauses that always run to completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uninterruptible;

impl Interrupt for Uninterruptible {
    fn wait(&mut self, timeout: Duration) -> bool {
        std::thread::sleep(timeout);
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayState {
    Idle,
    /// About to play the entry at this index
    Playing(usize),
    /// Finished this index, pausing before the next
    Waiting(usize),
}

/// What an autoplay run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoplayReport {
    /// Number of sets played
    pub played: usize,
    /// Whether the run was stopped by an interrupt
    pub interrupted: bool,
}

/// Drives a [`PlaybackSession`] from its cursor to the end of the playlist.
pub struct Autoplay<'s, 'c, P, I> {
    session: &'s mut PlaybackSession<'c, P>,
    interrupt: I,
    delay: Duration,
    state: AutoplayState,
    report: AutoplayReport,
}

impl<'s, 'c, P: MediaPlayer, I: Interrupt> Autoplay<'s, 'c, P, I> {
    /// Start at the session's current entry.
    pub fn new(session: &'s mut PlaybackSession<'c, P>, interrupt: I) -> Self {
        let start = session.cursor();
        Self {
            session,
            interrupt,
            delay: DEFAULT_AUTOPLAY_DELAY,
            state: AutoplayState::Playing(start),
            report: AutoplayReport::default(),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn state(&self) -> AutoplayState {
        self.state
    }

    #[must_use]
    pub fn report(&self) -> AutoplayReport {
        self.report
    }

    /// Perform one transition and return the new state. `Idle` is terminal.
    ///
    /// # Errors
    /// Returns an error if playback output fails.
    pub fn step(&mut self) -> Result<AutoplayState> {
        self.state = match self.state {
            AutoplayState::Idle => AutoplayState::Idle,
            AutoplayState::Playing(index) => {
                self.session.play_current()?;
                self.report.played += 1;
                if self.session.is_at_end() {
                    AutoplayState::Idle
                } else {
                    AutoplayState::Waiting(index)
                }
            }
            AutoplayState::Waiting(index) => {
                tracing::debug!("Autoplay waiting {:?} after entry {}", self.delay, index);
                if self.interrupt.wait(self.delay) {
                    self.report.interrupted = true;
                    AutoplayState::Idle
                } else {
                    match self.session.next() {
                        Step::Moved(next) => AutoplayState::Playing(next),
                        Step::AtBoundary => AutoplayState::Idle,
                    }
                }
            }
        };
        Ok(self.state)
    }

    /// Step until `Idle`.
    ///
    /// # Errors
    /// Returns an error if playback output fails.
    pub fn run(mut self) -> Result<AutoplayReport> {
        while self.step()? != AutoplayState::Idle {}
        Ok(self.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::session::tests::{RecordingPlayer, SharedBuf, sets};
    use crate::playback::Playlist;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Answers waits from a script; runs out as "not interrupted".
    struct ScriptedInterrupt {
        answers: VecDeque<bool>,
        waits: usize,
    }

    impl ScriptedInterrupt {
        fn new(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                waits: 0,
            }
        }
    }

    impl Interrupt for ScriptedInterrupt {
        fn wait(&mut self, _timeout: Duration) -> bool {
            self.waits += 1;
            self.answers.pop_front().unwrap_or(false)
        }
    }

    fn quiet_session<'c>(
        sets: &'c [crate::catalog::DialogueSet],
        player: RecordingPlayer,
    ) -> PlaybackSession<'c, RecordingPlayer> {
        PlaybackSession::new(Playlist::from_sets(sets), player)
            .unwrap()
            .with_output(SharedBuf(Rc::new(RefCell::new(Vec::new()))))
            .with_delays(false)
    }

    #[test]
    fn test_runs_to_end() {
        let sets = sets(3);
        let player = RecordingPlayer::default();
        let played = Rc::clone(&player.played);
        let mut session = quiet_session(&sets, player);
        let mut interrupt = ScriptedInterrupt::new(&[]);

        let report = Autoplay::new(&mut session, &mut interrupt).run().unwrap();
        assert_eq!(
            report,
            AutoplayReport {
                played: 3,
                interrupted: false
            }
        );
        assert_eq!(played.borrow().len(), 3);
        // No pause after the final set
        assert_eq!(interrupt.waits, 2);
        assert_eq!(session.cursor(), 2);
    }

    #[test]
    fn test_interrupt_while_waiting() {
        let sets = sets(5);
        let mut session = quiet_session(&sets, RecordingPlayer::default());
        session.jump(1).unwrap();
        let mut interrupt = ScriptedInterrupt::new(&[false, true]);

        let mut autoplay = Autoplay::new(&mut session, &mut interrupt);
        assert_eq!(autoplay.state(), AutoplayState::Playing(1));
        assert_eq!(autoplay.step().unwrap(), AutoplayState::Waiting(1));
        assert_eq!(autoplay.step().unwrap(), AutoplayState::Playing(2));
        assert_eq!(autoplay.step().unwrap(), AutoplayState::Waiting(2));
        assert_eq!(autoplay.step().unwrap(), AutoplayState::Idle);
        assert_eq!(autoplay.step().unwrap(), AutoplayState::Idle);
        assert_eq!(
            autoplay.report(),
            AutoplayReport {
                played: 2,
                interrupted: true
            }
        );
        assert_eq!(session.cursor(), 2);
        assert_eq!(session.last_played(), Some(2));
    }

    #[test]
    fn test_single_entry_goes_idle() {
        let sets = sets(1);
        let mut session = quiet_session(&sets, RecordingPlayer::default());
        let mut interrupt = ScriptedInterrupt::new(&[true]);

        let report = Autoplay::new(&mut session, &mut interrupt).run().unwrap();
        assert_eq!(report.played, 1);
        assert!(!report.interrupted);
        assert_eq!(interrupt.waits, 0);
    }
}
