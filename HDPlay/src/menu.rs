//! Breadcrumb menu over the dialogue catalog
//!
//! Levels go Category (NPCs/Enemies/Loot) > entity > dialogue category >
//! dialogue list > playing. Each level prints its options in columns and
//! offers only the keys that make sense there.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use console::style;
use hdialogue::audio::MediaPlayer;
use hdialogue::catalog::{Catalog, Category, Entity, EntityKind};
use hdialogue::config::InteractiveConfig;
use hdialogue::playback::{
    Autoplay, DEFAULT_AUTOPLAY_DELAY, Interrupt, PlaybackSession, Playlist,
};

use crate::layout::layout;

/// One level of the menu stack.
#[derive(Debug, Clone, Copy)]
enum Crumb<'c> {
    Kind(EntityKind),
    Entity(&'c Entity),
    Category(&'c Category),
    /// Playing the set at this index of the enclosing category
    Playing(usize),
}

/// Playback queued for the next redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Play(usize),
    Autoplay(usize),
}

/// A parsed user response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Zero-based option index
    Select(usize),
    Autoplay,
    Replay,
    Previous,
    Next,
    Back,
    Quit,
}

/// The keys offered at one prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prompt {
    pub options: usize,
    pub autoplay: bool,
    pub replay: bool,
    pub previous: bool,
    pub next: bool,
    pub back: bool,
}

impl Prompt {
    /// Prompt line such as `[1-12], [a]utoplay, [b]ack, [q]uit> `.
    pub fn text(&self) -> String {
        let mut parts = Vec::new();
        if self.options > 0 {
            parts.push(format!("[1-{}]", self.options));
        }
        for (offered, key) in [
            (self.autoplay, "[a]utoplay"),
            (self.replay, "[r]eplay"),
            (self.previous, "[p]revious"),
            (self.next, "[n]ext"),
            (self.back, "[b]ack"),
            (true, "[q]uit"),
        ] {
            if offered {
                parts.push(key.to_string());
            }
        }
        format!("{}> ", parts.join(", "))
    }

    /// Parse a response; the error is the message to show the user.
    pub fn parse(&self, input: &str) -> Result<Action, String> {
        let input = input.trim().to_lowercase();
        match input.as_str() {
            "q" => Ok(Action::Quit),
            "b" if self.back => Ok(Action::Back),
            "r" if self.replay => Ok(Action::Replay),
            "p" if self.previous => Ok(Action::Previous),
            "n" if self.next => Ok(Action::Next),
            "a" if self.autoplay => Ok(Action::Autoplay),
            _ if self.options > 0 => match input.parse::<usize>() {
                Ok(n) if (1..=self.options).contains(&n) => Ok(Action::Select(n - 1)),
                Ok(_) => Err(format!("Number must be from 1 to {}", self.options)),
                Err(_) => Err("Unknown input, try again!".to_string()),
            },
            _ => Err("Unknown input, try again!".to_string()),
        }
    }
}

/// The interactive menu.
pub struct Menu<'c, P, I> {
    catalog: &'c Catalog,
    player: P,
    interrupt: I,
    layout: InteractiveConfig,
    autoplay_delay: Duration,
    input: Box<dyn BufRead + 'c>,
    out: Box<dyn Write + 'c>,
    stack: Vec<Crumb<'c>>,
    pending: Option<Pending>,
}

impl<'c, P: MediaPlayer, I: Interrupt> Menu<'c, P, I> {
    /// Menu on stdin/stdout with the default layout.
    pub fn new(catalog: &'c Catalog, player: P, interrupt: I) -> Self {
        Self {
            catalog,
            player,
            interrupt,
            layout: InteractiveConfig::default(),
            autoplay_delay: DEFAULT_AUTOPLAY_DELAY,
            input: Box::new(io::stdin().lock()),
            out: Box::new(io::stdout()),
            stack: Vec::new(),
            pending: None,
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: InteractiveConfig) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_autoplay_delay(mut self, delay: Duration) -> Self {
        self.autoplay_delay = delay;
        self
    }

    /// Read responses from `input` and print to `out`.
    #[must_use]
    pub fn with_io(mut self, input: impl BufRead + 'c, out: impl Write + 'c) -> Self {
        self.input = Box::new(input);
        self.out = Box::new(out);
        self
    }

    /// Run until the user quits or input ends.
    pub fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.out)?;
        loop {
            let header = self.header();
            writeln!(self.out, "{}", style(header).bold())?;

            match self.pending.take() {
                Some(Pending::Play(index)) => {
                    writeln!(self.out)?;
                    self.play(index)?;
                }
                Some(Pending::Autoplay(start)) => {
                    writeln!(self.out)?;
                    self.autoplay(start)?;
                    continue;
                }
                None => {}
            }

            let labels = self.option_labels();
            let prompt = self.prompt(labels.len());
            let action = loop {
                for row in layout(&labels, self.layout.columns, self.layout.min_rows) {
                    writeln!(self.out, "{row}")?;
                }
                writeln!(self.out)?;
                write!(self.out, "{}", prompt.text())?;
                self.out.flush()?;

                let mut line = String::new();
                if self.input.read_line(&mut line)? == 0 {
                    writeln!(self.out)?;
                    return Ok(());
                }
                writeln!(self.out)?;
                match prompt.parse(&line) {
                    Ok(action) => break action,
                    Err(message) => self.error(&message)?,
                }
            };

            if action == Action::Quit {
                return Ok(());
            }
            self.apply(action);
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => {}
            Action::Back => {
                self.stack.pop();
            }
            Action::Replay => {
                if let Some(index) = self.playing() {
                    self.pending = Some(Pending::Play(index));
                }
            }
            Action::Previous => {
                if let Some(index) = self.playing() {
                    self.set_playing(index.saturating_sub(1));
                    self.pending = Some(Pending::Play(index.saturating_sub(1)));
                }
            }
            Action::Next => {
                if let Some(index) = self.playing() {
                    self.set_playing(index + 1);
                    self.pending = Some(Pending::Play(index + 1));
                }
            }
            Action::Autoplay => {
                // From the list start at the top; from a set that was just
                // heard, start with the one after it
                let start = self.playing().map_or(0, |index| index + 1);
                self.set_playing(start);
                self.pending = Some(Pending::Autoplay(start));
            }
            Action::Select(index) => self.select(index),
        }
    }

    fn select(&mut self, index: usize) {
        let crumb = match self.stack.last().copied() {
            None => EntityKind::ALL.get(index).copied().map(Crumb::Kind),
            Some(Crumb::Kind(kind)) => {
                self.catalog.list_entities(kind).nth(index).map(Crumb::Entity)
            }
            Some(Crumb::Entity(entity)) => entity
                .categories
                .iter()
                .filter(|c| !c.is_empty())
                .nth(index)
                .map(Crumb::Category),
            Some(Crumb::Category(_) | Crumb::Playing(_)) => {
                self.set_playing(index);
                self.pending = Some(Pending::Play(index));
                None
            }
        };
        if let Some(crumb) = crumb {
            self.stack.push(crumb);
        }
    }

    fn play(&mut self, index: usize) -> anyhow::Result<()> {
        let Some(category) = self.category() else {
            return Ok(());
        };
        let mut session =
            PlaybackSession::new(Playlist::from_category(category), &mut self.player)?
                .with_output(&mut self.out);
        session.jump(index)?;
        session.play_current()?;
        Ok(())
    }

    /// Autoplay from `start`. Stays on the set where the user stopped it,
    /// or returns to the dialogue list after the last set.
    fn autoplay(&mut self, start: usize) -> anyhow::Result<()> {
        let Some(category) = self.category() else {
            return Ok(());
        };
        let mut session =
            PlaybackSession::new(Playlist::from_category(category), &mut self.player)?
                .with_output(&mut self.out);
        session.jump(start)?;
        let report = Autoplay::new(&mut session, &mut self.interrupt)
            .with_delay(self.autoplay_delay)
            .run()?;
        let cursor = session.cursor();
        drop(session);

        tracing::debug!("Autoplay played {} sets", report.played);
        if report.interrupted {
            self.set_playing(cursor);
        } else if self.playing().is_some() {
            self.stack.pop();
        }
        Ok(())
    }

    fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", style(message).red().bold())?;
        writeln!(self.out)
    }

    fn header(&self) -> String {
        if self.stack.is_empty() {
            return "Choose a Category:".to_string();
        }
        let labels: Vec<String> = self
            .stack
            .iter()
            .map(|crumb| match crumb {
                Crumb::Kind(kind) => kind.plural().to_string(),
                Crumb::Entity(entity) => entity.id.clone(),
                Crumb::Category(category) => category.name.clone(),
                Crumb::Playing(index) => self.category().map_or_else(String::new, |category| {
                    format!(
                        "({}/{}) {}",
                        style(index + 1).dim().cyan(),
                        style(category.len()).dim().cyan(),
                        category.sets[*index].id
                    )
                }),
            })
            .collect();
        labels.join(" > ")
    }

    fn option_labels(&self) -> Vec<String> {
        match self.stack.last() {
            None => EntityKind::ALL.iter().map(|k| k.plural().to_string()).collect(),
            Some(Crumb::Kind(kind)) => {
                self.catalog.list_entities(*kind).map(|e| e.id.clone()).collect()
            }
            Some(Crumb::Entity(entity)) => entity
                .categories
                .iter()
                .filter(|c| !c.is_empty())
                .map(|c| c.name.clone())
                .collect(),
            Some(Crumb::Category(category)) => category.ids().map(str::to_string).collect(),
            Some(Crumb::Playing(_)) => self
                .category()
                .map(|c| c.ids().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }

    fn prompt(&self, options: usize) -> Prompt {
        let mut prompt = Prompt {
            options,
            back: !self.stack.is_empty(),
            ..Prompt::default()
        };
        match self.stack.last() {
            Some(Crumb::Category(_)) => prompt.autoplay = options > 0,
            Some(Crumb::Playing(index)) => {
                prompt.replay = true;
                prompt.previous = *index > 0;
                prompt.next = index + 1 < options;
                prompt.autoplay = prompt.next;
            }
            _ => {}
        }
        prompt
    }

    fn category(&self) -> Option<&'c Category> {
        self.stack.iter().rev().find_map(|crumb| match crumb {
            Crumb::Category(category) => Some(*category),
            _ => None,
        })
    }

    fn playing(&self) -> Option<usize> {
        match self.stack.last() {
            Some(Crumb::Playing(index)) => Some(*index),
            _ => None,
        }
    }

    fn set_playing(&mut self, index: usize) {
        if self.playing().is_some() {
            self.stack.pop();
        }
        self.stack.push(Crumb::Playing(index));
    }
}
