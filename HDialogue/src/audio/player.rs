//! External media player invocation

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Token in a player command template that is replaced by the clip path.
const PATH_PLACEHOLDER: &str = "{}";

/// How a player run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerStatus {
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
}

impl PlayerStatus {
    pub const SUCCESS: Self = Self { code: Some(0) };

    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Plays one audio file and blocks until playback ends.
pub trait MediaPlayer {
    /// Play `path`.
    ///
    /// # Errors
    /// Returns an error if the player could not be started.
    fn play(&mut self, path: &Path) -> Result<PlayerStatus>;
}

impl<T: MediaPlayer + ?Sized> MediaPlayer for &mut T {
    fn play(&mut self, path: &Path) -> Result<PlayerStatus> {
        (**self).play(path)
    }
}

/// Runs an external program for each clip.
///
/// Built from a whitespace-separated command template such as
/// `ffplay -nodisp -autoexit {}`. A `{}` token is replaced with the clip
/// path; without one the path is appended as the last argument.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    /// Parse a command template.
    ///
    /// # Errors
    /// Returns [`Error::EmptyPlayerCommand`] if the template has no program.
    pub fn new(template: &str) -> Result<Self> {
        let mut tokens = template.split_whitespace().map(str::to_string);
        let program = tokens.next().ok_or(Error::EmptyPlayerCommand)?;
        Ok(Self {
            program,
            args: tokens.collect(),
        })
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command line for a clip, without spawning it.
    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        let mut placed = false;
        for arg in &self.args {
            if arg == PATH_PLACEHOLDER {
                command.arg(path);
                placed = true;
            } else {
                command.arg(arg);
            }
        }
        if !placed {
            command.arg(path);
        }
        command
    }
}

impl MediaPlayer for CommandPlayer {
    fn play(&mut self, path: &Path) -> Result<PlayerStatus> {
        tracing::debug!("Playing {} with {}", path.display(), self.program);
        // Players read keyboard controls from the terminal; their own output
        // would interleave with subtitles.
        let status = self
            .command(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| Error::Player {
                command: self.program.clone(),
                source,
            })?;
        Ok(PlayerStatus {
            code: status.code(),
        })
    }
}
