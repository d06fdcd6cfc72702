//! Error types for `HDialogue`

use std::path::{Path, PathBuf};

use thiserror::Error;

/// The error type for `HDialogue` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Script Data Errors ====================
    /// The Lua script data is not valid for the supported grammar.
    #[error("{}:{line}:{column}: parse error: {message}", source_name(path.as_deref()))]
    Parse {
        /// The source file, when known.
        path: Option<PathBuf>,
        /// 1-based line of the offending token.
        line: usize,
        /// 1-based column of the offending token.
        column: usize,
        /// Description of what was expected.
        message: String,
    },

    // ==================== Cache Errors ====================
    /// Writing a cache file failed. Non-fatal: callers receive this as a value.
    #[error("failed to write cache file {path}: {source}")]
    CacheWrite {
        /// The cache file that could not be written.
        path: PathBuf,
        /// The underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    // ==================== Catalog Errors ====================
    /// A requested entity, category, or dialogue set does not exist.
    #[error("{what} not found: {name}")]
    NotFound {
        /// What kind of thing was looked up ("NPC", "category", "dialogue", ...).
        what: &'static str,
        /// The requested name.
        name: String,
    },

    // ==================== Playback Errors ====================
    /// A navigation request fell outside the playlist.
    #[error("index {index} out of range (playlist has {len} entries)")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The playlist length.
        len: usize,
    },

    /// A playlist was built from zero dialogue sets.
    #[error("playlist is empty")]
    EmptyPlaylist,

    /// The external media player could not be started.
    #[error("failed to run media player `{command}`: {source}")]
    Player {
        /// The program that was invoked.
        command: String,
        /// The spawn failure.
        #[source]
        source: std::io::Error,
    },

    /// The media player command template has no program.
    #[error("media player command is empty")]
    EmptyPlayerCommand,

    // ==================== Audio Library Errors ====================
    /// The audio directory is missing or unreadable.
    #[error("audio library error at {path}: {message}")]
    Library {
        /// The audio root directory.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// The audio filename pattern is not usable.
    #[error("invalid audio filename pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// The pattern as configured.
        pattern: String,
        /// Why it was rejected.
        message: String,
    },

    // ==================== Serialization Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config parsing error.
    #[error("config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("config serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    // ==================== Configuration Errors ====================
    /// Configuration could not be located or is inconsistent.
    #[error("config error: {0}")]
    Config(String),

    // ==================== File System Errors ====================
    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDir(String),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDir(err.to_string())
    }
}

impl Error {
    /// Build a [`Error::NotFound`].
    pub(crate) fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        Error::NotFound {
            what,
            name: name.into(),
        }
    }

    /// Attach a source path to a parse error produced from in-memory text.
    #[must_use]
    pub fn with_path(self, source_path: impl Into<PathBuf>) -> Self {
        match self {
            Error::Parse {
                path: None,
                line,
                column,
                message,
            } => Error::Parse {
                path: Some(source_path.into()),
                line,
                column,
                message,
            },
            other => other,
        }
    }
}

fn source_name(path: Option<&Path>) -> String {
    path.map_or_else(|| "<script>".to_string(), |p| p.display().to_string())
}

/// A specialized Result type for `HDialogue` operations.
pub type Result<T> = std::result::Result<T, Error>;
