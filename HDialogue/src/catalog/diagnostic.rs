//! Advisory findings collected while loading and building the catalog

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticKind {
    /// A dialogue set points at a pool that does not exist
    UnresolvedReference,
    /// A dialogue set points at a pool that yields no cues
    EmptyReference,
    /// A cue's audio identifier has no file in the audio library
    MissingAudio,
    /// A `Cue`, `EndCue` or `StartSound` value is not a voice path
    MalformedCue,
    /// The same set id appears in several categories of one entity
    DuplicateDialogue,
    /// A script source failed to load; the catalog lacks its entities
    SourceFailed,
    /// A parsed script could not be cached
    CacheWrite,
}

impl DiagnosticKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::UnresolvedReference => "unresolved reference",
            Self::EmptyReference => "empty reference",
            Self::MissingAudio => "missing audio",
            Self::MalformedCue => "malformed cue",
            Self::DuplicateDialogue => "duplicate dialogue",
            Self::SourceFailed => "source failed",
            Self::CacheWrite => "cache write",
        }
    }
}

/// One finding, with where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Location such as `NPC_Hermes_01 / Interacts / HermesFirstPickUp`
    pub context: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            context: context.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.kind.label(), self.context, self.message)
    }
}

/// Per-kind tally of diagnostics, in kind order.
#[must_use]
pub fn summarize(diagnostics: &[Diagnostic]) -> Vec<(DiagnosticKind, usize)> {
    let mut counts = std::collections::BTreeMap::new();
    for d in diagnostics {
        *counts.entry(d.kind).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}
