#![allow(non_snake_case)]
//! # HDialogue
//!
//! Dialogue and voiceover index for *Hades*: reads the game's Lua script
//! data, matches every voice cue to an extracted audio clip, and plays
//! dialogue sets with subtitles through an external media player.
//!
//! ## Pipeline
//!
//! - **Script data** ([`script`]) - Parse `NPCData.lua`, `EnemyData.lua` and
//!   `LootData.lua` into generic ordered tables
//! - **Cache** ([`cache`]) - Keep parsed tables as compressed JSON, reused
//!   until the script changes
//! - **Audio** ([`audio`]) - Index extracted `.ogg` clips by cue identifier
//! - **Catalog** ([`catalog`]) - NPCs, enemies and boon givers with their
//!   categorized dialogue sets
//! - **Playback** ([`playback`]) - Playlist navigation and autoplay
//!
//! ## Quick Start
//!
//! ```no_run
//! use hdialogue::prelude::*;
//!
//! let config = AppConfig::load_from(&AppConfig::default_path()?)?;
//! let dialogue = Dialogue::load(&config)?;
//!
//! let hermes = dialogue.catalog.get_entity(EntityKind::Npc, "NPC_Hermes_01")?;
//! let player = CommandPlayer::new(&config.media_player)?;
//! let mut session = PlaybackSession::new(Playlist::from_entity(hermes), player)?;
//! session.play_current()?;
//! # Ok::<(), hdialogue::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `hdialogue` command-line binary and the shared
//!   argument and console helpers used by `hdplay`

pub mod audio;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod playback;
pub mod script;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::audio::{CommandPlayer, MediaPlayer, OggLibrary};
    pub use crate::cache::{CacheLoad, CacheOrigin, MetadataCache};
    pub use crate::catalog::{
        Catalog, Category, Cue, Diagnostic, DiagnosticKind, DialogueSet, Entity, EntityKind,
    };
    pub use crate::config::AppConfig;
    pub use crate::dialogue::Dialogue;
    pub use crate::playback::{
        Autoplay, AutoplayReport, Interrupt, PlaybackSession, Playlist, Step,
    };
    pub use crate::script::{LuaTable, LuaValue, RawTable};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
