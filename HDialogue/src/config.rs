//! User configuration
//!
//! Stored as TOML in `<config dir>/hdialogue/hdialogue.toml`. Every key is
//! optional; missing keys take their defaults, and sections this version does
//! not know about are kept when the file is saved again.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::DEFAULT_OGG_PATTERN;
use crate::catalog::CatalogRoots;
use crate::error::{Error, Result};
use crate::playback::DEFAULT_AUTOPLAY_DELAY;

/// Directory name under the platform config and cache directories
pub const APP_DIR_NAME: &str = "hdialogue";
const CONFIG_FILE_NAME: &str = "hdialogue.toml";

/// Hades install location relative to the platform data directory (Steam)
const HADES_CONTENT: &str = "Steam/steamapps/common/Hades/Content";

// Default value functions for serde
fn default_ogg_dir() -> PathBuf {
    hades_content_dir().join("Audio/FMOD/Build/Desktop/tmp")
}
fn default_lua_dir() -> PathBuf {
    hades_content_dir().join("Scripts")
}
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".hdialogue-cache"))
}
fn default_media_player() -> String {
    "mplayer".to_string()
}
fn default_ogg_pattern() -> String {
    DEFAULT_OGG_PATTERN.to_string()
}
fn default_npc_script() -> String {
    "NPCData.lua".to_string()
}
fn default_enemy_script() -> String {
    "EnemyData.lua".to_string()
}
fn default_loot_script() -> String {
    "LootData.lua".to_string()
}
fn default_autoplay_delay_secs() -> f64 {
    DEFAULT_AUTOPLAY_DELAY.as_secs_f64()
}
fn default_columns() -> usize {
    3
}
fn default_min_rows() -> usize {
    15
}

fn hades_content_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_default()
        .join(HADES_CONTENT)
}

/// Menu layout for the interactive player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveConfig {
    /// Maximum number of option columns
    #[serde(default = "default_columns")]
    pub columns: usize,
    /// Rows per column before options spill into another column
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            min_rows: default_min_rows(),
        }
    }
}

/// Application configuration shared by both front ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory of extracted voice clips (searched recursively)
    #[serde(default = "default_ogg_dir")]
    pub ogg_dir: PathBuf,
    /// Directory holding the game's Lua scripts
    #[serde(default = "default_lua_dir")]
    pub lua_dir: PathBuf,
    /// Directory for parsed script caches
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Player command; `{}` marks where the clip path goes
    #[serde(default = "default_media_player")]
    pub media_player: String,
    /// Clip filename pattern with one named group for the cue id
    #[serde(default = "default_ogg_pattern")]
    pub ogg_pattern: String,
    #[serde(default = "default_npc_script")]
    pub npc_script: String,
    #[serde(default = "default_enemy_script")]
    pub enemy_script: String,
    #[serde(default = "default_loot_script")]
    pub loot_script: String,
    /// Pause between sets during autoplay
    #[serde(default = "default_autoplay_delay_secs")]
    pub autoplay_delay_secs: f64,
    #[serde(default)]
    pub interactive: InteractiveConfig,
    /// Top-level entity table names in each script
    #[serde(default)]
    pub catalog_roots: CatalogRoots,

    /// Reparse scripts even when caches are fresh (runtime only)
    #[serde(skip)]
    pub rebuild_cache: bool,

    /// Sections and keys not recognized by this version
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ogg_dir: default_ogg_dir(),
            lua_dir: default_lua_dir(),
            cache_dir: default_cache_dir(),
            media_player: default_media_player(),
            ogg_pattern: default_ogg_pattern(),
            npc_script: default_npc_script(),
            enemy_script: default_enemy_script(),
            loot_script: default_loot_script(),
            autoplay_delay_secs: default_autoplay_delay_secs(),
            interactive: InteractiveConfig::default(),
            catalog_roots: CatalogRoots::default(),
            rebuild_cache: false,
            extra: toml::Table::new(),
        }
    }
}

impl AppConfig {
    /// Standard config file location.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the platform has no config directory.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::Config("no configuration directory on this platform".to_string()))
    }

    /// Load from `path`, or defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write to `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    #[must_use]
    pub fn npc_script_path(&self) -> PathBuf {
        self.lua_dir.join(&self.npc_script)
    }

    #[must_use]
    pub fn enemy_script_path(&self) -> PathBuf {
        self.lua_dir.join(&self.enemy_script)
    }

    #[must_use]
    pub fn loot_script_path(&self) -> PathBuf {
        self.lua_dir.join(&self.loot_script)
    }

    /// Autoplay pause. Negative and NaN values mean no pause; values too
    /// large for a [`Duration`] saturate.
    #[must_use]
    pub fn autoplay_delay(&self) -> Duration {
        if self.autoplay_delay_secs > 0.0 {
            Duration::try_from_secs_f64(self.autoplay_delay_secs).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
}
