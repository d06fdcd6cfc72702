//! Arguments shared by the `hdialogue` and `hdplay` front ends

use std::path::PathBuf;

use clap::{ArgAction, Args};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Config overrides and logging flags, flattened into each front end's CLI.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Config file to use instead of the standard location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory to find voiceover Ogg files (searched recursively)
    #[arg(long, value_name = "DIR")]
    pub ogg_dir: Option<PathBuf>,

    /// Directory to find the in-game Lua scripts
    #[arg(long, value_name = "DIR")]
    pub lua_dir: Option<PathBuf>,

    /// Cache dir to hold parsed script data
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Media player command used to play Oggs. Can include arguments; use {}
    /// where the filename goes if it cannot be the last argument
    #[arg(long, value_name = "COMMAND")]
    pub media_player: Option<String>,

    /// Ogg filename pattern with one named group capturing the cue id
    #[arg(long, value_name = "REGEX")]
    pub ogg_pattern: Option<String>,

    /// Rebuild the cache files
    #[arg(short = 'r', long)]
    pub rebuild_cache: bool,

    /// Save the chosen options to the config file (happens automatically on
    /// first run)
    #[arg(long)]
    pub save_config: bool,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CommonArgs {
    /// Set up the tracing subscriber on stderr.
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Overlay the command-line values onto `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.ogg_dir {
            config.ogg_dir.clone_from(dir);
        }
        if let Some(dir) = &self.lua_dir {
            config.lua_dir.clone_from(dir);
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir.clone_from(dir);
        }
        if let Some(player) = &self.media_player {
            config.media_player.clone_from(player);
        }
        if let Some(pattern) = &self.ogg_pattern {
            config.ogg_pattern.clone_from(pattern);
        }
        config.rebuild_cache = self.rebuild_cache;
    }

    /// Load the config file, apply overrides, and save it back when asked to
    /// or when it did not exist yet.
    pub fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        self.resolve_config_with(|_| {})
    }

    /// Like [`CommonArgs::resolve_config`], with front-end specific
    /// overrides applied before saving.
    pub fn resolve_config_with<F>(&self, overrides: F) -> anyhow::Result<AppConfig>
    where
        F: FnOnce(&mut AppConfig),
    {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => AppConfig::default_path()?,
        };
        let existed = path.exists();

        let mut config = AppConfig::load_from(&path)?;
        self.apply(&mut config);
        overrides(&mut config);

        if self.save_config || !existed {
            config.save_to(&path)?;
            println!("NOTE: Saved config preferences to: {}", path.display());
        }
        Ok(config)
    }
}
