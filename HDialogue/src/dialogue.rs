//! Startup loading: audio scan, cached script parsing and catalog build

use std::path::{Path, PathBuf};

use crate::audio::OggLibrary;
use crate::cache::{CacheOrigin, MetadataCache};
use crate::catalog::{Catalog, CatalogBuilder, Diagnostic, DiagnosticKind};
use crate::config::AppConfig;
use crate::error::Result;
use crate::script::RawTable;

/// Loading progress, reported before each step starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStep<'a> {
    ScanningAudio(&'a Path),
    LoadingScript(&'a Path),
    BuildingCatalog,
}

/// Everything the front ends need after startup.
#[derive(Debug)]
pub struct Dialogue {
    pub catalog: Catalog,
    pub library: OggLibrary,
    /// Advisory findings from loading and building, in the order found
    pub diagnostics: Vec<Diagnostic>,
    /// Scripts that were reparsed rather than read from cache
    pub rebuilt: Vec<PathBuf>,
}

impl Dialogue {
    /// Load with no progress reporting.
    ///
    /// # Errors
    /// See [`Dialogue::load_with_progress`].
    pub fn load(config: &AppConfig) -> Result<Self> {
        Self::load_with_progress(config, |_| {})
    }

    /// Scan the audio directory, load the three scripts through the cache and
    /// build the catalog.
    ///
    /// A script that fails to read or parse is reported as a
    /// [`DiagnosticKind::SourceFailed`] diagnostic and contributes nothing;
    /// the other sources still load.
    ///
    /// # Errors
    /// Returns an error if the audio directory cannot be scanned or the
    /// filename pattern is invalid.
    pub fn load_with_progress<F>(config: &AppConfig, mut progress: F) -> Result<Self>
    where
        F: FnMut(LoadStep<'_>),
    {
        progress(LoadStep::ScanningAudio(&config.ogg_dir));
        let library = OggLibrary::scan(&config.ogg_dir, &config.ogg_pattern)?;

        let cache = MetadataCache::new(&config.cache_dir);
        let mut diagnostics = Vec::new();
        let mut rebuilt = Vec::new();

        let mut load = |path: PathBuf| -> RawTable {
            progress(LoadStep::LoadingScript(&path));
            match cache.load_script(&path, config.rebuild_cache) {
                Ok(loaded) => {
                    if let Some(warning) = loaded.warning {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::CacheWrite,
                            path.display().to_string(),
                            warning.to_string(),
                        ));
                    }
                    if loaded.origin == CacheOrigin::Rebuilt {
                        rebuilt.push(path);
                    }
                    loaded.table
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::SourceFailed,
                        path.display().to_string(),
                        e.to_string(),
                    ));
                    RawTable::new()
                }
            }
        };
        let raw_npc = load(config.npc_script_path());
        let raw_enemy = load(config.enemy_script_path());
        let raw_loot = load(config.loot_script_path());

        progress(LoadStep::BuildingCatalog);
        let output = CatalogBuilder::new(&library)
            .with_roots(config.catalog_roots.clone())
            .build(&raw_npc, &raw_enemy, &raw_loot);
        diagnostics.extend(output.diagnostics);

        Ok(Self {
            catalog: output.catalog,
            library,
            diagnostics,
            rebuilt,
        })
    }
}
