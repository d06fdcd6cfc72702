//! On-disk cache of parsed script data
//!
//! Parsing the game's script files dominates startup, so each parsed
//! [`RawTable`] is stored as gzip-compressed JSON in the cache directory,
//! stamped with the source file's modification time. A cached table is
//! reused while its stamp is at least as new as the source; otherwise (or on
//! an explicit rebuild) the source is parsed again and the cache rewritten.
//!
//! ## Usage Pattern
//!
//! ```ignore
//! let cache = MetadataCache::new(&config.cache_dir);
//! let load = cache.load_script(config.npc_script_path(), config.rebuild_cache)?;
//! if let Some(warning) = &load.warning {
//!     // Cache could not be written; the table is still usable
//! }
//! let raw_npc = load.table;
//! ```

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::script::{self, RawTable};

/// Extension used for cache files.
const CACHE_EXTENSION: &str = "json.gz";

/// A source modification time, stored with the cached table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceStamp {
    pub secs: u64,
    pub nanos: u32,
}

impl SourceStamp {
    /// Stamp for a [`SystemTime`]. Times before the epoch clamp to zero.
    #[must_use]
    pub fn from_system_time(time: SystemTime) -> Self {
        let since = time.duration_since(UNIX_EPOCH).unwrap_or_default();
        Self {
            secs: since.as_secs(),
            nanos: since.subsec_nanos(),
        }
    }

    /// Stamp of a file's last modification.
    ///
    /// # Errors
    /// Returns an error if the file's metadata cannot be read.
    pub fn of_file(path: &Path) -> Result<Self> {
        Ok(Self::from_system_time(fs::metadata(path)?.modified()?))
    }
}

/// Where a loaded table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOrigin {
    /// Read back from a fresh cache file.
    Cached,
    /// Parsed from source (cache missing, stale, unreadable, or rebuild forced).
    Rebuilt,
}

/// Result of [`MetadataCache::load_or_build`].
#[derive(Debug)]
pub struct CacheLoad {
    pub table: RawTable,
    pub origin: CacheOrigin,
    /// Set when the rebuilt table could not be written back. Always an
    /// [`Error::CacheWrite`]; the table is still valid.
    pub warning: Option<Error>,
}

/// Identity of one cache file: which source it belongs to, that source's
/// current stamp, and where the cached copy lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_path: PathBuf,
    pub source_mtime: SourceStamp,
    pub cached_json_path: PathBuf,
}

#[derive(Serialize)]
struct CachedDocumentRef<'a> {
    source: &'a Path,
    source_mtime: SourceStamp,
    table: &'a RawTable,
}

#[derive(Deserialize)]
struct CachedDocument {
    source: PathBuf,
    source_mtime: SourceStamp,
    table: RawTable,
}

/// Cache of parsed script tables, one file per source.
#[derive(Debug, Clone)]
pub struct MetadataCache {
    cache_dir: PathBuf,
}

impl MetadataCache {
    /// Create a cache rooted at `cache_dir`. The directory is created on the
    /// first write.
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Self {
        Self {
            cache_dir: cache_dir.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache file for a source: `<stem>-<md5 of absolute path>.json.gz`.
    #[must_use]
    pub fn cache_path(&self, source_path: &Path) -> PathBuf {
        let absolute = absolute_path(source_path);
        let digest = md5::compute(absolute.to_string_lossy().as_bytes());
        let stem = source_path
            .file_stem()
            .map_or_else(|| "script".to_string(), |s| s.to_string_lossy().into_owned());
        self.cache_dir
            .join(format!("{stem}-{digest:x}.{CACHE_EXTENSION}"))
    }

    /// Describe the cache entry for a source as it stands now.
    ///
    /// # Errors
    /// Returns an error if the source file's metadata cannot be read.
    pub fn entry(&self, source_path: &Path) -> Result<CacheEntry> {
        Ok(CacheEntry {
            source_path: absolute_path(source_path),
            source_mtime: SourceStamp::of_file(source_path)?,
            cached_json_path: self.cache_path(source_path),
        })
    }

    /// Parse a script file through the cache.
    ///
    /// # Errors
    /// See [`MetadataCache::load_or_build`].
    pub fn load_script(&self, source_path: &Path, force_rebuild: bool) -> Result<CacheLoad> {
        self.load_or_build(source_path, script::parse, force_rebuild)
    }

    /// Return the cached table for `source_path` if it is still fresh,
    /// otherwise read the source, run `builder` on its text and cache the
    /// result.
    ///
    /// Cache write failures do not fail the load; they come back in
    /// [`CacheLoad::warning`].
    ///
    /// # Errors
    /// Returns an error if the source cannot be read or `builder` fails.
    /// Parse errors carry the source path.
    pub fn load_or_build<F>(
        &self,
        source_path: &Path,
        builder: F,
        force_rebuild: bool,
    ) -> Result<CacheLoad>
    where
        F: FnOnce(&str) -> Result<RawTable>,
    {
        let entry = self.entry(source_path)?;

        if !force_rebuild {
            if let Some(table) = self.read_fresh(&entry) {
                tracing::debug!(
                    "Using cached {} for {}",
                    entry.cached_json_path.display(),
                    source_path.display()
                );
                return Ok(CacheLoad {
                    table,
                    origin: CacheOrigin::Cached,
                    warning: None,
                });
            }
        }

        tracing::info!(
            "Converting {} to {}",
            source_path.display(),
            entry.cached_json_path.display()
        );
        let start = std::time::Instant::now();
        let text = fs::read_to_string(source_path)?;
        let table = builder(&text).map_err(|e| e.with_path(source_path))?;
        tracing::debug!(
            "Parsed {} in {:.2}s",
            source_path.display(),
            start.elapsed().as_secs_f64()
        );

        let warning = match self.write(&entry, &table) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!("{e}; continuing without cache");
                Some(e)
            }
        };

        Ok(CacheLoad {
            table,
            origin: CacheOrigin::Rebuilt,
            warning,
        })
    }

    /// Read the cached table if it exists, belongs to this source and is at
    /// least as new as the source. Unreadable cache files count as stale.
    fn read_fresh(&self, entry: &CacheEntry) -> Option<RawTable> {
        let file = File::open(&entry.cached_json_path).ok()?;
        let reader = BufReader::new(GzDecoder::new(file));
        let doc: CachedDocument = match serde_json::from_reader(reader) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!(
                    "Ignoring unreadable cache {}: {}",
                    entry.cached_json_path.display(),
                    e
                );
                return None;
            }
        };

        if doc.source != entry.source_path {
            tracing::debug!(
                "Cache {} belongs to {}, not {}",
                entry.cached_json_path.display(),
                doc.source.display(),
                entry.source_path.display()
            );
            return None;
        }
        if doc.source_mtime < entry.source_mtime {
            tracing::debug!("Cache {} is stale", entry.cached_json_path.display());
            return None;
        }
        Some(doc.table)
    }

    fn write(&self, entry: &CacheEntry, table: &RawTable) -> Result<()> {
        let path = &entry.cached_json_path;
        let cache_write = |source: io::Error| Error::CacheWrite {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.cache_dir).map_err(cache_write)?;

        let file = File::create(path).map_err(cache_write)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        let doc = CachedDocumentRef {
            source: &entry.source_path,
            source_mtime: entry.source_mtime,
            table,
        };
        serde_json::to_writer(&mut encoder, &doc).map_err(|e| cache_write(io::Error::other(e)))?;
        let mut inner = encoder.finish().map_err(cache_write)?;
        inner.flush().map_err(cache_write)?;
        Ok(())
    }
}

/// Absolute form of a path without requiring it to exist.
fn absolute_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::time::Duration;
    use tempfile::TempDir;

    const SCRIPT: &str = r#"
LootData =
{
    HermesUpgrade =
    {
        PickupTextLineSets =
        {
            HermesFirstPickUp = { { Cue = "/VO/Hermes_0010", Text = "Hey!" }, },
        },
        Weight = 2.5,
        Rarity = 3,
        Color = Color.HermesVoice,
    },
}
"#;

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    fn fixture() -> (TempDir, PathBuf, MetadataCache, SystemTime) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("LootData.lua");
        fs::write(&source, SCRIPT).unwrap();
        let t = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        set_mtime(&source, t);
        let cache = MetadataCache::new(temp.path().join("cache"));
        (temp, source, cache, t)
    }

    #[test]
    fn test_round_trip_through_cache() {
        let (_temp, source, cache, _) = fixture();

        let first = cache.load_script(&source, false).unwrap();
        assert_eq!(first.origin, CacheOrigin::Rebuilt);
        assert!(first.warning.is_none());
        assert!(cache.cache_path(&source).exists());

        let second = cache.load_script(&source, false).unwrap();
        assert_eq!(second.origin, CacheOrigin::Cached);
        assert_eq!(second.table, first.table);
        assert_eq!(second.table, script::parse(SCRIPT).unwrap());
    }

    #[test]
    fn test_fresh_cache_skips_builder() {
        let (_temp, source, cache, _) = fixture();
        cache.load_script(&source, false).unwrap();

        let calls = Cell::new(0);
        let load = cache
            .load_or_build(
                &source,
                |text| {
                    calls.set(calls.get() + 1);
                    script::parse(text)
                },
                false,
            )
            .unwrap();
        assert_eq!(calls.get(), 0);
        assert_eq!(load.origin, CacheOrigin::Cached);
    }

    #[test]
    fn test_touched_source_forces_rebuild() {
        let (_temp, source, cache, t) = fixture();
        cache.load_script(&source, false).unwrap();

        set_mtime(&source, t + Duration::from_secs(1));
        let calls = Cell::new(0);
        let load = cache
            .load_or_build(
                &source,
                |text| {
                    calls.set(calls.get() + 1);
                    script::parse(text)
                },
                false,
            )
            .unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(load.origin, CacheOrigin::Rebuilt);

        // The rewritten cache now carries the newer stamp.
        let again = cache.load_script(&source, false).unwrap();
        assert_eq!(again.origin, CacheOrigin::Cached);
    }

    #[test]
    fn test_force_rebuild() {
        let (_temp, source, cache, _) = fixture();
        cache.load_script(&source, false).unwrap();
        let load = cache.load_script(&source, true).unwrap();
        assert_eq!(load.origin, CacheOrigin::Rebuilt);
    }

    #[test]
    fn test_corrupt_cache_is_rebuilt() {
        let (_temp, source, cache, _) = fixture();
        cache.load_script(&source, false).unwrap();
        fs::write(cache.cache_path(&source), b"not gzip").unwrap();

        let load = cache.load_script(&source, false).unwrap();
        assert_eq!(load.origin, CacheOrigin::Rebuilt);
    }

    #[test]
    fn test_unwritable_cache_is_a_warning() {
        let (temp, source, _, _) = fixture();
        // A regular file where the cache directory should be.
        let blocker = temp.path().join("blocked");
        fs::write(&blocker, b"").unwrap();
        let cache = MetadataCache::new(&blocker);

        let load = cache.load_script(&source, false).unwrap();
        assert_eq!(load.origin, CacheOrigin::Rebuilt);
        assert!(matches!(load.warning, Some(Error::CacheWrite { .. })));
        assert!(load.table.get_table("LootData").is_some());
    }

    #[test]
    fn test_parse_error_names_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("Broken.lua");
        fs::write(&source, "LootData = {").unwrap();
        let cache = MetadataCache::new(temp.path().join("cache"));

        match cache.load_script(&source, false) {
            Err(Error::Parse { path, .. }) => assert_eq!(path, Some(source)),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_cache_paths_differ_per_source() {
        let cache = MetadataCache::new("/tmp/cache");
        let a = cache.cache_path(Path::new("/games/a/NPCData.lua"));
        let b = cache.cache_path(Path::new("/games/b/NPCData.lua"));
        assert_ne!(a, b);
        assert!(a.file_name().unwrap().to_string_lossy().starts_with("NPCData-"));
    }
}
