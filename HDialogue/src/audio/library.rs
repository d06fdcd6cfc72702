//! Index of extracted voice clips
//!
//! The game's voice bank is extracted beforehand into one file per clip,
//! named `<bank index>.<cue>.ogg`. Scanning the directory once builds a
//! map of cue identifier → file path so lookups during catalog build are
//! O(1) instead of repeated directory searches.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Filename pattern for clips extracted from the game's voice banks.
pub const DEFAULT_OGG_PATTERN: &str = r"^\d+\.(?P<vo>\S+)\.ogg$";

/// Audio identifier → absolute path index.
///
/// Each identifier maps to at most one path. When several files match the
/// same identifier, the first in scan order (file names sorted per
/// directory) wins and the rest are counted as duplicates.
#[derive(Debug, Clone, Default)]
pub struct OggLibrary {
    /// Directory that was scanned (empty for hand-built indexes)
    root: PathBuf,
    /// Identifier → file path
    index: HashMap<String, PathBuf>,
    /// Files skipped because their identifier was already indexed
    duplicates: usize,
}

impl OggLibrary {
    /// Recursively scan `directory` for files whose name matches `pattern`.
    ///
    /// `pattern` must contain exactly one named capture group, which yields
    /// the audio identifier, and is matched against the whole file name.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPattern`] for a bad pattern and
    /// [`Error::Library`] if `directory` is missing or unreadable.
    pub fn scan<P: AsRef<Path>>(directory: P, pattern: &str) -> Result<Self> {
        let directory = directory.as_ref();
        let (regex, group) = compile_pattern(pattern)?;

        if !directory.is_dir() {
            return Err(Error::Library {
                path: directory.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }
        let root = std::fs::canonicalize(directory).map_err(|e| Error::Library {
            path: directory.to_path_buf(),
            message: e.to_string(),
        })?;

        let start = std::time::Instant::now();
        let mut library = Self {
            root: root.clone(),
            ..Self::default()
        };

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                // The root itself failing means nothing can be indexed
                Err(e) if e.depth() == 0 => {
                    return Err(Error::Library {
                        path: root,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            let Some(id) = regex
                .captures(&file_name)
                .and_then(|caps| caps.name(&group))
                .map(|m| m.as_str().to_string())
            else {
                continue;
            };
            library.insert(id, entry.into_path());
        }

        tracing::info!(
            "Indexed {} audio files from {} in {:.2}s ({} duplicates)",
            library.len(),
            library.root.display(),
            start.elapsed().as_secs_f64(),
            library.duplicates
        );
        Ok(library)
    }

    /// Build an index from explicit (identifier, path) pairs, first wins.
    pub fn from_entries<I, S, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: Into<PathBuf>,
    {
        let mut library = Self::default();
        for (id, path) in entries {
            library.insert(id.into(), path.into());
        }
        library
    }

    fn insert(&mut self, id: String, path: PathBuf) {
        if let Some(existing) = self.index.get(&id) {
            tracing::warn!(
                "Duplicate audio file for {}: keeping {}, ignoring {}",
                id,
                existing.display(),
                path.display()
            );
            self.duplicates += 1;
            return;
        }
        self.index.insert(id, path);
    }

    /// Look up the file for an audio identifier (O(1))
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&Path> {
        self.index.get(id).map(PathBuf::as_path)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of files ignored because their identifier was already taken
    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Compile a filename pattern, anchored to the whole name, and return the
/// name of its single capture group.
fn compile_pattern(pattern: &str) -> Result<(Regex, String)> {
    let invalid = |message: String| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message,
    };

    let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| invalid(e.to_string()))?;
    let names: Vec<&str> = regex.capture_names().flatten().collect();
    match names.as_slice() {
        [name] => {
            let name = (*name).to_string();
            Ok((regex, name))
        }
        [] => Err(invalid("no named capture group".to_string())),
        _ => Err(invalid(format!(
            "expected one named capture group, found {}",
            names.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"OggS").unwrap();
        path
    }

    #[test]
    fn test_default_pattern() {
        let temp = TempDir::new().unwrap();
        let hermes = touch(temp.path(), "0012.Hermes_0010.ogg");
        touch(temp.path(), "nested/0440.ZagreusField_0001.ogg");
        touch(temp.path(), "readme.txt");
        touch(temp.path(), "Hermes_0011.ogg");

        let library = OggLibrary::scan(temp.path(), DEFAULT_OGG_PATTERN).unwrap();
        assert_eq!(library.len(), 2);
        assert_eq!(
            library.lookup("Hermes_0010"),
            Some(fs::canonicalize(&hermes).unwrap().as_path())
        );
        assert!(library.contains("ZagreusField_0001"));
        assert!(!library.contains("Hermes_0011"));
    }

    #[test]
    fn test_custom_prefix_pattern() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "PREFIX_Hermes_0010.ogg");
        touch(temp.path(), "PREFIX_Zeus_0042.ogg");
        touch(temp.path(), "OTHER_Hermes_0099.ogg");

        let library = OggLibrary::scan(temp.path(), r"PREFIX_(?<vo>.+)\.ogg").unwrap();
        assert_eq!(library.len(), 2);
        assert!(library.contains("Hermes_0010"));
        assert!(library.contains("Zeus_0042"));
        assert!(!library.contains("Hermes_0099"));
    }

    #[test]
    fn test_pattern_matches_whole_name() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "PREFIX_Hermes_0010.ogg.bak");

        let library = OggLibrary::scan(temp.path(), r"PREFIX_(?<vo>.+)\.ogg").unwrap();
        assert!(library.is_empty());
    }

    #[test]
    fn test_duplicates_first_in_sorted_order_wins() {
        let temp = TempDir::new().unwrap();
        let first = touch(temp.path(), "0001.Hermes_0010.ogg");
        touch(temp.path(), "0002.Hermes_0010.ogg");

        let library = OggLibrary::scan(temp.path(), DEFAULT_OGG_PATTERN).unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(library.duplicates(), 1);
        assert_eq!(
            library.lookup("Hermes_0010"),
            Some(fs::canonicalize(&first).unwrap().as_path())
        );
    }

    #[test]
    fn test_invalid_patterns() {
        let temp = TempDir::new().unwrap();
        for pattern in [r"(\d+)\.ogg", r"(?<a>\d+)\.(?<b>\S+)\.ogg", r"(?<vo>"] {
            let err = OggLibrary::scan(temp.path(), pattern).unwrap_err();
            assert!(matches!(err, Error::InvalidPattern { .. }), "{pattern}: {err}");
        }
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let err = OggLibrary::scan(temp.path().join("nope"), DEFAULT_OGG_PATTERN).unwrap_err();
        assert!(matches!(err, Error::Library { .. }));
    }

    #[test]
    fn test_from_entries() {
        let library = OggLibrary::from_entries([("A_1", "/a.ogg"), ("A_1", "/b.ogg")]);
        assert_eq!(library.lookup("A_1"), Some(Path::new("/a.ogg")));
        assert_eq!(library.duplicates(), 1);
    }
}
