//! Recursive discovery of extension archives on disk.
//!
//! An archive is any regular file carrying the platform dynamic library
//! suffix. Scanning never fails: unreadable directories are skipped the
//! same way a missing directory yields an empty result.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Platform suffix for extension archives (`so`, `dylib`, or `dll`).
pub fn archive_suffix() -> &'static str {
    std::env::consts::DLL_EXTENSION
}

/// Whether the path names a regular file with the archive suffix.
pub fn is_archive_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| ext == archive_suffix())
            .unwrap_or(false)
}

/// Recursively collects every archive file under `root`, depth first,
/// in directory entry order. Directories that cannot be read are
/// skipped.
pub fn scan_archives(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    collect(root, &mut found);
    found
}

fn collect(dir: &Path, found: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("Skipping unreadable directory {}: {}", dir.display(), err);
            return;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(err) => {
                debug!("Skipping unreadable entry in {}: {}", dir.display(), err);
                continue;
            }
        };

        if path.is_dir() {
            collect(&path, found);
        } else if is_archive_file(&path) {
            found.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(scan_archives(&missing).is_empty());
    }

    #[test]
    fn test_scan_recurses_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("bundle").join("inner");
        fs::create_dir_all(&nested).unwrap();

        let top = dir.path().join(format!("top.{}", archive_suffix()));
        let deep = nested.join(format!("deep.{}", archive_suffix()));
        touch(&top);
        touch(&deep);
        touch(&dir.path().join("readme.txt"));
        touch(&nested.join("notes.md"));

        let found = scan_archives(dir.path());
        assert_eq!(found.len(), 2);
        assert!(found.contains(&top));
        assert!(found.contains(&deep));
    }

    #[test]
    fn test_suffix_only_matches_extension() {
        let dir = tempfile::tempdir().unwrap();
        let bare = dir.path().join(archive_suffix());
        touch(&bare);
        // A file literally named "so" has no extension.
        assert!(!is_archive_file(&bare));
    }
}
