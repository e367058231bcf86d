// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Directory scanning: list the hot folder, keep regular image files, and
// order them oldest-first.

use std::path::Path;

use tracing::{debug, instrument};

use dropfeed_core::error::{DropfeedError, Result};
use dropfeed_core::types::{Candidate, ImageKind};

/// List the candidates in `dir`, oldest modification time first.
///
/// Only regular files directly under `dir` are considered — subdirectories
/// are ignored, not recursed into. Entries that vanish or fail to stat
/// between listing and inspection are skipped silently; they will be seen
/// again on the next poll if they still exist. A failure to list the
/// directory itself is a `Poll` error (transient, the caller retries).
///
/// The sort is stable: files with identical modification times keep their
/// listing order.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn scan(dir: &Path) -> Result<Vec<Candidate>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| DropfeedError::Poll(format!("listing {}: {e}", dir.display())))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        let path = entry.path();
        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping entry that failed to stat");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let Some(kind) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageKind::from_extension)
        else {
            continue;
        };

        let modified = match metadata.modified() {
            Ok(t) => t,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping entry without mtime");
                continue;
            }
        };

        candidates.push(Candidate {
            path,
            modified,
            kind,
        });
    }

    candidates.sort_by_key(|c| c.modified);

    debug!(count = candidates.len(), "scan complete");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::fs;

    fn touch(dir: &Path, name: &str, mtime_secs: i64) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"data").expect("write file");
        filetime::set_file_mtime(&path, FileTime::from_unix_time(mtime_secs, 0))
            .expect("set mtime");
        path
    }

    #[test]
    fn orders_oldest_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "newer.jpg", 2_000);
        touch(dir.path(), "oldest.png", 1_000);
        touch(dir.path(), "newest.gif", 3_000);

        let candidates = scan(dir.path()).expect("scan");
        let names: Vec<_> = candidates
            .iter()
            .map(|c| c.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["oldest.png", "newer.jpg", "newest.gif"]);
    }

    #[test]
    fn ignores_unrecognised_extensions() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "notes.txt", 1_000);
        touch(dir.path(), "photo.jpg", 2_000);
        touch(dir.path(), "noextension", 3_000);

        let candidates = scan(dir.path()).expect("scan");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, ImageKind::Jpeg);
    }

    #[test]
    fn ignores_subdirectories() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("printed")).expect("mkdir");
        // A directory whose name looks like an image must still be skipped.
        fs::create_dir(dir.path().join("trap.png")).expect("mkdir");
        touch(dir.path(), "real.png", 1_000);

        let candidates = scan(dir.path()).expect("scan");
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].path.ends_with("real.png"));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "UPPER.JPG", 1_000);

        let candidates = scan(dir.path()).expect("scan");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, ImageKind::Jpeg);
    }

    #[test]
    fn missing_directory_is_a_poll_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gone = dir.path().join("nonexistent");
        assert!(matches!(scan(&gone), Err(DropfeedError::Poll(_))));
    }

    #[test]
    fn empty_directory_yields_no_candidates() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(scan(dir.path()).expect("scan").is_empty());
    }
}
