// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Archive relocation: move a processed file into `printed/` or `error/`
// under a collision-free name. A move must never silently overwrite an
// existing archived file.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use dropfeed_core::error::{DropfeedError, Result};

/// Resolve a destination path for `file_name` inside `dir` that does not
/// collide with an existing file.
///
/// The base name is tried first; if taken, `_1`, `_2`, … are appended before
/// the extension until a free slot is found.
pub fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };

    let mut counter = 1u32;
    loop {
        let name = match ext {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Move `src` into `dir` under a collision-free name, returning the final
/// destination path.
#[instrument(skip_all, fields(src = %src.display(), dir = %dir.display()))]
pub fn archive(src: &Path, dir: &Path) -> Result<PathBuf> {
    let file_name = src
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DropfeedError::Move(format!("{} has no file name", src.display())))?;

    let dest = unique_destination(dir, file_name);
    debug!(dest = %dest.display(), "destination resolved");

    std::fs::rename(src, &dest).map_err(|e| {
        DropfeedError::Move(format!(
            "{} -> {}: {e}",
            src.display(),
            dest.display()
        ))
    })?;

    info!(dest = %dest.display(), "file archived");
    Ok(dest)
}
