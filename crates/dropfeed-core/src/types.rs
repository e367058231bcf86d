// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Dropfeed spooler.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

use crate::error::{DropfeedError, Result};

/// Fixed output pixel dimensions for every transformed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetResolution {
    pub width: u32,
    pub height: u32,
}

impl TargetResolution {
    /// Build a target resolution, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DropfeedError::Configuration(format!(
                "target resolution must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Width/height as a real-valued ratio.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl std::fmt::Display for TargetResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Recognised input image formats.
///
/// The allow-list is fixed: files with any other extension are never selected
/// as candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    WebP,
}

impl ImageKind {
    /// Infer the image kind from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// MIME type string for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::WebP => "image/webp",
        }
    }
}

/// A regular file observed in the watch directory, eligible for processing.
///
/// Exists only until the watcher moves it into an archive directory or the
/// producer removes it independently (a tolerated race).
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Last-modified timestamp at scan time.
    pub modified: SystemTime,
    /// Format inferred from the file extension.
    pub kind: ImageKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(TargetResolution::new(0, 800).is_err());
        assert!(TargetResolution::new(600, 0).is_err());
        assert!(TargetResolution::new(600, 800).is_ok());
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(ImageKind::from_extension("JPG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("Png"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_extension("webp"), Some(ImageKind::WebP));
        assert_eq!(ImageKind::from_extension("txt"), None);
        assert_eq!(ImageKind::from_extension("jpg.bak"), None);
    }

    #[test]
    fn display_formats_as_wxh() {
        let target = TargetResolution::new(600, 800).expect("valid resolution");
        assert_eq!(target.to_string(), "600x800");
    }
}
