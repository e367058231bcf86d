// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Center-crop and resize. The crop geometry is pure integer/float math kept
// separate from pixel work so it can be tested exhaustively without decoding
// anything.

use image::ImageFormat;
use image::imageops::FilterType;
use tracing::{debug, instrument};

use dropfeed_core::error::{DropfeedError, Result};
use dropfeed_core::types::TargetResolution;

/// A crop rectangle in source-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    /// Left edge (x) of the crop.
    pub left: u32,
    /// Top edge (y) of the crop.
    pub top: u32,
    /// Width of the crop.
    pub width: u32,
    /// Height of the crop.
    pub height: u32,
}

/// Compute the centered crop rectangle that matches `target`'s aspect ratio
/// within a `width` x `height` source.
///
/// A source wider than the target narrows the width; a source taller than or
/// *equal to* the target narrows the height (the equal case crops nothing —
/// the computed height is the full source height). Fractional boundaries are
/// truncated toward zero.
pub fn crop_box(target: TargetResolution, width: u32, height: u32) -> Result<CropBox> {
    if target.width == 0 || target.height == 0 {
        return Err(DropfeedError::Configuration(format!(
            "target resolution must be non-zero, got {target}"
        )));
    }
    if width == 0 || height == 0 {
        return Err(DropfeedError::InvalidImage(format!(
            "source image has a zero dimension ({width}x{height})"
        )));
    }

    let target_aspect = target.aspect();
    let current_aspect = f64::from(width) / f64::from(height);

    if current_aspect > target_aspect {
        // Source is relatively wider: narrow the width.
        let new_width = ((target_aspect * f64::from(height)) as u32).clamp(1, width);
        Ok(CropBox {
            left: (width - new_width) / 2,
            top: 0,
            width: new_width,
            height,
        })
    } else {
        // Source is relatively taller or equal: narrow the height. The clamp
        // guards against float rounding pushing the computed height past the
        // source in the exactly-equal case.
        let new_height = ((f64::from(width) / target_aspect) as u32).clamp(1, height);
        Ok(CropBox {
            left: 0,
            top: (height - new_height) / 2,
            width,
            height: new_height,
        })
    }
}

/// Transform raw encoded image bytes to exactly `target` pixels.
///
/// Decodes, center-crops to the target aspect ratio (no resampling), resizes
/// with Lanczos3, and re-encodes as PNG — the one fixed output format
/// regardless of input. Pure and deterministic for identical inputs.
#[instrument(skip(bytes), fields(target = %target, input_len = bytes.len()))]
pub fn transform(target: TargetResolution, bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| DropfeedError::InvalidImage(format!("failed to decode image: {e}")))?;

    let crop = crop_box(target, img.width(), img.height())?;
    debug!(
        src_w = img.width(),
        src_h = img.height(),
        left = crop.left,
        top = crop.top,
        crop_w = crop.width,
        crop_h = crop.height,
        "crop geometry computed"
    );

    let cropped = img.crop_imm(crop.left, crop.top, crop.width, crop.height);
    let resized = cropped.resize_exact(target.width, target.height, FilterType::Lanczos3);

    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    resized
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| DropfeedError::InvalidImage(format!("PNG encoding failed: {e}")))?;

    debug!(output_len = buffer.len(), "transform complete");
    Ok(buffer)
}
