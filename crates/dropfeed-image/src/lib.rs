// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dropfeed Image — the crop-and-resize transform. Takes raw encoded image
// bytes and a target resolution, center-crops to the target aspect ratio,
// resizes, and re-encodes as PNG.

pub mod transform;

pub use transform::{CropBox, crop_box, transform};
