// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dropfeed Watch — the polling directory watcher. Scans the hot folder,
// claims files that are no longer being written, runs them through the
// transform and printer, and archives the originals.

pub mod archive;
pub mod claim;
pub mod runner;
pub mod scan;

pub use claim::ClaimOutcome;
pub use runner::Watcher;
