// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Dropfeed.

use thiserror::Error;

/// Top-level error type for all Dropfeed operations.
///
/// Startup-phase variants (`Configuration`, `PathResolution`,
/// `DirectoryCreation`, `PrintConnect`) are fatal and abort the process with
/// exit status 1. Every other variant is scoped to a single poll pass or a
/// single file and must never terminate the watch loop.
#[derive(Debug, Error)]
pub enum DropfeedError {
    // -- Startup errors --
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("path resolution failed: {0}")]
    PathResolution(String),

    #[error("archive directory creation failed: {0}")]
    DirectoryCreation(String),

    #[error("printer connection failed: {0}")]
    PrintConnect(String),

    // -- Per-poll errors --
    #[error("directory listing failed: {0}")]
    Poll(String),

    // -- Per-file errors --
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("print submission failed: {0}")]
    PrintSubmission(String),

    #[error("claim probe failed: {0}")]
    Claim(String),

    #[error("file move failed: {0}")]
    Move(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DropfeedError>;
