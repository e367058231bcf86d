// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The printer collaborator contract.

use dropfeed_core::error::Result;
use dropfeed_core::types::TargetResolution;

/// A downstream print target with an explicit handle lifecycle.
///
/// `connect` is called once at startup and `disconnect` once at shutdown;
/// the watch loop only calls `submit`, one job at a time. Implementations
/// are passed into the watcher as a generic so the loop is testable without
/// a physical printer.
#[allow(async_fn_in_trait)]
pub trait PrintSink {
    /// Establish the printer session. Must be called before `submit`.
    async fn connect(&mut self) -> Result<()>;

    /// Send one transformed image to the printer. `resolution` is a hint —
    /// the bytes are already at exactly that size.
    async fn submit(&mut self, bytes: &[u8], resolution: TargetResolution) -> Result<()>;

    /// Tear the session down. Safe to call on a never-connected sink.
    async fn disconnect(&mut self) -> Result<()>;
}
