// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The watch loop: claim, transform, print, archive — one file at a time.
//
// Strictly sequential by design: the downstream printer takes one job at a
// time, so there is nothing to gain from processing files concurrently. The
// filesystem is the only state; a file's location (hot folder, `printed/`,
// `error/`) is its lifecycle.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use dropfeed_core::config::AppConfig;
use dropfeed_core::error::{DropfeedError, Result};
use dropfeed_core::types::{Candidate, TargetResolution};
use dropfeed_image::transform;
use dropfeed_print::PrintSink;

use crate::archive::archive;
use crate::claim::{self, ClaimOutcome};
use crate::scan::scan;

/// Name of the success archive under the watch directory.
pub const PRINTED_DIR: &str = "printed";
/// Name of the failure archive under the watch directory.
pub const ERROR_DIR: &str = "error";

/// The polling watcher. Owns the printer handle for the lifetime of the
/// loop; `into_printer` returns it for teardown once the loop has stopped.
pub struct Watcher<P: PrintSink> {
    watch_dir: PathBuf,
    printed_dir: PathBuf,
    error_dir: PathBuf,
    target: TargetResolution,
    poll_interval: Duration,
    inter_file_delay: Duration,
    poll_retry_delay: Duration,
    printer: P,
}

impl<P: PrintSink> Watcher<P> {
    /// Build a watcher over `watch_dir`, creating the `printed/` and
    /// `error/` archives idempotently. A genuine creation failure
    /// (permissions, I/O) is fatal — the loop must not start without its
    /// archives.
    pub fn new(watch_dir: PathBuf, config: &AppConfig, printer: P) -> Result<Self> {
        let printed_dir = watch_dir.join(PRINTED_DIR);
        let error_dir = watch_dir.join(ERROR_DIR);
        for dir in [&printed_dir, &error_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                DropfeedError::DirectoryCreation(format!("{}: {e}", dir.display()))
            })?;
        }
        info!(
            watch = %watch_dir.display(),
            printed = %printed_dir.display(),
            error = %error_dir.display(),
            "archive directories ready"
        );

        Ok(Self {
            watch_dir,
            printed_dir,
            error_dir,
            target: config.target,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            inter_file_delay: Duration::from_millis(config.inter_file_delay_ms),
            poll_retry_delay: Duration::from_millis(config.poll_retry_delay_ms),
            printer,
        })
    }

    pub fn printed_dir(&self) -> &Path {
        &self.printed_dir
    }

    pub fn error_dir(&self) -> &Path {
        &self.error_dir
    }

    /// Consume the watcher, returning the printer handle for teardown.
    pub fn into_printer(self) -> P {
        self.printer
    }

    /// Run one full poll pass: scan the hot folder and process every current
    /// candidate in oldest-first order. Returns the number of files that
    /// reached an archive (printed or error).
    ///
    /// Per-file failures never abort the pass; only a failure to list the
    /// directory itself is returned, and the caller retries after a backoff.
    #[instrument(skip(self))]
    pub async fn poll_once(&mut self) -> Result<usize> {
        let candidates = scan(&self.watch_dir)?;
        if candidates.is_empty() {
            return Ok(0);
        }
        info!(count = candidates.len(), "images found to process");

        let mut archived = 0;
        for candidate in &candidates {
            if self.process(candidate).await {
                archived += 1;
            }
            // Breathing room between files: caps filesystem churn and gives
            // slow producers time to finish the next file.
            if !self.inter_file_delay.is_zero() {
                tokio::time::sleep(self.inter_file_delay).await;
            }
        }
        Ok(archived)
    }

    /// Process one candidate end to end. Returns true if the file was moved
    /// into an archive (either one).
    async fn process(&mut self, candidate: &Candidate) -> bool {
        let path = &candidate.path;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<unnamed>");

        match claim::probe(path) {
            Ok(ClaimOutcome::Available) => {}
            Ok(ClaimOutcome::Locked) => {
                info!(file = name, "skipping: file is in use");
                return false;
            }
            Ok(ClaimOutcome::Vanished) => {
                debug!(file = name, "skipping: file was moved or deleted");
                return false;
            }
            Err(e) => {
                warn!(file = name, error = %e, "skipping: claim probe failed");
                return false;
            }
        }

        info!(file = name, kind = ?candidate.kind, "processing");

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = name, "skipping: file vanished before read");
                return false;
            }
            Err(e) => {
                warn!(file = name, error = %e, "skipping: read failed");
                return false;
            }
        };

        let outcome = match transform(self.target, &bytes) {
            Ok(output) => self.printer.submit(&output, self.target).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => self.archive_to(path, name, &self.printed_dir),
            // Undecodable input and rejected submissions are terminal for
            // this file: route to the error archive rather than retrying a
            // failure that will repeat every poll.
            Err(e @ (DropfeedError::InvalidImage(_) | DropfeedError::PrintSubmission(_))) => {
                warn!(file = name, error = %e, "routing to error archive");
                self.archive_to(path, name, &self.error_dir)
            }
            Err(e) => {
                warn!(file = name, error = %e, "skipping: will retry next poll");
                false
            }
        }
    }

    /// Move a file into an archive directory. A move failure leaves the
    /// file in place — it stays a candidate and the move is retried on the
    /// next poll.
    fn archive_to(&self, src: &Path, name: &str, dir: &Path) -> bool {
        match archive(src, dir) {
            Ok(_) => true,
            Err(e) => {
                warn!(file = name, error = %e, "move failed, leaving file in place");
                false
            }
        }
    }

    /// Run the watch loop until `shutdown` signals.
    ///
    /// Cancellation is cooperative: it is honoured between operations, so an
    /// in-flight file always completes before the loop exits. Listing
    /// failures are transient — logged, then retried after the poll-retry
    /// backoff.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(dir = %self.watch_dir.display(), target = %self.target, "entering watch loop");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let delay = match self.poll_once().await {
                Ok(archived) => {
                    if archived > 0 {
                        info!(archived, "poll pass complete");
                    }
                    self.poll_interval
                }
                Err(e) => {
                    warn!(error = %e, "poll failed, backing off");
                    self.poll_retry_delay
                }
            };

            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("watch loop stopped");
        Ok(())
    }
}
