// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The claim probe: decide whether a candidate file is still being written
// by its producer before touching it.
//
// The probe opens the file for read+write (no truncation) — falling back to
// a read-only handle for files the operator cannot write — and takes a
// non-blocking exclusive lock, releasing it immediately. It never alters
// content, length, timestamps, or permissions. A producer holding the file
// open with a lock (Windows sharing semantics, or any cooperating writer on
// Unix) shows up as `Locked`; a file deleted between listing and probing
// shows up as `Vanished`.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use fs2::FileExt;
use tracing::{debug, instrument};

use dropfeed_core::error::{DropfeedError, Result};

/// Three-way outcome of probing a candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// No other writer holds the file — safe to process now.
    Available,
    /// Another process still has the file open or locked. Skip this poll;
    /// the file stays a candidate for the next one.
    Locked,
    /// The file no longer exists. Skip silently — nothing to retry.
    Vanished,
}

/// Probe `path` for availability.
///
/// Any OS error other than "locked" or "gone" is surfaced as a `Claim`
/// error; the caller logs it and reconsiders the file next poll.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn probe(path: &Path) -> Result<ClaimOutcome> {
    let file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("file vanished before probe");
            return Ok(ClaimOutcome::Vanished);
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => match reopen_read_only(path)? {
            Reopen::Handle(file) => file,
            Reopen::Done(outcome) => return Ok(outcome),
        },
        Err(e) => {
            return Err(DropfeedError::Claim(format!(
                "open {}: {e}",
                path.display()
            )));
        }
    };

    match file.try_lock_exclusive() {
        Ok(()) => {
            // Release immediately — the probe only answers a question.
            let _ = file.unlock();
            debug!("file available");
            Ok(ClaimOutcome::Available)
        }
        Err(ref e) if is_contended(e) => {
            debug!("exclusive lock contended — file in use");
            Ok(ClaimOutcome::Locked)
        }
        Err(e) => Err(DropfeedError::Claim(format!(
            "lock {}: {e}",
            path.display()
        ))),
    }
}

/// Second-chance handle for a candidate that refused a writable open.
enum Reopen {
    /// A readable handle to take the lock on.
    Handle(std::fs::File),
    /// The outcome is already decided.
    Done(ClaimOutcome),
}

/// On Windows, a `PermissionDenied` on open is how a file held open by
/// another process without sharing presents — that is the locked case the
/// probe exists to catch.
#[cfg(windows)]
fn reopen_read_only(_path: &Path) -> Result<Reopen> {
    debug!("open refused — treating as locked");
    Ok(Reopen::Done(ClaimOutcome::Locked))
}

/// On Unix, a `PermissionDenied` on a read+write open usually just means the
/// file itself is read-only (e.g. mode 0444, copied from a read-only
/// source). Such a file must not be starved: retry with a read-only handle,
/// which can still take the exclusive lock. Only a file that refuses even a
/// read open counts as locked.
#[cfg(not(windows))]
fn reopen_read_only(path: &Path) -> Result<Reopen> {
    match OpenOptions::new().read(true).open(path) {
        Ok(file) => {
            debug!("writable open refused, probing via read-only handle");
            Ok(Reopen::Handle(file))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("file vanished before probe");
            Ok(Reopen::Done(ClaimOutcome::Vanished))
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            debug!("read open refused — treating as locked");
            Ok(Reopen::Done(ClaimOutcome::Locked))
        }
        Err(e) => Err(DropfeedError::Claim(format!(
            "open {}: {e}",
            path.display()
        ))),
    }
}

/// Whether a lock error means "held by someone else" rather than a real
/// failure.
fn is_contended(e: &std::io::Error) -> bool {
    e.kind() == ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn available_when_nothing_holds_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("free.jpg");
        fs::write(&path, b"image").expect("write");

        assert_eq!(probe(&path).expect("probe"), ClaimOutcome::Available);
    }

    #[test]
    fn vanished_when_the_file_is_gone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gone.jpg");

        assert_eq!(probe(&path).expect("probe"), ClaimOutcome::Vanished);
    }

    #[test]
    fn locked_while_a_writer_holds_the_lock_then_available() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("busy.jpg");
        fs::write(&path, b"image").expect("write");

        // Simulate the producer: a separate handle holding an exclusive
        // lock. Lock conflicts apply across open handles even within one
        // process, so this models an external writer faithfully.
        let writer = File::options()
            .write(true)
            .open(&path)
            .expect("open writer handle");
        writer.try_lock_exclusive().expect("acquire producer lock");

        assert_eq!(probe(&path).expect("probe"), ClaimOutcome::Locked);

        writer.unlock().expect("release producer lock");
        assert_eq!(probe(&path).expect("probe"), ClaimOutcome::Available);
    }

    #[test]
    #[cfg(unix)]
    fn read_only_file_is_available() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("readonly.jpg");
        fs::write(&path, b"image").expect("write");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444))
            .expect("set read-only");

        // A file the operator cannot write is still claimable: moving it
        // needs only directory write permission, so the probe must not
        // report it locked and starve it.
        assert_eq!(probe(&path).expect("probe"), ClaimOutcome::Available);
    }

    #[test]
    #[cfg(unix)]
    fn read_only_file_respects_a_producer_lock() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("readonly-busy.jpg");
        fs::write(&path, b"image").expect("write");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444))
            .expect("set read-only");

        let producer = File::open(&path).expect("open producer handle");
        producer.try_lock_exclusive().expect("acquire producer lock");

        assert_eq!(probe(&path).expect("probe"), ClaimOutcome::Locked);

        producer.unlock().expect("release producer lock");
        assert_eq!(probe(&path).expect("probe"), ClaimOutcome::Available);
    }

    #[test]
    fn probe_does_not_modify_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("intact.jpg");
        fs::write(&path, b"original contents").expect("write");

        probe(&path).expect("probe");

        let contents = fs::read(&path).expect("read back");
        assert_eq!(contents, b"original contents");
    }
}
