// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dropfeed Print — the downstream printer seam. The watch loop only ever
// talks to a `PrintSink`; the shipped implementation is a raw TCP
// (JetDirect) client.

pub mod raw;
pub mod sink;

pub use raw::RawTcpPrinter;
pub use sink::PrintSink;
