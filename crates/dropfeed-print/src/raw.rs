// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP print client (JetDirect, port 9100).
//
// The simplest possible print transport: open a TCP socket once and dump
// bytes into it per job. No settings negotiation, no job tracking — the
// printer must interpret the payload format natively (Dropfeed always sends
// PNG at the configured resolution).

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use dropfeed_core::config::PrinterConfig;
use dropfeed_core::error::{DropfeedError, Result};
use dropfeed_core::types::TargetResolution;

use crate::sink::PrintSink;

/// Timeout for establishing the printer connection.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Chunk size for writes, small enough for useful progress logging.
const CHUNK_SIZE: usize = 8192;

/// A raw TCP printer holding one long-lived connection.
pub struct RawTcpPrinter {
    config: PrinterConfig,
    stream: Option<TcpStream>,
}

impl RawTcpPrinter {
    pub fn new(config: PrinterConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Dial string for the configured endpoint. IPv6 literal hosts are
    /// re-bracketed so the port is unambiguous.
    fn addr(&self) -> String {
        if self.config.host.contains(':') {
            format!("[{}]:{}", self.config.host, self.config.port)
        } else {
            format!("{}:{}", self.config.host, self.config.port)
        }
    }
}

impl PrintSink for RawTcpPrinter {
    #[instrument(skip(self), fields(addr = %self.addr()))]
    async fn connect(&mut self) -> Result<()> {
        let addr = self.addr();
        let stream = tokio::time::timeout(
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            TcpStream::connect(&addr),
        )
        .await
        .map_err(|_| {
            DropfeedError::PrintConnect(format!(
                "connection to {addr} timed out after {CONNECT_TIMEOUT_SECS}s"
            ))
        })?
        .map_err(|e| DropfeedError::PrintConnect(format!("connect to {addr}: {e}")))?;

        info!("printer connected");
        self.stream = Some(stream);
        Ok(())
    }

    #[instrument(skip(self, bytes), fields(len = bytes.len(), resolution = %resolution))]
    async fn submit(&mut self, bytes: &[u8], resolution: TargetResolution) -> Result<()> {
        let stream = self.stream.as_mut().ok_or_else(|| {
            DropfeedError::PrintSubmission("printer is not connected".to_string())
        })?;

        let mut sent = 0usize;
        for chunk in bytes.chunks(CHUNK_SIZE) {
            stream.write_all(chunk).await.map_err(|e| {
                DropfeedError::PrintSubmission(format!("send failed at byte {sent}: {e}"))
            })?;
            sent += chunk.len();
            debug!(sent, total = bytes.len(), "submit progress");
        }

        stream
            .flush()
            .await
            .map_err(|e| DropfeedError::PrintSubmission(format!("flush: {e}")))?;

        info!(total = bytes.len(), "print job submitted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn disconnect(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream
                .shutdown()
                .await
                .map_err(|e| DropfeedError::PrintSubmission(format!("shutdown: {e}")))?;
            info!("printer disconnected");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn resolution() -> TargetResolution {
        TargetResolution::new(600, 800).expect("valid resolution")
    }

    #[tokio::test]
    async fn submit_streams_all_bytes() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("local addr").port();

        // Fake printer: accept one connection and read until EOF.
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.expect("read");
            received
        });

        let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();

        let mut printer = RawTcpPrinter::new(PrinterConfig {
            host: "127.0.0.1".to_string(),
            port,
        });
        printer.connect().await.expect("connect");
        printer
            .submit(&payload, resolution())
            .await
            .expect("submit");
        printer.disconnect().await.expect("disconnect");

        let received = server.await.expect("server task");
        assert_eq!(received, payload);
    }

    #[tokio::test]
    async fn submit_without_connect_is_an_error() {
        let mut printer = RawTcpPrinter::new(PrinterConfig {
            host: "127.0.0.1".to_string(),
            port: 9100,
        });
        let err = printer.submit(b"data", resolution()).await.unwrap_err();
        assert!(matches!(err, DropfeedError::PrintSubmission(_)));
    }

    #[test]
    fn ipv6_hosts_are_bracketed_for_dialing() {
        let printer = RawTcpPrinter::new(PrinterConfig {
            host: "fe80::1".to_string(),
            port: 9100,
        });
        assert_eq!(printer.addr(), "[fe80::1]:9100");

        let printer = RawTcpPrinter::new(PrinterConfig {
            host: "printer.local".to_string(),
            port: 9100,
        });
        assert_eq!(printer.addr(), "printer.local:9100");
    }

    #[tokio::test]
    async fn disconnect_before_connect_is_a_no_op() {
        let mut printer = RawTcpPrinter::new(PrinterConfig {
            host: "127.0.0.1".to_string(),
            port: 9100,
        });
        printer.disconnect().await.expect("disconnect");
    }
}
