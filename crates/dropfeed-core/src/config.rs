// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

use crate::error::{DropfeedError, Result};
use crate::types::TargetResolution;

/// Default raw TCP print port (HP JetDirect).
pub const DEFAULT_PRINTER_PORT: u16 = 9100;

/// Printer endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterConfig {
    /// Printer host name or IP address.
    pub host: String,
    /// Raw TCP port (default 9100).
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PRINTER_PORT
}

impl PrinterConfig {
    /// Parse a printer address.
    ///
    /// Accepted forms: `HOST`, `HOST:PORT`, and for IPv6 literals the
    /// bracketed `[ADDR]` / `[ADDR]:PORT`. An unbracketed string containing
    /// more than one colon is taken as a bare IPv6 literal with the default
    /// port — `::1` is a host, not an empty host with port 1.
    pub fn parse(addr: &str) -> Result<Self> {
        if addr.is_empty() {
            return Err(DropfeedError::Configuration(
                "empty printer address".to_string(),
            ));
        }

        if let Some(rest) = addr.strip_prefix('[') {
            let Some((host, tail)) = rest.split_once(']') else {
                return Err(DropfeedError::Configuration(format!(
                    "unclosed bracket in printer address '{addr}'"
                )));
            };
            if host.is_empty() {
                return Err(DropfeedError::Configuration(format!(
                    "empty printer host in '{addr}'"
                )));
            }
            let port = match tail {
                "" => DEFAULT_PRINTER_PORT,
                tail => tail
                    .strip_prefix(':')
                    .and_then(|p| p.parse::<u16>().ok())
                    .ok_or_else(|| {
                        DropfeedError::Configuration(format!(
                            "invalid printer port in '{addr}'"
                        ))
                    })?,
            };
            return Ok(Self {
                host: host.to_string(),
                port,
            });
        }

        if addr.matches(':').count() > 1 {
            return Ok(Self {
                host: addr.to_string(),
                port: DEFAULT_PRINTER_PORT,
            });
        }

        match addr.split_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    DropfeedError::Configuration(format!("invalid printer port in '{addr}'"))
                })?;
                if host.is_empty() {
                    return Err(DropfeedError::Configuration(format!(
                        "empty printer host in '{addr}'"
                    )));
                }
                Ok(Self {
                    host: host.to_string(),
                    port,
                })
            }
            None => Ok(Self {
                host: addr.to_string(),
                port: DEFAULT_PRINTER_PORT,
            }),
        }
    }
}

/// Application settings, loadable from a JSON file with CLI overrides on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fixed output resolution for every print.
    pub target: TargetResolution,
    /// Delay between full directory scans, in milliseconds.
    pub poll_interval_ms: u64,
    /// Delay between processing consecutive files within one pass.
    pub inter_file_delay_ms: u64,
    /// Backoff before retrying after a failed directory listing.
    pub poll_retry_delay_ms: u64,
    /// Printer endpoint. Required at startup; optional here so a config
    /// file may omit it in favour of the CLI flag or environment.
    pub printer: Option<PrinterConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            // Portrait instant-film print format.
            target: TargetResolution {
                width: 600,
                height: 800,
            },
            poll_interval_ms: 1000,
            inter_file_delay_ms: 1000,
            poll_retry_delay_ms: 5000,
            printer: None,
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DropfeedError::Configuration(format!(
                "failed to read config {}: {e}",
                path.as_ref().display()
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            DropfeedError::Configuration(format!(
                "failed to parse config {}: {e}",
                path.as_ref().display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_host_only_uses_default_port() {
        let cfg = PrinterConfig::parse("10.0.0.5").expect("parse");
        assert_eq!(cfg.host, "10.0.0.5");
        assert_eq!(cfg.port, DEFAULT_PRINTER_PORT);
    }

    #[test]
    fn parse_host_and_port() {
        let cfg = PrinterConfig::parse("printer.local:9101").expect("parse");
        assert_eq!(cfg.host, "printer.local");
        assert_eq!(cfg.port, 9101);
    }

    #[test]
    fn parse_bare_ipv6_literal_is_a_host() {
        let cfg = PrinterConfig::parse("::1").expect("parse");
        assert_eq!(cfg.host, "::1");
        assert_eq!(cfg.port, DEFAULT_PRINTER_PORT);

        let cfg = PrinterConfig::parse("fe80::1").expect("parse");
        assert_eq!(cfg.host, "fe80::1");
        assert_eq!(cfg.port, DEFAULT_PRINTER_PORT);
    }

    #[test]
    fn parse_bracketed_ipv6_with_and_without_port() {
        let cfg = PrinterConfig::parse("[fe80::1]:9101").expect("parse");
        assert_eq!(cfg.host, "fe80::1");
        assert_eq!(cfg.port, 9101);

        let cfg = PrinterConfig::parse("[::1]").expect("parse");
        assert_eq!(cfg.host, "::1");
        assert_eq!(cfg.port, DEFAULT_PRINTER_PORT);
    }

    #[test]
    fn parse_rejects_malformed_brackets() {
        assert!(PrinterConfig::parse("[fe80::1").is_err());
        assert!(PrinterConfig::parse("[]").is_err());
        assert!(PrinterConfig::parse("[fe80::1]x").is_err());
        assert!(PrinterConfig::parse("[fe80::1]:bad").is_err());
    }

    #[test]
    fn parse_rejects_bad_port_and_empty_host() {
        assert!(PrinterConfig::parse("host:abc").is_err());
        assert!(PrinterConfig::parse(":9100").is_err());
        assert!(PrinterConfig::parse("").is_err());
    }

    #[test]
    fn config_roundtrips_through_json() {
        let cfg = AppConfig::default();
        let json = serde_json::to_string(&cfg).expect("serialize");
        let back: AppConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.target, cfg.target);
        assert_eq!(back.poll_interval_ms, 1000);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let back: AppConfig =
            serde_json::from_str(r#"{"poll_interval_ms": 250}"#).expect("deserialize");
        assert_eq!(back.poll_interval_ms, 250);
        assert_eq!(back.target.width, 600);
        assert_eq!(back.target.height, 800);
    }
}
