// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dropfeed — hot-folder print spooler.
//
// Entry point. Parses the CLI, initialises logging, connects the printer,
// and runs the watch loop until interrupted. Exit status 0 on a clean
// interrupt, 1 on any startup failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};

use dropfeed_core::config::{AppConfig, PrinterConfig};
use dropfeed_core::error::{DropfeedError, Result};
use dropfeed_core::types::TargetResolution;
use dropfeed_print::{PrintSink, RawTcpPrinter};
use dropfeed_watch::Watcher;

#[derive(Parser, Debug)]
#[command(
    name = "dropfeed",
    version,
    about = "Watch a directory and spool arriving images to a printer"
)]
struct Cli {
    /// File or directory to watch. A file watches its parent directory.
    path: PathBuf,

    /// Printer address, HOST or HOST:PORT (default port 9100).
    #[arg(long, env = "DROPFEED_PRINTER")]
    printer: Option<String>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the target print width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Override the target print height in pixels.
    #[arg(long)]
    height: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // clap's default failure status is 2; the contract here is 1 for genuine
    // argument errors, with the usage message on stderr. `--help` and
    // `--version` are requested output, not errors, and exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if is_usage_error(&e) {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Whether a parse failure is a real usage error, as opposed to requested
/// help/version output.
fn is_usage_error(e: &clap::Error) -> bool {
    !matches!(
        e.kind(),
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
    )
}

async fn run(cli: Cli) -> Result<()> {
    let watch_dir = resolve_watch_dir(&cli.path)?;
    let config = build_config(&cli)?;

    let printer_cfg = config.printer.clone().ok_or_else(|| {
        DropfeedError::Configuration(
            "no printer address configured (use --printer or DROPFEED_PRINTER)".to_string(),
        )
    })?;

    info!(
        dir = %watch_dir.display(),
        printer = %format!("{}:{}", printer_cfg.host, printer_cfg.port),
        target = %config.target,
        "dropfeed starting"
    );

    let mut printer = RawTcpPrinter::new(printer_cfg);
    printer.connect().await?;

    let mut watcher = Watcher::new(watch_dir, &config, printer)?;

    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, finishing current file");
            let _ = tx.send(true);
        }
    });

    info!("setup complete, entering processing loop (Ctrl-C to stop)");
    watcher.run(rx).await?;

    let mut printer = watcher.into_printer();
    if let Err(e) = printer.disconnect().await {
        warn!(error = %e, "printer teardown failed");
    }
    Ok(())
}

/// Resolve the positional argument to the directory to watch: a directory
/// is used as-is, a file resolves to its parent. The path must exist.
fn resolve_watch_dir(path: &std::path::Path) -> Result<PathBuf> {
    let resolved = path.canonicalize().map_err(|e| {
        DropfeedError::PathResolution(format!("path '{}' does not exist: {e}", path.display()))
    })?;

    if resolved.is_dir() {
        Ok(resolved)
    } else if resolved.is_file() {
        resolved
            .parent()
            .map(std::path::Path::to_path_buf)
            .ok_or_else(|| {
                DropfeedError::PathResolution(format!(
                    "file '{}' has no parent directory",
                    resolved.display()
                ))
            })
    } else {
        Err(DropfeedError::PathResolution(format!(
            "path '{}' is not a regular file or directory",
            resolved.display()
        )))
    }
}

/// Layer the configuration: file (if given), then CLI overrides on top.
fn build_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    if cli.width.is_some() || cli.height.is_some() {
        config.target = TargetResolution::new(
            cli.width.unwrap_or(config.target.width),
            cli.height.unwrap_or(config.target.height),
        )?;
    }

    if let Some(addr) = &cli.printer {
        config.printer = Some(PrinterConfig::parse(addr)?);
    }

    Ok(config)
}
