//! Dropsync - one-shot SFTP inbox sync
//!
//! Lists a remote read directory, downloads every file not yet present in
//! the remote archive directory, then moves each downloaded file into the
//! archive. Meant to run from a scheduler; each invocation is one full
//! list-diff-download-archive pass.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use dropsync::config::{Config, ConnectSpec};
use dropsync::logger::{Logger, NoopLogger, TextLogger};
use dropsync::sftp::SftpSession;
use dropsync::sync::{self, SyncOptions, SyncStats};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Dropsync - one-shot SFTP inbox sync: download new remote files, archive them server-side"
)]
struct Args {
    /// Path to the TOML config file
    config: PathBuf,

    /// Append run log entries to this file
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Trace each stage (overrides the config flag)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Set up Ctrl-C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Exiting (Ctrl-C)...");
        // Exit immediately with 130 (128 + SIGINT)
        std::process::exit(130);
    })
    .expect("Error setting Ctrl-C handler");

    let args = Args::parse();

    let cfg = Config::load(&args.config)?;
    let verbose = args.verbose || cfg.sftp.verbose;

    let logger: Box<dyn Logger> = match &args.log_file {
        Some(path) => Box::new(
            TextLogger::new(path, verbose)
                .with_context(|| format!("failed to open log file {}", path.display()))?,
        ),
        None => Box::new(NoopLogger),
    };

    let start = Instant::now();
    logger.run_start(&cfg.sftp.read_path, &cfg.sftp.archive_path);

    // Helpers only propagate errors; this is the single place a failed run
    // gets logged and turned into a nonzero exit.
    let stats = match run_once(&cfg, logger.as_ref()) {
        Ok(stats) => stats,
        Err(err) => {
            logger.error(&format!("{err:#}"));
            return Err(err);
        }
    };

    let seconds = start.elapsed().as_secs_f64();
    logger.done(stats.files_synced, stats.bytes_synced, seconds);
    println!(
        "Synced {} files ({} bytes) in {:.2}s",
        stats.files_synced, stats.bytes_synced, seconds
    );
    Ok(())
}

/// Connect and run one full sync pass
fn run_once(cfg: &Config, logger: &dyn Logger) -> Result<SyncStats> {
    logger.trace("resolving connection string");
    let spec = ConnectSpec::from_env(&cfg.sftp.connection_env)?;

    logger.trace("connecting");
    let session = SftpSession::connect(&spec)?;

    std::fs::create_dir_all(&cfg.sftp.download_path).with_context(|| {
        format!(
            "failed to create download directory {}",
            cfg.sftp.download_path.display()
        )
    })?;

    let opts = SyncOptions {
        read_dir: cfg.sftp.read_path.clone(),
        archive_dir: cfg.sftp.archive_path.clone(),
        download_dir: cfg.sftp.download_path.clone(),
    };
    let stats = sync::run(&session, &opts, logger)?;
    Ok(stats)
}
