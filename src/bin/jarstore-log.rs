//! jarstore log tool
//!
//! Inspects and compacts a cookie log file.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use jarstore::log::LogRecord;
use jarstore::{EntryRepository, FileEntryRepository, LogConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// Cookie log maintenance
#[derive(Parser, Debug)]
#[command(name = "jarstore-log")]
#[command(about = "Inspect and compact a jarstore cookie log")]
#[command(version)]
struct Args {
    /// Log file
    file: PathBuf,

    /// Temporary file suffix used by compaction
    #[arg(long, default_value = ".tmp")]
    tmp_suffix: String,

    /// Backup file suffix used by compaction (empty disables the backup)
    #[arg(long, default_value = "~")]
    backup_suffix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print record counts
    Stats,

    /// Rewrite the log to its live records
    Compact,

    /// Print live entries as JSON lines
    Dump {
        /// Only entries under this jar key
        #[arg(short, long)]
        key: Option<String>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,jarstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> jarstore::Result<()> {
    let config = LogConfig::builder()
        .path(&args.file)
        .tmp_suffix(args.tmp_suffix)
        .backup_suffix(args.backup_suffix)
        .build();
    let repo = FileEntryRepository::open(config)?;

    match args.command {
        Commands::Stats => {
            let stats = repo.stats()?;
            println!("records:    {}", stats.records);
            println!("upserts:    {}", stats.upserts);
            println!("tombstones: {}", stats.tombstones);
            println!("live:       {}", stats.live);
        }
        Commands::Compact => {
            let stats = repo.compact()?;
            println!(
                "compacted {}: {} -> {} records",
                repo.path().display(),
                stats.records_before,
                stats.records_after
            );
        }
        Commands::Dump { key } => {
            let entries = match key {
                Some(key) => repo.find(&key).collect_all()?,
                None => repo.entries()?,
            };
            let mut out = io::stdout().lock();
            let mut line = Vec::new();
            for entry in &entries {
                line.clear();
                LogRecord::upsert(entry).encode_line(&mut line)?;
                out.write_all(&line)?;
            }
            out.flush()?;
        }
    }
    Ok(())
}
