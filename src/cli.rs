use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tidy-up")]
#[command(about = "Disk housekeeping with a crash-safe operation journal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan for large files and directories
    Scan(ScanArgs),
    /// Clean user caches and logs
    Clean(CleanArgs),
    /// Move paths to archive or fast storage
    Archive(ArchiveArgs),
    /// Resume a previously interrupted session
    Resume,
    /// Show storage volume and journal status
    Status,
    /// Show statistics from recorded sessions
    Stats(StatsArgs),
    /// Show or modify configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Minimum size in MB to report
    #[arg(short, long)]
    pub threshold: Option<u64>,

    /// Path to scan (default: home directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Include system paths normally excluded from the walk
    #[arg(long)]
    pub include_system: bool,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Show what would be cleaned without actually cleaning
    #[arg(short, long)]
    pub dry_run: bool,

    /// Remove everything without prompting per item
    #[arg(short, long)]
    pub yes: bool,

    /// Also clean machine-wide cache locations (requires root)
    #[arg(long)]
    pub system: bool,
}

#[derive(Debug, Args)]
pub struct ArchiveArgs {
    /// Paths to relocate
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Route to fast storage instead of the archive volume
    #[arg(long)]
    pub fast: bool,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Number of recent sessions to list
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Reset to default configuration
    #[arg(long)]
    pub reset: bool,

    /// Set storage path
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Set fast storage path
    #[arg(long)]
    pub fast_storage_path: Option<String>,

    /// Set default threshold (MB)
    #[arg(long)]
    pub threshold: Option<u64>,
}
