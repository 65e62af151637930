mod cli;
mod display;
mod logging;
mod reporter;

use std::process;

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{CommandFactory, Parser};
use cli::{ArchiveArgs, Cli, CleanArgs, Commands, ConfigArgs, ScanArgs, StatsArgs};
use dotenv::dotenv;
use reporter::CliReporter;
use tidy_up::cleaner::{system_cache_roots, CacheCleaner};
use tidy_up::utils::{format_bytes, is_elevated, prompt_confirm};
use tidy_up::{resume_session, AppConfig, Journal, Scanner, StorageRouter};
use tracing::{error, info, warn};

fn main() -> Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Scan(scan_args)) => {
            if let Err(err) = run_scan(&config, &scan_args) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::Clean(clean_args)) => {
            if let Err(err) = run_clean(&config, &clean_args) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::Archive(archive_args)) => {
            if let Err(err) = run_archive(&config, &archive_args) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::Resume) => {
            if let Err(err) = run_resume(&config) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::Status) => {
            if let Err(err) = run_status(&config) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::Stats(stats_args)) => {
            if let Err(err) = run_stats(&config, &stats_args) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::Config(config_args)) => {
            if let Err(err) = run_config(config, &config_args) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_scan(config: &AppConfig, args: &ScanArgs) -> Result<()> {
    let root = args
        .path
        .clone()
        .unwrap_or_else(tidy_up::config::home_dir);

    let scanner = Scanner::new(
        config.threshold_bytes(args.threshold),
        config.exclusions(args.include_system),
    );
    let results = scanner.scan(&root, &CliReporter::new())?;

    display::show_scan_results(&results);

    if config.auto_archive_old_files {
        let cutoff = Utc::now() - Duration::days(config.archive_older_than_days);
        let candidates = results
            .entries
            .iter()
            .filter(|entry| entry.last_modified < cutoff)
            .count();
        if candidates > 0 {
            info!(
                "{} entries older than {} days are archive candidates",
                candidates, config.archive_older_than_days
            );
        }
    }

    Ok(())
}

fn run_clean(config: &AppConfig, args: &CleanArgs) -> Result<()> {
    if args.system && !args.dry_run && !is_elevated() {
        anyhow::bail!("cleaning system caches requires running as root");
    }

    let journal = Journal::open(&config.journal_dir)?;
    let mut cleaner = CacheCleaner::new(&journal, args.dry_run);
    if args.system {
        cleaner = cleaner.with_extra_roots(system_cache_roots());
    }

    let assume_yes = args.yes;
    let report = cleaner.clean(|path, size| {
        if assume_yes {
            return true;
        }
        prompt_confirm(
            &format!("Remove {} ({})?", path.display(), format_bytes(size)),
            Some(false),
        )
        .unwrap_or(false)
    })?;

    if !args.dry_run {
        journal.close_session()?;
    }
    display::show_clean_report(&report, args.dry_run);
    Ok(())
}

fn run_archive(config: &AppConfig, args: &ArchiveArgs) -> Result<()> {
    let journal = Journal::open(&config.journal_dir)?;
    let router = StorageRouter::from_config(config);

    let mut failures = 0usize;
    for path in &args.paths {
        let moved = if args.fast {
            router.move_to_fast_storage(&journal, path)
        } else {
            router.move_to_archive(&journal, path)
        };
        match moved {
            Ok(destination) => info!("{} -> {}", path.display(), destination.display()),
            Err(err) => {
                warn!("Could not move {}: {}", path.display(), err);
                failures += 1;
            }
        }
    }

    journal.close_session()?;
    if failures > 0 {
        anyhow::bail!("{} of {} moves failed", failures, args.paths.len());
    }
    Ok(())
}

fn run_resume(config: &AppConfig) -> Result<()> {
    let journal = Journal::open(&config.journal_dir)?;

    match journal.load_incomplete_session()? {
        None => {
            println!("No incomplete sessions found");
            Ok(())
        }
        Some(session) => {
            println!("Resuming session from {}", session.start_date);
            let report = resume_session(&journal, session)?;
            display::show_resume_report(&report);
            Ok(())
        }
    }
}

fn run_status(config: &AppConfig) -> Result<()> {
    let journal = Journal::open(&config.journal_dir)?;
    let router = StorageRouter::from_config(config);
    let incomplete = journal.load_incomplete_session()?;

    display::show_status(&router, incomplete.as_ref());
    Ok(())
}

fn run_stats(config: &AppConfig, args: &StatsArgs) -> Result<()> {
    let journal = Journal::open(&config.journal_dir)?;
    let stats = journal.statistics()?;
    let recent = journal.recent_sessions(args.limit)?;

    display::show_stats(&stats, &recent);
    Ok(())
}

fn run_config(mut config: AppConfig, args: &ConfigArgs) -> Result<()> {
    if args.reset {
        let config = AppConfig::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut modified = false;

    if let Some(storage) = &args.storage_path {
        config.storage_path = storage.clone();
        modified = true;
    }
    if let Some(fast) = &args.fast_storage_path {
        config.fast_storage_path = fast.clone();
        modified = true;
    }
    if let Some(threshold) = args.threshold {
        config.default_threshold_mb = threshold;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if args.show || !modified {
        display::show_config(&config);
    }

    Ok(())
}
