use colored::*;

use tidy_up::cleaner::CleanReport;
use tidy_up::journal::JournalStats;
use tidy_up::utils::{format_bytes, relative_time};
use tidy_up::{AppConfig, JournalSession, ResumeReport, ScanResults, StorageRouter};

const GB: u64 = 1_000_000_000;

pub fn show_scan_results(results: &ScanResults) {
    if results.entries.is_empty() {
        println!("\nNo entries above the threshold.");
        return;
    }

    println!("\n{}\n", "Large files and directories".bold());
    for (index, entry) in results.entries.iter().enumerate() {
        let size = if entry.size >= GB {
            format_bytes(entry.size).red().bold()
        } else {
            format_bytes(entry.size).yellow()
        };
        let kind = if entry.is_directory { "DIR " } else { "    " };
        println!(
            "{:>4}. {:>10}  {}{}  ({})",
            index + 1,
            size,
            kind.cyan(),
            entry.path.display(),
            relative_time(entry.last_modified).dimmed()
        );
    }
    println!(
        "\n{} entries, {} total",
        results.scanned_count,
        format_bytes(results.total_size).bold()
    );
}

pub fn show_clean_report(report: &CleanReport, dry_run: bool) {
    let verb = if dry_run { "Would free" } else { "Freed" };
    println!(
        "\n{} removed, {} skipped, {} failed. {} {}.",
        report.removed.to_string().green(),
        report.skipped.to_string().yellow(),
        report.failed.to_string().red(),
        verb,
        format_bytes(report.bytes_freed).bold()
    );
}

pub fn show_resume_report(report: &ResumeReport) {
    println!(
        "\nResume finished: {} attempted, {} completed, {} failed",
        report.attempted,
        report.completed.to_string().green(),
        report.failed.to_string().red()
    );
}

pub fn show_status(router: &StorageRouter, incomplete: Option<&JournalSession>) {
    let (storage_ok, fast_ok) = router.volumes_available();

    println!("\n{}\n", "Storage Status".bold());
    print_volume("Archive storage", router.storage_root().display(), storage_ok);
    print_volume("Fast storage", router.fast_root().display(), fast_ok);

    match incomplete {
        Some(session) => println!(
            "\n{} Incomplete session {} from {} ({} operations). Run `tidy-up resume`.",
            "!".yellow().bold(),
            session.id,
            session.start_date.format("%Y-%m-%d %H:%M"),
            session.operations.len()
        ),
        None => println!("\nNo incomplete sessions."),
    }
}

fn print_volume(name: &str, path: impl std::fmt::Display, mounted: bool) {
    let state = if mounted {
        "mounted".green()
    } else {
        "not mounted".red()
    };
    println!("  {:<16} {} ({})", name, path, state);
}

pub fn show_stats(stats: &JournalStats, recent: &[JournalSession]) {
    println!("\n{}\n", "Operation Statistics".bold());
    println!("Sessions:         {}", stats.sessions);
    println!("Total operations: {}", stats.total_operations);
    println!("Completed:        {}", stats.completed.to_string().green());
    println!("Failed:           {}", stats.failed.to_string().red());
    println!("Pending:          {}", stats.pending.to_string().yellow());
    println!("Skipped:          {}", stats.skipped);
    println!("Total size:       {}", format_bytes(stats.total_bytes).bold());

    if !recent.is_empty() {
        println!("\n{}\n", "Recent sessions".bold());
        for session in recent {
            let state = if session.is_complete {
                "complete".green()
            } else {
                "incomplete".yellow()
            };
            println!(
                "  {}  {}  {} operations ({})",
                session.start_date.format("%Y-%m-%d %H:%M"),
                session.id,
                session.operations.len(),
                state
            );
        }
    }
}

pub fn show_config(config: &AppConfig) {
    println!("\n{}\n", "Current Configuration".bold());
    println!("Storage path:      {}", config.storage_path);
    println!("Fast storage path: {}", config.fast_storage_path);
    println!("Default threshold: {} MB", config.default_threshold_mb);
    println!("Exclude paths:     {} paths", config.exclude_paths.len());
    println!(
        "Auto-archive old:  {}",
        if config.auto_archive_old_files { "yes" } else { "no" }
    );
    if config.auto_archive_old_files {
        println!("Archive age:       {} days", config.archive_older_than_days);
    }
    println!("Journal dir:       {}", config.journal_dir);
    println!(
        "\nConfig file: {}",
        tidy_up::config::config_file_path().display()
    );
}
