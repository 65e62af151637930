mod walk;

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::Error;
use crate::progress::ScanReporter;
use crate::utils;

/// One oversized entry found during a scan. For a directory, `size` is the
/// sum of all descendant regular-file sizes. Transient ranking data, never
/// persisted.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub is_directory: bool,
}

/// Ordered scan output: entries sorted by size descending plus running
/// totals. `total_size` always equals the sum of member sizes, and a reported
/// directory is never also expanded into child entries, so members never
/// overlap.
#[derive(Debug, Default)]
pub struct ScanResults {
    pub entries: Vec<FileEntry>,
    pub total_size: u64,
    pub scanned_count: usize,
}

impl ScanResults {
    fn add(&mut self, entry: FileEntry) {
        self.total_size += entry.size;
        self.scanned_count += 1;
        self.entries.push(entry);
    }

    /// Re-establish the ordering invariant. Stable, so equal sizes keep
    /// discovery order.
    fn sort(&mut self) {
        self.entries.sort_by(|a, b| b.size.cmp(&a.size));
    }
}

/// Size-threshold directory scanner with exclusion-prefix pruning.
pub struct Scanner {
    threshold: u64,
    exclude_paths: Vec<PathBuf>,
}

impl Scanner {
    pub fn new(threshold_bytes: u64, exclude_paths: Vec<PathBuf>) -> Self {
        Scanner {
            threshold: threshold_bytes,
            exclude_paths,
        }
    }

    /// Walk `root` and collect every file or aggregated directory at or above
    /// the size threshold. Fails only if the root itself cannot be opened;
    /// entries that cannot be read along the way are skipped.
    pub fn scan(&self, root: &Path, reporter: &dyn ScanReporter) -> Result<ScanResults, Error> {
        info!(
            "Scanning {} for entries larger than {}",
            root.display(),
            utils::format_bytes(self.threshold)
        );
        reporter.on_scan_start(&root.to_string_lossy());

        let start = Instant::now();
        let mut results = walk::walk_tree(root, self.threshold, &self.exclude_paths, reporter)?;
        results.sort();

        let duration = start.elapsed().as_secs_f64();
        reporter.on_scan_complete(results.entries.len(), duration);
        info!(
            "Scan complete in {:.2}s: {} entries totaling {}",
            duration,
            results.entries.len(),
            utils::format_bytes(results.total_size)
        );

        Ok(results)
    }
}
