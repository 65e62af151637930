use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanResults};
use crate::error::Error;
use crate::progress::ScanReporter;

/// Depth-first traversal. Hidden entries are always skipped, excluded
/// prefixes prune whole subtrees, and a directory whose aggregate size
/// clears the threshold is emitted as one unit with its descendants pruned
/// from the outer walk. Only the root being unreadable is fatal; any other
/// unreadable entry is skipped.
pub(super) fn walk_tree(
    root: &Path,
    threshold: u64,
    exclude_paths: &[PathBuf],
    reporter: &dyn ScanReporter,
) -> Result<ScanResults, Error> {
    fs::read_dir(root).map_err(|source| Error::Access {
        path: root.to_path_buf(),
        source,
    })?;

    let mut results = ScanResults::default();
    let mut walker = WalkDir::new(root).min_depth(1).into_iter();

    loop {
        let entry = match walker.next() {
            None => break,
            Some(Ok(entry)) => entry,
            Some(Err(err)) => {
                debug!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        let path = entry.path();

        if is_hidden(&entry) || is_excluded(path, exclude_paths) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        if entry.file_type().is_dir() {
            let size = directory_size(path);
            if size >= threshold {
                results.add(FileEntry {
                    path: path.to_path_buf(),
                    size,
                    last_modified: entry_modified(&entry),
                    is_directory: true,
                });
                report_found(&results, path, reporter);
                // The directory is reported as a single unit; its interior
                // files must not also surface.
                walker.skip_current_dir();
            }
        } else if entry.file_type().is_file() {
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    debug!("Skipping {}: {}", path.display(), err);
                    continue;
                }
            };
            if metadata.len() >= threshold {
                results.add(FileEntry {
                    path: path.to_path_buf(),
                    size: metadata.len(),
                    last_modified: modified_or_now(metadata.modified().ok()),
                    is_directory: false,
                });
                report_found(&results, path, reporter);
            }
        }
    }

    Ok(results)
}

/// Total size of all non-hidden regular files under `dir`. Unreadable
/// entries contribute nothing; the summation is a parallel reduction.
fn directory_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
        .filter_map(|entry| entry.ok())
        .par_bridge()
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_excluded(path: &Path, exclude_paths: &[PathBuf]) -> bool {
    exclude_paths.iter().any(|prefix| path.starts_with(prefix))
}

fn entry_modified(entry: &DirEntry) -> DateTime<Utc> {
    modified_or_now(entry.metadata().ok().and_then(|m| m.modified().ok()))
}

fn modified_or_now(modified: Option<std::time::SystemTime>) -> DateTime<Utc> {
    modified.map(DateTime::<Utc>::from).unwrap_or_else(Utc::now)
}

fn report_found(results: &ScanResults, path: &Path, reporter: &dyn ScanReporter) {
    let found = results.entries.len();
    reporter.on_entry_found(found, &path.to_string_lossy());
    if found % 10 == 0 {
        debug!("Found {} large entries so far...", found);
    }
}
