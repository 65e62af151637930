use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config;
use crate::error::Error;
use crate::fileops;
use crate::journal::Journal;
use crate::model::{FileOperation, OperationStatus, OperationType};
use crate::utils;

/// Cache-name prefixes that must survive a cleanup.
const PROTECTED_PREFIXES: &[&str] = &[
    "com.apple.KeyboardServices",
    "com.apple.accountsd",
    "com.apple.cloud",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct CleanReport {
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_freed: u64,
}

/// Removes user cache and log entries, journaling each deletion so an
/// interrupted cleanup resumes like any other batch. Dry runs report what
/// would be freed without touching the journal or the filesystem.
pub struct CacheCleaner<'a> {
    journal: &'a Journal,
    dry_run: bool,
    cache_roots: Vec<PathBuf>,
}

impl<'a> CacheCleaner<'a> {
    pub fn new(journal: &'a Journal, dry_run: bool) -> Self {
        CacheCleaner {
            journal,
            dry_run,
            cache_roots: user_cache_roots(),
        }
    }

    pub fn with_cache_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.cache_roots = roots;
        self
    }

    /// Add extra roots (typically [`system_cache_roots`]) to the cleanup.
    /// Callers are responsible for checking they may write there.
    pub fn with_extra_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.cache_roots.extend(roots);
        self
    }

    /// Clean every configured cache root. `approve` is consulted per item;
    /// a declined item is journaled as `skipped` and left in place.
    pub fn clean<F>(&self, mut approve: F) -> Result<CleanReport, Error>
    where
        F: FnMut(&Path, u64) -> bool,
    {
        info!(
            "Starting cache cleanup{}",
            if self.dry_run { " (dry run)" } else { "" }
        );
        let mut report = CleanReport::default();

        for root in &self.cache_roots {
            if !root.exists() {
                continue;
            }
            debug!("Checking {}", root.display());

            let entries = match fs::read_dir(root) {
                Ok(entries) => entries,
                Err(err) => {
                    error!("Failed to read directory {}: {}", root.display(), err);
                    continue;
                }
            };

            for entry in entries.flatten() {
                let path = entry.path();
                if is_hidden(&path) || is_protected(&path) {
                    continue;
                }

                let size = match fileops::entry_size(&path) {
                    Ok(size) => size,
                    Err(err) => {
                        warn!("Failed to size {}: {}", path.display(), err);
                        continue;
                    }
                };

                if self.dry_run {
                    info!(
                        "Would remove: {} ({})",
                        path.display(),
                        utils::format_bytes(size)
                    );
                    report.removed += 1;
                    report.bytes_freed += size;
                    continue;
                }

                self.remove_item(&path, size, &mut approve, &mut report)?;
            }
        }

        info!(
            "Cache cleanup complete. {} {}",
            if self.dry_run { "Would free" } else { "Freed" },
            utils::format_bytes(report.bytes_freed)
        );
        Ok(report)
    }

    fn remove_item<F>(
        &self,
        path: &Path,
        size: u64,
        approve: &mut F,
        report: &mut CleanReport,
    ) -> Result<(), Error>
    where
        F: FnMut(&Path, u64) -> bool,
    {
        let operation =
            FileOperation::new(path.to_string_lossy(), "", OperationType::Delete, size as i64);
        let op_id = operation.id;
        self.journal.add_operation(operation)?;

        if !approve(path, size) {
            self.journal.update_status(op_id, OperationStatus::Skipped)?;
            report.skipped += 1;
            return Ok(());
        }

        self.journal.update_status(op_id, OperationStatus::InProgress)?;
        match fileops::remove_entry(path) {
            Ok(()) => {
                self.journal.update_status(op_id, OperationStatus::Completed)?;
                info!("Removed: {} ({})", path.display(), utils::format_bytes(size));
                report.removed += 1;
                report.bytes_freed += size;
            }
            Err(err) => {
                warn!("Failed to remove {}: {}", path.display(), err);
                self.journal.update_status(op_id, OperationStatus::Failed)?;
                report.failed += 1;
            }
        }
        Ok(())
    }
}

pub fn user_cache_roots() -> Vec<PathBuf> {
    let home = config::home_dir();
    vec![
        home.join("Library/Caches"),
        home.join("Library/Logs"),
        home.join("Library/Application Support/CrashReporter"),
    ]
}

/// Machine-wide cache locations. Writable by root only; the CLI refuses to
/// clean these without elevation.
pub fn system_cache_roots() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/Library/Caches"),
        PathBuf::from("/System/Library/Caches"),
    ]
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_protected(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    PROTECTED_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seed_cache(root: &Path) {
        fs::create_dir_all(root).unwrap();
        fs::write(root.join("stale.db"), [0u8; 100]).unwrap();
        let nested = root.join("SomeApp");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("blob.bin"), [0u8; 50]).unwrap();
    }

    #[test]
    fn test_clean_removes_and_journals() {
        let tmp = tempdir().unwrap();
        let cache = tmp.path().join("Caches");
        seed_cache(&cache);

        let journal = Journal::open(tmp.path().join("journal")).unwrap();
        let report = CacheCleaner::new(&journal, false)
            .with_cache_roots(vec![cache.clone()])
            .clean(|_, _| true)
            .unwrap();

        assert_eq!(report.removed, 2);
        assert_eq!(report.bytes_freed, 150);
        assert!(!cache.join("stale.db").exists());
        assert!(!cache.join("SomeApp").exists());

        let session = journal.current_session();
        assert_eq!(session.operations.len(), 2);
        assert!(session
            .operations
            .iter()
            .all(|op| op.status == OperationStatus::Completed
                && op.operation_type == OperationType::Delete));
    }

    #[test]
    fn test_extra_roots_share_the_journaled_flow() {
        let tmp = tempdir().unwrap();
        let user = tmp.path().join("user/Caches");
        let system = tmp.path().join("system/Caches");
        seed_cache(&user);
        fs::create_dir_all(&system).unwrap();
        fs::write(system.join("daemon.cache"), [0u8; 200]).unwrap();
        fs::write(system.join("com.apple.cloud.docs"), [0u8; 30]).unwrap();

        let journal = Journal::open(tmp.path().join("journal")).unwrap();
        let report = CacheCleaner::new(&journal, false)
            .with_cache_roots(vec![user.clone()])
            .with_extra_roots(vec![system.clone()])
            .clean(|_, _| true)
            .unwrap();

        assert_eq!(report.removed, 3);
        assert_eq!(report.bytes_freed, 350);
        assert!(!system.join("daemon.cache").exists());
        // Protected prefixes hold in every root.
        assert!(system.join("com.apple.cloud.docs").exists());

        let session = journal.current_session();
        assert_eq!(session.operations.len(), 3);
        assert!(session
            .operations
            .iter()
            .all(|op| op.status == OperationStatus::Completed
                && op.operation_type == OperationType::Delete));
    }

    #[test]
    fn test_declined_item_is_skipped() {
        let tmp = tempdir().unwrap();
        let cache = tmp.path().join("Caches");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("keep.db"), [0u8; 40]).unwrap();

        let journal = Journal::open(tmp.path().join("journal")).unwrap();
        let report = CacheCleaner::new(&journal, false)
            .with_cache_roots(vec![cache.clone()])
            .clean(|_, _| false)
            .unwrap();

        assert_eq!(report.removed, 0);
        assert_eq!(report.skipped, 1);
        assert!(cache.join("keep.db").exists());

        let session = journal.current_session();
        assert_eq!(session.operations[0].status, OperationStatus::Skipped);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let tmp = tempdir().unwrap();
        let cache = tmp.path().join("Caches");
        seed_cache(&cache);

        let journal = Journal::open(tmp.path().join("journal")).unwrap();
        let report = CacheCleaner::new(&journal, true)
            .with_cache_roots(vec![cache.clone()])
            .clean(|_, _| true)
            .unwrap();

        assert_eq!(report.removed, 2);
        assert_eq!(report.bytes_freed, 150);
        assert!(cache.join("stale.db").exists());
        assert!(journal.current_session().operations.is_empty());
    }

    #[test]
    fn test_protected_caches_survive() {
        let tmp = tempdir().unwrap();
        let cache = tmp.path().join("Caches");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("com.apple.accountsd.cache"), [0u8; 10]).unwrap();

        let journal = Journal::open(tmp.path().join("journal")).unwrap();
        let report = CacheCleaner::new(&journal, false)
            .with_cache_roots(vec![cache.clone()])
            .clean(|_, _| true)
            .unwrap();

        assert_eq!(report.removed, 0);
        assert!(cache.join("com.apple.accountsd.cache").exists());
    }
}
