use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, Utc};
use tracing::info;

use crate::config::AppConfig;
use crate::error::Error;
use crate::fileops;
use crate::journal::Journal;
use crate::model::{FileOperation, OperationStatus, OperationType};
use crate::utils;

/// Where a routed entry should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageTier {
    /// Bulk archive volume, bucketed into `Archive/<year>/<month>/`.
    Archive,
    /// Fast working volume, flat layout.
    Fast,
}

/// Decides destination paths for relocation operations and records them in
/// the journal before the filesystem is touched, so an interrupted move is
/// resumable.
pub struct StorageRouter {
    storage_root: PathBuf,
    fast_root: PathBuf,
}

impl StorageRouter {
    pub fn new(storage_root: impl Into<PathBuf>, fast_root: impl Into<PathBuf>) -> Self {
        StorageRouter {
            storage_root: storage_root.into(),
            fast_root: fast_root.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        StorageRouter::new(&config.storage_path, &config.fast_storage_path)
    }

    /// Compute the final destination for `source`. Archive destinations are
    /// bucketed by the current date, never the file's age. If the computed
    /// path is taken, an epoch-seconds suffix is inserted before the
    /// extension and re-checked until a free name is found. The check-to-move
    /// window is not closed; one foreground process is assumed.
    pub fn route(&self, source: &Path, tier: StorageTier) -> Result<PathBuf, Error> {
        let file_name = source.file_name().ok_or_else(|| {
            Error::mutation(
                source,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;

        let destination = match tier {
            StorageTier::Archive => {
                let now = Local::now();
                self.storage_root
                    .join("Archive")
                    .join(format!("{:04}", now.year()))
                    .join(format!("{:02}", now.month()))
                    .join(file_name)
            }
            StorageTier::Fast => self.fast_root.join(file_name),
        };

        Ok(resolve_collision(destination))
    }

    /// Move `source` into the archive bucket, journaled end to end.
    /// Returns the resolved destination.
    pub fn move_to_archive(&self, journal: &Journal, source: &Path) -> Result<PathBuf, Error> {
        self.relocate(journal, source, StorageTier::Archive, OperationType::Archive)
    }

    /// Move `source` onto the fast-storage volume, journaled end to end.
    pub fn move_to_fast_storage(&self, journal: &Journal, source: &Path) -> Result<PathBuf, Error> {
        self.relocate(journal, source, StorageTier::Fast, OperationType::Move)
    }

    fn relocate(
        &self,
        journal: &Journal,
        source: &Path,
        tier: StorageTier,
        op_type: OperationType,
    ) -> Result<PathBuf, Error> {
        let destination = self.route(source, tier)?;
        let size = fileops::entry_size(source)?;

        // Journal pending → inProgress before touching the filesystem, so a
        // crash mid-move leaves a resumable record.
        let operation = FileOperation::new(
            source.to_string_lossy(),
            destination.to_string_lossy(),
            op_type,
            size as i64,
        );
        let op_id = operation.id;
        journal.add_operation(operation)?;
        journal.update_status(op_id, OperationStatus::InProgress)?;

        info!(
            "Moving {} to {} ({})",
            source.display(),
            destination.display(),
            utils::format_bytes(size)
        );

        match fileops::move_entry(source, &destination) {
            Ok(()) => {
                journal.update_status(op_id, OperationStatus::Completed)?;
                Ok(destination)
            }
            Err(err) => {
                journal.update_status(op_id, OperationStatus::Failed)?;
                Err(err)
            }
        }
    }

    /// Existence checks only; capacity rendering belongs to the display layer.
    pub fn volumes_available(&self) -> (bool, bool) {
        (self.storage_root.exists(), self.fast_root.exists())
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn fast_root(&self) -> &Path {
        &self.fast_root
    }
}

/// Insert `_<epochSeconds>` between stem and extension until the candidate
/// does not exist. The suffix is bumped when two renames land in the same
/// second.
fn resolve_collision(destination: PathBuf) -> PathBuf {
    if !destination.exists() {
        return destination;
    }

    let parent = destination.parent().map(Path::to_path_buf).unwrap_or_default();
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = destination
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut epoch = Utc::now().timestamp();
    loop {
        let candidate = parent.join(format!("{stem}_{epoch}{extension}"));
        if !candidate.exists() {
            return candidate;
        }
        epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_archive_route_is_bucketed_by_current_date() {
        let tmp = tempdir().unwrap();
        let router = StorageRouter::new(tmp.path().join("hdd"), tmp.path().join("nvme"));

        let dest = router
            .route(Path::new("/somewhere/video.mkv"), StorageTier::Archive)
            .unwrap();

        let now = Local::now();
        let expected = tmp
            .path()
            .join("hdd")
            .join("Archive")
            .join(format!("{:04}", now.year()))
            .join(format!("{:02}", now.month()))
            .join("video.mkv");
        assert_eq!(dest, expected);
    }

    #[test]
    fn test_fast_route_is_flat() {
        let tmp = tempdir().unwrap();
        let router = StorageRouter::new(tmp.path().join("hdd"), tmp.path().join("nvme"));

        let dest = router
            .route(Path::new("/somewhere/video.mkv"), StorageTier::Fast)
            .unwrap();
        assert_eq!(dest, tmp.path().join("nvme").join("video.mkv"));
    }

    #[test]
    fn test_collision_appends_epoch_suffix() {
        let tmp = tempdir().unwrap();
        let fast = tmp.path().join("nvme");
        fs::create_dir_all(&fast).unwrap();
        fs::write(fast.join("photo.jpg"), "existing").unwrap();

        let router = StorageRouter::new(tmp.path().join("hdd"), &fast);
        let dest = router
            .route(Path::new("/somewhere/photo.jpg"), StorageTier::Fast)
            .unwrap();

        assert!(!dest.exists());
        let name = dest.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("photo_"));
        assert!(name.ends_with(".jpg"));
        let suffix = &name["photo_".len()..name.len() - ".jpg".len()];
        assert!(suffix.parse::<i64>().is_ok(), "suffix was {suffix}");
    }

    #[test]
    fn test_move_to_fast_storage_journals_and_moves() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("work.dmg");
        fs::write(&source, [0u8; 128]).unwrap();

        let journal = Journal::open(tmp.path().join("journal")).unwrap();
        let router = StorageRouter::new(tmp.path().join("hdd"), tmp.path().join("nvme"));

        let dest = router.move_to_fast_storage(&journal, &source).unwrap();
        assert!(!source.exists());
        assert!(dest.exists());

        let session = journal.current_session();
        assert_eq!(session.operations.len(), 1);
        let op = &session.operations[0];
        assert_eq!(op.operation_type, OperationType::Move);
        assert_eq!(op.status, OperationStatus::Completed);
        assert_eq!(op.file_size, 128);
    }

    #[test]
    fn test_missing_source_errors_before_journaling() {
        let tmp = tempdir().unwrap();
        let journal = Journal::open(tmp.path().join("journal")).unwrap();
        let router = StorageRouter::new(tmp.path().join("hdd"), tmp.path().join("nvme"));

        let result = router.move_to_archive(&journal, &tmp.path().join("ghost.iso"));
        assert!(result.is_err());
        // Nothing journaled: the source could not even be sized.
        assert!(journal.current_session().operations.is_empty());
    }
}
