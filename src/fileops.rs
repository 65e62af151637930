//! Filesystem mutation primitives shared by the router, the cleaner and the
//! resume engine. Every failure is reported as `Error::Mutation` so callers
//! can record a `failed` status instead of unwinding past the batch boundary.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::Error;
use crate::model::{FileOperation, OperationType};

/// Execute the filesystem action for one operation record.
pub fn execute(operation: &FileOperation) -> Result<(), Error> {
    let source = Path::new(&operation.source_path);
    match operation.operation_type {
        OperationType::Move | OperationType::Archive => {
            move_entry(source, Path::new(&operation.destination_path))
        }
        OperationType::Delete => remove_entry(source),
    }
}

/// Move a file or directory, creating the destination's parent tree as
/// needed. Falls back to copy-then-remove when rename fails, which is the
/// normal case for moves onto another volume.
pub fn move_entry(source: &Path, destination: &Path) -> Result<(), Error> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::mutation(parent, e))?;
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            let meta =
                fs::symlink_metadata(source).map_err(|_| Error::mutation(source, rename_err))?;
            debug!(
                "Rename {} -> {} failed, falling back to copy",
                source.display(),
                destination.display()
            );
            if meta.is_dir() {
                copy_tree(source, destination)?;
                fs::remove_dir_all(source).map_err(|e| Error::mutation(source, e))
            } else {
                fs::copy(source, destination).map_err(|e| Error::mutation(destination, e))?;
                fs::remove_file(source).map_err(|e| Error::mutation(source, e))
            }
        }
    }
}

/// Remove a file or directory tree. A missing source is a `Mutation` error;
/// the caller records it as a failed operation rather than crashing.
pub fn remove_entry(path: &Path) -> Result<(), Error> {
    let meta = fs::symlink_metadata(path).map_err(|e| Error::mutation(path, e))?;
    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(|e| Error::mutation(path, e))
    } else {
        fs::remove_file(path).map_err(|e| Error::mutation(path, e))
    }
}

/// Size in bytes of a file, or the aggregate regular-file size of a
/// directory tree. Captured once at operation-creation time.
pub fn entry_size(path: &Path) -> Result<u64, Error> {
    let metadata = fs::metadata(path).map_err(|e| Error::mutation(path, e))?;
    if metadata.is_dir() {
        Ok(walkdir::WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum())
    } else {
        Ok(metadata.len())
    }
}

fn copy_tree(source: &Path, destination: &Path) -> Result<(), Error> {
    fs::create_dir_all(destination).map_err(|e| Error::mutation(destination, e))?;

    let entries = fs::read_dir(source).map_err(|e| Error::mutation(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::mutation(source, e))?;
        let from = entry.path();
        let to = destination.join(entry.file_name());
        let meta = fs::symlink_metadata(&from).map_err(|e| Error::mutation(&from, e))?;

        if meta.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| Error::mutation(&to, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_move_creates_parent_dirs() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("a.txt");
        fs::write(&source, "payload").unwrap();

        let dest = tmp.path().join("deep/nested/b.txt");
        move_entry(&source, &dest).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(dest).unwrap(), "payload");
    }

    #[test]
    fn test_move_missing_source_fails() {
        let tmp = tempdir().unwrap();
        let result = move_entry(&tmp.path().join("ghost"), &tmp.path().join("dst"));
        assert!(matches!(result, Err(Error::Mutation { .. })));
    }

    #[test]
    fn test_remove_directory_tree() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("victim");
        fs::create_dir_all(dir.join("inner")).unwrap();
        fs::write(dir.join("inner/f.bin"), [0u8; 16]).unwrap();

        remove_entry(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_remove_missing_entry_fails() {
        let tmp = tempdir().unwrap();
        let result = remove_entry(&tmp.path().join("ghost"));
        assert!(matches!(result, Err(Error::Mutation { .. })));
    }
}
