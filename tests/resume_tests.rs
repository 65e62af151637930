use std::fs;
use std::path::Path;

use tempfile::tempdir;

use tidy_up::{
    resume_session, FileOperation, Journal, OperationStatus, OperationType,
};

/// Stage a journal left behind by an interrupted run:
///   op1: delete of `survivor`, already completed (file still on disk)
///   op2: move of `moved.bin`, caught mid-flight as inProgress
///   op3: delete of a path that no longer exists, still pending
///   op4: delete of `stale.bin`, still pending
fn stage_interrupted_run(root: &Path, journal_dir: &Path) -> [uuid::Uuid; 4] {
    let survivor = root.join("survivor.bin");
    let moved = root.join("moved.bin");
    let stale = root.join("stale.bin");
    fs::write(&survivor, [1u8; 64]).unwrap();
    fs::write(&moved, [2u8; 64]).unwrap();
    fs::write(&stale, [3u8; 64]).unwrap();

    let journal = Journal::open(journal_dir).unwrap();

    let op1 = FileOperation::new(
        survivor.to_string_lossy(),
        "",
        OperationType::Delete,
        64,
    );
    let op2 = FileOperation::new(
        moved.to_string_lossy(),
        root.join("archive/moved.bin").to_string_lossy(),
        OperationType::Move,
        64,
    );
    let op3 = FileOperation::new(
        root.join("already-gone.bin").to_string_lossy(),
        "",
        OperationType::Delete,
        64,
    );
    let op4 = FileOperation::new(stale.to_string_lossy(), "", OperationType::Delete, 64);
    let ids = [op1.id, op2.id, op3.id, op4.id];

    journal.add_operation(op1).unwrap();
    journal.add_operation(op2).unwrap();
    journal.add_operation(op3).unwrap();
    journal.add_operation(op4).unwrap();

    // op1 finished before the crash; op2 was being executed.
    journal.update_status(ids[0], OperationStatus::Completed).unwrap();
    journal.update_status(ids[1], OperationStatus::InProgress).unwrap();

    // Dropped without close_session: the session stays incomplete on disk.
    ids
}

#[test]
fn test_resume_drains_interrupted_session() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("data");
    let journal_dir = tmp.path().join("journal");
    fs::create_dir_all(&root).unwrap();

    let ids = stage_interrupted_run(&root, &journal_dir);

    // A fresh process discovers the orphaned session and drains it.
    let journal = Journal::open(&journal_dir).unwrap();
    let session = journal.load_incomplete_session().unwrap().unwrap();
    assert_eq!(session.operations.len(), 4);

    let report = resume_session(&journal, session).unwrap();
    assert_eq!(report.attempted, 3, "completed record must not be re-driven");
    assert_eq!(report.completed, 2);
    assert_eq!(report.failed, 1);

    // The already-completed delete was not re-executed.
    assert!(root.join("survivor.bin").exists());
    // The in-progress move was retried to completion.
    assert!(!root.join("moved.bin").exists());
    assert!(root.join("archive/moved.bin").exists());
    // The pending delete ran.
    assert!(!root.join("stale.bin").exists());

    let drained = journal.current_session();
    assert!(drained.is_complete);
    assert!(drained.end_date.is_some());
    let status_of = |id| {
        drained
            .operations
            .iter()
            .find(|op| op.id == id)
            .unwrap()
            .status
    };
    assert_eq!(status_of(ids[0]), OperationStatus::Completed);
    assert_eq!(status_of(ids[1]), OperationStatus::Completed);
    assert_eq!(status_of(ids[2]), OperationStatus::Failed);
    assert_eq!(status_of(ids[3]), OperationStatus::Completed);
}

#[test]
fn test_resume_is_idempotent() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("data");
    let journal_dir = tmp.path().join("journal");
    fs::create_dir_all(&root).unwrap();

    stage_interrupted_run(&root, &journal_dir);

    let journal = Journal::open(&journal_dir).unwrap();
    let session = journal.load_incomplete_session().unwrap().unwrap();
    resume_session(&journal, session).unwrap();

    // Nothing incomplete remains to discover.
    let journal2 = Journal::open(&journal_dir).unwrap();
    assert!(journal2.load_incomplete_session().unwrap().is_none());

    // Forcing a second resume of the drained session is a no-op.
    let drained = journal.current_session();
    let report = resume_session(&journal2, drained).unwrap();
    assert_eq!(report.attempted, 0);
    assert_eq!(report.completed, 0);
    assert_eq!(report.failed, 0);
    assert!(journal2.current_session().is_complete);
    assert!(root.join("survivor.bin").exists());
    assert!(root.join("archive/moved.bin").exists());
}

#[test]
fn test_failed_records_are_not_retried() {
    let tmp = tempdir().unwrap();
    let journal_dir = tmp.path().join("journal");

    let missing = tmp.path().join("never-existed.bin");
    {
        let journal = Journal::open(&journal_dir).unwrap();
        let op = FileOperation::new(missing.to_string_lossy(), "", OperationType::Delete, 10);
        journal.add_operation(op).unwrap();
    }

    let journal = Journal::open(&journal_dir).unwrap();
    let session = journal.load_incomplete_session().unwrap().unwrap();
    let report = resume_session(&journal, session).unwrap();
    assert_eq!(report.failed, 1);

    // One resume pass only: the failed record is terminal now.
    let drained = journal.current_session();
    let second = resume_session(&journal, drained).unwrap();
    assert_eq!(second.attempted, 0);
}
