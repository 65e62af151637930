use tracing::{error, info};

use crate::error::Error;
use crate::fileops;
use crate::journal::Journal;
use crate::model::{JournalSession, OperationStatus};

/// Outcome of draining one session.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResumeReport {
    pub attempted: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Re-drive every non-terminal operation of an interrupted session, in its
/// original insertion order, then close the session.
///
/// Each record is marked `inProgress` before its filesystem action and
/// `completed`/`failed` after, so a crash mid-resume leaves the journal in a
/// state this same function can pick up again. One failed record never stops
/// the rest of the batch, and a session whose records are all terminal
/// resumes as a no-op.
pub fn resume_session(journal: &Journal, session: JournalSession) -> Result<ResumeReport, Error> {
    info!(
        "Resuming session {} with {} operations",
        session.id,
        session.operations.len()
    );
    journal.adopt_session(session.clone());

    let mut report = ResumeReport::default();

    for operation in session.unfinished_operations() {
        info!(
            "Resuming {:?} of {}",
            operation.operation_type, operation.source_path
        );
        journal.update_status(operation.id, OperationStatus::InProgress)?;
        report.attempted += 1;

        match fileops::execute(operation) {
            Ok(()) => {
                journal.update_status(operation.id, OperationStatus::Completed)?;
                report.completed += 1;
            }
            Err(err) => {
                error!("Operation {} failed: {}", operation.id, err);
                journal.update_status(operation.id, OperationStatus::Failed)?;
                report.failed += 1;
            }
        }
    }

    journal.close_session()?;
    info!(
        "Resume finished: {} attempted, {} completed, {} failed",
        report.attempted, report.completed, report.failed
    );
    Ok(report)
}
