use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::model::{FileOperation, JournalSession, OperationStatus};

/// Durable operation log. One JSON document per session, rewritten in full on
/// every mutation; operation counts are small enough that write amplification
/// is a fair trade for a trivially recoverable format.
///
/// The journal is the single owner of the current session's state. All status
/// mutation goes through it, behind one mutex, so there is a total order of
/// transitions per session.
pub struct Journal {
    dir: PathBuf,
    inner: Mutex<CurrentSession>,
}

struct CurrentSession {
    session: JournalSession,
    path: PathBuf,
}

/// Aggregate counts across every stored session file.
#[derive(Debug, Default, Clone, Copy)]
pub struct JournalStats {
    pub sessions: usize,
    pub total_operations: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    pub skipped: usize,
    pub total_bytes: u64,
}

impl Journal {
    /// Open the journal directory and start a fresh current session. The
    /// session file is not written until the first operation is added, so
    /// runs that never mutate anything leave no empty documents behind.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let session = JournalSession::new();
        let path = session_file_path(&dir, &session);
        debug!("Journal opened at {}, session {}", dir.display(), session.id);

        Ok(Journal {
            dir,
            inner: Mutex::new(CurrentSession { session, path }),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append an operation to the current session and flush the document.
    /// The operation is only "added" once the write has succeeded; on a
    /// persistence failure the record is rolled back so a later save cannot
    /// smuggle it in.
    pub fn add_operation(&self, operation: FileOperation) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        debug!(
            "Adding operation {}: {:?} {}",
            operation.id, operation.operation_type, operation.source_path
        );
        inner.session.operations.push(operation);
        if let Err(err) = save(&inner) {
            inner.session.operations.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Overwrite an operation's status and re-persist the session. An unknown
    /// id is logged and ignored; it indicates a caller bug, not a journal
    /// failure. Terminal statuses are frozen.
    pub fn update_status(&self, operation_id: Uuid, status: OperationStatus) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();

        let Some(op) = inner
            .session
            .operations
            .iter_mut()
            .find(|op| op.id == operation_id)
        else {
            warn!("update_status: operation {} not found", operation_id);
            return Ok(());
        };

        if op.status.is_terminal() && op.status != status {
            warn!(
                "update_status: operation {} is already {:?}, refusing {:?}",
                operation_id, op.status, status
            );
            return Ok(());
        }

        op.status = status;
        debug!("Operation {} -> {:?}", operation_id, status);
        save(&inner)
    }

    /// Operations in the current session still waiting to be attempted.
    pub fn pending_operations(&self) -> Vec<FileOperation> {
        let inner = self.inner.lock().unwrap();
        inner
            .session
            .operations
            .iter()
            .filter(|op| op.status == OperationStatus::Pending)
            .cloned()
            .collect()
    }

    /// Snapshot of the current session's state.
    pub fn current_session(&self) -> JournalSession {
        self.inner.lock().unwrap().session.clone()
    }

    /// Stamp the end date, set the completion flag and persist.
    pub fn close_session(&self) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.session.end_date = Some(chrono::Utc::now());
        inner.session.is_complete = true;
        save(&inner)?;
        info!("Session {} closed", inner.session.id);
        Ok(())
    }

    /// Make a previously stored session the current one, so status updates
    /// land back in its own file. Used by the resume path.
    pub fn adopt_session(&self, session: JournalSession) {
        let mut inner = self.inner.lock().unwrap();
        inner.path = session_file_path(&self.dir, &session);
        info!("Adopted session {} ({})", session.id, inner.path.display());
        inner.session = session;
    }

    /// Scan every stored session file for the first one whose completion flag
    /// is false. Malformed files are skipped so one corrupt document cannot
    /// block recovery of the others.
    pub fn load_incomplete_session(&self) -> Result<Option<JournalSession>, Error> {
        let current_path = self.inner.lock().unwrap().path.clone();

        for path in self.session_files()? {
            if path == current_path {
                continue;
            }
            match read_session_file(&path) {
                Ok(session) if !session.is_complete => {
                    info!(
                        "Found incomplete session {} with {} operations",
                        session.id,
                        session.operations.len()
                    );
                    return Ok(Some(session));
                }
                Ok(_) => {}
                Err(err) => warn!("Skipping unreadable session file: {}", err),
            }
        }

        Ok(None)
    }

    /// Aggregate operation counts across all stored sessions.
    pub fn statistics(&self) -> Result<JournalStats, Error> {
        let mut stats = JournalStats::default();

        for path in self.session_files()? {
            let session = match read_session_file(&path) {
                Ok(session) => session,
                Err(err) => {
                    warn!("Skipping unreadable session file: {}", err);
                    continue;
                }
            };

            stats.sessions += 1;
            for op in &session.operations {
                stats.total_operations += 1;
                stats.total_bytes += op.file_size.max(0) as u64;
                match op.status {
                    OperationStatus::Completed => stats.completed += 1,
                    OperationStatus::Failed => stats.failed += 1,
                    OperationStatus::Pending | OperationStatus::InProgress => stats.pending += 1,
                    OperationStatus::Skipped => stats.skipped += 1,
                }
            }
        }

        Ok(stats)
    }

    /// The most recently started sessions on disk, newest first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<JournalSession>, Error> {
        let mut sessions: Vec<JournalSession> = Vec::new();
        for path in self.session_files()? {
            match read_session_file(&path) {
                Ok(session) => sessions.push(session),
                Err(err) => warn!("Skipping unreadable session file: {}", err),
            }
        }
        sessions.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        sessions.truncate(limit);
        Ok(sessions)
    }

    fn session_files(&self) -> Result<Vec<PathBuf>, Error> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        Ok(files)
    }
}

fn session_file_path(dir: &Path, session: &JournalSession) -> PathBuf {
    dir.join(format!("session_{}.json", session.id))
}

fn read_session_file(path: &Path) -> Result<JournalSession, Error> {
    let data = fs::read(path)?;
    serde_json::from_slice(&data).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn save(inner: &CurrentSession) -> Result<(), Error> {
    let data = serde_json::to_vec_pretty(&inner.session)
        .map_err(|e| Error::persistence(&inner.path, io::Error::new(io::ErrorKind::Other, e)))?;
    fs::write(&inner.path, data).map_err(|e| Error::persistence(&inner.path, e))
}
