use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of filesystem change an operation describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Move,
    Delete,
    Archive,
}

/// Lifecycle of an operation. Transitions are forward-only:
/// `Pending → InProgress → {Completed | Failed}`, with `Skipped` reachable
/// directly from `Pending` for records the user declined. `Completed`,
/// `Failed` and `Skipped` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl OperationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OperationStatus::Completed | OperationStatus::Failed | OperationStatus::Skipped
        )
    }
}

/// One durable, identity-bearing description of a single filesystem mutation.
/// Identity and size are fixed at creation; only `status` ever changes, and
/// only through the journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOperation {
    pub id: Uuid,
    pub source_path: String,
    pub destination_path: String,
    pub operation_type: OperationType,
    pub file_size: i64,
    pub status: OperationStatus,
    pub timestamp: DateTime<Utc>,
}

impl FileOperation {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        operation_type: OperationType,
        file_size: i64,
    ) -> Self {
        FileOperation {
            id: Uuid::new_v4(),
            source_path: source.into(),
            destination_path: destination.into(),
            operation_type,
            file_size,
            status: OperationStatus::Pending,
            timestamp: Utc::now(),
        }
    }
}

/// A bounded unit of journal activity: an ordered set of operations, closed
/// once fully drained. Insertion order is causal order and is preserved by
/// the resume path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalSession {
    pub id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_complete: bool,
    pub operations: Vec<FileOperation>,
}

impl JournalSession {
    pub fn new() -> Self {
        JournalSession {
            id: Uuid::new_v4(),
            start_date: Utc::now(),
            end_date: None,
            is_complete: false,
            operations: Vec::new(),
        }
    }

    /// Operations the resume engine still has to drive: anything not in a
    /// terminal state, in original insertion order.
    pub fn unfinished_operations(&self) -> impl Iterator<Item = &FileOperation> {
        self.operations.iter().filter(|op| !op.status.is_terminal())
    }
}

impl Default for JournalSession {
    fn default() -> Self {
        JournalSession::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_wire_format() {
        let mut op = FileOperation::new("/src/a.bin", "/dst/a.bin", OperationType::Archive, 42);
        op.status = OperationStatus::InProgress;

        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["sourcePath"], "/src/a.bin");
        assert_eq!(json["destinationPath"], "/dst/a.bin");
        assert_eq!(json["operationType"], "archive");
        assert_eq!(json["fileSize"], 42);
        assert_eq!(json["status"], "inProgress");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_session_wire_format() {
        let session = JournalSession::new();
        let json = serde_json::to_value(&session).unwrap();
        assert!(json["startDate"].is_string());
        assert!(json["endDate"].is_null());
        assert_eq!(json["isComplete"], false);
        assert!(json["operations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!OperationStatus::Pending.is_terminal());
        assert!(!OperationStatus::InProgress.is_terminal());
        assert!(OperationStatus::Completed.is_terminal());
        assert!(OperationStatus::Failed.is_terminal());
        assert!(OperationStatus::Skipped.is_terminal());
    }
}
