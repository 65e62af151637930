pub mod cleaner;
pub mod config;
pub mod error;
pub mod fileops;
pub mod journal;
pub mod model;
pub mod progress;
pub mod resume;
pub mod scanner;
pub mod storage;
pub mod utils;

pub use config::AppConfig;
pub use error::Error;
pub use journal::Journal;
pub use model::{FileOperation, JournalSession, OperationStatus, OperationType};
pub use progress::{ScanReporter, SilentReporter};
pub use resume::{resume_session, ResumeReport};
pub use scanner::{FileEntry, ScanResults, Scanner};
pub use storage::{StorageRouter, StorageTier};
