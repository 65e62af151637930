/// Trait for reporting scan progress.
///
/// The CLI implements this with an indicatif spinner; library callers and
/// tests use [`SilentReporter`]. All methods have default no-op
/// implementations.
pub trait ScanReporter: Send + Sync {
    fn on_scan_start(&self, _root: &str) {}
    fn on_entry_found(&self, _entries_found: usize, _path: &str) {}
    fn on_scan_complete(&self, _entries_found: usize, _duration_secs: f64) {}
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl ScanReporter for SilentReporter {}
