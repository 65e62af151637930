use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use tidy_up::ScanReporter;

/// Scan progress on the terminal: a spinner whose message tracks the number
/// of oversized entries found so far.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl ScanReporter for CliReporter {
    fn on_scan_start(&self, root: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(format!("Scanning {}...", root));
        pb.enable_steady_tick(std::time::Duration::from_millis(80));

        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn on_entry_found(&self, entries_found: usize, _path: &str) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_message(format!("Scanning... {} large entries found", entries_found));
        }
    }

    fn on_scan_complete(&self, entries_found: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} entries in {:.2}s",
            entries_found, duration_secs
        );
    }
}
