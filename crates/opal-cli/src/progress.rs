use indicatif::{ProgressBar, ProgressStyle};
use opal_core::sync::RecordKind;
use opal_core::ProgressReporter;
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// Indexing and validation show a spinner; fixing and syncing show a bar
/// since their totals are known before they start.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn set_position(&self, done: usize, total: usize) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                if pb.length() != Some(total as u64) {
                    pb.set_length(total as u64);
                }
                pb.set_position(done as u64);
            }
        }
    }

    fn spinner(&self, message: &'static str) {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style.tick_chars(TICK_CHARS));
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn bar(&self, label: String, total: usize) {
        let pb = ProgressBar::new(total as u64);
        let template = format!(
            "  {{spinner:.cyan}} {} [{{bar:30.cyan/dim}}] {{pos}}/{{len}}",
            label
        );
        let style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style.progress_chars("━╸─").tick_chars(TICK_CHARS));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }
}

impl Default for CliReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CliReporter {
    fn on_index_start(&self) {
        self.spinner("Indexing vault...");
    }

    fn on_index_complete(&self, files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Index complete: {} notes in {:.2}s",
            files, duration_secs
        );
    }

    fn on_fix_start(&self, changed_notes: usize) {
        self.bar("Fixing".to_string(), changed_notes);
    }

    fn on_fix_progress(&self, notes_done: usize, changed_notes: usize) {
        self.set_position(notes_done, changed_notes);
    }

    fn on_fix_complete(&self, rewritten: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Fix complete: {} notes rewritten in {:.2}s",
            rewritten, duration_secs
        );
    }

    fn on_sync_start(&self, kind: RecordKind, candidates: usize) {
        self.bar(format!("Syncing {}", kind), candidates);
    }

    fn on_sync_progress(&self, _kind: RecordKind, records_done: usize, candidates: usize) {
        self.set_position(records_done, candidates);
    }

    fn on_sync_complete(&self, kind: RecordKind, written: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Sync {} complete: {} notes written in {:.2}s",
            kind, written, duration_secs
        );
    }

    fn on_validate_start(&self) {
        self.spinner("Validating vault...");
    }

    fn on_validate_complete(&self, missing: usize, duplicates: usize, duration_secs: f64) {
        self.finish_bar();
        let mark = if missing + duplicates == 0 {
            "\x1b[32m✓\x1b[0m"
        } else {
            "\x1b[31m✗\x1b[0m"
        };
        eprintln!(
            "  {} Validation complete: {} missing, {} duplicated in {:.2}s",
            mark, missing, duplicates, duration_secs
        );
    }
}
