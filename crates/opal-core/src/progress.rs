use crate::sync::RecordKind;

/// Trait for reporting run progress.
///
/// The CLI implements it with indicatif bars; library callers and tests use
/// [`SilentReporter`]. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_index_start(&self) {}
    fn on_index_complete(&self, _files: usize, _duration_secs: f64) {}
    fn on_fix_start(&self, _changed_notes: usize) {}
    fn on_fix_progress(&self, _notes_done: usize, _changed_notes: usize) {}
    fn on_fix_complete(&self, _rewritten: usize, _duration_secs: f64) {}
    fn on_sync_start(&self, _kind: RecordKind, _candidates: usize) {}
    fn on_sync_progress(&self, _kind: RecordKind, _records_done: usize, _candidates: usize) {}
    fn on_sync_complete(&self, _kind: RecordKind, _written: usize, _duration_secs: f64) {}
    fn on_validate_start(&self) {}
    fn on_validate_complete(&self, _missing: usize, _duplicates: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
