use crate::error::Error;
use crate::storage::ContentStore;
use tracing::trace;

/// Where a note stands relative to the fix pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    /// Never processed: no `ProcessedMark` exists.
    Unprocessed,
    /// Processed before, but the content hash has moved since.
    Stale,
    /// The processed hash equals the current content hash.
    UpToDate,
}

impl NoteState {
    pub fn needs_processing(self) -> bool {
        !matches!(self, NoteState::UpToDate)
    }
}

/// Compare a file's current hash with the hash it was last processed at.
/// A missing processed hash always means `Unprocessed`.
pub fn classify(file_hash: Option<&str>, processed_hash: Option<&str>) -> NoteState {
    match (file_hash, processed_hash) {
        (_, None) => NoteState::Unprocessed,
        (Some(current), Some(processed)) if current == processed => NoteState::UpToDate,
        _ => NoteState::Stale,
    }
}

/// Read-only view over the store that decides whether a note needs
/// re-processing.
pub struct ChangeDetector<'a> {
    store: &'a ContentStore,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(store: &'a ContentStore) -> Self {
        Self { store }
    }

    pub fn state(&self, path: &str) -> Result<NoteState, Error> {
        let file_hash = self.store.file_hash(path)?;
        let processed_hash = self.store.processed_hash(path)?;
        let state = classify(file_hash.as_deref(), processed_hash.as_deref());
        trace!("{} is {:?}", path, state);
        Ok(state)
    }

    pub fn is_changed(&self, path: &str) -> Result<bool, Error> {
        Ok(self.state(path)?.needs_processing())
    }
}
