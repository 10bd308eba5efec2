use crate::error::Error;
use std::path::{Path, PathBuf};

/// A vault note named `<dateCode> - <displayName>.md`. Derived from the file
/// name on each pass and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub file_path: PathBuf,
    pub vault_root: PathBuf,
    pub display_name: String,
    pub date_code: String,
}

impl Note {
    pub fn parse(vault_root: &Path, file_path: &Path) -> Result<Note, Error> {
        let invalid = || Error::InvalidNoteName(file_path.display().to_string());

        let base_name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(invalid)?;
        let stem = base_name.strip_suffix(".md").ok_or_else(invalid)?;
        let (date_code, display_name) = stem.split_once(" - ").ok_or_else(invalid)?;

        if date_code.is_empty() || !date_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if display_name.trim().is_empty() {
            return Err(invalid());
        }

        Ok(Note {
            file_path: file_path.to_path_buf(),
            vault_root: vault_root.to_path_buf(),
            display_name: display_name.to_string(),
            date_code: date_code.to_string(),
        })
    }

    /// The key this note is tracked under in the store.
    pub fn id(&self) -> String {
        self.file_path.to_string_lossy().into_owned()
    }

    /// `YYYYMMDDnnnn`, the naming convention generated notes follow.
    pub fn has_canonical_date_code(&self) -> bool {
        self.date_code.len() == 12
    }
}
