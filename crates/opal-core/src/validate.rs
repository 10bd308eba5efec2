use crate::counter::FrequencyCounter;
use crate::error::Error;
use crate::storage::models::FileRecord;
use crate::storage::ContentStore;
use std::fmt;
use std::path::Path;
use tracing::{error, info};

/// Findings of a failed validation. Both lists are complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityError {
    /// Tracked paths with no file on disk.
    pub missing: Vec<String>,
    /// One representative path per content hash shared by several files.
    pub duplicates: Vec<String>,
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tracked files missing from disk, {} content hashes shared by several files",
            self.missing.len(),
            self.duplicates.len()
        )
    }
}

impl std::error::Error for IntegrityError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub files_checked: usize,
    pub missing: Vec<String>,
    pub duplicates: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.duplicates.is_empty()
    }

    pub fn into_result(self) -> Result<(), IntegrityError> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(IntegrityError {
                missing: self.missing,
                duplicates: self.duplicates,
            })
        }
    }
}

/// Records that should exist on disk: those with a non-empty hash.
pub fn missing_paths(records: &[FileRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|record| !record.content_hash.is_empty())
        .filter(|record| !Path::new(&record.id).exists())
        .map(|record| record.id.clone())
        .collect()
}

/// Representative paths of content hashes tracked more than once. Empty
/// hashes and the empty-file sentinel are ignored.
pub fn duplicated_paths(records: &[FileRecord]) -> Vec<String> {
    let mut counter = FrequencyCounter::new();
    for record in records.iter().filter(|record| record.has_content()) {
        counter.add(record.content_hash.as_str(), record.id.as_str());
    }
    counter.duplicates()
}

/// Post-hoc integrity checks over the store's file records. Read-only.
pub struct VaultValidator<'a> {
    store: &'a ContentStore,
}

impl<'a> VaultValidator<'a> {
    pub fn new(store: &'a ContentStore) -> Self {
        Self { store }
    }

    pub fn assert_no_missing(&self) -> Result<(), Error> {
        let missing = missing_paths(&self.store.list_file_records()?);
        for path in &missing {
            error!("Missing: {}", path);
        }
        ValidationReport {
            missing,
            ..ValidationReport::default()
        }
        .into_result()
        .map_err(Error::from)
    }

    pub fn assert_no_duplicates(&self) -> Result<(), Error> {
        let duplicates = duplicated_paths(&self.store.list_file_records()?);
        for path in &duplicates {
            error!("Duplicated content: {}", path);
        }
        ValidationReport {
            duplicates,
            ..ValidationReport::default()
        }
        .into_result()
        .map_err(Error::from)
    }

    /// Run both checks over one enumeration of the file records. Only store
    /// failures are errors; findings are returned in the report.
    pub fn validate(&self) -> Result<ValidationReport, Error> {
        let records = self.store.list_file_records()?;
        let report = ValidationReport {
            files_checked: records.len(),
            missing: missing_paths(&records),
            duplicates: duplicated_paths(&records),
        };

        if report.is_ok() {
            info!("Validated {} tracked files", report.files_checked);
        } else {
            for path in &report.missing {
                error!("Missing: {}", path);
            }
            for path in &report.duplicates {
                error!("Duplicated content: {}", path);
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, hash: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            content_hash: hash.to_string(),
        }
    }

    #[test]
    fn test_duplicated_paths_ignores_empty_hashes() {
        let records = vec![
            record("/a", "h1"),
            record("/b", "h1"),
            record("/c", "0"),
            record("/d", "0"),
            record("/e", ""),
            record("/f", ""),
            record("/g", "h2"),
        ];
        assert_eq!(duplicated_paths(&records), vec!["/a".to_string()]);
    }

    #[test]
    fn test_missing_paths_skips_unhashed_records() {
        let records = vec![
            record("/definitely/not/here.md", "h1"),
            record("/also/not/here.md", ""),
        ];
        assert_eq!(
            missing_paths(&records),
            vec!["/definitely/not/here.md".to_string()]
        );
    }

    #[test]
    fn test_report_into_result() {
        assert!(ValidationReport::default().into_result().is_ok());
        let err = ValidationReport {
            files_checked: 3,
            missing: vec!["/x".to_string()],
            duplicates: vec![],
        }
        .into_result()
        .unwrap_err();
        assert_eq!(err.missing, vec!["/x".to_string()]);
        assert!(err.to_string().starts_with("1 tracked files missing"));
    }
}
