use std::fs;

use opal_core::indexer::index_vault;
use opal_core::storage::models::FileRecord;
use opal_core::storage::ContentStore;
use opal_core::{Error, Vault, VaultValidator};
use tempfile::tempdir;

#[test]
fn test_consistent_vault_passes() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("202401010000 - One.md"), "# One\n").unwrap();
    fs::write(dir.path().join("202401010001 - Two.md"), "# Two\n").unwrap();
    fs::write(dir.path().join("202401010002 - Empty.md"), "").unwrap();
    fs::write(dir.path().join("202401010003 - Also Empty.md"), "").unwrap();

    let store = ContentStore::open_in_memory().unwrap();
    index_vault(&Vault::new(dir.path()), &store).unwrap();

    let validator = VaultValidator::new(&store);
    let report = validator.validate().unwrap();
    assert!(report.is_ok());
    assert_eq!(report.files_checked, 4);
    validator.assert_no_missing().unwrap();
    validator.assert_no_duplicates().unwrap();
}

#[test]
fn test_deleted_file_is_missing() {
    let dir = tempdir().unwrap();
    let gone = dir.path().join("202401010000 - Gone.md");
    fs::write(&gone, "# Gone\n").unwrap();
    fs::write(dir.path().join("202401010001 - Kept.md"), "# Kept\n").unwrap();

    let store = ContentStore::open_in_memory().unwrap();
    index_vault(&Vault::new(dir.path()), &store).unwrap();
    fs::remove_file(&gone).unwrap();

    let validator = VaultValidator::new(&store);
    let report = validator.validate().unwrap();
    assert_eq!(report.missing, vec![gone.to_string_lossy().into_owned()]);
    assert!(report.duplicates.is_empty());

    match validator.assert_no_missing() {
        Err(Error::Integrity(err)) => assert_eq!(err.missing.len(), 1),
        other => panic!("expected integrity error, got {:?}", other),
    }
    validator.assert_no_duplicates().unwrap();
}

#[test]
fn test_records_without_hash_are_not_missing() {
    let store = ContentStore::open_in_memory().unwrap();
    store
        .upsert_file_records(&[FileRecord {
            id: "/nowhere/202401010000 - Ghost.md".to_string(),
            content_hash: String::new(),
        }])
        .unwrap();

    let report = VaultValidator::new(&store).validate().unwrap();
    assert!(report.is_ok());
}

#[test]
fn test_missing_and_duplicates_reported_together() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("202401010000 - First.md");
    let second = dir.path().join("202401010001 - Second.md");
    let gone = dir.path().join("202401010002 - Gone.md");
    fs::write(&first, "same bytes\n").unwrap();
    fs::write(&second, "same bytes\n").unwrap();
    fs::write(&gone, "unique\n").unwrap();

    let store = ContentStore::open_in_memory().unwrap();
    index_vault(&Vault::new(dir.path()), &store).unwrap();
    fs::remove_file(&gone).unwrap();

    let report = VaultValidator::new(&store).validate().unwrap();
    assert_eq!(report.missing, vec![gone.to_string_lossy().into_owned()]);
    assert_eq!(report.duplicates, vec![first.to_string_lossy().into_owned()]);

    let err = report.into_result().unwrap_err();
    assert_eq!(err.missing.len(), 1);
    assert_eq!(err.duplicates.len(), 1);
    assert!(err.to_string().contains("1 tracked files missing"));
}
