use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use opal_core::storage::models::{BookmarkRecord, StarredRepoRecord};
use opal_core::storage::ContentStore;
use opal_core::{AppConfig, NoteState, OpalEngine, SilentReporter};
use tempfile::tempdir;

fn shipped_templates() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../templates")
        .to_string_lossy()
        .into_owned()
}

fn test_config(vault: &Path, db: &Path) -> AppConfig {
    AppConfig {
        vault_path: vault.to_string_lossy().into_owned(),
        db_path: db.to_string_lossy().into_owned(),
        template_dir: shipped_templates(),
        index_before_run: true,
        sync_bookmarks: true,
        sync_stars: true,
        busy_timeout_ms: 10_000,
    }
}

/// Layout:
///   vault/
///     202401010000 - Hello.md   (no frontmatter, no heading)
///     scratch.md                (misnamed)
fn create_vault(root: &Path) {
    fs::create_dir_all(root).unwrap();
    fs::write(root.join("202401010000 - Hello.md"), "Some body text.\n").unwrap();
    fs::write(root.join("scratch.md"), "loose thoughts\n").unwrap();
}

fn seed_records(db: &Path) {
    let store = ContentStore::open(db).unwrap();
    store
        .insert_bookmark(&BookmarkRecord {
            hash: "9f1c".to_string(),
            description: "Go (programming language) - Wikipedia".to_string(),
            href: "https://en.wikipedia.org/wiki/Go_(programming_language)".to_string(),
            time: "2024-01-01T10:00:00Z".to_string(),
            tags: "go languages".to_string(),
            ..BookmarkRecord::default()
        })
        .unwrap();
    store
        .insert_bookmark(&BookmarkRecord {
            hash: "77ab".to_string(),
            description: "a long tweet body".to_string(),
            href: "https://twitter.com/ferris/status/1".to_string(),
            time: "2024-01-01T11:30:00Z".to_string(),
            ..BookmarkRecord::default()
        })
        .unwrap();
    store
        .insert_starred_repo(&StarredRepoRecord {
            name: "tokio-rs/tokio".to_string(),
            description: "A runtime for writing reliable asynchronous applications".to_string(),
            login: "tokio-rs".to_string(),
            url: "https://github.com/tokio-rs/tokio".to_string(),
            language: "Rust".to_string(),
            topics: "async,networking".to_string(),
        })
        .unwrap();
}

fn sorted_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_full_pipeline_converges() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("vault");
    let db = dir.path().join("opal.sqlite");
    create_vault(&vault);
    seed_records(&db);

    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let engine = OpalEngine::new(test_config(&vault, &db)).with_date(date);

    // First run: the well-named note is new, external records are written.
    let first = engine.run(&SilentReporter).unwrap();
    assert_eq!(first.index.as_ref().unwrap().files, 2);
    assert_eq!(first.misnamed.len(), 1);
    assert_eq!(first.fix.changed, 1);
    assert_eq!(first.fix.rewritten, 1);
    assert_eq!(first.fix.marked, 1);
    assert_eq!(first.files_written(), 3);
    assert!(first.validation.is_ok());

    let hello = fs::read_to_string(vault.join("202401010000 - Hello.md")).unwrap();
    assert!(hello.starts_with("---\n"));
    assert!(hello.contains("# Hello\n"));
    assert!(hello.contains("- hello"));

    assert_eq!(
        sorted_names(&vault.join("pinboard-bookmarks")),
        vec![
            "202403150000 - Go Programming Language.md",
            "202403150000 - Tweet From Ferris On 2024-01-01t11 30 00z.md",
        ]
    );
    assert_eq!(
        sorted_names(&vault.join("github-stars")),
        vec!["202403150000 - Tokio-Rs Tokio.md"]
    );
    let star = fs::read_to_string(vault.join("github-stars/202403150000 - Tokio-Rs Tokio.md")).unwrap();
    assert!(star.contains("github_repo: \"tokio-rs/tokio\""));

    // Second run: the fixed note was marked with its rewritten hash, and the
    // generated notes are now indexed, so nothing is fixed or written.
    let second = engine.run(&SilentReporter).unwrap();
    assert_eq!(second.fix.changed, 0);
    assert_eq!(second.files_written(), 0);
    assert!(second.syncs.iter().all(|report| report.candidates == 0));
    assert!(second.validation.is_ok());

    // Editing the note makes it stale again on the next run.
    fs::write(
        vault.join("202401010000 - Hello.md"),
        format!("{}\nMore text.\n", hello),
    )
    .unwrap();
    let third = engine.run(&SilentReporter).unwrap();
    assert_eq!(third.fix.changed, 1);
    assert_eq!(third.fix.rewritten, 0);
    assert_eq!(third.fix.marked, 1);
    assert_eq!(third.files_written(), 0);
    assert_eq!(sorted_names(&vault.join("pinboard-bookmarks")).len(), 2);

    let store = engine.open_store().unwrap();
    let detector = opal_core::ChangeDetector::new(&store);
    let hello_id = vault.join("202401010000 - Hello.md");
    assert_eq!(
        detector.state(&hello_id.to_string_lossy()).unwrap(),
        NoteState::UpToDate
    );
}

#[test]
fn test_run_reports_validation_findings() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("vault");
    let db = dir.path().join("opal.sqlite");
    fs::create_dir_all(&vault).unwrap();
    fs::write(vault.join("202401010000 - A.md"), "---\ntags: []\n---\n# A\n").unwrap();
    fs::write(vault.join("202401010001 - B.md"), "---\ntags: []\n---\n# A\n").unwrap();

    let mut config = test_config(&vault, &db);
    config.sync_bookmarks = false;
    config.sync_stars = false;
    let engine = OpalEngine::new(config);

    let result = engine.run(&SilentReporter).unwrap();
    assert!(result.syncs.is_empty());
    assert_eq!(result.validation.duplicates.len(), 1);
    assert!(result.validation.missing.is_empty());
    assert!(!result.validation.is_ok());
}

#[test]
fn test_missing_template_dir_fails_sync() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("vault");
    let db = dir.path().join("opal.sqlite");
    create_vault(&vault);
    seed_records(&db);

    let mut config = test_config(&vault, &db);
    config.template_dir = dir.path().join("no-templates").to_string_lossy().into_owned();
    let engine = OpalEngine::new(config);

    assert!(matches!(
        engine.run(&SilentReporter),
        Err(opal_core::Error::Io(_))
    ));
}

#[test]
fn test_relative_vault_path_converges() {
    let workdir = tempfile::Builder::new()
        .prefix("e2e-relative")
        .tempdir_in(".")
        .unwrap();
    let vault = workdir.path().join("vault");
    assert!(vault.starts_with("."));
    let db_dir = tempdir().unwrap();
    let db = db_dir.path().join("opal.sqlite");
    create_vault(&vault);
    seed_records(&db);

    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let engine = OpalEngine::new(test_config(&vault, &db)).with_date(date);

    let first = engine.run(&SilentReporter).unwrap();
    assert_eq!(first.fix.changed, 1);
    assert_eq!(first.fix.marked, 1);

    let second = engine.run(&SilentReporter).unwrap();
    assert_eq!(second.fix.changed, 0);
    assert_eq!(second.files_written(), 0);
    assert!(second.validation.is_ok());
}

#[test]
fn test_renamed_and_deleted_notes_recover_on_next_run() {
    let dir = tempdir().unwrap();
    let vault = dir.path().join("vault");
    let db = dir.path().join("opal.sqlite");
    create_vault(&vault);
    seed_records(&db);

    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let engine = OpalEngine::new(test_config(&vault, &db)).with_date(date);
    engine.run(&SilentReporter).unwrap();
    engine.run(&SilentReporter).unwrap();

    fs::rename(
        vault.join("202401010000 - Hello.md"),
        vault.join("202401010000 - Greetings.md"),
    )
    .unwrap();
    let star = vault.join("github-stars/202403150000 - Tokio-Rs Tokio.md");
    fs::remove_file(&star).unwrap();

    let result = engine.run(&SilentReporter).unwrap();
    assert_eq!(result.index.as_ref().unwrap().pruned, 2);
    assert!(result.validation.missing.is_empty());
    assert!(result.validation.is_ok());
    // The renamed note is a new id; the deleted star is generated again.
    assert_eq!(result.fix.changed, 1);
    assert_eq!(result.files_written(), 1);
    assert!(star.exists());
}
