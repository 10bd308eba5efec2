use crate::error::Error;
use crate::frontmatter;
use crate::storage::models::{FileRecord, IndexedFile, EMPTY_FILE_HASH};
use crate::storage::ContentStore;
use crate::vault::Vault;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub files: usize,
    pub with_frontmatter: usize,
    /// Previously indexed files under the vault that no longer exist.
    pub pruned: usize,
}

/// Content hash as stored in the `file` table: lowercase hex BLAKE3, or the
/// empty-file sentinel for zero bytes.
pub fn content_hash(data: &[u8]) -> String {
    if data.is_empty() {
        EMPTY_FILE_HASH.to_string()
    } else {
        blake3::hash(data).to_hex().to_string()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

fn is_markdown(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("md")
}

/// Record every markdown file in the vault with its content hash and
/// frontmatter, and forget files under the vault that are gone. Renamed or
/// deleted notes therefore stop counting as missing after the next index.
pub fn index_vault(vault: &Vault, store: &ContentStore) -> Result<IndexReport, Error> {
    let mut files = Vec::new();
    let mut report = IndexReport::default();

    let walker = WalkDir::new(vault.root())
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable vault entry: {}", err);
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_markdown(path) {
            continue;
        }

        let data = fs::read(path)?;
        let id = path.to_string_lossy().into_owned();

        let frontmatter = std::str::from_utf8(&data)
            .ok()
            .and_then(frontmatter::split)
            .map(|block| block.yaml.to_string());
        if frontmatter.is_some() {
            report.with_frontmatter += 1;
        }

        debug!("Indexed {}", id);
        files.push(IndexedFile {
            record: FileRecord {
                id,
                content_hash: content_hash(&data),
            },
            frontmatter,
        });
    }

    let (upserted, pruned) = store.apply_index(vault.root(), &files)?;
    report.files = upserted;
    report.pruned = pruned;
    info!(
        "Indexed {} notes ({} with frontmatter), pruned {} vanished",
        report.files, report.with_frontmatter, report.pruned
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_content_hash() {
        assert_eq!(content_hash(b""), EMPTY_FILE_HASH);
        assert_eq!(content_hash(b"abc"), content_hash(b"abc"));
        assert_ne!(content_hash(b"abc"), content_hash(b"abd"));
        assert_eq!(content_hash(b"abc").len(), 64);
    }

    #[test]
    fn test_index_vault_records_files_and_frontmatter() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("202401010000 - A.md"), "---\ngithub_repo: a/b\n---\nbody\n").unwrap();
        fs::write(root.join("202401010001 - Empty.md"), "").unwrap();
        fs::write(root.join("ignored.txt"), "x").unwrap();
        fs::create_dir(root.join(".obsidian")).unwrap();
        fs::write(root.join(".obsidian/hidden.md"), "x").unwrap();
        fs::create_dir(root.join("github-stars")).unwrap();
        fs::write(root.join("github-stars/202401010000 - B.md"), "b").unwrap();

        let store = ContentStore::open_in_memory().unwrap();
        let report = index_vault(&Vault::new(root), &store).unwrap();
        assert_eq!(report.files, 3);
        assert_eq!(report.with_frontmatter, 1);

        let records = store.list_file_records().unwrap();
        assert_eq!(records.len(), 3);
        let empty_id = root.join("202401010001 - Empty.md").to_string_lossy().into_owned();
        let empty = records.iter().find(|r| r.id == empty_id).unwrap();
        assert_eq!(empty.content_hash, EMPTY_FILE_HASH);

        let blobs = store.list_frontmatter_blobs().unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].1, "github_repo: a/b\n");
    }

    #[test]
    fn test_reindex_replaces_frontmatter() {
        let tmp = tempdir().unwrap();
        let note = tmp.path().join("202401010000 - A.md");
        fs::write(&note, "---\nbookmark_hash: one\n---\n").unwrap();

        let store = ContentStore::open_in_memory().unwrap();
        let vault = Vault::new(tmp.path());
        index_vault(&vault, &store).unwrap();

        fs::write(&note, "no frontmatter any more\n").unwrap();
        index_vault(&vault, &store).unwrap();

        assert!(store.list_frontmatter_blobs().unwrap().is_empty());
        assert_eq!(store.list_file_records().unwrap().len(), 1);
    }

    #[test]
    fn test_reindex_prunes_renamed_notes_only_under_vault() {
        let tmp = tempdir().unwrap();
        let old = tmp.path().join("202401010000 - Old.md");
        fs::write(&old, "---\nbookmark_hash: one\n---\nbody\n").unwrap();

        let store = ContentStore::open_in_memory().unwrap();
        store
            .upsert_file_records(&[FileRecord {
                id: "/elsewhere/202401010000 - Other.md".to_string(),
                content_hash: "h".to_string(),
            }])
            .unwrap();
        let vault = Vault::new(tmp.path());
        index_vault(&vault, &store).unwrap();

        let new = tmp.path().join("202401010000 - New.md");
        fs::rename(&old, &new).unwrap();
        let report = index_vault(&vault, &store).unwrap();
        assert_eq!(report.pruned, 1);

        let ids: Vec<String> = store
            .list_file_records()
            .unwrap()
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(
            ids,
            vec![
                "/elsewhere/202401010000 - Other.md".to_string(),
                new.to_string_lossy().into_owned(),
            ]
        );
        let blobs = store.list_frontmatter_blobs().unwrap();
        assert_eq!(blobs, vec![(new.to_string_lossy().into_owned(), "bookmark_hash: one\n".to_string())]);
    }
}
