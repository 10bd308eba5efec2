use super::models::*;
use super::sqlite::ContentStore;
use crate::dedup::DeduplicatingSet;
use ahash::AHashSet;
use rusqlite::{params, Result, Row};
use std::path::Path;
use tracing::debug;

/// Externally-populated columns are nullable; treat NULL as empty text.
fn text(row: &Row, idx: usize) -> Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

impl ContentStore {
    // ── File Records ─────────────────────────────────────────────

    /// Current content hash of a tracked file, `None` when the file has no
    /// record (or a NULL hash).
    pub fn file_hash(&self, path: &str) -> Result<Option<String>> {
        match self.connection().query_row(
            "SELECT hash FROM file WHERE id = ?1",
            params![path],
            |row| row.get::<_, Option<String>>(0),
        ) {
            Ok(hash) => Ok(hash),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn list_file_records(&self) -> Result<Vec<FileRecord>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT id, hash FROM file ORDER BY id")?;
        let records = stmt
            .query_map([], |row| {
                Ok(FileRecord {
                    id: row.get(0)?,
                    content_hash: text(row, 1)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn upsert_file_records(&self, records: &[FileRecord]) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO file (id, hash) VALUES (?1, ?2) \
                 ON CONFLICT(id) DO UPDATE SET hash = excluded.hash",
            )?;
            for record in records {
                count += stmt.execute(params![record.id, record.content_hash])?;
            }
        }
        tx.commit()?;
        debug!("Upserted {} file records", count);
        Ok(count)
    }

    /// Replace the index of everything under `root` in one transaction:
    /// upsert each walked file with its frontmatter blob, then drop the
    /// file, frontmatter and processed-mark rows of paths under `root` the
    /// walk did not see. Rows outside `root` are left alone. Returns
    /// `(upserted, pruned)`.
    pub fn apply_index(&self, root: &Path, files: &[IndexedFile]) -> Result<(usize, usize)> {
        let seen: AHashSet<&str> = files.iter().map(|file| file.record.id.as_str()).collect();
        let stale: Vec<String> = self
            .list_file_records()?
            .into_iter()
            .map(|record| record.id)
            .filter(|id| Path::new(id).starts_with(root) && !seen.contains(id.as_str()))
            .collect();

        let tx = self.connection().unchecked_transaction()?;
        let mut upserted = 0;
        {
            let mut upsert = tx.prepare_cached(
                "INSERT INTO file (id, hash) VALUES (?1, ?2) \
                 ON CONFLICT(id) DO UPDATE SET hash = excluded.hash",
            )?;
            let mut clear_frontmatter =
                tx.prepare_cached("DELETE FROM metadata WHERE file_id = ?1 AND schema = ?2")?;
            let mut insert_frontmatter = tx.prepare_cached(
                "INSERT INTO metadata (file_id, content, schema) VALUES (?1, ?2, ?3)",
            )?;

            for file in files {
                let id = &file.record.id;
                upserted += upsert.execute(params![id, file.record.content_hash])?;
                clear_frontmatter.execute(params![id, FRONTMATTER_SCHEMA])?;
                if let Some(yaml) = &file.frontmatter {
                    insert_frontmatter.execute(params![id, yaml, FRONTMATTER_SCHEMA])?;
                }
            }

            let mut delete_file = tx.prepare_cached("DELETE FROM file WHERE id = ?1")?;
            let mut delete_metadata = tx.prepare_cached("DELETE FROM metadata WHERE file_id = ?1")?;
            let mut delete_mark = tx.prepare_cached("DELETE FROM opal_metadata WHERE id = ?1")?;
            for id in &stale {
                delete_file.execute(params![id])?;
                delete_metadata.execute(params![id])?;
                delete_mark.execute(params![id])?;
                debug!("Pruned {}", id);
            }
        }
        tx.commit()?;
        Ok((upserted, stale.len()))
    }

    // ── Processed Marks ──────────────────────────────────────────

    /// Hash recorded when the note was last processed. No row is the normal
    /// state of a never-processed note and yields `None`.
    pub fn processed_hash(&self, path: &str) -> Result<Option<String>> {
        match self.connection().query_row(
            "SELECT processed_hash FROM opal_metadata WHERE id = ?1",
            params![path],
            |row| row.get(0),
        ) {
            Ok(hash) => Ok(Some(hash)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn mark_processed(&self, mark: &ProcessedMark) -> Result<()> {
        self.connection().execute(
            "INSERT INTO opal_metadata (id, processed_hash) VALUES (?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET processed_hash = excluded.processed_hash",
            params![mark.id, mark.processed_hash],
        )?;
        Ok(())
    }

    /// Upsert a batch of marks in one transaction.
    pub fn mark_complete(&self, marks: &[ProcessedMark]) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO opal_metadata (id, processed_hash) VALUES (?1, ?2) \
                 ON CONFLICT(id) DO UPDATE SET processed_hash = excluded.processed_hash",
            )?;
            for mark in marks {
                count += stmt.execute(params![mark.id, mark.processed_hash])?;
            }
        }
        tx.commit()?;
        debug!("Marked {} notes as processed", count);
        Ok(count)
    }

    // ── Frontmatter ──────────────────────────────────────────────

    /// Raw `(file_id, yaml)` frontmatter blobs. Parsing is left to the caller
    /// so malformed blobs can be skipped one by one.
    pub fn list_frontmatter_blobs(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.connection().prepare(
            "SELECT file_id, content FROM metadata WHERE schema = ?1 ORDER BY rowid",
        )?;
        let blobs = stmt
            .query_map(params![FRONTMATTER_SCHEMA], |row| {
                Ok((text(row, 0)?, text(row, 1)?))
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(blobs)
    }

    /// Replace the frontmatter blob stored for a file; `None` just removes it.
    pub fn replace_frontmatter(&self, file_id: &str, content: Option<&str>) -> Result<()> {
        let tx = self.connection().unchecked_transaction()?;
        tx.execute(
            "DELETE FROM metadata WHERE file_id = ?1 AND schema = ?2",
            params![file_id, FRONTMATTER_SCHEMA],
        )?;
        if let Some(content) = content {
            tx.execute(
                "INSERT INTO metadata (file_id, content, schema) VALUES (?1, ?2, ?3)",
                params![file_id, content, FRONTMATTER_SCHEMA],
            )?;
        }
        tx.commit()
    }

    // ── External Records ─────────────────────────────────────────

    pub fn list_bookmarks(&self) -> Result<Vec<BookmarkRecord>> {
        let mut stmt = self.connection().prepare(
            "SELECT description, extended, hash, href, meta, shared, tags, time, toread \
             FROM pinboard_bookmark ORDER BY rowid",
        )?;
        let bookmarks = stmt
            .query_map([], |row| {
                Ok(BookmarkRecord {
                    description: text(row, 0)?,
                    extended: text(row, 1)?,
                    hash: text(row, 2)?,
                    href: text(row, 3)?,
                    meta: text(row, 4)?,
                    shared: text(row, 5)?,
                    tags: text(row, 6)?,
                    time: text(row, 7)?,
                    toread: text(row, 8)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(bookmarks)
    }

    /// Bookmarks whose hash is not yet materialised by any note.
    pub fn list_absent_bookmarks(&self, present: &DeduplicatingSet) -> Result<Vec<BookmarkRecord>> {
        let mut bookmarks = self.list_bookmarks()?;
        bookmarks.retain(|bookmark| !present.contains(&bookmark.hash));
        Ok(bookmarks)
    }

    pub fn insert_bookmark(&self, bookmark: &BookmarkRecord) -> Result<()> {
        self.connection().execute(
            "INSERT INTO pinboard_bookmark \
             (description, extended, hash, href, meta, shared, tags, time, toread) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                bookmark.description,
                bookmark.extended,
                bookmark.hash,
                bookmark.href,
                bookmark.meta,
                bookmark.shared,
                bookmark.tags,
                bookmark.time,
                bookmark.toread,
            ],
        )?;
        Ok(())
    }

    pub fn list_starred_repos(&self) -> Result<Vec<StarredRepoRecord>> {
        let mut stmt = self.connection().prepare(
            "SELECT name, description, login, url, language, topics \
             FROM github_star ORDER BY rowid",
        )?;
        let repos = stmt
            .query_map([], |row| {
                Ok(StarredRepoRecord {
                    name: text(row, 0)?,
                    description: text(row, 1)?,
                    login: text(row, 2)?,
                    url: text(row, 3)?,
                    language: text(row, 4)?,
                    topics: text(row, 5)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(repos)
    }

    /// Starred repositories whose name is not yet materialised by any note.
    pub fn list_absent_starred_repos(
        &self,
        present: &DeduplicatingSet,
    ) -> Result<Vec<StarredRepoRecord>> {
        let mut repos = self.list_starred_repos()?;
        repos.retain(|repo| !present.contains(&repo.name));
        Ok(repos)
    }

    pub fn insert_starred_repo(&self, repo: &StarredRepoRecord) -> Result<()> {
        self.connection().execute(
            "INSERT INTO github_star (name, description, login, url, language, topics) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                repo.name,
                repo.description,
                repo.login,
                repo.url,
                repo.language,
                repo.topics,
            ],
        )?;
        Ok(())
    }
}
