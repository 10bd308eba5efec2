//! Materialise harvested records (bookmarks, starred repositories) as vault
//! notes, at most one file per record.

pub mod bookmark;
pub mod naming;
pub mod render;
pub mod star;

use crate::dedup::DeduplicatingSet;
use crate::error::Error;
use crate::frontmatter::{self, load_frontmatter};
use crate::progress::ProgressReporter;
use crate::storage::models::FrontmatterRecord;
use crate::storage::ContentStore;
use crate::vault::Vault;
use chrono::{Local, NaiveDate};
use render::{Renderer, View};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Bookmark,
    Star,
}

impl RecordKind {
    /// Vault subdirectory generated notes of this kind are written to.
    pub fn subdirectory(self) -> &'static str {
        match self {
            RecordKind::Bookmark => "pinboard-bookmarks",
            RecordKind::Star => "github-stars",
        }
    }

    pub fn template_name(self) -> &'static str {
        match self {
            RecordKind::Bookmark => "pinboard-bookmark",
            RecordKind::Star => "github-star",
        }
    }

    /// The frontmatter field that marks a note as materialising a record of
    /// this kind.
    pub fn identifier_of(self, record: &FrontmatterRecord) -> Option<&str> {
        match self {
            RecordKind::Bookmark => record.bookmark_hash.as_deref(),
            RecordKind::Star => record.github_repo.as_deref(),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Bookmark => write!(f, "bookmarks"),
            RecordKind::Star => write!(f, "stars"),
        }
    }
}

/// A harvested record that can be rendered into a note.
pub trait SyncRecord {
    const KIND: RecordKind;

    /// Natural key matched against note frontmatter.
    fn identifier(&self) -> &str;

    /// Raw text the file name fragment is derived from.
    fn title(&self) -> String;

    fn view(&self, date_code: &str) -> View;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// A byte-identical file already sits at the chosen name.
    AlreadyPresent(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub kind: RecordKind,
    /// Records absent from the vault's frontmatter.
    pub candidates: usize,
    pub written: Vec<PathBuf>,
    pub already_present: usize,
    /// Candidates skipped because an earlier row had the same identifier.
    pub repeated: usize,
}

impl SyncReport {
    fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            candidates: 0,
            written: Vec::new(),
            already_present: 0,
            repeated: 0,
        }
    }
}

/// Identifiers carried in the frontmatter of the notes directly inside
/// `dir`. A missing directory holds none; unreadable frontmatter is skipped.
pub fn identifiers_on_disk(dir: &Path, kind: RecordKind) -> Result<Vec<String>, Error> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut ids = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("md") || !path.is_file() {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            debug!("Skipping non-UTF-8 note {}", path.display());
            continue;
        };
        let Some(block) = frontmatter::split(&content) else {
            continue;
        };
        match frontmatter::parse_record(&path.to_string_lossy(), block.yaml) {
            Ok(record) => ids.extend(kind.identifier_of(&record).map(str::to_string)),
            Err(err) => warn!("Skipping malformed frontmatter in {}: {}", path.display(), err),
        }
    }
    Ok(ids)
}

pub struct SyncPipeline<'a> {
    store: &'a ContentStore,
    renderer: &'a dyn Renderer,
    vault_root: PathBuf,
    date: NaiveDate,
}

impl<'a> SyncPipeline<'a> {
    pub fn new(store: &'a ContentStore, renderer: &'a dyn Renderer, vault: &Vault) -> Self {
        Self {
            store,
            renderer,
            vault_root: vault.root().to_path_buf(),
            date: Local::now().date_naive(),
        }
    }

    /// Date stamped into generated names; defaults to today.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Identifiers of `kind` already materialised by some note: those in the
    /// indexed frontmatter plus those in the output directory itself, which
    /// the index may not have caught up with.
    pub fn present_identifiers(&self, kind: RecordKind) -> Result<DeduplicatingSet, Error> {
        let mut present: DeduplicatingSet = load_frontmatter(self.store)?
            .iter()
            .filter_map(|record| kind.identifier_of(record))
            .collect();
        for id in identifiers_on_disk(&self.vault_root.join(kind.subdirectory()), kind)? {
            present.add(id);
        }
        debug!("{} {} already present in the vault", present.len(), kind);
        Ok(present)
    }

    pub fn sync(&self, kind: RecordKind, reporter: &dyn ProgressReporter) -> Result<SyncReport, Error> {
        match kind {
            RecordKind::Bookmark => self.sync_bookmarks(reporter),
            RecordKind::Star => self.sync_stars(reporter),
        }
    }

    pub fn sync_bookmarks(&self, reporter: &dyn ProgressReporter) -> Result<SyncReport, Error> {
        let present = self.present_identifiers(RecordKind::Bookmark)?;
        let bookmarks = self.store.list_absent_bookmarks(&present)?;
        self.materialise(&bookmarks, reporter)
    }

    pub fn sync_stars(&self, reporter: &dyn ProgressReporter) -> Result<SyncReport, Error> {
        let present = self.present_identifiers(RecordKind::Star)?;
        let repos = self.store.list_absent_starred_repos(&present)?;
        self.materialise(&repos, reporter)
    }

    /// Render and write each record. Stops at the first failure; files
    /// already written stay in place, and a retry finds them again.
    fn materialise<T: SyncRecord>(
        &self,
        records: &[T],
        reporter: &dyn ProgressReporter,
    ) -> Result<SyncReport, Error> {
        let kind = T::KIND;
        let start = Instant::now();
        let mut report = SyncReport::new(kind);
        report.candidates = records.len();
        reporter.on_sync_start(kind, records.len());

        if records.is_empty() {
            reporter.on_sync_complete(kind, 0, start.elapsed().as_secs_f64());
            return Ok(report);
        }

        let dir = self.vault_root.join(kind.subdirectory());
        fs::create_dir_all(&dir)?;

        // Duplicate rows in the store must not produce a second file.
        let mut seen = DeduplicatingSet::new();
        for (done, record) in records.iter().enumerate() {
            if !seen.add(record.identifier()) {
                debug!("Skipping repeated {} record {}", kind, record.identifier());
                report.repeated += 1;
                reporter.on_sync_progress(kind, done + 1, records.len());
                continue;
            }
            match self.write_record(&dir, record)? {
                WriteOutcome::Written(path) => {
                    debug!("Wrote {}", path.display());
                    report.written.push(path);
                }
                WriteOutcome::AlreadyPresent(path) => {
                    debug!("{} already materialised at {}", record.identifier(), path.display());
                    report.already_present += 1;
                }
            }
            reporter.on_sync_progress(kind, done + 1, records.len());
        }

        info!(
            "Synced {}: {} candidates, {} written, {} already present, {} repeated",
            kind,
            report.candidates,
            report.written.len(),
            report.already_present,
            report.repeated
        );
        reporter.on_sync_complete(kind, report.written.len(), start.elapsed().as_secs_f64());
        Ok(report)
    }

    /// Write one record under the first free `<date><nnnn> - <Title>.md`
    /// name. A name holding identical bytes means the record is already
    /// there; a name holding anything else moves on to the next counter.
    pub fn write_record<T: SyncRecord>(&self, dir: &Path, record: &T) -> Result<WriteOutcome, Error> {
        let fragment = naming::title_fragment(&record.title());
        let stamp = naming::date_stamp(self.date);

        for disambiguator in 0..=naming::MAX_DISAMBIGUATOR {
            let date_code = naming::date_code(&stamp, disambiguator);
            let path = dir.join(naming::file_name(&date_code, &fragment));
            let rendered = self
                .renderer
                .render(T::KIND.template_name(), &record.view(&date_code))?;

            match fs::read(&path) {
                Ok(existing) if existing == rendered => return Ok(WriteOutcome::AlreadyPresent(path)),
                Ok(_) => continue,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(&rendered)?;
                    return Ok(WriteOutcome::Written(path));
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Err(Error::NameCollision {
            dir: dir.to_path_buf(),
            fragment,
        })
    }
}
