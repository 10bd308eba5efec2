use crate::detector::{ChangeDetector, NoteState};
use crate::error::Error;
use crate::fix::{fix_note, FixOutcome};
use crate::indexer::content_hash;
use crate::note::Note;
use crate::progress::ProgressReporter;
use crate::storage::models::ProcessedMark;
use crate::storage::ContentStore;
use glob::Pattern;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// A directory of markdown notes. Only top-level `*.md` files are notes;
/// generated records live in subdirectories.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixReport {
    pub changed: usize,
    pub rewritten: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub marked: usize,
}

impl Vault {
    /// The root is made absolute against the working directory with `.`
    /// segments and trailing separators removed, so a note has one id
    /// however the vault was named on the command line.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            env::current_dir()
                .map(|cwd| cwd.join(root))
                .unwrap_or_else(|_| root.to_path_buf())
        };
        let root = absolute
            .components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect::<PathBuf>();
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn list_markdown(&self) -> Result<Vec<PathBuf>, Error> {
        let pattern = format!(
            "{}/*.md",
            Pattern::escape(&self.root.to_string_lossy())
        );
        let mut paths = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = entry.map_err(|e| Error::Io(e.into_error()))?;
            // Rebuild from the root so ids match what the indexer walks.
            if let Some(name) = path.file_name() {
                let path = self.root.join(name);
                if path.is_file() {
                    paths.push(path);
                }
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Parse every top-level note. Files that do not follow the
    /// `<dateCode> - <name>.md` convention are logged and skipped.
    pub fn notes(&self) -> Result<Vec<Note>, Error> {
        let mut notes = Vec::new();
        for path in self.list_markdown()? {
            match Note::parse(&self.root, &path) {
                Ok(note) => notes.push(note),
                Err(err) => warn!("{}", err),
            }
        }
        Ok(notes)
    }

    /// Markdown files whose name is not `<12-digit date code> - <name>.md`.
    pub fn misnamed_notes(&self) -> Result<Vec<PathBuf>, Error> {
        let misnamed = self
            .list_markdown()?
            .into_iter()
            .filter(|path| {
                Note::parse(&self.root, path)
                    .map(|note| !note.has_canonical_date_code())
                    .unwrap_or(true)
            })
            .collect();
        Ok(misnamed)
    }

    /// Notes that are `Unprocessed` or `Stale`.
    pub fn list_modified_notes(
        &self,
        detector: &ChangeDetector,
    ) -> Result<Vec<(Note, NoteState)>, Error> {
        let mut modified = Vec::new();
        for note in self.notes()? {
            let state = detector.state(&note.id())?;
            if state.needs_processing() {
                modified.push((note, state));
            }
        }
        Ok(modified)
    }

    /// Fix every changed note, then record the processed hash of each one in
    /// a single transaction. Re-running on up-to-date notes does nothing.
    pub fn fix_changed_notes(
        &self,
        store: &ContentStore,
        reporter: &dyn ProgressReporter,
    ) -> Result<FixReport, Error> {
        let detector = ChangeDetector::new(store);
        let modified = self.list_modified_notes(&detector)?;
        let mut report = FixReport {
            changed: modified.len(),
            ..FixReport::default()
        };
        reporter.on_fix_start(modified.len());

        let mut marks = Vec::with_capacity(modified.len());
        for (done, (note, state)) in modified.iter().enumerate() {
            debug!("Fixing {} ({:?})", note.id(), state);
            match fix_note(note)? {
                FixOutcome::Rewritten => report.rewritten += 1,
                FixOutcome::Unchanged => report.unchanged += 1,
                FixOutcome::SkippedMalformed => {
                    report.skipped += 1;
                    reporter.on_fix_progress(done + 1, modified.len());
                    continue;
                }
            }

            if store.file_hash(&note.id())?.is_some() {
                // The mark records the bytes now on disk, which the next
                // index run will report as the note's content hash.
                marks.push(ProcessedMark {
                    id: note.id(),
                    processed_hash: content_hash(&fs::read(&note.file_path)?),
                });
            } else {
                debug!("{} is not indexed yet; leaving it unprocessed", note.id());
            }
            reporter.on_fix_progress(done + 1, modified.len());
        }

        report.marked = store.mark_complete(&marks)?;
        info!(
            "{} changed notes: {} rewritten, {} already fixed, {} skipped, {} marked processed",
            report.changed, report.rewritten, report.unchanged, report.skipped, report.marked
        );
        Ok(report)
    }
}
