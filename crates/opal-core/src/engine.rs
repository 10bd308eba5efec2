use crate::config::AppConfig;
use crate::error::Error;
use crate::indexer::{self, IndexReport};
use crate::progress::ProgressReporter;
use crate::storage::ContentStore;
use crate::sync::render::TemplateRenderer;
use crate::sync::{RecordKind, SyncPipeline, SyncReport};
use crate::validate::{ValidationReport, VaultValidator};
use crate::vault::{FixReport, Vault};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct OpalEngine {
    config: AppConfig,
    date: Option<NaiveDate>,
}

#[derive(Debug)]
pub struct RunResult {
    pub index_duration: Duration,
    pub fix_duration: Duration,
    pub sync_duration: Duration,
    pub validate_duration: Duration,
    pub index: Option<IndexReport>,
    pub misnamed: Vec<PathBuf>,
    pub fix: FixReport,
    pub syncs: Vec<SyncReport>,
    pub validation: ValidationReport,
}

impl RunResult {
    pub fn files_written(&self) -> usize {
        self.syncs.iter().map(|report| report.written.len()).sum()
    }
}

impl OpalEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config, date: None }
    }

    /// Pin the date stamped into generated note names.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn vault(&self) -> Vault {
        Vault::new(&self.config.vault_path)
    }

    pub fn open_store(&self) -> Result<ContentStore, Error> {
        Ok(ContentStore::open_with_timeout(
            &self.config.db_path,
            self.config.busy_timeout_ms,
        )?)
    }

    pub fn enabled_kinds(&self) -> Vec<RecordKind> {
        let mut kinds = Vec::new();
        if self.config.sync_bookmarks {
            kinds.push(RecordKind::Bookmark);
        }
        if self.config.sync_stars {
            kinds.push(RecordKind::Star);
        }
        kinds
    }

    /// Run every stage in order: index, fix changed notes, sync external
    /// records, validate. Detection and generation stop at the first error;
    /// validation findings are returned in the result.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<RunResult, Error> {
        let store = self.open_store()?;
        let vault = self.vault();
        info!("Processing vault {}", vault.root().display());

        // Stage 1: Index
        let index_start = Instant::now();
        let index = if self.config.index_before_run {
            Some(self.index(&vault, &store, reporter)?)
        } else {
            debug!("Indexing disabled; trusting the store as-is");
            None
        };
        let index_duration = index_start.elapsed();

        let misnamed = vault.misnamed_notes()?;
        for path in &misnamed {
            warn!("Misnamed note: {}", path.display());
        }

        // Stage 2: Fix changed notes
        let fix_start = Instant::now();
        let fix = self.fix(&vault, &store, reporter)?;
        let fix_duration = fix_start.elapsed();

        // Stage 3: Sync external records
        let sync_start = Instant::now();
        let syncs = self.sync(&vault, &store, &self.enabled_kinds(), reporter)?;
        let sync_duration = sync_start.elapsed();

        // Stage 4: Validate
        let validate_start = Instant::now();
        let validation = self.validate(&store, reporter)?;
        let validate_duration = validate_start.elapsed();

        Ok(RunResult {
            index_duration,
            fix_duration,
            sync_duration,
            validate_duration,
            index,
            misnamed,
            fix,
            syncs,
            validation,
        })
    }

    pub fn index(
        &self,
        vault: &Vault,
        store: &ContentStore,
        reporter: &dyn ProgressReporter,
    ) -> Result<IndexReport, Error> {
        let start = Instant::now();
        reporter.on_index_start();
        let report = indexer::index_vault(vault, store)?;
        reporter.on_index_complete(report.files, start.elapsed().as_secs_f64());
        Ok(report)
    }

    pub fn fix(
        &self,
        vault: &Vault,
        store: &ContentStore,
        reporter: &dyn ProgressReporter,
    ) -> Result<FixReport, Error> {
        let start = Instant::now();
        let report = vault.fix_changed_notes(store, reporter)?;
        reporter.on_fix_complete(report.rewritten, start.elapsed().as_secs_f64());
        Ok(report)
    }

    pub fn sync(
        &self,
        vault: &Vault,
        store: &ContentStore,
        kinds: &[RecordKind],
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<SyncReport>, Error> {
        if kinds.is_empty() {
            return Ok(Vec::new());
        }

        let renderer = TemplateRenderer::from_dir(&self.config.template_dir)?;
        let mut pipeline = SyncPipeline::new(store, &renderer, vault);
        if let Some(date) = self.date {
            pipeline = pipeline.with_date(date);
        }

        kinds
            .iter()
            .map(|kind| pipeline.sync(*kind, reporter))
            .collect()
    }

    pub fn validate(
        &self,
        store: &ContentStore,
        reporter: &dyn ProgressReporter,
    ) -> Result<ValidationReport, Error> {
        let start = Instant::now();
        reporter.on_validate_start();
        let report = VaultValidator::new(store).validate()?;
        reporter.on_validate_complete(
            report.missing.len(),
            report.duplicates.len(),
            start.elapsed().as_secs_f64(),
        );
        Ok(report)
    }
}
