mod commands;
mod logging;
mod progress;

use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, SyncKind};
use dotenv::dotenv;
use opal_core::config::load_configuration_with;
use opal_core::sync::RecordKind;
use opal_core::{AppConfig, ChangeDetector, OpalEngine, ValidationReport};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();
    let Some(command) = args.command else {
        let _ = Cli::command().print_long_help();
        return;
    };

    let config = match load_configuration_with(command.vault()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    match execute(command, config) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            error!("Error: {}", err);
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the vault failed validation.
fn execute(command: Commands, config: AppConfig) -> Result<bool, opal_core::Error> {
    let engine = OpalEngine::new(config);
    let reporter = CliReporter::new();

    match command {
        Commands::Run { .. } => run_all(&engine, &reporter),
        Commands::Index { .. } => {
            let store = engine.open_store()?;
            let report = engine.index(&engine.vault(), &store, &reporter)?;
            info!(
                "{} notes indexed, {} with frontmatter, {} pruned",
                format!("{}", report.files).green(),
                format!("{}", report.with_frontmatter).cyan(),
                format!("{}", report.pruned).yellow(),
            );
            Ok(true)
        }
        Commands::Changed { .. } => {
            let store = engine.open_store()?;
            let detector = ChangeDetector::new(&store);
            let modified = engine.vault().list_modified_notes(&detector)?;
            for (note, state) in &modified {
                println!("{:?}\t{}", state, note.id());
            }
            info!("{} changed notes", format!("{}", modified.len()).yellow());
            Ok(true)
        }
        Commands::Fix { .. } => {
            let store = engine.open_store()?;
            let report = engine.fix(&engine.vault(), &store, &reporter)?;
            info!(
                "{} changed, {} rewritten, {} skipped, {} marked processed",
                format!("{}", report.changed).yellow(),
                format!("{}", report.rewritten).green(),
                format!("{}", report.skipped).red(),
                format!("{}", report.marked).cyan(),
            );
            Ok(true)
        }
        Commands::Sync { only, .. } => {
            let kinds = match only {
                Some(SyncKind::Bookmarks) => vec![RecordKind::Bookmark],
                Some(SyncKind::Stars) => vec![RecordKind::Star],
                None => vec![RecordKind::Bookmark, RecordKind::Star],
            };
            let store = engine.open_store()?;
            for report in engine.sync(&engine.vault(), &store, &kinds, &reporter)? {
                info!(
                    "{}: {} candidates, {} written, {} already present, {} repeated",
                    report.kind,
                    report.candidates,
                    format!("{}", report.written.len()).green(),
                    report.already_present,
                    report.repeated,
                );
            }
            Ok(true)
        }
        Commands::Validate { .. } => {
            let store = engine.open_store()?;
            let report = engine.validate(&store, &reporter)?;
            Ok(print_validation(&report))
        }
        Commands::PrintConfig { .. } => {
            println!("Configuration: {:?}", engine.config());
            Ok(true)
        }
    }
}

fn run_all(engine: &OpalEngine, reporter: &CliReporter) -> Result<bool, opal_core::Error> {
    let result = engine.run(reporter)?;

    println!();
    info!(
        "Index: {}, Fix: {}, Sync: {}, Validate: {}",
        format!("{:.2}s", result.index_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.fix_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.sync_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.validate_duration.as_secs_f64()).green(),
    );
    info!(
        "{} changed notes, {} rewritten, {} marked processed",
        format!("{}", result.fix.changed).yellow(),
        format!("{}", result.fix.rewritten).yellow(),
        format!("{}", result.fix.marked).yellow(),
    );
    info!(
        "{} new notes written from external records",
        format!("{}", result.files_written()).cyan(),
    );
    if !result.misnamed.is_empty() {
        warn!(
            "{} notes do not follow the '<date code> - <title>.md' naming",
            format!("{}", result.misnamed.len()).red(),
        );
    }

    Ok(print_validation(&result.validation))
}

fn print_validation(report: &ValidationReport) -> bool {
    for path in &report.missing {
        println!("{} {}", "missing:".red(), path);
    }
    for path in &report.duplicates {
        println!("{} {}", "duplicate:".red(), path);
    }
    if report.is_ok() {
        info!("{} files checked, vault is consistent", report.files_checked);
    } else {
        error!(
            "{} missing, {} duplicated",
            format!("{}", report.missing.len()).red(),
            format!("{}", report.duplicates.len()).red(),
        );
    }
    report.is_ok()
}
