mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};
use cloud_dedupe_core::{
    report, resolve, AppConfig, CancelFlag, DedupeEngine, LocalProvider, ProgressReporter,
};
use colored::*;
use commands::{Cli, Commands, RuleArg};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match cloud_dedupe_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Scan {
            rule,
            suffix,
            report,
            delete,
        }) => {
            if let Err(err) = run_scan(config, rule, suffix, report, delete) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::TestConnection) => {
            if let Err(err) = run_test_connection(config) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn connect(config: AppConfig) -> Result<DedupeEngine, Box<dyn std::error::Error>> {
    let mount_point = config.mount_point.clone();
    let mut engine = DedupeEngine::new(config);
    engine.connect(Box::new(LocalProvider::new(mount_point)))?;
    Ok(engine)
}

fn run_scan(
    config: AppConfig,
    rule_arg: RuleArg,
    suffix: Option<String>,
    report_path: Option<PathBuf>,
    delete: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let rule = rule_arg.into_rule(suffix)?;
    let engine = connect(config)?;
    let reporter = CliReporter::new();
    let cancel = CancelFlag::new();

    let outcome = engine.scan(&reporter, &cancel)?;

    println!();
    if outcome.sets.is_empty() {
        info!(
            "No duplicate video files found. ({} videos checked, {} skipped for missing hashes)",
            outcome.stats.videos_processed, outcome.stats.hash_skips
        );
        return Ok(());
    }

    let wasted: u64 = outcome.sets.values().map(|s| s.wasted_bytes()).sum();
    info!(
        "{} duplicate sets, {} files, {} wasted",
        format!("{}", outcome.set_count()).red(),
        format!("{}", outcome.file_count()).red(),
        format!("{:.2} MB", wasted as f64 / (1024.0 * 1024.0)).red(),
    );

    let decisions = resolve(&outcome.sets, &rule)?;
    let deletions = decisions.deletions();
    info!(
        "Rule '{}' marked {} file(s) for deletion.",
        rule.label(),
        format!("{}", deletions.len()).yellow(),
    );

    if let Some(path) = report_path {
        let sets_written = report::save_report(&outcome.sets, &path)?;
        println!(
            "Report with {} sets written to {}",
            sets_written,
            path.display()
        );
    }

    if delete {
        run_delete(&engine, &deletions, &reporter, &cancel)?;
    }

    Ok(())
}

fn run_delete(
    engine: &DedupeEngine,
    deletions: &[String],
    reporter: &dyn ProgressReporter,
    cancel: &CancelFlag,
) -> Result<(), Box<dyn std::error::Error>> {
    if deletions.is_empty() {
        info!("No files are marked for deletion.");
        return Ok(());
    }

    let prompt = format!(
        "Permanently delete {} marked file(s)? THIS CANNOT BE UNDONE",
        deletions.len()
    );
    if !prompt_confirm(&prompt, Some(false))? {
        info!("Deletion cancelled.");
        return Ok(());
    }

    let outcome = engine.delete(deletions, reporter, cancel)?;
    info!(
        "Deleted {} of {} files.",
        format!("{}", outcome.deleted).green(),
        outcome.attempted,
    );
    if !outcome.failures.is_empty() {
        warn!("{} file(s) could not be deleted; see log.", outcome.failures.len());
    }

    Ok(())
}

fn run_test_connection(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let address = config.address.clone();
    match connect(config) {
        Ok(_) => {
            println!("{}", "Connection successful.".green());
            Ok(())
        }
        Err(err) => {
            error!("Error connecting to '{}': {}", address, err);
            process::exit(1);
        }
    }
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
