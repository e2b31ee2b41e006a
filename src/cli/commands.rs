//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{DocumentReport, WriteMode, POM_FILE_NAME};
use crate::cli::args::{Cli, Commands, ConfigCommands, SortArgs};
use crate::cli::error::{application_exit_code, CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::PassKind;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(InfraError::WorkingDirectory)?,
    };

    match &cli.command {
        Commands::Config { command } => _config(command, &project_dir),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        command => match command.sort_request() {
            Some((args, kinds)) => {
                let settings = Settings::load(Some(&project_dir))?;
                let container = ServiceContainer::new(settings);
                _sort(&container, &project_dir, args, &kinds)
            }
            None => Err(CliError::Usage(format!("unsupported command: {:?}", command))),
        },
    }
}

/// Sort every requested document; each one succeeds or fails on its own.
#[instrument(skip(container, args))]
pub fn _sort(
    container: &ServiceContainer,
    project_dir: &Path,
    args: &SortArgs,
    kinds: &[PassKind],
) -> CliResult<()> {
    let mode = match (args.dry_run, args.check) {
        (true, _) => WriteMode::DryRun,
        (_, true) => WriteMode::Check,
        _ => WriteMode::Write,
    };
    let inputs: Vec<PathBuf> = if args.paths.is_empty() {
        vec![project_dir.join(POM_FILE_NAME)]
    } else {
        args.paths.clone()
    };

    let service = &container.sort_service;
    let documents = service.discover(&inputs, args.recursive)?;
    debug!(count = documents.len(), ?mode, "sorting documents");

    let mut failed = 0;
    let mut first_exit_code = None;
    let mut unsorted = 0;
    for path in &documents {
        match service.sort_path(path, kinds, args.project_id.as_deref(), mode) {
            Ok(report) => {
                if report.changed {
                    unsorted += 1;
                }
                print_report(&report, mode, documents.len() > 1)?;
            }
            Err(e) => {
                output::error(&format!("{}: {}", path.display(), e));
                failed += 1;
                first_exit_code.get_or_insert(application_exit_code(&e));
            }
        }
    }

    if let Some(exit_code) = first_exit_code {
        return Err(CliError::Failed {
            failed,
            total: documents.len(),
            exit_code,
        });
    }
    if mode == WriteMode::Check && unsorted > 0 {
        return Err(CliError::Unsorted(unsorted));
    }
    Ok(())
}

fn print_report(report: &DocumentReport, mode: WriteMode, many: bool) -> CliResult<()> {
    let path = report.path.as_path();
    match mode {
        WriteMode::Write if report.written => {
            output::sorted(path, &report.project_id, report.sorted())
        }
        WriteMode::Write => output::unchanged(path),
        WriteMode::Check => output::check(path, !report.changed),
        WriteMode::DryRun => {
            if many {
                output::document_header(path);
            }
            if let Some(text) = &report.output {
                output::text("document", text)?;
            }
        }
    }
    Ok(())
}

#[instrument]
fn _config(command: &ConfigCommands, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::text("config", &settings.to_toml()?)?;
        }
        ConfigCommands::Template => output::text("config template", &Settings::template())?,
        ConfigCommands::Path => {
            let local = local_config_path(project_dir);
            let global = match global_config_path() {
                Some(global) => format!("global: {}{}", global.display(), exists_marker(&global)),
                None => "global: (no config directory)".to_string(),
            };
            output::line("config path", &global)?;
            output::line(
                "config path",
                &format!("local:  {}{}", local.display(), exists_marker(&local)),
            )?;
        }
    }
    Ok(())
}

fn exists_marker(path: &Path) -> &'static str {
    if path.exists() {
        ""
    } else {
        " (not found)"
    }
}
