//! `depsel install` command implementation.
//!
//! Installs the given package names into the project that owns `--cwd`,
//! streaming the package manager's output until it exits.

use super::{
    exit_code, hint, outcome_exit_code, print_json, search_path, InstallReport, EXIT_INTERRUPTED,
};
use crate::terminal::{StderrNotifier, TerminalSurface};
use depsel_core::install::{
    DependencyKind, DisplaySurface, InstallError, InstallOutcome, InstallRequest, MemoryNotifier,
    MemorySurface, Notifier, Orchestrator,
};
use depsel_core::{paths, Config};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

pub fn run(config: &Config, names: &[String], kind: DependencyKind, json: bool) -> Result<()> {
    let root = paths::project_root(&config.cwd);
    install_into(config, root, names, kind, json)
}

/// Install `names` into `root` and exit with a status mirroring the outcome.
pub fn install_into(
    config: &Config,
    root: Option<PathBuf>,
    names: &[String],
    kind: DependencyKind,
    json: bool,
) -> Result<()> {
    let request = match InstallRequest::new(root, names, kind) {
        Ok(request) => request,
        Err(err) => reject(config, &err, json),
    };

    let rt = tokio::runtime::Runtime::new().into_diagnostic()?;

    if json {
        let mut orchestrator = Orchestrator::new(
            config.manager,
            search_path(config),
            MemorySurface::default(),
            MemoryNotifier::default(),
        );
        let result = rt.block_on(drive(&mut orchestrator, &request));
        match result {
            Ok(Some(outcome)) => {
                print_json(&InstallReport::finished(orchestrator.surface(), &outcome));
                finish(&outcome)
            }
            Ok(None) => std::process::exit(EXIT_INTERRUPTED),
            Err(err) => reject(config, &err, json),
        }
    } else {
        let mut orchestrator = Orchestrator::new(
            config.manager,
            search_path(config),
            TerminalSurface::stdout(),
            StderrNotifier,
        );
        match rt.block_on(drive(&mut orchestrator, &request)) {
            Ok(Some(outcome)) => finish(&outcome),
            Ok(None) => std::process::exit(EXIT_INTERRUPTED),
            Err(err) => {
                // The notifier already printed the error.
                if let Some(hint) = hint(&err, config.manager) {
                    eprintln!("hint: {hint}");
                }
                std::process::exit(exit_code(&err));
            }
        }
    }
}

/// Run one install to completion. `Ok(None)` means it was interrupted.
async fn drive<S, N>(
    orchestrator: &mut Orchestrator<S, N>,
    request: &InstallRequest,
) -> Result<Option<InstallOutcome>, InstallError>
where
    S: DisplaySurface,
    N: Notifier,
{
    let handle = orchestrator.install(request).await?;
    tracing::debug!(install_id = handle.id, pid = handle.pid, "streaming install output");

    tokio::select! {
        outcome = orchestrator.wait() => Ok(Some(outcome.unwrap_or(InstallOutcome::Failed {
            code: -1,
            tail: Vec::new(),
        }))),
        _ = tokio::signal::ctrl_c() => {
            orchestrator.cancel().await;
            Ok(None)
        }
    }
}

fn finish(outcome: &InstallOutcome) -> Result<()> {
    match outcome_exit_code(outcome) {
        0 => Ok(()),
        code => std::process::exit(code),
    }
}

fn reject(config: &Config, err: &InstallError, json: bool) -> ! {
    if json {
        print_json(&InstallReport::rejected(err));
    } else {
        eprintln!("error: {err}");
        if let Some(hint) = hint(err, config.manager) {
            eprintln!("hint: {hint}");
        }
    }
    std::process::exit(exit_code(err));
}
