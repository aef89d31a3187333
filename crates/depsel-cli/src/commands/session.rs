//! `depsel session` command implementation.
//!
//! Reads install requests from stdin, one per line (`[-D] name name ...`).
//! A request arriving while an install runs replaces it. The session ends at
//! EOF once the last install has exited.

use super::{hint, print_json, search_path, InstallReport, EXIT_ERROR, EXIT_INTERRUPTED};
use crate::terminal::{StderrNotifier, TerminalSurface};
use depsel_core::install::{
    DependencyKind, DisplaySurface, InstallError, InstallOutcome, InstallRequest, MemoryNotifier,
    MemorySurface, Notifier, Orchestrator,
};
use depsel_core::{paths, Config};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Parse one request line. Returns `None` for blank lines and comments.
pub fn parse_request_line(line: &str) -> Option<(DependencyKind, Vec<String>)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut kind = DependencyKind::Runtime;
    let mut names = Vec::new();
    for token in line.split_whitespace() {
        match token {
            "-D" | "--dev" => kind = DependencyKind::Development,
            _ => names.push(token.to_string()),
        }
    }
    Some((kind, names))
}

/// What happened to one request.
enum Event<'a> {
    Rejected(&'a InstallError),
    Finished(&'a InstallOutcome),
}

/// Totals for a finished session.
#[derive(Debug, Default)]
struct Summary {
    failed: usize,
    interrupted: bool,
}

pub fn run(config: &Config, json: bool) -> Result<()> {
    let root = paths::project_root(&config.cwd);
    let rt = tokio::runtime::Runtime::new().into_diagnostic()?;

    let summary = if json {
        let mut orchestrator = Orchestrator::new(
            config.manager,
            search_path(config),
            MemorySurface::default(),
            MemoryNotifier::default(),
        );
        rt.block_on(serve(&mut orchestrator, root, |orchestrator, event| {
            let report = match event {
                Event::Rejected(err) => InstallReport::rejected(err),
                Event::Finished(outcome) => {
                    InstallReport::finished(orchestrator.surface(), outcome)
                }
            };
            match serde_json::to_string(&report) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("error: failed to encode JSON output: {e}"),
            }
        }))?
    } else {
        let manager = config.manager;
        let mut orchestrator = Orchestrator::new(
            manager,
            search_path(config),
            TerminalSurface::stdout(),
            StderrNotifier,
        );
        rt.block_on(serve(&mut orchestrator, root, |_, event| match event {
            Event::Rejected(err) => {
                if let Some(hint) = hint(err, manager) {
                    eprintln!("hint: {hint}");
                }
            }
            Event::Finished(InstallOutcome::Succeeded) => {}
            Event::Finished(InstallOutcome::Failed { code, .. }) => {
                eprintln!("error: install failed with exit code {code}");
            }
        }))?
    };

    if summary.interrupted {
        std::process::exit(EXIT_INTERRUPTED);
    }
    if summary.failed > 0 {
        std::process::exit(EXIT_ERROR);
    }
    Ok(())
}

async fn serve<S, N, F>(
    orchestrator: &mut Orchestrator<S, N>,
    root: Option<PathBuf>,
    mut report: F,
) -> Result<Summary>
where
    S: DisplaySurface,
    N: Notifier,
    F: FnMut(&Orchestrator<S, N>, Event<'_>),
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut summary = Summary::default();

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.into_diagnostic()? else {
                    tracing::debug!("stdin closed");
                    stdin_open = false;
                    continue;
                };
                let Some((kind, names)) = parse_request_line(&line) else {
                    continue;
                };
                let submitted = match InstallRequest::new(root.clone(), &names, kind) {
                    Ok(request) => orchestrator.install(&request).await.map(|_| ()),
                    Err(err) => Err(err),
                };
                if let Err(err) = submitted {
                    if matches!(err, InstallError::EmptyRequest) {
                        // Rejected before reaching the orchestrator.
                        orchestrator.notifier_mut().error(&err.to_string());
                    }
                    summary.failed += 1;
                    report(orchestrator, Event::Rejected(&err));
                }
            }
            Some(outcome) = orchestrator.wait(), if orchestrator.is_busy() => {
                if !outcome.is_success() {
                    summary.failed += 1;
                }
                report(orchestrator, Event::Finished(&outcome));
            }
            _ = tokio::signal::ctrl_c() => {
                orchestrator.cancel().await;
                summary.interrupted = true;
                break;
            }
        }

        if !stdin_open && !orchestrator.is_busy() {
            break;
        }
    }

    Ok(summary)
}
