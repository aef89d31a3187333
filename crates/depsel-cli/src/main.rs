#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;
mod terminal;

use clap::Parser;
use commands::scan::{parse_line_range, LineRange, ScanAction};
use depsel_core::install::{DependencyKind, ManagerChoice};
use depsel_core::Config;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "depsel")]
#[command(author, version, long_about = None)]
#[command(about = "Install the packages a JavaScript selection imports")]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Package manager to install with (npm, yarn or cnpm)
    #[arg(long, global = true, env = "DEPSEL_MANAGER", value_name = "NAME")]
    manager: Option<ManagerChoice>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Install packages into the current project
    Install {
        /// Package names to install
        #[arg(required = true)]
        names: Vec<String>,

        /// Save as devDependencies
        #[arg(short = 'D', long)]
        dev: bool,
    },

    /// List the packages imported by a source file or a range of its lines
    Scan {
        /// JavaScript source file (.js, .jsx, .es6, .tag, .vue)
        file: PathBuf,

        /// Only scan this 1-based inclusive line range
        #[arg(long, value_name = "START:END", value_parser = parse_line_range)]
        lines: Option<LineRange>,

        /// Install the packages found
        #[arg(long)]
        install: bool,

        /// Save as devDependencies (with --install)
        #[arg(short = 'D', long, requires = "install")]
        dev: bool,
    },

    /// Read install requests from stdin, one per line; each replaces the running install
    Session,
}

fn kind(dev: bool) -> DependencyKind {
    if dev {
        DependencyKind::Development
    } else {
        DependencyKind::Runtime
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    // Build config: defaults, then the config file, then flags
    let mut config = Config::load(cwd.clone())
        .into_diagnostic()?
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);
    if let Some(manager) = cli.manager {
        config = config.with_manager(manager);
    }

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::Install { names, dev }) => {
            let span = tracing::info_span!("install", cmd = "install", cwd = %cwd.display());
            let _guard = span.enter();
            commands::install::run(&config, &names, kind(dev), cli.json)
        }
        Some(Commands::Scan {
            file,
            lines,
            install,
            dev,
        }) => {
            let span = tracing::info_span!("scan", cmd = "scan", cwd = %cwd.display());
            let _guard = span.enter();
            let action = ScanAction {
                file,
                lines,
                install,
                kind: kind(dev),
            };
            commands::scan::run(&config, action, cli.json)
        }
        Some(Commands::Session) => {
            let span = tracing::info_span!("session", cmd = "session", cwd = %cwd.display());
            let _guard = span.enter();
            commands::session::run(&config, cli.json)
        }
    }
}
