//! Argument vectors for each package manager.

use super::manager::{DependencyKind, ManagerChoice};

/// Build the argument vector that installs `names` with `manager`.
///
/// Pure and deterministic: yarn takes `add <names> [--dev]`; npm and cnpm
/// take `install <names> (-D|-S) -d`.
#[must_use]
pub fn build_args(manager: ManagerChoice, kind: DependencyKind, names: &[String]) -> Vec<String> {
    let mut args = Vec::with_capacity(names.len() + 3);
    args.push(manager.install_verb().to_string());
    args.extend(names.iter().cloned());

    match manager {
        ManagerChoice::Yarn => {
            if kind == DependencyKind::Development {
                args.push("--dev".to_string());
            }
        }
        ManagerChoice::Npm | ManagerChoice::Cnpm => {
            let save = match kind {
                DependencyKind::Development => "-D",
                DependencyKind::Runtime => "-S",
            };
            args.push(save.to_string());
            args.push("-d".to_string());
        }
    }

    args
}

/// A ready-to-run install invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    manager: ManagerChoice,
    args: Vec<String>,
}

impl InstallCommand {
    #[must_use]
    pub fn new(manager: ManagerChoice, kind: DependencyKind, names: &[String]) -> Self {
        Self {
            manager,
            args: build_args(manager, kind, names),
        }
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Display title, e.g. `yarn add lodash --dev`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {}", self.manager, self.args.join(" "))
    }
}
