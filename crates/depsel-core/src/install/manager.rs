//! Package manager choice and install requests.

use super::error::InstallError;
use crate::error::Error;
use crate::imports::dedupe_names;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported package manager front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ManagerChoice {
    #[default]
    Npm,
    Yarn,
    Cnpm,
}

impl ManagerChoice {
    pub const ALL: [Self; 3] = [Self::Npm, Self::Yarn, Self::Cnpm];

    /// Executable name without any platform suffix.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Cnpm => "cnpm",
        }
    }

    /// Subcommand that adds packages.
    #[must_use]
    pub fn install_verb(&self) -> &'static str {
        match self {
            Self::Yarn => "add",
            Self::Npm | Self::Cnpm => "install",
        }
    }
}

impl fmt::Display for ManagerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManagerChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownManager(s.to_string()))
    }
}

/// Which dependency table the packages are saved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    #[default]
    Runtime,
    Development,
}

/// A validated request to install packages into a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    project_root: Option<PathBuf>,
    names: Vec<String>,
    kind: DependencyKind,
}

impl InstallRequest {
    /// Build a request, de-duplicating names in first-appearance order.
    ///
    /// `project_root` is checked when the request is submitted, so a request
    /// without one can still be reported through the orchestrator.
    pub fn new<I, S>(
        project_root: Option<PathBuf>,
        names: I,
        kind: DependencyKind,
    ) -> Result<Self, InstallError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = dedupe_names(names);
        if names.is_empty() {
            return Err(InstallError::EmptyRequest);
        }
        Ok(Self {
            project_root,
            names,
            kind,
        })
    }

    #[must_use]
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn kind(&self) -> DependencyKind {
        self.kind
    }
}
