//! `depsel scan` command implementation.
//!
//! Extracts the packages a selection of a source file imports, and optionally
//! hands them to the installer.

use super::{print_json, ErrorInfo, EXIT_ERROR, EXIT_USAGE};
use depsel_core::imports::{extract_dependencies, is_supported_source, select_lines};
use depsel_core::install::DependencyKind;
use depsel_core::{paths, Config};
use miette::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Error code for files that are not JavaScript-like sources.
const SCAN_UNSUPPORTED_FILE: &str = "SCAN_UNSUPPORTED_FILE";

/// Error code for unreadable files.
const SCAN_READ_FAILED: &str = "SCAN_READ_FAILED";

/// A 1-based inclusive line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

/// Parse `A:B` into a line range.
pub fn parse_line_range(s: &str) -> Result<LineRange, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{s}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("invalid line number '{part}'"))
    };
    let range = LineRange {
        start: parse(start)?,
        end: parse(end)?,
    };
    if range.end < range.start {
        return Err(format!("range end {} is before start {}", range.end, range.start));
    }
    Ok(range)
}

/// Options for a scan.
#[derive(Debug, Clone)]
pub struct ScanAction {
    pub file: PathBuf,
    pub lines: Option<LineRange>,
    pub install: bool,
    pub kind: DependencyKind,
}

/// Result for JSON output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanResult {
    ok: bool,
    file: String,
    project_root: Option<String>,
    dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorInfo>,
}

pub fn run(config: &Config, action: ScanAction, json: bool) -> Result<()> {
    let file = if action.file.is_absolute() {
        action.file.clone()
    } else {
        config.cwd.join(&action.file)
    };

    if !is_supported_source(&file) {
        fail(
            &file,
            ErrorInfo::new(
                SCAN_UNSUPPORTED_FILE,
                format!("'{}' is not a JavaScript source file", file.display()),
            ),
            EXIT_USAGE,
            json,
        );
    }

    let source = match std::fs::read_to_string(&file) {
        Ok(source) => source,
        Err(e) => fail(
            &file,
            ErrorInfo::new(
                SCAN_READ_FAILED,
                format!("failed to read '{}': {e}", file.display()),
            ),
            EXIT_ERROR,
            json,
        ),
    };

    let selection = match action.lines {
        Some(range) => select_lines(&source, range.start, range.end),
        None => source,
    };
    let dependencies = extract_dependencies(&selection);
    let project_root = paths::project_root(&file);
    tracing::debug!(
        file = %file.display(),
        count = dependencies.len(),
        "scanned selection"
    );

    if action.install {
        if dependencies.is_empty() {
            if !json {
                eprintln!("no dependencies found in selection");
            }
            return Ok(());
        }
        return super::install::install_into(
            config,
            project_root,
            &dependencies,
            action.kind,
            json,
        );
    }

    if json {
        print_json(&ScanResult {
            ok: true,
            file: file.display().to_string(),
            project_root: project_root.map(|p| p.display().to_string()),
            dependencies,
            error: None,
        });
    } else {
        for name in &dependencies {
            println!("{name}");
        }
    }

    Ok(())
}

fn fail(file: &Path, error: ErrorInfo, code: i32, json: bool) -> ! {
    if json {
        print_json(&ScanResult {
            ok: false,
            file: file.display().to_string(),
            project_root: None,
            dependencies: Vec::new(),
            error: Some(error),
        });
    } else {
        eprintln!("error: {}", error.message);
    }
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_range() {
        assert_eq!(
            parse_line_range("3:10"),
            Ok(LineRange { start: 3, end: 10 })
        );
        assert_eq!(parse_line_range("7:7"), Ok(LineRange { start: 7, end: 7 }));
    }

    #[test]
    fn test_parse_line_range_rejects_bad_input() {
        assert!(parse_line_range("10").is_err());
        assert!(parse_line_range("0:4").is_err());
        assert!(parse_line_range("a:b").is_err());
        assert!(parse_line_range("9:2").is_err());
    }
}
