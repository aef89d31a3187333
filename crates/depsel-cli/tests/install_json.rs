//! Integration tests for `depsel install`, `depsel scan` and `depsel session`
//! against fake package managers.

#![cfg(unix)]

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::{tempdir, TempDir};

/// A project directory plus a bin directory holding fake package managers.
struct Fixture {
    project: TempDir,
    bin: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let project = tempdir().unwrap();
        std::fs::write(project.path().join("package.json"), r#"{"name":"demo"}"#).unwrap();
        Self {
            project,
            bin: tempdir().unwrap(),
        }
    }

    /// Add a fake manager that echoes its arguments and runs `body`.
    fn manager(&self, name: &str, body: &str) -> &Self {
        let path = self.bin.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\necho \"args: $*\"\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        self
    }

    /// `depsel` run from the project directory.
    fn depsel(&self) -> Command {
        self.depsel_in(self.project.path())
    }

    fn depsel_in(&self, cwd: &Path) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_depsel"));
        cmd.env("PATH", self.bin.path())
            .env("DEPSEL_CONFIG", self.bin.path().join("no-config.json"))
            .env_remove("DEPSEL_MANAGER")
            .env_remove("RUST_LOG")
            .arg("--cwd")
            .arg(cwd);
        cmd
    }

    fn write_source(&self, name: &str, content: &str) -> std::path::PathBuf {
        let path = self.project.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

#[test]
fn test_install_json_success() {
    let fixture = Fixture::new();
    fixture.manager("yarn", "printf '\\033[32msuccess\\033[0m Saved 1 new dependency.\\n'");

    let output = fixture
        .depsel()
        .args(["--json", "--manager", "yarn", "install", "-D", "lodash"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let json = stdout_json(&output);
    assert_eq!(json["ok"], true);
    assert_eq!(json["title"], "yarn add lodash --dev");
    assert_eq!(json["exitCode"], 0);

    let lines = json["output"].as_array().unwrap();
    assert_eq!(lines[0], "args: add lodash --dev");
    assert_eq!(
        lines[1],
        "<span style=\"color:#0A0\">success</span> Saved 1 new dependency."
    );
}

#[test]
fn test_install_json_failure_mirrors_exit_code() {
    let fixture = Fixture::new();
    fixture.manager("npm", "echo 'npm ERR! 404 Not Found' >&2\nexit 3");

    let output = fixture
        .depsel()
        .args(["--json", "install", "not-a-real-package"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let json = stdout_json(&output);
    assert_eq!(json["ok"], false);
    assert_eq!(json["exitCode"], 3);
    let lines: Vec<&str> = json["output"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|l| l.as_str())
        .collect();
    assert!(lines.contains(&"npm ERR! 404 Not Found"));
    assert_eq!(
        lines.last(),
        Some(&"npm install not-a-real-package -S -d exited with code 3")
    );
}

#[test]
fn test_install_binary_not_found() {
    let fixture = Fixture::new();

    let output = fixture
        .depsel()
        .args(["--manager", "cnpm", "install", "lodash"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(127));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: cnpm not found"), "{stderr}");
    assert!(stderr.contains("hint:"), "{stderr}");
}

#[test]
fn test_install_without_project_root() {
    let fixture = Fixture::new();
    fixture.manager("npm", "exit 0");
    let outside = tempdir().unwrap();

    let output = fixture
        .depsel_in(outside.path())
        .args(["--json", "install", "lodash"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output);
    assert_eq!(json["error"]["code"], "INSTALL_NO_PROJECT_ROOT");
}

#[test]
fn test_install_terminal_output() {
    let fixture = Fixture::new();
    fixture.manager("npm", "echo '  added 1 package'");

    let output = fixture
        .depsel()
        .args(["install", "left-pad"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "> npm install left-pad -S -d\n\
         args: install left-pad -S -d\n  added 1 package\n\
         > npm install left-pad -S -d done\n"
    );
}

#[test]
fn test_scan_lists_dependencies() {
    let fixture = Fixture::new();
    let file = fixture.write_source(
        "app.js",
        "import React from 'react';\n\
         import { map } from 'lodash/fp';\n\
         const fs = require('fs');\n\
         import util from './util';\n",
    );

    let output = fixture
        .depsel()
        .arg("--json")
        .arg("scan")
        .arg(&file)
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let json = stdout_json(&output);
    assert_eq!(json["dependencies"], serde_json::json!(["react", "lodash"]));
    assert_eq!(
        json["projectRoot"].as_str().map(Path::new),
        Some(fixture.project.path())
    );
}

#[test]
fn test_scan_line_range() {
    let fixture = Fixture::new();
    let file = fixture.write_source(
        "app.js",
        "import a from 'alpha';\nimport b from 'beta';\nimport c from 'gamma';\n",
    );

    let output = fixture
        .depsel()
        .arg("scan")
        .arg(&file)
        .args(["--lines", "2:3"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "beta\ngamma\n");
}

#[test]
fn test_scan_rejects_unsupported_file() {
    let fixture = Fixture::new();
    let file = fixture.write_source("main.ts", "import x from 'x';\n");

    let output = fixture.depsel().arg("scan").arg(&file).output().unwrap();

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_scan_install_runs_manager() {
    let fixture = Fixture::new();
    fixture.manager("npm", "exit 0");
    let file = fixture.write_source("index.jsx", "import axios from 'axios';\n");

    let output = fixture
        .depsel()
        .arg("--json")
        .arg("scan")
        .arg(&file)
        .args(["--install", "-D"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let json = stdout_json(&output);
    assert_eq!(json["title"], "npm install axios -D -d");
    assert_eq!(json["output"][0], "args: install axios -D -d");
}

#[test]
fn test_session_reports_each_install() {
    let fixture = Fixture::new();
    fixture.manager("npm", "exit 0");

    let mut child = fixture
        .depsel()
        .args(["--json", "session"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"\n# comment\n-D jest\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let reports: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(reports.len(), 1, "{stdout}");
    assert_eq!(reports[0]["ok"], true);
    assert_eq!(reports[0]["title"], "npm install jest -D -d");
}

#[test]
fn test_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_depsel"))
        .arg("version")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("depsel "));
}
