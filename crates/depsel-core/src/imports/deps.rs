//! Turning a text selection into installable package names.

use super::scan::scan_specifiers;
use std::collections::HashSet;
use std::path::Path;

/// Source file extensions whose selections are scanned.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["js", "jsx", "es6", "tag", "vue"];

/// Node.js core modules, which are never installed from the registry.
const CORE_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// npm rejects package names longer than this.
const MAX_NAME_LEN: usize = 214;

/// Whether a file is a source type whose selections are scanned.
#[must_use]
pub fn is_supported_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// Extract the package names a selection depends on.
///
/// Only selections mentioning `require` or `import` are scanned. Relative,
/// absolute and core-module specifiers are dropped, deep imports are reduced
/// to their package, and names keep first-appearance order without repeats.
#[must_use]
pub fn extract_dependencies(selection: &str) -> Vec<String> {
    if !selection.contains("require") && !selection.contains("import") {
        return Vec::new();
    }

    let names = scan_specifiers(selection)
        .into_iter()
        .filter(|spec| is_bare_specifier(&spec.raw))
        .filter_map(|spec| package_name(&spec.raw).map(str::to_string))
        .filter(|name| !is_core_module(name) && is_valid_package_name(name));

    dedupe_names(names)
}

/// Trim names, drop empty ones and repeats, keeping first-appearance order.
pub fn dedupe_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

/// A bare specifier names a package rather than a file or URL.
#[must_use]
pub fn is_bare_specifier(specifier: &str) -> bool {
    !specifier.is_empty()
        && !specifier.starts_with('.')
        && !specifier.starts_with('/')
        && !specifier.starts_with('\\')
        && !specifier.starts_with("node:")
        && !specifier.contains("://")
        && !specifier.starts_with("data:")
}

/// The package part of a bare specifier (`lodash/fp` → `lodash`,
/// `@babel/core/lib/x` → `@babel/core`).
#[must_use]
pub fn package_name(specifier: &str) -> Option<&str> {
    if specifier.starts_with('@') {
        let mut slashes = specifier.match_indices('/').map(|(i, _)| i);
        let _scope_end = slashes.next()?;
        Some(match slashes.next() {
            Some(end) => &specifier[..end],
            None => specifier,
        })
    } else {
        specifier.split('/').next().filter(|name| !name.is_empty())
    }
}

/// Whether `name` is a Node.js core module (with or without `node:`).
#[must_use]
pub fn is_core_module(name: &str) -> bool {
    let name = name.strip_prefix("node:").unwrap_or(name);
    let base = name.split('/').next().unwrap_or(name);
    CORE_MODULES.contains(&base)
}

fn is_valid_package_name(name: &str) -> bool {
    name.len() <= MAX_NAME_LEN
        && !name.starts_with('_')
        && !name.chars().any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '\\'))
        && name.trim_start_matches('@').split('/').all(|part| !part.is_empty())
}

/// Select a 1-based inclusive line range of `source`.
///
/// Out-of-range bounds are clamped; an empty range yields an empty string.
#[must_use]
pub fn select_lines(source: &str, start: usize, end: usize) -> String {
    let start = start.max(1);
    if end < start {
        return String::new();
    }
    source
        .lines()
        .skip(start - 1)
        .take(end - start + 1)
        .collect::<Vec<_>>()
        .join("\n")
}
