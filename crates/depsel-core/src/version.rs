/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the version banner printed by `depsel version`.
#[must_use]
pub fn version_string() -> String {
    match option_env!("DEPSEL_BUILD_GIT_HASH") {
        Some(hash) => format!("depsel {VERSION} ({hash})"),
        None => format!("depsel {VERSION}"),
    }
}
