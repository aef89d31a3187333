//! `depsel version` command implementation.

use super::print_json;
use depsel_core::version::version_string;
use depsel_core::VERSION;
use miette::Result;
use serde::Serialize;

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

pub fn run(json: bool) -> Result<()> {
    if json {
        print_json(&VersionInfo {
            name: "depsel",
            version: VERSION,
        });
    } else {
        println!("{}", version_string());
    }
    Ok(())
}
