use anyhow::Result;
use serde::Serialize;

use super::helpers::DEFAULT_API_URL;
use crate::output::{banner, emit, OutputMode};

#[derive(Serialize)]
struct VersionInfo {
    cli: &'static str,
    version: &'static str,
    target: String,
    default_api: &'static str,
}

pub fn execute(mode: OutputMode) -> Result<()> {
    let info = VersionInfo {
        cli: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        target: format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS),
        default_api: DEFAULT_API_URL,
    };

    emit(mode, &info, |i| banner::print_version_block(i.version, &i.target, i.default_api))
}
