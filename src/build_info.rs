//! Build information
//!
//! `build.rs` injects the build counter and timestamp; the schema version is
//! the one this binary migrates databases to.

use serde::Serialize;

use crate::db::migrations::SCHEMA_VERSION;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Local build counter, 0 when built without the build script's env
pub fn build_number() -> u64 {
    option_env!("DISCIPLINE_BUILD_NUMBER")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

pub fn build_timestamp() -> &'static str {
    option_env!("DISCIPLINE_BUILD_TIMESTAMP").unwrap_or("unknown")
}

/// What the running binary is, as reported by `discipline_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub schema_version: i32,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: build_number(),
            build_timestamp: build_timestamp(),
            schema_version: SCHEMA_VERSION,
        }
    }

    /// `0.1.0+build.42`
    pub fn version_label(&self) -> String {
        format!("{}+build.{}", self.version, self.build_number)
    }
}

/// Startup banner on stderr; stdout is the MCP transport
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("discipline {} (schema v{})", info.version_label(), info.schema_version);
    eprintln!("  compiled {}", info.build_timestamp);
}
