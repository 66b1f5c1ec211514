//! File-based runtime configuration (`kolo.toml`).

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
    pub reconciler: Option<Reconciler>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the crate-level env filter (`info`, `debug`, ...).
    pub level: String,
}

/// Storage backend. `memory` is for local experiments only; its data lives
/// and dies with the process.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Reconciler {
    /// Seconds between sweeps; the built-in default applies when omitted.
    pub interval_secs: Option<u64>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("kolo"))
            .build()?
            .try_deserialize()
    }
}
