//! Runtime configuration
//!
//! Built once at startup from defaults, an optional `config/local` file and
//! the process environment, then passed by reference to whatever needs it.

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "./data";
const DEFAULT_DB_NAME: &str = "wv_apartments.db";
const DEFAULT_TARGET_STATE: &str = "WV";
const DEFAULT_TARGET_CITIES: [&str; 4] = ["Morgantown", "Buckhannon", "Charleston", "Huntington"];
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_IMPORT_DIR: &str = "./raw_scrape";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Directory holding the database file
    pub db_path: PathBuf,
    pub db_name: String,
    /// State stored on listings that don't report one
    pub target_state: String,
    pub target_cities: Vec<String>,
    pub max_connections: u32,
    /// How long a writer waits on another process holding the database lock
    pub busy_timeout_secs: u64,
    pub log_level: String,
    /// Directory scanned for scraper output files
    pub import_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            db_name: DEFAULT_DB_NAME.to_string(),
            target_state: DEFAULT_TARGET_STATE.to_string(),
            target_cities: DEFAULT_TARGET_CITIES.iter().map(|c| c.to_string()).collect(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_secs: DEFAULT_BUSY_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            import_dir: PathBuf::from(DEFAULT_IMPORT_DIR),
        }
    }
}

impl Config {
    /// Load configuration: `.env`, then defaults < `config/local` < environment
    pub fn load() -> Result<Self> {
        // A missing .env file is the normal case outside development.
        let _ = dotenvy::dotenv();

        Self::with_defaults()?
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("target_cities"),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    fn with_defaults() -> Result<ConfigBuilder<DefaultState>> {
        let cities: Vec<String> = DEFAULT_TARGET_CITIES.iter().map(|c| c.to_string()).collect();

        Ok(config::Config::builder()
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("db_name", DEFAULT_DB_NAME)?
            .set_default("target_state", DEFAULT_TARGET_STATE)?
            .set_default("target_cities", cities)?
            .set_default("max_connections", i64::from(DEFAULT_MAX_CONNECTIONS))?
            .set_default("busy_timeout_secs", DEFAULT_BUSY_TIMEOUT_SECS as i64)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("import_dir", DEFAULT_IMPORT_DIR)?)
    }

    /// Full path of the database file
    pub fn db_file(&self) -> PathBuf {
        self.db_path.join(&self.db_name)
    }

    /// Config rooted at `dir`, used by tests and tools that need a throwaway store
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            db_path: dir.into(),
            ..Default::default()
        }
    }
}
