//! Listing storage using SQLite
//!
//! Single dedupe point for every scraper source. Listings are keyed by url;
//! a price change updates the listing and appends to `price_history` in the
//! same transaction.

mod error;
mod migrations;
mod queries;


pub use error::{Result, StoreError};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::Config;

/// SQLite-backed listing store
pub struct ListingStore {
    pub(super) pool: SqlitePool,
    /// Held for the whole read-compare-write of an upsert
    pub(super) write_gate: Mutex<()>,
    pub(super) default_state: String,
    path: PathBuf,
}

impl ListingStore {
    /// Open the store described by `config`, creating directory, file and
    /// schema as needed. Safe to call on every start.
    pub async fn open(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.db_path).map_err(|source| StoreError::CreateDir {
            path: config.db_path.clone(),
            source,
        })?;

        let path = config.db_file();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Connect {
                path: path.clone(),
                source,
            })?;

        let store = Self {
            pool,
            write_gate: Mutex::new(()),
            default_state: config.target_state.clone(),
            path,
        };
        store.migrate().await?;

        info!(path = %store.path.display(), "Listing store initialized");
        Ok(store)
    }

    /// Location of the database file
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
