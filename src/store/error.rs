use std::path::PathBuf;
use thiserror::Error;

/// Listing store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database directory could not be created
    #[error("failed to create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Database file could not be opened
    #[error("failed to open database {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    /// Schema could not be created or is incompatible
    #[error("failed to initialize schema ({step}): {source}")]
    Schema {
        step: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Record rejected before reaching the database
    #[error("invalid listing record: {0}")]
    InvalidRecord(String),

    /// A single record's transaction failed and was rolled back
    #[error("upsert failed for {url} (source: {listing_source}): {error}")]
    Upsert {
        url: String,
        listing_source: String,
        #[source]
        error: sqlx::Error,
    },

    /// No connection or transaction could be obtained at all
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// Reading listings failed
    #[error("failed to query listings: {0}")]
    Query(#[source] sqlx::Error),
}

impl StoreError {
    /// Whether the failure is confined to one record, so a batch can move on
    pub fn is_record_level(&self) -> bool {
        matches!(self, Self::InvalidRecord(_) | Self::Upsert { .. })
    }

    /// Whether this error happened while opening the store
    pub fn is_init(&self) -> bool {
        matches!(
            self,
            Self::CreateDir { .. } | Self::Connect { .. } | Self::Schema { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
