use crate::models::NewListing;
use crate::scrapers::traits::ListingSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A scraper output file holds either one record or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Many(Vec<NewListing>),
    One(NewListing),
}

/// Reads normalized listing records that a scraper wrote to disk
pub struct JsonFileSource {
    path: PathBuf,
    name: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    /// One source per `*.json` file in `dir`, sorted by file name.
    /// A missing directory yields no sources.
    pub async fn discover(dir: &Path) -> Result<Vec<Self>> {
        if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
            debug!(dir = %dir.display(), "Import directory does not exist");
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to read import directory {}", dir.display()))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        info!("Found {} import files in {}", paths.len(), dir.display());
        Ok(paths.into_iter().map(Self::new).collect())
    }
}

#[async_trait]
impl ListingSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<NewListing>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        let records = match serde_json::from_str::<Payload>(&raw)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?
        {
            Payload::Many(records) => records,
            Payload::One(record) => vec![record],
        };

        debug!(file = %self.path.display(), count = records.len(), "Loaded listing records");
        Ok(records)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
