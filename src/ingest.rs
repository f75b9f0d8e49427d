//! One ingest pass: every source fetched and written to the store concurrently
//!
//! A bad record or a source that fails to fetch is logged and counted; only a
//! store-wide failure stops the pass.

use futures::future::try_join_all;
use std::ops::AddAssign;
use tracing::{info, warn};

use crate::models::UpsertOutcome;
use crate::scrapers::ListingSource;
use crate::store::{ListingStore, StoreError};

/// Counts reported at the end of a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub sources_failed: usize,
}

impl PassSummary {
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged + self.failed
    }

    fn record(&mut self, outcome: &UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted { .. } => self.inserted += 1,
            UpsertOutcome::Updated { .. } => self.updated += 1,
            UpsertOutcome::Unchanged { .. } => self.unchanged += 1,
        }
    }
}

impl AddAssign for PassSummary {
    fn add_assign(&mut self, other: Self) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.failed += other.failed;
        self.sources_failed += other.sources_failed;
    }
}

/// Run every source once against `store`
pub async fn run_pass(
    store: &ListingStore,
    sources: &[Box<dyn ListingSource>],
) -> Result<PassSummary, StoreError> {
    let tallies = try_join_all(
        sources
            .iter()
            .map(|source| ingest_source(store, source.as_ref())),
    )
    .await?;

    let mut summary = PassSummary::default();
    for tally in tallies {
        summary += tally;
    }

    info!(
        inserted = summary.inserted,
        updated = summary.updated,
        unchanged = summary.unchanged,
        failed = summary.failed,
        sources_failed = summary.sources_failed,
        "Ingest pass complete"
    );
    Ok(summary)
}

async fn ingest_source(
    store: &ListingStore,
    source: &dyn ListingSource,
) -> Result<PassSummary, StoreError> {
    let mut tally = PassSummary::default();

    let records = match source.fetch().await {
        Ok(records) => records,
        Err(e) => {
            warn!(source = source.source_name(), "Fetch failed: {:#}", e);
            tally.sources_failed += 1;
            return Ok(tally);
        }
    };

    for record in &records {
        match store.upsert(record).await {
            Ok(outcome) => tally.record(&outcome),
            Err(e) if e.is_record_level() => {
                warn!(url = %record.url, source = %record.source, "Skipping listing: {}", e);
                tally.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        source = source.source_name(),
        records = records.len(),
        failed = tally.failed,
        "Source ingested"
    );
    Ok(tally)
}
