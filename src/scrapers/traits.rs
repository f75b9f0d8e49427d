use crate::models::NewListing;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for everything that hands listings to the store
/// Craigslist, Zillow and Apartments.com clients plug in here.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch normalized listing records from the source
    async fn fetch(&self) -> Result<Vec<NewListing>>;

    /// Get the name of the source, used in logs
    fn source_name(&self) -> &str;
}
