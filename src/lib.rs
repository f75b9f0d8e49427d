//! Rental listing tracker: deduplicating store with price history

pub mod config;
pub mod ingest;
pub mod models;
pub mod scrapers;
pub mod store;

pub use crate::config::Config;
pub use crate::models::{Listing, NewListing, PriceObservation, UpsertOutcome};
pub use crate::store::{ListingStore, StoreError};
