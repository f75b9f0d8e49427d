use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Normalized listing record handed over by a scraper
///
/// Only `source` and `url` are required; everything else is whatever the
/// source managed to extract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewListing {
    #[serde(default)]
    pub external_id: Option<String>,
    pub source: String,
    pub url: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Falls back to the configured target state when absent
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub beds: Option<f64>,
    #[serde(default)]
    pub baths: Option<f64>,
    #[serde(default)]
    pub sqft: Option<i64>,
    #[serde(default)]
    pub property_type: Option<String>,
    /// Listing date as reported by the source, kept verbatim
    #[serde(default)]
    pub listing_date: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewListing {
    /// Minimal record with the two required fields set
    pub fn new(source: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_price(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Reject records that cannot be stored before they reach the database
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.url.trim().is_empty() {
            return Err(StoreError::InvalidRecord(format!(
                "missing url (source: {})",
                self.source
            )));
        }
        if self.source.trim().is_empty() {
            return Err(StoreError::InvalidRecord(format!(
                "missing source (url: {})",
                self.url
            )));
        }
        if let Some(price) = self.price {
            if price < 0 {
                return Err(StoreError::InvalidRecord(format!(
                    "negative price {} (url: {})",
                    price, self.url
                )));
            }
        }
        Ok(())
    }
}

/// Stored listing row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub external_id: Option<String>,
    pub source: String,
    pub url: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub price: Option<i64>,
    pub beds: Option<f64>,
    pub baths: Option<f64>,
    pub sqft: Option<i64>,
    pub property_type: Option<String>,
    pub listing_date: Option<String>,
    /// Time of insertion or of the last price change
    pub scraped_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}

/// One recorded price change, never rewritten
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceObservation {
    pub id: i64,
    pub listing_id: i64,
    pub price: Option<i64>,
    pub recorded_date: DateTime<Utc>,
}

/// What a single upsert did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted {
        id: i64,
    },
    Updated {
        id: i64,
        old_price: Option<i64>,
        new_price: Option<i64>,
    },
    Unchanged {
        id: i64,
    },
}

impl UpsertOutcome {
    pub fn listing_id(&self) -> i64 {
        match self {
            Self::Inserted { id } | Self::Updated { id, .. } | Self::Unchanged { id } => *id,
        }
    }
}
