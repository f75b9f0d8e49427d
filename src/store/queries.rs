use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use super::{ListingStore, Result, StoreError};
use crate::models::{Listing, NewListing, PriceObservation, UpsertOutcome};

const SELECT_ID_PRICE_BY_URL: &str = "SELECT id, price FROM listings WHERE url = ?";

impl ListingStore {
    /// Insert a listing seen for the first time, or record a price change
    /// for one already stored. An unchanged price leaves the row untouched.
    pub async fn upsert(&self, record: &NewListing) -> Result<UpsertOutcome> {
        record.validate()?;

        let _gate = self.write_gate.lock().await;
        // IMMEDIATE takes the write lock up front, so a writer on another
        // handle waits out `busy_timeout` instead of failing on lock upgrade.
        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(StoreError::Unavailable)?;

        let outcome = match self.upsert_in(&mut tx, record).await {
            Ok(outcome) => outcome,
            // dropping `tx` rolls back
            Err(error) => return Err(upsert_error(record, error)),
        };
        tx.commit().await.map_err(|e| upsert_error(record, e))?;

        debug!(url = %record.url, source = %record.source, ?outcome, "Listing upserted");
        Ok(outcome)
    }

    async fn upsert_in(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        record: &NewListing,
    ) -> std::result::Result<UpsertOutcome, sqlx::Error> {
        let now = Utc::now();

        let existing: Option<(i64, Option<i64>)> = sqlx::query_as(SELECT_ID_PRICE_BY_URL)
            .bind(&record.url)
            .fetch_optional(&mut **tx)
            .await?;

        let (id, stored_price) = match existing {
            Some(row) => row,
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO listings (
                        external_id, source, url, address, city, state, zip_code,
                        price, beds, baths, sqft, property_type, listing_date,
                        scraped_date, image_url, description
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    ON CONFLICT(url) DO NOTHING
                    "#,
                )
                .bind(&record.external_id)
                .bind(&record.source)
                .bind(&record.url)
                .bind(&record.address)
                .bind(&record.city)
                .bind(record.state.as_deref().unwrap_or(&self.default_state))
                .bind(&record.zip_code)
                .bind(record.price)
                .bind(record.beds)
                .bind(record.baths)
                .bind(record.sqft)
                .bind(&record.property_type)
                .bind(&record.listing_date)
                .bind(now)
                .bind(&record.image_url)
                .bind(&record.description)
                .execute(&mut **tx)
                .await?;

                if result.rows_affected() == 1 {
                    return Ok(UpsertOutcome::Inserted {
                        id: result.last_insert_rowid(),
                    });
                }

                // Another writer stored this url first; compare against its row.
                sqlx::query_as(SELECT_ID_PRICE_BY_URL)
                    .bind(&record.url)
                    .fetch_one(&mut **tx)
                    .await?
            }
        };

        if stored_price == record.price {
            return Ok(UpsertOutcome::Unchanged { id });
        }

        sqlx::query("UPDATE listings SET price = ?, scraped_date = ? WHERE id = ?")
            .bind(record.price)
            .bind(now)
            .bind(id)
            .execute(&mut **tx)
            .await?;

        sqlx::query("INSERT INTO price_history (listing_id, price, recorded_date) VALUES (?, ?, ?)")
            .bind(id)
            .bind(record.price)
            .bind(now)
            .execute(&mut **tx)
            .await?;

        Ok(UpsertOutcome::Updated {
            id,
            old_price: stored_price,
            new_price: record.price,
        })
    }

    /// All listings not marked inactive
    pub async fn list_active(&self) -> Result<Vec<Listing>> {
        sqlx::query_as("SELECT * FROM listings WHERE is_active = 1 ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::Query)
    }

    /// Get a listing by url
    pub async fn find_by_url(&self, url: &str) -> Result<Option<Listing>> {
        sqlx::query_as("SELECT * FROM listings WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::Query)
    }

    /// Price changes recorded for a listing, oldest first
    pub async fn price_history(&self, listing_id: i64) -> Result<Vec<PriceObservation>> {
        sqlx::query_as(
            "SELECT * FROM price_history WHERE listing_id = ? ORDER BY recorded_date ASC, id ASC",
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Query)
    }
}

fn upsert_error(record: &NewListing, error: sqlx::Error) -> StoreError {
    StoreError::Upsert {
        url: record.url.clone(),
        listing_source: record.source.clone(),
        error,
    }
}
