use super::{ListingStore, Result, StoreError};

fn schema_err(step: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |source| StoreError::Schema { step, source }
}

impl ListingStore {
    /// Create tables and indexes if absent, then check existing ones are usable
    pub(super) async fn migrate(&self) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(schema_err("begin"))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id TEXT UNIQUE,
                source TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                address TEXT,
                city TEXT,
                state TEXT DEFAULT 'WV',
                zip_code TEXT,
                price INTEGER,
                beds REAL,
                baths REAL,
                sqft INTEGER,
                property_type TEXT,
                listing_date TEXT,
                scraped_date TEXT,
                image_url TEXT,
                description TEXT,
                is_active BOOLEAN NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(schema_err("listings"))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS price_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                listing_id INTEGER NOT NULL,
                price INTEGER,
                recorded_date TEXT NOT NULL,
                FOREIGN KEY (listing_id) REFERENCES listings(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(schema_err("price_history"))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_price_history_listing ON price_history(listing_id)",
        )
        .execute(&mut *tx)
        .await
        .map_err(schema_err("idx_price_history_listing"))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_listings_active ON listings(is_active)")
            .execute(&mut *tx)
            .await
            .map_err(schema_err("idx_listings_active"))?;

        // A pre-existing table with the right name but the wrong shape
        // would otherwise only surface on the first upsert.
        sqlx::query(
            r#"
            SELECT id, external_id, source, url, address, city, state, zip_code,
                   price, beds, baths, sqft, property_type, listing_date,
                   scraped_date, image_url, description, is_active
            FROM listings LIMIT 0
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(schema_err("verify listings"))?;

        sqlx::query("SELECT id, listing_id, price, recorded_date FROM price_history LIMIT 0")
            .execute(&mut *tx)
            .await
            .map_err(schema_err("verify price_history"))?;

        tx.commit().await.map_err(schema_err("commit"))?;

        Ok(())
    }
}
