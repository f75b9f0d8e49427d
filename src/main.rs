use apartment_scout::ingest::run_pass;
use apartment_scout::scrapers::{JsonFileSource, ListingSource};
use apartment_scout::{Config, ListingStore};
use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🏠 Apartment Scout - {} rentals", config.target_state);
    info!("Target cities: {}", config.target_cities.join(", "));

    let store = ListingStore::open(&config)
        .await
        .context("Cannot continue without storage")?;

    let sources: Vec<Box<dyn ListingSource>> = JsonFileSource::discover(&config.import_dir)
        .await?
        .into_iter()
        .map(|s| Box::new(s) as Box<dyn ListingSource>)
        .collect();

    run_pass(&store, &sources).await?;

    let listings = store.list_active().await?;
    info!("{} active listings", listings.len());

    for (i, listing) in listings.iter().enumerate() {
        let price = listing
            .price
            .map(|p| format!("${}", p))
            .unwrap_or_else(|| "price unknown".to_string());
        println!(
            "{}. {} ({})",
            i + 1,
            listing.address.as_deref().unwrap_or("address unknown"),
            price
        );
        if let Some(city) = &listing.city {
            println!("   {}, {}", city, listing.state.as_deref().unwrap_or(""));
        }
        println!("   Source: {}", listing.source);
        println!("   URL: {}", listing.url);
        println!();
    }

    store.close().await;
    Ok(())
}
