use anyhow::{bail, Context, Result};
use std::env;
use tracing::info;

use storefront_backend::clients::CsvCatalogFeed;
use storefront_backend::config::AppConfig;
use storefront_backend::database::Database;
use storefront_backend::models::Product;
use storefront_backend::services::CatalogService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let database = Database::new(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("up");

    match command {
        "up" => {
            info!("Running database migrations...");
            database.migrate().await.context("Failed to run migrations")?;
            info!("Database migrations completed successfully");
        }
        "seed-catalog" => {
            database.migrate().await.context("Failed to run migrations")?;

            let url = config
                .catalog_csv_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .context("CATALOG_CSV_URL is required for seed-catalog")?;
            let feed = CsvCatalogFeed::new(url).context("Failed to build catalog feed client")?;
            let catalog = CatalogService::new(database.pool().clone(), Some(feed));

            let existing = Product::count(database.pool()).await?;
            if existing > 0 {
                info!("Catalog already has {} products; new rows are added, existing ids kept", existing);
            }
            let imported = catalog.import().await?;
            info!("Imported {} products", imported);
        }
        other => {
            eprintln!("Usage: migrate [up|seed-catalog]");
            bail!("Unknown command: {}", other);
        }
    }

    Ok(())
}
