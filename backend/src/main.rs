use actix_cors::Cors;
use actix_web::{http::header, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use storefront_backend::config::AppConfig;
use storefront_backend::database::Database;
use storefront_backend::error::AppError;
use storefront_backend::AppServices;

fn cors(allowed_origin: Option<&str>) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    match allowed_origin {
        Some(origin) => cors.allowed_origin(origin),
        None => cors.allow_any_origin(),
    }
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    info!("Starting storefront backend on {}:{}", config.host, config.port);

    let database = Database::new(&config.database_url).await?;
    database.migrate().await?;

    let services = AppServices::from_config(&config, &database)?;

    let allowed_origin = config
        .cors_allowed_origin
        .clone()
        .filter(|origin| !origin.trim().is_empty());
    if allowed_origin.is_none() {
        warn!("CORS_ALLOWED_ORIGIN not set; accepting requests from any origin");
    }

    HttpServer::new(move || {
        App::new()
            .wrap(cors(allowed_origin.as_deref()))
            .configure(|cfg| services.configure(cfg))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
