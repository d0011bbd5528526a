//! Shared setup for the HTTP-level tests: an in-memory database, a local
//! postal lookup stub and a fully wired `App`.

#![allow(dead_code)]

use actix_web::{web, App, HttpResponse, HttpServer};
use serde_json::json;

use storefront_backend::config::{
    AppConfig, DEFAULT_DISTANCE_MATRIX_URL, DEFAULT_HOME_CITY, DEFAULT_STORE_ADDRESS,
};
use storefront_backend::database::Database;
use storefront_backend::AppServices;

pub const ADMIN_PASSWORD: &str = "mundo-natural-admin";
pub const JWT_SECRET: &str = "test-secret-key-for-testing-only-must-be-at-least-32-chars";

async fn viacep_stub(path: web::Path<String>) -> HttpResponse {
    match path.as_str() {
        "06760000" => HttpResponse::Ok().json(json!({
            "cep": "06760-000",
            "logradouro": "Rua José Duarte Souza",
            "bairro": "Jardim das Margaridas",
            "localidade": "Taboão da Serra",
            "uf": "SP"
        })),
        "01310100" => HttpResponse::Ok().json(json!({
            "cep": "01310-100",
            "logradouro": "Avenida Paulista",
            "bairro": "Bela Vista",
            "localidade": "São Paulo",
            "uf": "SP"
        })),
        "99999999" => HttpResponse::Ok().json(json!({ "erro": true })),
        "00000404" => HttpResponse::NotFound().finish(),
        _ => HttpResponse::InternalServerError().finish(),
    }
}

/// Starts the postal lookup stub and returns its base URL.
pub fn spawn_postal_stub() -> String {
    let server = HttpServer::new(|| App::new().route("/ws/{cep}/json/", web::get().to(viacep_stub)))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind postal stub");
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}/ws", addr)
}

pub fn test_config(postal_lookup_url: String) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        admin_password_hash: Some(bcrypt::hash(ADMIN_PASSWORD, 4).expect("hash admin password")),
        google_maps_api_key: None,
        postal_lookup_url,
        distance_matrix_url: DEFAULT_DISTANCE_MATRIX_URL.to_string(),
        store_address: DEFAULT_STORE_ADDRESS.to_string(),
        home_city: DEFAULT_HOME_CITY.to_string(),
        catalog_csv_url: None,
        cors_allowed_origin: None,
    }
}

/// Services over a fresh in-memory database, wired to the postal stub.
/// The database handle is returned so tests can inspect storage directly.
pub async fn create_test_services() -> (AppServices, Database) {
    let database = Database::in_memory().await.expect("in-memory database");
    let config = test_config(spawn_postal_stub());
    let services = AppServices::from_config(&config, &database).expect("build services");
    (services, database)
}

/// Initializes the full `App` for a set of services.
macro_rules! test_app {
    ($services:expr) => {
        actix_web::test::init_service(
            actix_web::App::new().configure(|cfg| $services.configure(cfg)),
        )
        .await
    };
}

/// Logs in as admin and yields the bearer token.
macro_rules! admin_token {
    ($app:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(serde_json::json!({ "password": $crate::utils::ADMIN_PASSWORD }))
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        body["access_token"].as_str().expect("access token").to_string()
    }};
}
