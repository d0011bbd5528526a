use actix_web::{get, web, HttpResponse};
use serde_json::json;
use tracing::warn;

use crate::database::Database;

/// Liveness plus a database round-trip; 503 when the store is unreachable.
#[get("/health")]
pub async fn health_check(database: web::Data<Database>) -> HttpResponse {
    let (mut response, status, store) = match database.ping().await {
        Ok(()) => (HttpResponse::Ok(), "healthy", "ok"),
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            (HttpResponse::ServiceUnavailable(), "degraded", "unreachable")
        }
    };

    response.json(json!({
        "status": status,
        "service": "storefront-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "database": store
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_reports_unreachable_database() {
        let database = Database::in_memory().await.unwrap();
        database.pool().close().await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(database))
                .service(health_check),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 503);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], "unreachable");
    }
}
