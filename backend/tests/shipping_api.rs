use actix_web::test;
use serde_json::json;
use storefront_shared::ERROR_MALFORMED_BODY;

#[macro_use]
mod utils;

#[actix_web::test]
async fn test_health_check() {
    let (services, _db) = utils::create_test_services().await;
    let app = test_app!(services);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["service"], "storefront-backend");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");
}

#[actix_web::test]
async fn test_shipping_estimate_for_home_city() {
    let (services, _db) = utils::create_test_services().await;
    let app = test_app!(services);

    let req = test::TestRequest::post()
        .uri("/api/calculate-shipping")
        .set_json(json!({ "cep": "06760-000" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["distance"].as_f64(), Some(5.0));
    assert_eq!(body["duration"], 20);
    assert_eq!(body["cost"].as_f64(), Some(15.5));
    assert!(body["address"].as_str().unwrap().contains("Taboão da Serra"));
}

#[actix_web::test]
async fn test_shipping_estimate_for_other_city() {
    let (services, _db) = utils::create_test_services().await;
    let app = test_app!(services);

    let req = test::TestRequest::post()
        .uri("/api/calculate-shipping")
        .set_json(json!({ "cep": "01310100" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["distance"].as_f64(), Some(15.0));
    assert_eq!(body["duration"], 45);
    assert_eq!(body["cost"].as_f64(), Some(30.5));
}

#[actix_web::test]
async fn test_shipping_rejects_bad_postal_codes() {
    let (services, _db) = utils::create_test_services().await;
    let app = test_app!(services);

    for cep in ["123", "abcdefgh", ""] {
        let req = test::TestRequest::post()
            .uri("/api/calculate-shipping")
            .set_json(json!({ "cep": cep }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "cep {:?}", cep);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "validation_error");
    }
}

#[actix_web::test]
async fn test_shipping_malformed_body() {
    let (services, _db) = utils::create_test_services().await;
    let app = test_app!(services);

    let bodies = ["{\"cep\": ", "{\"cep\": 6760000}", "{}", "[]"];
    for raw in bodies {
        let req = test::TestRequest::post()
            .uri("/api/calculate-shipping")
            .insert_header(("content-type", "application/json"))
            .set_payload(raw)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "body {}", raw);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "malformed_request_body", "body {}", raw);
        assert_eq!(body["error"], ERROR_MALFORMED_BODY);
    }
}

#[actix_web::test]
async fn test_shipping_upstream_failures() {
    let (services, _db) = utils::create_test_services().await;
    let app = test_app!(services);

    let cases = [
        ("00000404", 404, "not_found"),
        ("99999999", 400, "validation_error"),
        ("11111111", 502, "upstream_unavailable"),
    ];

    for (cep, status, code) in cases {
        let req = test::TestRequest::post()
            .uri("/api/calculate-shipping")
            .set_json(json!({ "cep": cep }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "cep {}", cep);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], code, "cep {}", cep);
    }
}
