use super::*;
use crate::clients::PostalAddress;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const STORE: &str = "Rua José Duarte Souza, 21, Taboão da Serra, SP";
const HOME: &str = "Taboão da Serra";

struct StubPostal {
    result: Result<PostalAddress, ExternalError>,
    calls: AtomicUsize,
}

impl StubPostal {
    fn resolving(city: &str) -> Self {
        Self {
            result: Ok(PostalAddress {
                postal_code: "06760-000".to_string(),
                street: "Rua das Flores".to_string(),
                neighborhood: "Centro".to_string(),
                city: city.to_string(),
                state: "SP".to_string(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(error: ExternalError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }
}

impl PostalLookup for StubPostal {
    async fn lookup(&self, _postal_code: &str) -> Result<PostalAddress, ExternalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

struct StubMatrix(Result<RouteMetrics, ExternalError>);

impl DistanceMatrix for StubMatrix {
    async fn route(&self, origin: &str, _destination: &str) -> Result<RouteMetrics, ExternalError> {
        assert_eq!(origin, STORE);
        self.0.clone()
    }
}

fn metrics(meters: i64, seconds: i64) -> RouteMetrics {
    RouteMetrics {
        meters: Decimal::from(meters),
        seconds: Decimal::from(seconds),
    }
}

fn service(postal: StubPostal, matrix: Option<StubMatrix>) -> ShippingService<StubPostal, StubMatrix> {
    ShippingService::new(postal, matrix, STORE, HOME)
}

fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap()
}

#[test]
fn test_normalize_postal_code() {
    assert_eq!(normalize_postal_code("01310-100").unwrap(), "01310100");
    assert_eq!(normalize_postal_code(" 06.760-000 ").unwrap(), "06760000");
    assert!(matches!(normalize_postal_code("1234"), Err(ShippingError::InvalidInput(_))));
    assert!(matches!(normalize_postal_code("123456789"), Err(ShippingError::InvalidInput(_))));
    assert!(matches!(normalize_postal_code(""), Err(ShippingError::InvalidInput(_))));
}

#[test]
fn test_shipping_cost_formula() {
    assert_eq!(shipping_cost(Decimal::ZERO), dec("8.00"));
    assert_eq!(shipping_cost(dec("5")), dec("15.50"));
    assert_eq!(shipping_cost(dec("15")), dec("30.50"));
    assert_eq!(shipping_cost(dec("12.3")), dec("26.45"));
}

#[test]
fn test_estimate_from_route_rounds() {
    let estimate = estimate_from_route(metrics(12345, 1830), "addr".to_string()).unwrap();
    assert_eq!(estimate.distance, dec("12.3"));
    assert_eq!(estimate.duration, 31);
    assert_eq!(estimate.cost, dec("26.45"));

    // Exactly one minute stays one minute; one extra second rounds up.
    assert_eq!(estimate_from_route(metrics(1000, 60), String::new()).unwrap().duration, 1);
    assert_eq!(estimate_from_route(metrics(1000, 61), String::new()).unwrap().duration, 2);
    // Half a hundred meters rounds away from zero.
    assert_eq!(estimate_from_route(metrics(2050, 0), String::new()).unwrap().distance, dec("2.1"));

    assert!(estimate_from_route(metrics(-1, 60), String::new()).is_none());
}

#[test]
fn test_fallback_estimate_by_city() {
    let home = fallback_estimate("TABOAO DA SERRA", HOME, "x".to_string());
    assert_eq!(home.distance, dec("5"));
    assert_eq!(home.duration, 20);
    assert_eq!(home.cost, dec("15.50"));

    let away = fallback_estimate("São Paulo", HOME, "x".to_string());
    assert_eq!(away.distance, dec("15"));
    assert_eq!(away.duration, 45);
    assert_eq!(away.cost, dec("30.50"));
}

#[tokio::test]
async fn test_estimate_uses_route_metrics() {
    let service = service(
        StubPostal::resolving("São Paulo"),
        Some(StubMatrix(Ok(metrics(12345, 1830)))),
    );

    let estimate = service.estimate("01310-100").await.unwrap();
    assert_eq!(estimate.distance, dec("12.3"));
    assert_eq!(estimate.duration, 31);
    assert_eq!(estimate.cost, dec("26.45"));
    assert_eq!(estimate.address, "Rua das Flores, Centro, São Paulo, SP");
}

#[tokio::test]
async fn test_estimate_falls_back_without_credential() {
    let service = service(StubPostal::resolving("Taboão da Serra"), None);

    let estimate = service.estimate("06760000").await.unwrap();
    assert_eq!(estimate.distance, dec("5"));
    assert_eq!(estimate.duration, 20);
    assert_eq!(estimate.cost, dec("15.50"));
}

#[tokio::test]
async fn test_matrix_failures_fall_back() {
    let failures = vec![
        ExternalError::Timeout(Duration::from_secs(8)),
        ExternalError::Rejected("status ZERO_RESULTS".to_string()),
        ExternalError::Incomplete("duration".to_string()),
        ExternalError::Unavailable("connection refused".to_string()),
    ];

    for failure in failures {
        let service = service(StubPostal::resolving("Embu das Artes"), Some(StubMatrix(Err(failure))));
        let estimate = service.estimate("06803000").await.unwrap();
        assert_eq!(estimate.distance, dec("15"));
        assert_eq!(estimate.duration, 45);
        assert_eq!(estimate.cost, dec("30.50"));
    }
}

#[tokio::test]
async fn test_invalid_postal_code_skips_lookup() {
    let postal = StubPostal::resolving("São Paulo");
    let service = service(postal, None);

    let err = service.estimate("123").await.unwrap_err();
    assert!(matches!(err, ShippingError::InvalidInput(_)));
    assert_eq!(service.postal.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_postal_failures_are_classified() {
    let cases = vec![
        (ExternalError::NotFound, ShippingError::NotFound),
        (ExternalError::Timeout(Duration::from_secs(8)), ShippingError::Timeout),
        (
            ExternalError::Rejected("erro".to_string()),
            ShippingError::InvalidInput("erro".to_string()),
        ),
        (
            ExternalError::Unavailable("HTTP 500".to_string()),
            ShippingError::UpstreamUnavailable("HTTP 500".to_string()),
        ),
    ];

    for (upstream, expected) in cases {
        let service = service(StubPostal::failing(upstream), Some(StubMatrix(Ok(metrics(1, 1)))));
        assert_eq!(service.estimate("01310100").await.unwrap_err(), expected);
    }
}

#[test]
fn test_errors_map_to_statuses() {
    use actix_web::{http::StatusCode, ResponseError};

    let status = |error: ShippingError| AppError::from(error).status_code();
    assert_eq!(status(ShippingError::InvalidInput(String::new())), StatusCode::BAD_REQUEST);
    assert_eq!(status(ShippingError::NotFound), StatusCode::NOT_FOUND);
    assert_eq!(status(ShippingError::UpstreamUnavailable(String::new())), StatusCode::BAD_GATEWAY);
    assert_eq!(status(ShippingError::Timeout), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(status(ShippingError::MalformedRequestBody(String::new())), StatusCode::BAD_REQUEST);
}
