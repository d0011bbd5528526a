use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use storefront_shared::POSTAL_LOOKUP_TIMEOUT;
use tracing::debug;

use super::{http_client, ExternalError};

/// Street address resolved from a postal code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalAddress {
    pub postal_code: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl PostalAddress {
    /// Non-empty parts joined with ", "; `fallback` when every part is empty.
    pub fn display_line(&self, fallback: &str) -> String {
        let parts: Vec<&str> = [&self.street, &self.neighborhood, &self.city, &self.state]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            fallback.to_string()
        } else {
            parts.join(", ")
        }
    }
}

pub trait PostalLookup {
    /// Resolves an 8-digit postal code.
    async fn lookup(&self, postal_code: &str) -> Result<PostalAddress, ExternalError>;
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    cep: Option<String>,
    logradouro: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
    /// `true` or `"true"` when the code does not exist.
    erro: Option<serde_json::Value>,
}

impl ViaCepResponse {
    fn is_error(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            Some(serde_json::Value::Null) | None => false,
            Some(_) => true,
        }
    }
}

/// ViaCEP-compatible lookup (`GET {base}/{cep}/json/`).
#[derive(Clone)]
pub struct ViaCepClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ViaCepClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, POSTAL_LOOKUP_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

impl PostalLookup for ViaCepClient {
    async fn lookup(&self, postal_code: &str) -> Result<PostalAddress, ExternalError> {
        let url = format!("{}/{}/json/", self.base_url, postal_code);
        debug!("Postal lookup: GET {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ExternalError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ExternalError::NotFound);
        }
        if !status.is_success() {
            return Err(ExternalError::Unavailable(format!("HTTP {}", status)));
        }

        let body: ViaCepResponse = response
            .json()
            .await
            .map_err(|e| ExternalError::from_reqwest(e, self.timeout))?;

        if body.is_error() {
            return Err(ExternalError::Rejected(format!(
                "postal code {} is not valid",
                postal_code
            )));
        }

        Ok(PostalAddress {
            postal_code: body.cep.unwrap_or_else(|| postal_code.to_string()),
            street: body.logradouro.unwrap_or_default(),
            neighborhood: body.bairro.unwrap_or_default(),
            city: body.localidade.unwrap_or_default(),
            state: body.uf.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::test_server;
    use actix_web::{web, HttpResponse};
    use serde_json::json;

    async fn viacep_stub(path: web::Path<String>) -> HttpResponse {
        match path.as_str() {
            "01310100" => HttpResponse::Ok().json(json!({
                "cep": "01310-100",
                "logradouro": "Avenida Paulista",
                "bairro": "Bela Vista",
                "localidade": "São Paulo",
                "uf": "SP"
            })),
            "99999999" => HttpResponse::Ok().json(json!({ "erro": "true" })),
            "00000404" => HttpResponse::NotFound().finish(),
            "00000500" => HttpResponse::InternalServerError().finish(),
            "00000777" => {
                actix_web::rt::time::sleep(Duration::from_secs(2)).await;
                HttpResponse::Ok().json(json!({ "localidade": "Late" }))
            }
            _ => HttpResponse::Ok().body("not json"),
        }
    }

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.route("/ws/{cep}/json/", web::get().to(viacep_stub));
    }

    fn client(base: &str) -> ViaCepClient {
        ViaCepClient::with_timeout(&format!("{}/ws", base), Duration::from_millis(300)).unwrap()
    }

    #[actix_web::test]
    async fn test_lookup_resolves_address() {
        let (base, handle) = test_server::spawn(routes);

        let address = client(&base).lookup("01310100").await.unwrap();
        assert_eq!(address.street, "Avenida Paulista");
        assert_eq!(address.city, "São Paulo");
        assert_eq!(
            address.display_line("01310100"),
            "Avenida Paulista, Bela Vista, São Paulo, SP"
        );

        handle.stop(false).await;
    }

    #[actix_web::test]
    async fn test_lookup_classifies_failures() {
        let (base, handle) = test_server::spawn(routes);
        let client = client(&base);

        assert!(matches!(client.lookup("99999999").await, Err(ExternalError::Rejected(_))));
        assert_eq!(client.lookup("00000404").await, Err(ExternalError::NotFound));
        assert!(matches!(client.lookup("00000500").await, Err(ExternalError::Unavailable(_))));
        assert!(matches!(client.lookup("12345678").await, Err(ExternalError::Unavailable(_))));
        assert!(matches!(client.lookup("00000777").await, Err(ExternalError::Timeout(_))));

        handle.stop(false).await;
    }

    #[test]
    fn test_display_line_skips_empty_parts() {
        let address = PostalAddress {
            postal_code: "06760000".to_string(),
            street: String::new(),
            neighborhood: "  ".to_string(),
            city: "Taboão da Serra".to_string(),
            state: "SP".to_string(),
        };
        assert_eq!(address.display_line("06760000"), "Taboão da Serra, SP");
        assert_eq!(PostalAddress::default().display_line("06760000"), "06760000");
    }
}
