use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use storefront_shared::{ADMIN_TOKEN_EXPIRY, MIN_JWT_SECRET_LENGTH};
use uuid::Uuid;

use crate::error::AppError;

pub const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject ("admin")
    pub exp: i64,           // Expiration time
    pub iat: i64,           // Issued at
    pub jti: String,        // JWT ID (for token revocation)
    pub token_type: String, // "access"
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
    pub jti: String,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    revoked_tokens: Arc<RwLock<HashMap<String, i64>>>, // jti -> exp, process-local
}

impl JwtService {
    pub fn new(secret: &str) -> Result<Self, AppError> {
        // Validate secret strength
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::Internal(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub", "iat"]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 30; // 30 seconds leeway for clock skew

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            revoked_tokens: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Generate an admin access token
    pub fn generate_admin_token(&self) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let lifetime = Duration::from_std(ADMIN_TOKEN_EXPIRY)
            .map_err(|_| AppError::Internal("Invalid token expiry duration".to_string()))?;
        let exp = now + lifetime;
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
            token_type: "access".to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to encode JWT: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_in: lifetime.num_seconds(),
            jti,
        })
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Authentication("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::Authentication("Invalid token signature".to_string())
                }
                _ => AppError::Authentication("Invalid token".to_string()),
            })?;

        if token_data.claims.token_type != "access" || token_data.claims.sub != ADMIN_SUBJECT {
            return Err(AppError::Authentication("Access token required".to_string()));
        }

        if self.is_token_revoked(&token_data.claims.jti) {
            return Err(AppError::Authentication("Token has been revoked".to_string()));
        }

        Ok(token_data.claims)
    }

    /// Revoke a token by its JTI until its expiry. Entries whose token has
    /// expired anyway are dropped on the way.
    pub fn revoke_token(&self, jti: &str, exp: i64) -> Result<(), AppError> {
        let mut revoked_tokens = self
            .revoked_tokens
            .write()
            .map_err(|_| AppError::Internal("Failed to acquire write lock".to_string()))?;

        let cutoff = Utc::now().timestamp() - self.validation.leeway as i64;
        revoked_tokens.retain(|_, expires_at| *expires_at >= cutoff);
        revoked_tokens.insert(jti.to_string(), exp);
        Ok(())
    }

    /// Check if a token is revoked
    pub fn is_token_revoked(&self, jti: &str) -> bool {
        self.revoked_tokens
            .read()
            .map(|tokens| tokens.contains_key(jti))
            .unwrap_or(false)
    }
}
