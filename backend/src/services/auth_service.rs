use actix_web::web;
use storefront_shared::{
    AdminLoginRequest, AdminLoginResponse, ERROR_ADMIN_LOGIN_DISABLED, ERROR_INVALID_CREDENTIALS,
    SUCCESS_LOGIN,
};
use tracing::{error, info, warn};
use validator::Validate;

use crate::error::AppError;
use crate::utils::{validation_errors_to_app_error, Claims, JwtService};


/// Admin panel authentication: one bcrypt-hashed password, short-lived tokens.
#[derive(Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    admin_password_hash: Option<String>,
}

impl AuthService {
    pub fn new(jwt_service: JwtService, admin_password_hash: Option<String>) -> Self {
        let admin_password_hash = admin_password_hash
            .map(|hash| hash.trim().to_string())
            .filter(|hash| !hash.is_empty());
        if admin_password_hash.is_none() {
            warn!("ADMIN_PASSWORD_HASH not set; admin login is disabled");
        }

        Self {
            jwt_service,
            admin_password_hash,
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Checks the password and issues an access token.
    pub async fn login(&self, request: &AdminLoginRequest) -> Result<AdminLoginResponse, AppError> {
        request.validate().map_err(validation_errors_to_app_error)?;

        let hash = self
            .admin_password_hash
            .as_deref()
            .ok_or_else(|| AppError::Authentication(ERROR_ADMIN_LOGIN_DISABLED.to_string()))?;

        if !verify_password(&request.password, hash).await? {
            warn!("Failed admin login attempt");
            return Err(AppError::Authentication(ERROR_INVALID_CREDENTIALS.to_string()));
        }

        let issued = self.jwt_service.generate_admin_token()?;
        info!("Admin logged in (session {})", issued.jti);

        Ok(AdminLoginResponse {
            access_token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            message: SUCCESS_LOGIN.to_string(),
        })
    }

    /// Revokes the session the claims belong to.
    pub fn logout(&self, claims: &Claims) -> Result<(), AppError> {
        self.jwt_service.revoke_token(&claims.jti, claims.exp)?;
        info!("Admin session {} revoked", claims.jti);
        Ok(())
    }
}

/// Verify a password against a bcrypt hash on the blocking pool, off the
/// request worker. A malformed hash is a server misconfiguration, not a
/// failed login.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let hash = hash.to_string();

    web::block(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password check was cancelled: {}", e)))?
        .map_err(|e| {
            error!("ADMIN_PASSWORD_HASH is not a valid bcrypt hash: {}", e);
            AppError::Internal("Invalid admin password hash".to_string())
        })
}
