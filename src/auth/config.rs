use crate::auth::{AuthError, AuthResult};

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Authentication configuration loaded once at startup. The signing
/// secret lives here and is handed to the token service by construction;
/// business logic never reads the environment directly.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

impl AuthConfig {
    pub fn from_env() -> AuthResult<Self> {
        let jwt_secret = std::env::var("IDENTITY_JWT_SECRET")
            .map_err(|_| AuthError::Config("IDENTITY_JWT_SECRET is required".into()))?;

        let token_ttl_secs = match std::env::var("IDENTITY_TOKEN_TTL_SECS") {
            Ok(value) => value.parse::<i64>().map_err(|_| {
                AuthError::Config("IDENTITY_TOKEN_TTL_SECS must be an integer".into())
            })?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };

        Ok(Self {
            jwt_secret,
            token_ttl_secs,
        })
    }
}
