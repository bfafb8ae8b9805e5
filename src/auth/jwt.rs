use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::auth::{AuthConfig, AuthError, AuthResult};
use crate::models::Role;

/// Claims carried by an access token. The token is self-contained: the
/// subject id, its role at issuance, and the validity window travel with
/// the signature. There is no server-side token record and no revocation;
/// a verified, non-expired token is always accepted.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl AccessTokenClaims {
    pub fn role(&self) -> Role {
        Role::from_str(&self.role)
    }
}

#[derive(Debug, Clone)]
pub struct SignedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Stateless HS256 token service. All instances in a process share the
/// same signing secret through `AuthConfig`.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl JwtService {
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        if config.token_ttl_secs <= 0 {
            return Err(AuthError::InvalidInput(
                "token ttl must be a positive number of seconds".into(),
            ));
        }

        let secret_bytes = config.jwt_secret.as_bytes();
        let encoding_key = EncodingKey::from_secret(secret_bytes);
        let decoding_key = DecodingKey::from_secret(secret_bytes);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        // A token past its expiry is invalid, full stop.
        validation.leeway = 0;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            token_ttl: Duration::seconds(config.token_ttl_secs),
        })
    }

    pub fn issue_token(&self, user_id: i32, role: Role) -> AuthResult<SignedAccessToken> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Config(format!("token signing failed: {err}")))?;

        Ok(SignedAccessToken { token, expires_at })
    }

    pub fn verify_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        match decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => Err(match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            }),
        }
    }
}
