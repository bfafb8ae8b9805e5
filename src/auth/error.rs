use rocket::http::Status;
use thiserror::Error;

use crate::store::StoreError;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Caller supplied malformed or missing data.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Login failed. Deliberately silent about which factor was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("an account with this email or username already exists")]
    DuplicateIdentity,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("malformed token")]
    MalformedToken,
    #[error("identity not found")]
    NotFound,
    /// Stored hash could not be parsed. An integrity fault, not user error.
    #[error("stored password hash is malformed")]
    MalformedHash,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("argon2 parameter error: {0}")]
    Argon2(String),
    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

impl AuthError {
    pub fn status(&self) -> Status {
        match self {
            AuthError::InvalidInput(_) => Status::BadRequest,
            AuthError::InvalidCredentials => Status::Unauthorized,
            AuthError::DuplicateIdentity => Status::Conflict,
            AuthError::TokenExpired
            | AuthError::InvalidSignature
            | AuthError::MalformedToken
            | AuthError::Unauthorized => Status::Unauthorized,
            AuthError::Forbidden => Status::Forbidden,
            AuthError::NotFound => Status::NotFound,
            AuthError::MalformedHash
            | AuthError::Config(_)
            | AuthError::Store(_)
            | AuthError::Argon2(_)
            | AuthError::PasswordHash(_) => Status::InternalServerError,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AuthError::DuplicateIdentity,
            StoreError::NotFound => AuthError::NotFound,
            StoreError::Database(err) => AuthError::Store(err.to_string()),
        }
    }
}

impl From<argon2::Error> for AuthError {
    fn from(err: argon2::Error) -> Self {
        AuthError::Argon2(err.to_string())
    }
}
