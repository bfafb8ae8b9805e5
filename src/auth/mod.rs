//! Authentication pipeline: configuration, credential hashing, token
//! minting, login orchestration, access control, request guards, and the
//! register/login HTTP handlers.

use std::sync::Arc;

pub mod access;
pub mod accounts;
pub mod config;
pub mod error;
pub mod guards;
pub mod jwt;
pub mod passwords;
pub mod responses;
pub mod routes;

pub use access::AccessController;
pub use accounts::AccountService;
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use guards::{AuthUser, RequireAdmin};
pub use jwt::JwtService;
pub use passwords::PasswordService;

use crate::store::UserStore;

/// Managed Rocket state wiring the pipeline together. The store backend
/// is injected explicitly, so tests run the same services over the
/// in-memory store that production runs over Postgres.
pub struct AuthState {
    pub config: AuthConfig,
    pub accounts: Arc<AccountService>,
    pub access: AccessController,
    pub jwt: Arc<JwtService>,
    pub store: Arc<dyn UserStore>,
}

impl AuthState {
    pub fn new(config: AuthConfig, store: Arc<dyn UserStore>) -> AuthResult<Self> {
        let jwt = Arc::new(JwtService::from_config(&config)?);
        let passwords = PasswordService::new()?;
        let accounts = Arc::new(AccountService::new(store.clone(), passwords, jwt.clone()));
        let access = AccessController::new(store.clone());

        Ok(Self {
            config,
            accounts,
            access,
            jwt,
            store,
        })
    }
}
