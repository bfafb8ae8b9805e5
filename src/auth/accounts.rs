use std::sync::Arc;

use crate::auth::jwt::{JwtService, SignedAccessToken};
use crate::auth::passwords::PasswordService;
use crate::auth::responses::UserSummary;
use crate::auth::{AuthError, AuthResult};
use crate::models::{NewUser, Role};
use crate::store::UserStore;

/// Registration and login orchestration over the hashing and token
/// services. Holds no per-request state; every call is a single pass.
pub struct AccountService {
    store: Arc<dyn UserStore>,
    passwords: PasswordService,
    tokens: Arc<JwtService>,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn UserStore>,
        passwords: PasswordService,
        tokens: Arc<JwtService>,
    ) -> Self {
        Self {
            store,
            passwords,
            tokens,
        }
    }

    /// Create a new identity. The email is lowercased before the
    /// uniqueness check and the role is always `user`; callers cannot
    /// self-assign an elevated role at registration.
    pub async fn register(&self, registration: Registration) -> AuthResult<UserSummary> {
        let name = registration.name.trim().to_string();
        let username = registration.username.trim().to_string();
        let email = registration.email.trim().to_lowercase();
        let password = registration.password.trim();

        if name.is_empty() || username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "name, username, email, and password are required".into(),
            ));
        }

        let password_hash = self.passwords.hash_password(password)?;
        let user = self
            .store
            .create(NewUser {
                name,
                username,
                email,
                role: Role::User,
                password_hash,
            })
            .await?;

        Ok(UserSummary::from(&user))
    }

    /// Validate a credential pair and mint a token. A missing identity and
    /// a wrong password both surface as `InvalidCredentials`; the caller
    /// learns nothing about which factor failed. The token is the sole
    /// success output.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<SignedAccessToken> {
        let email = email.trim().to_lowercase();
        let password = password.trim();

        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "email and password are required".into(),
            ));
        }

        let user = match self.store.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                log::warn!("login rejected: no identity for email {email}");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.passwords.verify_password(password, &user.password_hash)? {
            log::warn!("login rejected: password mismatch for identity {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        self.tokens.issue_token(user.id, user.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use crate::store::MemoryUserStore;

    fn make_service() -> (AccountService, Arc<MemoryUserStore>) {
        let store = Arc::new(MemoryUserStore::new());
        let tokens = Arc::new(
            JwtService::from_config(&AuthConfig {
                jwt_secret: "account-test-secret".into(),
                token_ttl_secs: 900,
            })
            .expect("jwt service"),
        );
        let passwords = PasswordService::new().expect("password service");
        (
            AccountService::new(store.clone(), passwords, tokens),
            store,
        )
    }

    fn alice() -> Registration {
        Registration {
            name: "Alice".into(),
            username: "alice".into(),
            email: "Alice@Example.com".into(),
            password: "pw123".into(),
        }
    }

    #[rocket::async_test]
    async fn registration_normalizes_email_and_forces_user_role() {
        let (service, store) = make_service();

        let summary = service.register(alice()).await.expect("register");
        assert_eq!(summary.email, "alice@example.com");
        assert_eq!(summary.role, Role::User);

        let stored = store
            .find_by_email("alice@example.com")
            .await
            .expect("lookup")
            .expect("stored identity");
        assert_eq!(stored.email, "alice@example.com");
        assert_ne!(stored.password_hash, "pw123");
    }

    #[rocket::async_test]
    async fn duplicate_registration_is_rejected() {
        let (service, _store) = make_service();
        service.register(alice()).await.expect("first register");

        let result = service.register(alice()).await;
        assert!(matches!(result, Err(AuthError::DuplicateIdentity)));
    }

    #[rocket::async_test]
    async fn login_roundtrip_issues_a_verifiable_token() {
        let (service, _store) = make_service();
        service.register(alice()).await.expect("register");

        // Lookup is case-normalized, so shouting the email still works.
        let signed = service
            .login("ALICE@EXAMPLE.COM", "pw123")
            .await
            .expect("login");
        assert!(signed.expires_at > chrono::Utc::now());
        assert!(!signed.token.contains("pw123"));
    }

    #[rocket::async_test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let (service, _store) = make_service();
        service.register(alice()).await.expect("register");

        let wrong_password = service.login("alice@example.com", "wrong").await;
        let unknown_email = service.login("nobody@x.com", "pw123").await;

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(AuthError::InvalidCredentials)));
    }

    #[rocket::async_test]
    async fn empty_credentials_are_invalid_input() {
        let (service, _store) = make_service();

        assert!(matches!(
            service.login("", "pw123").await,
            Err(AuthError::InvalidInput(_))
        ));
        assert!(matches!(
            service.login("alice@example.com", "  ").await,
            Err(AuthError::InvalidInput(_))
        ));

        let blank = Registration {
            password: "".into(),
            ..alice()
        };
        assert!(matches!(
            service.register(blank).await,
            Err(AuthError::InvalidInput(_))
        ));
    }
}
