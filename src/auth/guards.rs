use rocket::Request;
use rocket::State;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};

use crate::auth::{AuthError, AuthResult, AuthState};
use crate::models::Role;

/// Identity attached to a request by verifying its bearer token. The role
/// here is the one embedded at issuance; authorization decisions go back
/// to the store for the current role instead of trusting it.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub token_role: Role,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthUser {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match extract_user(request).await {
            Ok(user) => Outcome::Success(user),
            Err(err) => Outcome::Error((err.status(), err)),
        }
    }
}

/// Guard for admin-only routes. Resolves the caller's current role
/// through the access controller; a role revoked after the token was
/// issued is denied here even though the token still verifies.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RequireAdmin {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let user = match AuthUser::from_request(request).await {
            Outcome::Success(user) => user,
            Outcome::Error(err) => return Outcome::Error(err),
            Outcome::Forward(_) => {
                return Outcome::Error((Status::Unauthorized, AuthError::Unauthorized));
            }
        };

        let state = match request.guard::<&State<AuthState>>().await.succeeded() {
            Some(state) => state,
            None => {
                let err = AuthError::Config("AuthState missing from managed state".into());
                return Outcome::Error((err.status(), err));
            }
        };

        if state.access.authorize(user.id, &[Role::Admin]).await {
            Outcome::Success(RequireAdmin(user))
        } else {
            Outcome::Error((Status::Forbidden, AuthError::Forbidden))
        }
    }
}

async fn extract_user(request: &Request<'_>) -> AuthResult<AuthUser> {
    let token = bearer_token_from_request(request)?;

    let state = request
        .guard::<&State<AuthState>>()
        .await
        .succeeded()
        .ok_or_else(|| AuthError::Config("AuthState missing from managed state".into()))?;

    let claims = state.jwt.verify_token(token)?;
    let id: i32 = claims.sub.parse().map_err(|_| AuthError::MalformedToken)?;

    Ok(AuthUser {
        id,
        token_role: claims.role(),
    })
}

fn bearer_token_from_request<'r>(request: &'r Request<'_>) -> AuthResult<&'r str> {
    let header = request
        .headers()
        .get_one("Authorization")
        .ok_or(AuthError::Unauthorized)?;
    let mut parts = header.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default();
    if scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty() {
        Ok(token)
    } else {
        Err(AuthError::Unauthorized)
    }
}
