use rocket::post;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{State, http::Status};

use crate::auth::accounts::Registration;
use crate::auth::responses::{LoginRequest, LoginResponse, RegisterRequest, UserSummary};
use crate::auth::{AuthError, AuthState};

type AuthRouteResult<T> = Result<Json<T>, status::Custom<Json<AuthErrorResponse>>>;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct AuthErrorResponse {
    pub status: u16,
    pub message: String,
}

#[post("/users", data = "<payload>")]
pub async fn register(
    state: &State<AuthState>,
    payload: Json<RegisterRequest>,
) -> Result<status::Created<Json<UserSummary>>, status::Custom<Json<AuthErrorResponse>>> {
    let request = payload.into_inner();
    if let Some(requested) = &request.role {
        log::warn!("registration requested role '{requested}'; forcing 'user'");
    }

    let summary = state
        .accounts
        .register(Registration {
            name: request.name,
            username: request.username,
            email: request.email,
            password: request.password,
        })
        .await
        .map_err(respond_error)?;

    let location = format!("/api/users/{}", summary.id);
    Ok(status::Created::new(location).body(Json(summary)))
}

#[post("/users/login", data = "<payload>")]
pub async fn login(
    state: &State<AuthState>,
    payload: Json<LoginRequest>,
) -> AuthRouteResult<LoginResponse> {
    let signed = state
        .accounts
        .login(&payload.email, &payload.password)
        .await
        .map_err(respond_error)?;

    Ok(Json(LoginResponse {
        access_token: signed.token,
        expires_at: signed.expires_at,
    }))
}

fn respond_error(err: AuthError) -> status::Custom<Json<AuthErrorResponse>> {
    let status = err.status();
    if status == Status::InternalServerError {
        log::error!("auth pipeline failure: {err}");
    }
    status::Custom(
        status,
        Json(AuthErrorResponse {
            status: status.code,
            message: err.to_string(),
        }),
    )
}
