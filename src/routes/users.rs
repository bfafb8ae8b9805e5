//! User management routes. Register and login live in `auth::routes`;
//! everything here requires an authenticated caller, and the destructive
//! or privilege-changing operations require the admin role.

use rocket::serde::json::Json;
use rocket::{State, delete, get, put};

use crate::auth::guards::{AuthUser, RequireAdmin};
use crate::auth::responses::{ProfileUpdateRequest, RoleUpdateRequest, UserSummary};
use crate::auth::AuthState;
use crate::error::ApiError;
use crate::models::{ProfileUpdate, Role};

#[get("/users")]
pub async fn list_users(
    state: &State<AuthState>,
    _user: AuthUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = state.store.list().await?;
    Ok(Json(users.iter().map(UserSummary::from).collect()))
}

#[get("/users/<id>")]
pub async fn get_user(
    state: &State<AuthState>,
    _user: AuthUser,
    id: i32,
) -> Result<Json<UserSummary>, ApiError> {
    let user = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {id} not found")))?;

    Ok(Json(UserSummary::from(&user)))
}

#[put("/users/<id>", data = "<payload>")]
pub async fn update_profile(
    state: &State<AuthState>,
    caller: AuthUser,
    id: i32,
    payload: Json<ProfileUpdateRequest>,
) -> Result<Json<UserSummary>, ApiError> {
    // Callers edit themselves; only an admin (by current role, not the
    // role in the token) may edit someone else.
    if caller.id != id && !state.access.authorize(caller.id, &[Role::Admin]).await {
        return Err(ApiError::Forbidden(
            "Only admins may update other users".to_string(),
        ));
    }

    let request = payload.into_inner();
    let update = ProfileUpdate {
        name: request.name.map(|name| name.trim().to_string()),
        username: request.username.map(|username| username.trim().to_string()),
    };

    if matches!(&update.name, Some(name) if name.is_empty())
        || matches!(&update.username, Some(username) if username.is_empty())
    {
        return Err(ApiError::BadRequest(
            "Name and username must not be blank".to_string(),
        ));
    }

    let user = state.store.update_profile(id, update).await?;
    Ok(Json(UserSummary::from(&user)))
}

#[put("/users/<id>/role", data = "<payload>")]
pub async fn update_role(
    state: &State<AuthState>,
    _admin: RequireAdmin,
    id: i32,
    payload: Json<RoleUpdateRequest>,
) -> Result<Json<UserSummary>, ApiError> {
    let role = Role::parse(&payload.role)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown role '{}'", payload.role)))?;

    state.store.update_role(id, role).await?;
    let user = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {id} not found")))?;

    log::info!("role of user {id} set to {}", role.as_str());
    Ok(Json(UserSummary::from(&user)))
}

#[delete("/users/<id>")]
pub async fn delete_user(
    state: &State<AuthState>,
    _admin: RequireAdmin,
    id: i32,
) -> Result<rocket::http::Status, ApiError> {
    state.store.delete(id).await?;
    log::info!("user {id} deleted");
    Ok(rocket::http::Status::NoContent)
}
