//! End-to-end registration and login flows over the in-memory store.

use identity_api::auth::responses::{LoginResponse, UserSummary};
use identity_api::models::Role;
use identity_api::test_support;
use rocket::http::Status;
use rocket::local::blocking::Client;
use serde_json::json;

fn client() -> Client {
    let (rocket, _store) = test_support::api_rocket();
    Client::tracked(rocket).expect("valid Rocket instance")
}

fn register(client: &Client, name: &str, username: &str, email: &str, password: &str) {
    let response = client
        .post("/api/users")
        .json(&json!({
            "name": name,
            "username": username,
            "email": email,
            "password": password,
        }))
        .dispatch();
    assert_eq!(response.status(), Status::Created);
}

#[test]
fn registration_normalizes_email_and_ignores_requested_role() {
    let client = client();

    let response = client
        .post("/api/users")
        .json(&json!({
            "name": "Alice",
            "username": "alice",
            "email": "Alice@Example.com",
            "password": "pw123",
            "role": "admin",
        }))
        .dispatch();

    assert_eq!(response.status(), Status::Created);
    let summary: UserSummary = response.into_json().expect("user summary");
    assert_eq!(summary.email, "alice@example.com");
    assert_eq!(summary.role, Role::User);
}

#[test]
fn registration_response_never_contains_password_material() {
    let client = client();

    let response = client
        .post("/api/users")
        .json(&json!({
            "name": "Alice",
            "username": "alice",
            "email": "alice@example.com",
            "password": "pw123",
        }))
        .dispatch();

    assert_eq!(response.status(), Status::Created);
    let body = response.into_string().expect("response body");
    assert!(!body.contains("pw123"));
    assert!(!body.contains("password"));
}

#[test]
fn duplicate_registration_conflicts() {
    let client = client();
    register(&client, "Alice", "alice", "alice@example.com", "pw123");

    // Same email with different casing still collides.
    let response = client
        .post("/api/users")
        .json(&json!({
            "name": "Alice Again",
            "username": "alice2",
            "email": "ALICE@example.com",
            "password": "pw456",
        }))
        .dispatch();

    assert_eq!(response.status(), Status::Conflict);
}

#[test]
fn blank_registration_fields_are_rejected() {
    let client = client();

    let response = client
        .post("/api/users")
        .json(&json!({
            "name": "Alice",
            "username": "alice",
            "email": "alice@example.com",
            "password": "   ",
        }))
        .dispatch();

    assert_eq!(response.status(), Status::BadRequest);
}

#[test]
fn login_returns_a_token_for_case_folded_email() {
    let client = client();
    register(&client, "Alice", "alice", "Alice@Example.com", "pw123");

    let response = client
        .post("/api/users/login")
        .json(&json!({ "email": "ALICE@EXAMPLE.COM", "password": "pw123" }))
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let login: LoginResponse = response.into_json().expect("login response");
    assert!(!login.access_token.is_empty());
    assert!(login.expires_at > chrono::Utc::now());
}

#[test]
fn failed_logins_do_not_reveal_which_factor_was_wrong() {
    let client = client();
    register(&client, "Alice", "alice", "alice@example.com", "pw123");

    let wrong_password = client
        .post("/api/users/login")
        .json(&json!({ "email": "alice@example.com", "password": "wrong" }))
        .dispatch();
    let unknown_email = client
        .post("/api/users/login")
        .json(&json!({ "email": "nobody@x.com", "password": "pw123" }))
        .dispatch();

    assert_eq!(wrong_password.status(), Status::Unauthorized);
    assert_eq!(unknown_email.status(), Status::Unauthorized);

    // Identical bodies: a probe cannot distinguish "no such user" from
    // "bad password".
    let first = wrong_password.into_string().expect("body");
    let second = unknown_email.into_string().expect("body");
    assert_eq!(first, second);
}

#[test]
fn empty_login_fields_are_invalid_input() {
    let client = client();

    let response = client
        .post("/api/users/login")
        .json(&json!({ "email": "", "password": "pw123" }))
        .dispatch();

    assert_eq!(response.status(), Status::BadRequest);
}
