//! Persistence boundary for identities. The auth pipeline only ever talks
//! to the `UserStore` trait; backends are swapped at construction time.

pub mod memory;
pub mod postgres;

use thiserror::Error;

use crate::models::{NewUser, ProfileUpdate, Role, User};

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint on email or username was violated.
    #[error("duplicate email or username")]
    Duplicate,
    #[error("identity not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Capability object over the durable user records. Uniqueness of email
/// and username is enforced by the backend itself, so concurrent creates
/// of the same identity resolve to exactly one success.
#[rocket::async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<User>>;

    /// Lookup by email, matched case-insensitively.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn list(&self) -> StoreResult<Vec<User>>;

    async fn update_profile(&self, id: i32, update: ProfileUpdate) -> StoreResult<User>;

    async fn update_role(&self, id: i32, role: Role) -> StoreResult<()>;

    async fn delete(&self, id: i32) -> StoreResult<()>;
}
