use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::models::{NewUser, ProfileUpdate, Role, User};
use crate::store::{StoreError, StoreResult, UserStore};

/// Postgres-backed user store. Duplicate detection is delegated to the
/// unique indexes on `lower(email)` and `username`.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i32,
    name: String,
    username: String,
    email: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            username: row.username,
            email: row.email,
            role: Role::from_str(&row.role),
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, name, username, email, role, password_hash, created_at";

#[rocket::async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, username, email, role, password_hash) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_profile(&self, id: i32, update: ProfileUpdate) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET name = COALESCE($2, name), username = COALESCE($3, username) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.map(User::from).ok_or(StoreError::NotFound)
    }

    async fn update_role(&self, id: i32, role: Role) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err)
            if db_err.code().map(|code| code == "23505").unwrap_or(false) =>
        {
            StoreError::Duplicate
        }
        _ => StoreError::Database(err),
    }
}
