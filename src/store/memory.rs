use std::collections::HashMap;

use chrono::Utc;
use parking_lot::Mutex;

use crate::models::{NewUser, ProfileUpdate, Role, User};
use crate::store::{StoreError, StoreResult, UserStore};

/// In-memory user store for tests and local experimentation. The single
/// mutex makes every operation atomic, which gives the same
/// one-winner guarantee for concurrent duplicate creates that Postgres
/// provides through its unique indexes.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i32,
    users: HashMap<i32, User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn has_duplicate(&self, email: &str, username: &str) -> bool {
        self.users.values().any(|user| {
            user.email.eq_ignore_ascii_case(email) || user.username == username
        })
    }
}

#[rocket::async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.lock();
        if inner.has_duplicate(&user.email, &user.username) {
            return Err(StoreError::Duplicate);
        }

        inner.next_id += 1;
        let record = User {
            id: inner.next_id,
            name: user.name,
            username: user.username,
            email: user.email,
            role: user.role,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        inner.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        Ok(self.inner.lock().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .inner
            .lock()
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.inner.lock().users.values().cloned().collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    async fn update_profile(&self, id: i32, update: ProfileUpdate) -> StoreResult<User> {
        let mut inner = self.inner.lock();

        if let Some(username) = &update.username {
            let taken = inner
                .users
                .values()
                .any(|user| user.id != id && &user.username == username);
            if taken {
                return Err(StoreError::Duplicate);
            }
        }

        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(username) = update.username {
            user.username = username;
        }
        Ok(user.clone())
    }

    async fn update_role(&self, id: i32, role: Role) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.role = role;
        Ok(())
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        self.inner
            .lock()
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
