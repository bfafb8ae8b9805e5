use std::sync::Arc;

use crate::models::Role;
use crate::store::UserStore;

/// Role-based access decisions. The identity's current role is re-read
/// from the store on every call, so an administrative role change takes
/// effect immediately without re-login. Any lookup failure denies.
#[derive(Clone)]
pub struct AccessController {
    store: Arc<dyn UserStore>,
}

impl AccessController {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn authorize(&self, identity_id: i32, required_roles: &[Role]) -> bool {
        if required_roles.is_empty() {
            return true;
        }

        match self.store.find_by_id(identity_id).await {
            Ok(Some(user)) => required_roles.contains(&user.role),
            Ok(None) => {
                log::warn!("authorization denied: identity {identity_id} not found");
                false
            }
            Err(err) => {
                log::warn!("authorization denied: role lookup failed for {identity_id}: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::store::MemoryUserStore;

    async fn seed(store: &MemoryUserStore, username: &str, role: Role) -> i32 {
        store
            .create(NewUser {
                name: username.to_string(),
                username: username.to_string(),
                email: format!("{username}@example.com"),
                role,
                password_hash: "$argon2id$fake".into(),
            })
            .await
            .expect("seed user")
            .id
    }

    #[rocket::async_test]
    async fn empty_requirement_is_always_allowed() {
        let store = Arc::new(MemoryUserStore::new());
        let access = AccessController::new(store);

        // No store consultation happens, so even an unknown id passes.
        assert!(access.authorize(9999, &[]).await);
    }

    #[rocket::async_test]
    async fn role_membership_decides() {
        let store = Arc::new(MemoryUserStore::new());
        let admin_id = seed(&store, "root", Role::Admin).await;
        let user_id = seed(&store, "plain", Role::User).await;
        let access = AccessController::new(store);

        assert!(access.authorize(admin_id, &[Role::Admin]).await);
        assert!(!access.authorize(user_id, &[Role::Admin]).await);
        assert!(access.authorize(user_id, &[Role::Admin, Role::User]).await);
    }

    #[rocket::async_test]
    async fn unknown_identity_fails_closed() {
        let store = Arc::new(MemoryUserStore::new());
        let access = AccessController::new(store);

        assert!(!access.authorize(42, &[Role::Admin]).await);
    }

    #[rocket::async_test]
    async fn role_change_is_visible_without_reissue() {
        let store = Arc::new(MemoryUserStore::new());
        let id = seed(&store, "promoted", Role::User).await;
        let access = AccessController::new(store.clone());

        assert!(!access.authorize(id, &[Role::Admin]).await);
        store.update_role(id, Role::Admin).await.expect("promote");
        assert!(access.authorize(id, &[Role::Admin]).await);
    }
}
