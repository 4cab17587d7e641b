use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{User, UserStore, UserStoreError};

/// In-process user store keyed by email. Used by tests and local demos.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.users.get_mut().insert(user.email.clone(), user);
        self
    }

    /// Insert or replace the user stored under `user.email`.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.email.clone(), user);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn ping(&self) -> Result<(), UserStoreError> {
        Ok(())
    }
}
