use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use quotedesk_auth::UserAccount;
use quotedesk_core::UserId;

use super::UserStore;
use crate::error::StoreError;

/// In-memory user store (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    rows: RwLock<HashMap<UserId, UserAccount>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &UserAccount) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;
        if rows.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate(format!(
                "username {} is taken",
                user.username
            )));
        }
        if rows.contains_key(&user.id) {
            return Err(StoreError::Duplicate(format!("user {} already exists", user.id)));
        }
        rows.insert(user.id, user.clone());
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        Ok(rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        Ok(rows.values().find(|u| u.username == username).cloned())
    }
}
