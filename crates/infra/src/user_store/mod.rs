//! User account persistence and default-account seeding.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use quotedesk_auth::{NewUser, UserAccount};
use quotedesk_core::UserId;

use crate::error::{ServiceError, StoreError};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns `Duplicate` if the username is taken.
    async fn insert(&self, user: &UserAccount) -> Result<(), StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<UserAccount>, StoreError>;

    /// Exact (case-sensitive) username match.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError>;
}

/// Create the default account unless an account with its username exists.
///
/// Idempotent: returns the existing account on later runs, including when a
/// concurrent seeder won the insert.
pub async fn seed_default_user(
    store: &dyn UserStore,
    seed: NewUser,
    now: DateTime<Utc>,
) -> Result<UserAccount, ServiceError> {
    let username = seed.username.trim().to_string();
    if let Some(existing) = store.find_by_username(&username).await? {
        return Ok(existing);
    }

    let account = UserAccount::register(seed, now)?;
    match store.insert(&account).await {
        Ok(()) => {
            info!(user_id = %account.id, username = %account.username, "seeded default account");
            Ok(account)
        }
        Err(StoreError::Duplicate(_)) => store
            .find_by_username(&username)
            .await?
            .ok_or_else(|| ServiceError::Internal("seeded account vanished".into())),
        Err(e) => Err(e.into()),
    }
}
