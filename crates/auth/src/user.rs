//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quotedesk_core::{Entity, UserId, optional_text};

use crate::error::AuthError;
use crate::password::{hash_password, verify_password};

/// A stored account. Serialising never exposes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for UserAccount {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl UserAccount {
    pub fn register(input: NewUser, now: DateTime<Utc>) -> Result<Self, AuthError> {
        let username = input.username.trim().to_string();
        if username.is_empty() {
            return Err(AuthError::Validation("username is required".into()));
        }
        if input.password.is_empty() {
            return Err(AuthError::Validation("password is required".into()));
        }

        Ok(Self {
            id: UserId::new(),
            username,
            display_name: optional_text(input.display_name),
            email: optional_text(input.email),
            password_hash: hash_password(&input.password)?,
            created_at: now,
        })
    }

    /// Name recorded against the user's actions: display name, else username.
    pub fn acting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    pub fn check_password(&self, plain: &str) -> Result<(), AuthError> {
        if verify_password(plain, &self.password_hash)? {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}
