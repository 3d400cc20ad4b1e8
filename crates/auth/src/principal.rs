use serde::Serialize;

use quotedesk_core::UserId;

use crate::claims::JwtClaims;
use crate::user::UserAccount;

/// The authenticated user acting on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    /// Display name, falling back to the username.
    pub name: String,
}

impl Principal {
    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username.clone(),
            name: claims
                .name
                .clone()
                .unwrap_or_else(|| claims.username.clone()),
        }
    }

    pub fn from_account(user: &UserAccount) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            name: user.acting_name().to_string(),
        }
    }
}
