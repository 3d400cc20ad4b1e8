use quotedesk_auth::Principal;
use quotedesk_core::UserId;

/// Principal context for a request (the authenticated account).
///
/// Inserted by the auth middleware; every protected route is scoped by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    /// Name recorded against the user's actions.
    pub fn acting_name(&self) -> &str {
        &self.principal.name
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
