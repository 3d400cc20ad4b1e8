use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quotedesk_auth::{IssuedToken, Principal};
use quotedesk_core::{DomainError, DomainResult, ExpectedVersion};
use quotedesk_quotations::{
    CreateQuotation, DocumentKind, ProgressStatus, QuotationStatus, RecordProgress,
    UpdateQuotation,
};

use crate::context::PrincipalContext;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Every field is optional on the wire so that missing values surface as
/// domain validation errors.
#[derive(Debug, Deserialize)]
#[serde(bound = "")]
pub struct CreateQuotationRequest<K: DocumentKind> {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "Vec::new")]
    pub items: Vec<K::ItemDraft>,
}

impl<K: DocumentKind> CreateQuotationRequest<K> {
    pub fn into_command(self, principal: &PrincipalContext) -> DomainResult<CreateQuotation<K>> {
        Ok(CreateQuotation {
            owner_id: principal.user_id(),
            actor_name: principal.acting_name().to_string(),
            client_name: self.client_name,
            client_phone: self.client_phone,
            client_email: self.client_email,
            client_address: self.client_address,
            notes: self.notes,
            status: parse_status(self.status.as_deref())?,
            items: self.items,
            occurred_at: Utc::now(),
        })
    }
}

/// Omitted fields are kept; an empty optional text clears the field.
#[derive(Debug, Deserialize)]
#[serde(bound = "")]
pub struct UpdateQuotationRequest<K: DocumentKind> {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<K::ItemDraft>>,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

impl<K: DocumentKind> UpdateQuotationRequest<K> {
    pub fn into_command(self, principal: &PrincipalContext) -> DomainResult<UpdateQuotation<K>> {
        Ok(UpdateQuotation {
            actor_id: principal.user_id(),
            actor_name: principal.acting_name().to_string(),
            client_name: self.client_name,
            client_phone: self.client_phone,
            client_email: self.client_email,
            client_address: self.client_address,
            notes: self.notes,
            status: parse_status(self.status.as_deref())?,
            items: self.items,
            expected_version: ExpectedVersion::from(self.expected_version),
            occurred_at: Utc::now(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuotationsQuery {
    pub status: Option<String>,
}

impl ListQuotationsQuery {
    pub fn status(&self) -> DomainResult<Option<QuotationStatus>> {
        parse_status(self.status.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordProgressRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub percentage: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

impl RecordProgressRequest {
    pub fn into_command(self, principal: &PrincipalContext) -> DomainResult<RecordProgress> {
        let status: ProgressStatus = match self.status.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.parse()?,
            _ => return Err(DomainError::validation("status is required")),
        };
        let percentage = self
            .percentage
            .ok_or_else(|| DomainError::validation("percentage is required"))?;

        Ok(RecordProgress {
            actor_id: principal.user_id(),
            actor_name: principal.acting_name().to_string(),
            status,
            percentage,
            note: self.note,
            occurred_at: Utc::now(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestRateQuery {
    pub room_type: String,
}

fn parse_status(raw: Option<&str>) -> DomainResult<Option<QuotationStatus>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: Principal,
}

impl LoginResponse {
    pub fn new(issued: IssuedToken, user: Principal) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
}

impl DeletedResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotedesk_core::UserId;
    use quotedesk_quotations::{Interior, Pop};

    fn principal() -> PrincipalContext {
        PrincipalContext::new(Principal {
            user_id: UserId::new(),
            username: "Admin".into(),
            name: "Administrator".into(),
        })
    }

    #[test]
    fn create_request_accepts_missing_fields() {
        let req: CreateQuotationRequest<Interior> =
            serde_json::from_value(serde_json::json!({ "client_name": "Asha" })).unwrap();
        let cmd = req.into_command(&principal()).unwrap();
        assert!(cmd.items.is_empty());
        assert_eq!(cmd.status, None);
        assert_eq!(cmd.actor_name, "Administrator");
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        let req: UpdateQuotationRequest<Pop> =
            serde_json::from_value(serde_json::json!({ "status": "SENT" })).unwrap();
        assert!(matches!(
            req.into_command(&principal()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn progress_request_requires_status_and_percentage() {
        let missing = RecordProgressRequest {
            status: None,
            percentage: Some(10),
            note: None,
        };
        assert!(missing.into_command(&principal()).is_err());

        let ok = RecordProgressRequest {
            status: Some("IN_PROGRESS".into()),
            percentage: Some(10),
            note: Some("ceiling done".into()),
        }
        .into_command(&principal())
        .unwrap();
        assert_eq!(ok.status, ProgressStatus::InProgress);
    }
}
