//! Work progress on finalized interior quotations.
//!
//! History is append-only and read most-recent-first. The first record is
//! seeded by finalization; later ones are recorded by the document's owner.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quotedesk_core::{AggregateId, DomainError, DomainResult, Owned, UserId, optional_text};

use crate::kind::DocumentKind;
use crate::quotation::{Quotation, QuotationId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressId(pub AggregateId);

impl ProgressId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProgressId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "NOT_STARTED",
            ProgressStatus::InProgress => "IN_PROGRESS",
            ProgressStatus::Completed => "COMPLETED",
        }
    }
}

impl FromStr for ProgressStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_STARTED" => Ok(ProgressStatus::NotStarted),
            "IN_PROGRESS" => Ok(ProgressStatus::InProgress),
            "COMPLETED" => Ok(ProgressStatus::Completed),
            other => Err(DomainError::validation(format!(
                "unknown progress status '{other}'"
            ))),
        }
    }
}

impl core::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated progress entry not yet attached to a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProgress {
    pub status: ProgressStatus,
    pub percentage: u8,
    pub updated_by: String,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl NewProgress {
    /// The record written when a document is finalized.
    pub fn initial(updated_by: &str, at: DateTime<Utc>) -> Self {
        Self {
            status: ProgressStatus::NotStarted,
            percentage: 0,
            updated_by: updated_by.to_string(),
            note: None,
            recorded_at: at,
        }
    }

    pub fn into_record(self, quotation_id: QuotationId) -> ProgressRecord {
        ProgressRecord {
            id: ProgressId::new(AggregateId::new()),
            quotation_id,
            status: self.status,
            percentage: self.percentage,
            updated_by: self.updated_by,
            note: self.note,
            created_at: self.recorded_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: ProgressId,
    pub quotation_id: QuotationId,
    pub status: ProgressStatus,
    pub percentage: u8,
    pub updated_by: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Command: RecordProgress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordProgress {
    pub actor_id: UserId,
    pub actor_name: String,
    pub status: ProgressStatus,
    pub percentage: i64,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl RecordProgress {
    /// Validate the command against the quotation it targets.
    pub fn plan<K: DocumentKind>(&self, quotation: &Quotation<K>) -> DomainResult<NewProgress> {
        if !K::TRACKS_PROGRESS {
            return Err(DomainError::validation(format!(
                "{} quotations do not track progress",
                K::KIND
            )));
        }
        if !quotation.is_owned_by(self.actor_id) {
            return Err(DomainError::not_found());
        }
        if !quotation.status.is_finalized() {
            return Err(DomainError::invariant(
                "progress can only be recorded on a finalized quotation",
            ));
        }

        let percentage = u8::try_from(self.percentage)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| DomainError::validation("percentage must be between 0 and 100"))?;

        match (self.status, percentage) {
            (ProgressStatus::Completed, p) if p != 100 => {
                return Err(DomainError::validation("COMPLETED progress must be 100%"));
            }
            (ProgressStatus::NotStarted, p) if p != 0 => {
                return Err(DomainError::validation("NOT_STARTED progress must be 0%"));
            }
            _ => {}
        }

        Ok(NewProgress {
            status: self.status,
            percentage,
            updated_by: self.actor_name.clone(),
            note: optional_text(self.note.clone()),
            recorded_at: self.occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interior::{InteriorItemDraft, RoomType};
    use crate::kind::{Interior, Pop};
    use crate::lifecycle::QuotationStatus;
    use crate::pop::PopItemDraft;
    use crate::quotation::CreateQuotation;
    use crate::number::DocumentNumber;

    fn finalized_interior(owner: UserId) -> Quotation<Interior> {
        CreateQuotation::<Interior> {
            status: Some(QuotationStatus::Finalized),
            ..CreateQuotation::new(
                owner,
                "Owner",
                "Asha",
                vec![InteriorItemDraft::new(RoomType::Kitchen, 10.0, 8.0, 150.0)],
            )
        }
        .plan()
        .unwrap()
        .into_quotation(DocumentNumber::first(crate::Kind::Interior, 2026).unwrap())
    }

    fn command(owner: UserId, status: ProgressStatus, percentage: i64) -> RecordProgress {
        RecordProgress {
            actor_id: owner,
            actor_name: "Site lead".into(),
            status,
            percentage,
            note: Some("  carcass installed ".into()),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn owner_records_progress_on_finalized_quotation() {
        let owner = UserId::new();
        let q = finalized_interior(owner);
        let entry = command(owner, ProgressStatus::InProgress, 40).plan(&q).unwrap();
        assert_eq!(entry.percentage, 40);
        assert_eq!(entry.updated_by, "Site lead");
        assert_eq!(entry.note.as_deref(), Some("carcass installed"));

        let record = entry.into_record(q.id);
        assert_eq!(record.quotation_id, q.id);
    }

    #[test]
    fn percentage_must_be_in_range_and_match_status() {
        let owner = UserId::new();
        let q = finalized_interior(owner);
        for (status, pct) in [
            (ProgressStatus::InProgress, 101),
            (ProgressStatus::InProgress, -1),
            (ProgressStatus::Completed, 90),
            (ProgressStatus::NotStarted, 10),
        ] {
            let err = command(owner, status, pct).plan(&q).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{status} {pct}");
        }
        assert!(command(owner, ProgressStatus::Completed, 100).plan(&q).is_ok());
    }

    #[test]
    fn other_owner_sees_not_found() {
        let q = finalized_interior(UserId::new());
        let err = command(UserId::new(), ProgressStatus::InProgress, 10)
            .plan(&q)
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn draft_quotation_rejects_progress() {
        let owner = UserId::new();
        let mut q = finalized_interior(owner);
        q.status = QuotationStatus::Draft;
        q.finalized_at = None;
        let err = command(owner, ProgressStatus::InProgress, 10).plan(&q).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn pop_quotations_do_not_track_progress() {
        let owner = UserId::new();
        let q = CreateQuotation::<Pop>::new(
            owner,
            "Owner",
            "Asha",
            vec![PopItemDraft::by_quantity("Cornice", 2.0, 100.0)],
        )
        .plan()
        .unwrap()
        .into_quotation(DocumentNumber::first(crate::Kind::Pop, 2026).unwrap());
        let err = command(owner, ProgressStatus::InProgress, 10).plan(&q).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("pop")));
    }
}
