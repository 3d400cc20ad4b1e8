//! Status lifecycle: `DRAFT → FINALIZED`, one way.
//!
//! Finalizing stamps `finalized_at` and, for kinds that track progress, seeds
//! the first progress record. A finalized document is immutable.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quotedesk_core::{DomainError, DomainResult};

use crate::kind::DocumentKind;
use crate::progress::NewProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotationStatus {
    #[default]
    Draft,
    Finalized,
}

impl QuotationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QuotationStatus::Draft => "DRAFT",
            QuotationStatus::Finalized => "FINALIZED",
        }
    }

    pub fn is_finalized(self) -> bool {
        matches!(self, QuotationStatus::Finalized)
    }

    /// Reject any write to a finalized document.
    pub fn ensure_mutable(self) -> DomainResult<()> {
        if self.is_finalized() {
            return Err(DomainError::invariant(
                "cannot modify a finalized quotation",
            ));
        }
        Ok(())
    }
}

impl FromStr for QuotationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(QuotationStatus::Draft),
            "FINALIZED" => Ok(QuotationStatus::Finalized),
            other => Err(DomainError::validation(format!(
                "unknown status '{other}' (expected DRAFT or FINALIZED)"
            ))),
        }
    }
}

impl core::fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of applying a requested status to a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub status: QuotationStatus,
    pub finalized_at: Option<DateTime<Utc>>,
    /// Progress record to write in the same transaction, if any.
    pub progress_seed: Option<NewProgress>,
}

impl Transition {
    /// Resolve the requested status against the current one.
    ///
    /// Creation starts from `Draft` with no `finalized_at`. Omitting the status
    /// or requesting `Draft` on a draft leaves it unchanged.
    pub fn resolve<K: DocumentKind>(
        current: QuotationStatus,
        current_finalized_at: Option<DateTime<Utc>>,
        requested: Option<QuotationStatus>,
        actor_name: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        current.ensure_mutable()?;
        Ok(Self::enter::<K>(
            requested.unwrap_or(current),
            current_finalized_at,
            actor_name,
            now,
        ))
    }

    pub fn on_create<K: DocumentKind>(
        requested: Option<QuotationStatus>,
        actor_name: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self::enter::<K>(requested.unwrap_or_default(), None, actor_name, now)
    }

    fn enter<K: DocumentKind>(
        target: QuotationStatus,
        finalized_at: Option<DateTime<Utc>>,
        actor_name: &str,
        now: DateTime<Utc>,
    ) -> Self {
        match target {
            QuotationStatus::Draft => Self {
                status: QuotationStatus::Draft,
                finalized_at,
                progress_seed: None,
            },
            QuotationStatus::Finalized => Self {
                status: QuotationStatus::Finalized,
                finalized_at: Some(now),
                progress_seed: K::TRACKS_PROGRESS.then(|| NewProgress::initial(actor_name, now)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{Interior, Pop};
    use crate::progress::ProgressStatus;

    #[test]
    fn create_defaults_to_draft() {
        let t = Transition::on_create::<Interior>(None, "Asha", Utc::now());
        assert_eq!(t.status, QuotationStatus::Draft);
        assert_eq!(t.finalized_at, None);
        assert!(t.progress_seed.is_none());
    }

    #[test]
    fn finalizing_interior_seeds_progress() {
        let now = Utc::now();
        let t = Transition::on_create::<Interior>(Some(QuotationStatus::Finalized), "Ravi", now);
        assert_eq!(t.status, QuotationStatus::Finalized);
        assert_eq!(t.finalized_at, Some(now));

        let seed = t.progress_seed.unwrap();
        assert_eq!(seed.status, ProgressStatus::NotStarted);
        assert_eq!(seed.percentage, 0);
        assert_eq!(seed.updated_by, "Ravi");
        assert_eq!(seed.recorded_at, now);
    }

    #[test]
    fn finalizing_pop_has_no_progress() {
        let t = Transition::on_create::<Pop>(Some(QuotationStatus::Finalized), "Ravi", Utc::now());
        assert!(t.finalized_at.is_some());
        assert!(t.progress_seed.is_none());
    }

    #[test]
    fn draft_on_draft_is_a_no_op() {
        let t = Transition::resolve::<Interior>(
            QuotationStatus::Draft,
            None,
            Some(QuotationStatus::Draft),
            "Asha",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(t.status, QuotationStatus::Draft);
        assert!(t.finalized_at.is_none());
    }

    #[test]
    fn finalized_documents_reject_every_transition() {
        for requested in [None, Some(QuotationStatus::Draft), Some(QuotationStatus::Finalized)] {
            let err = Transition::resolve::<Pop>(
                QuotationStatus::Finalized,
                Some(Utc::now()),
                requested,
                "Asha",
                Utc::now(),
            )
            .unwrap_err();
            assert!(matches!(err, DomainError::InvariantViolation(_)));
        }
    }

    #[test]
    fn status_parses_wire_names_only() {
        assert_eq!("FINALIZED".parse::<QuotationStatus>().unwrap(), QuotationStatus::Finalized);
        assert!("finalized".parse::<QuotationStatus>().is_err());
    }
}
