//! The quotation aggregate, generic over its document kind.

use core::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use quotedesk_core::{
    AggregateId, AggregateRoot, DomainError, DomainResult, ExpectedVersion, Owned, UserId,
    optional_text, require_text,
};

use crate::kind::{DocumentKind, Kind};
use crate::lifecycle::{QuotationStatus, Transition};
use crate::number::DocumentNumber;
use crate::pricing::{price_items, total_amount};
use crate::progress::NewProgress;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotationId(pub AggregateId);

impl QuotationId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for QuotationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for QuotationId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Aggregate root: a numbered quotation with its priced line items.
///
/// `total_amount` always equals the sum of the items' totals, and
/// `finalized_at` is set exactly when the status is `Finalized`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Quotation<K: DocumentKind> {
    pub id: QuotationId,
    pub quotation_number: DocumentNumber,
    pub owner_id: UserId,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub client_address: Option<String>,
    pub notes: Option<String>,
    pub status: QuotationStatus,
    pub total_amount: f64,
    pub finalized_at: Option<DateTime<Utc>>,
    pub items: Vec<K::Item>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl<K: DocumentKind> AggregateRoot for Quotation<K> {
    type Id = QuotationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl<K: DocumentKind> Owned for Quotation<K> {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

impl<K: DocumentKind> Quotation<K> {
    pub fn kind(&self) -> Kind {
        K::KIND
    }

    fn ensure_writable_by(&self, user: UserId) -> DomainResult<()> {
        if !self.is_owned_by(user) {
            return Err(DomainError::forbidden(
                "quotation belongs to another user",
            ));
        }
        self.status.ensure_mutable()
    }

    pub fn ensure_deletable_by(&self, user: UserId) -> DomainResult<()> {
        self.ensure_writable_by(user)
    }

    /// Compute the next state of this document for an update.
    ///
    /// Omitted fields are kept. A supplied empty optional text clears it; a
    /// supplied item list replaces every item and recomputes the total.
    pub fn plan_update(&self, cmd: &UpdateQuotation<K>) -> DomainResult<QuotationUpdate<K>> {
        self.ensure_writable_by(cmd.actor_id)?;
        cmd.expected_version.check(self.version)?;

        let mut next = self.clone();

        if let Some(name) = cmd.client_name.as_deref() {
            next.client_name = require_text(Some(name), "client name")?;
        }
        if let Some(v) = &cmd.client_phone {
            next.client_phone = optional_text(Some(v.clone()));
        }
        if let Some(v) = &cmd.client_email {
            next.client_email = optional_text(Some(v.clone()));
        }
        if let Some(v) = &cmd.client_address {
            next.client_address = optional_text(Some(v.clone()));
        }
        if let Some(v) = &cmd.notes {
            next.notes = optional_text(Some(v.clone()));
        }
        if let Some(drafts) = &cmd.items {
            next.items = price_items(drafts)?;
            next.total_amount = total_amount(&next.items)?;
        }

        let transition = Transition::resolve::<K>(
            self.status,
            self.finalized_at,
            cmd.status,
            &cmd.actor_name,
            cmd.occurred_at,
        )?;
        next.status = transition.status;
        next.finalized_at = transition.finalized_at;
        next.updated_at = cmd.occurred_at;
        next.version = self.version + 1;

        Ok(QuotationUpdate {
            quotation: next,
            progress_seed: transition.progress_seed,
        })
    }
}

/// A validated, priced document waiting for its number.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuotation<K: DocumentKind> {
    pub id: QuotationId,
    pub owner_id: UserId,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub client_address: Option<String>,
    pub notes: Option<String>,
    pub status: QuotationStatus,
    pub total_amount: f64,
    pub finalized_at: Option<DateTime<Utc>>,
    pub items: Vec<K::Item>,
    pub created_at: DateTime<Utc>,
    /// Written in the same transaction as the document.
    pub progress_seed: Option<NewProgress>,
}

impl<K: DocumentKind> NewQuotation<K> {
    pub fn kind(&self) -> Kind {
        K::KIND
    }

    /// Year whose number sequence this document joins.
    pub fn year(&self) -> i32 {
        self.created_at.year()
    }

    pub fn into_quotation(self, quotation_number: DocumentNumber) -> Quotation<K> {
        Quotation {
            id: self.id,
            quotation_number,
            owner_id: self.owner_id,
            client_name: self.client_name,
            client_phone: self.client_phone,
            client_email: self.client_email,
            client_address: self.client_address,
            notes: self.notes,
            status: self.status,
            total_amount: self.total_amount,
            finalized_at: self.finalized_at,
            items: self.items,
            created_at: self.created_at,
            updated_at: self.created_at,
            version: 1,
        }
    }
}

/// Command: CreateQuotation.
#[derive(Debug, Clone)]
pub struct CreateQuotation<K: DocumentKind> {
    pub owner_id: UserId,
    /// Display name of the acting user, recorded on seeded progress.
    pub actor_name: String,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub client_address: Option<String>,
    pub notes: Option<String>,
    pub status: Option<QuotationStatus>,
    pub items: Vec<K::ItemDraft>,
    pub occurred_at: DateTime<Utc>,
}

impl<K: DocumentKind> CreateQuotation<K> {
    pub fn new(
        owner_id: UserId,
        actor_name: &str,
        client_name: &str,
        items: Vec<K::ItemDraft>,
    ) -> Self {
        Self {
            owner_id,
            actor_name: actor_name.to_string(),
            client_name: Some(client_name.to_string()),
            client_phone: None,
            client_email: None,
            client_address: None,
            notes: None,
            status: None,
            items,
            occurred_at: Utc::now(),
        }
    }

    /// Validate, price every item and resolve the initial status.
    pub fn plan(&self) -> DomainResult<NewQuotation<K>> {
        let client_name = require_text(self.client_name.as_deref(), "client name")?;
        let items = price_items(&self.items)?;
        let total_amount = total_amount(&items)?;
        let transition = Transition::on_create::<K>(self.status, &self.actor_name, self.occurred_at);

        Ok(NewQuotation {
            id: QuotationId::new(AggregateId::new()),
            owner_id: self.owner_id,
            client_name,
            client_phone: optional_text(self.client_phone.clone()),
            client_email: optional_text(self.client_email.clone()),
            client_address: optional_text(self.client_address.clone()),
            notes: optional_text(self.notes.clone()),
            status: transition.status,
            total_amount,
            finalized_at: transition.finalized_at,
            items,
            created_at: self.occurred_at,
            progress_seed: transition.progress_seed,
        })
    }
}

/// Command: UpdateQuotation. `None` means "keep the current value".
#[derive(Debug, Clone)]
pub struct UpdateQuotation<K: DocumentKind> {
    pub actor_id: UserId,
    pub actor_name: String,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub client_address: Option<String>,
    pub notes: Option<String>,
    pub status: Option<QuotationStatus>,
    pub items: Option<Vec<K::ItemDraft>>,
    pub expected_version: ExpectedVersion,
    pub occurred_at: DateTime<Utc>,
}

impl<K: DocumentKind> UpdateQuotation<K> {
    pub fn new(actor_id: UserId, actor_name: &str) -> Self {
        Self {
            actor_id,
            actor_name: actor_name.to_string(),
            client_name: None,
            client_phone: None,
            client_email: None,
            client_address: None,
            notes: None,
            status: None,
            items: None,
            expected_version: ExpectedVersion::Any,
            occurred_at: Utc::now(),
        }
    }
}

/// The next state of a document plus any progress record to write with it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotationUpdate<K: DocumentKind> {
    pub quotation: Quotation<K>,
    pub progress_seed: Option<NewProgress>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interior::{InteriorItemDraft, RoomType};
    use crate::kind::{Interior, Pop};
    use crate::pop::PopItemDraft;
    use crate::progress::ProgressStatus;
    use proptest::prelude::*;

    fn kitchen() -> InteriorItemDraft {
        InteriorItemDraft::new(RoomType::Kitchen, 10.0, 8.0, 150.0)
    }

    fn create_interior(owner: UserId, status: Option<QuotationStatus>) -> Quotation<Interior> {
        let cmd = CreateQuotation::<Interior> {
            status,
            ..CreateQuotation::new(owner, "Administrator", "Asha", vec![kitchen()])
        };
        let number = DocumentNumber::first(Kind::Interior, cmd.occurred_at.year()).unwrap();
        cmd.plan().unwrap().into_quotation(number)
    }

    #[test]
    fn create_prices_items_and_starts_as_draft() {
        let owner = UserId::new();
        let q = create_interior(owner, None);

        assert_eq!(q.items.len(), 1);
        assert_eq!(q.items[0].area, 80.0);
        assert_eq!(q.items[0].total_price, 12000.0);
        assert_eq!(q.total_amount, 12000.0);
        assert_eq!(q.status, QuotationStatus::Draft);
        assert_eq!(q.finalized_at, None);
        assert_eq!(q.version, 1);
        assert!(q.quotation_number.to_string().starts_with("QT-"));
        assert!(q.quotation_number.to_string().ends_with("-0001"));
    }

    #[test]
    fn create_finalized_seeds_progress_with_actor_name() {
        let cmd = CreateQuotation::<Interior> {
            status: Some(QuotationStatus::Finalized),
            ..CreateQuotation::new(UserId::new(), "Administrator", "Asha", vec![kitchen()])
        };
        let new = cmd.plan().unwrap();
        assert_eq!(new.finalized_at, Some(cmd.occurred_at));
        let seed = new.progress_seed.unwrap();
        assert_eq!(seed.status, ProgressStatus::NotStarted);
        assert_eq!(seed.percentage, 0);
        assert_eq!(seed.updated_by, "Administrator");
    }

    #[test]
    fn create_requires_client_name_and_items() {
        let cmd = CreateQuotation::<Interior>::new(UserId::new(), "a", "   ", vec![kitchen()]);
        assert_eq!(
            cmd.plan().unwrap_err(),
            DomainError::validation("client name is required")
        );

        let cmd = CreateQuotation::<Interior>::new(UserId::new(), "a", "Asha", vec![]);
        assert_eq!(
            cmd.plan().unwrap_err(),
            DomainError::validation("at least one item is required")
        );
    }

    #[test]
    fn blank_optional_fields_are_stored_as_none() {
        let cmd = CreateQuotation::<Interior> {
            client_phone: Some("  ".into()),
            client_email: Some("asha@example.com".into()),
            ..CreateQuotation::new(UserId::new(), "a", "Asha", vec![kitchen()])
        };
        let new = cmd.plan().unwrap();
        assert_eq!(new.client_phone, None);
        assert_eq!(new.client_email.as_deref(), Some("asha@example.com"));
    }

    #[test]
    fn update_replaces_items_and_recomputes_total() {
        let owner = UserId::new();
        let q = create_interior(owner, None);

        let cmd = UpdateQuotation::<Interior> {
            items: Some(vec![
                InteriorItemDraft::new(RoomType::Wardrobe, 6.0, 7.0, 120.0),
                InteriorItemDraft::new(RoomType::Loft, 6.0, 2.0, 90.0),
            ]),
            ..UpdateQuotation::new(owner, "Administrator")
        };
        let next = q.plan_update(&cmd).unwrap().quotation;

        assert_eq!(next.items.len(), 2);
        assert!(next.items.iter().all(|i| i.room_type != RoomType::Kitchen));
        assert_eq!(next.total_amount, 5040.0 + 1080.0);
        assert_eq!(next.version, 2);
        assert_eq!(next.quotation_number, q.quotation_number);
        assert_eq!(next.client_name, "Asha");
    }

    #[test]
    fn update_clears_optional_text_with_empty_string() {
        let owner = UserId::new();
        let mut q = create_interior(owner, None);
        q.notes = Some("call before visit".into());

        let cmd = UpdateQuotation::<Interior> {
            notes: Some(String::new()),
            ..UpdateQuotation::new(owner, "a")
        };
        assert_eq!(q.plan_update(&cmd).unwrap().quotation.notes, None);

        let cmd = UpdateQuotation::<Interior> {
            client_name: Some(" ".into()),
            ..UpdateQuotation::new(owner, "a")
        };
        assert!(matches!(q.plan_update(&cmd), Err(DomainError::Validation(_))));
    }

    #[test]
    fn update_to_finalized_stamps_and_seeds_once() {
        let owner = UserId::new();
        let q = create_interior(owner, None);

        let cmd = UpdateQuotation::<Interior> {
            status: Some(QuotationStatus::Finalized),
            ..UpdateQuotation::new(owner, "Administrator")
        };
        let update = q.plan_update(&cmd).unwrap();
        assert_eq!(update.quotation.status, QuotationStatus::Finalized);
        assert_eq!(update.quotation.finalized_at, Some(cmd.occurred_at));
        assert!(update.progress_seed.is_some());

        let again = update.quotation.plan_update(&cmd).unwrap_err();
        assert!(matches!(again, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn other_owner_is_forbidden_on_write_and_not_found_on_read() {
        let q = create_interior(UserId::new(), None);
        let stranger = UserId::new();

        let err = q
            .plan_update(&UpdateQuotation::new(stranger, "x"))
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(matches!(q.ensure_deletable_by(stranger), Err(DomainError::Forbidden(_))));
        assert_eq!(q.ensure_visible_to(stranger).unwrap_err(), DomainError::NotFound);
    }

    #[test]
    fn stale_expected_version_is_a_conflict() {
        let owner = UserId::new();
        let q = create_interior(owner, None);
        let cmd = UpdateQuotation::<Interior> {
            expected_version: ExpectedVersion::Exact(7),
            ..UpdateQuotation::new(owner, "a")
        };
        assert!(matches!(q.plan_update(&cmd), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn finalized_pop_cannot_be_deleted() {
        let owner = UserId::new();
        let cmd = CreateQuotation::<Pop> {
            status: Some(QuotationStatus::Finalized),
            ..CreateQuotation::new(
                owner,
                "a",
                "Asha",
                vec![PopItemDraft::by_area("False ceiling", 12.0, 10.0, 85.0)],
            )
        };
        let number = DocumentNumber::first(Kind::Pop, 2026).unwrap();
        let q = cmd.plan().unwrap().into_quotation(number);

        assert!(matches!(
            q.ensure_deletable_by(owner),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn total_that_overflows_is_rejected_on_create_and_update() {
        let owner = UserId::new();
        // Each item total is finite (~1.7e308); their sum is not.
        let huge = || InteriorItemDraft::new(RoomType::Kitchen, 1e154, 1e154, 1.7);

        let err = CreateQuotation::<Interior>::new(owner, "a", "Asha", vec![huge(), huge()])
            .plan()
            .unwrap_err();
        assert_eq!(err, DomainError::validation("total amount is too large"));

        let q = create_interior(owner, None);
        let cmd = UpdateQuotation::<Interior> {
            items: Some(vec![huge(), huge()]),
            ..UpdateQuotation::new(owner, "a")
        };
        assert_eq!(
            q.plan_update(&cmd).unwrap_err(),
            DomainError::validation("total amount is too large")
        );
    }

    #[test]
    fn serde_round_trip_keeps_items_and_total() {
        let q = create_interior(UserId::new(), Some(QuotationStatus::Finalized));
        let json = serde_json::to_string(&q).unwrap();
        let back: Quotation<Interior> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }

    proptest! {
        #[test]
        fn total_is_sum_of_item_totals(
            dims in proptest::collection::vec((0.5f64..50.0, 0.5f64..50.0, 1.0f64..5_000.0), 1..8)
        ) {
            let drafts: Vec<_> = dims
                .iter()
                .map(|(l, w, r)| InteriorItemDraft::new(RoomType::Bed, *l, *w, *r))
                .collect();
            let new = CreateQuotation::<Interior>::new(UserId::new(), "a", "Asha", drafts)
                .plan()
                .unwrap();
            let sum: f64 = new.items.iter().map(|i| i.total_price).sum();
            prop_assert_eq!(new.total_amount, sum);
            for item in &new.items {
                prop_assert_eq!(item.area, item.length * item.width);
            }
        }
    }
}
