use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quotedesk_core::{
    AggregateId, DomainError, DomainResult, Entity, Owned, UserId, optional_text, require_positive,
};
use quotedesk_quotations::{InteriorItemDraft, PriceSource, RoomType};

/// Predefined pricing identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingId(pub AggregateId);

impl PricingId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PricingId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// An owner's standard rate for one room category. At most one per
/// (owner, room type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredefinedPricing {
    pub id: PricingId,
    pub owner_id: UserId,
    pub room_type: RoomType,
    pub price_per_sqft: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for PredefinedPricing {
    type Id = PricingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for PredefinedPricing {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

/// Caller-supplied pricing entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingInput {
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub price_per_sqft: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PricingInput {
    fn validate(&self) -> DomainResult<(RoomType, f64, Option<String>)> {
        let room_type: RoomType = match self.room_type.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.parse()?,
            _ => return Err(DomainError::validation("room type is required")),
        };
        if room_type == RoomType::Custom {
            return Err(DomainError::validation(
                "custom items cannot have a predefined price",
            ));
        }
        let price_per_sqft = require_positive(self.price_per_sqft, "price per sqft")?;
        Ok((room_type, price_per_sqft, optional_text(self.description.clone())))
    }
}

impl PredefinedPricing {
    pub fn create(owner_id: UserId, input: &PricingInput, now: DateTime<Utc>) -> DomainResult<Self> {
        let (room_type, price_per_sqft, description) = input.validate()?;
        Ok(Self {
            id: PricingId::new(AggregateId::new()),
            owner_id,
            room_type,
            price_per_sqft,
            description,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace every editable field; identity and ownership are kept.
    pub fn replace(&self, input: &PricingInput, now: DateTime<Utc>) -> DomainResult<Self> {
        let (room_type, price_per_sqft, description) = input.validate()?;
        Ok(Self {
            room_type,
            price_per_sqft,
            description,
            updated_at: now,
            ..self.clone()
        })
    }
}

/// A predefined rate offered for pre-filling an interior item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateSuggestion {
    pub room_type: RoomType,
    pub price_per_sqft: f64,
    pub price_source: PriceSource,
}

impl RateSuggestion {
    /// Item draft pre-filled with this rate. The caller may still override it.
    pub fn prefill(&self, length: f64, width: f64) -> InteriorItemDraft {
        InteriorItemDraft {
            price_source: Some(self.price_source),
            ..InteriorItemDraft::new(self.room_type, length, width, self.price_per_sqft)
        }
    }
}

/// One owner's predefined rates, ordered by room type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceList {
    entries: Vec<PredefinedPricing>,
}

impl PriceList {
    pub fn new(mut entries: Vec<PredefinedPricing>) -> Self {
        entries.sort_by_key(|e| e.room_type.as_str());
        Self { entries }
    }

    pub fn entries(&self) -> &[PredefinedPricing] {
        &self.entries
    }

    /// Advisory only: quotations accept any positive rate regardless.
    pub fn suggest(&self, room_type: RoomType) -> Option<RateSuggestion> {
        self.entries
            .iter()
            .find(|e| e.room_type == room_type)
            .map(|e| RateSuggestion {
                room_type,
                price_per_sqft: e.price_per_sqft,
                price_source: PriceSource::Predefined,
            })
    }
}
