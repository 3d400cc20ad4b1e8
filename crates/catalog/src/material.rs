use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quotedesk_core::{
    AggregateId, DomainResult, Entity, Owned, UserId, optional_text, require_positive,
    require_text,
};

/// Material identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub AggregateId);

impl MaterialId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A priced material (`"Plywood 18mm"`, 95.0 per `"sqft"`). Independent of
/// quotation pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Material {
    type Id = MaterialId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for Material {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

struct ValidMaterial {
    name: String,
    description: Option<String>,
    price: f64,
    unit: String,
}

impl MaterialInput {
    fn validate(&self) -> DomainResult<ValidMaterial> {
        Ok(ValidMaterial {
            name: require_text(self.name.as_deref(), "name")?,
            description: optional_text(self.description.clone()),
            price: require_positive(self.price, "price")?,
            unit: require_text(self.unit.as_deref(), "unit")?,
        })
    }
}

impl Material {
    pub fn create(owner_id: UserId, input: &MaterialInput, now: DateTime<Utc>) -> DomainResult<Self> {
        let v = input.validate()?;
        Ok(Self {
            id: MaterialId::new(AggregateId::new()),
            owner_id,
            name: v.name,
            description: v.description,
            price: v.price,
            unit: v.unit,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn replace(&self, input: &MaterialInput, now: DateTime<Utc>) -> DomainResult<Self> {
        let v = input.validate()?;
        Ok(Self {
            name: v.name,
            description: v.description,
            price: v.price,
            unit: v.unit,
            updated_at: now,
            ..self.clone()
        })
    }
}
