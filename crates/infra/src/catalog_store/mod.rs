//! Persistence for the owner-scoped catalogs: predefined room rates and
//! materials.

use async_trait::async_trait;

use quotedesk_catalog::{Material, MaterialId, PredefinedPricing, PricingId};
use quotedesk_core::UserId;

use crate::error::StoreError;

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryMaterialStore, InMemoryPricingStore};
pub use postgres::{PostgresMaterialStore, PostgresPricingStore};

#[async_trait]
pub trait PricingStore: Send + Sync {
    /// Returns `Duplicate` if the owner already has a rate for the room type.
    async fn insert(&self, entry: &PredefinedPricing) -> Result<(), StoreError>;

    async fn get(&self, id: PricingId) -> Result<Option<PredefinedPricing>, StoreError>;

    /// Owner's rates ordered by room type.
    async fn list(&self, owner_id: UserId) -> Result<Vec<PredefinedPricing>, StoreError>;

    async fn update(&self, entry: &PredefinedPricing) -> Result<(), StoreError>;

    async fn delete(&self, id: PricingId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait MaterialStore: Send + Sync {
    async fn insert(&self, material: &Material) -> Result<(), StoreError>;

    async fn get(&self, id: MaterialId) -> Result<Option<Material>, StoreError>;

    /// Owner's materials ordered by name.
    async fn list(&self, owner_id: UserId) -> Result<Vec<Material>, StoreError>;

    async fn update(&self, material: &Material) -> Result<(), StoreError>;

    async fn delete(&self, id: MaterialId) -> Result<(), StoreError>;
}
