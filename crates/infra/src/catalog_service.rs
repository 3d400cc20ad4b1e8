//! Owner-scoped catalog operations over the pricing and material stores.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use quotedesk_catalog::{
    Material, MaterialId, MaterialInput, PredefinedPricing, PriceList, PricingId, PricingInput,
    RateSuggestion,
};
use quotedesk_core::{Owned, UserId};
use quotedesk_quotations::RoomType;

use crate::catalog_store::{MaterialStore, PricingStore};
use crate::error::ServiceError;

#[derive(Clone)]
pub struct PricingService {
    store: Arc<dyn PricingStore>,
}

impl PricingService {
    pub fn new(store: Arc<dyn PricingStore>) -> Self {
        Self { store }
    }

    pub async fn price_list(&self, owner: UserId) -> Result<PriceList, ServiceError> {
        Ok(PriceList::new(self.store.list(owner).await?))
    }

    pub async fn create(
        &self,
        owner: UserId,
        input: &PricingInput,
    ) -> Result<PredefinedPricing, ServiceError> {
        let entry = PredefinedPricing::create(owner, input, Utc::now())?;
        self.store.insert(&entry).await?;
        info!(pricing_id = %entry.id, room_type = %entry.room_type, "predefined pricing created");
        Ok(entry)
    }

    pub async fn update(
        &self,
        owner: UserId,
        id: PricingId,
        input: &PricingInput,
    ) -> Result<PredefinedPricing, ServiceError> {
        let current = self.load(owner, id).await?;
        let next = current.replace(input, Utc::now())?;
        self.store.update(&next).await?;
        info!(pricing_id = %id, room_type = %next.room_type, "predefined pricing updated");
        Ok(next)
    }

    pub async fn delete(&self, owner: UserId, id: PricingId) -> Result<(), ServiceError> {
        self.load(owner, id).await?;
        self.store.delete(id).await?;
        info!(pricing_id = %id, "predefined pricing deleted");
        Ok(())
    }

    /// The owner's predefined rate for a room type, if any.
    pub async fn suggest(
        &self,
        owner: UserId,
        room_type: RoomType,
    ) -> Result<Option<RateSuggestion>, ServiceError> {
        Ok(self.price_list(owner).await?.suggest(room_type))
    }

    async fn load(&self, owner: UserId, id: PricingId) -> Result<PredefinedPricing, ServiceError> {
        let entry = self.store.get(id).await?.ok_or(ServiceError::NotFound)?;
        entry.ensure_visible_to(owner)?;
        Ok(entry)
    }
}

#[derive(Clone)]
pub struct MaterialService {
    store: Arc<dyn MaterialStore>,
}

impl MaterialService {
    pub fn new(store: Arc<dyn MaterialStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, owner: UserId) -> Result<Vec<Material>, ServiceError> {
        Ok(self.store.list(owner).await?)
    }

    pub async fn get(&self, owner: UserId, id: MaterialId) -> Result<Material, ServiceError> {
        let material = self.store.get(id).await?.ok_or(ServiceError::NotFound)?;
        material.ensure_visible_to(owner)?;
        Ok(material)
    }

    pub async fn create(
        &self,
        owner: UserId,
        input: &MaterialInput,
    ) -> Result<Material, ServiceError> {
        let material = Material::create(owner, input, Utc::now())?;
        self.store.insert(&material).await?;
        info!(material_id = %material.id, name = %material.name, "material created");
        Ok(material)
    }

    pub async fn update(
        &self,
        owner: UserId,
        id: MaterialId,
        input: &MaterialInput,
    ) -> Result<Material, ServiceError> {
        let next = self.get(owner, id).await?.replace(input, Utc::now())?;
        self.store.update(&next).await?;
        info!(material_id = %id, "material updated");
        Ok(next)
    }

    pub async fn delete(&self, owner: UserId, id: MaterialId) -> Result<(), ServiceError> {
        self.get(owner, id).await?;
        self.store.delete(id).await?;
        info!(material_id = %id, "material deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotedesk_quotations::PriceSource;

    use crate::catalog_store::{InMemoryMaterialStore, InMemoryPricingStore};

    fn pricing() -> PricingService {
        PricingService::new(Arc::new(InMemoryPricingStore::new()))
    }

    fn rate(room: &str, price: f64) -> PricingInput {
        PricingInput {
            room_type: Some(room.into()),
            price_per_sqft: Some(price),
            description: None,
        }
    }

    #[tokio::test]
    async fn duplicate_room_type_is_a_conflict() {
        let svc = pricing();
        let owner = UserId::new();
        svc.create(owner, &rate("kitchen", 150.0)).await.unwrap();
        assert!(matches!(
            svc.create(owner, &rate("kitchen", 160.0)).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn custom_room_type_cannot_be_priced() {
        assert!(matches!(
            pricing().create(UserId::new(), &rate("custom", 100.0)).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn foreign_entries_are_not_found() {
        let svc = pricing();
        let entry = svc.create(UserId::new(), &rate("loft", 90.0)).await.unwrap();
        let stranger = UserId::new();

        assert_eq!(
            svc.update(stranger, entry.id, &rate("loft", 95.0)).await,
            Err(ServiceError::NotFound)
        );
        assert_eq!(svc.delete(stranger, entry.id).await, Err(ServiceError::NotFound));
    }

    #[tokio::test]
    async fn suggestion_uses_the_owners_rate() {
        let svc = pricing();
        let owner = UserId::new();
        svc.create(owner, &rate("wardrobe", 120.0)).await.unwrap();

        let hit = svc.suggest(owner, RoomType::Wardrobe).await.unwrap().unwrap();
        assert_eq!(hit.price_per_sqft, 120.0);
        assert_eq!(hit.price_source, PriceSource::Predefined);
        assert!(svc.suggest(owner, RoomType::Kitchen).await.unwrap().is_none());
        assert!(svc.suggest(UserId::new(), RoomType::Wardrobe).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn material_update_replaces_fields() {
        let svc = MaterialService::new(Arc::new(InMemoryMaterialStore::new()));
        let owner = UserId::new();
        let input = MaterialInput {
            name: Some("Plywood".into()),
            description: Some("18mm BWR".into()),
            price: Some(95.0),
            unit: Some("sqft".into()),
        };
        let m = svc.create(owner, &input).await.unwrap();

        let updated = svc
            .update(
                owner,
                m.id,
                &MaterialInput {
                    price: Some(110.0),
                    description: None,
                    ..input
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, 110.0);
        assert_eq!(updated.description, None);
        assert_eq!(svc.get(owner, m.id).await.unwrap(), updated);
        assert_eq!(svc.get(UserId::new(), m.id).await, Err(ServiceError::NotFound));
    }
}
