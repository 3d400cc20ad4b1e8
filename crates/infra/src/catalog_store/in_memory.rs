use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use quotedesk_catalog::{Material, MaterialId, PredefinedPricing, PricingId};
use quotedesk_core::UserId;

use super::{MaterialStore, PricingStore};
use crate::error::StoreError;

/// In-memory predefined pricing store (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryPricingStore {
    rows: RwLock<HashMap<PricingId, PredefinedPricing>>,
}

impl InMemoryPricingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn room_taken(
    rows: &HashMap<PricingId, PredefinedPricing>,
    entry: &PredefinedPricing,
) -> Result<(), StoreError> {
    let clash = rows.values().any(|p| {
        p.id != entry.id && p.owner_id == entry.owner_id && p.room_type == entry.room_type
    });
    if clash {
        return Err(StoreError::Duplicate(format!(
            "pricing for room type {} already exists",
            entry.room_type.as_str()
        )));
    }
    Ok(())
}

#[async_trait]
impl PricingStore for InMemoryPricingStore {
    async fn insert(&self, entry: &PredefinedPricing) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;
        room_taken(&rows, entry)?;
        if rows.contains_key(&entry.id) {
            return Err(StoreError::Duplicate(format!("pricing {} already exists", entry.id)));
        }
        rows.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn get(&self, id: PricingId) -> Result<Option<PredefinedPricing>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        Ok(rows.get(&id).cloned())
    }

    async fn list(&self, owner_id: UserId) -> Result<Vec<PredefinedPricing>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        let mut out: Vec<_> = rows
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.room_type.as_str().cmp(b.room_type.as_str()));
        Ok(out)
    }

    async fn update(&self, entry: &PredefinedPricing) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;
        if !rows.contains_key(&entry.id) {
            return Err(StoreError::Concurrency(format!("pricing {} no longer exists", entry.id)));
        }
        room_taken(&rows, entry)?;
        rows.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn delete(&self, id: PricingId) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;
        rows.remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::Concurrency(format!("pricing {id} no longer exists")))
    }
}

/// In-memory material store (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryMaterialStore {
    rows: RwLock<HashMap<MaterialId, Material>>,
}

impl InMemoryMaterialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MaterialStore for InMemoryMaterialStore {
    async fn insert(&self, material: &Material) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;
        if rows.contains_key(&material.id) {
            return Err(StoreError::Duplicate(format!(
                "material {} already exists",
                material.id
            )));
        }
        rows.insert(material.id, material.clone());
        Ok(())
    }

    async fn get(&self, id: MaterialId) -> Result<Option<Material>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        Ok(rows.get(&id).cloned())
    }

    async fn list(&self, owner_id: UserId) -> Result<Vec<Material>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::poisoned())?;
        let mut out: Vec<_> = rows
            .values()
            .filter(|m| m.owner_id == owner_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(out)
    }

    async fn update(&self, material: &Material) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;
        match rows.get_mut(&material.id) {
            Some(row) => {
                *row = material.clone();
                Ok(())
            }
            None => Err(StoreError::Concurrency(format!(
                "material {} no longer exists",
                material.id
            ))),
        }
    }

    async fn delete(&self, id: MaterialId) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::poisoned())?;
        rows.remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::Concurrency(format!("material {id} no longer exists")))
    }
}
