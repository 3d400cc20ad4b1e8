use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use quotedesk_catalog::{Material, MaterialId, PredefinedPricing, PricingId};
use quotedesk_core::{AggregateId, UserId};

use super::{MaterialStore, PricingStore};
use crate::error::StoreError;
use crate::postgres::{corrupt, map_sqlx_error, unique_violation};

const PRICING_ROOM_CONSTRAINT: &str = "predefined_pricing_owner_room_unique";

#[derive(Debug, Clone)]
pub struct PostgresPricingStore {
    pool: Arc<PgPool>,
}

impl PostgresPricingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

fn pricing_write_error(operation: &str, entry: &PredefinedPricing, err: sqlx::Error) -> StoreError {
    if unique_violation(&err).as_deref() == Some(PRICING_ROOM_CONSTRAINT) {
        return StoreError::Duplicate(format!(
            "pricing for room type {} already exists",
            entry.room_type.as_str()
        ));
    }
    map_sqlx_error(operation, err)
}

#[async_trait]
impl PricingStore for PostgresPricingStore {
    #[instrument(skip(self, entry), fields(pricing_id = %entry.id, owner_id = %entry.owner_id), err)]
    async fn insert(&self, entry: &PredefinedPricing) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO predefined_pricing (
                id, owner_id, room_type, price_per_sqft, description, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id.0.as_uuid())
        .bind(entry.owner_id.as_uuid())
        .bind(entry.room_type.as_str())
        .bind(entry.price_per_sqft)
        .bind(&entry.description)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| pricing_write_error("insert_pricing", entry, e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(pricing_id = %id), err)]
    async fn get(&self, id: PricingId) -> Result<Option<PredefinedPricing>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, room_type, price_per_sqft, description, created_at, updated_at
            FROM predefined_pricing
            WHERE id = $1
            "#,
        )
        .bind(id.0.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_pricing", e))?;

        row.as_ref().map(pricing_from_row).transpose()
    }

    #[instrument(skip(self), fields(owner_id = %owner_id), err)]
    async fn list(&self, owner_id: UserId) -> Result<Vec<PredefinedPricing>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, room_type, price_per_sqft, description, created_at, updated_at
            FROM predefined_pricing
            WHERE owner_id = $1
            ORDER BY room_type ASC
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_pricing", e))?;

        rows.iter().map(pricing_from_row).collect()
    }

    #[instrument(skip(self, entry), fields(pricing_id = %entry.id), err)]
    async fn update(&self, entry: &PredefinedPricing) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE predefined_pricing
            SET room_type = $2, price_per_sqft = $3, description = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(entry.id.0.as_uuid())
        .bind(entry.room_type.as_str())
        .bind(entry.price_per_sqft)
        .bind(&entry.description)
        .bind(entry.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| pricing_write_error("update_pricing", entry, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Concurrency(format!(
                "pricing {} no longer exists",
                entry.id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(pricing_id = %id), err)]
    async fn delete(&self, id: PricingId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM predefined_pricing WHERE id = $1")
            .bind(id.0.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_pricing", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Concurrency(format!("pricing {id} no longer exists")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PostgresMaterialStore {
    pool: Arc<PgPool>,
}

impl PostgresMaterialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait]
impl MaterialStore for PostgresMaterialStore {
    #[instrument(skip(self, material), fields(material_id = %material.id), err)]
    async fn insert(&self, material: &Material) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO materials (
                id, owner_id, name, description, price, unit, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(material.id.0.as_uuid())
        .bind(material.owner_id.as_uuid())
        .bind(&material.name)
        .bind(&material.description)
        .bind(material.price)
        .bind(&material.unit)
        .bind(material.created_at)
        .bind(material.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_material", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(material_id = %id), err)]
    async fn get(&self, id: MaterialId) -> Result<Option<Material>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, name, description, price, unit, created_at, updated_at
            FROM materials
            WHERE id = $1
            "#,
        )
        .bind(id.0.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_material", e))?;

        row.as_ref().map(material_from_row).transpose()
    }

    #[instrument(skip(self), fields(owner_id = %owner_id), err)]
    async fn list(&self, owner_id: UserId) -> Result<Vec<Material>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, name, description, price, unit, created_at, updated_at
            FROM materials
            WHERE owner_id = $1
            ORDER BY name ASC, created_at ASC
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_materials", e))?;

        rows.iter().map(material_from_row).collect()
    }

    #[instrument(skip(self, material), fields(material_id = %material.id), err)]
    async fn update(&self, material: &Material) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE materials
            SET name = $2, description = $3, price = $4, unit = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(material.id.0.as_uuid())
        .bind(&material.name)
        .bind(&material.description)
        .bind(material.price)
        .bind(&material.unit)
        .bind(material.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_material", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Concurrency(format!(
                "material {} no longer exists",
                material.id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(material_id = %id), err)]
    async fn delete(&self, id: MaterialId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id.0.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_material", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Concurrency(format!("material {id} no longer exists")));
        }
        Ok(())
    }
}

fn pricing_from_row(row: &PgRow) -> Result<PredefinedPricing, StoreError> {
    let room_type: String = row.try_get("room_type").map_err(corrupt("room_type"))?;
    Ok(PredefinedPricing {
        id: PricingId::new(AggregateId::from_uuid(
            row.try_get("id").map_err(corrupt("id"))?,
        )),
        owner_id: UserId::from_uuid(row.try_get("owner_id").map_err(corrupt("owner_id"))?),
        room_type: room_type
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("room_type '{room_type}': {e}")))?,
        price_per_sqft: row
            .try_get("price_per_sqft")
            .map_err(corrupt("price_per_sqft"))?,
        description: row.try_get("description").map_err(corrupt("description"))?,
        created_at: row.try_get("created_at").map_err(corrupt("created_at"))?,
        updated_at: row.try_get("updated_at").map_err(corrupt("updated_at"))?,
    })
}

fn material_from_row(row: &PgRow) -> Result<Material, StoreError> {
    Ok(Material {
        id: MaterialId::new(AggregateId::from_uuid(
            row.try_get("id").map_err(corrupt("id"))?,
        )),
        owner_id: UserId::from_uuid(row.try_get("owner_id").map_err(corrupt("owner_id"))?),
        name: row.try_get("name").map_err(corrupt("name"))?,
        description: row.try_get("description").map_err(corrupt("description"))?,
        price: row.try_get("price").map_err(corrupt("price"))?,
        unit: row.try_get("unit").map_err(corrupt("unit"))?,
        created_at: row.try_get("created_at").map_err(corrupt("created_at"))?,
        updated_at: row.try_get("updated_at").map_err(corrupt("updated_at"))?,
    })
}
