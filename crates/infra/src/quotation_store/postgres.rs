//! Postgres-backed quotation store.
//!
//! Both document kinds share the `quotations` table, keyed by `kind`. Items
//! are stored as a JSONB array on the parent row, so replacing them is part of
//! the same single-row write.
//!
//! ## Number allocation
//!
//! `insert` runs in one transaction:
//!
//! 1. Read the most recently created number of the (kind, year) prefix and
//!    derive the floor (`last + 1`, or 1). An unparseable last number is
//!    `Corrupt`.
//! 2. Upsert the `document_counters` row with
//!    `GREATEST(last_sequence + 1, floor)` and `RETURNING` it. The row lock is
//!    held until commit, so concurrent allocators for the same (kind, year)
//!    are serialized.
//! 3. Insert the document and its progress seed.
//!
//! A violation of `quotations_number_unique` rolls back, burns the number in
//! the counter (so it is never issued again) and returns `DuplicateNumber`.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{Span, instrument};
use uuid::Uuid;

use quotedesk_core::{AggregateId, UserId};
use quotedesk_quotations::{
    DocumentKind, DocumentNumber, NewProgress, NewQuotation, ProgressId, ProgressRecord,
    Quotation, QuotationId, QuotationStatus,
};

use super::QuotationStore;
use crate::error::StoreError;
use crate::postgres::{corrupt, map_sqlx_error, unique_violation};

const NUMBER_CONSTRAINT: &str = "quotations_number_unique";

#[derive(Debug)]
pub struct PostgresQuotationStore<K: DocumentKind> {
    pool: Arc<PgPool>,
    _kind: PhantomData<K>,
}

impl<K: DocumentKind> Clone for PostgresQuotationStore<K> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            _kind: PhantomData,
        }
    }
}

impl<K: DocumentKind> PostgresQuotationStore<K> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            _kind: PhantomData,
        }
    }

    async fn allocate(
        tx: &mut Transaction<'_, Postgres>,
        year: i32,
    ) -> Result<DocumentNumber, StoreError> {
        let kind = K::KIND;

        let last: Option<String> = sqlx::query_scalar(
            r#"
            SELECT quotation_number
            FROM quotations
            WHERE kind = $1 AND quotation_number LIKE $2
            ORDER BY created_at DESC, quotation_number DESC
            LIMIT 1
            "#,
        )
        .bind(kind.as_str())
        .bind(format!("{}%", DocumentNumber::year_prefix(kind, year)))
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("read_last_number", e))?;

        let floor = DocumentNumber::next_after(kind, year, last.as_deref())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let issued: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO document_counters (kind, year, last_sequence)
            VALUES ($1, $2, $3)
            ON CONFLICT (kind, year)
            DO UPDATE SET last_sequence =
                GREATEST(document_counters.last_sequence + 1, EXCLUDED.last_sequence)
            RETURNING last_sequence
            "#,
        )
        .bind(kind.as_str())
        .bind(year)
        .bind(i64::from(floor.sequence()))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("advance_counter", e))?;

        let sequence = u32::try_from(issued)
            .map_err(|_| StoreError::Corrupt(format!("counter out of range: {issued}")))?;
        DocumentNumber::new(kind, year, sequence).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    /// Record a number found taken so the counter moves past it.
    async fn burn(&self, number: DocumentNumber) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO document_counters (kind, year, last_sequence)
            VALUES ($1, $2, $3)
            ON CONFLICT (kind, year)
            DO UPDATE SET last_sequence =
                GREATEST(document_counters.last_sequence, EXCLUDED.last_sequence)
            "#,
        )
        .bind(number.kind().as_str())
        .bind(number.year())
        .bind(i64::from(number.sequence()))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("burn_number", e))?;
        Ok(())
    }
}

#[async_trait]
impl<K: DocumentKind> QuotationStore<K> for PostgresQuotationStore<K> {
    #[instrument(
        skip(self, new),
        fields(
            kind = %K::KIND,
            quotation_id = %new.id,
            owner_id = %new.owner_id,
            quotation_number = tracing::field::Empty
        ),
        err
    )]
    async fn insert(&self, new: NewQuotation<K>) -> Result<Quotation<K>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let number = Self::allocate(&mut tx, new.year()).await?;
        Span::current().record("quotation_number", tracing::field::display(&number));

        let seed = new.progress_seed.clone();
        let quotation = new.into_quotation(number);
        let items = serde_json::to_value(&quotation.items)
            .map_err(|e| StoreError::Backend(format!("failed to serialize items: {e}")))?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO quotations (
                id, kind, quotation_number, owner_id,
                client_name, client_phone, client_email, client_address, notes,
                status, total_amount, finalized_at, items, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(quotation.id.0.as_uuid())
        .bind(K::KIND.as_str())
        .bind(quotation.quotation_number.to_string())
        .bind(quotation.owner_id.as_uuid())
        .bind(&quotation.client_name)
        .bind(&quotation.client_phone)
        .bind(&quotation.client_email)
        .bind(&quotation.client_address)
        .bind(&quotation.notes)
        .bind(quotation.status.as_str())
        .bind(quotation.total_amount)
        .bind(quotation.finalized_at)
        .bind(&items)
        .bind(quotation.version as i64)
        .bind(quotation.created_at)
        .bind(quotation.updated_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if unique_violation(&e).as_deref() == Some(NUMBER_CONSTRAINT) {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                self.burn(number).await?;
                return Err(StoreError::DuplicateNumber(number.to_string()));
            }
            return Err(map_sqlx_error("insert_quotation", e));
        }

        if let Some(seed) = seed {
            insert_progress(&mut tx, seed.into_record(quotation.id)).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(quotation)
    }

    #[instrument(skip(self), fields(kind = %K::KIND, quotation_id = %id), err)]
    async fn get(&self, id: QuotationId) -> Result<Option<Quotation<K>>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {QUOTATION_COLUMNS} FROM quotations WHERE id = $1 AND kind = $2"
        ))
        .bind(id.0.as_uuid())
        .bind(K::KIND.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_quotation", e))?;

        row.map(|r| quotation_from_row::<K>(&r)).transpose()
    }

    #[instrument(
        skip(self),
        fields(kind = %K::KIND, owner_id = %owner_id, row_count = tracing::field::Empty),
        err
    )]
    async fn list(
        &self,
        owner_id: UserId,
        status: Option<QuotationStatus>,
    ) -> Result<Vec<Quotation<K>>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {QUOTATION_COLUMNS}
            FROM quotations
            WHERE kind = $1 AND owner_id = $2 AND ($3::TEXT IS NULL OR status = $3)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(K::KIND.as_str())
        .bind(owner_id.as_uuid())
        .bind(status.map(QuotationStatus::as_str))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_quotations", e))?;

        Span::current().record("row_count", rows.len());
        rows.iter().map(quotation_from_row::<K>).collect()
    }

    #[instrument(
        skip(self, next, progress),
        fields(kind = %K::KIND, quotation_id = %next.id, previous_version),
        err
    )]
    async fn update(
        &self,
        next: &Quotation<K>,
        previous_version: u64,
        progress: Option<NewProgress>,
    ) -> Result<(), StoreError> {
        let items = serde_json::to_value(&next.items)
            .map_err(|e| StoreError::Backend(format!("failed to serialize items: {e}")))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE quotations SET
                client_name = $3,
                client_phone = $4,
                client_email = $5,
                client_address = $6,
                notes = $7,
                status = $8,
                total_amount = $9,
                finalized_at = $10,
                items = $11,
                version = $12,
                updated_at = $13
            WHERE id = $1 AND kind = $14 AND version = $2
            "#,
        )
        .bind(next.id.0.as_uuid())
        .bind(previous_version as i64)
        .bind(&next.client_name)
        .bind(&next.client_phone)
        .bind(&next.client_email)
        .bind(&next.client_address)
        .bind(&next.notes)
        .bind(next.status.as_str())
        .bind(next.total_amount)
        .bind(next.finalized_at)
        .bind(&items)
        .bind(next.version as i64)
        .bind(next.updated_at)
        .bind(K::KIND.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_quotation", e))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::Concurrency(format!(
                "quotation {} is no longer at version {previous_version}",
                next.id
            )));
        }

        if let Some(entry) = progress {
            insert_progress(&mut tx, entry.into_record(next.id)).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(kind = %K::KIND, quotation_id = %id, version), err)]
    async fn delete(&self, id: QuotationId, version: u64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM quotations
            WHERE id = $1 AND kind = $2 AND version = $3 AND status = 'DRAFT'
            "#,
        )
        .bind(id.0.as_uuid())
        .bind(K::KIND.as_str())
        .bind(version as i64)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_quotation", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Concurrency(format!(
                "quotation {id} changed since it was read"
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, entry), fields(quotation_id = %id), err)]
    async fn append_progress(
        &self,
        id: QuotationId,
        entry: NewProgress,
    ) -> Result<ProgressRecord, StoreError> {
        let record = entry.into_record(id);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        insert_progress(&mut tx, record.clone()).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(record)
    }

    #[instrument(skip(self), fields(quotation_id = %id), err)]
    async fn progress_history(&self, id: QuotationId) -> Result<Vec<ProgressRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PROGRESS_COLUMNS}
            FROM quotation_progress
            WHERE quotation_id = $1
            ORDER BY created_at DESC, seq DESC
            "#
        ))
        .bind(id.0.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("progress_history", e))?;

        rows.iter().map(progress_from_row).collect()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn latest_progress(
        &self,
        ids: &[QuotationId],
    ) -> Result<HashMap<QuotationId, ProgressRecord>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.0.as_uuid()).collect();

        let rows = sqlx::query(&format!(
            r#"
            SELECT DISTINCT ON (quotation_id) {PROGRESS_COLUMNS}
            FROM quotation_progress
            WHERE quotation_id = ANY($1)
            ORDER BY quotation_id, created_at DESC, seq DESC
            "#
        ))
        .bind(&uuids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("latest_progress", e))?;

        rows.iter()
            .map(|r| progress_from_row(r).map(|p| (p.quotation_id, p)))
            .collect()
    }
}

const QUOTATION_COLUMNS: &str = "id, quotation_number, owner_id, client_name, client_phone, \
     client_email, client_address, notes, status, total_amount, finalized_at, items, version, \
     created_at, updated_at";

const PROGRESS_COLUMNS: &str =
    "id, quotation_id, status, percentage, updated_by, note, created_at";

async fn insert_progress(
    tx: &mut Transaction<'_, Postgres>,
    record: ProgressRecord,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO quotation_progress (
            id, quotation_id, status, percentage, updated_by, note, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(record.id.0.as_uuid())
    .bind(record.quotation_id.0.as_uuid())
    .bind(record.status.as_str())
    .bind(i16::from(record.percentage))
    .bind(&record.updated_by)
    .bind(&record.note)
    .bind(record.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_progress", e))?;
    Ok(())
}

fn quotation_from_row<K: DocumentKind>(row: &PgRow) -> Result<Quotation<K>, StoreError> {
    let number: String = row.try_get("quotation_number").map_err(corrupt("quotation_number"))?;
    let status: String = row.try_get("status").map_err(corrupt("status"))?;
    let items: serde_json::Value = row.try_get("items").map_err(corrupt("items"))?;
    let version: i64 = row.try_get("version").map_err(corrupt("version"))?;

    Ok(Quotation {
        id: QuotationId::new(AggregateId::from_uuid(row.try_get("id").map_err(corrupt("id"))?)),
        quotation_number: number
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("quotation_number '{number}': {e}")))?,
        owner_id: UserId::from_uuid(row.try_get("owner_id").map_err(corrupt("owner_id"))?),
        client_name: row.try_get("client_name").map_err(corrupt("client_name"))?,
        client_phone: row.try_get("client_phone").map_err(corrupt("client_phone"))?,
        client_email: row.try_get("client_email").map_err(corrupt("client_email"))?,
        client_address: row.try_get("client_address").map_err(corrupt("client_address"))?,
        notes: row.try_get("notes").map_err(corrupt("notes"))?,
        status: status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("status '{status}': {e}")))?,
        total_amount: row.try_get("total_amount").map_err(corrupt("total_amount"))?,
        finalized_at: row.try_get("finalized_at").map_err(corrupt("finalized_at"))?,
        items: serde_json::from_value(items)
            .map_err(|e| StoreError::Corrupt(format!("items: {e}")))?,
        created_at: row.try_get("created_at").map_err(corrupt("created_at"))?,
        updated_at: row.try_get("updated_at").map_err(corrupt("updated_at"))?,
        version: version as u64,
    })
}

fn progress_from_row(row: &PgRow) -> Result<ProgressRecord, StoreError> {
    let status: String = row.try_get("status").map_err(corrupt("status"))?;
    let percentage: i16 = row.try_get("percentage").map_err(corrupt("percentage"))?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(corrupt("created_at"))?;

    Ok(ProgressRecord {
        id: ProgressId::new(AggregateId::from_uuid(row.try_get("id").map_err(corrupt("id"))?)),
        quotation_id: QuotationId::new(AggregateId::from_uuid(
            row.try_get("quotation_id").map_err(corrupt("quotation_id"))?,
        )),
        status: status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("progress status '{status}': {e}")))?,
        percentage: u8::try_from(percentage)
            .map_err(|_| StoreError::Corrupt(format!("progress percentage {percentage}")))?,
        updated_by: row.try_get("updated_by").map_err(corrupt("updated_by"))?,
        note: row.try_get("note").map_err(corrupt("note"))?,
        created_at,
    })
}
