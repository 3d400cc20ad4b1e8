//! Quotation orchestration.
//!
//! ```text
//! Command
//!   ↓
//! 1. Validate + price (pure domain planning)
//!   ↓
//! 2. Resolve the status transition (finalized_at, progress seed)
//!   ↓
//! 3. Allocate the number and persist in one store transaction
//!   ↓
//! 4. On DuplicateNumber, retry from 3 (bounded)
//! ```
//!
//! The service holds no state besides its store; every rule lives in
//! `quotedesk-quotations`.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use quotedesk_core::{Owned, UserId};
use quotedesk_quotations::{
    CreateQuotation, DocumentKind, DocumentSnapshot, ProgressRecord, Quotation, QuotationId,
    QuotationStatus, RecordProgress, UpdateQuotation,
};

use crate::error::{ServiceError, StoreError};
use crate::quotation_store::QuotationStore;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// A list entry: the document and, for progress-tracking kinds, its most
/// recent progress record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct QuotationSummary<K: DocumentKind> {
    #[serde(flatten)]
    pub quotation: Quotation<K>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_progress: Option<ProgressRecord>,
}

/// A document with its full progress history, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct QuotationDetail<K: DocumentKind> {
    #[serde(flatten)]
    pub quotation: Quotation<K>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Vec<ProgressRecord>>,
}

pub struct QuotationService<K: DocumentKind> {
    store: Arc<dyn QuotationStore<K>>,
    max_attempts: u32,
}

impl<K: DocumentKind> Clone for QuotationService<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            max_attempts: self.max_attempts,
        }
    }
}

impl<K: DocumentKind> QuotationService<K> {
    pub fn new(store: Arc<dyn QuotationStore<K>>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn create(&self, cmd: CreateQuotation<K>) -> Result<Quotation<K>, ServiceError> {
        let new = cmd.plan()?;

        let mut attempt = 1;
        loop {
            match self.store.insert(new.clone()).await {
                Ok(quotation) => {
                    info!(
                        kind = %K::KIND,
                        quotation_id = %quotation.id,
                        quotation_number = %quotation.quotation_number,
                        status = %quotation.status,
                        "quotation created"
                    );
                    return Ok(quotation);
                }
                Err(StoreError::DuplicateNumber(number)) if attempt < self.max_attempts => {
                    warn!(
                        kind = %K::KIND,
                        %number,
                        attempt,
                        "document number already taken; retrying allocation"
                    );
                    attempt += 1;
                }
                Err(StoreError::DuplicateNumber(number)) => {
                    return Err(ServiceError::Conflict(format!(
                        "could not allocate a {} number after {attempt} attempts (last: {number})",
                        K::KIND
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Owner-scoped read: another owner's document is `NotFound`.
    pub async fn get(&self, owner: UserId, id: QuotationId) -> Result<Quotation<K>, ServiceError> {
        let quotation = self.load(id).await?;
        quotation.ensure_visible_to(owner)?;
        Ok(quotation)
    }

    /// The document plus its progress history when the kind tracks progress.
    pub async fn detail(
        &self,
        owner: UserId,
        id: QuotationId,
    ) -> Result<QuotationDetail<K>, ServiceError> {
        let quotation = self.get(owner, id).await?;
        let progress = if K::TRACKS_PROGRESS {
            Some(self.store.progress_history(id).await?)
        } else {
            None
        };
        Ok(QuotationDetail {
            quotation,
            progress,
        })
    }

    /// Owner's documents, most recent first, with each one's latest progress.
    pub async fn list(
        &self,
        owner: UserId,
        status: Option<QuotationStatus>,
    ) -> Result<Vec<QuotationSummary<K>>, ServiceError> {
        let quotations = self.store.list(owner, status).await?;

        let mut latest = if K::TRACKS_PROGRESS {
            let ids: Vec<_> = quotations.iter().map(|q| q.id).collect();
            self.store.latest_progress(&ids).await?
        } else {
            Default::default()
        };

        Ok(quotations
            .into_iter()
            .map(|quotation| QuotationSummary {
                latest_progress: latest.remove(&quotation.id),
                quotation,
            })
            .collect())
    }

    pub async fn update(
        &self,
        id: QuotationId,
        cmd: UpdateQuotation<K>,
    ) -> Result<Quotation<K>, ServiceError> {
        let current = self.load(id).await?;
        let planned = current.plan_update(&cmd)?;

        self.store
            .update(&planned.quotation, current.version, planned.progress_seed)
            .await?;

        if planned.quotation.status != current.status {
            info!(
                kind = %K::KIND,
                quotation_id = %id,
                quotation_number = %planned.quotation.quotation_number,
                "quotation finalized"
            );
        } else {
            info!(kind = %K::KIND, quotation_id = %id, version = planned.quotation.version, "quotation updated");
        }
        Ok(planned.quotation)
    }

    pub async fn delete(&self, actor: UserId, id: QuotationId) -> Result<(), ServiceError> {
        let current = self.load(id).await?;
        current.ensure_deletable_by(actor)?;
        self.store.delete(id, current.version).await?;

        info!(
            kind = %K::KIND,
            quotation_id = %id,
            quotation_number = %current.quotation_number,
            "quotation deleted"
        );
        Ok(())
    }

    pub async fn record_progress(
        &self,
        id: QuotationId,
        cmd: RecordProgress,
    ) -> Result<ProgressRecord, ServiceError> {
        let quotation = self.load(id).await?;
        let entry = cmd.plan(&quotation)?;
        let record = self.store.append_progress(id, entry).await?;

        info!(
            quotation_id = %id,
            status = %record.status,
            percentage = record.percentage,
            "progress recorded"
        );
        Ok(record)
    }

    pub async fn progress_history(
        &self,
        owner: UserId,
        id: QuotationId,
    ) -> Result<Vec<ProgressRecord>, ServiceError> {
        self.get(owner, id).await?;
        Ok(self.store.progress_history(id).await?)
    }

    pub async fn snapshot(
        &self,
        owner: UserId,
        id: QuotationId,
    ) -> Result<DocumentSnapshot, ServiceError> {
        let quotation = self.get(owner, id).await?;
        Ok(DocumentSnapshot::from(&quotation))
    }

    async fn load(&self, id: QuotationId) -> Result<Quotation<K>, ServiceError> {
        self.store.get(id).await?.ok_or(ServiceError::NotFound)
    }
}
