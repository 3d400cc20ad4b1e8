//! Quotation persistence boundary.
//!
//! One store per document kind. Every write is atomic: the document, its items
//! and any progress record land together or not at all.

use std::collections::HashMap;

use async_trait::async_trait;

use quotedesk_core::UserId;
use quotedesk_quotations::{
    DocumentKind, NewProgress, NewQuotation, ProgressRecord, Quotation, QuotationId,
    QuotationStatus,
};

use crate::error::StoreError;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryQuotationStore;
pub use postgres::PostgresQuotationStore;

#[async_trait]
pub trait QuotationStore<K: DocumentKind>: Send + Sync {
    /// Allocate the next number of the document's (kind, year) sequence and
    /// insert it, together with its progress seed, in one transaction.
    ///
    /// Returns `DuplicateNumber` if the allocated number turned out to be taken.
    async fn insert(&self, new: NewQuotation<K>) -> Result<Quotation<K>, StoreError>;

    async fn get(&self, id: QuotationId) -> Result<Option<Quotation<K>>, StoreError>;

    /// Owner's documents, most recently created first.
    async fn list(
        &self,
        owner_id: UserId,
        status: Option<QuotationStatus>,
    ) -> Result<Vec<Quotation<K>>, StoreError>;

    /// Replace a document that is still at `previous_version`.
    async fn update(
        &self,
        next: &Quotation<K>,
        previous_version: u64,
        progress: Option<NewProgress>,
    ) -> Result<(), StoreError>;

    /// Delete a draft that is still at `version`, cascading to its progress.
    async fn delete(&self, id: QuotationId, version: u64) -> Result<(), StoreError>;

    async fn append_progress(
        &self,
        id: QuotationId,
        entry: NewProgress,
    ) -> Result<ProgressRecord, StoreError>;

    /// Progress history, most recent first.
    async fn progress_history(&self, id: QuotationId) -> Result<Vec<ProgressRecord>, StoreError>;

    /// Most recent progress record of each given document that has one.
    async fn latest_progress(
        &self,
        ids: &[QuotationId],
    ) -> Result<HashMap<QuotationId, ProgressRecord>, StoreError>;
}
