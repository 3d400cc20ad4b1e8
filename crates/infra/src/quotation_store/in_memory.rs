use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use quotedesk_core::UserId;
use quotedesk_quotations::{
    DocumentKind, DocumentNumber, NewProgress, NewQuotation, ProgressRecord, Quotation,
    QuotationId, QuotationStatus,
};

use super::QuotationStore;
use crate::error::StoreError;

struct State<K: DocumentKind> {
    rows: HashMap<QuotationId, Quotation<K>>,
    /// Last issued sequence per year.
    counters: HashMap<i32, u32>,
    /// Oldest first.
    progress: HashMap<QuotationId, Vec<ProgressRecord>>,
}

impl<K: DocumentKind> State<K> {
    /// Next number of the year: one past the counter, and never behind the
    /// most recently created existing document.
    fn allocate(&self, year: i32) -> Result<DocumentNumber, StoreError> {
        let last = self
            .rows
            .values()
            .filter(|q| q.quotation_number.year() == year)
            .max_by_key(|q| (q.created_at, q.quotation_number))
            .map(|q| q.quotation_number.to_string());

        let floor = DocumentNumber::next_after(K::KIND, year, last.as_deref())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        match self.counters.get(&year) {
            Some(&issued) => {
                let from_counter = DocumentNumber::new(K::KIND, year, issued)
                    .and_then(|n| n.successor())
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?;
                Ok(floor.max(from_counter))
            }
            None => Ok(floor),
        }
    }
}

/// In-memory quotation store.
///
/// Intended for tests/dev. A single write lock serializes allocation and
/// insertion, which makes number allocation atomic.
pub struct InMemoryQuotationStore<K: DocumentKind> {
    state: RwLock<State<K>>,
}

impl<K: DocumentKind> InMemoryQuotationStore<K> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                rows: HashMap::new(),
                counters: HashMap::new(),
                progress: HashMap::new(),
            }),
        }
    }
}

impl<K: DocumentKind> Default for InMemoryQuotationStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: DocumentKind> QuotationStore<K> for InMemoryQuotationStore<K> {
    async fn insert(&self, new: NewQuotation<K>) -> Result<Quotation<K>, StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;

        let year = new.year();
        let number = state.allocate(year)?;

        if state.rows.values().any(|q| q.quotation_number == number) {
            // Burn the number so a retry moves past it.
            state.counters.insert(year, number.sequence());
            return Err(StoreError::DuplicateNumber(number.to_string()));
        }
        if state.rows.contains_key(&new.id) {
            return Err(StoreError::Duplicate(format!("quotation {} already exists", new.id)));
        }

        let seed = new.progress_seed.clone();
        let quotation = new.into_quotation(number);

        state.counters.insert(year, number.sequence());
        if let Some(seed) = seed {
            state
                .progress
                .entry(quotation.id)
                .or_default()
                .push(seed.into_record(quotation.id));
        }
        state.rows.insert(quotation.id, quotation.clone());

        Ok(quotation)
    }

    async fn get(&self, id: QuotationId) -> Result<Option<Quotation<K>>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::poisoned())?;
        Ok(state.rows.get(&id).cloned())
    }

    async fn list(
        &self,
        owner_id: UserId,
        status: Option<QuotationStatus>,
    ) -> Result<Vec<Quotation<K>>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::poisoned())?;
        let mut out: Vec<_> = state
            .rows
            .values()
            .filter(|q| q.owner_id == owner_id)
            .filter(|q| status.is_none_or(|s| q.status == s))
            .cloned()
            .collect();
        // UUIDv7 ids break ties between identical timestamps.
        out.sort_by(|a, b| {
            (b.created_at, b.id.0.as_uuid()).cmp(&(a.created_at, a.id.0.as_uuid()))
        });
        Ok(out)
    }

    async fn update(
        &self,
        next: &Quotation<K>,
        previous_version: u64,
        progress: Option<NewProgress>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;

        let current = state
            .rows
            .get(&next.id)
            .ok_or_else(|| StoreError::Concurrency(format!("quotation {} no longer exists", next.id)))?;
        if current.version != previous_version {
            return Err(StoreError::Concurrency(format!(
                "expected version {previous_version}, found {}",
                current.version
            )));
        }

        if let Some(entry) = progress {
            state
                .progress
                .entry(next.id)
                .or_default()
                .push(entry.into_record(next.id));
        }
        state.rows.insert(next.id, next.clone());
        Ok(())
    }

    async fn delete(&self, id: QuotationId, version: u64) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;

        match state.rows.get(&id) {
            Some(q) if q.version == version && !q.status.is_finalized() => {}
            Some(q) => {
                return Err(StoreError::Concurrency(format!(
                    "quotation {id} changed (version {}, status {})",
                    q.version, q.status
                )));
            }
            None => {
                return Err(StoreError::Concurrency(format!("quotation {id} no longer exists")));
            }
        }

        state.rows.remove(&id);
        state.progress.remove(&id);
        Ok(())
    }

    async fn append_progress(
        &self,
        id: QuotationId,
        entry: NewProgress,
    ) -> Result<ProgressRecord, StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;
        if !state.rows.contains_key(&id) {
            return Err(StoreError::Concurrency(format!("quotation {id} no longer exists")));
        }

        let record = entry.into_record(id);
        state.progress.entry(id).or_default().push(record.clone());
        Ok(record)
    }

    async fn progress_history(&self, id: QuotationId) -> Result<Vec<ProgressRecord>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::poisoned())?;
        let mut history = state.progress.get(&id).cloned().unwrap_or_default();
        history.reverse();
        Ok(history)
    }

    async fn latest_progress(
        &self,
        ids: &[QuotationId],
    ) -> Result<HashMap<QuotationId, ProgressRecord>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::poisoned())?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                state
                    .progress
                    .get(id)
                    .and_then(|h| h.last())
                    .map(|r| (*id, r.clone()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, Utc};
    use quotedesk_quotations::{
        CreateQuotation, Interior, InteriorItemDraft, Pop, PopItemDraft, ProgressStatus, RoomType,
    };

    fn new_interior(owner: UserId, status: Option<QuotationStatus>) -> NewQuotation<Interior> {
        CreateQuotation::<Interior> {
            status,
            ..CreateQuotation::new(
                owner,
                "Administrator",
                "Asha",
                vec![InteriorItemDraft::new(RoomType::Kitchen, 10.0, 8.0, 150.0)],
            )
        }
        .plan()
        .unwrap()
    }

    #[tokio::test]
    async fn numbers_are_sequential_per_year_and_never_reused() {
        let store = InMemoryQuotationStore::<Interior>::new();
        let owner = UserId::new();
        let year = Utc::now().year();

        let a = store.insert(new_interior(owner, None)).await.unwrap();
        let b = store.insert(new_interior(owner, None)).await.unwrap();
        assert_eq!(a.quotation_number.to_string(), format!("QT-{year}-0001"));
        assert_eq!(b.quotation_number.to_string(), format!("QT-{year}-0002"));

        store.delete(b.id, b.version).await.unwrap();
        let c = store.insert(new_interior(owner, None)).await.unwrap();
        assert_eq!(c.quotation_number.sequence(), 3);
    }

    #[tokio::test]
    async fn years_have_independent_sequences() {
        let store = InMemoryQuotationStore::<Interior>::new();
        let owner = UserId::new();

        let mut last_year = new_interior(owner, None);
        last_year.created_at = last_year.created_at - Duration::days(366);
        let old = store.insert(last_year).await.unwrap();
        let new = store.insert(new_interior(owner, None)).await.unwrap();

        assert_eq!(old.quotation_number.sequence(), 1);
        assert_eq!(new.quotation_number.sequence(), 1);
        assert_ne!(old.quotation_number.year(), new.quotation_number.year());
    }

    #[tokio::test]
    async fn finalized_insert_writes_seed_progress() {
        let store = InMemoryQuotationStore::<Interior>::new();
        let q = store
            .insert(new_interior(UserId::new(), Some(QuotationStatus::Finalized)))
            .await
            .unwrap();

        let history = store.progress_history(q.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ProgressStatus::NotStarted);
        assert_eq!(history[0].percentage, 0);
    }

    #[tokio::test]
    async fn list_is_owner_scoped_newest_first_and_filterable() {
        let store = InMemoryQuotationStore::<Interior>::new();
        let owner = UserId::new();

        let first = store.insert(new_interior(owner, None)).await.unwrap();
        let second = store
            .insert(new_interior(owner, Some(QuotationStatus::Finalized)))
            .await
            .unwrap();
        store.insert(new_interior(UserId::new(), None)).await.unwrap();

        let all = store.list(owner, None).await.unwrap();
        assert_eq!(all.iter().map(|q| q.id).collect::<Vec<_>>(), vec![second.id, first.id]);

        let drafts = store.list(owner, Some(QuotationStatus::Draft)).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, first.id);
    }

    #[tokio::test]
    async fn stale_update_is_rejected() {
        let store = InMemoryQuotationStore::<Interior>::new();
        let q = store.insert(new_interior(UserId::new(), None)).await.unwrap();

        let mut next = q.clone();
        next.version = 2;
        store.update(&next, 1, None).await.unwrap();

        let mut stale = q.clone();
        stale.version = 2;
        assert!(matches!(
            store.update(&stale, 1, None).await,
            Err(StoreError::Concurrency(_))
        ));
    }

    #[tokio::test]
    async fn delete_cascades_progress() {
        let store = InMemoryQuotationStore::<Interior>::new();
        let q = store.insert(new_interior(UserId::new(), None)).await.unwrap();
        store
            .append_progress(q.id, NewProgress::initial("x", Utc::now()))
            .await
            .unwrap();

        store.delete(q.id, q.version).await.unwrap();
        assert!(store.get(q.id).await.unwrap().is_none());
        assert!(store.progress_history(q.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn kinds_number_independently() {
        let interior = InMemoryQuotationStore::<Interior>::new();
        let pop = InMemoryQuotationStore::<Pop>::new();
        let owner = UserId::new();

        interior.insert(new_interior(owner, None)).await.unwrap();
        let p = pop
            .insert(
                CreateQuotation::<Pop>::new(
                    owner,
                    "a",
                    "Asha",
                    vec![PopItemDraft::by_quantity("Cornice", 1.0, 10.0)],
                )
                .plan()
                .unwrap(),
            )
            .await
            .unwrap();
        assert!(p.quotation_number.to_string().starts_with("POP-"));
        assert_eq!(p.quotation_number.sequence(), 1);
    }
}
