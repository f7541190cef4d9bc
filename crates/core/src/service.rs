//! Item use-case service.
//!
//! Stateless orchestration over an [`ItemStore`]. Every call is
//! request-scoped; the only state is the shared store handle.
//!
//! `update` reads the current record and then writes the merged fields in a
//! second store call. The two calls are not atomic, so concurrent updates of
//! the same id resolve as last-write-wins at the store.

use std::sync::Arc;

use crate::error::StoreResult;
use crate::item::{Item, ItemFilter, ItemPatch, NewItem};
use crate::store::ItemStore;
use crate::types::ItemId;

/// CRUD entry points for items.
#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Label of the backing store.
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Liveness of the backing store.
    pub async fn ping(&self) -> StoreResult<()> {
        self.store.ping().await
    }

    /// Persist a new item. Name presence is the caller's responsibility.
    pub async fn create(&self, data: NewItem) -> StoreResult<Item> {
        let item = self.store.insert(data).await?;
        tracing::debug!(item_id = %item.id, "Item inserted");
        Ok(item)
    }

    /// Items matching `filter`, newest first. No pagination defaults apply.
    pub async fn find_all(&self, filter: ItemFilter) -> StoreResult<Vec<Item>> {
        self.store.list(&filter).await
    }

    pub async fn find_by_id(&self, id: ItemId) -> StoreResult<Option<Item>> {
        self.store.get_by_id(id).await
    }

    /// Merge `patch` over the stored item and persist it.
    ///
    /// Returns `None` without writing anything when the id is unknown.
    pub async fn update(&self, id: ItemId, patch: ItemPatch) -> StoreResult<Option<Item>> {
        let Some(current) = self.store.get_by_id(id).await? else {
            tracing::debug!(item_id = %id, "Update skipped, item not found");
            return Ok(None);
        };

        let changes = patch.merged_over(&current);
        self.store.update_by_id(id, &changes).await
    }

    /// Returns `true` only if exactly one item was removed.
    pub async fn delete(&self, id: ItemId) -> StoreResult<bool> {
        self.store.delete_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;
    use crate::error::PersistenceError;
    use crate::store::MemoryItemStore;

    fn service() -> ItemService {
        ItemService::new(Arc::new(MemoryItemStore::new()))
    }

    fn names(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    /// Store whose every call fails, for propagation checks.
    struct BrokenStore;

    #[async_trait]
    impl ItemStore for BrokenStore {
        async fn insert(&self, _: NewItem) -> StoreResult<Item> {
            Err(PersistenceError::Unavailable("connection refused".into()))
        }
        async fn get_by_id(&self, _: ItemId) -> StoreResult<Option<Item>> {
            Err(PersistenceError::Unavailable("connection refused".into()))
        }
        async fn list(&self, _: &ItemFilter) -> StoreResult<Vec<Item>> {
            Err(PersistenceError::Unavailable("connection refused".into()))
        }
        async fn update_by_id(&self, _: ItemId, _: &ItemPatch) -> StoreResult<Option<Item>> {
            Err(PersistenceError::Unavailable("connection refused".into()))
        }
        async fn delete_by_id(&self, _: ItemId) -> StoreResult<bool> {
            Err(PersistenceError::Unavailable("connection refused".into()))
        }
        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    /// Wraps the memory store and counts write calls.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryItemStore,
        updates: AtomicUsize,
    }

    #[async_trait]
    impl ItemStore for CountingStore {
        async fn insert(&self, candidate: NewItem) -> StoreResult<Item> {
            self.inner.insert(candidate).await
        }
        async fn get_by_id(&self, id: ItemId) -> StoreResult<Option<Item>> {
            self.inner.get_by_id(id).await
        }
        async fn list(&self, filter: &ItemFilter) -> StoreResult<Vec<Item>> {
            self.inner.list(filter).await
        }
        async fn update_by_id(&self, id: ItemId, changes: &ItemPatch) -> StoreResult<Option<Item>> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            self.inner.update_by_id(id, changes).await
        }
        async fn delete_by_id(&self, id: ItemId) -> StoreResult<bool> {
            self.inner.delete_by_id(id).await
        }
        fn backend(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn create_then_find_by_id_returns_equal_item() {
        let svc = service();
        let created = svc
            .create(NewItem::new("Kettle").with_description("steel"))
            .await
            .unwrap();

        let found = svc.find_by_id(created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn unknown_ids_are_absent_not_errors() {
        let svc = service();
        svc.create(NewItem::new("present")).await.unwrap();
        let id = ItemId::new_v4();

        assert_matches!(svc.find_by_id(id).await, Ok(None));
        assert_matches!(svc.update(id, ItemPatch::name("x")).await, Ok(None));
        assert_matches!(svc.delete(id).await, Ok(false));
    }

    #[tokio::test]
    async fn update_of_unknown_id_does_not_write() {
        let store = Arc::new(CountingStore::default());
        let svc = ItemService::new(store.clone());

        let result = svc.update(ItemId::new_v4(), ItemPatch::name("x")).await;
        assert_matches!(result, Ok(None));
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);

        let item = svc.create(NewItem::new("real")).await.unwrap();
        svc.update(item.id, ItemPatch::name("renamed")).await.unwrap();
        assert_eq!(store.updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn delete_twice_yields_true_then_false() {
        let svc = service();
        let item = svc.create(NewItem::new("Mug")).await.unwrap();

        assert!(svc.delete(item.id).await.unwrap());
        assert!(!svc.delete(item.id).await.unwrap());
    }

    #[tokio::test]
    async fn update_name_keeps_description_and_advances_updated_at() {
        let svc = service();
        let item = svc
            .create(NewItem::new("Pen").with_description("blue ink"))
            .await
            .unwrap();

        let updated = svc
            .update(item.id, ItemPatch::name("X"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, item.id);
        assert_eq!(updated.name, "X");
        assert_eq!(updated.description.as_deref(), Some("blue ink"));
        assert_eq!(updated.created_at, item.created_at);
        assert!(updated.updated_at > item.updated_at);

        let again = svc
            .update(item.id, ItemPatch::description("red ink"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.name, "X");
        assert!(again.updated_at > updated.updated_at);
    }

    #[tokio::test]
    async fn find_all_filters_by_exact_name_newest_first() {
        let svc = service();
        let first_a = svc.create(NewItem::new("A")).await.unwrap();
        svc.create(NewItem::new("B")).await.unwrap();
        svc.create(NewItem::new("AA")).await.unwrap();
        let second_a = svc.create(NewItem::new("A")).await.unwrap();

        let found = svc.find_all(ItemFilter::by_name("A")).await.unwrap();
        let ids: Vec<_> = found.iter().map(|i| i.id).collect();
        assert_eq!(ids, [second_a.id, first_a.id]);
    }

    #[tokio::test]
    async fn find_all_limit_one_offset_one_returns_second_most_recent() {
        let svc = service();
        svc.create(NewItem::new("oldest")).await.unwrap();
        let middle = svc.create(NewItem::new("middle")).await.unwrap();
        svc.create(NewItem::new("newest")).await.unwrap();

        let page = svc
            .find_all(ItemFilter::page(Some(1), Some(1)))
            .await
            .unwrap();
        assert_eq!(page, [middle]);
    }

    #[tokio::test]
    async fn two_item_walkthrough() {
        let svc = service();
        let i1 = svc.create(NewItem::new("A")).await.unwrap();
        let i2 = svc.create(NewItem::new("B")).await.unwrap();

        let all = svc.find_all(ItemFilter::default()).await.unwrap();
        assert_eq!(names(&all), ["B", "A"]);

        let first = svc
            .find_all(ItemFilter::page(Some(1), None))
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, i2.id);

        let renamed = svc
            .update(i1.id, ItemPatch::name("A2"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "A2");
        assert!(renamed.description.is_none());

        assert!(svc.delete(i2.id).await.unwrap());
        assert!(svc.find_by_id(i2.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_failures_propagate_unchanged() {
        let svc = ItemService::new(Arc::new(BrokenStore));
        let id = ItemId::new_v4();

        assert_matches!(
            svc.create(NewItem::new("x")).await,
            Err(PersistenceError::Unavailable(_))
        );
        assert_matches!(
            svc.find_all(ItemFilter::default()).await,
            Err(PersistenceError::Unavailable(_))
        );
        assert_matches!(svc.find_by_id(id).await, Err(PersistenceError::Unavailable(_)));
        assert_matches!(
            svc.update(id, ItemPatch::default()).await,
            Err(PersistenceError::Unavailable(_))
        );
        assert_matches!(svc.delete(id).await, Err(PersistenceError::Unavailable(_)));
    }

    #[tokio::test]
    async fn concurrent_creates_are_all_stored() {
        let svc = service();
        let handles: Vec<_> = (0..16)
            .map(|n| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.create(NewItem::new(format!("item-{n}"))).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let all = svc.find_all(ItemFilter::default()).await.unwrap();
        assert_eq!(all.len(), 16);
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
