//! Item store capability.
//!
//! The service depends only on [`ItemStore`]; concrete backends are the
//! PostgreSQL store in `shelf-db` and [`MemoryItemStore`] for tests and
//! database-less runs.

mod memory;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::item::{Item, ItemFilter, ItemPatch, NewItem};
use crate::types::ItemId;

pub use memory::MemoryItemStore;

/// Row-level persistence for items.
///
/// Absence is never an error: lookups return `None` and deletes return
/// `false` when no row matches.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Persist a new item. The store assigns `id`, `created_at` and `updated_at`.
    async fn insert(&self, candidate: NewItem) -> StoreResult<Item>;

    /// Point lookup by id.
    async fn get_by_id(&self, id: ItemId) -> StoreResult<Option<Item>>;

    /// Items matching `filter`, newest `created_at` first.
    ///
    /// `name` is an exact match; `offset` skips leading rows of the ordered
    /// result and `limit` caps the count. Missing fields are unconstrained.
    async fn list(&self, filter: &ItemFilter) -> StoreResult<Vec<Item>>;

    /// Apply `changes` to an existing row and advance its `updated_at`.
    ///
    /// `None` fields in `changes` keep the stored value. Returns `None` when
    /// no row has the given id.
    async fn update_by_id(&self, id: ItemId, changes: &ItemPatch) -> StoreResult<Option<Item>>;

    /// Remove a row. Returns `true` only when exactly one row was removed.
    async fn delete_by_id(&self, id: ItemId) -> StoreResult<bool>;

    /// Cheap liveness probe used by the health endpoint.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Short backend label used in health output and logs.
    fn backend(&self) -> &'static str;
}
