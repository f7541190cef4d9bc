use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use tokio::sync::RwLock;

use crate::error::{PersistenceError, StoreResult};
use crate::item::{Item, ItemFilter, ItemPatch, NewItem, MAX_NAME_LEN};
use crate::store::ItemStore;
use crate::types::{ItemId, Timestamp};

/// In-process [`ItemStore`] backed by a vector in insertion order.
///
/// Mirrors the `items` table constraints (non-empty name of at most
/// [`MAX_NAME_LEN`] characters) and keeps timestamps at microsecond
/// precision like PostgreSQL `TIMESTAMPTZ`.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    rows: RwLock<Vec<Item>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6)
}

/// A timestamp no earlier than the clock and strictly after `previous`.
fn advance_from(previous: Timestamp) -> Timestamp {
    let now = now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}

fn check_name(name: &str) -> StoreResult<()> {
    let len = name.chars().count();
    if len == 0 {
        return Err(PersistenceError::Constraint(
            "items.name must not be empty".into(),
        ));
    }
    if len > MAX_NAME_LEN {
        return Err(PersistenceError::Constraint(format!(
            "items.name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn insert(&self, candidate: NewItem) -> StoreResult<Item> {
        check_name(&candidate.name)?;

        let mut rows = self.rows.write().await;
        let created_at = match rows.last() {
            Some(last) => advance_from(last.created_at),
            None => now(),
        };
        let item = Item {
            id: ItemId::now_v7(),
            name: candidate.name,
            description: candidate.description,
            created_at,
            updated_at: created_at,
        };
        rows.push(item.clone());
        Ok(item)
    }

    async fn get_by_id(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|item| item.id == id).cloned())
    }

    async fn list(&self, filter: &ItemFilter) -> StoreResult<Vec<Item>> {
        let rows = self.rows.read().await;

        // Newest insertion first, then a stable sort keeps that order on ties.
        let mut matching: Vec<&Item> = rows
            .iter()
            .rev()
            .filter(|item| filter.name.as_ref().map_or(true, |name| &item.name == name))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let offset = filter.offset.map_or(0, |o| o as usize);
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_by_id(&self, id: ItemId, changes: &ItemPatch) -> StoreResult<Option<Item>> {
        if let Some(name) = &changes.name {
            check_name(name)?;
        }

        let mut rows = self.rows.write().await;
        let Some(item) = rows.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            item.name = name.clone();
        }
        if let Some(description) = &changes.description {
            item.description = Some(description.clone());
        }
        item.updated_at = advance_from(item.updated_at);

        Ok(Some(item.clone()))
    }

    async fn delete_by_id(&self, id: ItemId) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|item| item.id != id);
        Ok(before - rows.len() == 1)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
