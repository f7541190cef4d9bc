//! [`ItemStore`] over PostgreSQL.

use async_trait::async_trait;
use shelf_core::error::{PersistenceError, StoreResult};
use shelf_core::item::{Item, ItemFilter, ItemPatch, NewItem};
use shelf_core::store::ItemStore;
use shelf_core::types::ItemId;

use crate::repositories::ItemRepo;
use crate::DbPool;

/// Item store backed by the `items` table.
#[derive(Debug, Clone)]
pub struct PgItemStore {
    pool: DbPool,
}

impl PgItemStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn insert(&self, candidate: NewItem) -> StoreResult<Item> {
        let row = ItemRepo::create(&self.pool, &candidate)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.into())
    }

    async fn get_by_id(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let row = ItemRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(Item::from))
    }

    async fn list(&self, filter: &ItemFilter) -> StoreResult<Vec<Item>> {
        let rows = ItemRepo::list(&self.pool, filter)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn update_by_id(&self, id: ItemId, changes: &ItemPatch) -> StoreResult<Option<Item>> {
        let row = ItemRepo::update(&self.pool, id, changes)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(Item::from))
    }

    async fn delete_by_id(&self, id: ItemId) -> StoreResult<bool> {
        ItemRepo::delete(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool)
            .await
            .map_err(classify_sqlx_error)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// Classify a sqlx error into a [`PersistenceError`].
///
/// - SQLSTATE class `23` (integrity constraints) and `22001` (value too long
///   for the column) map to `Constraint`.
/// - Pool exhaustion and transport failures map to `Unavailable`.
/// - Everything else maps to `Backend`.
pub fn classify_sqlx_error(err: sqlx::Error) -> PersistenceError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            match code.as_deref() {
                Some(c) if c.starts_with("23") || c == "22001" => {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    PersistenceError::Constraint(format!("{} ({constraint})", db_err.message()))
                }
                _ => PersistenceError::Backend(db_err.message().to_string()),
            }
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => PersistenceError::Unavailable(err.to_string()),
        _ => PersistenceError::Backend(err.to_string()),
    }
}
