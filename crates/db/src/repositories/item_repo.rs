//! Repository for the `items` table.

use sqlx::PgPool;
use shelf_core::item::{ItemFilter, ItemPatch, NewItem};
use shelf_core::types::ItemId;

use crate::models::item::ItemRow;

/// Column list for `items` queries.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Provides data access for items.
pub struct ItemRepo;

impl ItemRepo {
    /// Insert a new item, returning the stored row with server-assigned
    /// `id` and timestamps.
    pub async fn create(pool: &PgPool, input: &NewItem) -> Result<ItemRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO items (name, description) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ItemRow>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find an item by its ID.
    pub async fn find_by_id(pool: &PgPool, id: ItemId) -> Result<Option<ItemRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = $1");
        sqlx::query_as::<_, ItemRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List items newest first, optionally filtered by exact name.
    ///
    /// A NULL `LIMIT` is unbounded and a NULL `OFFSET` starts at the first
    /// row, so absent filter fields bind straight through.
    pub async fn list(pool: &PgPool, filter: &ItemFilter) -> Result<Vec<ItemRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM items \
             WHERE ($1::TEXT IS NULL OR name = $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2::BIGINT OFFSET $3::BIGINT"
        );
        sqlx::query_as::<_, ItemRow>(&query)
            .bind(filter.name.as_deref())
            .bind(filter.limit.map(to_bigint))
            .bind(filter.offset.map(to_bigint))
            .fetch_all(pool)
            .await
    }

    /// Partially update an item.
    ///
    /// Uses `COALESCE` so only provided fields are changed. `updated_at`
    /// always moves strictly forward, even under clock skew.
    pub async fn update(
        pool: &PgPool,
        id: ItemId,
        dto: &ItemPatch,
    ) -> Result<Option<ItemRow>, sqlx::Error> {
        let query = format!(
            "UPDATE items SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond') \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ItemRow>(&query)
            .bind(id)
            .bind(&dto.name)
            .bind(&dto.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete an item by ID.
    ///
    /// Returns `true` if exactly one row was deleted.
    pub async fn delete(pool: &PgPool, id: ItemId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

fn to_bigint(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
