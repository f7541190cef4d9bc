use shelf_core::item::Item;
use shelf_core::types::{ItemId, Timestamp};
use sqlx::FromRow;

/// A row from the `items` table.
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
