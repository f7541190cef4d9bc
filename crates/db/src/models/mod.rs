//! Database row structs.
//!
//! Rows are `FromRow` mirrors of their tables and convert into the plain
//! domain structs from `shelf_core`.

pub mod item;
