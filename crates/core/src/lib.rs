//! Shelf domain layer.
//!
//! Holds the `Item` model, request validation rules, the [`store::ItemStore`]
//! capability trait and the [`service::ItemService`] that orchestrates it.
//! Nothing in here knows about HTTP or PostgreSQL.

pub mod error;
pub mod item;
pub mod service;
pub mod store;
pub mod types;
