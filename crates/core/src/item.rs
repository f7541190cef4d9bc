//! Item model, store-facing value types and request DTOs.
//!
//! - [`Item`] is the persisted record as handed out by a store.
//! - [`NewItem`], [`ItemPatch`] and [`ItemFilter`] are the inputs the
//!   service passes to an [`ItemStore`](crate::store::ItemStore).
//! - The `*Request` / `*Query` structs are the raw HTTP payloads. They carry
//!   the `validator` rules and convert into the store-facing types once
//!   validated.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::types::{ItemId, Timestamp};

/// Maximum length of `items.name`, matching the `VARCHAR(255)` column.
pub const MAX_NAME_LEN: usize = 255;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A stored item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Store inputs
// ---------------------------------------------------------------------------

/// Candidate record for [`ItemStore::insert`](crate::store::ItemStore::insert).
///
/// The store assigns `id`, `created_at` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
}

impl NewItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update of the mutable item fields. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ItemPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            name: None,
            description: Some(description.into()),
        }
    }

    /// Overlay this patch on `current`, producing a patch that names every
    /// mutable field explicitly.
    pub fn merged_over(self, current: &Item) -> ItemPatch {
        ItemPatch {
            name: Some(self.name.unwrap_or_else(|| current.name.clone())),
            description: self.description.or_else(|| current.description.clone()),
        }
    }
}

/// Listing constraints. Every `None` field means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Exact-match name filter.
    pub name: Option<String>,
    /// Maximum number of rows to return.
    pub limit: Option<u64>,
    /// Number of leading rows (newest first) to skip.
    pub offset: Option<u64>,
}

impl ItemFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn page(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self {
            name: None,
            limit,
            offset,
        }
    }
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Body of `POST /items`.
///
/// `name` is optional at the serde level so a missing field is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CreateItemRequest {
    /// Convert a validated request into a store candidate.
    pub fn into_new_item(self) -> NewItem {
        NewItem {
            // Presence is guaranteed by the `required` rule.
            name: self.name.unwrap_or_default(),
            description: self.description,
        }
    }
}

/// Body of `PUT /items/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateItemRequest {
    pub fn into_patch(self) -> ItemPatch {
        ItemPatch {
            name: self.name,
            description: self.description,
        }
    }
}

/// Query string of `GET /items`.
///
/// `limit` and `offset` arrive as raw strings so that non-numeric input
/// produces an itemized validation error for the right parameter.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListItemsQuery {
    pub name: Option<String>,
    #[validate(custom(function = "validate_limit"))]
    pub limit: Option<String>,
    #[validate(custom(function = "validate_offset"))]
    pub offset: Option<String>,
}

impl ListItemsQuery {
    /// Convert a validated query into a store filter.
    ///
    /// An empty `name` is treated as "no name constraint".
    pub fn into_filter(self) -> ItemFilter {
        ItemFilter {
            name: self.name.filter(|n| !n.is_empty()),
            limit: self.limit.as_deref().and_then(parse_count),
            offset: self.offset.as_deref().and_then(parse_count),
        }
    }
}

fn parse_count(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

fn validate_limit(value: &str) -> Result<(), ValidationError> {
    match parse_count(value) {
        Some(n) if n >= 1 => Ok(()),
        _ => Err(ValidationError::new("limit")
            .with_message(Cow::Borrowed("limit must be an integer >= 1"))),
    }
}

fn validate_offset(value: &str) -> Result<(), ValidationError> {
    match parse_count(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("offset")
            .with_message(Cow::Borrowed("offset must be an integer >= 0"))),
    }
}
