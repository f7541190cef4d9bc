//! Handlers for the `/items` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use shelf_core::error::CoreError;
use shelf_core::item::{CreateItemRequest, Item, ListItemsQuery, UpdateItemRequest};
use shelf_core::types::ItemId;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::validation::{ValidatedJson, ValidatedQuery};

fn not_found(id: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Item",
        id: id.to_string(),
    })
}

/// Ids that are not UUIDs cannot match any row, so they are reported as
/// missing rather than malformed.
fn parse_item_id(raw: &str) -> AppResult<ItemId> {
    ItemId::parse_str(raw).map_err(|_| not_found(raw))
}

/// POST /items
///
/// Create an item. Store failures are answered with 400 and details.
pub async fn create_item(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateItemRequest>,
) -> AppResult<impl IntoResponse> {
    let item = state
        .items
        .create(input.into_new_item())
        .await
        .map_err(AppError::CreateFailed)?;

    tracing::info!(item_id = %item.id, name = %item.name, "Item created");

    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /items?name=&limit=&offset=
///
/// List items newest first. Absent parameters are unconstrained.
pub async fn list_items(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListItemsQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let items = state.items.find_all(query.into_filter()).await?;
    Ok(Json(items))
}

/// GET /items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Item>> {
    let id = parse_item_id(&raw_id)?;
    let item = state
        .items
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(&raw_id))?;

    Ok(Json(item))
}

/// PUT /items/{id}
///
/// Partially update an item; omitted fields keep their value.
pub async fn update_item(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateItemRequest>,
) -> AppResult<Json<Item>> {
    let id = parse_item_id(&raw_id)?;
    let item = state
        .items
        .update(id, input.into_patch())
        .await?
        .ok_or_else(|| not_found(&raw_id))?;

    tracing::info!(item_id = %item.id, "Item updated");

    Ok(Json(item))
}

/// DELETE /items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_item_id(&raw_id)?;
    if !state.items.delete(id).await? {
        return Err(not_found(&raw_id));
    }

    tracing::info!(item_id = %id, "Item deleted");

    Ok(StatusCode::NO_CONTENT)
}
