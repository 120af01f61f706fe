// Copyright 2023 Remi Bernotavicius

use super::{not_found, required};
use crate::error::Result;
use crate::model::{ScheduleId, ShoppingListItemId};
use crate::server::extract::{ApiJson, ApiPath};
use crate::server::state::AppState;
use crate::shopping_list::{self, GeneratedItem, ShoppingListItem};
use crate::store::Store;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct RegeneratePayload {
    /// Computed from the stored schedule when left out.
    items: Option<Vec<GeneratedItem>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckedPayload {
    is_checked: Option<bool>,
}

fn ensure_schedule(store: &mut dyn Store, id: ScheduleId) -> Result<()> {
    match store.schedule(id)? {
        Some(_) => Ok(()),
        None => Err(not_found(format!("schedule {id}"))),
    }
}

pub async fn list(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ScheduleId>,
) -> Result<Json<Vec<ShoppingListItem>>> {
    let items = state
        .with_store(move |store| {
            ensure_schedule(store, id)?;
            store.shopping_list(id)
        })
        .await?;
    Ok(Json(items))
}

pub async fn upsert_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ScheduleId>,
    ApiJson(item): ApiJson<GeneratedItem>,
) -> Result<Json<ShoppingListItem>> {
    let item = state
        .with_store(move |store| store.upsert_shopping_list_item(id, &item))
        .await?;
    Ok(Json(item))
}

pub async fn regenerate(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ScheduleId>,
    ApiJson(payload): ApiJson<RegeneratePayload>,
) -> Result<Json<Vec<ShoppingListItem>>> {
    let items = state
        .with_store(move |store| match payload.items {
            Some(items) => store.regenerate_shopping_list(id, &items),
            None => shopping_list::refresh(store, id),
        })
        .await?;
    log::info!(
        "regenerated shopping list for schedule {id} ({} items)",
        items.len()
    );
    Ok(Json(items))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ScheduleId>,
) -> Result<StatusCode> {
    state
        .with_store(move |store| {
            ensure_schedule(store, id)?;
            store.delete_shopping_list(id)
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_checked(
    State(state): State<AppState>,
    ApiPath(item_id): ApiPath<ShoppingListItemId>,
    ApiJson(payload): ApiJson<CheckedPayload>,
) -> Result<StatusCode> {
    let is_checked = required("isChecked", payload.is_checked)?;
    if !state
        .with_store(move |store| store.update_checked_status(item_id, is_checked))
        .await?
    {
        return Err(not_found(format!("shopping list item {item_id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}
