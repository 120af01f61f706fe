// Copyright 2023 Remi Bernotavicius

use super::not_found;
use crate::error::Result;
use crate::model::{Ingredient, IngredientId, NewIngredient};
use crate::server::extract::{ApiJson, ApiPath};
use crate::server::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct IngredientPayload {
    name: Option<String>,
    unit: Option<String>,
}

impl IngredientPayload {
    fn validate(self) -> Result<NewIngredient> {
        NewIngredient::new(
            self.name.as_deref().unwrap_or_default(),
            self.unit.as_deref().unwrap_or_default(),
        )
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Ingredient>>> {
    Ok(Json(state.with_store(|store| store.ingredients()).await?))
}

pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<IngredientId>,
) -> Result<Json<Ingredient>> {
    let ingredient = state.with_store(move |store| store.ingredient(id)).await?;
    Ok(Json(
        ingredient.ok_or_else(|| not_found(format!("ingredient {id}")))?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<IngredientPayload>,
) -> Result<(StatusCode, Json<Ingredient>)> {
    let new_ingredient = payload.validate()?;
    let ingredient = state
        .with_store(move |store| store.create_ingredient(&new_ingredient))
        .await?;
    log::info!("created ingredient {} ({})", ingredient.id, ingredient.name);
    Ok((StatusCode::CREATED, Json(ingredient)))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<IngredientId>,
    ApiJson(payload): ApiJson<IngredientPayload>,
) -> Result<Json<Ingredient>> {
    let edited = payload.validate()?;
    let ingredient = state
        .with_store(move |store| store.update_ingredient(id, &edited))
        .await?;
    Ok(Json(
        ingredient.ok_or_else(|| not_found(format!("ingredient {id}")))?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<IngredientId>,
) -> Result<StatusCode> {
    if !state.with_store(move |store| store.delete_ingredient(id)).await? {
        return Err(not_found(format!("ingredient {id}")));
    }
    log::info!("deleted ingredient {id}");
    Ok(StatusCode::NO_CONTENT)
}
