// Copyright 2023 Remi Bernotavicius

use super::{not_found, required};
use crate::error::Result;
use crate::model::{Difficulty, NewRecipe, NewRecipeIngredient, Recipe, RecipeCategory, RecipeId};
use crate::server::extract::{ApiJson, ApiPath};
use crate::server::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePayload {
    name: Option<String>,
    category: Option<RecipeCategory>,
    difficulty: Option<Difficulty>,
    servings: Option<i32>,
    cooking_time: Option<i32>,
    instructions: Option<String>,
    #[serde(default)]
    ingredients: Vec<NewRecipeIngredient>,
}

impl RecipePayload {
    fn validate(self) -> Result<NewRecipe> {
        NewRecipe {
            name: required("name", self.name)?,
            category: required("category", self.category)?,
            difficulty: required("difficulty", self.difficulty)?,
            servings: required("servings", self.servings)?,
            cooking_time: self.cooking_time,
            instructions: self.instructions,
            ingredients: self.ingredients,
        }
        .validate()
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>> {
    Ok(Json(state.with_store(|store| store.recipes()).await?))
}

pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RecipeId>,
) -> Result<Json<Recipe>> {
    let recipe = state.with_store(move |store| store.recipe(id)).await?;
    Ok(Json(recipe.ok_or_else(|| not_found(format!("recipe {id}")))?))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RecipePayload>,
) -> Result<(StatusCode, Json<Recipe>)> {
    let new_recipe = payload.validate()?;
    let recipe = state
        .with_store(move |store| store.create_recipe(&new_recipe))
        .await?;
    log::info!("created recipe {} ({})", recipe.id, recipe.name);
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RecipeId>,
    ApiJson(payload): ApiJson<RecipePayload>,
) -> Result<Json<Recipe>> {
    let edited = payload.validate()?;
    let recipe = state
        .with_store(move |store| store.update_recipe(id, &edited))
        .await?;
    Ok(Json(recipe.ok_or_else(|| not_found(format!("recipe {id}")))?))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RecipeId>,
) -> Result<StatusCode> {
    if !state.with_store(move |store| store.delete_recipe(id)).await? {
        return Err(not_found(format!("recipe {id}")));
    }
    log::info!("deleted recipe {id}");
    Ok(StatusCode::NO_CONTENT)
}
