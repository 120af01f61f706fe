// Copyright 2023 Remi Bernotavicius

use super::{not_found, required};
use crate::error::Result;
use crate::model::{RecipeId, ScheduleId};
use crate::schedule::{Day, MealType, NewSchedule, WeeklySchedule};
use crate::server::extract::{ApiJson, ApiPath, ApiQuery};
use crate::server::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePayload {
    name: Option<String>,
    start_date: Option<chrono::NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPayload {
    day: Option<Day>,
    meal_type: Option<MealType>,
    recipe_id: Option<RecipeId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotQuery {
    day: Option<Day>,
    meal_type: Option<MealType>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<WeeklySchedule>>> {
    Ok(Json(state.with_store(|store| store.schedules()).await?))
}

pub async fn current(State(state): State<AppState>) -> Result<Json<WeeklySchedule>> {
    let schedule = state.with_store(|store| store.current_schedule()).await?;
    Ok(Json(schedule.ok_or_else(|| not_found("current schedule"))?))
}

pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ScheduleId>,
) -> Result<Json<WeeklySchedule>> {
    let schedule = state.with_store(move |store| store.schedule(id)).await?;
    Ok(Json(
        schedule.ok_or_else(|| not_found(format!("schedule {id}")))?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SchedulePayload>,
) -> Result<(StatusCode, Json<WeeklySchedule>)> {
    let new_schedule = NewSchedule::new(
        payload.name.as_deref().unwrap_or_default(),
        required("startDate", payload.start_date)?,
    )?;
    let schedule = state
        .with_store(move |store| store.create_schedule(&new_schedule))
        .await?;
    log::info!(
        "created schedule {} ({}) starting {}",
        schedule.id,
        schedule.name,
        schedule.start_date
    );
    Ok((StatusCode::CREATED, Json(schedule)))
}

pub async fn assign_meal(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ScheduleId>,
    ApiJson(payload): ApiJson<MealPayload>,
) -> Result<Json<WeeklySchedule>> {
    let day = required("day", payload.day)?;
    let meal_type = required("mealType", payload.meal_type)?;
    let recipe_id = required("recipeId", payload.recipe_id)?;
    let schedule = state
        .with_store(move |store| store.assign_meal_and_refresh(id, day, meal_type, recipe_id))
        .await?;
    log::debug!("schedule {id} has recipe {recipe_id} at {day} {meal_type}");
    Ok(Json(schedule))
}

pub async fn remove_meal(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ScheduleId>,
    ApiQuery(slot): ApiQuery<SlotQuery>,
) -> Result<Json<WeeklySchedule>> {
    let day = required("day", slot.day)?;
    let meal_type = required("mealType", slot.meal_type)?;
    let schedule = state
        .with_store(move |store| store.remove_meal_and_refresh(id, day, meal_type))
        .await?;
    log::debug!("schedule {id} has nothing at {day} {meal_type}");
    Ok(Json(schedule))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ScheduleId>,
) -> Result<StatusCode> {
    if !state.with_store(move |store| store.delete_schedule(id)).await? {
        return Err(not_found(format!("schedule {id}")));
    }
    log::info!("deleted schedule {id}");
    Ok(StatusCode::NO_CONTENT)
}
