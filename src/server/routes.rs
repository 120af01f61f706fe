// Copyright 2023 Remi Bernotavicius

use super::handlers::{health, ingredients, recipes, schedules, shopping_list};
use super::state::AppState;
use axum::routing::{get, post, put};
use axum::Router;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route(
            "/api/ingredients",
            get(ingredients::list).post(ingredients::create),
        )
        .route(
            "/api/ingredients/:id",
            get(ingredients::show)
                .put(ingredients::update)
                .delete(ingredients::delete),
        )
        .route("/api/recipes", get(recipes::list).post(recipes::create))
        .route(
            "/api/recipes/:id",
            get(recipes::show)
                .put(recipes::update)
                .delete(recipes::delete),
        )
        .route(
            "/api/schedules",
            get(schedules::list).post(schedules::create),
        )
        .route("/api/schedules/current", get(schedules::current))
        .route(
            "/api/schedules/:id",
            get(schedules::show).delete(schedules::delete),
        )
        .route(
            "/api/schedules/:id/meals",
            post(schedules::assign_meal).delete(schedules::remove_meal),
        )
        .route(
            "/api/schedules/:id/shopping-list",
            get(shopping_list::list).delete(shopping_list::delete),
        )
        .route(
            "/api/schedules/:id/shopping-list/items",
            put(shopping_list::upsert_item),
        )
        .route(
            "/api/schedules/:id/shopping-list/regenerate",
            post(shopping_list::regenerate),
        )
        .route(
            "/api/shopping-list/:item_id/checked",
            put(shopping_list::set_checked),
        )
        .with_state(state)
}
