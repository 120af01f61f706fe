// Copyright 2023 Remi Bernotavicius

use super::routes::router;
use super::state::AppState;
use crate::store::LocalStore;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt as _;
use serde_json::{json, Value};
use tower::ServiceExt as _;

fn app() -> Router {
    router(AppState::new(
        Box::new(LocalStore::in_memory()),
        "test".into(),
    ))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, uri: &str, body: Value) -> Value {
    let (status, value) = send(app, Method::POST, uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    value
}

/// Flour and eggs, a pancake recipe using both, and an empty schedule.
async fn kitchen(app: &Router) -> (Value, Value, Value, Value) {
    let flour = create(app, "/api/ingredients", json!({"name": "Flour", "unit": "cups"})).await;
    let eggs = create(app, "/api/ingredients", json!({"name": "Eggs", "unit": "pieces"})).await;
    let pancakes = create(
        app,
        "/api/recipes",
        json!({
            "name": "Pancakes",
            "category": "Breakfast",
            "difficulty": "Easy",
            "servings": 4,
            "cookingTime": 20,
            "ingredients": [
                {"ingredientId": flour["id"], "quantity": 2},
                {"ingredientId": eggs["id"], "quantity": 3},
            ],
        }),
    )
    .await;
    let week = create(
        app,
        "/api/schedules",
        json!({"name": "Week 23", "startDate": "2024-06-03"}),
    )
    .await;
    (flour, eggs, pancakes, week)
}

#[tokio::test]
async fn health() {
    let (status, body) = send(&app(), Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["storage"], "local");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn ingredient_lifecycle() {
    let app = app();
    let salt = create(&app, "/api/ingredients", json!({"name": " Salt ", "unit": "tsp"})).await;
    assert_eq!(salt["name"], "Salt");
    let uri = format!("/api/ingredients/{}", salt["id"]);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, salt);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"name": "Sea salt", "unit": "g"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unit"], "g");

    let (status, body) = send(&app, Method::GET, "/api/ingredients", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/api/ingredients", Some(json!({"name": "Salt"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unit is required");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/ingredients")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/recipes/pancakes", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/recipes",
        Some(json!({"name": "Toast", "difficulty": "Easy", "servings": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "category is required");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/recipes",
        Some(json!({
            "name": "Toast",
            "category": "Breakfast",
            "difficulty": "Easy",
            "servings": 1,
            "ingredients": [{"ingredientId": 42, "quantity": 1}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let salt = create(&app, "/api/ingredients", json!({"name": "Salt", "unit": "g"})).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/recipes",
        Some(json!({
            "name": "Big",
            "category": "Lunch",
            "difficulty": "Easy",
            "servings": 1,
            "ingredients": [{"ingredientId": salt["id"], "quantity": 1e308}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        format!("quantity for ingredient {} must be positive and at most 1000000", salt["id"])
    );

    let (status, _) = send(&app, Method::GET, "/api/schedules/current", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn meals_keep_the_shopping_list_current() {
    let app = app();
    let (flour, _, pancakes, week) = kitchen(&app).await;
    let meals = format!("/api/schedules/{}/meals", week["id"]);
    let list = format!("/api/schedules/{}/shopping-list", week["id"]);

    let (status, schedule) = send(
        &app,
        Method::POST,
        &meals,
        Some(json!({"day": "Monday", "mealType": "Breakfast", "recipeId": pancakes["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedule["meals"][0]["recipe"]["name"], "Pancakes");

    let (status, items) = send(&app, Method::GET, &list, None).await;
    assert_eq!(status, StatusCode::OK);
    let items = items.as_array().unwrap().clone();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["ingredient"]["name"], "Eggs");
    assert_eq!(items[1]["totalQuantity"], 2.0);
    assert_eq!(items[1]["recipes"], json!(["Pancakes"]));

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/shopping-list/{}/checked", items[1]["id"]),
        Some(json!({"isChecked": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    send(
        &app,
        Method::POST,
        &meals,
        Some(json!({"day": "Friday", "mealType": "Snack 2", "recipeId": pancakes["id"]})),
    )
    .await;
    let (_, items) = send(&app, Method::GET, &list, None).await;
    assert_eq!(items[0]["ingredient"]["name"], "Eggs");
    assert_eq!(items[0]["totalQuantity"], 6.0);
    assert_eq!(items[1]["ingredient"]["id"], flour["id"]);
    assert_eq!(items[1]["totalQuantity"], 4.0);
    assert_eq!(items[1]["isChecked"], true);

    let (status, schedule) = send(
        &app,
        Method::DELETE,
        &format!("{meals}?day=Monday&mealType=Breakfast"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(schedule["meals"][0]["recipe"].is_null());
    let (_, items) = send(&app, Method::GET, &list, None).await;
    assert_eq!(items[1]["totalQuantity"], 2.0);

    let (status, _) = send(&app, Method::DELETE, &format!("{meals}?day=Monday"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/shopping-list/999/checked",
        Some(json!({"isChecked": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn regenerate_and_upsert() {
    let app = app();
    let (flour, eggs, pancakes, week) = kitchen(&app).await;
    let base = format!("/api/schedules/{}/shopping-list", week["id"]);

    let (status, items) = send(
        &app,
        Method::POST,
        &format!("{base}/regenerate"),
        Some(json!({
            "items": [
                {"ingredient": eggs, "totalQuantity": 12, "recipes": ["Shopping by hand"]},
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["totalQuantity"], 12.0);

    let (status, item) = send(
        &app,
        Method::PUT,
        &format!("{base}/items"),
        Some(json!({"ingredient": flour, "totalQuantity": 1.5, "recipes": []})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["isChecked"], false);
    let (_, items) = send(&app, Method::GET, &base, None).await;
    assert_eq!(items.as_array().unwrap().len(), 2);

    // Without items the list is rebuilt from the (still empty) schedule.
    let (status, items) = send(&app, Method::POST, &format!("{base}/regenerate"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items, json!([]));

    send(
        &app,
        Method::POST,
        &format!("/api/schedules/{}/meals", week["id"]),
        Some(json!({"day": "Sunday", "mealType": "Dinner", "recipeId": pancakes["id"]})),
    )
    .await;
    let (status, _) = send(&app, Method::DELETE, &base, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, items) = send(&app, Method::GET, &base, None).await;
    assert_eq!(items, json!([]));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/schedules/999/shopping-list/regenerate",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, "/api/schedules/999/shopping-list", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_recipe_empties_its_slots() {
    let app = app();
    let (_, _, pancakes, week) = kitchen(&app).await;
    send(
        &app,
        Method::POST,
        &format!("/api/schedules/{}/meals", week["id"]),
        Some(json!({"day": "Monday", "mealType": "Lunch", "recipeId": pancakes["id"]})),
    )
    .await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/recipes/{}", pancakes["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, current) = send(&app, Method::GET, "/api/schedules/current", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["id"], week["id"]);
    let meals = current["meals"].as_array().unwrap();
    assert_eq!(meals.len(), 35);
    assert!(meals.iter().all(|m| m["recipe"].is_null()));

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/schedules/{}", week["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, "/api/schedules", None).await;
    assert_eq!(status, StatusCode::OK);
}
