// Copyright 2023 Remi Bernotavicius

use crate::server::state::AppState;
use crate::store::Backend;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    timestamp: DateTime<Utc>,
    environment: String,
    storage: Backend,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "OK",
        timestamp: Utc::now(),
        environment: state.environment().to_owned(),
        storage: state.backend(),
    })
}
