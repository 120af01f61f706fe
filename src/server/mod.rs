// Copyright 2023 Remi Bernotavicius

use crate::error::{Error, Result};
use crate::settings::ServerSettings;
use crate::store::Store;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

mod extract;
mod handlers;
mod routes;
mod state;

use state::AppState;

fn cors(allowed_origin: Option<&str>) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Ok(match allowed_origin {
        Some(origin) => {
            let origin = origin.parse::<HeaderValue>().map_err(|error| {
                Error::Validation(format!("invalid allowed origin {origin:?}: {error}"))
            })?;
            cors.allow_origin(origin)
        }
        None => cors.allow_origin(Any),
    })
}

pub async fn serve(store: Box<dyn Store>, settings: &ServerSettings) -> Result<()> {
    let state = AppState::new(store, settings.environment.clone());
    let app = routes::router(state).layer(cors(settings.allowed_origin.as_deref())?);

    let address = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = TcpListener::bind(address).await?;
    log::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            log::error!("failed to listen for ctrl-c: {error}");
            std::future::pending::<()>().await;
        }
        log::info!("received ctrl-c, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                log::info!("received terminate signal, shutting down");
            }
            Err(error) => {
                log::error!("failed to listen for terminate signal: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests;
