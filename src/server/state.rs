// Copyright 2023 Remi Bernotavicius

use crate::error::{Error, Result};
use crate::store::{Backend, Store};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    store: Mutex<Box<dyn Store>>,
    backend: Backend,
    environment: String,
}

impl AppState {
    pub fn new(store: Box<dyn Store>, environment: String) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend: store.backend(),
                store: Mutex::new(store),
                environment,
            }),
        }
    }

    pub fn backend(&self) -> Backend {
        self.inner.backend
    }

    pub fn environment(&self) -> &str {
        &self.inner.environment
    }

    /// Runs `f` on a blocking thread with the store locked. Only one request touches the store
    /// at a time.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Store) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut store = inner
                .store
                .lock()
                .map_err(|_| Error::Internal("store lock poisoned".into()))?;
            f(&mut **store)
        })
        .await?
    }
}
