//! Main application entry point for Vitals.

use crate::api::{self, ApiState};
use crate::core::{Config, Result};
use crate::store::RumStore;
use std::sync::Arc;

/// Composition root: owns the store and the HTTP server lifecycle.
///
/// The store is an explicitly constructed instance handed to request
/// handlers through axum state, never a process-wide static — tests can run
/// as many independent stores as they like.
pub struct Application {
    store: Arc<RumStore>,
    config: Config,
}

impl Application {
    /// Create a new Application with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(RumStore::new(config.store.capacity, config.store.retention));
        Ok(Self { store, config })
    }

    /// Run the HTTP server until it exits.
    pub async fn run(self) -> Result<()> {
        tracing::info!(
            "Starting vitals application (capacity={}, retention={:?}, sampling={})",
            self.config.store.capacity,
            self.config.store.retention,
            self.config.sampling.rate,
        );

        if self.config.auth.admin_token.is_none() {
            tracing::warn!("No admin token configured; the summary endpoint will reject all requests");
        }

        let state = ApiState::new(Arc::clone(&self.store), &self.config);
        api::start_server(state, &self.config).await
    }

    /// Get a reference to the event store.
    pub fn store(&self) -> &Arc<RumStore> {
        &self.store
    }

    /// Get the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
