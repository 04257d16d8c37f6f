//! Application state shared across handlers.

use std::sync::Arc;

use nepostore_core::tenant::TenantResolver;

use crate::api::{ApiClient, ApiError};
use crate::config::ServerConfig;
use crate::store::SettingsStore;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    config: ServerConfig,
    api: ApiClient,
    settings: SettingsStore,
    resolver: TenantResolver,
}

impl AppState {
    /// Build the state from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the API client cannot be built.
    pub fn new(config: ServerConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        let settings = SettingsStore::new(config.settings_ttl);
        let resolver = config.resolver();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                settings,
                resolver,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Per-tenant settings cache and event bus.
    #[must_use]
    pub fn settings(&self) -> &SettingsStore {
        &self.inner.settings
    }

    #[must_use]
    pub fn resolver(&self) -> &TenantResolver {
        &self.inner.resolver
    }
}
