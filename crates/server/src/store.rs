//! Per-tenant store configuration cache and change notifications.
//!
//! Store settings, navbar and footer are read on almost every shop request,
//! so they are cached per tenant with a TTL (`moka`). Saving any of them
//! publishes a [`StoreEvent`]; publishing drops the stale cache entry and
//! broadcasts the event to subscribers.
//!
//! Delivery is at-most-once per subscriber. A subscriber that falls behind
//! the channel capacity skips the events it missed.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use nepostore_core::models::{FooterSettings, NavbarSettings, StoreSettings};
use nepostore_core::store::{StoreEvent, StoreKey};
use nepostore_core::tenant::TenantToken;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::api::{ApiError, ScopedApi};

/// Buffered events per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CacheKey {
    tenant: TenantToken,
    key: StoreKey,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Settings(Arc<StoreSettings>),
    Navbar(Arc<NavbarSettings>),
    Footer(Arc<FooterSettings>),
}

/// Cached, event-publishing view of each tenant's store configuration.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<SettingsStoreInner>,
}

struct SettingsStoreInner {
    cache: Cache<CacheKey, CacheValue>,
    events: broadcast::Sender<StoreEvent>,
}

impl SettingsStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(SettingsStoreInner { cache, events }),
        }
    }

    /// Store settings for the client's tenant.
    ///
    /// Requests without a tenant bypass the cache.
    ///
    /// # Errors
    ///
    /// Returns the API error on a cache miss that fails to load.
    #[instrument(skip(self, api), fields(tenant = ?api.tenant().map(TenantToken::as_str)))]
    pub async fn settings(&self, api: &ScopedApi) -> Result<Arc<StoreSettings>, ApiError> {
        let Some(key) = cache_key(api, StoreKey::StoreSettings) else {
            return api.store_settings().await.map(Arc::new);
        };
        if let Some(CacheValue::Settings(settings)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for store settings");
            return Ok(settings);
        }

        let settings = Arc::new(api.store_settings().await?);
        self.inner
            .cache
            .insert(key, CacheValue::Settings(Arc::clone(&settings)))
            .await;
        Ok(settings)
    }

    /// Navbar for the client's tenant.
    ///
    /// # Errors
    ///
    /// Returns the API error on a cache miss that fails to load.
    pub async fn navbar(&self, api: &ScopedApi) -> Result<Arc<NavbarSettings>, ApiError> {
        let Some(key) = cache_key(api, StoreKey::NavbarSettings) else {
            return api.navbar_settings().await.map(Arc::new);
        };
        if let Some(CacheValue::Navbar(navbar)) = self.inner.cache.get(&key).await {
            return Ok(navbar);
        }

        let navbar = Arc::new(api.navbar_settings().await?);
        self.inner
            .cache
            .insert(key, CacheValue::Navbar(Arc::clone(&navbar)))
            .await;
        Ok(navbar)
    }

    /// Footer for the client's tenant.
    ///
    /// # Errors
    ///
    /// Returns the API error on a cache miss that fails to load.
    pub async fn footer(&self, api: &ScopedApi) -> Result<Arc<FooterSettings>, ApiError> {
        let Some(key) = cache_key(api, StoreKey::FooterSettings) else {
            return api.footer_settings().await.map(Arc::new);
        };
        if let Some(CacheValue::Footer(footer)) = self.inner.cache.get(&key).await {
            return Ok(footer);
        }

        let footer = Arc::new(api.footer_settings().await?);
        self.inner
            .cache
            .insert(key, CacheValue::Footer(Arc::clone(&footer)))
            .await;
        Ok(footer)
    }

    /// Drop any cached value for `(tenant, key)`.
    pub async fn invalidate(&self, tenant: &TenantToken, key: StoreKey) {
        self.inner
            .cache
            .invalidate(&CacheKey {
                tenant: tenant.clone(),
                key,
            })
            .await;
    }

    /// Invalidate what the event makes stale, then broadcast it.
    ///
    /// Returns the number of subscribers the event reached.
    #[instrument(skip(self), fields(tenant = %event.tenant(), key = %event.key()))]
    pub async fn publish(&self, event: StoreEvent) -> usize {
        self.invalidate(event.tenant(), event.key()).await;
        // No receivers is not an error: nobody is listening yet.
        self.inner.events.send(event).unwrap_or(0)
    }

    /// Receive events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    /// Log every published event until the store is dropped.
    pub fn spawn_event_log(&self) -> JoinHandle<()> {
        let mut events = self.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => debug!(tenant = %event.tenant(), ?event, "Store event"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Store event log lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("entries", &self.inner.cache.entry_count())
            .field("subscribers", &self.inner.events.receiver_count())
            .finish()
    }
}

fn cache_key(api: &ScopedApi, key: StoreKey) -> Option<CacheKey> {
    api.tenant().map(|tenant| CacheKey {
        tenant: tenant.clone(),
        key,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ServerConfig;
    use nepostore_core::types::ThemeId;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_publish_drops_cached_settings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/store-settings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"storeName": "Acme Goods", "currency": "NPR"}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let url = url::Url::parse(&server.uri()).unwrap();
        let client = ApiClient::new(&ServerConfig::for_api(url)).unwrap();
        let tenant = TenantToken::new("acme");
        let api = client.scoped(Some(&tenant), None);
        let store = SettingsStore::new(Duration::from_secs(60));

        let first = store.settings(&api).await.unwrap();
        let cached = store.settings(&api).await.unwrap();
        assert!(Arc::ptr_eq(&first, &cached));

        store
            .publish(StoreEvent::StoreSettingsUpdated {
                tenant: tenant.clone(),
            })
            .await;
        let reloaded = store.settings(&api).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(reloaded.store_name, "Acme Goods");
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let store = SettingsStore::new(Duration::from_secs(60));
        let mut first = store.subscribe();
        let mut second = store.subscribe();

        let event = StoreEvent::ThemeChanged {
            tenant: TenantToken::new("acme"),
            theme: ThemeId::from("t1"),
        };
        assert_eq!(store.publish(event.clone()).await, 2);
        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let store = SettingsStore::new(Duration::from_secs(60));
        let delivered = store
            .publish(StoreEvent::PagesUpdated {
                tenant: TenantToken::new("acme"),
            })
            .await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips() {
        let store = SettingsStore::new(Duration::from_secs(60));
        let mut slow = store.subscribe();
        for _ in 0..EVENT_CAPACITY + 5 {
            store
                .publish(StoreEvent::WishlistUpdated {
                    tenant: TenantToken::new("acme"),
                    count: 1,
                })
                .await;
        }
        assert!(matches!(
            slow.recv().await,
            Err(broadcast::error::RecvError::Lagged(5))
        ));
        assert!(slow.recv().await.is_ok());
    }
}
