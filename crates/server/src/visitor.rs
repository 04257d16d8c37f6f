//! Per-visitor state kept in the session.
//!
//! Each value is stored under its [`StoreKey`] name inside a [`Versioned`]
//! envelope. A value written by an unknown schema version is dropped and
//! the visitor starts fresh.

use nepostore_core::models::{Product, SettingsTab};
use nepostore_core::store::{StoreEvent, StoreKey, Versioned};
use nepostore_core::tenant::TenantToken;
use nepostore_core::types::ProductId;
use nepostore_core::visitor::{Cart, RecentlyViewed, Wishlist};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower_sessions::Session;
use tracing::warn;

use crate::error::AppError;
use crate::store::SettingsStore;

async fn load<T: DeserializeOwned + Default>(
    session: &Session,
    key: StoreKey,
) -> Result<T, AppError> {
    let Some(value) = session.get::<serde_json::Value>(key.as_str()).await? else {
        return Ok(T::default());
    };
    match Versioned::decode(key, value) {
        Ok(data) => Ok(data),
        Err(err) => {
            warn!(error = %err, "Discarding stored visitor value");
            session.remove_value(key.as_str()).await?;
            Ok(T::default())
        }
    }
}

async fn save<T: Serialize>(session: &Session, key: StoreKey, value: &T) -> Result<(), AppError> {
    session.insert(key.as_str(), Versioned::new(value)).await?;
    Ok(())
}

pub async fn cart(session: &Session) -> Result<Cart, AppError> {
    load(session, StoreKey::Cart).await
}

pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), AppError> {
    save(session, StoreKey::Cart, cart).await
}

pub async fn wishlist(session: &Session) -> Result<Wishlist, AppError> {
    load(session, StoreKey::Wishlist).await
}

/// Toggle a product in the wishlist and announce the new size.
///
/// Returns `true` when the product is now in the wishlist.
pub async fn toggle_wishlist(
    session: &Session,
    store: &SettingsStore,
    tenant: &TenantToken,
    product_id: &ProductId,
) -> Result<bool, AppError> {
    let mut wishlist = wishlist(session).await?;
    let added = wishlist.toggle(product_id);
    save(session, StoreKey::Wishlist, &wishlist).await?;
    store
        .publish(StoreEvent::WishlistUpdated {
            tenant: tenant.clone(),
            count: wishlist.len(),
        })
        .await;
    Ok(added)
}

/// Remove a product from the wishlist if present.
///
/// Returns `true` when something was removed.
pub async fn remove_from_wishlist(
    session: &Session,
    store: &SettingsStore,
    tenant: &TenantToken,
    product_id: &ProductId,
) -> Result<bool, AppError> {
    let mut wishlist = wishlist(session).await?;
    if !wishlist.remove(product_id) {
        return Ok(false);
    }
    save(session, StoreKey::Wishlist, &wishlist).await?;
    store
        .publish(StoreEvent::WishlistUpdated {
            tenant: tenant.clone(),
            count: wishlist.len(),
        })
        .await;
    Ok(true)
}

pub async fn recently_viewed(session: &Session) -> Result<RecentlyViewed, AppError> {
    load(session, StoreKey::RecentlyViewed).await
}

/// Put a product at the front of the recently-viewed list.
pub async fn record_view(session: &Session, product: &Product) -> Result<RecentlyViewed, AppError> {
    let mut viewed = recently_viewed(session).await?;
    viewed.record(&product.id);
    save(session, StoreKey::RecentlyViewed, &viewed).await?;
    Ok(viewed)
}

/// Last settings tab the visitor opened.
pub async fn settings_tab(session: &Session) -> Result<SettingsTab, AppError> {
    load(session, StoreKey::StoreSettingsActiveTab).await
}

pub async fn save_settings_tab(session: &Session, tab: SettingsTab) -> Result<(), AppError> {
    save(session, StoreKey::StoreSettingsActiveTab, &tab).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use serde_json::json;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn product(id: &str) -> Product {
        serde_json::from_value(json!({
            "_id": id,
            "name": "Momo Plate",
            "sellingPrice": "250",
            "quantity": 10
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_cart_round_trips_through_session() {
        let session = session();
        let mut cart = cart(&session).await.unwrap();
        assert!(cart.is_empty());

        cart.add(&product("p1"), 2);
        save_cart(&session, &cart).await.unwrap();

        let stored = super::cart(&session).await.unwrap();
        assert_eq!(stored.item_count(), 2);
        assert_eq!(stored.subtotal(), Ok(Decimal::new(500, 0)));
    }

    #[tokio::test]
    async fn test_values_are_versioned() {
        let session = session();
        save_settings_tab(&session, SettingsTab::Seo).await.unwrap();
        let raw: serde_json::Value = session
            .get(StoreKey::StoreSettingsActiveTab.as_str())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw, json!({"version": 1, "data": "seo"}));
    }

    #[tokio::test]
    async fn test_unknown_version_is_discarded() {
        let session = session();
        session
            .insert(
                StoreKey::Wishlist.as_str(),
                json!({"version": 99, "data": {"ids": ["p1"]}}),
            )
            .await
            .unwrap();

        let wishlist = wishlist(&session).await.unwrap();
        assert!(wishlist.is_empty());
        assert!(
            session
                .get::<serde_json::Value>(StoreKey::Wishlist.as_str())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_toggle_wishlist_publishes() {
        let session = session();
        let store = SettingsStore::new(std::time::Duration::from_secs(60));
        let mut events = store.subscribe();
        let tenant = TenantToken::new("acme");

        assert!(toggle_wishlist(&session, &store, &tenant, &ProductId::from("p1")).await.unwrap());
        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent::WishlistUpdated {
                tenant: tenant.clone(),
                count: 1
            }
        );
        assert!(!toggle_wishlist(&session, &store, &tenant, &ProductId::from("p1")).await.unwrap());
        assert!(!wishlist(&session).await.unwrap().contains(&ProductId::from("p1")));
    }

    #[tokio::test]
    async fn test_remove_from_wishlist_only_when_present() {
        let session = session();
        let store = SettingsStore::new(std::time::Duration::from_secs(60));
        let tenant = TenantToken::new("acme");
        let id = ProductId::from("p1");

        assert!(!remove_from_wishlist(&session, &store, &tenant, &id).await.unwrap());
        toggle_wishlist(&session, &store, &tenant, &id).await.unwrap();
        assert!(remove_from_wishlist(&session, &store, &tenant, &id).await.unwrap());
        assert!(wishlist(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_view_keeps_most_recent_first() {
        let session = session();
        record_view(&session, &product("p1")).await.unwrap();
        record_view(&session, &product("p2")).await.unwrap();
        let viewed = record_view(&session, &product("p1")).await.unwrap();
        assert_eq!(
            viewed.ids(),
            &[ProductId::from("p1"), ProductId::from("p2")]
        );
    }
}
