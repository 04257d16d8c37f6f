//! Persisted keys, the versioned value envelope and change events.
//!
//! Values written under a [`StoreKey`] are wrapped in [`Versioned`] so a
//! reader can tell whether it understands what it finds. Anything written
//! by a newer schema is refused instead of half-decoded.

use core::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tenant::TenantToken;
use crate::types::ThemeId;

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 1;

/// Every key the application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreKey {
    StoreSettings,
    NavbarSettings,
    FooterSettings,
    SitePages,
    ThemeId,
    Wishlist,
    RecentlyViewed,
    StoreSettingsActiveTab,
    /// Visitor cart. Server-side only.
    Cart,
}

impl StoreKey {
    pub const ALL: [Self; 9] = [
        Self::StoreSettings,
        Self::NavbarSettings,
        Self::FooterSettings,
        Self::SitePages,
        Self::ThemeId,
        Self::Wishlist,
        Self::RecentlyViewed,
        Self::StoreSettingsActiveTab,
        Self::Cart,
    ];

    /// Wire name of the key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StoreSettings => "storeSettings",
            Self::NavbarSettings => "navbarSettings",
            Self::FooterSettings => "footerSettings",
            Self::SitePages => "sitePages",
            Self::ThemeId => "themeId",
            Self::Wishlist => "wishlist",
            Self::RecentlyViewed => "recentlyViewed",
            Self::StoreSettingsActiveTab => "storeSettingsActiveTab",
            Self::Cart => "cart",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{key}: unsupported version {found} (expected {expected})")]
    UnsupportedVersion {
        key: StoreKey,
        found: u32,
        expected: u32,
    },
    #[error("{key}: malformed value: {source}")]
    Malformed {
        key: StoreKey,
        #[source]
        source: serde_json::Error,
    },
}

/// A value tagged with the schema version that wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u32,
    pub data: T,
}

impl<T> Versioned<T> {
    /// Wrap a value at [`CURRENT_VERSION`].
    pub const fn new(data: T) -> Self {
        Self {
            version: CURRENT_VERSION,
            data,
        }
    }

    /// Unwrap, refusing any version other than [`CURRENT_VERSION`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsupportedVersion`].
    pub fn into_current(self, key: StoreKey) -> Result<T, StoreError> {
        if self.version == CURRENT_VERSION {
            Ok(self.data)
        } else {
            Err(StoreError::UnsupportedVersion {
                key,
                found: self.version,
                expected: CURRENT_VERSION,
            })
        }
    }
}

impl<T: DeserializeOwned> Versioned<T> {
    /// Decode an envelope from JSON and unwrap it.
    ///
    /// The version is checked before the payload, so a newer payload
    /// shape reports [`StoreError::UnsupportedVersion`] rather than a
    /// parse error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for bad JSON or an unknown version.
    pub fn decode(key: StoreKey, value: serde_json::Value) -> Result<T, StoreError> {
        #[derive(Deserialize)]
        struct Header {
            version: u32,
        }

        let header: Header = serde_json::from_value(value.clone())
            .map_err(|source| StoreError::Malformed { key, source })?;
        if header.version != CURRENT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                key,
                found: header.version,
                expected: CURRENT_VERSION,
            });
        }
        let envelope: Self = serde_json::from_value(value)
            .map_err(|source| StoreError::Malformed { key, source })?;
        envelope.into_current(key)
    }
}

/// A change other parts of the application may react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum StoreEvent {
    StoreSettingsUpdated { tenant: TenantToken },
    NavbarSettingsUpdated { tenant: TenantToken },
    FooterSettingsUpdated { tenant: TenantToken },
    PagesUpdated { tenant: TenantToken },
    ThemeChanged { tenant: TenantToken, theme: ThemeId },
    WishlistUpdated { tenant: TenantToken, count: usize },
}

impl StoreEvent {
    /// Tenant the event belongs to.
    #[must_use]
    pub const fn tenant(&self) -> &TenantToken {
        match self {
            Self::StoreSettingsUpdated { tenant }
            | Self::NavbarSettingsUpdated { tenant }
            | Self::FooterSettingsUpdated { tenant }
            | Self::PagesUpdated { tenant }
            | Self::ThemeChanged { tenant, .. }
            | Self::WishlistUpdated { tenant, .. } => tenant,
        }
    }

    /// Key whose cached value the event makes stale.
    #[must_use]
    pub const fn key(&self) -> StoreKey {
        match self {
            Self::StoreSettingsUpdated { .. } => StoreKey::StoreSettings,
            Self::NavbarSettingsUpdated { .. } => StoreKey::NavbarSettings,
            Self::FooterSettingsUpdated { .. } => StoreKey::FooterSettings,
            Self::PagesUpdated { .. } => StoreKey::SitePages,
            Self::ThemeChanged { .. } => StoreKey::ThemeId,
            Self::WishlistUpdated { .. } => StoreKey::Wishlist,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::SettingsTab;
    use serde_json::json;

    #[test]
    fn test_decode_current() {
        let tab: SettingsTab =
            Versioned::decode(StoreKey::StoreSettingsActiveTab, json!({"version": 1, "data": "seo"}))
                .unwrap();
        assert_eq!(tab, SettingsTab::Seo);
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let err = Versioned::<Vec<String>>::decode(
            StoreKey::Wishlist,
            json!({"version": 7, "data": {"totally": "different"}}),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedVersion {
                key: StoreKey::Wishlist,
                found: 7,
                expected: 1
            }
        ));
    }

    #[test]
    fn test_decode_malformed() {
        let err = Versioned::<Vec<String>>::decode(StoreKey::Wishlist, json!(["a"])).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));

        let err = Versioned::<Vec<String>>::decode(StoreKey::Wishlist, json!({"version": 1, "data": 5}))
            .unwrap_err();
        assert!(err.to_string().starts_with("wishlist: malformed value"));
    }

    #[test]
    fn test_wire_names_are_unique() {
        let mut names: Vec<_> = StoreKey::ALL.iter().map(StoreKey::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), StoreKey::ALL.len());
    }

    #[test]
    fn test_event_shape() {
        let event = StoreEvent::ThemeChanged {
            tenant: TenantToken::new("acme"),
            theme: ThemeId::from("t2"),
        };
        assert_eq!(event.tenant().as_str(), "acme");
        assert_eq!(event.key(), StoreKey::ThemeId);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "themeChanged");
        assert_eq!(json["theme"], "t2");
    }
}
