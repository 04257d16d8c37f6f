//! Tenants as seen by the super-admin console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::{Listable, SortKey, any_contains};
use crate::types::{TenantId, TenantStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: TenantId,
    pub name: String,
    pub subdomain: String,
    #[serde(default)]
    pub status: TenantStatus,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub owner_email: Option<String>,
    #[serde(default)]
    pub product_count: Option<u32>,
    #[serde(default)]
    pub order_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TenantSummary {
    /// Public shop URL under the platform's base domain.
    #[must_use]
    pub fn shop_url(&self, base_domain: &str) -> String {
        format!("https://{}.{base_domain}", self.subdomain)
    }

    /// Status the suspend/activate toggle switches to.
    #[must_use]
    pub const fn toggled_status(&self) -> TenantStatus {
        match self.status {
            TenantStatus::Active => TenantStatus::Suspended,
            TenantStatus::Suspended => TenantStatus::Active,
        }
    }
}

impl Listable for TenantSummary {
    fn matches(&self, needle: &str) -> bool {
        any_contains(
            needle,
            [
                Some(self.name.as_str()),
                Some(self.subdomain.as_str()),
                self.owner_email.as_deref(),
            ],
        )
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "name" => Some(SortKey::Text(self.name.to_lowercase())),
            "subdomain" => Some(SortKey::Text(self.subdomain.clone())),
            "status" => Some(SortKey::Text(self.status.as_str().to_string())),
            "created" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_summary() {
        let tenant: TenantSummary = serde_json::from_str(
            r#"{"_id":"t1","name":"Acme","subdomain":"acme","status":"suspended"}"#,
        )
        .unwrap();
        assert_eq!(tenant.shop_url("nepostore.xyz"), "https://acme.nepostore.xyz");
        assert_eq!(tenant.toggled_status(), TenantStatus::Active);
        assert!(tenant.matches("acm"));
    }
}
