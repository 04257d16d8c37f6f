//! Store customers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::listing::{Listable, SortKey, any_contains};
use crate::types::CustomerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id", alias = "id")]
    pub id: CustomerId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub orders_count: u32,
    #[serde(default)]
    pub total_spent: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Listable for Customer {
    fn matches(&self, needle: &str) -> bool {
        any_contains(
            needle,
            [
                Some(self.name.as_str()),
                self.email.as_deref(),
                self.phone.as_deref(),
            ],
        )
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "name" => Some(SortKey::Text(self.name.to_lowercase())),
            "orders" => Some(SortKey::Count(i64::from(self.orders_count))),
            "spent" => Some(SortKey::Amount(self.total_spent)),
            "created" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}
