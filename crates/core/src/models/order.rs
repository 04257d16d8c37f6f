//! Orders, as listed in the dashboard and placed from checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::{ValidationError, require};
use crate::listing::{Listable, SortKey, any_contains};
use crate::types::{
    AmountOverflow, DeliveryZone, Email, OrderId, OrderStatus, ProductId, line_amount, sum_amounts,
};

/// Contact and shipping details captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCustomer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
}

impl OrderCustomer {
    /// # Errors
    ///
    /// Returns the first missing or malformed field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Name", &self.name)?;
        require("Phone", &self.phone)?;
        require("Address", &self.address)?;
        if self.phone.chars().filter(char::is_ascii_digit).count() < 7 {
            return Err(ValidationError::invalid("Phone", "must have at least 7 digits"));
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            Email::parse(email).map_err(|e| ValidationError::invalid("Email", e.to_string()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(alias = "product")]
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderItem {
    /// # Errors
    ///
    /// Returns [`AmountOverflow`] for prices too large to multiply out.
    pub fn line_total(&self) -> Result<Decimal, AmountOverflow> {
        line_amount(self.unit_price, self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: OrderId,
    pub customer: OrderCustomer,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub delivery_zone: DeliveryZone,
    #[serde(default)]
    pub delivery_charge: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Sum of item lines, before delivery.
    ///
    /// # Errors
    ///
    /// Returns [`AmountOverflow`] when a line or the sum does not fit.
    pub fn subtotal(&self) -> Result<Decimal, AmountOverflow> {
        sum_amounts(self.items.iter().map(OrderItem::line_total))
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count, item| count.saturating_add(item.quantity))
    }
}

impl Listable for Order {
    fn matches(&self, needle: &str) -> bool {
        any_contains(
            needle,
            [
                Some(self.id.as_str()),
                Some(self.customer.name.as_str()),
                Some(self.customer.phone.as_str()),
                self.customer.email.as_deref(),
            ],
        )
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "total" => Some(SortKey::Amount(self.total)),
            "customer" => Some(SortKey::Text(self.customer.name.to_lowercase())),
            "status" => Some(SortKey::Text(self.status.as_str().to_string())),
            "created" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}

/// Order submitted from checkout to `/api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer: OrderCustomer,
    pub items: Vec<OrderItem>,
    pub delivery_zone: DeliveryZone,
    pub delivery_charge: Decimal,
    pub total: Decimal,
}

impl NewOrder {
    /// Assemble an order, computing the total from the lines and charge.
    ///
    /// # Errors
    ///
    /// Fails on an empty cart or invalid customer details.
    pub fn build(
        customer: OrderCustomer,
        items: Vec<OrderItem>,
        delivery_zone: DeliveryZone,
        delivery_charge: Decimal,
    ) -> Result<Self, ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::invalid("Cart", "is empty"));
        }
        customer.validate()?;
        let total = sum_amounts(
            items
                .iter()
                .map(OrderItem::line_total)
                .chain([Ok(delivery_charge)]),
        )
        .map_err(|_| ValidationError::invalid("Total", "is too large"))?;
        Ok(Self {
            customer,
            items,
            delivery_zone,
            delivery_charge,
            total,
        })
    }
}

/// Body of `PATCH /api/orders/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate<S> {
    pub status: S,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn customer() -> OrderCustomer {
        OrderCustomer {
            name: "Sita".into(),
            email: Some("sita@mail.com".into()),
            phone: "9800000000".into(),
            address: "Lalitpur".into(),
        }
    }

    fn item(qty: u32, price: i64) -> OrderItem {
        OrderItem {
            product_id: ProductId::from("p1"),
            name: "Topi".into(),
            quantity: qty,
            unit_price: Decimal::new(price, 0),
        }
    }

    #[test]
    fn test_build_totals() {
        let order = NewOrder::build(
            customer(),
            vec![item(2, 500), item(1, 250)],
            DeliveryZone::OutsideValley,
            Decimal::new(150, 0),
        )
        .unwrap();
        assert_eq!(order.total, Decimal::new(1400, 0));
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["deliveryZone"], "outside_valley");
    }

    #[test]
    fn test_build_rejects_empty_cart() {
        let err = NewOrder::build(customer(), vec![], DeliveryZone::InsideValley, Decimal::ZERO);
        assert_eq!(err, Err(ValidationError::invalid("Cart", "is empty")));
    }

    #[test]
    fn test_build_rejects_overflowing_total() {
        let huge = OrderItem {
            unit_price: Decimal::MAX,
            ..item(2, 0)
        };
        let err = NewOrder::build(customer(), vec![huge], DeliveryZone::InsideValley, Decimal::ZERO);
        assert_eq!(err, Err(ValidationError::invalid("Total", "is too large")));
    }

    #[test]
    fn test_item_count_saturates() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "o2",
            "customer": {"name": "Sita", "phone": "98", "address": "Patan"},
            "items": [
                {"product": "p1", "name": "Topi", "quantity": u32::MAX, "unitPrice": 1},
                {"product": "p2", "name": "Shawl", "quantity": 5, "unitPrice": 1}
            ],
            "total": "0"
        }))
        .unwrap();
        assert_eq!(order.item_count(), u32::MAX);
    }

    #[test]
    fn test_customer_validation() {
        let mut c = customer();
        c.phone = "12-34".into();
        assert!(c.validate().is_err());

        let mut c = customer();
        c.email = Some("nope".into());
        assert!(c.validate().is_err());

        let mut c = customer();
        c.email = Some(String::new());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_deserialize_order() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "o1",
            "customer": {"name": "Sita", "phone": "98", "address": "Patan"},
            "items": [{"product": "p1", "name": "Topi", "quantity": 3, "unitPrice": 100}],
            "total": "300",
            "status": "shipped"
        }))
        .unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.subtotal(), Ok(Decimal::new(300, 0)));
        assert_eq!(order.item_count(), 3);
        assert!(order.matches("sita"));
    }
}
