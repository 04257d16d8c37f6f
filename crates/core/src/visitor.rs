//! Per-visitor shop state: cart, wishlist and recently viewed products.
//!
//! These are plain values; the server keeps them in the visitor's session
//! under their [`StoreKey`](crate::store::StoreKey).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{OrderItem, Product};
use crate::types::{AmountOverflow, ProductId, line_amount, sum_amounts};

/// Products remembered in the recently-viewed strip.
pub const RECENTLY_VIEWED_LIMIT: usize = 8;

/// Largest quantity of one product in a cart.
pub const MAX_LINE_QUANTITY: u32 = 99;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartLine {
    /// # Errors
    ///
    /// Returns [`AmountOverflow`] for prices too large to multiply out.
    pub fn line_total(&self) -> Result<Decimal, AmountOverflow> {
        line_amount(self.unit_price, self.quantity)
    }
}

fn stock(product: &Product) -> u32 {
    u32::try_from(product.quantity.max(0)).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Add `quantity` of a product, merging with an existing line.
    ///
    /// Quantities are capped at [`MAX_LINE_QUANTITY`] and at the stock the
    /// product reports.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        let cap = MAX_LINE_QUANTITY.min(stock(product));
        if cap == 0 || quantity == 0 {
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity).min(cap);
            line.unit_price = product.selling_price;
        } else {
            self.lines.push(CartLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                unit_price: product.selling_price,
                quantity: quantity.min(cap),
                image: product.images.first().cloned(),
            });
        }
    }

    /// Set a line's quantity from the product's current record; zero removes
    /// the line.
    ///
    /// Capped like [`Cart::add`]. A product that is out of stock is removed.
    pub fn set_quantity(&mut self, product: &Product, quantity: u32) {
        let cap = MAX_LINE_QUANTITY.min(stock(product));
        if quantity == 0 || cap == 0 {
            self.remove(&product.id);
        } else if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = quantity.min(cap);
            line.unit_price = product.selling_price;
        }
    }

    pub fn remove(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| &line.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |count, line| count.saturating_add(line.quantity))
    }

    /// # Errors
    ///
    /// Returns [`AmountOverflow`] when a line or the sum does not fit.
    pub fn subtotal(&self) -> Result<Decimal, AmountOverflow> {
        sum_amounts(self.lines.iter().map(CartLine::line_total))
    }

    /// Lines as order items for checkout.
    #[must_use]
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.lines
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist(Vec<ProductId>);

impl Wishlist {
    /// Add the product if absent, remove it if present.
    ///
    /// Returns `true` when the product is now in the wishlist.
    pub fn toggle(&mut self, product_id: &ProductId) -> bool {
        if let Some(pos) = self.0.iter().position(|id| id == product_id) {
            self.0.remove(pos);
            false
        } else {
            self.0.push(product_id.clone());
            true
        }
    }

    /// Remove the product; returns whether it was there.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|id| id != product_id);
        self.0.len() != before
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.0.contains(product_id)
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Most recent first, no duplicates, at most [`RECENTLY_VIEWED_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentlyViewed(Vec<ProductId>);

impl RecentlyViewed {
    pub fn record(&mut self, product_id: &ProductId) {
        self.0.retain(|id| id != product_id);
        self.0.insert(0, product_id.clone());
        self.0.truncate(RECENTLY_VIEWED_LIMIT);
    }

    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.0
    }

    /// Ids other than `current`, for "you recently viewed" strips.
    pub fn excluding<'a>(&'a self, current: &'a ProductId) -> impl Iterator<Item = &'a ProductId> {
        self.0.iter().filter(move |id| *id != current)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64, qty: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "name": format!("Product {id}"),
            "sellingPrice": price,
            "quantity": qty,
        }))
        .unwrap()
    }

    #[test]
    fn test_cart_merges_and_caps() {
        let mut cart = Cart::default();
        let topi = product("p1", 500, 3);
        cart.add(&topi, 2);
        cart.add(&topi, 2);
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), Ok(Decimal::new(1500, 0)));
    }

    #[test]
    fn test_cart_ignores_out_of_stock() {
        let mut cart = Cart::default();
        cart.add(&product("p1", 500, 0), 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_quantity_and_remove() {
        let mut cart = Cart::default();
        cart.add(&product("p1", 100, 10), 1);
        cart.add(&product("p2", 200, 10), 1);
        cart.set_quantity(&product("p1", 100, 10), 4);
        assert_eq!(cart.subtotal(), Ok(Decimal::new(600, 0)));
        cart.set_quantity(&product("p2", 200, 10), 0);
        assert_eq!(cart.lines.len(), 1);
        let items = cart.order_items();
        assert_eq!(items[0].quantity, 4);
    }

    #[test]
    fn test_set_quantity_caps_at_stock() {
        let mut cart = Cart::default();
        let topi = product("p1", 100, 2);
        cart.add(&topi, 2);
        cart.set_quantity(&topi, 50);
        assert_eq!(cart.item_count(), 2);

        cart.set_quantity(&product("p1", 100, 0), 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_huge_prices_fail_instead_of_panicking() {
        let mut cart = Cart::default();
        let product: Product = serde_json::from_value(serde_json::json!({
            "_id": "p1",
            "name": "Gold",
            "sellingPrice": "79228162514264337593543950335",
            "quantity": 5,
        }))
        .unwrap();
        cart.add(&product, 2);
        assert_eq!(cart.subtotal(), Err(AmountOverflow));
    }

    #[test]
    fn test_wishlist_toggle() {
        let mut wishlist = Wishlist::default();
        let id = ProductId::from("p1");
        assert!(wishlist.toggle(&id));
        assert!(wishlist.contains(&id));
        assert!(!wishlist.toggle(&id));
        assert!(wishlist.is_empty());
        wishlist.toggle(&id);
        assert!(wishlist.remove(&id));
        assert!(!wishlist.remove(&id));
    }

    #[test]
    fn test_recently_viewed_order_and_limit() {
        let mut recent = RecentlyViewed::default();
        for i in 0..10 {
            recent.record(&ProductId::from(format!("p{i}")));
        }
        recent.record(&ProductId::from("p5"));

        let ids: Vec<_> = recent.ids().iter().map(ProductId::as_str).collect();
        assert_eq!(ids.len(), RECENTLY_VIEWED_LIMIT);
        assert_eq!(ids[0], "p5");
        assert_eq!(ids[1], "p9");
        assert_eq!(ids.iter().filter(|id| **id == "p5").count(), 1);

        let current = ProductId::from("p5");
        assert_eq!(recent.excluding(&current).count(), RECENTLY_VIEWED_LIMIT - 1);
    }
}
