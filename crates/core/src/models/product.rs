//! Products and the product form.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::{ValidationError, max_len, non_negative, require};
use crate::listing::{Listable, SortKey, any_contains};
use crate::types::{CategoryId, CurrencyCode, Price, ProductId, ProductStatus};

/// Maximum number of images attached to a product.
pub const MAX_PRODUCT_IMAGES: usize = 6;

/// Maximum length of a product name.
pub const MAX_PRODUCT_NAME: usize = 200;

/// A product as returned by `/api/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub crossed_price: Option<Decimal>,
    #[serde(default)]
    pub cost_price: Option<Decimal>,
    pub selling_price: Decimal,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Selling price in the store currency.
    #[must_use]
    pub const fn price(&self, currency: CurrencyCode) -> Price {
        Price::new(self.selling_price, currency)
    }

    /// Struck-through price, only when it is above the selling price.
    #[must_use]
    pub fn compare_at(&self, currency: CurrencyCode) -> Option<Price> {
        self.crossed_price
            .filter(|crossed| *crossed > self.selling_price)
            .map(|crossed| Price::new(crossed, currency))
    }

    /// Whole-percent discount off the crossed price.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        use rust_decimal::prelude::ToPrimitive;

        let crossed = self
            .crossed_price
            .filter(|c| *c > self.selling_price && c.is_sign_positive() && !c.is_zero())?;
        let pct = crossed
            .checked_sub(self.selling_price)?
            .checked_div(crossed)?
            .checked_mul(Decimal::ONE_HUNDRED)?;
        pct.round().to_u32()
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, ProductStatus::Active)
    }

    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product belongs to the section with the given slug.
    #[must_use]
    pub fn in_section(&self, slug: &str) -> bool {
        self.section
            .as_deref()
            .is_some_and(|section| slugify(section) == slugify(slug))
    }
}

impl Listable for Product {
    fn matches(&self, needle: &str) -> bool {
        any_contains(
            needle,
            [
                Some(self.name.as_str()),
                self.section.as_deref(),
                self.slug.as_deref(),
            ],
        )
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "name" => Some(SortKey::Text(self.name.to_lowercase())),
            "price" => Some(SortKey::Amount(self.selling_price)),
            "quantity" => Some(SortKey::Count(self.quantity)),
            "created" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }
}

/// Lowercase, hyphen-separated form of a label.
///
/// ```
/// assert_eq!(nepostore_core::models::slugify("New  Arrivals!"), "new-arrivals");
/// ```
#[must_use]
pub fn slugify(label: &str) -> String {
    label
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Fields submitted by the product create/edit form.
///
/// Image files travel separately as multipart parts; `images` holds the
/// URLs of images the product already has and keeps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub crossed_price: Option<Decimal>,
    #[serde(default)]
    pub cost_price: Option<Decimal>,
    pub selling_price: Decimal,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductInput {
    /// Check the form before it is sent.
    ///
    /// `new_images` is the number of uploaded files that come with it.
    ///
    /// # Errors
    ///
    /// Returns the first rule the input breaks.
    pub fn validate(&self, new_images: usize) -> Result<(), ValidationError> {
        require("Name", &self.name)?;
        max_len("Name", &self.name, MAX_PRODUCT_NAME)?;
        non_negative("Selling price", self.selling_price)?;
        if let Some(crossed) = self.crossed_price {
            non_negative("Crossed price", crossed)?;
        }
        if let Some(cost) = self.cost_price {
            non_negative("Cost price", cost)?;
        }
        if self.quantity < 0 {
            return Err(ValidationError::Negative("Quantity"));
        }
        if self.images.len() + new_images > MAX_PRODUCT_IMAGES {
            return Err(ValidationError::invalid(
                "Images",
                format!("cannot exceed {MAX_PRODUCT_IMAGES} per product"),
            ));
        }
        Ok(())
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            crossed_price: product.crossed_price,
            cost_price: product.cost_price,
            selling_price: product.selling_price,
            status: product.status,
            quantity: product.quantity,
            section: product.section.clone(),
            category: product.category.clone(),
            images: product.images.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": "p1",
            "name": "Dhaka Topi",
            "sellingPrice": "800",
            "crossedPrice": "1000",
            "images": ["https://cdn/a.png", "https://cdn/b.png"],
            "quantity": 4,
            "section": "New Arrivals"
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_api_shape() {
        let product = sample();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.status, ProductStatus::Active);
        assert_eq!(product.primary_image(), Some("https://cdn/a.png"));
        assert!(product.in_stock());
    }

    #[test]
    fn test_accepts_plain_id_and_numbers() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "p2",
            "name": "Shawl",
            "sellingPrice": 1500
        }))
        .unwrap();
        assert_eq!(product.id.as_str(), "p2");
        assert_eq!(product.selling_price, Decimal::new(1500, 0));
        assert!(product.crossed_price.is_none());
    }

    #[test]
    fn test_discount() {
        let product = sample();
        assert_eq!(product.discount_percent(), Some(20));
        assert_eq!(
            product.compare_at(CurrencyCode::NPR).unwrap().display(),
            "Rs. 1,000.00"
        );

        let mut cheaper = product;
        cheaper.crossed_price = Some(Decimal::new(500, 0));
        assert_eq!(cheaper.discount_percent(), None);
        assert!(cheaper.compare_at(CurrencyCode::NPR).is_none());
    }

    #[test]
    fn test_section_slug() {
        assert!(sample().in_section("new-arrivals"));
        assert!(!sample().in_section("sale"));
        assert_eq!(slugify("  Men's  Wear "), "men-s-wear");
    }

    #[test]
    fn test_validate() {
        let mut input = ProductInput::from(&sample());
        assert!(input.validate(0).is_ok());
        assert!(input.validate(5).is_err());

        input.name = " ".into();
        assert_eq!(input.validate(0), Err(ValidationError::Required("Name")));

        input.name = "Topi".into();
        input.quantity = -1;
        assert_eq!(input.validate(0), Err(ValidationError::Negative("Quantity")));

        input.quantity = 1;
        input.cost_price = Some(Decimal::new(-5, 0));
        assert_eq!(input.validate(0), Err(ValidationError::Negative("Cost price")));
    }

    #[test]
    fn test_sort_keys() {
        let product = sample();
        assert_eq!(product.sort_key("price"), Some(SortKey::Amount(Decimal::new(800, 0))));
        assert!(product.matches("topi"));
        assert!(product.matches("arrivals"));
        assert_eq!(product.sort_key("colour"), None);
    }
}
