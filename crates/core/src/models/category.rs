//! Product categories.

use serde::{Deserialize, Serialize};

use super::validation::{ValidationError, max_len, require};
use crate::listing::{Listable, SortKey, any_contains};
use crate::types::CategoryId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub product_count: u32,
}

impl Listable for Category {
    fn matches(&self, needle: &str) -> bool {
        any_contains(needle, [Some(self.name.as_str()), self.slug.as_deref()])
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "name" => Some(SortKey::Text(self.name.to_lowercase())),
            "products" => Some(SortKey::Count(i64::from(self.product_count))),
            _ => None,
        }
    }
}

/// Category creation form. The image, if any, is a separate multipart part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
}

impl CategoryInput {
    /// # Errors
    ///
    /// Returns an error for a blank or overlong name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Category name", &self.name)?;
        max_len("Category name", &self.name, 100)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize() {
        let category: Category =
            serde_json::from_str(r#"{"_id":"c1","name":"Shawls","productCount":3}"#).unwrap();
        assert_eq!(category.product_count, 3);
        assert!(category.image.is_none());
    }

    #[test]
    fn test_validate() {
        assert!(CategoryInput { name: "Bags".into() }.validate().is_ok());
        assert_eq!(
            CategoryInput::default().validate(),
            Err(ValidationError::Required("Category name"))
        );
    }
}
