//! `/api/products` endpoints.

use nepostore_core::models::{Product, ProductInput};
use nepostore_core::types::ProductId;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiError, ScopedApi};

/// An image file to attach to a product or category.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub(super) fn into_part(self) -> Result<Part, ApiError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)?)
    }
}

/// Reply of `/api/products/bulk-upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkUploadResponse {
    pub created: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Text fields of the product multipart form.
fn product_form(input: &ProductInput, images: Vec<ImageUpload>) -> Result<Form, ApiError> {
    let optional = |value: Option<String>| value.unwrap_or_default();

    let mut form = Form::new()
        .text("name", input.name.trim().to_string())
        .text("description", optional(input.description.clone()))
        .text("sellingPrice", input.selling_price.to_string())
        .text("crossedPrice", optional(input.crossed_price.map(|p| p.to_string())))
        .text("costPrice", optional(input.cost_price.map(|p| p.to_string())))
        .text("status", input.status.as_str())
        .text("quantity", input.quantity.to_string())
        .text("section", optional(input.section.clone()))
        .text(
            "category",
            optional(input.category.as_ref().map(ToString::to_string)),
        )
        .text(
            "existingImages",
            serde_json::to_string(&input.images).unwrap_or_else(|_| "[]".to_string()),
        );

    for image in images {
        form = form.part("images", image.into_part()?);
    }
    Ok(form)
}

impl ScopedApi {
    /// Every product of the tenant.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/api/products").await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.get(&format!("/api/products/{}", urlencoding::encode(id.as_str())))
            .await
    }

    /// Create a product with uploaded images.
    #[instrument(skip(self, input, images), fields(name = %input.name, images = images.len()))]
    pub async fn create_product(
        &self,
        input: &ProductInput,
        images: Vec<ImageUpload>,
    ) -> Result<Product, ApiError> {
        input.validate(images.len())?;
        let form = product_form(input, images)?;
        self.multipart(Method::POST, "/api/products", form).await
    }

    /// Replace a product's fields; `images` are added to the kept ones.
    #[instrument(skip(self, input, images), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductInput,
        images: Vec<ImageUpload>,
    ) -> Result<Product, ApiError> {
        input.validate(images.len())?;
        let form = product_form(input, images)?;
        let path = format!("/api/products/{}", urlencoding::encode(id.as_str()));
        self.multipart(Method::PUT, &path, form).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        self.delete(&format!("/api/products/{}", urlencoding::encode(id.as_str())))
            .await
    }

    /// Delete several products, stopping at the first failure.
    ///
    /// Returns how many were deleted before any error.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn delete_products(&self, ids: &[ProductId]) -> (usize, Option<ApiError>) {
        for (done, id) in ids.iter().enumerate() {
            if let Err(err) = self.delete_product(id).await {
                return (done, Some(err));
            }
        }
        (ids.len(), None)
    }

    /// Forward a checked bulk CSV file.
    #[instrument(skip(self, contents), fields(file_name = %file_name, bytes = contents.len()))]
    pub async fn bulk_upload(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<BulkUploadResponse, ApiError> {
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);
        self.multipart(Method::POST, "/api/products/bulk-upload", form)
            .await
    }
}
