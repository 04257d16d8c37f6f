//! `/api/categories` endpoints.

use nepostore_core::models::{Category, CategoryInput};
use nepostore_core::types::CategoryId;
use reqwest::Method;
use reqwest::multipart::Form;
use tracing::instrument;

use super::{ApiError, ImageUpload, ScopedApi};

impl ScopedApi {
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get("/api/categories").await
    }

    /// Find one category in the list; the API has no single-category read.
    pub async fn get_category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        self.list_categories()
            .await?
            .into_iter()
            .find(|category| &category.id == id || category.slug.as_deref() == Some(id.as_str()))
            .ok_or_else(|| ApiError::NotFound(format!("category {id}")))
    }

    #[instrument(skip(self, input, image), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        input: &CategoryInput,
        image: Option<ImageUpload>,
    ) -> Result<Category, ApiError> {
        input.validate()?;
        let mut form = Form::new().text("name", input.name.trim().to_string());
        if let Some(image) = image {
            form = form.part("image", image.into_part()?);
        }
        self.multipart(Method::POST, "/api/categories", form).await
    }

    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), ApiError> {
        self.delete(&format!("/api/categories/{}", urlencoding::encode(id.as_str())))
            .await
    }
}
