//! `/api/themes` endpoints.

use nepostore_core::models::Theme;
use nepostore_core::types::ThemeId;
use reqwest::Method;
use tracing::instrument;

use super::{ApiError, ScopedApi};

impl ScopedApi {
    #[instrument(skip(self))]
    pub async fn list_themes(&self) -> Result<Vec<Theme>, ApiError> {
        self.get("/api/themes").await
    }

    #[instrument(skip(self), fields(theme_id = %id))]
    pub async fn activate_theme(&self, id: &ThemeId) -> Result<(), ApiError> {
        let path = format!("/api/themes/{}/activate", urlencoding::encode(id.as_str()));
        self.execute(Method::POST, &path, &serde_json::json!({}))
            .await
    }
}
