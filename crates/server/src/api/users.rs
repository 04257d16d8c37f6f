//! `/api/users` endpoints.

use nepostore_core::models::{StoreUser, UserInput};
use nepostore_core::types::UserId;
use reqwest::Method;
use tracing::instrument;

use super::{ApiError, ScopedApi};

impl ScopedApi {
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<StoreUser>, ApiError> {
        self.get("/api/users").await
    }

    #[instrument(skip(self, input), fields(role = %input.role))]
    pub async fn invite_user(&self, input: &UserInput) -> Result<StoreUser, ApiError> {
        input.validate()?;
        self.send(Method::POST, "/api/users", input).await
    }

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn remove_user(&self, id: &UserId) -> Result<(), ApiError> {
        self.delete(&format!("/api/users/{}", urlencoding::encode(id.as_str())))
            .await
    }
}
