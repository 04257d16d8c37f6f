//! `/auth/current_user`.

use nepostore_core::models::CurrentUser;
use tracing::instrument;

use super::{ApiError, ScopedApi};

impl ScopedApi {
    /// The user the forwarded cookie belongs to.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] when there is no valid session.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.get("/auth/current_user").await
    }
}
