//! `/api/store-settings` endpoints.

use nepostore_core::models::{FooterSettings, NavbarSettings, StoreSettings};
use reqwest::Method;
use tracing::instrument;

use super::{ApiError, ScopedApi};

impl ScopedApi {
    #[instrument(skip(self))]
    pub async fn store_settings(&self) -> Result<StoreSettings, ApiError> {
        self.get("/api/store-settings").await
    }

    #[instrument(skip(self, settings), fields(store_name = %settings.store_name))]
    pub async fn save_store_settings(&self, settings: &StoreSettings) -> Result<(), ApiError> {
        settings.validate()?;
        self.execute(Method::PUT, "/api/store-settings", settings)
            .await
    }

    #[instrument(skip(self))]
    pub async fn navbar_settings(&self) -> Result<NavbarSettings, ApiError> {
        self.get("/api/store-settings/navbar").await
    }

    #[instrument(skip(self, navbar), fields(links = navbar.links.len()))]
    pub async fn save_navbar_settings(&self, navbar: &NavbarSettings) -> Result<(), ApiError> {
        navbar.validate()?;
        self.execute(Method::PUT, "/api/store-settings/navbar", navbar)
            .await
    }

    #[instrument(skip(self))]
    pub async fn footer_settings(&self) -> Result<FooterSettings, ApiError> {
        self.get("/api/store-settings/footer").await
    }

    #[instrument(skip(self, footer), fields(columns = footer.columns.len()))]
    pub async fn save_footer_settings(&self, footer: &FooterSettings) -> Result<(), ApiError> {
        footer.validate()?;
        self.execute(Method::PUT, "/api/store-settings/footer", footer)
            .await
    }
}
