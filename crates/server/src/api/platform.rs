//! `/api/super-admin` endpoints.

use nepostore_core::models::{StatusUpdate, TenantSummary};
use nepostore_core::types::{TenantId, TenantStatus};
use reqwest::Method;
use tracing::instrument;

use super::{ApiError, ScopedApi};

impl ScopedApi {
    #[instrument(skip(self))]
    pub async fn list_tenants(&self) -> Result<Vec<TenantSummary>, ApiError> {
        self.get("/api/super-admin/tenants").await
    }

    #[instrument(skip(self), fields(tenant_id = %id))]
    pub async fn get_tenant(&self, id: &TenantId) -> Result<TenantSummary, ApiError> {
        self.get(&format!(
            "/api/super-admin/tenants/{}",
            urlencoding::encode(id.as_str())
        ))
        .await
    }

    #[instrument(skip(self), fields(tenant_id = %id, status = %status))]
    pub async fn set_tenant_status(
        &self,
        id: &TenantId,
        status: TenantStatus,
    ) -> Result<(), ApiError> {
        let path = format!(
            "/api/super-admin/tenants/{}/status",
            urlencoding::encode(id.as_str())
        );
        self.execute(Method::PATCH, &path, &StatusUpdate { status })
            .await
    }
}
