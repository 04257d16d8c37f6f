//! `/api/customers` endpoints.

use nepostore_core::models::{Customer, Order};
use nepostore_core::types::CustomerId;
use tracing::instrument;

use super::{ApiError, ScopedApi};

impl ScopedApi {
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        self.get("/api/customers").await
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn get_customer(&self, id: &CustomerId) -> Result<Customer, ApiError> {
        self.get(&format!("/api/customers/{}", urlencoding::encode(id.as_str())))
            .await
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn customer_orders(&self, id: &CustomerId) -> Result<Vec<Order>, ApiError> {
        self.get(&format!(
            "/api/customers/{}/orders",
            urlencoding::encode(id.as_str())
        ))
        .await
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn delete_customer(&self, id: &CustomerId) -> Result<(), ApiError> {
        self.delete(&format!("/api/customers/{}", urlencoding::encode(id.as_str())))
            .await
    }
}
