//! `/api/orders` endpoints.

use nepostore_core::models::{NewOrder, Order, StatusUpdate};
use nepostore_core::types::{OrderId, OrderStatus};
use reqwest::Method;
use tracing::instrument;

use super::{ApiError, ScopedApi};

impl ScopedApi {
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("/api/orders").await
    }

    /// Place an order from checkout.
    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total))]
    pub async fn place_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        self.send(Method::POST, "/api/orders", order).await
    }

    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let path = format!("/api/orders/{}/status", urlencoding::encode(id.as_str()));
        self.execute(Method::PATCH, &path, &StatusUpdate { status })
            .await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: &OrderId) -> Result<(), ApiError> {
        self.delete(&format!("/api/orders/{}", urlencoding::encode(id.as_str())))
            .await
    }
}
