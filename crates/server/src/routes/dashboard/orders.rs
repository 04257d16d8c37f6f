//! Orders: filter by status, update status, delete.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::listing::{ListQuery, paginate};
use nepostore_core::models::{Order, StoreSettings};
use nepostore_core::types::{OrderId, OrderStatus};
use serde::Deserialize;
use tracing::instrument;

use super::users::required;
use super::{Chrome, short_date};
use crate::components::TableView;
use crate::components::data_table::orders_table_config;
use crate::error::AppError;
use crate::routes::{Ctx, recover};
use crate::uploads::UploadedForm;

const PATH: &str = "/orders";

#[derive(Debug, Default, Deserialize)]
struct OrdersQuery {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: String,
    pub customer: String,
    pub phone: String,
    pub address: String,
    pub zone: &'static str,
    pub lines: Vec<String>,
    pub items: u32,
    pub total: String,
    pub status: &'static str,
    pub open: bool,
    pub placed: String,
    pub statuses: Vec<StatusOption>,
}

impl OrderRow {
    pub(crate) fn new(order: &Order, settings: &StoreSettings) -> Self {
        Self {
            id: order.id.to_string(),
            customer: order.customer.name.clone(),
            phone: order.customer.phone.clone(),
            address: order.customer.address.clone(),
            zone: order.delivery_zone.label(),
            lines: order
                .items
                .iter()
                .map(|item| {
                    format!(
                        "{} x {} @ {}",
                        item.quantity,
                        item.name,
                        settings.format(item.unit_price)
                    )
                })
                .collect(),
            items: order.item_count(),
            total: settings.format(order.total),
            status: order.status.as_str(),
            open: order.status.is_open(),
            placed: short_date(order.created_at),
            statuses: OrderStatus::ALL
                .iter()
                .map(|s| StatusOption {
                    value: s.as_str(),
                    selected: *s == order.status,
                })
                .collect(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/orders.html")]
pub struct OrdersTemplate {
    pub chrome: Chrome,
    pub table: TableView,
    pub orders: Vec<OrderRow>,
}

#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    let query: ListQuery = ctx.query();
    let extra: OrdersQuery = ctx.query();
    let status: Option<OrderStatus> = extra
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok());

    let (orders, settings) = tokio::join!(ctx.api.list_orders(), ctx.store_settings());
    let (orders, notice) = recover(orders, "orders")?;
    let settings = settings.unwrap_or_default();

    let page = paginate(&orders, &query, |o| status.is_none_or(|s| o.status == s));
    let table = orders_table_config().view(PATH, &query, &[("status", status.map(|s| s.as_str()))], &page);

    Ok(OrdersTemplate {
        chrome: Chrome::new(&ctx, "Orders").with_notice(notice),
        table,
        orders: page
            .items
            .iter()
            .map(|order| OrderRow::new(order, &settings))
            .collect(),
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn action(ctx: Ctx, form: UploadedForm) -> Result<Response, AppError> {
    let outcome = match form.text("action") {
        Some("status") => update_status(&ctx, &form).await,
        Some("delete") => delete(&ctx, &form).await,
        _ => Err(AppError::BadRequest("Unknown action".to_string())),
    };
    ctx.finish(PATH, outcome)
}

async fn update_status(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let id = OrderId::from(required(form, "id")?);
    let status: OrderStatus = required(form, "status")?
        .parse()
        .map_err(AppError::BadRequest)?;
    ctx.api.update_order_status(&id, status).await?;
    Ok(format!("Order {id} marked {status}"))
}

async fn delete(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let id = OrderId::from(required(form, "id")?);
    ctx.api.delete_order(&id).await?;
    Ok(format!("Order {id} deleted"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_row() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "o1",
            "customer": {"name": "Sita", "phone": "9800000000", "address": "Patan"},
            "items": [{"productId": "p1", "name": "Tea", "quantity": 2, "unitPrice": "150"}],
            "deliveryZone": "inside_valley",
            "deliveryCharge": "100",
            "total": "400",
            "status": "pending"
        }))
        .unwrap();
        let row = OrderRow::new(&order, &StoreSettings::default());
        assert_eq!(row.items, 2);
        assert_eq!(row.lines.len(), 1);
        assert!(row.lines[0].starts_with("2 x Tea"));
        assert!(row.open);
        assert_eq!(row.placed, "-");
        assert_eq!(row.statuses.iter().filter(|s| s.selected).count(), 1);
    }
}
