//! Dashboard home: headline numbers and latest orders.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::models::{Order, StoreSettings};
use nepostore_core::types::OrderStatus;
use rust_decimal::Decimal;
use tracing::instrument;

use super::{Chrome, first_notice, short_date};
use crate::error::AppError;
use crate::routes::{Ctx, recover};

/// Orders shown in the "recent orders" list.
const RECENT_ORDERS: usize = 5;

#[derive(Debug, Clone)]
pub struct RecentOrderView {
    pub id: String,
    pub customer: String,
    pub total: String,
    pub status: &'static str,
    pub placed: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/home.html")]
pub struct HomeTemplate {
    pub chrome: Chrome,
    pub product_count: usize,
    pub order_count: usize,
    pub open_orders: usize,
    pub customer_count: usize,
    pub revenue: String,
    pub recent_orders: Vec<RecentOrderView>,
}

/// Revenue counts delivered orders only.
fn delivered_revenue(orders: &[Order]) -> Decimal {
    orders
        .iter()
        .filter(|order| order.status == OrderStatus::Delivered)
        .map(|order| order.total)
        .sum()
}

fn recent(orders: &[Order], settings: &StoreSettings) -> Vec<RecentOrderView> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
        .into_iter()
        .take(RECENT_ORDERS)
        .map(|order| RecentOrderView {
            id: order.id.to_string(),
            customer: order.customer.name.clone(),
            total: settings.format(order.total),
            status: order.status.as_str(),
            placed: short_date(order.created_at),
        })
        .collect()
}

#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    let (products, orders, customers, settings) = tokio::join!(
        ctx.api.list_products(),
        ctx.api.list_orders(),
        ctx.api.list_customers(),
        ctx.store_settings(),
    );
    let (products, products_err) = recover(products, "products")?;
    let (orders, orders_err) = recover(orders, "orders")?;
    let (customers, customers_err) = recover(customers, "customers")?;
    let settings = match settings {
        Ok(settings) => (*settings).clone(),
        Err(err) if err.is_unauthorized() => return Err(err),
        Err(_) => StoreSettings::default(),
    };

    let chrome = Chrome::new(&ctx, "Dashboard")
        .with_notice(first_notice([products_err, orders_err, customers_err]));

    Ok(HomeTemplate {
        chrome,
        product_count: products.len(),
        order_count: orders.len(),
        open_orders: orders.iter().filter(|o| o.status.is_open()).count(),
        customer_count: customers.len(),
        revenue: settings.format(delivered_revenue(&orders)),
        recent_orders: recent(&orders, &settings),
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn order(id: &str, status: &str, total: &str, day: u32) -> Order {
        serde_json::from_value(json!({
            "_id": id,
            "customer": {"name": "Hari", "phone": "9800000000", "address": "Patan"},
            "total": total,
            "status": status,
            "createdAt": format!("2024-05-{day:02}T10:00:00Z"),
        }))
        .unwrap()
    }

    #[test]
    fn test_revenue_counts_delivered_only() {
        let orders = vec![
            order("o1", "delivered", "1000", 1),
            order("o2", "pending", "500", 2),
            order("o3", "delivered", "250.50", 3),
        ];
        assert_eq!(delivered_revenue(&orders), Decimal::new(125_050, 2));
    }

    #[test]
    fn test_recent_orders_newest_first() {
        let orders: Vec<Order> = (1..=7)
            .map(|day| order(&format!("o{day}"), "pending", "10", day))
            .collect();
        let views = recent(&orders, &StoreSettings::default());
        assert_eq!(views.len(), RECENT_ORDERS);
        assert_eq!(views[0].id, "o7");
        assert_eq!(views[4].id, "o3");
    }
}
