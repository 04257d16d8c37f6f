//! Customers list and per-customer orders.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::listing::{ListQuery, paginate};
use nepostore_core::models::{Customer, StoreSettings};
use nepostore_core::types::CustomerId;
use tracing::instrument;

use super::users::required;
use super::{Chrome, short_date};
use crate::components::TableView;
use crate::components::data_table::customers_table_config;
use crate::error::AppError;
use crate::routes::{Ctx, recover};
use crate::uploads::UploadedForm;

const PATH: &str = "/customers";

/// Customer view for templates.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub id: String,
    pub href: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub orders_count: u32,
    pub total_spent: String,
    pub since: String,
}

impl CustomerView {
    fn new(customer: &Customer, settings: &StoreSettings) -> Self {
        Self {
            id: customer.id.to_string(),
            href: format!("{PATH}/{}", urlencoding::encode(customer.id.as_str())),
            name: customer.name.clone(),
            email: customer.email.clone().unwrap_or_default(),
            phone: customer.phone.clone().unwrap_or_default(),
            address: customer.address.clone().unwrap_or_default(),
            orders_count: customer.orders_count,
            total_spent: settings.format(customer.total_spent),
            since: short_date(customer.created_at),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/customers.html")]
pub struct CustomersTemplate {
    pub chrome: Chrome,
    pub table: TableView,
    pub customers: Vec<CustomerView>,
}

#[derive(Debug, Clone)]
pub struct CustomerOrderView {
    pub id: String,
    pub items: u32,
    pub total: String,
    pub status: &'static str,
    pub zone: &'static str,
    pub placed: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/customer.html")]
pub struct CustomerTemplate {
    pub chrome: Chrome,
    pub customer: CustomerView,
    pub orders: Vec<CustomerOrderView>,
}

/// Customers list page handler.
#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    let query: ListQuery = ctx.query();
    let (customers, settings) = tokio::join!(ctx.api.list_customers(), ctx.store_settings());
    let (customers, notice) = recover(customers, "customers")?;
    let settings = settings.unwrap_or_default();

    let page = paginate(&customers, &query, |_| true);
    let table = customers_table_config().view(PATH, &query, &[], &page);

    Ok(CustomersTemplate {
        chrome: Chrome::new(&ctx, "Customers").with_notice(notice),
        table,
        customers: page
            .items
            .iter()
            .map(|c| CustomerView::new(c, &settings))
            .collect(),
    }
    .into_response())
}

/// One customer and their orders.
#[instrument(skip(ctx))]
pub async fn detail(ctx: Ctx) -> Result<Response, AppError> {
    let id = CustomerId::from(ctx.param("customerId")?);
    let (customer, orders, settings) = tokio::join!(
        ctx.api.get_customer(&id),
        ctx.api.customer_orders(&id),
        ctx.store_settings(),
    );
    let customer = customer?;
    let (mut orders, notice) = recover(orders, "orders")?;
    let settings = settings.unwrap_or_default();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(CustomerTemplate {
        chrome: Chrome::new(&ctx, &customer.name).with_notice(notice),
        customer: CustomerView::new(&customer, &settings),
        orders: orders
            .iter()
            .map(|order| CustomerOrderView {
                id: order.id.to_string(),
                items: order.item_count(),
                total: settings.format(order.total),
                status: order.status.as_str(),
                zone: order.delivery_zone.label(),
                placed: short_date(order.created_at),
            })
            .collect(),
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn action(ctx: Ctx, form: UploadedForm) -> Result<Response, AppError> {
    let outcome = match form.text("action") {
        Some("delete") => delete(&ctx, &form).await,
        _ => Err(AppError::BadRequest("Unknown action".to_string())),
    };
    ctx.finish(PATH, outcome)
}

async fn delete(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let id = CustomerId::from(required(form, "id")?);
    ctx.api.delete_customer(&id).await?;
    Ok("Customer deleted".to_string())
}
