//! Products: list, filter, create, edit, delete and bulk delete.
//!
//! The create and edit forms are multipart so they can carry up to
//! [`MAX_PRODUCT_IMAGES`] image files. Images are checked for size and type
//! before the form is forwarded to the API.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::listing::{ListQuery, paginate};
use nepostore_core::models::{Category, MAX_PRODUCT_IMAGES, Product, ProductInput, StoreSettings};
use nepostore_core::types::{CategoryId, ProductId, ProductStatus};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use super::users::required;
use super::{Chrome, first_notice};
use crate::api::ApiError;
use crate::components::TableView;
use crate::components::data_table::products_table_config;
use crate::error::AppError;
use crate::routes::{Ctx, recover, with_param};
use crate::uploads::{UploadedForm, validate_images};

const PATH: &str = "/products";

/// Query parameters beyond the shared list ones.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    #[serde(default)]
    pub status: Option<String>,
    /// Id of the product whose edit form is open.
    #[serde(default)]
    pub edit: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub status: &'static str,
    pub price: String,
    pub compare_at: Option<String>,
    pub quantity: i64,
    pub section: String,
    pub edit_href: String,
}

impl ProductRow {
    fn new(product: &Product, settings: &StoreSettings) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            image: product.primary_image().map(String::from),
            status: product.status.as_str(),
            price: settings.format(product.selling_price),
            compare_at: product
                .crossed_price
                .filter(|crossed| *crossed > product.selling_price)
                .map(|crossed| settings.format(crossed)),
            quantity: product.quantity,
            section: product.section.clone().unwrap_or_default(),
            edit_href: with_param(PATH, "edit", product.id.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Values of the create or edit form.
#[derive(Debug, Clone)]
pub struct ProductFormView {
    /// Set when editing.
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub selling_price: String,
    pub crossed_price: String,
    pub cost_price: String,
    pub quantity: i64,
    pub section: String,
    pub statuses: Vec<SelectOption>,
    pub categories: Vec<SelectOption>,
    pub images: Vec<String>,
    /// File inputs still available.
    pub free_slots: usize,
}

impl ProductFormView {
    fn new(product: Option<&Product>, categories: &[Category]) -> Self {
        let status = product.map(|p| p.status).unwrap_or_default();
        let category = product.and_then(|p| p.category.as_ref());
        let images = product.map(|p| p.images.clone()).unwrap_or_default();
        let amount = |value: Option<Decimal>| value.map(|v| v.to_string()).unwrap_or_default();

        let mut category_options = vec![SelectOption {
            value: String::new(),
            label: "No category".to_string(),
            selected: category.is_none(),
        }];
        category_options.extend(categories.iter().map(|c| SelectOption {
            value: c.id.to_string(),
            label: c.name.clone(),
            selected: category == Some(&c.id),
        }));

        Self {
            id: product.map(|p| p.id.to_string()),
            name: product.map(|p| p.name.clone()).unwrap_or_default(),
            description: product
                .and_then(|p| p.description.clone())
                .unwrap_or_default(),
            selling_price: amount(product.map(|p| p.selling_price)),
            crossed_price: amount(product.and_then(|p| p.crossed_price)),
            cost_price: amount(product.and_then(|p| p.cost_price)),
            quantity: product.map_or(0, |p| p.quantity),
            section: product.and_then(|p| p.section.clone()).unwrap_or_default(),
            statuses: ProductStatus::ALL
                .iter()
                .map(|s| SelectOption {
                    value: s.as_str().to_string(),
                    label: s.as_str().to_string(),
                    selected: *s == status,
                })
                .collect(),
            categories: category_options,
            free_slots: MAX_PRODUCT_IMAGES.saturating_sub(images.len()),
            images,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/products.html")]
pub struct ProductsTemplate {
    pub chrome: Chrome,
    pub table: TableView,
    pub products: Vec<ProductRow>,
    pub form: ProductFormView,
    pub editing: bool,
    pub max_image_mb: usize,
}

#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    let query: ListQuery = ctx.query();
    let extra: ProductsQuery = ctx.query();
    let status: Option<ProductStatus> = extra
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok());

    let (products, categories, settings) = tokio::join!(
        ctx.api.list_products(),
        ctx.api.list_categories(),
        ctx.store_settings(),
    );
    let (products, products_err) = recover(products, "products")?;
    let (categories, categories_err) = recover(categories, "categories")?;
    let settings = settings.unwrap_or_default();

    let page = paginate(&products, &query, |p| status.is_none_or(|s| p.status == s));
    let status_value = status.map(|s| s.as_str());
    let table = products_table_config().view(PATH, &query, &[("status", status_value)], &page);

    let editing_product = extra
        .edit
        .as_deref()
        .and_then(|id| products.iter().find(|p| p.id.as_str() == id));

    Ok(ProductsTemplate {
        chrome: Chrome::new(&ctx, "Products")
            .with_notice(first_notice([products_err, categories_err])),
        table,
        products: page
            .items
            .iter()
            .map(|p| ProductRow::new(p, &settings))
            .collect(),
        form: ProductFormView::new(editing_product, &categories),
        editing: editing_product.is_some(),
        max_image_mb: ctx.state.config().max_image_bytes.div_ceil(1024 * 1024),
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn action(ctx: Ctx, mut form: UploadedForm) -> Result<Response, AppError> {
    let outcome = match form.text("action") {
        Some("create") => create(&ctx, &mut form).await,
        Some("update") => update(&ctx, &mut form).await,
        Some("delete") => delete(&ctx, &form).await,
        Some("bulk_delete") => bulk_delete(&ctx, &form).await,
        _ => Err(AppError::BadRequest("Unknown action".to_string())),
    };
    ctx.finish(PATH, outcome)
}

async fn create(ctx: &Ctx, form: &mut UploadedForm) -> Result<String, AppError> {
    let input = product_input(form, Vec::new())?;
    let images = validate_images(form.take_files("images"), ctx.state.config().max_image_bytes)?;
    let product = ctx.api.create_product(&input, images).await?;
    Ok(format!("Created {}", product.name))
}

async fn update(ctx: &Ctx, form: &mut UploadedForm) -> Result<String, AppError> {
    let id = ProductId::from(required(form, "id")?);
    let kept = form.all("keep_images").to_vec();
    let input = product_input(form, kept)?;
    let images = validate_images(form.take_files("images"), ctx.state.config().max_image_bytes)?;
    let product = ctx.api.update_product(&id, &input, images).await?;
    Ok(format!("Saved {}", product.name))
}

async fn delete(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let id = ProductId::from(required(form, "id")?);
    ctx.api.delete_product(&id).await?;
    Ok("Product deleted".to_string())
}

async fn bulk_delete(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let ids: Vec<ProductId> = form
        .all("ids")
        .iter()
        .filter(|id| !id.trim().is_empty())
        .map(|id| ProductId::from(id.trim()))
        .collect();
    if ids.is_empty() {
        return Err(AppError::BadRequest("Select at least one product".to_string()));
    }

    let requested = ids.len();
    match ctx.api.delete_products(&ids).await {
        (deleted, None) => Ok(format!("Deleted {deleted} products")),
        (_, Some(err)) if matches!(err, ApiError::Unauthorized) => Err(err.into()),
        (deleted, Some(err)) => {
            tracing::warn!(deleted, requested, error = %err, "Bulk delete stopped early");
            Err(AppError::BadRequest(format!(
                "Deleted {deleted} of {requested} products: {}",
                err.user_message()
            )))
        }
    }
}

/// Build a [`ProductInput`] from form fields.
fn product_input(form: &UploadedForm, images: Vec<String>) -> Result<ProductInput, AppError> {
    Ok(ProductInput {
        name: form.text("name").unwrap_or_default().to_string(),
        description: form.text("description").map(String::from),
        selling_price: decimal(form, "selling_price", "Selling price")?.unwrap_or_default(),
        crossed_price: decimal(form, "crossed_price", "Crossed price")?,
        cost_price: decimal(form, "cost_price", "Cost price")?,
        status: form
            .text("status")
            .map(str::parse)
            .transpose()
            .map_err(AppError::BadRequest)?
            .unwrap_or_default(),
        quantity: form
            .text("quantity")
            .map(str::parse::<i64>)
            .transpose()
            .map_err(|_| AppError::BadRequest("Quantity must be a whole number".to_string()))?
            .unwrap_or_default(),
        section: form.text("section").map(String::from),
        category: form.text("category").map(CategoryId::from),
        images,
    })
}

fn decimal(form: &UploadedForm, field: &str, label: &str) -> Result<Option<Decimal>, AppError> {
    form.text(field)
        .map(str::parse::<Decimal>)
        .transpose()
        .map_err(|_| AppError::BadRequest(format!("{label} must be a number")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_input_from_form() {
        let form = UploadedForm::from_urlencoded(
            b"name=Dhaka+Topi&selling_price=1200&crossed_price=1500&cost_price=&status=draft&quantity=4&section=Hats",
        );
        let input = product_input(&form, vec!["https://cdn/a.jpg".to_string()]).unwrap();
        assert_eq!(input.name, "Dhaka Topi");
        assert_eq!(input.selling_price, Decimal::new(1200, 0));
        assert_eq!(input.crossed_price, Some(Decimal::new(1500, 0)));
        assert_eq!(input.cost_price, None);
        assert_eq!(input.status, ProductStatus::Draft);
        assert_eq!(input.quantity, 4);
        assert_eq!(input.images.len(), 1);
        assert!(input.category.is_none());
    }

    #[test]
    fn test_product_input_rejects_bad_numbers() {
        let form = UploadedForm::from_urlencoded(b"name=Tea&selling_price=abc");
        let err = product_input(&form, Vec::new()).unwrap_err();
        assert_eq!(err.user_message(), "Selling price must be a number");

        let form = UploadedForm::from_urlencoded(b"name=Tea&selling_price=1&quantity=1.5");
        assert!(product_input(&form, Vec::new()).is_err());
    }

    #[test]
    fn test_form_view_free_slots() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "_id": "p1",
            "name": "Tea",
            "sellingPrice": 100,
            "images": ["a", "b"]
        }))
        .unwrap();
        let view = ProductFormView::new(Some(&product), &[]);
        assert_eq!(view.free_slots, 4);
        assert_eq!(view.id.as_deref(), Some("p1"));
        assert!(view.categories[0].selected);
    }
}
