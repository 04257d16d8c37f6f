//! Categories: list, create with an optional image, delete.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::listing::{ListQuery, paginate};
use nepostore_core::models::CategoryInput;
use nepostore_core::types::CategoryId;
use tracing::instrument;

use super::Chrome;
use super::users::required;
use crate::error::AppError;
use crate::routes::{Ctx, recover};
use crate::uploads::{UploadedForm, validate_images};

const PATH: &str = "/categories";

#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub product_count: u32,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/categories.html")]
pub struct CategoriesTemplate {
    pub chrome: Chrome,
    pub categories: Vec<CategoryView>,
    pub search: String,
}

#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    let mut query: ListQuery = ctx.query();
    query.per_page = Some(nepostore_core::listing::MAX_PER_PAGE);
    let (categories, notice) = recover(ctx.api.list_categories().await, "categories")?;
    let page = paginate(&categories, &query, |_| true);

    Ok(CategoriesTemplate {
        chrome: Chrome::new(&ctx, "Categories").with_notice(notice),
        categories: page
            .items
            .into_iter()
            .map(|category| CategoryView {
                id: category.id.to_string(),
                slug: category.slug.unwrap_or_default(),
                name: category.name,
                image: category.image,
                product_count: category.product_count,
            })
            .collect(),
        search: query.q.unwrap_or_default(),
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn action(ctx: Ctx, mut form: UploadedForm) -> Result<Response, AppError> {
    let outcome = match form.text("action") {
        Some("create") => create(&ctx, &mut form).await,
        Some("delete") => delete(&ctx, &form).await,
        _ => Err(AppError::BadRequest("Unknown action".to_string())),
    };
    ctx.finish(PATH, outcome)
}

async fn create(ctx: &Ctx, form: &mut UploadedForm) -> Result<String, AppError> {
    let input = CategoryInput {
        name: form.text("name").unwrap_or_default().to_string(),
    };
    let image = validate_images(form.take_files("image"), ctx.state.config().max_image_bytes)?
        .into_iter()
        .next();
    let category = ctx.api.create_category(&input, image).await?;
    Ok(format!("Created category {}", category.name))
}

async fn delete(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let id = CategoryId::from(required(form, "id")?);
    ctx.api.delete_category(&id).await?;
    Ok("Category deleted".to_string())
}
