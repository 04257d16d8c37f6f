//! The visitor's wishlist.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::types::ProductId;
use tracing::{instrument, warn};

use super::{ProductCard, ShopChrome, cards};
use crate::error::AppError;
use crate::routes::Ctx;
use crate::uploads::UploadedForm;
use crate::visitor;

const PATH: &str = "/wishlist";

#[derive(Template, WebTemplate)]
#[template(path = "shop/wishlist.html")]
pub struct WishlistTemplate {
    pub chrome: ShopChrome,
    pub action: String,
    pub products: Vec<ProductCard>,
}

#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    let settings = ctx.shop_settings()?;
    let wishlist = visitor::wishlist(&ctx.session).await?;

    let products = if wishlist.is_empty() {
        Vec::new()
    } else {
        match ctx.api.list_products().await {
            Ok(all) => {
                let saved = wishlist
                    .ids()
                    .iter()
                    .filter_map(|id| all.iter().find(|p| &p.id == id));
                cards(&ctx, saved, settings, &wishlist)
            }
            Err(err) => {
                warn!(error = %err, "Failed to load wishlist products");
                Vec::new()
            }
        }
    };

    Ok(WishlistTemplate {
        chrome: ShopChrome::load(&ctx, Some("Wishlist")).await?,
        action: ctx.href(PATH),
        products,
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn action(ctx: Ctx, form: UploadedForm) -> Result<Response, AppError> {
    let outcome = match (form.text("action"), form.text("product_id")) {
        (Some("remove"), Some(id)) => {
            let tenant = ctx.shop_tenant()?;
            visitor::remove_from_wishlist(&ctx.session, ctx.state.settings(), tenant, &ProductId::from(id))
                .await
                .map(|_| "Removed from wishlist".to_string())
        }
        _ => Err(AppError::BadRequest("Unknown action".to_string())),
    };
    ctx.finish(PATH, outcome)
}
