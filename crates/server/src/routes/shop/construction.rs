//! Shown for every path while a store is under construction.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::routes::Ctx;

#[derive(Template, WebTemplate)]
#[template(path = "shop/construction.html")]
pub struct ConstructionTemplate {
    pub store_name: String,
    pub logo: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

/// Under-construction notice with the store's contact details.
///
/// # Errors
///
/// Fails only outside shop mode, where no settings are loaded.
pub fn page(ctx: Ctx) -> Result<Response, AppError> {
    let settings = ctx.shop_settings()?;
    let template = ConstructionTemplate {
        store_name: settings.store_name.clone(),
        logo: settings.logo.clone().filter(|l| !l.trim().is_empty()),
        contact_email: settings.contact_email.clone(),
        contact_phone: settings.contact_phone.clone(),
    };
    Ok(template.into_response())
}
