//! Marketing page on the bare and `www` domains.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};

use super::Ctx;
use crate::error::AppError;

#[derive(Template, WebTemplate)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    pub dashboard_url: String,
    pub signup_url: String,
    pub base_domain: String,
}

/// Landing page handler.
pub fn page(ctx: Ctx) -> Result<Response, AppError> {
    let config = ctx.state.config();
    let dashboard_url = config.dashboard_url.trim_end_matches('/').to_string();
    Ok(LandingTemplate {
        signup_url: format!("{dashboard_url}/signup"),
        dashboard_url,
        base_domain: config.base_domain.clone(),
    }
    .into_response())
}
