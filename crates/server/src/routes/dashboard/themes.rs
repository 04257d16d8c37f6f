//! Theme gallery and activation.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::models::active_theme;
use nepostore_core::store::StoreEvent;
use nepostore_core::types::ThemeId;
use tracing::instrument;

use super::Chrome;
use super::users::required;
use crate::error::AppError;
use crate::routes::{Ctx, recover};
use crate::uploads::UploadedForm;

const PATH: &str = "/themes";

#[derive(Debug, Clone)]
pub struct ThemeCard {
    pub id: String,
    pub name: String,
    pub preview_image: Option<String>,
    pub is_active: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/themes.html")]
pub struct ThemesTemplate {
    pub chrome: Chrome,
    pub themes: Vec<ThemeCard>,
    pub active_name: Option<String>,
}

#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    let (themes, notice) = recover(ctx.api.list_themes().await, "themes")?;
    let active_name = active_theme(&themes).map(|theme| theme.name.clone());

    Ok(ThemesTemplate {
        chrome: Chrome::new(&ctx, "Themes").with_notice(notice),
        themes: themes
            .into_iter()
            .map(|theme| ThemeCard {
                id: theme.id.to_string(),
                name: theme.name,
                preview_image: theme.preview_image,
                is_active: theme.is_active,
            })
            .collect(),
        active_name,
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn action(ctx: Ctx, form: UploadedForm) -> Result<Response, AppError> {
    let outcome = match form.text("action") {
        Some("activate") => activate(&ctx, &form).await,
        _ => Err(AppError::BadRequest("Unknown action".to_string())),
    };
    ctx.finish(PATH, outcome)
}

async fn activate(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let id = ThemeId::from(required(form, "id")?);
    ctx.api.activate_theme(&id).await?;
    ctx.publish(|tenant| StoreEvent::ThemeChanged {
        tenant,
        theme: id.clone(),
    })
    .await;
    Ok("Theme activated".to_string())
}
