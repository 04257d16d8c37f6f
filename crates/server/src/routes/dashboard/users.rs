//! Store staff: list, invite and remove.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::listing::{ListQuery, paginate};
use nepostore_core::models::UserInput;
use nepostore_core::types::{UserId, UserRole};
use tracing::instrument;

use super::Chrome;
use crate::components::TableView;
use crate::components::data_table::users_table_config;
use crate::error::AppError;
use crate::routes::{Ctx, recover};
use crate::uploads::UploadedForm;

const PATH: &str = "/users";

#[derive(Debug, Clone)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: &'static str,
    pub is_self: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/users.html")]
pub struct UsersTemplate {
    pub chrome: Chrome,
    pub table: TableView,
    pub users: Vec<UserView>,
    pub roles: Vec<&'static str>,
}

#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    let query: ListQuery = ctx.query();
    let (users, notice) = recover(ctx.api.list_users().await, "users")?;
    let page = paginate(&users, &query, |_| true);
    let me = ctx.user.as_ref().map(|u| u.id.clone());

    let table = users_table_config().view(PATH, &query, &[], &page);
    let users = page
        .items
        .iter()
        .map(|user| UserView {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str(),
            is_self: me.as_ref() == Some(&user.id),
        })
        .collect();

    Ok(UsersTemplate {
        chrome: Chrome::new(&ctx, "Users").with_notice(notice),
        table,
        users,
        roles: UserRole::ALL
            .iter()
            .filter(|role| !role.is_super_admin())
            .map(UserRole::as_str)
            .collect(),
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn action(ctx: Ctx, form: UploadedForm) -> Result<Response, AppError> {
    let outcome = match form.text("action") {
        Some("invite") => invite(&ctx, &form).await,
        Some("remove") => remove(&ctx, &form).await,
        _ => Err(AppError::BadRequest("Unknown action".to_string())),
    };
    ctx.finish(PATH, outcome)
}

async fn invite(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let input = UserInput {
        name: form.text("name").unwrap_or_default().to_string(),
        email: form.text("email").unwrap_or_default().to_string(),
        role: form
            .text("role")
            .unwrap_or("staff")
            .parse()
            .map_err(AppError::BadRequest)?,
    };
    let user = ctx.api.invite_user(&input).await?;
    Ok(format!("Invited {}", user.email))
}

async fn remove(ctx: &Ctx, form: &UploadedForm) -> Result<String, AppError> {
    let id = UserId::from(required(form, "id")?);
    if ctx.user.as_ref().is_some_and(|me| me.id == id) {
        return Err(AppError::BadRequest("You cannot remove yourself".to_string()));
    }
    ctx.api.remove_user(&id).await?;
    Ok("User removed".to_string())
}

/// A required text field of an action form.
pub(crate) fn required<'a>(form: &'a UploadedForm, name: &str) -> Result<&'a str, AppError> {
    form.text(name)
        .ok_or_else(|| AppError::BadRequest(format!("Missing field {name}")))
}
