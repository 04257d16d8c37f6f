//! Super-admin console: every tenant on the platform.
//!
//! Calls are made without a tenant header so the API answers for the
//! platform rather than one store.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};
use nepostore_core::listing::{ListQuery, paginate};
use nepostore_core::models::TenantSummary;
use nepostore_core::types::{TenantId, TenantStatus};
use serde::Deserialize;
use tracing::{info, instrument};

use super::users::required;
use super::{Chrome, short_date};
use crate::components::TableView;
use crate::components::data_table::tenants_table_config;
use crate::error::AppError;
use crate::routes::{Ctx, recover};
use crate::uploads::UploadedForm;

const PATH: &str = "/super-admin";

#[derive(Debug, Default, Deserialize)]
struct TenantsQuery {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TenantRow {
    pub id: String,
    pub name: String,
    pub subdomain: String,
    pub shop_url: String,
    pub detail_href: String,
    pub status: &'static str,
    pub active: bool,
    pub toggle_label: &'static str,
    pub plan: String,
    pub owner_email: String,
    pub product_count: String,
    pub order_count: String,
    pub created: String,
}

impl TenantRow {
    fn new(tenant: &TenantSummary, base_domain: &str) -> Self {
        let count = |value: Option<u32>| value.map_or_else(|| "-".to_string(), |n| n.to_string());
        let active = tenant.status == TenantStatus::Active;
        Self {
            id: tenant.id.to_string(),
            name: tenant.name.clone(),
            subdomain: tenant.subdomain.clone(),
            shop_url: tenant.shop_url(base_domain),
            detail_href: format!(
                "{PATH}/tenants/{}",
                urlencoding::encode(tenant.id.as_str())
            ),
            status: tenant.status.as_str(),
            active,
            toggle_label: if active { "Suspend" } else { "Activate" },
            plan: tenant.plan.clone().unwrap_or_else(|| "free".to_string()),
            owner_email: tenant.owner_email.clone().unwrap_or_default(),
            product_count: count(tenant.product_count),
            order_count: count(tenant.order_count),
            created: short_date(tenant.created_at),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/tenants.html")]
pub struct TenantsTemplate {
    pub chrome: Chrome,
    pub table: TableView,
    pub tenants: Vec<TenantRow>,
    pub active_count: usize,
    pub suspended_count: usize,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/tenant.html")]
pub struct TenantTemplate {
    pub chrome: Chrome,
    pub tenant: TenantRow,
}

#[instrument(skip(ctx))]
pub async fn page(ctx: Ctx) -> Result<Response, AppError> {
    ctx.require_super_admin()?;
    let query: ListQuery = ctx.query();
    let extra: TenantsQuery = ctx.query();
    let status: Option<TenantStatus> = extra
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok());

    let platform = ctx.api.for_tenant(None);
    let (tenants, notice) = recover(platform.list_tenants().await, "stores")?;
    let active_count = tenants
        .iter()
        .filter(|t| t.status == TenantStatus::Active)
        .count();

    let page = paginate(&tenants, &query, |t| status.is_none_or(|s| t.status == s));
    let table = tenants_table_config().view(PATH, &query, &[("status", status.map(|s| s.as_str()))], &page);
    let base_domain = &ctx.state.config().base_domain;

    Ok(TenantsTemplate {
        chrome: Chrome::new(&ctx, "Stores").with_notice(notice),
        table,
        tenants: page
            .items
            .iter()
            .map(|t| TenantRow::new(t, base_domain))
            .collect(),
        active_count,
        suspended_count: tenants.len() - active_count,
    }
    .into_response())
}

#[instrument(skip(ctx))]
pub async fn detail(ctx: Ctx) -> Result<Response, AppError> {
    ctx.require_super_admin()?;
    let id = TenantId::from(ctx.param("tenantId")?);
    let tenant = ctx.api.for_tenant(None).get_tenant(&id).await?;
    let row = TenantRow::new(&tenant, &ctx.state.config().base_domain);

    Ok(TenantTemplate {
        chrome: Chrome::new(&ctx, &tenant.name),
        tenant: row,
    }
    .into_response())
}

#[instrument(skip(ctx, form))]
pub async fn action(ctx: Ctx, form: UploadedForm) -> Result<Response, AppError> {
    let admin = ctx.require_super_admin()?;
    let admin_id = admin.id.to_string();
    let back = form
        .text("back")
        .filter(|path| path.starts_with(PATH))
        .unwrap_or(PATH)
        .to_string();

    let outcome = match form.text("action") {
        Some("toggle") => toggle(&ctx, &form, &admin_id).await,
        _ => Err(AppError::BadRequest("Unknown action".to_string())),
    };
    ctx.finish(&back, outcome)
}

async fn toggle(ctx: &Ctx, form: &UploadedForm, admin_id: &str) -> Result<String, AppError> {
    let id = TenantId::from(required(form, "id")?);
    let platform = ctx.api.for_tenant(None);
    let tenant = platform.get_tenant(&id).await?;
    let status = tenant.toggled_status();
    platform.set_tenant_status(&id, status).await?;
    info!(tenant_id = %id, %status, admin_id, "Tenant status changed");
    Ok(format!("{} is now {status}", tenant.name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_row() {
        let tenant: TenantSummary = serde_json::from_value(serde_json::json!({
            "_id": "t1",
            "name": "Acme",
            "subdomain": "acme",
            "status": "suspended",
            "productCount": 12
        }))
        .unwrap();
        let row = TenantRow::new(&tenant, "nepostore.xyz");
        assert_eq!(row.shop_url, "https://acme.nepostore.xyz");
        assert_eq!(row.detail_href, "/super-admin/tenants/t1");
        assert_eq!(row.toggle_label, "Activate");
        assert_eq!(row.product_count, "12");
        assert_eq!(row.order_count, "-");
        assert_eq!(row.plan, "free");
    }
}
