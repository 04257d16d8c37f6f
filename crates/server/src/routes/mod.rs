//! Route handlers.
//!
//! # Routes
//!
//! - `GET /health` - liveness
//! - `GET /health/ready` - readiness (backend API reachable)
//! - `/static/*` - stylesheets and images
//! - everything else - the tenant dispatcher
//!
//! The dispatcher resolves the request's [`TenantContext`] into a mode,
//! builds that mode's [`RouteTable`], resolves the path and hands the leaf
//! [`Screen`] to its handler. `GET` renders a screen; `POST` runs one of
//! the screen's actions and redirects back with a toast.

pub mod dashboard;
pub mod landing;
pub mod shop;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, Request, State},
    http::{Method, StatusCode, Uri, header::COOKIE},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use nepostore_core::models::{CurrentUser, StoreSettings};
use nepostore_core::routing::{Resolution, RouteParams, RouteTable, Screen};
use nepostore_core::store::StoreEvent;
use nepostore_core::tenant::{Mode, TenantContext, TenantToken};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use crate::api::{ApiError, ScopedApi};
use crate::error::{AppError, add_breadcrumb, set_sentry_user};
use crate::state::AppState;
use crate::uploads::UploadedForm;

/// Routes that bypass tenant dispatch.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .fallback(dispatch)
}

/// Liveness check.
async fn health() -> &'static str {
    "ok"
}

/// Readiness check: the backend API answers.
async fn readiness(State(state): State<AppState>) -> Result<&'static str, StatusCode> {
    if state.api().ping().await {
        Ok("ok")
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

// =============================================================================
// Toasts
// =============================================================================

/// A one-shot notice carried in the query string after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    /// `success` or `error`; doubles as the CSS modifier.
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
struct ToastQuery {
    success: Option<String>,
    error: Option<String>,
}

impl Toast {
    /// Read `?success=` or `?error=` from a URI.
    #[must_use]
    pub fn from_uri(uri: &Uri) -> Option<Self> {
        let query = Query::<ToastQuery>::try_from_uri(uri).ok()?.0;
        query
            .error
            .filter(|m| !m.is_empty())
            .map(|message| Self {
                kind: "error",
                message,
            })
            .or_else(|| {
                query.success.filter(|m| !m.is_empty()).map(|message| Self {
                    kind: "success",
                    message,
                })
            })
    }
}

/// Append a query parameter to a path that may already have a query.
#[must_use]
pub fn with_param(path: &str, key: &str, value: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!(
        "{path}{separator}{key}={}",
        urlencoding::encode(value)
    )
}

// =============================================================================
// Request context
// =============================================================================

/// Everything a screen handler needs about the current request.
pub struct Ctx {
    pub state: AppState,
    pub tenant: TenantContext,
    /// API client scoped to the tenant the screen acts for.
    pub api: ScopedApi,
    pub session: Session,
    pub table: RouteTable,
    pub screen: Screen,
    pub params: RouteParams,
    pub uri: Uri,
    /// Signed-in dashboard user.
    pub user: Option<CurrentUser>,
    /// Store settings, loaded for shop requests.
    pub settings: Option<Arc<StoreSettings>>,
}

impl Ctx {
    /// Deserialize the query string, falling back to defaults when it
    /// does not parse.
    #[must_use]
    pub fn query<T: DeserializeOwned + Default>(&self) -> T {
        Query::<T>::try_from_uri(&self.uri)
            .map(|q| q.0)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn toast(&self) -> Option<Toast> {
        Toast::from_uri(&self.uri)
    }

    /// A captured route parameter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the route did not capture it.
    pub fn param(&self, name: &str) -> Result<&str, AppError> {
        self.params
            .get(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::NotFound(format!("missing route parameter {name}")))
    }

    /// Local link that keeps a shop's `?tenant=` on local hosts.
    #[must_use]
    pub fn href(&self, path: &str) -> String {
        match self.tenant.shop_tenant() {
            Some(token) if self.tenant.local => with_param(path, "tenant", token.as_str()),
            _ => path.to_string(),
        }
    }

    #[must_use]
    pub fn redirect(&self, path: &str) -> Response {
        Redirect::to(&self.href(path)).into_response()
    }

    /// Redirect with a success toast.
    #[must_use]
    pub fn success(&self, path: &str, message: &str) -> Response {
        Redirect::to(&with_param(&self.href(path), "success", message)).into_response()
    }

    /// Redirect with an error toast.
    #[must_use]
    pub fn failure(&self, path: &str, message: &str) -> Response {
        Redirect::to(&with_param(&self.href(path), "error", message)).into_response()
    }

    /// Turn an action's outcome into a toast redirect.
    ///
    /// Expired sessions still propagate so the visitor is sent to log in.
    ///
    /// # Errors
    ///
    /// Returns the error only when it means the visitor must sign in.
    pub fn finish(&self, path: &str, outcome: Result<String, AppError>) -> Result<Response, AppError> {
        match outcome {
            Ok(message) => {
                add_breadcrumb("action", &message);
                Ok(self.success(path, &message))
            }
            Err(err) if err.is_unauthorized() => Err(err),
            Err(err) => {
                warn!(error = %err, screen = %self.screen, "Action failed");
                Ok(self.failure(path, &err.user_message()))
            }
        }
    }

    /// Store settings for shop screens.
    ///
    /// # Errors
    ///
    /// Fails outside shop mode.
    pub fn shop_settings(&self) -> Result<&StoreSettings, AppError> {
        self.settings
            .as_deref()
            .ok_or_else(|| AppError::Internal("store settings not loaded".to_string()))
    }

    /// Tenant of the shop being browsed.
    ///
    /// # Errors
    ///
    /// Fails outside shop mode.
    pub fn shop_tenant(&self) -> Result<&TenantToken, AppError> {
        self.tenant
            .shop_tenant()
            .ok_or_else(|| AppError::Internal("no shop tenant".to_string()))
    }

    /// Store settings for dashboard screens, read through the cache.
    ///
    /// # Errors
    ///
    /// Returns the API error if the settings cannot be loaded.
    pub async fn store_settings(&self) -> Result<Arc<StoreSettings>, AppError> {
        if let Some(settings) = &self.settings {
            return Ok(Arc::clone(settings));
        }
        Ok(self.state.settings().settings(&self.api).await?)
    }

    /// Publish a change for the tenant the dashboard manages.
    pub async fn publish(&self, event: impl FnOnce(TenantToken) -> StoreEvent) {
        match self.api.tenant() {
            Some(tenant) => {
                self.state.settings().publish(event(tenant.clone())).await;
            }
            None => debug!("No tenant to publish for"),
        }
    }

    /// Require the super-admin role.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] for anyone else.
    pub fn require_super_admin(&self) -> Result<&CurrentUser, AppError> {
        self.user
            .as_ref()
            .filter(|user| user.is_super_admin())
            .ok_or_else(|| AppError::Forbidden("Super admin access required".to_string()))
    }
}

/// Keep a successful load, or log the failure and fall back to a default
/// with a message for the page. Expired sessions still propagate.
///
/// # Errors
///
/// Returns the error when the API rejects the session.
pub fn recover<T: Default>(
    result: Result<T, ApiError>,
    what: &str,
) -> Result<(T, Option<String>), AppError> {
    match result {
        Ok(value) => Ok((value, None)),
        Err(ApiError::Unauthorized) => Err(AppError::Api(ApiError::Unauthorized)),
        Err(err) => {
            tracing::error!(error = %err, "Failed to load {what}");
            Ok((T::default(), Some(format!("Could not load {what}: {}", err.user_message()))))
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Resolve the tenant's route table and run the matched screen.
async fn dispatch(State(state): State<AppState>, session: Session, request: Request) -> Response {
    let login_url = state.config().login_url.clone();
    match dispatch_inner(state, session, request).await {
        Ok(response) => response,
        Err(err) if err.is_unauthorized() => {
            debug!("Redirecting to login");
            Redirect::to(&login_url).into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[instrument(skip_all, fields(mode = tracing::field::Empty, screen = tracing::field::Empty))]
async fn dispatch_inner(
    state: AppState,
    session: Session,
    request: Request,
) -> Result<Response, AppError> {
    let tenant = request
        .extensions()
        .get::<TenantContext>()
        .cloned()
        .ok_or_else(|| AppError::Internal("tenant context missing".to_string()))?;
    tracing::Span::current().record("mode", tenant.mode.as_str());

    let cookie = request.headers().get(COOKIE).cloned();
    let mut api = state.api().scoped(tenant.shop_tenant(), cookie);
    let mut user = None;
    let mut settings = None;

    let under_construction = match tenant.mode {
        Mode::Shop => {
            let loaded = state.settings().settings(&api).await.map_err(|err| match err {
                ApiError::NotFound(_) => AppError::NotFound(format!(
                    "store {}",
                    tenant.token.as_ref().map_or("", TenantToken::as_str)
                )),
                other => AppError::Api(other),
            })?;
            let flag = loaded.under_construction;
            settings = Some(loaded);
            flag
        }
        Mode::Dashboard => {
            let current = api.current_user().await?;
            api = api.for_tenant(dashboard_tenant(&current).as_ref());
            set_sentry_user(current.id.as_str(), Some(&current.email));
            user = Some(current);
            false
        }
        Mode::LocalFallback => {
            // Signing in is optional on local hosts.
            if let Ok(current) = api.current_user().await {
                api = api.for_tenant(dashboard_tenant(&current).as_ref());
                user = Some(current);
            }
            false
        }
        Mode::Landing => false,
    };

    let table = RouteTable::build(tenant.mode, under_construction, &state.config().dashboard_url);
    let resolution = table
        .resolve(request.uri().path())
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    let (screens, params) = match resolution {
        Resolution::Render { screens, params } => (screens, params),
        Resolution::Redirect(to) => {
            let location = match tenant.shop_tenant() {
                Some(token) if tenant.local => with_param(&to, "tenant", token.as_str()),
                _ => to,
            };
            return Ok(Redirect::to(&location).into_response());
        }
        Resolution::External(url) => return Ok(Redirect::to(&url).into_response()),
    };
    let screen = screens
        .last()
        .copied()
        .ok_or_else(|| AppError::Internal("empty screen chain".to_string()))?;
    tracing::Span::current().record("screen", screen.as_str());

    let method = request.method().clone();
    let ctx = Ctx {
        state,
        tenant,
        api,
        session,
        table,
        screen,
        params,
        uri: request.uri().clone(),
        user,
        settings,
    };

    match method {
        Method::GET | Method::HEAD => render(ctx).await,
        Method::POST => {
            let form = UploadedForm::from_request(request).await?;
            act(ctx, form).await
        }
        _ => Ok(StatusCode::METHOD_NOT_ALLOWED.into_response()),
    }
}

/// Tenant a dashboard user manages.
fn dashboard_tenant(user: &CurrentUser) -> Option<TenantToken> {
    user.tenant
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(TenantToken::new)
}

async fn render(ctx: Ctx) -> Result<Response, AppError> {
    match ctx.screen {
        Screen::Landing => landing::page(ctx),

        Screen::DashboardHome => dashboard::home::page(ctx).await,
        Screen::Users => dashboard::users::page(ctx).await,
        Screen::Customers => dashboard::customers::page(ctx).await,
        Screen::CustomerOrders => dashboard::customers::detail(ctx).await,
        Screen::Products => dashboard::products::page(ctx).await,
        Screen::Categories => dashboard::categories::page(ctx).await,
        Screen::Orders => dashboard::orders::page(ctx).await,
        Screen::Themes => dashboard::themes::page(ctx).await,
        Screen::BulkUpload => dashboard::bulk_upload::page(ctx),
        Screen::StoreSettings => dashboard::settings::page(ctx).await,
        Screen::Pages => dashboard::pages::page(ctx).await,
        Screen::PageBuilder => dashboard::pages::builder(ctx).await,
        Screen::SuperAdminTenants => dashboard::super_admin::page(ctx).await,
        Screen::SuperAdminTenant => dashboard::super_admin::detail(ctx).await,

        Screen::ProductList => shop::catalog::page(ctx).await,
        Screen::ProductDetail => shop::catalog::product(ctx).await,
        Screen::CategoryListing => shop::catalog::category(ctx).await,
        Screen::Checkout => shop::checkout::page(ctx).await,
        Screen::Wishlist => shop::wishlist::page(ctx).await,
        Screen::UnderConstruction => shop::construction::page(ctx),

        Screen::DashboardShell | Screen::LocalShell => {
            Err(AppError::NotFound("layout has no page of its own".to_string()))
        }
    }
}

async fn act(ctx: Ctx, form: UploadedForm) -> Result<Response, AppError> {
    match ctx.screen {
        Screen::Users => dashboard::users::action(ctx, form).await,
        Screen::Customers => dashboard::customers::action(ctx, form).await,
        Screen::Products => dashboard::products::action(ctx, form).await,
        Screen::Categories => dashboard::categories::action(ctx, form).await,
        Screen::Orders => dashboard::orders::action(ctx, form).await,
        Screen::Themes => dashboard::themes::action(ctx, form).await,
        Screen::BulkUpload => dashboard::bulk_upload::action(ctx, form).await,
        Screen::StoreSettings => dashboard::settings::action(ctx, form).await,
        Screen::Pages => dashboard::pages::action(ctx, form).await,
        Screen::PageBuilder => dashboard::pages::builder_action(ctx, form).await,
        Screen::SuperAdminTenants | Screen::SuperAdminTenant => {
            dashboard::super_admin::action(ctx, form).await
        }

        Screen::ProductDetail => shop::catalog::product_action(ctx, form).await,
        Screen::Checkout => shop::checkout::action(ctx, form).await,
        Screen::Wishlist => shop::wishlist::action(ctx, form).await,

        Screen::Landing
        | Screen::DashboardShell
        | Screen::DashboardHome
        | Screen::CustomerOrders
        | Screen::LocalShell
        | Screen::ProductList
        | Screen::CategoryListing
        | Screen::UnderConstruction => Ok(StatusCode::METHOD_NOT_ALLOWED.into_response()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_with_param() {
        assert_eq!(with_param("/", "success", "Saved!"), "/?success=Saved%21");
        assert_eq!(
            with_param("/?tenant=acme", "error", "Bad input"),
            "/?tenant=acme&error=Bad%20input"
        );
    }

    #[test]
    fn test_toast_prefers_error() {
        let uri: Uri = "/products?success=ok&error=nope".parse().unwrap();
        assert_eq!(
            Toast::from_uri(&uri),
            Some(Toast {
                kind: "error",
                message: "nope".to_string()
            })
        );

        let uri: Uri = "/products?success=Saved".parse().unwrap();
        assert_eq!(Toast::from_uri(&uri).unwrap().kind, "success");

        let uri: Uri = "/products".parse().unwrap();
        assert!(Toast::from_uri(&uri).is_none());
    }

    #[test]
    fn test_recover_keeps_unauthorized() {
        let result: Result<Vec<u8>, ApiError> = Err(ApiError::Unauthorized);
        assert!(recover(result, "products").is_err());

        let result: Result<Vec<u8>, ApiError> = Err(ApiError::Status {
            status: 503,
            message: "down".to_string(),
        });
        let (items, message) = recover(result, "products").unwrap();
        assert!(items.is_empty());
        assert!(message.unwrap().starts_with("Could not load products"));
    }
}
