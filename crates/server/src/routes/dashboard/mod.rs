//! Admin dashboard and super-admin console screens.
//!
//! Every screen renders inside the dashboard layout. The navigation lists
//! only the screens the current route table mounts, so the local fallback
//! shell shows its reduced menu and the super-admin entries appear only
//! for super admins.

pub mod bulk_upload;
pub mod categories;
pub mod customers;
pub mod home;
pub mod orders;
pub mod pages;
pub mod products;
pub mod settings;
pub mod super_admin;
pub mod themes;
pub mod users;

use chrono::{DateTime, Utc};
use nepostore_core::routing::Screen;
use nepostore_core::tenant::Mode;

use super::{Ctx, Toast};

/// Entries of the sidebar, in display order.
const NAV: &[(Screen, &str, &str)] = &[
    (Screen::DashboardHome, "/", "Home"),
    (Screen::Products, "/products", "Products"),
    (Screen::Categories, "/categories", "Categories"),
    (Screen::Orders, "/orders", "Orders"),
    (Screen::Customers, "/customers", "Customers"),
    (Screen::Users, "/users", "Users"),
    (Screen::Themes, "/themes", "Themes"),
    (Screen::Pages, "/pages", "Pages"),
    (Screen::BulkUpload, "/bulk-upload", "Bulk upload"),
    (Screen::StoreSettings, "/store-settings", "Store settings"),
    (Screen::SuperAdminTenants, "/super-admin", "Super admin"),
];

#[derive(Debug, Clone)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
    pub active: bool,
}

/// Layout data shared by every dashboard page.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub title: String,
    /// Store the dashboard manages.
    pub store_label: String,
    pub user_name: String,
    pub initials: String,
    pub nav: Vec<NavItem>,
    pub toast: Option<Toast>,
    /// Banner for data that failed to load.
    pub notice: Option<String>,
    pub local: bool,
}

impl Chrome {
    #[must_use]
    pub fn new(ctx: &Ctx, title: &str) -> Self {
        let super_admin = ctx.user.as_ref().is_some_and(|u| u.is_super_admin());
        let section = section_of(ctx.screen);
        let nav = NAV
            .iter()
            .filter(|(screen, _, _)| ctx.table.contains_screen(*screen))
            .filter(|(screen, _, _)| super_admin || *screen != Screen::SuperAdminTenants)
            .map(|(screen, href, label)| NavItem {
                label: *label,
                href: *href,
                active: *screen == section,
            })
            .collect();

        Self {
            title: title.to_string(),
            store_label: ctx
                .api
                .tenant()
                .map_or_else(|| "No store".to_string(), ToString::to_string),
            user_name: ctx
                .user
                .as_ref()
                .map_or_else(|| "Guest".to_string(), |u| u.name.clone()),
            initials: ctx.user.as_ref().map(|u| u.initials()).unwrap_or_default(),
            nav,
            toast: ctx.toast(),
            notice: None,
            local: ctx.tenant.mode == Mode::LocalFallback,
        }
    }

    /// Add a load-failure banner.
    #[must_use]
    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }
}

/// Sidebar entry a screen belongs to.
const fn section_of(screen: Screen) -> Screen {
    match screen {
        Screen::CustomerOrders => Screen::Customers,
        Screen::PageBuilder => Screen::Pages,
        Screen::SuperAdminTenant => Screen::SuperAdminTenants,
        other => other,
    }
}

/// Date for tables, `-` when unknown.
pub(crate) fn short_date(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), |at| at.format("%b %-d, %Y").to_string())
}

/// First non-empty of several messages.
pub(crate) fn first_notice(notices: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    notices.into_iter().flatten().next()
}
