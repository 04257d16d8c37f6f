//! Screens a route can render.

use core::fmt;

use serde::Serialize;

/// Every renderable screen across the three shells.
///
/// Shell variants are layouts that wrap a child screen; the rest are leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    // Landing
    Landing,

    // Dashboard
    DashboardShell,
    DashboardHome,
    Users,
    Customers,
    CustomerOrders,
    Products,
    Categories,
    Orders,
    Themes,
    BulkUpload,
    StoreSettings,
    Pages,
    PageBuilder,
    SuperAdminTenants,
    SuperAdminTenant,

    // Local development
    LocalShell,

    // Storefront
    ProductList,
    ProductDetail,
    CategoryListing,
    Checkout,
    Wishlist,
    UnderConstruction,
}

impl Screen {
    /// Whether this screen is a layout wrapping child screens.
    #[must_use]
    pub const fn is_shell(&self) -> bool {
        matches!(self, Self::DashboardShell | Self::LocalShell)
    }

    /// Stable snake_case name for logs and CLI output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::DashboardShell => "dashboard_shell",
            Self::DashboardHome => "dashboard_home",
            Self::Users => "users",
            Self::Customers => "customers",
            Self::CustomerOrders => "customer_orders",
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Orders => "orders",
            Self::Themes => "themes",
            Self::BulkUpload => "bulk_upload",
            Self::StoreSettings => "store_settings",
            Self::Pages => "pages",
            Self::PageBuilder => "page_builder",
            Self::SuperAdminTenants => "super_admin_tenants",
            Self::SuperAdminTenant => "super_admin_tenant",
            Self::LocalShell => "local_shell",
            Self::ProductList => "product_list",
            Self::ProductDetail => "product_detail",
            Self::CategoryListing => "category_listing",
            Self::Checkout => "checkout",
            Self::Wishlist => "wishlist",
            Self::UnderConstruction => "under_construction",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
