//! Route tables per mode and path resolution.

use core::fmt;

use serde::Serialize;
use thiserror::Error;

use super::pattern::{PathPattern, RouteParams};
use super::screen::Screen;
use crate::tenant::Mode;

const INDEX_BONUS: i32 = 2;

/// What a route does when it matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RouteTarget {
    /// Render a screen.
    Screen(Screen),
    /// Redirect to another path on the same host.
    Redirect(String),
    /// Redirect to an absolute URL on another host.
    External(String),
}

/// A node of the route tree. Children are relative to their parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteNode {
    pub pattern: PathPattern,
    pub index: bool,
    pub target: RouteTarget,
    pub children: Vec<RouteNode>,
}

impl RouteNode {
    /// Route rendering a screen.
    #[must_use]
    pub fn screen(path: &str, screen: Screen) -> Self {
        Self {
            pattern: PathPattern::parse(path),
            index: false,
            target: RouteTarget::Screen(screen),
            children: Vec::new(),
        }
    }

    /// Index route: renders when the parent's path matches exactly.
    #[must_use]
    pub fn index(screen: Screen) -> Self {
        Self {
            pattern: PathPattern::default(),
            index: true,
            target: RouteTarget::Screen(screen),
            children: Vec::new(),
        }
    }

    /// Route redirecting to a local path.
    #[must_use]
    pub fn redirect(path: &str, to: &str) -> Self {
        Self {
            pattern: PathPattern::parse(path),
            index: false,
            target: RouteTarget::Redirect(to.to_string()),
            children: Vec::new(),
        }
    }

    /// Route redirecting to another origin.
    #[must_use]
    pub fn external(path: &str, url: &str) -> Self {
        Self {
            pattern: PathPattern::parse(path),
            index: false,
            target: RouteTarget::External(url.to_string()),
            children: Vec::new(),
        }
    }

    /// Attach nested child routes.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }
}

/// Result of resolving a path against a [`RouteTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Resolution {
    /// Render these screens, outermost shell first.
    Render {
        screens: Vec<Screen>,
        params: RouteParams,
    },
    /// Redirect within the current host.
    Redirect(String),
    /// Redirect to an absolute URL.
    External(String),
}

impl Resolution {
    /// The innermost screen of a render resolution.
    #[must_use]
    pub fn leaf(&self) -> Option<Screen> {
        match self {
            Self::Render { screens, .. } => screens.last().copied(),
            Self::Redirect(_) | Self::External(_) => None,
        }
    }

    /// Whether any screen in the chain is `screen`.
    #[must_use]
    pub fn renders(&self, screen: Screen) -> bool {
        matches!(self, Self::Render { screens, .. } if screens.contains(&screen))
    }
}

/// Errors from path resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No branch of the table matched.
    #[error("no route matches {path} in {mode} mode")]
    NoMatch { path: String, mode: Mode },
}

/// The route tree for one mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTable {
    mode: Mode,
    under_construction: bool,
    routes: Vec<RouteNode>,
}

/// A flattened root-to-leaf path through the tree.
struct Branch<'a> {
    pattern: PathPattern,
    index: bool,
    chain: Vec<&'a RouteTarget>,
}

impl Branch<'_> {
    fn score(&self) -> i32 {
        self.pattern.score() + if self.index { INDEX_BONUS } else { 0 }
    }
}

impl RouteTable {
    /// Build the table for a mode.
    ///
    /// `under_construction` only affects [`Mode::Shop`]. `dashboard_url`
    /// is the absolute origin the landing site sends `/dashboard/*` to.
    #[must_use]
    pub fn build(mode: Mode, under_construction: bool, dashboard_url: &str) -> Self {
        let routes = match mode {
            Mode::Landing => landing_routes(dashboard_url),
            Mode::Dashboard => dashboard_routes(),
            Mode::Shop if under_construction => construction_routes(),
            Mode::Shop => shop_routes(),
            Mode::LocalFallback => local_routes(),
        };

        Self {
            mode,
            under_construction,
            routes,
        }
    }

    /// The mode this table was built for.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Top-level routes.
    #[must_use]
    pub fn routes(&self) -> &[RouteNode] {
        &self.routes
    }

    /// Whether any route in the tree renders `screen`.
    #[must_use]
    pub fn contains_screen(&self, screen: Screen) -> bool {
        fn walk(nodes: &[RouteNode], screen: Screen) -> bool {
            nodes.iter().any(|node| {
                node.target == RouteTarget::Screen(screen) || walk(&node.children, screen)
            })
        }
        walk(&self.routes, screen)
    }

    /// Resolve a request path to screens or a redirect.
    ///
    /// The most specific matching branch wins; ties go to the branch
    /// declared first.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NoMatch`] if no branch matches. Tables built by
    /// [`RouteTable::build`] end with a catch-all, so this indicates a table
    /// constructed by hand without one.
    pub fn resolve(&self, path: &str) -> Result<Resolution, RouteError> {
        let mut branches = Vec::new();
        for node in &self.routes {
            flatten(node, &PathPattern::default(), &[], &mut branches);
        }

        let mut best: Option<(i32, &Branch<'_>, RouteParams)> = None;
        for branch in &branches {
            let Some(params) = branch.pattern.matches(path) else {
                continue;
            };
            let score = branch.score();
            if best.as_ref().is_none_or(|(top, _, _)| score > *top) {
                best = Some((score, branch, params));
            }
        }

        let Some((_, branch, params)) = best else {
            return Err(RouteError::NoMatch {
                path: path.to_string(),
                mode: self.mode,
            });
        };

        match branch.chain.last() {
            Some(RouteTarget::Redirect(to)) => Ok(Resolution::Redirect(to.clone())),
            Some(RouteTarget::External(url)) => Ok(Resolution::External(url.clone())),
            _ => {
                let screens = branch
                    .chain
                    .iter()
                    .filter_map(|target| match target {
                        RouteTarget::Screen(screen) => Some(*screen),
                        RouteTarget::Redirect(_) | RouteTarget::External(_) => None,
                    })
                    .collect();
                Ok(Resolution::Render { screens, params })
            }
        }
    }
}

fn flatten<'a>(
    node: &'a RouteNode,
    prefix: &PathPattern,
    parents: &[&'a RouteTarget],
    out: &mut Vec<Branch<'a>>,
) {
    let pattern = prefix.join(&node.pattern);
    let mut chain = parents.to_vec();
    chain.push(&node.target);

    if node.children.is_empty() {
        out.push(Branch {
            pattern,
            index: node.index,
            chain,
        });
        return;
    }

    for child in &node.children {
        flatten(child, &pattern, &chain, out);
    }
}

impl fmt::Display for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(f: &mut fmt::Formatter<'_>, node: &RouteNode, depth: usize) -> fmt::Result {
            let indent = "  ".repeat(depth);
            let path = if node.index {
                "(index)".to_string()
            } else if depth > 0 {
                node.pattern.to_string().trim_start_matches('/').to_string()
            } else {
                node.pattern.to_string()
            };
            match &node.target {
                RouteTarget::Screen(screen) => writeln!(f, "{indent}{path} -> {screen}")?,
                RouteTarget::Redirect(to) => writeln!(f, "{indent}{path} -> redirect {to}")?,
                RouteTarget::External(url) => writeln!(f, "{indent}{path} -> external {url}")?,
            }
            for child in &node.children {
                write_node(f, child, depth + 1)?;
            }
            Ok(())
        }

        writeln!(
            f,
            "# mode: {}{}",
            self.mode,
            if self.mode == Mode::Shop && self.under_construction {
                " (under construction)"
            } else {
                ""
            }
        )?;
        for node in &self.routes {
            write_node(f, node, 0)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tables
// =============================================================================

fn landing_routes(dashboard_url: &str) -> Vec<RouteNode> {
    vec![
        RouteNode::screen("/", Screen::Landing),
        RouteNode::external("/dashboard/*", dashboard_url),
        RouteNode::redirect("*", "/"),
    ]
}

fn dashboard_routes() -> Vec<RouteNode> {
    vec![
        RouteNode::screen("/", Screen::DashboardShell).with_children(vec![
            RouteNode::index(Screen::DashboardHome),
            RouteNode::screen("users", Screen::Users),
            RouteNode::screen("customers", Screen::Customers),
            RouteNode::screen("customers/:customerId", Screen::CustomerOrders),
            RouteNode::screen("products", Screen::Products),
            RouteNode::screen("categories", Screen::Categories),
            RouteNode::screen("orders", Screen::Orders),
            RouteNode::screen("themes", Screen::Themes),
            RouteNode::screen("bulk-upload", Screen::BulkUpload),
            RouteNode::screen("store-settings", Screen::StoreSettings),
            RouteNode::screen("pages", Screen::Pages),
            RouteNode::screen("page-builder/:pageId", Screen::PageBuilder),
            RouteNode::screen("super-admin", Screen::SuperAdminTenants),
            RouteNode::screen("super-admin/tenants/:tenantId", Screen::SuperAdminTenant),
        ]),
        RouteNode::redirect("/dashboard/*", "/"),
        RouteNode::redirect("*", "/"),
    ]
}

fn construction_routes() -> Vec<RouteNode> {
    vec![RouteNode::screen("*", Screen::UnderConstruction)]
}

fn shop_routes() -> Vec<RouteNode> {
    vec![
        RouteNode::screen("/", Screen::ProductList),
        RouteNode::screen("/:slug", Screen::ProductList),
        RouteNode::screen("/product/:id", Screen::ProductDetail),
        RouteNode::screen("/category/:id", Screen::CategoryListing),
        RouteNode::screen("/checkout", Screen::Checkout),
        RouteNode::screen("/wishlist", Screen::Wishlist),
        RouteNode::redirect("*", "/"),
    ]
}

fn local_routes() -> Vec<RouteNode> {
    vec![
        RouteNode::screen("/", Screen::LocalShell).with_children(vec![
            RouteNode::index(Screen::DashboardHome),
            RouteNode::screen("products", Screen::Products),
            RouteNode::redirect("*", "/"),
        ]),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DASHBOARD_URL: &str = "https://app.nepostore.xyz";

    fn table(mode: Mode, under_construction: bool) -> RouteTable {
        RouteTable::build(mode, under_construction, DASHBOARD_URL)
    }

    fn leaf(table: &RouteTable, path: &str) -> Option<Screen> {
        table.resolve(path).unwrap().leaf()
    }

    #[test]
    fn test_landing_routes() {
        let t = table(Mode::Landing, false);
        assert_eq!(leaf(&t, "/"), Some(Screen::Landing));
        assert_eq!(
            t.resolve("/dashboard/products").unwrap(),
            Resolution::External(DASHBOARD_URL.to_string())
        );
        assert_eq!(t.resolve("/pricing").unwrap(), Resolution::Redirect("/".into()));
    }

    #[test]
    fn test_landing_never_renders_dashboard_ui() {
        let t = table(Mode::Landing, false);
        assert!(!t.contains_screen(Screen::DashboardShell));
        for path in ["/dashboard", "/dashboard/", "/dashboard/products", "/dashboard/a/b"] {
            let resolution = t.resolve(path).unwrap();
            assert!(matches!(resolution, Resolution::External(_)), "{path}");
        }
    }

    #[test]
    fn test_dashboard_children_render_inside_shell() {
        let t = table(Mode::Dashboard, false);
        let resolution = t.resolve("/products").unwrap();
        assert_eq!(
            resolution,
            Resolution::Render {
                screens: vec![Screen::DashboardShell, Screen::Products],
                params: RouteParams::default(),
            }
        );
        assert_eq!(leaf(&t, "/"), Some(Screen::DashboardHome));
        assert_eq!(leaf(&t, "/bulk-upload"), Some(Screen::BulkUpload));
        assert_eq!(leaf(&t, "/store-settings"), Some(Screen::StoreSettings));
    }

    #[test]
    fn test_dashboard_params() {
        let t = table(Mode::Dashboard, false);
        let Resolution::Render { screens, params } = t.resolve("/customers/c-42").unwrap() else {
            panic!("expected render");
        };
        assert_eq!(screens.last(), Some(&Screen::CustomerOrders));
        assert_eq!(params.get("customerId"), Some("c-42"));

        let resolution = t.resolve("/page-builder/p1").unwrap();
        assert_eq!(resolution.leaf(), Some(Screen::PageBuilder));

        let resolution = t.resolve("/super-admin/tenants/t9").unwrap();
        assert_eq!(resolution.leaf(), Some(Screen::SuperAdminTenant));
    }

    #[test]
    fn test_dashboard_redirects() {
        let t = table(Mode::Dashboard, false);
        assert_eq!(t.resolve("/dashboard/orders").unwrap(), Resolution::Redirect("/".into()));
        assert_eq!(t.resolve("/nowhere").unwrap(), Resolution::Redirect("/".into()));
    }

    #[test]
    fn test_shop_routes() {
        let t = table(Mode::Shop, false);
        assert_eq!(leaf(&t, "/"), Some(Screen::ProductList));
        assert_eq!(leaf(&t, "/summer-sale"), Some(Screen::ProductList));
        assert_eq!(leaf(&t, "/product/123"), Some(Screen::ProductDetail));
        assert_eq!(leaf(&t, "/category/shoes"), Some(Screen::CategoryListing));
        assert_eq!(leaf(&t, "/wishlist"), Some(Screen::Wishlist));
        assert_eq!(t.resolve("/a/b/c").unwrap(), Resolution::Redirect("/".into()));
    }

    #[test]
    fn test_static_segment_beats_slug() {
        let t = table(Mode::Shop, false);
        assert_eq!(leaf(&t, "/checkout"), Some(Screen::Checkout));
    }

    #[test]
    fn test_under_construction_renders_everywhere() {
        let t = table(Mode::Shop, true);
        for path in ["/", "/product/123", "/checkout", "/category/x", "/a/b/c"] {
            assert_eq!(leaf(&t, path), Some(Screen::UnderConstruction), "{path}");
        }
        assert!(!t.contains_screen(Screen::ProductDetail));
    }

    #[test]
    fn test_under_construction_ignored_outside_shop() {
        assert_eq!(table(Mode::Dashboard, true), table(Mode::Dashboard, true));
        assert_eq!(leaf(&table(Mode::Dashboard, true), "/"), Some(Screen::DashboardHome));
    }

    #[test]
    fn test_local_fallback() {
        let t = table(Mode::LocalFallback, false);
        assert_eq!(leaf(&t, "/"), Some(Screen::DashboardHome));
        assert_eq!(leaf(&t, "/products"), Some(Screen::Products));
        assert_eq!(t.resolve("/orders").unwrap(), Resolution::Redirect("/".into()));
        assert!(t.resolve("/products").unwrap().renders(Screen::LocalShell));
    }

    #[test]
    fn test_build_is_idempotent() {
        for mode in [Mode::Landing, Mode::Dashboard, Mode::Shop, Mode::LocalFallback] {
            for under_construction in [false, true] {
                assert_eq!(table(mode, under_construction), table(mode, under_construction));
            }
        }
    }

    #[test]
    fn test_every_mode_resolves_every_path() {
        for mode in [Mode::Landing, Mode::Dashboard, Mode::Shop, Mode::LocalFallback] {
            let t = table(mode, false);
            for path in ["/", "/x", "/x/y", "/dashboard/z", "/product/1"] {
                assert!(t.resolve(path).is_ok(), "{mode} {path}");
            }
        }
    }

    #[test]
    fn test_hand_built_table_without_catch_all() {
        let t = RouteTable {
            mode: Mode::Shop,
            under_construction: false,
            routes: vec![RouteNode::screen("/", Screen::ProductList)],
        };
        assert!(matches!(t.resolve("/x"), Err(RouteError::NoMatch { .. })));
    }

    #[test]
    fn test_display_tree() {
        let rendered = table(Mode::Dashboard, false).to_string();
        assert!(rendered.starts_with("# mode: dashboard"));
        assert!(rendered.contains("  (index) -> dashboard_home"));
        assert!(rendered.contains("  customers/:customerId -> customer_orders"));
        assert!(rendered.contains("/dashboard/* -> redirect /"));
    }
}
