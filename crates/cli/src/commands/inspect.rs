//! Tenant and route table inspection.
//!
//! Uses the same resolver and route tables as the server, so the output is
//! what a request with that host would get.

use nepostore_core::routing::{Resolution, RouteError, RouteTable};
use nepostore_core::tenant::{TenantContext, TenantResolver};

/// Resolve a host (and query string) with the given base domain label count.
#[must_use]
pub fn context(host: &str, query: &str, base_labels: usize) -> TenantContext {
    TenantResolver::new()
        .with_base_labels(base_labels)
        .resolve(host, query.trim_start_matches('?'))
}

/// Print the tenant and mode a host resolves to.
pub fn resolve(host: &str, query: &str, base_labels: usize) {
    let context = context(host, query, base_labels);
    tracing::info!("Host:   {}", context.hostname);
    tracing::info!(
        "Tenant: {}",
        context
            .token
            .as_ref()
            .map_or("(none)", |token| token.as_str())
    );
    tracing::info!("Mode:   {}", context.mode);
    tracing::info!("Local:  {}", context.local);
}

/// Describe how a path resolves against a table.
///
/// # Errors
///
/// Returns [`RouteError`] when the path matches nothing.
pub fn describe(table: &RouteTable, path: &str) -> Result<String, RouteError> {
    Ok(match table.resolve(path)? {
        Resolution::Render { screens, params } => {
            let chain = screens
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" > ");
            if params.is_empty() {
                format!("render {chain}")
            } else {
                format!("render {chain} {params:?}")
            }
        }
        Resolution::Redirect(to) => format!("redirect {to}"),
        Resolution::External(url) => format!("external {url}"),
    })
}

/// Print the route table a host gets, and optionally one path's resolution.
///
/// # Errors
///
/// Returns an error if `path` resolves to nothing.
pub fn routes(
    host: &str,
    query: &str,
    under_construction: bool,
    dashboard_url: &str,
    path: Option<&str>,
) -> Result<(), RouteError> {
    let context = context(host, query, nepostore_core::tenant::DEFAULT_BASE_LABELS);
    let table = RouteTable::build(context.mode, under_construction, dashboard_url);
    for line in table.to_string().lines() {
        tracing::info!("{line}");
    }

    if let Some(path) = path {
        tracing::info!("{path} => {}", describe(&table, path)?);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nepostore_core::tenant::Mode;

    use super::*;

    #[test]
    fn test_context_strips_leading_question_mark() {
        let context = context("localhost:3000", "?tenant=acme", 2);
        assert_eq!(context.mode, Mode::Shop);
        assert_eq!(context.token.unwrap().as_str(), "acme");
    }

    #[test]
    fn test_describe_static_beats_slug() {
        let table = RouteTable::build(Mode::Shop, false, "https://app.nepostore.xyz");
        assert_eq!(describe(&table, "/checkout").unwrap(), "render checkout");
        let about = describe(&table, "/about-us").unwrap();
        assert!(about.starts_with("render product_list"));
        assert!(about.contains("about-us"));
    }

    #[test]
    fn test_describe_landing_dashboard_is_external() {
        let table = RouteTable::build(Mode::Landing, false, "https://app.nepostore.xyz");
        assert!(describe(&table, "/dashboard/products").unwrap().starts_with("external https://app.nepostore.xyz"));
    }
}
