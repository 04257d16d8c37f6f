//! Tenant resolution from the request hostname.
//!
//! Every hostname served by the platform maps to exactly one [`Mode`]:
//!
//! ```text
//! nepostore.xyz            -> Landing        (no subdomain)
//! www.nepostore.xyz        -> Landing
//! app.nepostore.xyz        -> Dashboard
//! acme.nepostore.xyz       -> Shop("acme")
//! localhost?tenant=acme    -> Shop("acme")
//! localhost                -> LocalFallback
//! ```
//!
//! Parsing and classification are pure functions of `(hostname, query)`.

use core::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Query parameter that carries the tenant on local hosts.
pub const TENANT_QUERY_PARAM: &str = "tenant";

/// Number of labels in the platform's base domain (`nepostore.xyz`).
pub const DEFAULT_BASE_LABELS: usize = 2;

/// Subdomain reserved for the marketing site.
pub const LANDING_SUBDOMAIN: &str = "www";

/// Subdomain reserved for the admin dashboard.
pub const DASHBOARD_SUBDOMAIN: &str = "app";

/// A tenant identifier taken verbatim from the hostname or query string.
///
/// No normalization is applied: `Acme` and `acme` are different tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantToken(String);

impl TenantToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which application shell a request mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Marketing site on the bare or `www` domain.
    Landing,
    /// Admin dashboard on the `app` subdomain.
    Dashboard,
    /// A tenant's storefront.
    Shop,
    /// Reduced dashboard for local development without a tenant.
    LocalFallback,
}

impl Mode {
    /// Classify a token on a non-local host.
    ///
    /// Absent or `www` is the landing site, `app` is the dashboard, and any
    /// other token is a tenant storefront.
    #[must_use]
    pub fn classify(token: Option<&TenantToken>) -> Self {
        match token.map(TenantToken::as_str) {
            None | Some(LANDING_SUBDOMAIN) => Self::Landing,
            Some(DASHBOARD_SUBDOMAIN) => Self::Dashboard,
            Some(_) => Self::Shop,
        }
    }

    /// Stable name used in logs and CLI output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::Dashboard => "dashboard",
            Self::Shop => "shop",
            Self::LocalFallback => "local_fallback",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of resolving one request's host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    /// Hostname with any port removed.
    pub hostname: String,
    /// Tenant token, if one was found.
    pub token: Option<TenantToken>,
    /// Mode the request is served in.
    pub mode: Mode,
    /// Whether the hostname is a local development host.
    pub local: bool,
}

impl TenantContext {
    /// Token for shop requests; `None` in every other mode.
    #[must_use]
    pub fn shop_tenant(&self) -> Option<&TenantToken> {
        match self.mode {
            Mode::Shop => self.token.as_ref(),
            Mode::Landing | Mode::Dashboard | Mode::LocalFallback => None,
        }
    }
}

/// Parses hostnames into tenant tokens and modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantResolver {
    base_labels: usize,
    local_hosts: Vec<String>,
}

impl Default for TenantResolver {
    fn default() -> Self {
        Self {
            base_labels: DEFAULT_BASE_LABELS,
            local_hosts: vec!["localhost".to_string()],
        }
    }
}

impl TenantResolver {
    /// Resolver for a two-label base domain with `localhost` as the local host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a base domain with a different number of labels (e.g. 3 for `shop.example.co.uk`).
    #[must_use]
    pub fn with_base_labels(mut self, labels: usize) -> Self {
        self.base_labels = labels.max(1);
        self
    }

    /// Treat another hostname as a local development host.
    #[must_use]
    pub fn with_local_host(mut self, host: impl Into<String>) -> Self {
        self.local_hosts.push(host.into());
        self
    }

    /// Number of labels in the base domain.
    #[must_use]
    pub const fn base_labels(&self) -> usize {
        self.base_labels
    }

    /// Whether the hostname is a local host. IP literals count as local.
    #[must_use]
    pub fn is_local(&self, hostname: &str) -> bool {
        if self.local_hosts.iter().any(|h| h == hostname) {
            return true;
        }
        hostname
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok()
    }

    /// Extract the tenant token from a hostname and query string.
    ///
    /// `search` may include the leading `?`.
    #[must_use]
    pub fn parse_token(&self, hostname: &str, search: &str) -> Option<TenantToken> {
        if self.is_local(hostname) {
            return query_param(search, TENANT_QUERY_PARAM)
                .filter(|t| !t.is_empty())
                .map(TenantToken::new);
        }

        let labels: Vec<&str> = hostname.split('.').collect();
        if labels.len() > self.base_labels {
            labels
                .first()
                .filter(|label| !label.is_empty())
                .map(|label| TenantToken::new(*label))
        } else {
            None
        }
    }

    /// Resolve a `Host` header value (port allowed) and query string.
    #[must_use]
    pub fn resolve(&self, host: &str, search: &str) -> TenantContext {
        let hostname = strip_port(host);
        let local = self.is_local(hostname);
        let token = self.parse_token(hostname, search);

        let mode = if local && token.is_none() {
            Mode::LocalFallback
        } else {
            Mode::classify(token.as_ref())
        };

        TenantContext {
            hostname: hostname.to_string(),
            token,
            mode,
            local,
        }
    }
}

/// Remove a trailing `:port` from a host, keeping bracketed IPv6 literals intact.
#[must_use]
pub fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

/// Look up the first value of a query parameter.
#[must_use]
pub fn query_param(search: &str, name: &str) -> Option<String> {
    let search = search.strip_prefix('?').unwrap_or(search);
    url::form_urlencoded::parse(search.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
