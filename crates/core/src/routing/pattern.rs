//! Path patterns with static, parameter and wildcard segments.

use core::fmt;
use std::collections::BTreeMap;

use serde::Serialize;

const STATIC_SCORE: i32 = 10;
const PARAM_SCORE: i32 = 3;
const WILDCARD_PENALTY: i32 = -2;

/// Name under which a wildcard's remainder is captured.
pub const WILDCARD_PARAM: &str = "*";

/// One segment of a [`PathPattern`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Segment {
    /// Matches exactly this text.
    Static(String),
    /// `:name`, matches any single non-empty segment.
    Param(String),
    /// `*`, matches the rest of the path (possibly nothing).
    Wildcard,
}

/// A parsed route path such as `/product/:id` or `/dashboard/*`.
///
/// Leading and trailing slashes are not significant; `""` and `"/"` both
/// parse to the empty pattern, which matches only the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern. A `*` segment ends the pattern.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let mut segments = Vec::new();
        for part in pattern.split('/').filter(|p| !p.is_empty()) {
            if part == "*" {
                segments.push(Segment::Wildcard);
                break;
            }
            match part.strip_prefix(':') {
                Some(name) => segments.push(Segment::Param(name.to_string())),
                None => segments.push(Segment::Static(part.to_string())),
            }
        }
        Self { segments }
    }

    /// The parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the pattern is the bare root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenate a child pattern onto this one.
    #[must_use]
    pub fn join(&self, child: &Self) -> Self {
        if matches!(self.segments.last(), Some(Segment::Wildcard)) {
            return self.clone();
        }
        let mut segments = self.segments.clone();
        segments.extend(child.segments.iter().cloned());
        Self { segments }
    }

    /// Specificity score. Static segments outrank parameters, which
    /// outrank wildcards.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Static(_) => STATIC_SCORE,
                Segment::Param(_) => PARAM_SCORE,
                Segment::Wildcard => WILDCARD_PENALTY,
            })
            .sum()
    }

    /// Match a request path, capturing parameters.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let mut params = RouteParams::default();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Wildcard => {
                    let rest = parts.get(index..).map(|rest| rest.join("/"));
                    params.insert(WILDCARD_PARAM, rest.unwrap_or_default());
                    return Some(params);
                }
                Segment::Static(expected) => {
                    if parts.get(index) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(index)?;
                    params.insert(name, *value);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Static(s) => write!(f, "/{s}")?,
                Segment::Param(name) => write!(f, "/:{name}")?,
                Segment::Wildcard => f.write_str("/*")?,
            }
        }
        Ok(())
    }
}

/// Parameters captured while matching a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    /// Look up a captured parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Record a captured parameter.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), value.into());
    }

    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!(PathPattern::parse("/product/:id").to_string(), "/product/:id");
        assert_eq!(PathPattern::parse("").to_string(), "/");
        assert_eq!(PathPattern::parse("/").to_string(), "/");
        assert_eq!(PathPattern::parse("dashboard/*/ignored").to_string(), "/dashboard/*");
    }

    #[test]
    fn test_root_matches_only_root() {
        let root = PathPattern::parse("/");
        assert!(root.matches("/").is_some());
        assert!(root.matches("").is_some());
        assert!(root.matches("/anything").is_none());
    }

    #[test]
    fn test_param_capture() {
        let params = PathPattern::parse("/product/:id").matches("/product/123").unwrap();
        assert_eq!(params.get("id"), Some("123"));
        assert!(PathPattern::parse("/product/:id").matches("/product").is_none());
        assert!(PathPattern::parse("/product/:id").matches("/product/1/2").is_none());
    }

    #[test]
    fn test_wildcard_matches_rest() {
        let pattern = PathPattern::parse("/dashboard/*");
        assert_eq!(
            pattern.matches("/dashboard/products/5").unwrap().get(WILDCARD_PARAM),
            Some("products/5")
        );
        assert_eq!(
            pattern.matches("/dashboard").unwrap().get(WILDCARD_PARAM),
            Some("")
        );
        assert!(pattern.matches("/dash").is_none());
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        assert!(PathPattern::parse("/checkout").matches("/checkout/").is_some());
    }

    #[test]
    fn test_join_and_score() {
        let shell = PathPattern::parse("/");
        let child = PathPattern::parse("customers/:customerId");
        let joined = shell.join(&child);
        assert_eq!(joined.to_string(), "/customers/:customerId");
        assert_eq!(joined.score(), STATIC_SCORE + PARAM_SCORE);
        assert!(PathPattern::parse("/checkout").score() > PathPattern::parse("/:slug").score());
        assert!(PathPattern::parse("/:slug").score() > PathPattern::parse("*").score());
    }
}
