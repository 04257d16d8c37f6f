//! Client-side list views: search, sort and pagination.
//!
//! Screens fetch a whole collection from the API and narrow it here, the
//! way the dashboard tables always have. Query state travels in the URL
//! (`?q=shoe&sort=price&dir=desc&page=2`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default page size for dashboard tables.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Upper bound on a requested page size.
pub const MAX_PER_PAGE: usize = 100;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The other direction, for header links that toggle.
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Query-string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A comparable key extracted from a list item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Text(String),
    Amount(Decimal),
    Count(i64),
    Time(Option<DateTime<Utc>>),
}

/// Something a list view can search and sort.
pub trait Listable {
    /// Whether the item matches a lowercase search needle.
    fn matches(&self, needle: &str) -> bool;

    /// Sort key for a named column, `None` if the column is not sortable.
    fn sort_key(&self, field: &str) -> Option<SortKey>;
}

/// Search, sort and page parameters as they arrive in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub dir: SortDirection,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl ListQuery {
    /// Trimmed, lowercased search needle, if any.
    #[must_use]
    pub fn needle(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    /// Requested page size clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn per_page(&self) -> usize {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }
}

/// One page of a filtered, sorted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually shown.
    pub page: usize,
    pub per_page: usize,
    /// Matching items across all pages.
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Filter, sort and paginate `items`.
///
/// `keep` applies screen-specific filters (status, role, ...) on top of the
/// text search. Out-of-range pages clamp to the last page. Sorting is
/// stable, so equal keys keep the API's order.
pub fn paginate<T, F>(items: &[T], query: &ListQuery, keep: F) -> Page<T>
where
    T: Listable + Clone,
    F: Fn(&T) -> bool,
{
    let needle = query.needle();
    let mut matched: Vec<&T> = items
        .iter()
        .filter(|item| needle.as_deref().is_none_or(|n| item.matches(n)))
        .filter(|item| keep(item))
        .collect();

    if let Some(field) = query.sort.as_deref() {
        matched.sort_by(|a, b| {
            let ordering = a.sort_key(field).cmp(&b.sort_key(field));
            match query.dir {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    let per_page = query.per_page();
    let total = matched.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = query.page.unwrap_or(1).clamp(1, total_pages);

    let items = matched
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .cloned()
        .collect();

    Page {
        items,
        page,
        per_page,
        total,
        total_pages,
    }
}

/// Case-insensitive containment over optional fields.
pub(crate) fn any_contains<'a>(needle: &str, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        qty: i64,
    }

    impl Listable for Row {
        fn matches(&self, needle: &str) -> bool {
            any_contains(needle, [Some(self.name)])
        }

        fn sort_key(&self, field: &str) -> Option<SortKey> {
            match field {
                "name" => Some(SortKey::Text(self.name.to_string())),
                "qty" => Some(SortKey::Count(self.qty)),
                _ => None,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "Tea", qty: 3 },
            Row { name: "Coffee", qty: 10 },
            Row { name: "Green Tea", qty: 1 },
            Row { name: "Milk", qty: 7 },
        ]
    }

    fn query(q: Option<&str>, sort: Option<&str>, dir: SortDirection, page: usize, per_page: usize) -> ListQuery {
        ListQuery {
            q: q.map(String::from),
            sort: sort.map(String::from),
            dir,
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let page = paginate(&rows(), &query(Some(" TEA "), None, SortDirection::Asc, 1, 10), |_| true);
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].name, "Tea");
    }

    #[test]
    fn test_sort_desc() {
        let page = paginate(&rows(), &query(None, Some("qty"), SortDirection::Desc, 1, 10), |_| true);
        let names: Vec<_> = page.items.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Coffee", "Milk", "Tea", "Green Tea"]);
    }

    #[test]
    fn test_unknown_sort_field_keeps_order() {
        let page = paginate(&rows(), &query(None, Some("color"), SortDirection::Asc, 1, 10), |_| true);
        assert_eq!(page.items, rows());
    }

    #[test]
    fn test_pagination_and_clamping() {
        let page = paginate(&rows(), &query(None, Some("name"), SortDirection::Asc, 2, 3), |_| true);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
        assert!(page.has_prev());
        assert!(!page.has_next());

        let page = paginate(&rows(), &query(None, None, SortDirection::Asc, 99, 3), |_| true);
        assert_eq!(page.page, 2);
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let page = paginate::<Row, _>(&[], &ListQuery::default(), |_| true);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_extra_filter() {
        let page = paginate(&rows(), &ListQuery::default(), |r| r.qty > 5);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_per_page_is_clamped() {
        assert_eq!(query(None, None, SortDirection::Asc, 1, 0).per_page(), 1);
        assert_eq!(query(None, None, SortDirection::Asc, 1, 5000).per_page(), MAX_PER_PAGE);
        assert_eq!(ListQuery::default().per_page(), DEFAULT_PER_PAGE);
    }
}
