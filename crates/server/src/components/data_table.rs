//! Data table component types.
//!
//! A [`DataTableConfig`] describes a dashboard table: its columns, select
//! filters and bulk actions. [`DataTableConfig::view`] combines it with the
//! current [`ListQuery`] and result [`Page`] into the header links, filter
//! selects and pager the table template renders. All table state lives in
//! the query string.

use nepostore_core::listing::{ListQuery, Page, SortDirection};
use nepostore_core::types::{OrderStatus, ProductStatus, TenantStatus};
use serde::Serialize;
use url::form_urlencoded;

/// Column definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    /// Sort key passed to `Listable::sort_key`.
    pub key: String,
    pub label: String,
    pub sortable: bool,
}

impl TableColumn {
    /// Create a new sortable column.
    #[must_use]
    pub fn sortable(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: true,
        }
    }

    /// Create a new non-sortable column.
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: false,
        }
    }
}

/// Option for select filters.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// A single-select filter over one query parameter.
#[derive(Debug, Clone, Serialize)]
pub struct TableFilter {
    pub key: String,
    pub label: String,
    pub options: Vec<FilterOption>,
}

impl TableFilter {
    #[must_use]
    pub fn select(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            options,
        }
    }
}

/// Bulk action definition for data tables.
#[derive(Debug, Clone, Serialize)]
pub struct BulkAction {
    /// Value of the `action` form field.
    pub key: String,
    pub label: String,
    pub destructive: bool,
}

impl BulkAction {
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            destructive: false,
        }
    }

    /// Mark this action as destructive.
    #[must_use]
    pub const fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct DataTableConfig {
    pub table_id: String,
    pub columns: Vec<TableColumn>,
    pub filters: Vec<TableFilter>,
    pub bulk_actions: Vec<BulkAction>,
    pub search_placeholder: String,
    pub empty_title: String,
    pub empty_description: Option<String>,
}

impl DataTableConfig {
    #[must_use]
    pub fn new(table_id: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            columns: vec![],
            filters: vec![],
            bulk_actions: vec![],
            search_placeholder: "Search...".to_string(),
            empty_title: "No items found".to_string(),
            empty_description: None,
        }
    }

    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn bulk_action(mut self, action: BulkAction) -> Self {
        self.bulk_actions.push(action);
        self
    }

    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = placeholder.to_string();
        self
    }

    #[must_use]
    pub fn empty_state(mut self, title: &str, description: Option<&str>) -> Self {
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    /// Render state for one request.
    ///
    /// `filters` holds the current value of each configured filter.
    #[must_use]
    pub fn view<T>(
        &self,
        base_path: &str,
        query: &ListQuery,
        filters: &[(&str, Option<&str>)],
        page: &Page<T>,
    ) -> TableView {
        let state = TableState {
            base_path,
            query,
            filters,
        };

        let headers = self
            .columns
            .iter()
            .map(|column| {
                let active = query.sort.as_deref() == Some(column.key.as_str());
                let dir = if active {
                    query.dir.toggle()
                } else {
                    SortDirection::Asc
                };
                HeaderCell {
                    label: column.label.clone(),
                    href: column
                        .sortable
                        .then(|| state.href(Some((&column.key, dir)), Some(1))),
                    indicator: match (active, query.dir) {
                        (false, _) => "",
                        (true, SortDirection::Asc) => "▲",
                        (true, SortDirection::Desc) => "▼",
                    },
                }
            })
            .collect();

        let filter_views = self
            .filters
            .iter()
            .map(|filter| {
                let current = filters
                    .iter()
                    .find(|(key, _)| *key == filter.key)
                    .and_then(|(_, value)| *value)
                    .unwrap_or_default();
                FilterView {
                    key: filter.key.clone(),
                    label: filter.label.clone(),
                    options: filter
                        .options
                        .iter()
                        .map(|option| OptionView {
                            value: option.value.clone(),
                            label: option.label.clone(),
                            selected: option.value == current,
                        })
                        .collect(),
                }
            })
            .collect();

        TableView {
            table_id: self.table_id.clone(),
            action: base_path.to_string(),
            headers,
            filters: filter_views,
            bulk_actions: self.bulk_actions.clone(),
            search: query.q.clone().unwrap_or_default(),
            search_placeholder: self.search_placeholder.clone(),
            empty_title: self.empty_title.clone(),
            empty_description: self.empty_description.clone().unwrap_or_default(),
            summary: summary(page),
            prev_href: page
                .has_prev()
                .then(|| state.href(None, Some(page.page - 1))),
            next_href: page
                .has_next()
                .then(|| state.href(None, Some(page.page + 1))),
            is_empty: page.items.is_empty(),
        }
    }
}

struct TableState<'a> {
    base_path: &'a str,
    query: &'a ListQuery,
    filters: &'a [(&'a str, Option<&'a str>)],
}

impl TableState<'_> {
    /// Link to the same table with a different sort or page.
    fn href(&self, sort: Option<(&str, SortDirection)>, page: Option<usize>) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());
        if let Some(q) = self.query.q.as_deref().filter(|q| !q.is_empty()) {
            params.append_pair("q", q);
        }
        for (key, value) in self.filters {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                params.append_pair(key, value);
            }
        }
        let (sort, dir) = match sort {
            Some((key, dir)) => (Some(key), dir),
            None => (self.query.sort.as_deref(), self.query.dir),
        };
        if let Some(sort) = sort {
            params.append_pair("sort", sort);
            params.append_pair("dir", dir.as_str());
        }
        if let Some(per_page) = self.query.per_page {
            params.append_pair("per_page", &per_page.to_string());
        }
        if let Some(page) = page.filter(|p| *p > 1) {
            params.append_pair("page", &page.to_string());
        }

        let query = params.finish();
        if query.is_empty() {
            self.base_path.to_string()
        } else {
            format!("{}?{query}", self.base_path)
        }
    }
}

fn summary<T>(page: &Page<T>) -> String {
    if page.total == 0 {
        return "No results".to_string();
    }
    let first = (page.page - 1) * page.per_page + 1;
    let last = first + page.items.len() - 1;
    format!("Showing {first}–{last} of {}", page.total)
}

/// A column header as rendered.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderCell {
    pub label: String,
    /// Sort link; `None` for columns that do not sort.
    pub href: Option<String>,
    pub indicator: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterView {
    pub key: String,
    pub label: String,
    pub options: Vec<OptionView>,
}

/// Everything the table template needs besides the rows.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub table_id: String,
    /// Path the search and bulk forms post to.
    pub action: String,
    pub headers: Vec<HeaderCell>,
    pub filters: Vec<FilterView>,
    pub bulk_actions: Vec<BulkAction>,
    pub search: String,
    pub search_placeholder: String,
    pub empty_title: String,
    pub empty_description: String,
    pub summary: String,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub is_empty: bool,
}

fn all_option() -> FilterOption {
    FilterOption::new("", "All")
}

// =============================================================================
// Table definitions
// =============================================================================

#[must_use]
pub fn products_table_config() -> DataTableConfig {
    let mut statuses = vec![all_option()];
    statuses.extend(
        ProductStatus::ALL
            .iter()
            .map(|s| FilterOption::new(s.as_str(), &capitalize(s.as_str()))),
    );
    DataTableConfig::new("products")
        .column(TableColumn::new("select", ""))
        .column(TableColumn::sortable("name", "Product"))
        .column(TableColumn::new("status", "Status"))
        .column(TableColumn::sortable("price", "Price"))
        .column(TableColumn::sortable("quantity", "Stock"))
        .column(TableColumn::new("section", "Section"))
        .column(TableColumn::new("actions", ""))
        .filter(TableFilter::select("status", "Status", statuses))
        .bulk_action(BulkAction::new("bulk_delete", "Delete selected").destructive())
        .search_placeholder("Search products by name or section...")
        .empty_state("No products found", Some("Add a product or adjust your search"))
}

#[must_use]
pub fn customers_table_config() -> DataTableConfig {
    DataTableConfig::new("customers")
        .column(TableColumn::sortable("name", "Customer"))
        .column(TableColumn::new("phone", "Phone"))
        .column(TableColumn::sortable("orders", "Orders"))
        .column(TableColumn::sortable("spent", "Spent"))
        .column(TableColumn::sortable("created", "Since"))
        .column(TableColumn::new("actions", ""))
        .search_placeholder("Search customers by name, email or phone...")
        .empty_state("No customers found", Some("Try adjusting your search"))
}

#[must_use]
pub fn orders_table_config() -> DataTableConfig {
    let mut statuses = vec![all_option()];
    statuses.extend(
        OrderStatus::ALL
            .iter()
            .map(|s| FilterOption::new(s.as_str(), &capitalize(s.as_str()))),
    );
    DataTableConfig::new("orders")
        .column(TableColumn::new("id", "Order"))
        .column(TableColumn::sortable("customer", "Customer"))
        .column(TableColumn::new("items", "Items"))
        .column(TableColumn::sortable("total", "Total"))
        .column(TableColumn::sortable("status", "Status"))
        .column(TableColumn::sortable("created", "Placed"))
        .column(TableColumn::new("actions", ""))
        .filter(TableFilter::select("status", "Status", statuses))
        .search_placeholder("Search orders by id, customer or phone...")
        .empty_state("No orders found", None)
}

#[must_use]
pub fn users_table_config() -> DataTableConfig {
    DataTableConfig::new("users")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::new("email", "Email"))
        .column(TableColumn::sortable("role", "Role"))
        .column(TableColumn::new("actions", ""))
        .search_placeholder("Search staff...")
        .empty_state("No staff yet", Some("Invite someone to help run the store"))
}

#[must_use]
pub fn tenants_table_config() -> DataTableConfig {
    let mut statuses = vec![all_option()];
    statuses.extend(
        TenantStatus::ALL
            .iter()
            .map(|s| FilterOption::new(s.as_str(), &capitalize(s.as_str()))),
    );
    DataTableConfig::new("tenants")
        .column(TableColumn::sortable("name", "Store"))
        .column(TableColumn::new("subdomain", "Subdomain"))
        .column(TableColumn::new("plan", "Plan"))
        .column(TableColumn::sortable("status", "Status"))
        .column(TableColumn::sortable("created", "Created"))
        .column(TableColumn::new("actions", ""))
        .filter(TableFilter::select("status", "Status", statuses))
        .search_placeholder("Search stores by name, subdomain or owner...")
        .empty_state("No stores found", None)
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page(total: usize, page: usize) -> Page<u32> {
        let per_page = 10;
        let total_pages = total.div_ceil(per_page).max(1);
        let len = if page < total_pages {
            per_page
        } else {
            total - (total_pages - 1) * per_page
        };
        Page {
            items: vec![0; len],
            page,
            per_page,
            total,
            total_pages,
        }
    }

    #[test]
    fn test_sort_links_toggle_active_column() {
        let query = ListQuery {
            q: Some("tea".to_string()),
            sort: Some("price".to_string()),
            dir: SortDirection::Asc,
            ..ListQuery::default()
        };
        let view = products_table_config().view("/products", &query, &[], &page(3, 1));

        let price = view.headers.iter().find(|h| h.label == "Price").unwrap();
        assert_eq!(price.indicator, "▲");
        assert_eq!(
            price.href.as_deref(),
            Some("/products?q=tea&sort=price&dir=desc")
        );

        let name = view.headers.iter().find(|h| h.label == "Product").unwrap();
        assert_eq!(name.href.as_deref(), Some("/products?q=tea&sort=name&dir=asc"));

        let status = view.headers.iter().find(|h| h.label == "Status").unwrap();
        assert!(status.href.is_none());
    }

    #[test]
    fn test_pager_keeps_filters() {
        let query = ListQuery {
            page: Some(2),
            ..ListQuery::default()
        };
        let view = orders_table_config().view(
            "/orders",
            &query,
            &[("status", Some("pending"))],
            &page(25, 2),
        );
        assert_eq!(view.prev_href.as_deref(), Some("/orders?status=pending"));
        assert_eq!(
            view.next_href.as_deref(),
            Some("/orders?status=pending&page=3")
        );
        assert_eq!(view.summary, "Showing 11–20 of 25");

        let pending = view.filters[0]
            .options
            .iter()
            .find(|o| o.value == "pending")
            .unwrap();
        assert!(pending.selected);
    }

    #[test]
    fn test_empty_summary() {
        let view = users_table_config().view("/users", &ListQuery::default(), &[], &page(0, 1));
        assert_eq!(view.summary, "No results");
        assert!(view.prev_href.is_none() && view.next_href.is_none());
    }
}
