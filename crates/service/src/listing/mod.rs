//! List queries: free-text search, named filters and pagination over a set of
//! records, producing one page plus the total number of matches.

mod filters;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use models::Entity;

use crate::errors::ServiceError;
use crate::pagination::Pagination;

pub use filters::{NotificationFilter, OrderFilter, ProductFilter, UserFilter};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Query parameter names reserved for search and paging; everything else is a filter.
pub const SEARCH_PARAM: &str = "q";
pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "page_size";

/// Filter and pagination state driving a list view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for ListQuery {
    fn default() -> Self { Self::new(DEFAULT_PAGE_SIZE) }
}

impl ListQuery {
    pub fn new(page_size: u32) -> Self {
        Self { search: None, filters: BTreeMap::new(), page: 1, page_size }.normalized()
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self.normalized()
    }

    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self.normalized()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self.normalized()
    }

    /// Page and page size forced positive, blank search and blank filter values dropped.
    pub fn normalized(&self) -> Self {
        let p = Pagination { page: self.page, per_page: self.page_size }.normalize();
        let search = self
            .search
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let filters = self
            .filters
            .iter()
            .filter(|(k, v)| !k.trim().is_empty() && !v.trim().is_empty())
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        Self { search, filters, page: p.page, page_size: p.per_page }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination { page: self.page, per_page: self.page_size }.normalize()
    }

    /// Lower-cased search needle, if any.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// True when both queries select the same result set (only the page may differ).
    pub fn same_selection(&self, other: &ListQuery) -> bool {
        let (a, b) = (self.normalized(), other.normalized());
        a.search == b.search && a.filters == b.filters && a.page_size == b.page_size
    }

    /// Flatten into query-string pairs (`q`, `page`, `page_size`, then one pair per filter).
    pub fn to_params(&self) -> Vec<(String, String)> {
        let q = self.normalized();
        let mut params = Vec::with_capacity(q.filters.len() + 3);
        if let Some(search) = q.search {
            params.push((SEARCH_PARAM.to_string(), search));
        }
        params.push((PAGE_PARAM.to_string(), q.page.to_string()));
        params.push((PAGE_SIZE_PARAM.to_string(), q.page_size.to_string()));
        params.extend(q.filters);
        params
    }

    /// Inverse of [`ListQuery::to_params`]. Missing page/page_size fall back to 1 and
    /// `default_page_size`; non-numeric values are rejected.
    pub fn from_params<I, K, V>(params: I, default_page_size: u32) -> Result<Self, ServiceError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = ListQuery::new(default_page_size);
        for (k, v) in params {
            let (k, v) = (k.as_ref(), v.as_ref());
            match k {
                SEARCH_PARAM => query.search = Some(v.to_string()),
                PAGE_PARAM => query.page = parse_positive(PAGE_PARAM, v)?,
                PAGE_SIZE_PARAM => query.page_size = parse_positive(PAGE_SIZE_PARAM, v)?,
                _ => {
                    query.filters.insert(k.to_string(), v.to_string());
                }
            }
        }
        Ok(query.normalized())
    }
}

fn parse_positive(name: &str, value: &str) -> Result<u32, ServiceError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| ServiceError::Validation(format!("{name} must be a positive integer")))
}

/// One page of results plus the number of matches across all pages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Default for ListResult<T> {
    fn default() -> Self { Self { items: Vec::new(), total: 0 } }
}

impl<T> ListResult<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListResult<U> {
        ListResult { items: self.items.into_iter().map(f).collect(), total: self.total }
    }
}

/// Records that can be searched, filtered and ordered by [`run_query`].
pub trait Listable: Entity + Clone {
    /// A parsed filter condition.
    type Filter;

    /// Text fields matched case-insensitively by free-text search.
    fn search_fields(&self) -> Vec<&str>;

    /// Parse one named filter. Unknown names and malformed values are validation errors.
    fn parse_filter(name: &str, value: &str) -> Result<Self::Filter, ServiceError>;

    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Display order of a listing; ascending id unless overridden.
    fn listing_order(a: &Self, b: &Self) -> Ordering {
        a.id().cmp(b.id())
    }
}

/// Search, filter, order and paginate `records` according to `query`.
pub fn run_query<T, I>(records: I, query: &ListQuery) -> Result<ListResult<T>, ServiceError>
where
    T: Listable,
    I: IntoIterator<Item = T>,
{
    let query = query.normalized();
    let filters = query
        .filters
        .iter()
        .map(|(name, value)| T::parse_filter(name, value))
        .collect::<Result<Vec<_>, _>>()?;
    let needle = query.search_term();

    let mut matching: Vec<T> = records
        .into_iter()
        .filter(|r| match &needle {
            Some(n) => r.search_fields().iter().any(|f| f.to_lowercase().contains(n.as_str())),
            None => true,
        })
        .filter(|r| filters.iter().all(|f| r.matches(f)))
        .collect();
    matching.sort_by(T::listing_order);

    let total = matching.len();
    let window = query.pagination().window(total);
    let items = matching.drain(window).collect();
    Ok(ListResult { items, total: total as u64 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_drops_blank_search_and_filters() {
        let q = ListQuery { search: Some("   ".into()), filters: BTreeMap::new(), page: 0, page_size: 0 }
            .with_filter("status", " ");
        assert_eq!(q.search, None);
        assert!(q.filters.is_empty());
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 1);
    }

    #[test]
    fn params_roundtrip() {
        let q = ListQuery::new(12).with_search("lap").with_filter("category", "electronics").with_page(3);
        let back = ListQuery::from_params(q.to_params(), 10).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn from_params_defaults_and_rejects_garbage() {
        let q = ListQuery::from_params(Vec::<(String, String)>::new(), 25).unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 25);
        let err = ListQuery::from_params([("page", "two")], 10).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn same_selection_ignores_page_only() {
        let a = ListQuery::new(10).with_filter("status", "pending");
        assert!(a.same_selection(&a.clone().with_page(4)));
        assert!(!a.same_selection(&a.clone().with_filter("status", "shipped")));
        assert!(!a.same_selection(&ListQuery { page_size: 20, ..a.clone() }));
    }
}
