//! Derived views: filtered, sorted and paginated projections of collections
//! that were fetched in full.
//!
//! Every function here is a pure pass over an immutable slice. Filters run in a
//! fixed order (search, then toggles, then buckets) and sorting is stable, so
//! ties keep the upstream order.

pub mod catalog;
pub mod inventory;
pub mod orders;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Case-insensitive substring match against any of `fields`. An empty needle matches everything.
pub(crate) fn matches_search<'a>(needle: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() { return true; }
    fields.into_iter().any(|f| f.to_lowercase().contains(&needle))
}

/// Treats `""` and `"all"` as "no selection".
pub(crate) fn selection(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "first_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn first_page() -> usize { 1 }
fn default_per_page() -> usize { DEFAULT_PAGE_SIZE }

impl Default for PageRequest {
    fn default() -> Self { Self { page: first_page(), per_page: default_per_page() } }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { items: self.items.into_iter().map(f).collect(), page: self.page, per_page: self.per_page, total: self.total, total_pages: self.total_pages }
    }
}

/// Local slice of an already-derived view. Page is 1-based and clamped to at
/// least 1; page size is clamped to `1..=MAX_PAGE_SIZE`. Pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let per_page = request.per_page.clamp(1, MAX_PAGE_SIZE);
    let page = request.page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page);
    let items = items.into_iter().skip(start).take(per_page).collect();
    Page { items, page, per_page, total, total_pages }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate() {
        let page = paginate((1..=45).collect(), PageRequest { page: 3, per_page: 20 });
        assert_eq!(page.items, (41..=45).collect::<Vec<_>>());
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);

        let clamped = paginate((1..=5).collect::<Vec<i32>>(), PageRequest { page: 0, per_page: 0 });
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.per_page, 1);
        assert_eq!(clamped.items, vec![1]);

        let past_end = paginate(vec![1, 2], PageRequest { page: 9, per_page: 10 });
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_pages, 1);
    }

    #[test]
    fn test_search_and_selection_helpers() {
        assert!(matches_search("", ["anything"]));
        assert!(matches_search("RAY", ["Ray-Ban", "x"]));
        assert!(!matches_search("oak", ["Ray-Ban"]));
        assert_eq!(selection(Some("All")), None);
        assert_eq!(selection(Some(" ")), None);
        assert_eq!(selection(Some("sunglasses")), Some("sunglasses"));
    }
}
