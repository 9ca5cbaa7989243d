//! Admin inventory view.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{matches_search, selection};
use crate::domain::aggregates::Product;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InventorySort {
    #[default]
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    StockAsc,
    StockDesc,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryFilter {
    pub search: String,
    /// `None`, `""` or `"all"` disables the category filter.
    pub category: Option<String>,
    pub show_low_stock_only: bool,
    pub show_out_of_stock_only: bool,
    pub sort: InventorySort,
}

fn compare(sort: InventorySort, a: &Product, b: &Product) -> Ordering {
    match sort {
        InventorySort::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        InventorySort::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
        InventorySort::PriceAsc => a.price.cmp(&b.price),
        InventorySort::PriceDesc => b.price.cmp(&a.price),
        InventorySort::StockAsc => a.stock.cmp(&b.stock),
        InventorySort::StockDesc => b.stock.cmp(&a.stock),
    }
}

pub fn filter_products<'a>(products: &'a [Product], filter: &InventoryFilter) -> Vec<&'a Product> {
    let category = selection(filter.category.as_deref());
    let mut view: Vec<&Product> = products
        .iter()
        .filter(|p| matches_search(&filter.search, [p.name.as_str(), p.brand.as_str(), p.category.as_str()]))
        .filter(|p| category.map_or(true, |c| p.category.eq_ignore_ascii_case(c)))
        .filter(|p| !filter.show_low_stock_only || p.is_low_stock())
        .filter(|p| !filter.show_out_of_stock_only || p.is_out_of_stock())
        .collect();
    view.sort_by(|a, b| compare(filter.sort, a, b));
    view
}

/// Distinct non-empty categories, in first-seen order.
pub fn categories(products: &[Product]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for p in products {
        let c = p.category.as_str();
        if !c.is_empty() && !seen.iter().any(|s| s.eq_ignore_ascii_case(c)) { seen.push(c); }
    }
    seen
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_products: usize,
    pub total_units: u64,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub stock_value: Decimal,
}

pub fn summarize(products: &[Product]) -> InventorySummary {
    products.iter().fold(InventorySummary { total_products: products.len(), ..InventorySummary::default() }, |mut s, p| {
        s.total_units += u64::from(p.stock);
        s.low_stock += usize::from(p.is_low_stock());
        s.out_of_stock += usize::from(p.is_out_of_stock());
        s.stock_value += p.stock_value();
        s
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, category: &str, price: i64, stock: u32, minimum: Option<u32>) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            brand: "Optica".into(),
            category: category.into(),
            price: Decimal::new(price, 0),
            stock,
            minimum_stock: minimum,
            ..Product::default()
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("1", "Aviator Classic", "sunglasses", 2400, 3, None),
            product("2", "Round Titanium", "eyeglasses", 3100, 25, None),
            product("3", "Cat Eye", "sunglasses", 1800, 0, Some(2)),
            product("4", "Blue Light Reader", "computer-glasses", 900, 12, Some(20)),
            product("5", "Wayfarer", "sunglasses", 2000, 10, None),
        ]
    }

    fn ids(view: &[&Product]) -> Vec<String> { view.iter().map(|p| p.id.clone()).collect() }

    #[test]
    fn test_low_stock_only_respects_minimum() {
        let products = catalog();
        let view = filter_products(&products, &InventoryFilter { show_low_stock_only: true, ..Default::default() });
        assert!(view.iter().all(|p| p.stock < p.minimum_stock.unwrap_or(10)));
        let mut got = ids(&view);
        got.sort();
        assert_eq!(got, ["1", "3", "4"]);
    }

    #[test]
    fn test_price_sort_reverses() {
        let products = catalog();
        let asc = ids(&filter_products(&products, &InventoryFilter { sort: InventorySort::PriceAsc, ..Default::default() }));
        let mut desc = ids(&filter_products(&products, &InventoryFilter { sort: InventorySort::PriceDesc, ..Default::default() }));
        desc.reverse();
        assert_eq!(asc, desc);
        assert_eq!(asc.first().map(String::as_str), Some("4"));
    }

    #[test]
    fn test_search_then_category() {
        let products = catalog();
        let filter = InventoryFilter { search: "optica".into(), category: Some("Sunglasses".into()), sort: InventorySort::NameAsc, ..Default::default() };
        assert_eq!(ids(&filter_products(&products, &filter)), ["1", "3", "5"]);
        let filter = InventoryFilter { search: "round".into(), category: Some("all".into()), ..Default::default() };
        assert_eq!(ids(&filter_products(&products, &filter)), ["2"]);
    }

    #[test]
    fn test_stable_sort_keeps_ties_in_order() {
        let products = vec![product("a", "Same", "x", 100, 1, None), product("b", "Same", "x", 100, 1, None)];
        let view = filter_products(&products, &InventoryFilter { sort: InventorySort::PriceDesc, ..Default::default() });
        assert_eq!(ids(&view), ["a", "b"]);
    }

    #[test]
    fn test_summary_and_categories() {
        let products = catalog();
        let summary = summarize(&products);
        assert_eq!(summary.total_products, 5);
        assert_eq!(summary.out_of_stock, 1);
        assert_eq!(summary.low_stock, 3);
        assert_eq!(summary.total_units, 50);
        assert_eq!(categories(&products), ["sunglasses", "eyeglasses", "computer-glasses"]);
    }
}
