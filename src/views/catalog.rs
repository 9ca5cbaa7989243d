//! Storefront catalog: the upstream listing query plus local refinements.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::selection;
use crate::domain::aggregates::Product;

/// Query string sent to `GET /api/products`. Unset values are omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl CatalogQuery {
    /// Drops blank and `all` selections so they are not sent upstream.
    pub fn normalized(self) -> Self {
        let keep = |v: Option<String>| selection(v.as_deref()).map(str::to_string);
        Self {
            limit: self.limit,
            gender: keep(self.gender),
            brand: keep(self.brand),
            material: keep(self.material),
            size: keep(self.size),
            color: keep(self.color),
            page: self.page,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogSort {
    /// Upstream order.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    Discount,
    Newest,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFilter {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock_only: bool,
    pub sort: CatalogSort,
}

pub fn refine<'a>(products: &'a [Product], filter: &CatalogFilter) -> Vec<&'a Product> {
    let mut view: Vec<&Product> = products
        .iter()
        .filter(|p| filter.min_price.map_or(true, |min| p.price >= min))
        .filter(|p| filter.max_price.map_or(true, |max| p.price <= max))
        .filter(|p| !filter.in_stock_only || !p.is_out_of_stock())
        .collect();
    match filter.sort {
        CatalogSort::Featured => {}
        CatalogSort::PriceAsc => view.sort_by(|a, b| a.price.cmp(&b.price)),
        CatalogSort::PriceDesc => view.sort_by(|a, b| b.price.cmp(&a.price)),
        CatalogSort::Discount => view.sort_by(|a, b| b.discount_percent().cmp(&a.discount_percent())),
        // records without a timestamp sink to the end
        CatalogSort::Newest => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn product(id: &str, price: i64, mrp: i64, stock: u32) -> Product {
        Product { id: id.into(), price: Decimal::new(price, 0), mrp: Decimal::new(mrp, 0), stock, ..Product::default() }
    }

    #[test]
    fn test_query_serialization_skips_unset_and_all() {
        let query = CatalogQuery { limit: Some(12), gender: Some("all".into()), brand: Some("Ray-Ban".into()), color: Some(" ".into()), ..Default::default() }.normalized();
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, serde_json::json!({"limit": 12, "brand": "Ray-Ban"}));
    }

    #[test]
    fn test_price_range_stock_and_discount_sort() {
        let products = vec![product("a", 1000, 1000, 4), product("b", 1500, 3000, 0), product("c", 2500, 3000, 9), product("d", 4000, 5000, 2)];
        let filter = CatalogFilter { min_price: Some(Decimal::new(1200, 0)), max_price: Some(Decimal::new(3000, 0)), ..Default::default() };
        let ids: Vec<_> = refine(&products, &filter).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);

        let filter = CatalogFilter { in_stock_only: true, sort: CatalogSort::Discount, ..Default::default() };
        let ids: Vec<_> = refine(&products, &filter).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["d", "c", "a"]);
    }

    #[test]
    fn test_newest_first() {
        let mut older = product("old", 1, 1, 1);
        older.created_at = Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        let mut newer = product("new", 1, 1, 1);
        newer.created_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let undated = product("none", 1, 1, 1);
        let products = vec![undated, older, newer];
        let ids: Vec<_> = refine(&products, &CatalogFilter { sort: CatalogSort::Newest, ..Default::default() }).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["new", "old", "none"]);
    }
}
