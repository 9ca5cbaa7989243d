//! Favorites (wishlist) Aggregate

use serde::{Deserialize, Serialize};

/// Ordered set of favorited product ids, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    product_ids: Vec<String>,
}

impl Favorites {
    pub fn product_ids(&self) -> &[String] { &self.product_ids }
    pub fn len(&self) -> usize { self.product_ids.len() }
    pub fn is_empty(&self) -> bool { self.product_ids.is_empty() }
    pub fn contains(&self, product_id: &str) -> bool { self.product_ids.iter().any(|id| id == product_id) }

    /// Adds or removes the product; returns whether it is now a favorite.
    pub fn toggle(&mut self, product_id: &str) -> bool {
        if self.contains(product_id) {
            self.product_ids.retain(|id| id != product_id);
            false
        } else {
            self.product_ids.push(product_id.to_string());
            true
        }
    }

    pub fn merge(&mut self, other: Favorites) {
        for id in other.product_ids {
            if !self.contains(&id) { self.product_ids.push(id); }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut favs = Favorites::default();
        assert!(favs.toggle("p1"));
        assert!(favs.toggle("p2"));
        assert!(!favs.toggle("p1"));
        assert_eq!(favs.product_ids(), ["p2".to_string()]);
    }

    #[test]
    fn test_merge_skips_duplicates() {
        let mut user: Favorites = serde_json::from_str(r#"["p1","p2"]"#).unwrap();
        let guest: Favorites = serde_json::from_str(r#"["p2","p3"]"#).unwrap();
        user.merge(guest);
        assert_eq!(user.product_ids(), ["p1", "p2", "p3"].map(String::from));
    }
}
