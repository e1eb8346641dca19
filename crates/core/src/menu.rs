//! The menu catalog.
//!
//! The catalog is immutable reference data loaded once at process start. Every
//! read path hides unavailable items: an item with `available = false` is
//! indistinguishable from an id that was never declared. Order reconciliation
//! relies on this, so it never prices an item the menu board does not show.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Category, MenuItemId};

/// Errors detected while building a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two items share the same id.
    #[error("duplicate menu item id {0}")]
    DuplicateId(MenuItemId),
    /// An item has a negative price.
    #[error("menu item {0} has a negative price")]
    NegativePrice(MenuItemId),
    /// An item has an empty name.
    #[error("menu item {0} has an empty name")]
    EmptyName(MenuItemId),
}

/// A drink on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    /// Unit price in dollars.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: String,
    pub category: Category,
    pub available: bool,
}

/// Immutable, in-memory list of menu items in declaration order.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<MenuItem>,
}

impl Catalog {
    /// Build a catalog from a list of items.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if ids are not unique, a price is negative, or a
    /// name is empty.
    pub fn new(items: Vec<MenuItem>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(CatalogError::DuplicateId(item.id));
            }
            if item.price.is_sign_negative() && !item.price.is_zero() {
                return Err(CatalogError::NegativePrice(item.id));
            }
            if item.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(item.id));
            }
        }
        Ok(Self { items })
    }

    /// The shop's standard menu.
    #[must_use]
    pub fn builtin() -> Self {
        let item = |id: i32, name: &str, cents: i64, category: Category, description: &str| {
            MenuItem {
                id: MenuItemId::new(id),
                name: name.to_owned(),
                price: Decimal::new(cents, 2),
                description: description.to_owned(),
                category,
                available: true,
            }
        };

        Self {
            items: vec![
                item(
                    1,
                    "Espresso",
                    250,
                    Category::Espresso,
                    "Rich, concentrated shot of coffee brewed by forcing hot water through finely-ground coffee beans",
                ),
                item(
                    2,
                    "Latte",
                    350,
                    Category::Hot,
                    "Smooth espresso with steamed milk and a light layer of milk foam",
                ),
                item(
                    3,
                    "Cappuccino",
                    300,
                    Category::Hot,
                    "Equal parts espresso, steamed milk, and milk foam for a balanced coffee experience",
                ),
                item(
                    4,
                    "Mocha",
                    400,
                    Category::Hot,
                    "Espresso combined with rich chocolate syrup and steamed milk, topped with whipped cream",
                ),
                item(
                    5,
                    "Americano",
                    275,
                    Category::Hot,
                    "Espresso diluted with hot water for a lighter coffee experience",
                ),
                item(
                    6,
                    "Macchiato",
                    275,
                    Category::Espresso,
                    "Espresso \"marked\" with a small amount of steamed milk",
                ),
                item(
                    7,
                    "Iced Latte",
                    375,
                    Category::Cold,
                    "Chilled espresso with cold milk over ice for a refreshing coffee drink",
                ),
                item(
                    8,
                    "Iced Mocha",
                    425,
                    Category::Cold,
                    "Cold espresso with chocolate syrup and milk, served over ice",
                ),
            ],
        }
    }

    /// Every declared item, including unavailable ones.
    #[must_use]
    pub fn declared(&self) -> &[MenuItem] {
        &self.items
    }

    /// Available items in declaration order.
    #[must_use]
    pub fn all_available(&self) -> Vec<&MenuItem> {
        self.available().collect()
    }

    /// Available items in the given category.
    #[must_use]
    pub fn by_category(&self, category: Category) -> Vec<&MenuItem> {
        self.available()
            .filter(|item| item.category == category)
            .collect()
    }

    /// Look up an available item by id.
    ///
    /// Returns `None` both for unknown ids and for items marked unavailable.
    #[must_use]
    pub fn get(&self, id: MenuItemId) -> Option<&MenuItem> {
        self.available().find(|item| item.id == id)
    }

    /// Case-insensitive substring search on item names.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&MenuItem> {
        let needle = query.to_lowercase();
        self.available()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Distinct categories across the whole catalog, in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::with_capacity(Category::ALL.len());
        for item in &self.items {
            if !categories.contains(&item.category) {
                categories.push(item.category);
            }
        }
        categories
    }

    fn available(&self) -> impl Iterator<Item = &MenuItem> {
        self.items.iter().filter(|item| item.available)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, name: &str, category: Category, available: bool) -> MenuItem {
        MenuItem {
            id: MenuItemId::new(id),
            name: name.to_owned(),
            price: Decimal::new(300, 2),
            description: String::new(),
            category,
            available,
        }
    }

    fn catalog_with_hidden_item() -> Catalog {
        Catalog::new(vec![
            item(1, "Espresso", Category::Espresso, true),
            item(2, "Seasonal Latte", Category::Hot, false),
            item(3, "Latte", Category::Hot, true),
            item(4, "Cold Brew", Category::Cold, true),
        ])
        .unwrap()
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let builtin = Catalog::builtin();
        assert_eq!(builtin.declared().len(), 8);
        assert!(Catalog::new(builtin.declared().to_vec()).is_ok());
    }

    #[test]
    fn test_new_rejects_duplicate_ids() {
        let result = Catalog::new(vec![
            item(1, "Espresso", Category::Espresso, true),
            item(1, "Doppio", Category::Espresso, true),
        ]);
        assert_eq!(
            result.unwrap_err(),
            CatalogError::DuplicateId(MenuItemId::new(1))
        );
    }

    #[test]
    fn test_new_rejects_negative_price() {
        let mut bad = item(9, "Refund", Category::Hot, true);
        bad.price = Decimal::new(-100, 2);
        assert_eq!(
            Catalog::new(vec![bad]).unwrap_err(),
            CatalogError::NegativePrice(MenuItemId::new(9))
        );
    }

    #[test]
    fn test_all_available_keeps_declaration_order() {
        let catalog = catalog_with_hidden_item();
        let ids: Vec<i32> = catalog
            .all_available()
            .iter()
            .map(|i| i.id.as_i32())
            .collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_by_category_filters_unavailable() {
        let catalog = catalog_with_hidden_item();
        let hot: Vec<&str> = catalog
            .by_category(Category::Hot)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(hot, vec!["Latte"]);
    }

    #[test]
    fn test_get_hides_unavailable_items() {
        let catalog = catalog_with_hidden_item();
        assert!(catalog.get(MenuItemId::new(1)).is_some());
        assert!(catalog.get(MenuItemId::new(2)).is_none());
        assert!(catalog.get(MenuItemId::new(999)).is_none());
    }

    #[test]
    fn test_search_is_case_insensitive_and_hides_unavailable() {
        let catalog = catalog_with_hidden_item();
        let names: Vec<&str> = catalog
            .search("LATTE")
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Latte"]);
        assert!(catalog.search("tea").is_empty());
    }

    #[test]
    fn test_builtin_search() {
        let catalog = Catalog::builtin();
        let names: Vec<&str> = catalog
            .search("mocha")
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Mocha", "Iced Mocha"]);
    }

    #[test]
    fn test_categories_first_seen_order() {
        assert_eq!(
            Catalog::builtin().categories(),
            vec![Category::Espresso, Category::Hot, Category::Cold]
        );
    }

    #[test]
    fn test_menu_item_serializes_camel_case_with_numeric_price() {
        let catalog = Catalog::builtin();
        let espresso = catalog.get(MenuItemId::new(1)).unwrap();
        let json = serde_json::to_value(espresso).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["price"], 2.5);
        assert_eq!(json["category"], "espresso");
        assert_eq!(json["available"], true);
    }
}
