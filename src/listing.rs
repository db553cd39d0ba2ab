//! In-memory search and ordering of the admin listings

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Deserialize;

use crate::models::{ProductWithVariants, ProfileWithStore, Store};

/// Column a product listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortKey {
    SkuParent,
    Brand,
    Style,
    Price,
    #[default]
    CreatedAt,
}

impl FromStr for ProductSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sku_parent" => Ok(ProductSortKey::SkuParent),
            "brand" => Ok(ProductSortKey::Brand),
            "style" => Ok(ProductSortKey::Style),
            "price" => Ok(ProductSortKey::Price),
            "created_at" => Ok(ProductSortKey::CreatedAt),
            other => Err(format!("unknown sort column: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Search and ordering applied to the product listing.
///
/// The default keeps every product, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilters {
    /// Case-insensitive substring over SKUs, brand, style and sizes
    #[serde(default)]
    pub search: Option<String>,
    /// Exact brand, ignoring case
    #[serde(default)]
    pub brand: Option<String>,
    /// Substring of the parent SKU or of any child SKU
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub sort_by: ProductSortKey,
    #[serde(default)]
    pub sort_order: SortOrder,
}

fn contains(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn non_empty_lower(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

impl ProductFilters {
    pub fn matches(&self, item: &ProductWithVariants) -> bool {
        let product = &item.product;

        if let Some(search) = non_empty_lower(&self.search) {
            let hit = contains(&product.sku_parent, &search)
                || contains(&product.brand, &search)
                || contains(&product.style, &search)
                || item
                    .variants
                    .iter()
                    .any(|v| contains(&v.sku_child, &search) || contains(&v.size, &search));
            if !hit {
                return false;
            }
        }

        if let Some(brand) = non_empty_lower(&self.brand) {
            if product.brand.to_lowercase() != brand {
                return false;
            }
        }

        if let Some(sku) = non_empty_lower(&self.sku) {
            let hit = contains(&product.sku_parent, &sku)
                || item.variants.iter().any(|v| contains(&v.sku_child, &sku));
            if !hit {
                return false;
            }
        }

        true
    }

    fn compare(&self, a: &ProductWithVariants, b: &ProductWithVariants) -> Ordering {
        let (a, b) = (&a.product, &b.product);
        let ordering = match self.sort_by {
            ProductSortKey::SkuParent => a.sku_parent.cmp(&b.sku_parent),
            ProductSortKey::Brand => a.brand.cmp(&b.brand),
            ProductSortKey::Style => a.style.cmp(&b.style),
            ProductSortKey::Price => a.price.cmp(&b.price),
            ProductSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Keep the matching products and order them
    pub fn apply(&self, products: Vec<ProductWithVariants>) -> Vec<ProductWithVariants> {
        let mut products: Vec<_> = products.into_iter().filter(|p| self.matches(p)).collect();
        products.sort_by(|a, b| self.compare(a, b));
        products
    }
}

/// Users whose email, role or store name contains `search`, ignoring case
pub fn filter_users<'a>(users: &'a [ProfileWithStore], search: &str) -> Vec<&'a ProfileWithStore> {
    let needle = search.trim().to_lowercase();
    users
        .iter()
        .filter(|u| {
            needle.is_empty()
                || contains(&u.profile.email, &needle)
                || u.profile.role.as_str().contains(&needle)
                || u.store.as_ref().map_or(false, |s| contains(&s.name, &needle))
        })
        .collect()
}

/// Stores whose name contains `search`, ignoring case
pub fn filter_stores<'a>(stores: &'a [Store], search: &str) -> Vec<&'a Store> {
    let needle = search.trim().to_lowercase();
    stores
        .iter()
        .filter(|s| needle.is_empty() || contains(&s.name, &needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, Profile, Role, StoreRef, Variant};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn product(sku: &str, brand: &str, price: i64, day: u32, sizes: &[&str]) -> ProductWithVariants {
        let id = Uuid::new_v4();
        let created_at = Utc.with_ymd_and_hms(2025, 8, day, 12, 0, 0).unwrap();
        ProductWithVariants {
            product: Product {
                id,
                sku_parent: sku.to_string(),
                brand: brand.to_string(),
                style: "Camisa".to_string(),
                price: Decimal::from(price),
                cost: Decimal::from(price / 2),
                created_at,
                updated_at: created_at,
            },
            variants: sizes
                .iter()
                .map(|size| Variant {
                    id: Uuid::new_v4(),
                    product_id: id,
                    sku_child: format!("{}{}", sku, size),
                    size: size.to_string(),
                    created_at,
                    updated_at: created_at,
                })
                .collect(),
        }
    }

    fn catalog() -> Vec<ProductWithVariants> {
        vec![
            product("CAM001", "Basement", 150000, 1, &["S", "M"]),
            product("PAN002", "Americanino", 90000, 3, &["32"]),
            product("CHA003", "Basement", 250000, 2, &[]),
        ]
    }

    fn skus(products: &[ProductWithVariants]) -> Vec<&str> {
        products.iter().map(|p| p.product.sku_parent.as_str()).collect()
    }

    #[test]
    fn default_is_newest_first() {
        let listed = ProductFilters::default().apply(catalog());
        assert_eq!(skus(&listed), ["PAN002", "CHA003", "CAM001"]);
    }

    #[test]
    fn search_reaches_variants() {
        let filters = ProductFilters {
            search: Some("cam001m".to_string()),
            ..ProductFilters::default()
        };
        assert_eq!(skus(&filters.apply(catalog())), ["CAM001"]);

        let filters = ProductFilters {
            search: Some("BASE".to_string()),
            sort_by: ProductSortKey::Price,
            sort_order: SortOrder::Asc,
            ..ProductFilters::default()
        };
        assert_eq!(skus(&filters.apply(catalog())), ["CAM001", "CHA003"]);
    }

    #[test]
    fn brand_and_sku_filters() {
        let filters = ProductFilters {
            brand: Some("americanino".to_string()),
            ..ProductFilters::default()
        };
        assert_eq!(skus(&filters.apply(catalog())), ["PAN002"]);

        let filters = ProductFilters {
            sku: Some("pan002".to_string()),
            ..ProductFilters::default()
        };
        assert_eq!(skus(&filters.apply(catalog())), ["PAN002"]);
    }

    #[test]
    fn filters_deserialize_from_query_values() {
        let filters: ProductFilters =
            serde_json::from_value(serde_json::json!({ "sort_by": "sku_parent", "sort_order": "asc" }))
                .unwrap();
        assert_eq!(filters.sort_by, ProductSortKey::SkuParent);
        assert_eq!(skus(&filters.apply(catalog())), ["CAM001", "CHA003", "PAN002"]);
    }

    #[test]
    fn users_match_email_role_and_store() {
        let now = Utc::now();
        let user = |email: &str, role: Role, store: Option<&str>| ProfileWithStore {
            profile: Profile {
                id: Uuid::new_v4(),
                email: email.to_string(),
                role,
                store_id: None,
                created_at: now,
                updated_at: now,
            },
            store: store.map(|name| StoreRef {
                id: Uuid::new_v4(),
                name: name.to_string(),
            }),
        };
        let users = vec![
            user("admin@example.com", Role::Admin, None),
            user("ana@example.com", Role::Promotora, Some("Tienda Andino")),
        ];

        assert_eq!(filter_users(&users, "PROMO").len(), 1);
        assert_eq!(filter_users(&users, "andino").len(), 1);
        assert_eq!(filter_users(&users, "example").len(), 2);
        assert_eq!(filter_users(&users, "").len(), 2);
        assert!(filter_users(&users, "nadie").is_empty());
    }
}
