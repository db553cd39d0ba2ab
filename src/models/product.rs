use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product identified by its parent SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub sku_parent: String,
    pub brand: String,
    pub style: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A size variant of a product, identified by its child SKU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku_child: String,
    pub size: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product with its embedded `variants`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWithVariants {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// Validated values for a new product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
    pub sku_parent: String,
    pub brand: String,
    pub style: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
}

/// Validated partial update of a product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku_parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub cost: Option<Decimal>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Validated variant attached to a product being created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewVariant {
    pub sku_child: String,
    pub size: String,
}

/// Validated variant row ready to insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantInsert {
    pub product_id: Uuid,
    pub sku_child: String,
    pub size: String,
}

/// Validated partial update of a variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku_child: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl VariantUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Which SKU column a uniqueness check targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkuKind {
    Parent,
    Child,
}

impl SkuKind {
    pub fn table(&self) -> &'static str {
        match self {
            SkuKind::Parent => super::tables::PRODUCTS,
            SkuKind::Child => super::tables::VARIANTS,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SkuKind::Parent => "sku_parent",
            SkuKind::Child => "sku_child",
        }
    }
}
