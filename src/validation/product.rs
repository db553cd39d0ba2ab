use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{length, parse_uuid, FieldErrors, Rule, Schema};
use crate::models::{NewProduct, NewVariant, ProductUpdate, VariantInsert, VariantUpdate};

pub const SKU_REQUIRED: &str = "El SKU es requerido";
pub const SKU_TOO_LONG: &str = "El SKU no puede exceder 50 caracteres";
pub const SKU_CHARSET: &str = "El SKU solo puede contener letras y números";
pub const BRAND_REQUIRED: &str = "La marca es requerida";
pub const BRAND_TOO_LONG: &str = "La marca no puede exceder 100 caracteres";
pub const STYLE_REQUIRED: &str = "El estilo es requerido";
pub const STYLE_TOO_LONG: &str = "El estilo no puede exceder 100 caracteres";
pub const PRICE_NOT_POSITIVE: &str = "El precio debe ser mayor que 0";
pub const PRICE_DECIMALS: &str = "El precio debe tener máximo 2 decimales";
pub const COST_NOT_POSITIVE: &str = "El costo debe ser mayor que 0";
pub const COST_DECIMALS: &str = "El costo debe tener máximo 2 decimales";
pub const SIZE_REQUIRED: &str = "El tamaño es requerido";
pub const SIZE_TOO_LONG: &str = "El tamaño no puede exceder 50 caracteres";
pub const INVALID_PRODUCT_ID: &str = "ID de producto inválido";

static SKU_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("sku pattern is valid"));

/// Parent or child SKU: 1-50 ASCII letters and digits
pub fn sku(value: &str) -> Rule<String> {
    length(value, 1, SKU_REQUIRED, 50, SKU_TOO_LONG)?;
    if !SKU_RE.is_match(value) {
        return Err(SKU_CHARSET);
    }
    Ok(value.to_string())
}

fn money(value: Decimal, not_positive: &'static str, decimals: &'static str) -> Rule<Decimal> {
    if value <= Decimal::ZERO {
        return Err(not_positive);
    }
    if value.round_dp(2) != value {
        return Err(decimals);
    }
    Ok(value)
}

pub fn price(value: Decimal) -> Rule<Decimal> {
    money(value, PRICE_NOT_POSITIVE, PRICE_DECIMALS)
}

pub fn cost(value: Decimal) -> Rule<Decimal> {
    money(value, COST_NOT_POSITIVE, COST_DECIMALS)
}

fn brand(value: &str) -> Rule<String> {
    length(value, 1, BRAND_REQUIRED, 100, BRAND_TOO_LONG).map(|_| value.to_string())
}

fn style(value: &str) -> Rule<String> {
    length(value, 1, STYLE_REQUIRED, 100, STYLE_TOO_LONG).map(|_| value.to_string())
}

fn size(value: &str) -> Rule<String> {
    length(value, 1, SIZE_REQUIRED, 50, SIZE_TOO_LONG).map(|_| value.to_string())
}

/// A size variant submitted together with a new product
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VariantFormInput {
    pub sku_child: String,
    pub size: String,
}

/// Product form, optionally with variants
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateProductInput {
    pub sku_parent: String,
    pub brand: String,
    pub style: String,
    pub price: Decimal,
    pub cost: Decimal,
    #[serde(default)]
    pub variants: Vec<VariantFormInput>,
}

/// Validated product plus the variants to create with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProduct {
    pub product: NewProduct,
    /// Each variant with the index of the form row it came from
    pub variants: Vec<(usize, NewVariant)>,
}

impl Schema for CreateProductInput {
    type Output = ValidProduct;

    fn safe_parse(&self) -> Result<ValidProduct, FieldErrors> {
        let mut errors = FieldErrors::new();
        let sku_parent = errors.check("sku_parent", sku(&self.sku_parent));
        let brand = errors.check("brand", brand(&self.brand));
        let style = errors.check("style", style(&self.style));
        let price = errors.check("price", price(self.price));
        let cost = errors.check("cost", cost(self.cost));

        // Fully blank rows are form placeholders, not variants.
        let mut variants = Vec::new();
        for (i, variant) in self.variants.iter().enumerate() {
            if variant.sku_child.is_empty() && variant.size.is_empty() {
                continue;
            }
            let sku_child = errors.check(format!("variants.{}.sku_child", i), sku(&variant.sku_child));
            let size = errors.check(format!("variants.{}.size", i), size(&variant.size));
            if let (Some(sku_child), Some(size)) = (sku_child, size) {
                variants.push((i, NewVariant { sku_child, size }));
            }
        }

        errors.into_result(|| {
            Some(ValidProduct {
                product: NewProduct {
                    sku_parent: sku_parent?,
                    brand: brand?,
                    style: style?,
                    price: price?,
                    cost: cost?,
                },
                variants,
            })
        })
    }
}

/// Partial product edit
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateProductInput {
    #[serde(default)]
    pub sku_parent: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub cost: Option<Decimal>,
}

impl Schema for UpdateProductInput {
    type Output = ProductUpdate;

    fn safe_parse(&self) -> Result<ProductUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let update = ProductUpdate {
            sku_parent: self
                .sku_parent
                .as_deref()
                .and_then(|v| errors.check("sku_parent", sku(v))),
            brand: self
                .brand
                .as_deref()
                .and_then(|v| errors.check("brand", brand(v))),
            style: self
                .style
                .as_deref()
                .and_then(|v| errors.check("style", style(v))),
            price: self.price.and_then(|v| errors.check("price", price(v))),
            cost: self.cost.and_then(|v| errors.check("cost", cost(v))),
        };
        errors.into_result(|| Some(update))
    }
}

/// New variant for an existing product
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateVariantInput {
    pub product_id: String,
    pub sku_child: String,
    pub size: String,
}

impl Schema for CreateVariantInput {
    type Output = VariantInsert;

    fn safe_parse(&self) -> Result<VariantInsert, FieldErrors> {
        let mut errors = FieldErrors::new();
        let product_id = errors.check("product_id", parse_uuid(&self.product_id, INVALID_PRODUCT_ID));
        let sku_child = errors.check("sku_child", sku(&self.sku_child));
        let size = errors.check("size", size(&self.size));

        errors.into_result(|| {
            Some(VariantInsert {
                product_id: product_id?,
                sku_child: sku_child?,
                size: size?,
            })
        })
    }
}

/// Partial variant edit
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateVariantInput {
    #[serde(default)]
    pub sku_child: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

impl Schema for UpdateVariantInput {
    type Output = VariantUpdate;

    fn safe_parse(&self) -> Result<VariantUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let update = VariantUpdate {
            sku_child: self
                .sku_child
                .as_deref()
                .and_then(|v| errors.check("sku_child", sku(v))),
            size: self
                .size
                .as_deref()
                .and_then(|v| errors.check("size", size(v))),
        };
        errors.into_result(|| Some(update))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn valid_product() -> CreateProductInput {
        CreateProductInput {
            sku_parent: "CAM001".to_string(),
            brand: "Basement".to_string(),
            style: "Camisa Oxford".to_string(),
            price: dec("150000.99"),
            cost: dec("80000"),
            variants: Vec::new(),
        }
    }

    #[test]
    fn sku_accepts_alphanumerics_up_to_fifty() {
        assert!(sku("A").is_ok());
        assert!(sku("abcXYZ0123").is_ok());
        assert!(sku(&"Z9".repeat(25)).is_ok());
    }

    #[test]
    fn sku_rejects_with_first_violated_rule() {
        assert_eq!(sku(""), Err(SKU_REQUIRED));
        assert_eq!(sku(&"A".repeat(51)), Err(SKU_TOO_LONG));
        assert_eq!(sku("CAM-001"), Err(SKU_CHARSET));
        assert_eq!(sku("CAM 001"), Err(SKU_CHARSET));
        assert_eq!(sku("CAMIÓN"), Err(SKU_CHARSET));
        // Too long wins over charset because length is declared first.
        assert_eq!(sku(&"-".repeat(51)), Err(SKU_TOO_LONG));
    }

    #[test]
    fn price_requires_positive_two_decimals() {
        assert_eq!(price(dec("150000.99")), Ok(dec("150000.99")));
        assert_eq!(price(dec("0.01")), Ok(dec("0.01")));
        assert_eq!(price(dec("10.50")), Ok(dec("10.50")));
        assert_eq!(price(dec("150000.999")), Err(PRICE_DECIMALS));
        assert_eq!(price(Decimal::ZERO), Err(PRICE_NOT_POSITIVE));
        assert_eq!(price(dec("-5")), Err(PRICE_NOT_POSITIVE));
        assert_eq!(cost(dec("1.001")), Err(COST_DECIMALS));
        assert_eq!(cost(dec("-0.001")), Err(COST_NOT_POSITIVE));
    }

    #[test]
    fn create_product_collects_field_errors_in_order() {
        let input = CreateProductInput {
            sku_parent: "CAM_001".to_string(),
            brand: String::new(),
            style: "x".repeat(101),
            price: dec("150000.999"),
            cost: Decimal::ZERO,
            variants: Vec::new(),
        };
        let errors = input.safe_parse().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["sku_parent", "brand", "style", "price", "cost"]);
        assert_eq!(errors.first("brand"), Some(BRAND_REQUIRED));
        assert_eq!(errors.first("style"), Some(STYLE_TOO_LONG));
        assert_eq!(errors.first("price"), Some(PRICE_DECIMALS));
        assert_eq!(errors.first("cost"), Some(COST_NOT_POSITIVE));
    }

    #[test]
    fn create_product_validates_variants_and_skips_blank_rows() {
        let mut input = valid_product();
        input.variants = vec![
            VariantFormInput {
                sku_child: "CAM001S".to_string(),
                size: "S".to_string(),
            },
            VariantFormInput::default(),
            VariantFormInput {
                sku_child: "CAM001-M".to_string(),
                size: "M".to_string(),
            },
        ];
        let errors = input.safe_parse().unwrap_err();
        assert_eq!(errors.first("variants.2.sku_child"), Some(SKU_CHARSET));

        input.variants[2].sku_child = "CAM001M".to_string();
        let valid = input.safe_parse().unwrap();
        let rows: Vec<usize> = valid.variants.iter().map(|(i, _)| *i).collect();
        assert_eq!(rows, [0, 2]);
        assert_eq!(valid.product.sku_parent, "CAM001");
    }

    #[test]
    fn half_filled_variant_rows_are_reported_at_their_row() {
        let mut input = valid_product();
        input.variants = vec![
            VariantFormInput::default(),
            VariantFormInput {
                sku_child: "CAM001M".to_string(),
                size: String::new(),
            },
            VariantFormInput {
                sku_child: "CAM-L".to_string(),
                size: "L".to_string(),
            },
            VariantFormInput {
                sku_child: String::new(),
                size: "XL".to_string(),
            },
        ];
        let errors = input.safe_parse().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            ["variants.1.size", "variants.2.sku_child", "variants.3.sku_child"]
        );
        assert_eq!(errors.first("variants.1.size"), Some(SIZE_REQUIRED));
        assert_eq!(errors.first("variants.2.sku_child"), Some(SKU_CHARSET));
        assert_eq!(errors.first("variants.3.sku_child"), Some(SKU_REQUIRED));
    }

    #[test]
    fn empty_product_update_is_accepted() {
        assert_eq!(
            UpdateProductInput::default().safe_parse(),
            Ok(ProductUpdate::default())
        );
        let bad = UpdateProductInput {
            price: Some(dec("0")),
            ..UpdateProductInput::default()
        };
        assert_eq!(bad.safe_parse().unwrap_err().first("price"), Some(PRICE_NOT_POSITIVE));
    }

    #[test]
    fn variant_requires_product_uuid() {
        let input = CreateVariantInput {
            product_id: "not-a-uuid".to_string(),
            sku_child: "CAM001S".to_string(),
            size: String::new(),
        };
        let errors = input.safe_parse().unwrap_err();
        assert_eq!(errors.first("product_id"), Some(INVALID_PRODUCT_ID));
        assert_eq!(errors.first("size"), Some(SIZE_REQUIRED));
        assert_eq!(errors.first("sku_child"), None);
    }
}
