use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{length, FieldErrors, Rule, Schema};
use crate::models::{StoreInput, StoreUpdate};

pub const NAME_TOO_SHORT: &str = "El nombre debe tener al menos 2 caracteres";
pub const NAME_TOO_LONG: &str = "El nombre no puede exceder 100 caracteres";
pub const NAME_CHARSET: &str = "El nombre solo puede contener letras y espacios";
pub const SKUS_TOO_LOW: &str = "Debe permitir al menos 1 SKU";
pub const SKUS_TOO_HIGH: &str = "El límite de SKUs no puede exceder 10,000";
pub const BRANDS_TOO_LOW: &str = "Debe permitir al menos 1 marca";
pub const BRANDS_TOO_HIGH: &str = "El límite de marcas no puede exceder 500";
pub const INVENTORY_TOO_LOW: &str = "El inventario mínimo debe ser 1";
pub const INVENTORY_TOO_HIGH: &str = "El límite de inventario no puede exceder 100,000";
pub const NOTHING_TO_UPDATE: &str = "Al menos un campo debe ser actualizado";
pub const FORM_SKUS: &str = "SKUs debe ser un número entre 1 y 10,000";
pub const FORM_BRANDS: &str = "Marcas debe ser un número entre 1 y 500";
pub const FORM_INVENTORY: &str = "Inventario debe ser un número entre 1 y 100,000";

pub const DEFAULT_MAX_SKUS: i32 = 1000;
pub const DEFAULT_MAX_BRANDS: i32 = 50;
pub const DEFAULT_MAX_INVENTORY: i32 = 10000;

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑ\s]+$").expect("store name pattern is valid")
});

/// Store name: 2-100 characters, letters (Spanish accents included) and spaces
pub fn store_name(value: &str) -> Rule<String> {
    length(value, 2, NAME_TOO_SHORT, 100, NAME_TOO_LONG)?;
    if !NAME_RE.is_match(value) {
        return Err(NAME_CHARSET);
    }
    Ok(value.to_string())
}

fn bounded(value: i64, max: i64, too_low: &'static str, too_high: &'static str) -> Rule<i32> {
    if value < 1 {
        return Err(too_low);
    }
    if value > max {
        return Err(too_high);
    }
    i32::try_from(value).map_err(|_| too_high)
}

pub fn max_skus(value: i64) -> Rule<i32> {
    bounded(value, 10_000, SKUS_TOO_LOW, SKUS_TOO_HIGH)
}

pub fn max_brands(value: i64) -> Rule<i32> {
    bounded(value, 500, BRANDS_TOO_LOW, BRANDS_TOO_HIGH)
}

pub fn max_inventory(value: i64) -> Rule<i32> {
    bounded(value, 100_000, INVENTORY_TOO_LOW, INVENTORY_TOO_HIGH)
}

/// Leading-integer parse of a form value.
///
/// Skips leading whitespace, accepts one optional sign and then as many
/// digits as follow. `"12abc"` is 12, `" -3"` is -3, `"abc"` and `""` fail.
pub fn parse_int_prefix(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    // Overflowing inputs are far outside every bound, so saturate.
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Store creation from typed values; omitted limits take their defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateStoreInput {
    pub name: String,
    #[serde(default)]
    pub max_skus: Option<i64>,
    #[serde(default)]
    pub max_brands: Option<i64>,
    #[serde(default)]
    pub max_inventory: Option<i64>,
}

impl Schema for CreateStoreInput {
    type Output = StoreInput;

    fn safe_parse(&self) -> Result<StoreInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check("name", store_name(&self.name));
        let skus = match self.max_skus {
            Some(v) => errors.check("max_skus", max_skus(v)),
            None => Some(DEFAULT_MAX_SKUS),
        };
        let brands = match self.max_brands {
            Some(v) => errors.check("max_brands", max_brands(v)),
            None => Some(DEFAULT_MAX_BRANDS),
        };
        let inventory = match self.max_inventory {
            Some(v) => errors.check("max_inventory", max_inventory(v)),
            None => Some(DEFAULT_MAX_INVENTORY),
        };

        errors.into_result(|| {
            Some(StoreInput {
                name: name?,
                max_skus: skus?,
                max_brands: brands?,
                max_inventory: inventory?,
            })
        })
    }
}

/// Partial store edit; at least one field must be present
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateStoreInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub max_skus: Option<i64>,
    #[serde(default)]
    pub max_brands: Option<i64>,
    #[serde(default)]
    pub max_inventory: Option<i64>,
}

impl From<StoreInput> for UpdateStoreInput {
    fn from(input: StoreInput) -> Self {
        Self {
            name: Some(input.name),
            max_skus: Some(input.max_skus.into()),
            max_brands: Some(input.max_brands.into()),
            max_inventory: Some(input.max_inventory.into()),
        }
    }
}

impl Schema for UpdateStoreInput {
    type Output = StoreUpdate;

    fn safe_parse(&self) -> Result<StoreUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let update = StoreUpdate {
            name: self
                .name
                .as_deref()
                .and_then(|v| errors.check("name", store_name(v))),
            max_skus: self
                .max_skus
                .and_then(|v| errors.check("max_skus", max_skus(v))),
            max_brands: self
                .max_brands
                .and_then(|v| errors.check("max_brands", max_brands(v))),
            max_inventory: self
                .max_inventory
                .and_then(|v| errors.check("max_inventory", max_inventory(v))),
            updated_at: None,
        };
        if errors.is_empty() && update.is_empty() {
            errors.push("", NOTHING_TO_UPDATE);
        }
        errors.into_result(|| Some(update))
    }
}

/// Store form as submitted by the browser: every value is a string
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoreFormInput {
    pub name: String,
    pub max_skus: String,
    pub max_brands: String,
    pub max_inventory: String,
}

fn form_number(value: &str, max: i64, message: &'static str) -> Rule<i32> {
    parse_int_prefix(value)
        .ok_or(message)
        .and_then(|n| bounded(n, max, message, message))
}

impl Schema for StoreFormInput {
    type Output = StoreInput;

    fn safe_parse(&self) -> Result<StoreInput, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.check("name", store_name(&self.name));
        let skus = errors.check("max_skus", form_number(&self.max_skus, 10_000, FORM_SKUS));
        let brands = errors.check("max_brands", form_number(&self.max_brands, 500, FORM_BRANDS));
        let inventory = errors.check(
            "max_inventory",
            form_number(&self.max_inventory, 100_000, FORM_INVENTORY),
        );

        errors.into_result(|| {
            Some(StoreInput {
                name: name?,
                max_skus: skus?,
                max_brands: brands?,
                max_inventory: inventory?,
            })
        })
    }
}
