//! Input validation for stores, products, variants and users.
//!
//! Every input type implements [`Schema`]. `safe_parse` never panics: it
//! returns the validated value or the ordered list of field errors, holding
//! the first violated rule of each failing field in declaration order.

mod product;
mod store;
mod user;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

pub use product::*;
pub use store::*;
pub use user::*;

/// A validation schema over an input type
pub trait Schema {
    type Output;

    fn safe_parse(&self) -> Result<Self::Output, FieldErrors>;
}

/// One failed rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted field path (`variants.0.sku_child`); empty for form-level errors
    pub field: String,
    pub message: String,
}

/// Ordered field errors of one parse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Record the outcome of a field check and hand back the value on success
    pub(crate) fn check<T>(&mut self, field: impl Into<String>, result: Rule<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.push(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message reported for a field, if it failed
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(value)` when nothing failed
    pub fn into_result<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, FieldErrors> {
        if !self.is_empty() {
            return Err(self);
        }
        value().ok_or(self)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Result of a single field rule: the value or the message of the first failure
pub type Rule<T> = Result<T, &'static str>;

/// Length bounds on a string, counted in characters
pub(crate) fn length(
    value: &str,
    min: usize,
    min_message: &'static str,
    max: usize,
    max_message: &'static str,
) -> Rule<()> {
    let len = value.chars().count();
    if len < min {
        return Err(min_message);
    }
    if len > max {
        return Err(max_message);
    }
    Ok(())
}

/// Canonical hyphenated UUID
pub(crate) fn parse_uuid(value: &str, message: &'static str) -> Rule<Uuid> {
    if value.len() != 36 {
        return Err(message);
    }
    Uuid::parse_str(value).map_err(|_| message)
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Email address shape: no leading dot, no consecutive dots in the local part
pub(crate) fn is_email(value: &str) -> bool {
    let local = value.split('@').next().unwrap_or_default();
    !local.starts_with('.') && !local.contains("..") && EMAIL_RE.is_match(value)
}

/// Distinguishes an absent field from an explicit `null`
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        for ok in ["admin@example.com", "user.name+tag@domain.co.uk", "a_b@falabella.com.co"] {
            assert!(is_email(ok), "{ok}");
        }
        for bad in [
            "",
            "no-at-symbol",
            "@domain.com",
            "user@",
            "user@domain",
            ".user@domain.com",
            "us..er@domain.com",
            "user@domain.c",
        ] {
            assert!(!is_email(bad), "{bad}");
        }
    }

    #[test]
    fn uuid_requires_hyphenated_form() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string(), "bad"), Ok(id));
        assert_eq!(parse_uuid(&id.simple().to_string(), "bad"), Err("bad"));
        assert_eq!(parse_uuid("store-1", "bad"), Err("bad"));
    }

    #[test]
    fn field_errors_keep_order_and_lookup() {
        let mut errors = FieldErrors::new();
        errors.push("sku_parent", "El SKU es requerido");
        errors.push("price", "El precio debe ser mayor que 0");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first("price"), Some("El precio debe ser mayor que 0"));
        assert_eq!(errors.first("brand"), None);
        assert_eq!(
            errors.to_string(),
            "El SKU es requerido; El precio debe ser mayor que 0"
        );
    }
}
