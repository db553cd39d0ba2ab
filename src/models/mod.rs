//! Rows of the `stores`, `products`, `variants` and `profiles` tables

mod product;
mod profile;
mod store;

pub use product::*;
pub use profile::*;
pub use store::*;

/// Table names
pub mod tables {
    pub const STORES: &str = "stores";
    pub const PRODUCTS: &str = "products";
    pub const VARIANTS: &str = "variants";
    pub const PROFILES: &str = "profiles";
}
