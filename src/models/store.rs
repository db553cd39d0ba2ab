use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical store and the catalog limits it is allowed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub max_skus: i32,
    pub max_brands: i32,
    pub max_inventory: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated values for a new store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreInput {
    pub name: String,
    pub max_skus: i32,
    pub max_brands: i32,
    pub max_inventory: i32,
}

/// Validated partial update of a store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_skus: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_brands: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_inventory: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoreUpdate {
    /// No column to change
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.max_skus.is_none()
            && self.max_brands.is_none()
            && self.max_inventory.is_none()
    }
}

impl From<StoreInput> for StoreUpdate {
    fn from(input: StoreInput) -> Self {
        Self {
            name: Some(input.name),
            max_skus: Some(input.max_skus),
            max_brands: Some(input.max_brands),
            max_inventory: Some(input.max_inventory),
            updated_at: None,
        }
    }
}

/// Minimal store reference embedded in profile listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRef {
    pub id: Uuid,
    pub name: String,
}

/// Whether a store can be deleted right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionCheck {
    Safe,
    /// Profiles still point at the store
    Blocked { profile_count: u64 },
}

impl DeletionCheck {
    pub fn from_profile_count(profile_count: u64) -> Self {
        if profile_count > 0 {
            DeletionCheck::Blocked { profile_count }
        } else {
            DeletionCheck::Safe
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, DeletionCheck::Blocked { .. })
    }

    pub fn profile_count(&self) -> u64 {
        match self {
            DeletionCheck::Safe => 0,
            DeletionCheck::Blocked { profile_count } => *profile_count,
        }
    }

    /// User-facing explanation of a blocked deletion
    pub fn message(&self) -> Option<String> {
        match self {
            DeletionCheck::Safe => None,
            DeletionCheck::Blocked { profile_count } => Some(format!(
                "Esta tienda tiene {} {}. Reasigne o elimine todos los usuarios asociados antes de eliminarla.",
                profile_count,
                associated_users(*profile_count)
            )),
        }
    }
}

/// `usuario asociado` / `usuarios asociados`
pub fn associated_users(count: u64) -> &'static str {
    crate::format::pluralize(count, "usuario asociado", "usuarios asociados")
}
