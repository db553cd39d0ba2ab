//! Types for authentication and user management

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// An authentication identity as returned by the auth API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user ID, shared with the matching profile row
    pub id: Uuid,

    /// The user's email address
    #[serde(default)]
    pub email: Option<String>,

    /// Token audience role (`authenticated`), unrelated to the application role
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub app_metadata: Map<String, Value>,

    #[serde(default)]
    pub user_metadata: Map<String, Value>,

    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Email and password credentials
#[derive(Debug, Clone, Serialize)]
pub struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Attributes accepted by the admin user endpoints
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminUserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Mark the email as confirmed without sending a confirmation mail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_confirm: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<Value>,
}
