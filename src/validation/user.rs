use std::fmt;

use serde::Deserialize;
use uuid::Uuid;

use super::{double_option, is_email, parse_uuid, FieldErrors, Rule, Schema};
use crate::models::{ProfileInput, ProfileUpdate, Role};

pub const EMAIL_INVALID: &str = "Correo electrónico inválido";
pub const EMAIL_REQUIRED: &str = "El correo electrónico es requerido";
pub const PASSWORD_TOO_SHORT: &str = "La contraseña debe tener al menos 8 caracteres";
pub const PASSWORD_WEAK: &str =
    "La contraseña debe contener al menos una letra mayúscula, una minúscula y un número";
pub const INVALID_STORE_ID: &str = "ID de tienda inválido";

fn email(value: &str) -> Rule<String> {
    if !is_email(value) {
        return Err(EMAIL_INVALID);
    }
    Ok(value.to_string())
}

/// At least 8 characters with an ASCII lowercase, uppercase and digit
pub fn password(value: &str) -> Rule<String> {
    if value.chars().count() < 8 {
        return Err(PASSWORD_TOO_SHORT);
    }
    let has = |f: fn(&char) -> bool| value.chars().any(|c| f(&c));
    if !(has(char::is_ascii_lowercase) && has(char::is_ascii_uppercase) && has(char::is_ascii_digit))
    {
        return Err(PASSWORD_WEAK);
    }
    Ok(value.to_string())
}

fn store_id(value: Option<&str>) -> Rule<Option<Uuid>> {
    value.map(|v| parse_uuid(v, INVALID_STORE_ID)).transpose()
}

/// New account form
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub store_id: Option<String>,
}

impl fmt::Debug for CreateUserInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserInput")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("role", &self.role)
            .field("store_id", &self.store_id)
            .finish()
    }
}

/// A validated new user: the auth credentials plus the profile to write
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub store_id: Option<Uuid>,
}

impl NewUser {
    pub fn profile(&self) -> ProfileInput {
        ProfileInput {
            email: self.email.clone(),
            role: self.role,
            store_id: self.store_id,
        }
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("store_id", &self.store_id)
            .finish_non_exhaustive()
    }
}

impl Schema for CreateUserInput {
    type Output = NewUser;

    fn safe_parse(&self) -> Result<NewUser, FieldErrors> {
        let mut errors = FieldErrors::new();
        // The format rule runs first, so an empty address reads as invalid.
        let email = errors.check("email", email(&self.email));
        let password = errors.check("password", password(&self.password));
        let store_id = errors.check("store_id", store_id(self.store_id.as_deref()));

        errors.into_result(|| {
            Some(NewUser {
                email: email?,
                password: password?,
                role: self.role,
                store_id: store_id?,
            })
        })
    }
}

/// Partial account edit. An explicit `"store_id": null` clears the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateUserInput {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "double_option")]
    pub store_id: Option<Option<String>>,
}

impl Schema for UpdateUserInput {
    type Output = ProfileUpdate;

    fn safe_parse(&self) -> Result<ProfileUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let email = self
            .email
            .as_deref()
            .and_then(|v| errors.check("email", email(v)));
        let store_id = self
            .store_id
            .as_ref()
            .and_then(|v| errors.check("store_id", store_id(v.as_deref())));

        errors.into_result(|| {
            Some(ProfileUpdate {
                email,
                role: self.role,
                store_id,
            })
        })
    }
}

/// Password reset request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordInput {
    pub email: String,
}

impl Schema for ResetPasswordInput {
    type Output = String;

    fn safe_parse(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::new();
        let rule = if self.email.is_empty() {
            Err(EMAIL_REQUIRED)
        } else {
            email(&self.email)
        };
        let email = errors.check("email", rule);
        errors.into_result(|| email)
    }
}
