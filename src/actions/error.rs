use thiserror::Error;

use super::guard::AdminAction;
use crate::error::Error as BackendError;
use crate::validation::FieldErrors;

/// Failure of an admin action.
///
/// `Display` is the fixed Spanish message shown to the operator; backend
/// details stay in `source` and in the logs.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The input failed its schema; nothing reached the backend
    #[error("{0}")]
    Validation(FieldErrors),

    /// No valid session
    #[error("No autorizado")]
    Unauthorized,

    /// Authenticated, but not an administrator
    #[error("{}", .0.forbidden_message())]
    Forbidden(AdminAction),

    #[error("No puedes eliminar tu propia cuenta")]
    SelfDeletion,

    /// A human-facing unique value is taken
    #[error("{message}")]
    Conflict {
        field: String,
        message: &'static str,
    },

    /// Dependent rows block the operation
    #[error("{message}")]
    Dependency { count: u64, message: String },

    #[error("{0}")]
    NotFound(&'static str),

    /// Any other backend or network failure
    #[error("{message}")]
    Backend {
        message: &'static str,
        #[source]
        source: BackendError,
    },
}

impl ActionError {
    pub(crate) fn conflict(field: impl Into<String>, message: &'static str) -> Self {
        ActionError::Conflict {
            field: field.into(),
            message,
        }
    }

    /// Wrap a backend failure under a fixed message, logging the cause.
    ///
    /// Meant for `map_err`: `.map_err(ActionError::backend("Error al crear tienda"))`.
    pub(crate) fn backend(message: &'static str) -> impl FnOnce(BackendError) -> Self {
        move |source| {
            tracing::error!(error = %source, "{}", message);
            ActionError::Backend { message, source }
        }
    }

    /// Field the error belongs to, for errors shown next to a form input
    pub fn field(&self) -> Option<&str> {
        match self {
            ActionError::Conflict { field, .. } => Some(field),
            ActionError::Validation(errors) => errors.iter().next().map(|e| e.field.as_str()),
            _ => None,
        }
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, ActionError::Unauthorized | ActionError::Forbidden(_))
    }
}

impl From<FieldErrors> for ActionError {
    fn from(errors: FieldErrors) -> Self {
        ActionError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn messages_are_fixed_and_spanish() {
        assert_eq!(ActionError::Unauthorized.to_string(), "No autorizado");
        assert_eq!(
            ActionError::Forbidden(AdminAction::ManageProducts).to_string(),
            "Solo los administradores pueden gestionar productos"
        );
        assert_eq!(
            ActionError::SelfDeletion.to_string(),
            "No puedes eliminar tu propia cuenta"
        );

        let err = ActionError::backend("Error al crear tienda")(BackendError::api(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"connection refused"}"#,
        ));
        assert_eq!(err.to_string(), "Error al crear tienda");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn conflict_carries_its_field() {
        let err = ActionError::conflict("sku_parent", "Este SKU padre ya existe");
        assert_eq!(err.field(), Some("sku_parent"));
        assert_eq!(err.to_string(), "Este SKU padre ya existe");
        assert!(!err.is_authorization());
    }
}
