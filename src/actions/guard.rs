use serde::Deserialize;
use uuid::Uuid;

use super::{ActionError, Caller};
use crate::auth::User;
use crate::models::{tables, Role};
use crate::Backend;

/// Mutations reserved to administrators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminAction {
    CreateUser,
    UpdateUser,
    DeleteUser,
    ResetPassword,
    ManageProducts,
    ManageStores,
}

impl AdminAction {
    pub fn forbidden_message(&self) -> &'static str {
        match self {
            AdminAction::CreateUser => "Solo los administradores pueden crear usuarios",
            AdminAction::UpdateUser => "Solo los administradores pueden actualizar usuarios",
            AdminAction::DeleteUser => "Solo los administradores pueden eliminar usuarios",
            AdminAction::ResetPassword => {
                "Solo los administradores pueden restablecer contraseñas"
            }
            AdminAction::ManageProducts => "Solo los administradores pueden gestionar productos",
            AdminAction::ManageStores => "Solo los administradores pueden gestionar tiendas",
        }
    }
}

#[derive(Deserialize)]
struct RoleRow {
    role: String,
}

/// Read-only checks run before every admin mutation
pub struct AdminGuard<'a> {
    backend: &'a Backend,
}

impl<'a> AdminGuard<'a> {
    pub(crate) fn new(backend: &'a Backend) -> Self {
        Self { backend }
    }

    /// Resolve the identity behind the caller's token with the auth API.
    ///
    /// A missing token and any rejection from the auth API are both
    /// `Unauthorized`.
    pub async fn current_user(&self, caller: &Caller) -> Result<User, ActionError> {
        let token = caller.access_token().ok_or(ActionError::Unauthorized)?;
        self.backend.auth().get_user(token).await.map_err(|e| {
            tracing::debug!(error = %e, "session rejected");
            ActionError::Unauthorized
        })
    }

    /// Stored role of a profile; `None` when there is no profile or the role
    /// is not one this application knows.
    pub async fn role_of(&self, user_id: Uuid) -> Result<Option<Role>, ActionError> {
        let row = self
            .backend
            .from(tables::PROFILES)
            .select("role")
            .eq("id", user_id)
            .maybe_single::<RoleRow>()
            .await
            .map_err(ActionError::backend("Error al verificar permisos"))?;

        Ok(row.and_then(|r| r.role.parse().ok()))
    }

    /// Fail with `Forbidden` unless `user` is an administrator
    pub async fn authorize(&self, user: &User, action: AdminAction) -> Result<(), ActionError> {
        match self.role_of(user.id).await? {
            Some(Role::Admin) => Ok(()),
            Some(Role::Promotora) | None => {
                tracing::warn!(user_id = %user.id, ?action, "admin action refused");
                Err(ActionError::Forbidden(action))
            }
        }
    }

    /// Authenticate the caller and require the admin role
    pub async fn require_admin(
        &self,
        caller: &Caller,
        action: AdminAction,
    ) -> Result<User, ActionError> {
        let user = self.current_user(caller).await?;
        self.authorize(&user, action).await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_names_itself_in_the_refusal() {
        let actions = [
            (AdminAction::CreateUser, "crear usuarios"),
            (AdminAction::UpdateUser, "actualizar usuarios"),
            (AdminAction::DeleteUser, "eliminar usuarios"),
            (AdminAction::ResetPassword, "restablecer contraseñas"),
            (AdminAction::ManageProducts, "gestionar productos"),
            (AdminAction::ManageStores, "gestionar tiendas"),
        ];
        for (action, suffix) in actions {
            let message = action.forbidden_message();
            assert!(message.starts_with("Solo los administradores pueden "));
            assert!(message.ends_with(suffix));
        }
    }
}
