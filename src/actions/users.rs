use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::products::IdRow;
use super::{ActionError, AdminAction, AdminService, Caller, USERS_PATH};
use crate::auth::AdminUserAttributes;
use crate::models::{tables, ProfileInput, ProfileWithStore, Role};
use crate::validation::{CreateUserInput, ResetPasswordInput, Schema, UpdateUserInput};

const WITH_STORE: &str = "*, stores(id, name)";

pub const EMAIL_TAKEN: &str = "Este correo electrónico ya está en uso";
pub const USER_NOT_FOUND: &str = "Usuario no encontrado";

#[derive(Serialize)]
struct ProfileRow<'a> {
    id: Uuid,
    #[serde(flatten)]
    profile: &'a ProfileInput,
}

#[derive(Deserialize)]
struct ExistingProfile {
    email: String,
    role: Role,
}

/// User account actions. An account is an auth identity plus a profile row
/// sharing the same id.
pub struct Users<'a> {
    service: &'a AdminService,
}

impl<'a> Users<'a> {
    pub(crate) fn new(service: &'a AdminService) -> Self {
        Self { service }
    }

    /// All profiles with their store, newest first
    pub async fn list(&self) -> Result<Vec<ProfileWithStore>, ActionError> {
        self.service
            .backend()
            .from(tables::PROFILES)
            .select(WITH_STORE)
            .order("created_at", false)
            .execute()
            .await
            .map_err(ActionError::backend("Error al obtener usuarios"))
    }

    /// Create the auth identity, then its profile.
    ///
    /// If the profile cannot be written the identity is deleted again. A
    /// profile row that already exists for the new id (left by a database
    /// trigger, for instance) is updated instead of inserted.
    pub async fn create(
        &self,
        caller: &Caller,
        input: &CreateUserInput,
    ) -> Result<ProfileWithStore, ActionError> {
        self.service
            .guard()
            .require_admin(caller, AdminAction::CreateUser)
            .await?;
        let user = input.safe_parse()?;

        if !self.check_email_unique(&user.email, None).await? {
            return Err(ActionError::conflict("email", EMAIL_TAKEN));
        }

        let backend = self.service.backend();
        let attributes = AdminUserAttributes {
            email: Some(user.email.clone()),
            password: Some(user.password.clone()),
            email_confirm: Some(true),
            user_metadata: Some(json!({ "role": user.role })),
        };
        let identity = backend
            .auth()
            .admin()
            .create_user(&attributes)
            .await
            .map_err(|e| {
                if e.is_email_taken() {
                    ActionError::conflict("email", EMAIL_TAKEN)
                } else {
                    ActionError::backend("Error al crear usuario")(e)
                }
            })?;

        let profile = user.profile();
        let existing = match backend
            .from(tables::PROFILES)
            .select("id")
            .eq("id", identity.id)
            .maybe_single::<IdRow>()
            .await
        {
            Ok(row) => row,
            Err(e) => {
                tracing::debug!(user_id = %identity.id, error = %e, "profile lookup failed, inserting");
                None
            }
        };

        let created = if existing.is_some() {
            backend
                .from(tables::PROFILES)
                .update(&profile)
                .eq("id", identity.id)
                .select(WITH_STORE)
                .single()
                .await
                .map_err(ActionError::backend(
                    "Error al actualizar perfil de usuario existente",
                ))?
        } else {
            let row = ProfileRow {
                id: identity.id,
                profile: &profile,
            };
            match backend
                .from(tables::PROFILES)
                .insert(&row)
                .select(WITH_STORE)
                .single()
                .await
            {
                Ok(created) => created,
                Err(e) => {
                    let id = identity.id.to_string();
                    if let Err(cleanup) = backend.auth().admin().delete_user(&id).await {
                        tracing::warn!(user_id = %id, error = %cleanup, "orphaned auth identity");
                    }
                    return Err(if e.is_unique_violation() {
                        ActionError::conflict("email", EMAIL_TAKEN)
                    } else {
                        ActionError::backend("Error al crear perfil de usuario")(e)
                    });
                }
            }
        };

        tracing::info!(user_id = %identity.id, role = %user.role, "user created");
        self.service.revalidate(USERS_PATH);
        Ok(created)
    }

    /// Update the auth email first, then the profile. An empty edit returns
    /// the profile unchanged.
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        input: &UpdateUserInput,
    ) -> Result<ProfileWithStore, ActionError> {
        self.service
            .guard()
            .require_admin(caller, AdminAction::UpdateUser)
            .await?;
        let update = input.safe_parse()?;

        let backend = self.service.backend();
        if update.is_empty() {
            return backend
                .from(tables::PROFILES)
                .select(WITH_STORE)
                .eq("id", id)
                .maybe_single()
                .await
                .map_err(ActionError::backend("Error al obtener usuario"))?
                .ok_or(ActionError::NotFound(USER_NOT_FOUND));
        }

        if let Some(email) = &update.email {
            if !self.check_email_unique(email, Some(id)).await? {
                return Err(ActionError::conflict("email", EMAIL_TAKEN));
            }
            let attributes = AdminUserAttributes {
                email: Some(email.clone()),
                ..AdminUserAttributes::default()
            };
            backend
                .auth()
                .admin()
                .update_user_by_id(&id.to_string(), &attributes)
                .await
                .map_err(|e| {
                    if e.is_email_taken() {
                        ActionError::conflict("email", EMAIL_TAKEN)
                    } else {
                        ActionError::backend("Error al actualizar correo electrónico")(e)
                    }
                })?;
        }

        let profile = backend
            .from(tables::PROFILES)
            .update(&update)
            .eq("id", id)
            .select(WITH_STORE)
            .single()
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ActionError::conflict("email", EMAIL_TAKEN)
                } else {
                    ActionError::backend("Error al actualizar usuario")(e)
                }
            })?;

        tracing::info!(user_id = %id, "user updated");
        self.service.revalidate(USERS_PATH);
        Ok(profile)
    }

    /// Delete the profile, then the auth identity.
    ///
    /// Nobody may delete their own account. A failure deleting the identity
    /// is only logged: the profile is already gone and the identity may
    /// have been removed before.
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), ActionError> {
        let guard = self.service.guard();
        let current = guard.current_user(caller).await?;
        if current.id == id {
            return Err(ActionError::SelfDeletion);
        }
        guard.authorize(&current, AdminAction::DeleteUser).await?;

        let backend = self.service.backend();
        let target: ExistingProfile = backend
            .from(tables::PROFILES)
            .select("email, role")
            .eq("id", id)
            .maybe_single()
            .await
            .map_err(ActionError::backend("Error al obtener usuarios"))?
            .ok_or(ActionError::NotFound(USER_NOT_FOUND))?;

        backend
            .from(tables::PROFILES)
            .delete()
            .eq("id", id)
            .execute_no_return()
            .await
            .map_err(ActionError::backend("Error al eliminar perfil de usuario"))?;

        if let Err(e) = backend.auth().admin().delete_user(&id.to_string()).await {
            tracing::warn!(user_id = %id, error = %e, "auth identity not deleted");
        }

        tracing::info!(user_id = %id, email = %target.email, role = %target.role, "user deleted");
        self.service.revalidate(USERS_PATH);
        Ok(())
    }

    /// Email a password-reset link pointing back at the application
    pub async fn reset_password(
        &self,
        caller: &Caller,
        input: &ResetPasswordInput,
    ) -> Result<(), ActionError> {
        self.service
            .guard()
            .require_admin(caller, AdminAction::ResetPassword)
            .await?;
        let email = input.safe_parse()?;

        let redirect = self.service.config().password_reset_redirect();
        self.service
            .backend()
            .auth()
            .reset_password_for_email(&email, Some(&redirect))
            .await
            .map_err(ActionError::backend(
                "Error al enviar correo de restablecimiento de contraseña",
            ))?;

        tracing::info!(email = %email, "password reset sent");
        Ok(())
    }

    /// `true` when no other profile uses `email`
    pub async fn check_email_unique(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, ActionError> {
        let mut query = self
            .service
            .backend()
            .from(tables::PROFILES)
            .select("id")
            .eq("email", email);
        if let Some(id) = exclude {
            query = query.neq("id", id);
        }

        let rows: Vec<IdRow> = query
            .execute()
            .await
            .map_err(ActionError::backend("Error al verificar correo electrónico"))?;
        Ok(rows.is_empty())
    }
}
