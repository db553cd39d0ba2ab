use chrono::Utc;
use uuid::Uuid;

use super::products::IdRow;
use super::{ActionError, AdminAction, AdminService, Caller, STORES_PATH};
use crate::models::{tables, DeletionCheck, Store, StoreInput};
use crate::validation::{Schema, UpdateStoreInput};

pub const NAME_TAKEN: &str = "Este nombre de tienda ya está en uso";

/// Store actions
pub struct Stores<'a> {
    service: &'a AdminService,
}

impl<'a> Stores<'a> {
    pub(crate) fn new(service: &'a AdminService) -> Self {
        Self { service }
    }

    /// All stores ordered by name
    pub async fn list(&self) -> Result<Vec<Store>, ActionError> {
        self.service
            .backend()
            .from(tables::STORES)
            .select("*")
            .order("name", true)
            .execute()
            .await
            .map_err(ActionError::backend("Error al obtener tiendas"))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Store>, ActionError> {
        self.service
            .backend()
            .from(tables::STORES)
            .select("*")
            .eq("id", id)
            .maybe_single()
            .await
            .map_err(ActionError::backend("Error al obtener tienda"))
    }

    /// Create a store from any schema producing a [`StoreInput`], typed
    /// values or the raw browser form alike
    pub async fn create<S>(&self, caller: &Caller, input: &S) -> Result<Store, ActionError>
    where
        S: Schema<Output = StoreInput>,
    {
        self.service
            .guard()
            .require_admin(caller, AdminAction::ManageStores)
            .await?;
        let store = input.safe_parse()?;

        if !self.is_name_available(&store.name, None).await? {
            return Err(ActionError::conflict("name", NAME_TAKEN));
        }

        let created: Store = self
            .service
            .backend()
            .from(tables::STORES)
            .insert(&store)
            .select("*")
            .single()
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ActionError::conflict("name", NAME_TAKEN)
                } else {
                    ActionError::backend("Error al crear tienda")(e)
                }
            })?;

        tracing::info!(store_id = %created.id, name = %created.name, "store created");
        self.service.revalidate(STORES_PATH);
        Ok(created)
    }

    /// Apply a partial edit and stamp `updated_at`
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        input: &UpdateStoreInput,
    ) -> Result<Store, ActionError> {
        self.service
            .guard()
            .require_admin(caller, AdminAction::ManageStores)
            .await?;
        let mut update = input.safe_parse()?;

        if let Some(name) = &update.name {
            if !self.is_name_available(name, Some(id)).await? {
                return Err(ActionError::conflict("name", NAME_TAKEN));
            }
        }
        update.updated_at = Some(Utc::now());

        let store = self
            .service
            .backend()
            .from(tables::STORES)
            .update(&update)
            .eq("id", id)
            .select("*")
            .single()
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ActionError::conflict("name", NAME_TAKEN)
                } else {
                    ActionError::backend("Error al actualizar tienda")(e)
                }
            })?;

        tracing::info!(store_id = %id, "store updated");
        self.service.revalidate(STORES_PATH);
        Ok(store)
    }

    /// Count the profiles still assigned to the store. Never deletes.
    pub async fn check_dependencies(&self, id: Uuid) -> Result<DeletionCheck, ActionError> {
        let count = self
            .service
            .backend()
            .from(tables::PROFILES)
            .select("id")
            .eq("store_id", id)
            .count()
            .await
            .map_err(ActionError::backend("Error al verificar dependencias"))?;

        Ok(DeletionCheck::from_profile_count(count))
    }

    /// Delete a store once the dependency gate reports it safe
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), ActionError> {
        self.service
            .guard()
            .require_admin(caller, AdminAction::ManageStores)
            .await?;

        let check = self.check_dependencies(id).await?;
        if let Some(message) = check.message() {
            tracing::info!(store_id = %id, profiles = check.profile_count(), "store deletion blocked");
            return Err(ActionError::Dependency {
                count: check.profile_count(),
                message,
            });
        }

        self.service
            .backend()
            .from(tables::STORES)
            .delete()
            .eq("id", id)
            .execute_no_return()
            .await
            .map_err(ActionError::backend("Error al eliminar tienda"))?;

        tracing::info!(store_id = %id, "store deleted");
        self.service.revalidate(STORES_PATH);
        Ok(())
    }

    /// `true` when no other store is called `name`
    pub async fn is_name_available(
        &self,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, ActionError> {
        let mut query = self
            .service
            .backend()
            .from(tables::STORES)
            .select("id")
            .eq("name", name);
        if let Some(id) = exclude {
            query = query.neq("id", id);
        }

        let rows: Vec<IdRow> = query
            .execute()
            .await
            .map_err(ActionError::backend("Error al verificar disponibilidad del nombre"))?;
        Ok(rows.is_empty())
    }
}
