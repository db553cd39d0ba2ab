use std::collections::HashSet;

use serde::Deserialize;
use uuid::Uuid;

use super::{ActionError, AdminAction, AdminService, Caller, PRODUCTS_PATH};
use crate::models::{tables, ProductWithVariants, SkuKind, Variant, VariantInsert};
use crate::validation::{
    CreateProductInput, CreateVariantInput, Schema, UpdateProductInput, UpdateVariantInput,
};

const WITH_VARIANTS: &str = "*, variants(*)";

pub const PARENT_SKU_TAKEN: &str = "Este SKU padre ya existe";
pub const CHILD_SKU_TAKEN: &str = "Este SKU hijo ya existe";
pub const SOME_CHILD_SKU_TAKEN: &str = "Uno de los SKU hijo ya existe";
pub const HAS_VARIANTS: &str = "No se puede eliminar el producto porque tiene variantes asociadas";

#[derive(Deserialize)]
pub(crate) struct IdRow {
    pub id: Uuid,
}

/// Product and variant actions
pub struct Products<'a> {
    service: &'a AdminService,
}

impl<'a> Products<'a> {
    pub(crate) fn new(service: &'a AdminService) -> Self {
        Self { service }
    }

    /// All products with their variants, newest first
    pub async fn list(&self) -> Result<Vec<ProductWithVariants>, ActionError> {
        self.service
            .backend()
            .from(tables::PRODUCTS)
            .select(WITH_VARIANTS)
            .order("created_at", false)
            .execute()
            .await
            .map_err(ActionError::backend("Error al obtener productos"))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<ProductWithVariants>, ActionError> {
        self.service
            .backend()
            .from(tables::PRODUCTS)
            .select(WITH_VARIANTS)
            .eq("id", id)
            .maybe_single()
            .await
            .map_err(ActionError::backend("Error al obtener producto"))
    }

    /// Create a product together with its variants.
    ///
    /// The two inserts are separate requests. When the variant insert fails
    /// the product row is deleted again; a crash between the two leaves an
    /// orphan product without variants.
    pub async fn create(
        &self,
        caller: &Caller,
        input: &CreateProductInput,
    ) -> Result<ProductWithVariants, ActionError> {
        self.service
            .guard()
            .require_admin(caller, AdminAction::ManageProducts)
            .await?;
        let valid = input.safe_parse()?;

        if !self
            .check_sku_unique(&valid.product.sku_parent, SkuKind::Parent, None)
            .await?
        {
            return Err(ActionError::conflict("sku_parent", PARENT_SKU_TAKEN));
        }
        let mut submitted = HashSet::new();
        for (i, variant) in &valid.variants {
            let field = format!("variants.{}.sku_child", i);
            if !submitted.insert(variant.sku_child.as_str())
                || !self
                    .check_sku_unique(&variant.sku_child, SkuKind::Child, None)
                    .await?
            {
                return Err(ActionError::conflict(field, CHILD_SKU_TAKEN));
            }
        }

        let backend = self.service.backend();
        let product: IdRow = backend
            .from(tables::PRODUCTS)
            .insert(&valid.product)
            .select("id")
            .single()
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ActionError::conflict("sku_parent", PARENT_SKU_TAKEN)
                } else {
                    ActionError::backend("Error al crear producto")(e)
                }
            })?;

        if !valid.variants.is_empty() {
            let rows: Vec<VariantInsert> = valid
                .variants
                .iter()
                .map(|(_, v)| VariantInsert {
                    product_id: product.id,
                    sku_child: v.sku_child.clone(),
                    size: v.size.clone(),
                })
                .collect();

            if let Err(e) = backend
                .from(tables::VARIANTS)
                .insert(&rows)
                .execute_no_return()
                .await
            {
                tracing::warn!(product_id = %product.id, error = %e, "variant insert failed, removing product");
                if let Err(cleanup) = backend
                    .from(tables::PRODUCTS)
                    .delete()
                    .eq("id", product.id)
                    .execute_no_return()
                    .await
                {
                    tracing::error!(product_id = %product.id, error = %cleanup, "orphan product left behind");
                }
                return Err(if e.is_unique_violation() {
                    ActionError::conflict("variants", SOME_CHILD_SKU_TAKEN)
                } else {
                    ActionError::backend("Error al crear variantes del producto")(e)
                });
            }
        }

        let created = backend
            .from(tables::PRODUCTS)
            .select(WITH_VARIANTS)
            .eq("id", product.id)
            .single()
            .await
            .map_err(ActionError::backend("Error al obtener producto completo"))?;

        tracing::info!(product_id = %product.id, variants = valid.variants.len(), "product created");
        self.service.revalidate(PRODUCTS_PATH);
        Ok(created)
    }

    /// Apply a partial edit; an empty edit returns the product unchanged
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        input: &UpdateProductInput,
    ) -> Result<ProductWithVariants, ActionError> {
        self.service
            .guard()
            .require_admin(caller, AdminAction::ManageProducts)
            .await?;
        let update = input.safe_parse()?;

        let backend = self.service.backend();
        if update.is_empty() {
            return backend
                .from(tables::PRODUCTS)
                .select(WITH_VARIANTS)
                .eq("id", id)
                .single()
                .await
                .map_err(ActionError::backend("Error al obtener producto"));
        }

        if let Some(sku) = &update.sku_parent {
            if !self.check_sku_unique(sku, SkuKind::Parent, Some(id)).await? {
                return Err(ActionError::conflict("sku_parent", PARENT_SKU_TAKEN));
            }
        }

        let product = backend
            .from(tables::PRODUCTS)
            .update(&update)
            .eq("id", id)
            .select(WITH_VARIANTS)
            .single()
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ActionError::conflict("sku_parent", PARENT_SKU_TAKEN)
                } else {
                    ActionError::backend("Error al actualizar producto")(e)
                }
            })?;

        tracing::info!(product_id = %id, "product updated");
        self.service.revalidate(PRODUCTS_PATH);
        Ok(product)
    }

    /// Delete a product that has no variants left
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), ActionError> {
        self.service
            .guard()
            .require_admin(caller, AdminAction::ManageProducts)
            .await?;

        let backend = self.service.backend();
        let count = backend
            .from(tables::VARIANTS)
            .select("id")
            .eq("product_id", id)
            .count()
            .await
            .map_err(ActionError::backend("Error al verificar inventario"))?;
        if count > 0 {
            return Err(ActionError::Dependency {
                count,
                message: HAS_VARIANTS.to_string(),
            });
        }

        backend
            .from(tables::PRODUCTS)
            .delete()
            .eq("id", id)
            .execute_no_return()
            .await
            .map_err(ActionError::backend("Error al eliminar producto"))?;

        tracing::info!(product_id = %id, "product deleted");
        self.service.revalidate(PRODUCTS_PATH);
        Ok(())
    }

    pub async fn create_variant(
        &self,
        caller: &Caller,
        input: &CreateVariantInput,
    ) -> Result<Variant, ActionError> {
        self.service
            .guard()
            .require_admin(caller, AdminAction::ManageProducts)
            .await?;
        let row = input.safe_parse()?;

        if !self
            .check_sku_unique(&row.sku_child, SkuKind::Child, None)
            .await?
        {
            return Err(ActionError::conflict("sku_child", CHILD_SKU_TAKEN));
        }

        let variant: Variant = self
            .service
            .backend()
            .from(tables::VARIANTS)
            .insert(&row)
            .select("*")
            .single()
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ActionError::conflict("sku_child", CHILD_SKU_TAKEN)
                } else {
                    ActionError::backend("Error al crear variante")(e)
                }
            })?;

        tracing::info!(variant_id = %variant.id, product_id = %variant.product_id, "variant created");
        self.service.revalidate(PRODUCTS_PATH);
        Ok(variant)
    }

    pub async fn update_variant(
        &self,
        caller: &Caller,
        id: Uuid,
        input: &UpdateVariantInput,
    ) -> Result<Variant, ActionError> {
        self.service
            .guard()
            .require_admin(caller, AdminAction::ManageProducts)
            .await?;
        let update = input.safe_parse()?;

        let backend = self.service.backend();
        if update.is_empty() {
            return backend
                .from(tables::VARIANTS)
                .select("*")
                .eq("id", id)
                .single()
                .await
                .map_err(ActionError::backend("Error al obtener variante"));
        }

        if let Some(sku) = &update.sku_child {
            if !self.check_sku_unique(sku, SkuKind::Child, Some(id)).await? {
                return Err(ActionError::conflict("sku_child", CHILD_SKU_TAKEN));
            }
        }

        let variant = backend
            .from(tables::VARIANTS)
            .update(&update)
            .eq("id", id)
            .select("*")
            .single()
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ActionError::conflict("sku_child", CHILD_SKU_TAKEN)
                } else {
                    ActionError::backend("Error al actualizar variante")(e)
                }
            })?;

        tracing::info!(variant_id = %id, "variant updated");
        self.service.revalidate(PRODUCTS_PATH);
        Ok(variant)
    }

    pub async fn delete_variant(&self, caller: &Caller, id: Uuid) -> Result<(), ActionError> {
        self.service
            .guard()
            .require_admin(caller, AdminAction::ManageProducts)
            .await?;

        self.service
            .backend()
            .from(tables::VARIANTS)
            .delete()
            .eq("id", id)
            .execute_no_return()
            .await
            .map_err(ActionError::backend("Error al eliminar variante"))?;

        tracing::info!(variant_id = %id, "variant deleted");
        self.service.revalidate(PRODUCTS_PATH);
        Ok(())
    }

    /// `true` when no other product (or variant) holds `sku`.
    ///
    /// `exclude` lets a row keep its own value while being edited.
    pub async fn check_sku_unique(
        &self,
        sku: &str,
        kind: SkuKind,
        exclude: Option<Uuid>,
    ) -> Result<bool, ActionError> {
        let mut query = self
            .service
            .backend()
            .from(kind.table())
            .select("id")
            .eq(kind.column(), sku);
        if let Some(id) = exclude {
            query = query.neq("id", id);
        }

        let rows: Vec<IdRow> = query
            .execute()
            .await
            .map_err(ActionError::backend("Error al verificar unicidad de SKU"))?;
        Ok(rows.is_empty())
    }
}
