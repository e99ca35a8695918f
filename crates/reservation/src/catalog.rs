//! Product catalog and user registration.
//!
//! These live on [`ReservationWorkflow`] because deleting a product has to
//! take the same product lock as cart additions.

use common::ProductId;
use domain::{NewProduct, Product, UserSummary};
use inventory_store::{InventoryStore, ProductRemoval};

use crate::error::{ReservationError, Result};
use crate::workflow::ReservationWorkflow;

impl<S: InventoryStore> ReservationWorkflow<S> {
    #[tracing::instrument(skip(self, product), fields(operation = "create_product"))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let product = product.into_product();
        self.store.insert_product(product.clone()).await?;
        tracing::info!(product_id = %product.id, stock = product.stock, "product created");
        Ok(product)
    }

    pub async fn get_product(&self, product_id: ProductId) -> Result<Product> {
        self.store
            .get_product(product_id)
            .await?
            .ok_or(ReservationError::ProductNotFound(product_id))
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.store.list_products().await?)
    }

    /// Deletes a product that no pending purchase line references.
    ///
    /// Lines that are already paid keep pointing at the deleted id; reports
    /// show them without product details.
    #[tracing::instrument(skip(self), fields(operation = "delete_product"))]
    pub async fn delete_product(&self, product_id: ProductId) -> Result<Product> {
        let _product = self.product_locks.lock(product_id).await;
        match self.store.remove_product_if_unreserved(product_id).await? {
            ProductRemoval::Removed(product) => {
                tracing::info!("product deleted");
                Ok(product)
            }
            ProductRemoval::InUse { pending_lines } => Err(ReservationError::ProductInUse {
                product_id,
                pending_lines,
            }),
            ProductRemoval::Missing => Err(ReservationError::ProductNotFound(product_id)),
        }
    }

    /// Records or refreshes the display details of a user.
    pub async fn register_user(&self, user: UserSummary) -> Result<UserSummary> {
        self.store.upsert_user(user.clone()).await?;
        Ok(user)
    }
}
