use async_trait::async_trait;
use common::{CartLineId, ProductId, UserId};
use domain::{CartLine, OrderStatus, PaymentStatus, Product, UserSummary};

use crate::{LineQuery, Result};

/// Outcome of a conditional stock update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockUpdate {
    /// The delta was applied; `stock` is the new value.
    Applied { stock: u32 },
    /// The delta would have taken stock out of range; nothing changed.
    /// `stock` is the value observed when the update was refused.
    Rejected { stock: u32 },
    /// No product has this id.
    ProductMissing,
}

/// Outcome of a compare-and-set on a cart line's order status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The status was replaced; carries the updated line.
    Updated(CartLine),
    /// The stored status no longer matched the expected one.
    Stale { current: Option<OrderStatus> },
    /// No cart line has this id.
    LineMissing,
}

/// Outcome of a guarded product deletion.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductRemoval {
    /// The product was deleted; carries the removed record.
    Removed(Product),
    /// Pending purchase lines still hold stock of this product.
    InUse { pending_lines: u64 },
    /// No product has this id.
    Missing,
}

/// Core trait for inventory store implementations.
///
/// Every method is a single atomic step against the backing store. Callers
/// that need several steps to appear atomic (for example decrementing stock
/// and then inserting a cart line) must sequence them and compensate on
/// failure themselves.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Inserts a new product. Fails with `DuplicateId` if the id is taken.
    async fn insert_product(&self, product: Product) -> Result<()>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Retrieves the products with the given ids; unknown ids are skipped.
    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>>;

    /// Lists all products ordered by name, then id.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Deletes a product unless pending purchase lines reference it.
    ///
    /// The reference check and the deletion happen atomically.
    async fn remove_product_if_unreserved(&self, id: ProductId) -> Result<ProductRemoval>;

    /// Adds `delta` to a product's stock if the result stays within
    /// `0..=u32::MAX`.
    ///
    /// This is the only way stock changes. A decrement of `q` therefore
    /// succeeds exactly when `stock >= q` at the moment of the write.
    async fn apply_stock_delta(&self, id: ProductId, delta: i64) -> Result<StockUpdate>;

    /// Sums stock over all products.
    async fn total_stock(&self) -> Result<u64>;

    /// Inserts a new cart line. Fails with `DuplicateId` if the id is taken.
    async fn insert_line(&self, line: CartLine) -> Result<()>;

    async fn get_line(&self, id: CartLineId) -> Result<Option<CartLine>>;

    /// Deletes a cart line, returning the record as it was just before deletion.
    async fn delete_line(&self, id: CartLineId) -> Result<Option<CartLine>>;

    /// Retrieves cart lines matching a query.
    async fn query_lines(&self, query: LineQuery) -> Result<Vec<CartLine>>;

    /// Sums quantity over all purchase lines.
    async fn total_line_quantity(&self) -> Result<u64>;

    /// Moves every PENDING line of `user_id` to PAID in one step.
    ///
    /// Returns the number of lines changed.
    async fn mark_lines_paid(&self, user_id: UserId) -> Result<u64>;

    /// Sets a line's order status if it currently equals `expected`.
    async fn compare_and_set_order_status(
        &self,
        id: CartLineId,
        expected: Option<OrderStatus>,
        new_status: OrderStatus,
    ) -> Result<StatusUpdate>;

    /// Inserts or replaces a user summary.
    async fn upsert_user(&self, user: UserSummary) -> Result<()>;

    /// Retrieves the user summaries with the given ids; unknown ids are skipped.
    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<UserSummary>>;
}

/// Extension trait providing convenience methods for inventory stores.
#[async_trait]
pub trait InventoryStoreExt: InventoryStore {
    async fn product_exists(&self, id: ProductId) -> Result<bool> {
        Ok(self.get_product(id).await?.is_some())
    }

    /// Lines of a user that are pending or paid, oldest first.
    async fn active_lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>> {
        self.query_lines(
            LineQuery::for_user(user_id)
                .payment_statuses(vec![PaymentStatus::Pending, PaymentStatus::Paid]),
        )
        .await
    }

    /// Sum of quantities held by purchase lines for one product.
    async fn reserved_quantity(&self, product_id: ProductId) -> Result<u64> {
        let lines = self
            .query_lines(LineQuery::new().product_id(product_id).purchases())
            .await?;
        Ok(lines.iter().map(|l| u64::from(l.quantity())).sum())
    }
}

// Blanket implementation for all InventoryStore implementations
impl<T: InventoryStore + ?Sized> InventoryStoreExt for T {}
