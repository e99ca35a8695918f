use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use common::{CartLineId, ProductId, UserId};
use domain::{CartLine, OrderStatus, PaymentStatus, Product, UserSummary, apply_stock_delta};
use tokio::sync::RwLock;

use crate::{
    LineQuery, Result, StoreError,
    store::{InventoryStore, ProductRemoval, StatusUpdate, StockUpdate},
};

#[derive(Debug, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    lines: HashMap<CartLineId, CartLine>,
    users: HashMap<UserId, UserSummary>,
}

#[derive(Debug)]
struct FailureSwitches {
    line_insert: AtomicBool,
    line_delete: AtomicBool,
    /// Stock deltas still allowed before refusing; negative means unlimited.
    stock_delta_budget: AtomicI64,
}

impl Default for FailureSwitches {
    fn default() -> Self {
        Self {
            line_insert: AtomicBool::new(false),
            line_delete: AtomicBool::new(false),
            stock_delta_budget: AtomicI64::new(-1),
        }
    }
}

impl FailureSwitches {
    /// Consumes one unit of the stock delta budget; false once it is spent.
    fn allow_stock_delta(&self) -> bool {
        self.stock_delta_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |b| (b > 0).then(|| b - 1))
            .map_or_else(|budget| budget < 0, |_| true)
    }
}

/// In-memory inventory store.
///
/// All state sits behind one `RwLock`, so every trait method observes and
/// mutates a consistent snapshot. Failure switches let tests exercise the
/// compensation paths of callers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryStore {
    state: Arc<RwLock<State>>,
    failures: Arc<FailureSwitches>,
}

impl InMemoryInventoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `insert_line` call fail until switched off.
    pub fn set_fail_on_line_insert(&self, fail: bool) {
        self.failures.line_insert.store(fail, Ordering::SeqCst);
    }

    /// Makes every `delete_line` call fail until switched off.
    pub fn set_fail_on_line_delete(&self, fail: bool) {
        self.failures.line_delete.store(fail, Ordering::SeqCst);
    }

    /// Lets `allowed` more `apply_stock_delta` calls through, then fails
    /// every later one. `None` removes the limit.
    pub fn fail_stock_deltas_after(&self, allowed: Option<u32>) {
        let budget = allowed.map_or(-1, i64::from);
        self.failures
            .stock_delta_budget
            .store(budget, Ordering::SeqCst);
    }

    /// Returns the number of stored cart lines.
    pub async fn line_count(&self) -> usize {
        self.state.read().await.lines.len()
    }
}

fn sorted_lines<'a>(lines: impl Iterator<Item = &'a CartLine>) -> Vec<CartLine> {
    let mut lines: Vec<CartLine> = lines.cloned().collect();
    lines.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    lines
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn insert_product(&self, product: Product) -> Result<()> {
        let mut state = self.state.write().await;
        if state.products.contains_key(&product.id) {
            return Err(StoreError::DuplicateId {
                table: "products",
                id: product.id.to_string(),
            });
        }
        state.products.insert(product.id, product);
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn remove_product_if_unreserved(&self, id: ProductId) -> Result<ProductRemoval> {
        let mut state = self.state.write().await;
        if !state.products.contains_key(&id) {
            return Ok(ProductRemoval::Missing);
        }

        let pending_lines = state
            .lines
            .values()
            .filter(|l| {
                l.product_id == id && l.is_purchase() && l.payment_status == PaymentStatus::Pending
            })
            .count() as u64;
        if pending_lines > 0 {
            return Ok(ProductRemoval::InUse { pending_lines });
        }

        match state.products.remove(&id) {
            Some(product) => Ok(ProductRemoval::Removed(product)),
            None => Ok(ProductRemoval::Missing),
        }
    }

    async fn apply_stock_delta(&self, id: ProductId, delta: i64) -> Result<StockUpdate> {
        if !self.failures.allow_stock_delta() {
            return Err(StoreError::Unavailable(
                "stock update refused".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        let Some(product) = state.products.get_mut(&id) else {
            return Ok(StockUpdate::ProductMissing);
        };

        match apply_stock_delta(product.stock, delta) {
            Some(stock) => {
                product.stock = stock;
                Ok(StockUpdate::Applied { stock })
            }
            None => Ok(StockUpdate::Rejected {
                stock: product.stock,
            }),
        }
    }

    async fn total_stock(&self) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.products.values().map(|p| u64::from(p.stock)).sum())
    }

    async fn insert_line(&self, line: CartLine) -> Result<()> {
        if self.failures.line_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "cart line insert refused".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        if state.lines.contains_key(&line.id) {
            return Err(StoreError::DuplicateId {
                table: "cart_lines",
                id: line.id.to_string(),
            });
        }
        state.lines.insert(line.id, line);
        Ok(())
    }

    async fn get_line(&self, id: CartLineId) -> Result<Option<CartLine>> {
        Ok(self.state.read().await.lines.get(&id).cloned())
    }

    async fn delete_line(&self, id: CartLineId) -> Result<Option<CartLine>> {
        if self.failures.line_delete.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "cart line delete refused".to_string(),
            ));
        }

        Ok(self.state.write().await.lines.remove(&id))
    }

    async fn query_lines(&self, query: LineQuery) -> Result<Vec<CartLine>> {
        let state = self.state.read().await;
        let lines = sorted_lines(state.lines.values().filter(|l| query.matches(l)));

        let offset = query.offset.unwrap_or(0);
        let lines = lines.into_iter().skip(offset);
        let lines = match query.limit {
            Some(limit) => lines.take(limit).collect(),
            None => lines.collect(),
        };
        Ok(lines)
    }

    async fn total_line_quantity(&self) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.lines.values().map(|l| u64::from(l.quantity())).sum())
    }

    async fn mark_lines_paid(&self, user_id: UserId) -> Result<u64> {
        let mut state = self.state.write().await;
        let mut updated = 0;
        for line in state.lines.values_mut() {
            if line.user_id == user_id && line.payment_status == PaymentStatus::Pending {
                line.payment_status = PaymentStatus::Paid;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn compare_and_set_order_status(
        &self,
        id: CartLineId,
        expected: Option<OrderStatus>,
        new_status: OrderStatus,
    ) -> Result<StatusUpdate> {
        let mut state = self.state.write().await;
        let Some(line) = state.lines.get_mut(&id) else {
            return Ok(StatusUpdate::LineMissing);
        };

        if line.order_status != expected {
            return Ok(StatusUpdate::Stale {
                current: line.order_status,
            });
        }
        line.order_status = Some(new_status);
        Ok(StatusUpdate::Updated(line.clone()))
    }

    async fn upsert_user(&self, user: UserSummary) -> Result<()> {
        self.state.write().await.users.insert(user.id, user);
        Ok(())
    }

    async fn get_users(&self, ids: &[UserId]) -> Result<Vec<UserSummary>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }
}
