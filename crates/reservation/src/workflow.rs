//! Cart reservation workflow with compensating stock actions.

use std::time::Instant;

use common::{CartLineId, ProductId, UserId};
use domain::{Appointment, CartLine, OrderStatus, OrderStatusPolicy};
use inventory_store::{InventoryStore, StatusUpdate, StockUpdate};

use crate::error::{ReservationError, Result};
use crate::locks::KeyedLocks;

/// Result of a successful cart addition.
#[derive(Debug, Clone, PartialEq)]
pub struct CartAddition {
    /// The line that now holds the reserved units.
    pub line: CartLine,
    /// Product stock right after the reservation.
    pub updated_stock: u32,
}

/// Result of a successful cart line removal.
#[derive(Debug, Clone, PartialEq)]
pub struct CartRemoval {
    /// The line as it was just before deletion.
    pub line: CartLine,
    /// Whether units were returned to the product.
    pub restored: bool,
    /// Product stock after the restore, if one happened.
    pub updated_stock: Option<u32>,
}

/// Coordinates stock changes with cart line changes.
///
/// Each cart mutation is two single-record writes: the stock delta first,
/// then the cart line insert or delete. When the second write fails the
/// stock delta is reverted, so `stock + reserved` for a product only changes
/// through explicit stock adjustments.
pub struct ReservationWorkflow<S: InventoryStore> {
    pub(crate) store: S,
    policy: OrderStatusPolicy,
    pub(crate) user_locks: KeyedLocks<UserId>,
    pub(crate) product_locks: KeyedLocks<ProductId>,
}

impl<S: InventoryStore> ReservationWorkflow<S> {
    /// Creates a workflow that validates order status with the strict policy.
    pub fn new(store: S) -> Self {
        Self::with_policy(store, OrderStatusPolicy::default())
    }

    pub fn with_policy(store: S, policy: OrderStatusPolicy) -> Self {
        Self {
            store,
            policy,
            user_locks: KeyedLocks::new(),
            product_locks: KeyedLocks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reserves `quantity` units of a product into a new pending cart line.
    ///
    /// Fails with `InsufficientStock` without side effects when fewer units
    /// are in stock than requested.
    #[tracing::instrument(skip(self), fields(operation = "add_to_cart"))]
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartAddition> {
        let start = Instant::now();
        let units = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(ReservationError::InvalidQuantity(quantity))?;
        let line = CartLine::purchase(user_id, product_id, units)?;

        let _user = self.user_locks.lock(user_id).await;
        let _product = self.product_locks.lock(product_id).await;

        let updated_stock = match self
            .store
            .apply_stock_delta(product_id, -i64::from(units))
            .await?
        {
            StockUpdate::Applied { stock } => stock,
            StockUpdate::Rejected { stock } => {
                metrics::counter!("stock_reservations_rejected_total").increment(1);
                tracing::info!(requested = units, available = stock, "reservation rejected");
                return Err(ReservationError::InsufficientStock {
                    product_id,
                    requested: units,
                    available: stock,
                });
            }
            StockUpdate::ProductMissing => {
                return Err(ReservationError::ProductNotFound(product_id));
            }
        };

        if let Err(e) = self.store.insert_line(line.clone()).await {
            tracing::warn!(error = %e, "cart line insert failed, restoring stock");
            self.compensate_stock(product_id, i64::from(units), "restore_reserved_stock")
                .await?;
            return Err(e.into());
        }

        metrics::counter!("cart_lines_added_total").increment(1);
        record_duration("add_to_cart", start);
        tracing::info!(cart_line_id = %line.id, updated_stock, "stock reserved");
        Ok(CartAddition {
            line,
            updated_stock,
        })
    }

    /// Deletes a cart line and returns its units to the product.
    ///
    /// Paid purchase lines are refused. Appointment lines hold no stock and
    /// are simply deleted. If the product has since been deleted the line is
    /// still removed and nothing is restored.
    #[tracing::instrument(skip(self), fields(operation = "remove_cart_line"))]
    pub async fn remove_cart_line(&self, line_id: CartLineId) -> Result<CartRemoval> {
        let start = Instant::now();
        let snapshot = self
            .store
            .get_line(line_id)
            .await?
            .ok_or(ReservationError::CartLineNotFound(line_id))?;

        let _user = self.user_locks.lock(snapshot.user_id).await;
        let _product = self.product_locks.lock(snapshot.product_id).await;

        // Re-read under the locks; the quantity to restore comes from this copy.
        let line = self
            .store
            .get_line(line_id)
            .await?
            .ok_or(ReservationError::CartLineNotFound(line_id))?;
        if line.is_purchase() && line.is_paid() {
            return Err(ReservationError::LineAlreadyPaid(line_id));
        }

        let units = i64::from(line.quantity());
        let updated_stock = if units > 0 {
            match self.store.apply_stock_delta(line.product_id, units).await? {
                StockUpdate::Applied { stock } => Some(stock),
                StockUpdate::Rejected { stock } => {
                    return Err(ReservationError::StockOutOfRange {
                        product_id: line.product_id,
                        current: stock,
                        delta: units,
                    });
                }
                StockUpdate::ProductMissing => {
                    tracing::warn!(product_id = %line.product_id, "product gone, nothing to restore");
                    None
                }
            }
        } else {
            None
        };

        let deleted = self.store.delete_line(line_id).await;
        let failure = match deleted {
            Ok(Some(_)) => None,
            Ok(None) => Some(ReservationError::CartLineNotFound(line_id)),
            Err(e) => Some(e.into()),
        };
        if let Some(err) = failure {
            if updated_stock.is_some() {
                tracing::warn!(error = %err, "cart line delete failed, re-reserving stock");
                self.compensate_stock(line.product_id, -units, "rereserve_restored_stock")
                    .await?;
            }
            return Err(err);
        }

        metrics::counter!("cart_lines_removed_total").increment(1);
        record_duration("remove_cart_line", start);
        tracing::info!(restored = updated_stock.is_some(), "cart line removed");
        Ok(CartRemoval {
            line,
            restored: updated_stock.is_some(),
            updated_stock,
        })
    }

    /// Adds `delta` units to a product's stock outside of any cart line.
    ///
    /// Used by administrators to receive or write off inventory. A delta of
    /// zero is accepted and leaves stock unchanged.
    #[tracing::instrument(skip(self), fields(operation = "adjust_stock"))]
    pub async fn adjust_stock(&self, product_id: ProductId, delta: i64) -> Result<u32> {
        let _product = self.product_locks.lock(product_id).await;
        match self.store.apply_stock_delta(product_id, delta).await? {
            StockUpdate::Applied { stock } => {
                tracing::info!(updated_stock = stock, "stock adjusted");
                Ok(stock)
            }
            StockUpdate::Rejected { stock } => Err(ReservationError::StockOutOfRange {
                product_id,
                current: stock,
                delta,
            }),
            StockUpdate::ProductMissing => Err(ReservationError::ProductNotFound(product_id)),
        }
    }

    /// Marks every pending line of a user as paid.
    ///
    /// Returns the number of lines changed; calling it again returns zero.
    #[tracing::instrument(skip(self), fields(operation = "finalize_cart"))]
    pub async fn finalize_cart_for_user(&self, user_id: UserId) -> Result<u64> {
        let start = Instant::now();
        let _user = self.user_locks.lock(user_id).await;
        let updated = self.store.mark_lines_paid(user_id).await?;
        if updated > 0 {
            metrics::counter!("carts_finalized_total").increment(1);
        }
        record_duration("finalize_cart", start);
        tracing::info!(updated, "cart finalized");
        Ok(updated)
    }

    /// Moves a purchase line to `new_status` under the configured policy.
    ///
    /// The change is applied with a compare-and-set against the status that
    /// was validated, so two operators racing on the same line cannot both
    /// succeed from the same starting point.
    #[tracing::instrument(skip(self), fields(operation = "advance_order_status"))]
    pub async fn advance_order_status(
        &self,
        line_id: CartLineId,
        new_status: OrderStatus,
    ) -> Result<CartLine> {
        let line = self
            .store
            .get_line(line_id)
            .await?
            .ok_or(ReservationError::CartLineNotFound(line_id))?;
        if line.is_appointment() {
            return Err(ReservationError::NotAPurchase(line_id));
        }

        self.policy.check(line.order_status, new_status)?;
        if line.order_status == Some(new_status) {
            return Ok(line);
        }

        match self
            .store
            .compare_and_set_order_status(line_id, line.order_status, new_status)
            .await?
        {
            StatusUpdate::Updated(updated) => {
                metrics::counter!("order_status_updates_total", "status" => new_status.as_str())
                    .increment(1);
                tracing::info!(from = ?line.order_status, to = %new_status, "order status updated");
                Ok(updated)
            }
            // Another operator already applied the same status.
            StatusUpdate::Stale { current } if current == Some(new_status) => self
                .store
                .get_line(line_id)
                .await?
                .ok_or(ReservationError::CartLineNotFound(line_id)),
            StatusUpdate::Stale { current } => Err(ReservationError::ConcurrentStatusChange {
                line_id,
                expected: line.order_status,
                current,
            }),
            StatusUpdate::LineMissing => Err(ReservationError::CartLineNotFound(line_id)),
        }
    }

    /// Records a test-drive appointment. Appointments never touch stock.
    #[tracing::instrument(skip(self, appointment), fields(operation = "book_appointment"))]
    pub async fn book_appointment(
        &self,
        user_id: UserId,
        product_id: ProductId,
        appointment: Appointment,
    ) -> Result<CartLine> {
        let _user = self.user_locks.lock(user_id).await;
        let _product = self.product_locks.lock(product_id).await;
        if self.store.get_product(product_id).await?.is_none() {
            return Err(ReservationError::ProductNotFound(product_id));
        }

        let line = CartLine::appointment(user_id, product_id, appointment);
        self.store.insert_line(line.clone()).await?;
        tracing::info!(cart_line_id = %line.id, "appointment booked");
        Ok(line)
    }

    /// Reverts a stock delta after a failed cart line write.
    async fn compensate_stock(
        &self,
        product_id: ProductId,
        delta: i64,
        step: &'static str,
    ) -> Result<()> {
        metrics::counter!("stock_compensations_total").increment(1);
        match self.store.apply_stock_delta(product_id, delta).await {
            Ok(StockUpdate::Applied { stock }) => {
                tracing::info!(step, updated_stock = stock, "compensation completed");
                Ok(())
            }
            Ok(outcome) => {
                tracing::error!(step, ?outcome, "compensation refused");
                Err(ReservationError::CompensationFailed {
                    step,
                    reason: format!("{outcome:?}"),
                })
            }
            Err(e) => {
                tracing::error!(step, error = %e, "compensation failed");
                Err(ReservationError::CompensationFailed {
                    step,
                    reason: e.to_string(),
                })
            }
        }
    }
}

fn record_duration(operation: &'static str, start: Instant) {
    metrics::histogram!("workflow_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}
