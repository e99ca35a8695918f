//! Integration tests for the reservation workflow.

use std::sync::Arc;

use chrono::NaiveDate;
use common::{ProductId, UserId};
use domain::{Appointment, ErrorKind, OrderStatus, PaymentStatus, Product};
use inventory_store::{InMemoryInventoryStore, InventoryStore, InventoryStoreExt, LineQuery};
use reservation::{ReservationError, ReservationWorkflow};

struct TestHarness {
    workflow: Arc<ReservationWorkflow<InMemoryInventoryStore>>,
    store: InMemoryInventoryStore,
}

impl TestHarness {
    fn new() -> Self {
        let store = InMemoryInventoryStore::new();
        let workflow = Arc::new(ReservationWorkflow::new(store.clone()));
        Self { workflow, store }
    }

    async fn product(&self, stock: u32) -> ProductId {
        let product = Product::new("Test Car", stock);
        let id = product.id;
        self.store.insert_product(product).await.unwrap();
        id
    }

    async fn stock(&self, id: ProductId) -> u32 {
        self.store.get_product(id).await.unwrap().unwrap().stock
    }

    /// Stock plus every unit held by a purchase line.
    async fn units_accounted(&self, id: ProductId) -> u64 {
        u64::from(self.stock(id).await) + self.store.reserved_quantity(id).await.unwrap()
    }
}

fn appointment() -> Appointment {
    Appointment::new(
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        "Kigali showroom",
        "+250 788 123 456",
    )
    .unwrap()
}

#[tokio::test]
async fn checkout_scenario() {
    let h = TestHarness::new();
    let product = h.product(10).await;
    let user = UserId::new();

    let added = h.workflow.add_to_cart(user, product, 3).await.unwrap();
    assert_eq!(added.updated_stock, 7);

    let updated = h.workflow.finalize_cart_for_user(user).await.unwrap();
    assert_eq!(updated, 1);

    for status in OrderStatus::ALL {
        h.workflow
            .advance_order_status(added.line.id, status)
            .await
            .unwrap();
    }

    let line = h.store.get_line(added.line.id).await.unwrap().unwrap();
    assert_eq!(line.payment_status, PaymentStatus::Paid);
    assert_eq!(line.order_status, Some(OrderStatus::Delivered));
    assert_eq!(h.stock(product).await, 7);
}

#[tokio::test]
async fn add_then_remove_restores_original_stock() {
    let h = TestHarness::new();
    let product = h.product(6).await;

    let added = h.workflow.add_to_cart(UserId::new(), product, 6).await.unwrap();
    assert_eq!(added.updated_stock, 0);

    let removed = h.workflow.remove_cart_line(added.line.id).await.unwrap();
    assert!(removed.restored);
    assert_eq!(h.stock(product).await, 6);
    assert_eq!(h.store.line_count().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_additions_never_oversell() {
    let h = TestHarness::new();
    let product = h.product(5).await;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let workflow = h.workflow.clone();
        handles.push(tokio::spawn(async move {
            workflow.add_to_cart(UserId::new(), product, 3).await
        }));
    }
    let results: Vec<_> = futures_util::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);
    let failed = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        failed,
        ReservationError::InsufficientStock {
            requested: 3,
            available: 2,
            ..
        }
    ));
    assert_eq!(h.stock(product).await, 2);
    assert_eq!(h.store.line_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn units_are_conserved_under_mixed_load() {
    let h = TestHarness::new();
    let product = h.product(20).await;
    let users: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();

    let mut handles = Vec::new();
    for user in users.clone() {
        let workflow = h.workflow.clone();
        handles.push(tokio::spawn(async move {
            for quantity in 1..=4 {
                if let Ok(added) = workflow.add_to_cart(user, product, quantity).await
                    && quantity % 2 == 0
                {
                    workflow.remove_cart_line(added.line.id).await.unwrap();
                }
            }
        }));
    }
    for handle in futures_util::future::join_all(handles).await {
        handle.unwrap();
    }

    assert_eq!(h.units_accounted(product).await, 20);
}

#[tokio::test]
async fn failed_writes_leave_units_conserved() {
    let h = TestHarness::new();
    let product = h.product(8).await;
    let user = UserId::new();
    let kept = h.workflow.add_to_cart(user, product, 2).await.unwrap();

    h.store.set_fail_on_line_insert(true);
    let err = h.workflow.add_to_cart(user, product, 3).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    h.store.set_fail_on_line_insert(false);
    assert_eq!(h.units_accounted(product).await, 8);

    h.store.set_fail_on_line_delete(true);
    let err = h.workflow.remove_cart_line(kept.line.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    h.store.set_fail_on_line_delete(false);
    assert_eq!(h.units_accounted(product).await, 8);
    assert_eq!(h.stock(product).await, 6);
}

#[tokio::test]
async fn finalize_is_idempotent_and_scoped_to_user() {
    let h = TestHarness::new();
    let product = h.product(10).await;
    let alice = UserId::new();
    let bob = UserId::new();
    h.workflow.add_to_cart(alice, product, 1).await.unwrap();
    h.workflow.add_to_cart(alice, product, 2).await.unwrap();
    h.workflow.add_to_cart(bob, product, 1).await.unwrap();

    assert_eq!(h.workflow.finalize_cart_for_user(alice).await.unwrap(), 2);
    assert_eq!(h.workflow.finalize_cart_for_user(alice).await.unwrap(), 0);

    let bob_pending = h
        .store
        .query_lines(LineQuery::for_user(bob).payment_status(PaymentStatus::Pending))
        .await
        .unwrap();
    assert_eq!(bob_pending.len(), 1);
    assert_eq!(h.stock(product).await, 6);
}

#[tokio::test]
async fn appointments_never_touch_stock() {
    let h = TestHarness::new();
    let product = h.product(1).await;
    let user = UserId::new();

    let line = h
        .workflow
        .book_appointment(user, product, appointment())
        .await
        .unwrap();
    assert_eq!(h.stock(product).await, 1);
    assert_eq!(line.quantity(), 0);

    let err = h
        .workflow
        .advance_order_status(line.id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::NotAPurchase(_)));

    let removed = h.workflow.remove_cart_line(line.id).await.unwrap();
    assert!(!removed.restored);
    assert_eq!(h.stock(product).await, 1);
}

#[tokio::test]
async fn appointment_for_unknown_product_is_rejected() {
    let h = TestHarness::new();
    let err = h
        .workflow
        .book_appointment(UserId::new(), ProductId::new(), appointment())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(h.store.line_count().await, 0);
}

#[tokio::test]
async fn removing_line_of_deleted_product_restores_nothing() {
    let h = TestHarness::new();
    let product = h.product(4).await;
    let user = UserId::new();
    let line = h
        .workflow
        .book_appointment(user, product, appointment())
        .await
        .unwrap();
    h.workflow.delete_product(product).await.unwrap();

    let removed = h.workflow.remove_cart_line(line.id).await.unwrap();
    assert!(!removed.restored);
    assert_eq!(removed.updated_stock, None);
}

#[tokio::test]
async fn removing_purchase_of_missing_product_deletes_line_without_restore() {
    let h = TestHarness::new();
    let line = domain::CartLine::purchase(UserId::new(), ProductId::new(), 3).unwrap();
    h.store.insert_line(line.clone()).await.unwrap();

    let removed = h.workflow.remove_cart_line(line.id).await.unwrap();
    assert!(!removed.restored);
    assert_eq!(removed.updated_stock, None);
    assert_eq!(removed.line.quantity(), 3);
    assert!(h.store.get_line(line.id).await.unwrap().is_none());
}

#[tokio::test]
async fn failed_restore_after_insert_failure_is_internal() {
    let h = TestHarness::new();
    let product = h.product(5).await;

    h.store.set_fail_on_line_insert(true);
    h.store.fail_stock_deltas_after(Some(1));
    let err = h
        .workflow
        .add_to_cart(UserId::new(), product, 2)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReservationError::CompensationFailed {
            step: "restore_reserved_stock",
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(h.store.line_count().await, 0);
    // The decrement went through and could not be undone.
    assert_eq!(h.stock(product).await, 3);
}

#[tokio::test]
async fn failed_rereserve_after_delete_failure_is_internal() {
    let h = TestHarness::new();
    let product = h.product(5).await;
    let added = h
        .workflow
        .add_to_cart(UserId::new(), product, 2)
        .await
        .unwrap();

    h.store.set_fail_on_line_delete(true);
    h.store.fail_stock_deltas_after(Some(1));
    let err = h.workflow.remove_cart_line(added.line.id).await.unwrap_err();

    assert!(matches!(
        err,
        ReservationError::CompensationFailed {
            step: "rereserve_restored_stock",
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(h.store.get_line(added.line.id).await.unwrap().is_some());
    assert_eq!(h.stock(product).await, 5);
}

#[tokio::test]
async fn removing_unknown_line_is_not_found() {
    let h = TestHarness::new();
    let err = h
        .workflow
        .remove_cart_line(common::CartLineId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn oversized_request_leaves_reservation_intact() {
    let h = TestHarness::new();
    let product = h.product(10).await;
    let user = UserId::new();

    let added = h.workflow.add_to_cart(user, product, 4).await.unwrap();
    assert_eq!(added.updated_stock, 6);

    let err = h.workflow.add_to_cart(user, product, 10).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert_eq!(h.stock(product).await, 6);

    h.workflow.remove_cart_line(added.line.id).await.unwrap();
    assert_eq!(h.stock(product).await, 10);
    assert!(h.store.get_line(added.line.id).await.unwrap().is_none());
}
