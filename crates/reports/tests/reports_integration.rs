//! Integration tests for joined report queries.

use chrono::NaiveDate;
use common::UserId;
use domain::{Appointment, ErrorKind, NewProduct, OrderStatus, PaymentStatus, UserSummary};
use inventory_store::{InMemoryInventoryStore, InventoryStore};
use reports::ReportService;

async fn seed() -> (InMemoryInventoryStore, UserId, UserId) {
    let store = InMemoryInventoryStore::new();
    let alice = UserSummary::new(UserId::new(), "alice@example.com").with_names("Alice");
    let bob = UserId::new();
    store.upsert_user(alice.clone()).await.unwrap();
    (store, alice.id, bob)
}

fn car(name: &str, stock: u32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        stock,
        ..Default::default()
    }
}

#[tokio::test]
async fn user_cart_lists_pending_and_paid_with_products() {
    let (store, alice, bob) = seed().await;
    let product = car("Corolla", 5).into_product();
    let product_id = product.id;
    store.insert_product(product).await.unwrap();

    let first = domain::CartLine::purchase(alice, product_id, 1).unwrap();
    let second = domain::CartLine::purchase(alice, product_id, 2).unwrap();
    store.insert_line(first.clone()).await.unwrap();
    store.insert_line(second.clone()).await.unwrap();
    store
        .insert_line(domain::CartLine::purchase(bob, product_id, 1).unwrap())
        .await
        .unwrap();
    store.mark_lines_paid(alice).await.unwrap();

    let reports = ReportService::new(store);
    let cart = reports.user_cart(alice).await.unwrap();

    assert_eq!(cart.len(), 2);
    assert_eq!(cart[0].line.id, first.id);
    assert_eq!(cart[1].line.id, second.id);
    assert!(cart.iter().all(|v| v.line.payment_status == PaymentStatus::Paid));
    assert_eq!(cart[0].product.as_ref().unwrap().name, "Corolla");
    assert!(cart[0].user.is_none());
}

#[tokio::test]
async fn admin_listing_joins_users_and_tolerates_deleted_products() {
    let (store, alice, bob) = seed().await;
    let product = car("Hilux", 5).into_product();
    let product_id = product.id;
    store.insert_product(product).await.unwrap();
    store
        .insert_line(domain::CartLine::purchase(alice, product_id, 1).unwrap())
        .await
        .unwrap();
    store.mark_lines_paid(alice).await.unwrap();
    store.remove_product_if_unreserved(product_id).await.unwrap();
    store
        .insert_line(domain::CartLine::purchase(bob, common::ProductId::new(), 1).unwrap())
        .await
        .unwrap();

    let all = ReportService::new(store).all_lines().await.unwrap();

    assert_eq!(all.len(), 2);
    let alice_line = all.iter().find(|v| v.line.user_id == alice).unwrap();
    assert_eq!(alice_line.user.as_ref().unwrap().email, "alice@example.com");
    assert!(alice_line.product.is_none());
    let bob_line = all.iter().find(|v| v.line.user_id == bob).unwrap();
    assert!(bob_line.user.is_none());
}

#[tokio::test]
async fn status_lookups() {
    let (store, alice, _) = seed().await;
    let product = car("Prado", 5).into_product();
    let product_id = product.id;
    store.insert_product(product).await.unwrap();
    let line = domain::CartLine::purchase(alice, product_id, 1).unwrap();
    store.insert_line(line.clone()).await.unwrap();

    let reports = ReportService::new(store.clone());
    let (status, view) = reports.order_status(line.id).await.unwrap();
    assert_eq!(status, None);
    assert_eq!(view.line.id, line.id);

    store
        .compare_and_set_order_status(line.id, None, OrderStatus::Processing)
        .await
        .unwrap();
    let processing = reports
        .lines_by_status(OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(processing.len(), 1);
    assert_eq!(processing[0].user.as_ref().unwrap().names.as_deref(), Some("Alice"));

    let err = reports
        .order_status(common::CartLineId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn appointments_and_totals() {
    let (store, alice, _) = seed().await;
    let sedan = car("Sedan", 4).into_product();
    let suv = car("SUV", 6).into_product();
    let (sedan_id, suv_id) = (sedan.id, suv.id);
    store.insert_product(sedan).await.unwrap();
    store.insert_product(suv).await.unwrap();

    store
        .insert_line(domain::CartLine::purchase(alice, sedan_id, 3).unwrap())
        .await
        .unwrap();
    let appointment = Appointment::new(
        NaiveDate::from_ymd_opt(2025, 9, 2).unwrap(),
        "Nairobi",
        "+254 700 000 000",
    )
    .unwrap();
    store
        .insert_line(domain::CartLine::appointment(alice, suv_id, appointment))
        .await
        .unwrap();

    let reports = ReportService::new(store);
    let appointments = reports.appointments().await.unwrap();
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0].product.as_ref().unwrap().name, "SUV");
    assert_eq!(
        appointments[0].line.appointment_details().unwrap().location,
        "Nairobi"
    );

    assert_eq!(reports.total_quantity().await.unwrap(), 3);
    assert_eq!(reports.total_stock().await.unwrap(), 10);

    let top = reports.top_selling_product().await.unwrap();
    assert_eq!(top.product_id, sedan_id);
}
