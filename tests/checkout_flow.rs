// tests/checkout_flow.rs

//! End-to-end order placement properties, run against the in-memory ledger
//! and cart store so the whole flow is exercised without a database.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use farmbridge::cart::{CartStore, MemoryCartStore};
use farmbridge::errors::AppError;
use farmbridge::models::{CartLine, TransactionType};
use farmbridge::services::{CheckoutService, Ledger, MemoryLedger, SettleFailure};

struct Harness {
  ledger: Arc<MemoryLedger>,
  cart: Arc<MemoryCartStore>,
  checkout: CheckoutService,
  user: Uuid,
}

fn harness() -> Harness {
  let ledger = Arc::new(MemoryLedger::new());
  let cart = Arc::new(MemoryCartStore::new());
  let checkout = CheckoutService::new(ledger.clone() as Arc<dyn Ledger>, cart.clone() as Arc<dyn CartStore>);
  Harness {
    ledger,
    cart,
    checkout,
    user: Uuid::new_v4(),
  }
}

fn line(name: &str, unit_price: i64, quantity: i64) -> CartLine {
  CartLine {
    product_id: Uuid::new_v4(),
    name: name.to_string(),
    unit_price: Decimal::from(unit_price),
    quantity: Decimal::from(quantity),
    unit: "tons".to_string(),
    farmer_id: None,
    farmer_name: None,
    image: None,
  }
}

#[tokio::test]
async fn empty_cart_is_rejected() {
  let h = harness();
  let err = h.checkout.place_order(h.user).await.unwrap_err();
  assert!(matches!(err, AppError::EmptyCart));
}

#[tokio::test]
async fn underfunded_wallet_rejects_the_order_and_changes_nothing() {
  let h = harness();
  // Balance ₹1000, cart total ₹1200.
  h.ledger.credit(h.user, Decimal::from(1000), "top up").await.unwrap();
  h.cart.save(h.user, &[line("Wheat", 1200, 1)]).await.unwrap();

  let err = h.checkout.place_order(h.user).await.unwrap_err();
  assert!(matches!(
    err,
    AppError::InsufficientFunds { available, required }
      if available == Decimal::from(1000) && required == Decimal::from(1200)
  ));

  // No order row, balance untouched, cart still intact.
  assert!(h.ledger.orders(h.user, None).await.unwrap().is_empty());
  assert_eq!(h.ledger.balance(h.user).await.unwrap(), Decimal::from(1000));
  assert_eq!(h.cart.load(h.user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn successful_placement_settles_order_items_debit_and_clears_cart() {
  let h = harness();
  // Balance ₹1000, two ₹200 lines -> total ₹400.
  h.ledger.credit(h.user, Decimal::from(1000), "top up").await.unwrap();
  h.cart
    .save(h.user, &[line("Wheat", 200, 1), line("Rice", 200, 1)])
    .await
    .unwrap();

  let placed = h.checkout.place_order(h.user).await.unwrap();

  assert_eq!(placed.order.total_price, Decimal::from(400));
  assert_eq!(placed.items.len(), 2);
  assert!(placed.items.iter().all(|i| i.price_at_purchase == Decimal::from(200)));
  assert_eq!(placed.new_balance, Decimal::from(600));

  // Durable state agrees with the returned snapshot.
  assert_eq!(h.ledger.balance(h.user).await.unwrap(), Decimal::from(600));
  let orders = h.ledger.orders(h.user, None).await.unwrap();
  assert_eq!(orders.len(), 1);
  let items = h.ledger.order_items(orders[0].id).await.unwrap();
  assert_eq!(items.len(), 2);

  // Exactly one debit referencing the order, alongside the initial credit.
  let txns = h.ledger.transactions(h.user).await.unwrap();
  let debits: Vec<_> = txns
    .iter()
    .filter(|t| t.transaction_type == TransactionType::Debit)
    .collect();
  assert_eq!(debits.len(), 1);
  assert_eq!(debits[0].amount, Decimal::from(400));
  assert_eq!(debits[0].reference_id, Some(orders[0].id));

  // Cart slot is gone.
  assert!(h.cart.load(h.user).await.unwrap().is_empty());
}

#[tokio::test]
async fn snapshot_prices_survive_later_cart_changes() {
  let h = harness();
  h.ledger.credit(h.user, Decimal::from(500), "top up").await.unwrap();
  let mut cheap = line("Maize", 100, 2);
  h.cart.save(h.user, &[cheap.clone()]).await.unwrap();

  let placed = h.checkout.place_order(h.user).await.unwrap();
  assert_eq!(placed.items[0].price_at_purchase, Decimal::from(100));

  // Re-adding the product at a new price does not touch the old order.
  cheap.unit_price = Decimal::from(999);
  h.cart.save(h.user, &[cheap]).await.unwrap();
  let items = h.ledger.order_items(placed.order.id).await.unwrap();
  assert_eq!(items[0].price_at_purchase, Decimal::from(100));
}

#[tokio::test]
async fn non_positive_quantity_lines_block_placement() {
  let h = harness();
  h.ledger.credit(h.user, Decimal::from(1000), "top up").await.unwrap();
  h.cart.save(h.user, &[line("Wheat", 100, 0)]).await.unwrap();

  let err = h.checkout.place_order(h.user).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));
  assert!(h.ledger.orders(h.user, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn negative_price_lines_cannot_mint_wallet_funds() {
  let h = harness();
  h.ledger.credit(h.user, Decimal::from(100), "top up").await.unwrap();
  // A negative unit price would turn the debit into a credit if it ever
  // reached settlement.
  h.cart.save(h.user, &[line("Wheat", -500, 1)]).await.unwrap();

  let err = h.checkout.place_order(h.user).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));

  assert_eq!(h.ledger.balance(h.user).await.unwrap(), Decimal::from(100));
  assert!(h.ledger.orders(h.user, None).await.unwrap().is_empty());
  assert_eq!(h.ledger.transactions(h.user).await.unwrap().len(), 1); // just the credit
}

#[tokio::test]
async fn settlement_failures_leave_no_partial_state() {
  for step in [
    SettleFailure::OrderInsert,
    SettleFailure::LineItemInsert,
    SettleFailure::WalletDebit,
  ] {
    let h = harness();
    h.ledger.credit(h.user, Decimal::from(1000), "top up").await.unwrap();
    h.cart.save(h.user, &[line("Wheat", 200, 2)]).await.unwrap();
    h.ledger.fail_next_settle(step);

    let err = h.checkout.place_order(h.user).await.unwrap_err();
    match step {
      SettleFailure::OrderInsert => assert!(matches!(err, AppError::OrderCreation { .. })),
      SettleFailure::LineItemInsert => assert!(matches!(err, AppError::LineItemCreation { .. })),
      SettleFailure::WalletDebit => assert!(matches!(err, AppError::WalletDebit { .. })),
    }

    // All-or-nothing: no order, no debit, untouched balance, cart kept.
    assert!(h.ledger.orders(h.user, None).await.unwrap().is_empty());
    assert_eq!(h.ledger.balance(h.user).await.unwrap(), Decimal::from(1000));
    assert_eq!(h.ledger.transactions(h.user).await.unwrap().len(), 1); // just the credit
    assert_eq!(h.cart.load(h.user).await.unwrap().len(), 1);
  }
}

#[tokio::test]
async fn concurrent_placements_cannot_overdraw_the_wallet() {
  // Balance covers exactly one of the two identical orders. The settlement
  // unit serializes on the wallet, so exactly one succeeds.
  let ledger = Arc::new(MemoryLedger::new());
  let user = Uuid::new_v4();
  ledger.credit(user, Decimal::from(400), "top up").await.unwrap();

  let mut tasks = Vec::new();
  for _ in 0..2 {
    let ledger = ledger.clone();
    let lines = vec![line("Wheat", 400, 1)];
    tasks.push(tokio::spawn(async move { ledger.settle_order(user, &lines).await }));
  }

  let mut successes = 0;
  let mut insufficient = 0;
  for task in tasks {
    match task.await.unwrap() {
      Ok(_) => successes += 1,
      Err(AppError::InsufficientFunds { .. }) => insufficient += 1,
      Err(other) => panic!("unexpected error: {other}"),
    }
  }

  assert_eq!(successes, 1);
  assert_eq!(insufficient, 1);
  assert_eq!(ledger.balance(user).await.unwrap(), Decimal::ZERO);
  assert_eq!(ledger.orders(user, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn order_listing_filters_by_status() {
  use farmbridge::models::OrderStatus;

  let h = harness();
  h.ledger.credit(h.user, Decimal::from(1000), "top up").await.unwrap();
  h.cart.save(h.user, &[line("Wheat", 100, 1)]).await.unwrap();
  h.checkout.place_order(h.user).await.unwrap();

  let pending = h.ledger.orders(h.user, Some(OrderStatus::Pending)).await.unwrap();
  assert_eq!(pending.len(), 1);
  let delivered = h.ledger.orders(h.user, Some(OrderStatus::Delivered)).await.unwrap();
  assert!(delivered.is_empty());
}
