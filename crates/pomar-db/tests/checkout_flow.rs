//! Checkout against a real store: the full sale batch (proposal, stock,
//! ledger, trade-in), ordering flow, reservation-aware reconciliation,
//! and every precondition that refuses before a single write happens.

use chrono::{DateTime, Duration, TimeZone, Utc};

use pomar_core::error::StateError;
use pomar_core::money::{Money, Rate};
use pomar_core::pricing::CostInputs;
use pomar_core::types::{
    reservation_note, LedgerEntryKind, ProductItem, Proposal, ProposalOrigin, ProposalStatus,
    StockStatus,
};
use pomar_db::{Store, StoreConfig, StoreError};

async fn open_store() -> Store {
    Store::open(StoreConfig::in_memory())
        .await
        .expect("in-memory store")
}

fn canonical_costs() -> CostInputs {
    CostInputs {
        cost_usd: Money::from_cents(90_000),
        fee_usd: Money::from_cents(2_000),
        exchange_rate: Rate::from_milli(5_200),
        spread: Rate::from_milli(100),
        import_tax: Money::from_cents(5_000),
    }
}

/// Manual-origin draft for "iPhone 15 128GB Azul" at the worked-example
/// numbers: landed cost R$ 4.926,00, selling price R$ 5.911,20.
fn draft(id: &str, created_at: DateTime<Utc>) -> Proposal {
    Proposal {
        id: id.to_string(),
        customer_name: "João".to_string(),
        customer_surname: "Silva".to_string(),
        customer_phone: "+55 11 99999-0000".to_string(),
        product_name: "iPhone 15 128GB Azul".to_string(),
        product_name_only: Some("iPhone 15".to_string()),
        product_memory: Some("128GB".to_string()),
        product_color: Some("Azul".to_string()),
        cost_usd_cents: 90_000,
        fee_usd_cents: 2_000,
        exchange_rate_milli: 5_200,
        spread_milli: 100,
        import_tax_cents: 5_000,
        total_cost_cents: 492_600,
        selling_price_cents: 591_120,
        created_at,
        origin: ProposalOrigin::Manual,
        product_id: None,
        status: ProposalStatus::Draft,
        sold_at: None,
        trade_in_name: None,
        trade_in_value_cents: None,
        trade_in_memory: None,
        trade_in_color: None,
        trade_in_battery: None,
    }
}

#[tokio::test]
async fn test_sell_consumes_linked_unit_and_posts_sale() {
    let store = open_store().await;
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let now = t0 + Duration::days(1);

    let item = ProductItem::new_stock("iPhone 15", "128GB", "Azul", &canonical_costs(), t0);
    store.products().create(item.clone()).await.unwrap();

    let mut proposal = draft("prop-1", t0);
    proposal.origin = ProposalOrigin::NewStock;
    proposal.product_id = Some(item.id.clone());
    store.proposals().save(proposal, t0, 7).await.unwrap();

    let outcome = store.checkout().sell("prop-1", now).await.unwrap();

    assert_eq!(outcome.proposal.status, ProposalStatus::Sold);
    assert_eq!(outcome.proposal.sold_at, Some(now));
    assert_eq!(
        outcome.consumed_product.as_ref().map(|i| i.id.as_str()),
        Some(item.id.as_str())
    );
    assert!(outcome.trade_in_product.is_none());
    assert_eq!(outcome.net_amount().cents(), 591_120);
    assert_eq!(outcome.profit().cents(), 98_520);

    // The unit left the shelf; the books gained the sale.
    assert_eq!(store.products().count().await.unwrap(), 0);
    let entries = store.ledger().list().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, LedgerEntryKind::Sale);
    assert_eq!(entries[0].amount_cents, 591_120);
    assert_eq!(entries[0].cost_cents, Some(492_600));
    assert_eq!(entries[0].related_id.as_deref(), Some("prop-1"));
    assert_eq!(
        entries[0].description,
        "Venda: iPhone 15 128GB Azul (João Silva)"
    );

    let stored = store.proposals().require("prop-1").await.unwrap();
    assert_eq!(stored.status, ProposalStatus::Sold);
    assert_eq!(stored.sold_at, Some(now));
}

#[tokio::test]
async fn test_sell_with_trade_in_absorbs_the_device() {
    let store = open_store().await;
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let now = t0 + Duration::days(1);

    let item = ProductItem::new_stock("iPhone 15", "128GB", "Azul", &canonical_costs(), t0);
    store.products().create(item.clone()).await.unwrap();

    let mut proposal = draft("prop-troca", t0);
    proposal.origin = ProposalOrigin::NewStock;
    proposal.product_id = Some(item.id.clone());
    proposal.trade_in_name = Some("iPhone 11".to_string());
    proposal.trade_in_memory = Some("64GB".to_string());
    proposal.trade_in_color = Some("Preto".to_string());
    proposal.trade_in_value_cents = Some(100_000);
    proposal.trade_in_battery = Some(81);
    store.proposals().save(proposal, t0, 7).await.unwrap();

    let outcome = store.checkout().sell("prop-troca", now).await.unwrap();

    // R$ 5.911,20 − R$ 1.000,00 received; the deal lost R$ 14,80.
    assert_eq!(outcome.net_amount().cents(), 491_120);
    assert_eq!(outcome.profit().cents(), -1_480);

    let absorbed = outcome.trade_in_product.expect("trade-in absorbed");
    assert!(absorbed.is_used);
    assert_eq!(absorbed.name, "iPhone 11");
    assert_eq!(absorbed.total_cost_cents, 100_000);
    assert_eq!(absorbed.battery_health, Some(81));

    // Inventory: sold unit gone, traded device on the shelf.
    let products = store.products().list().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, absorbed.id);
    assert_eq!(products[0].status, StockStatus::InStock);

    let entries = store.ledger().list().await.unwrap();
    assert_eq!(entries.len(), 3);
    let sale = entries
        .iter()
        .find(|e| e.kind == LedgerEntryKind::Sale)
        .unwrap();
    assert_eq!(sale.amount_cents, 491_120);
    assert_eq!(sale.trade_in_value_cents, Some(100_000));
    let trade = entries
        .iter()
        .find(|e| e.kind == LedgerEntryKind::TradeInEntry)
        .unwrap();
    assert_eq!(trade.amount_cents, 100_000);
    assert_eq!(trade.description, "Entrada de troca: iPhone 11 64GB Preto");

    let summary = store.ledger().summary().await.unwrap();
    assert_eq!(summary.cash_in_cents, 491_120);
    assert_eq!(summary.cash_out_cents, 492_600);
    assert_eq!(summary.stock_investment_cents, 592_600);
    assert_eq!(summary.realized_profit_cents, -1_480);
}

#[tokio::test]
async fn test_sell_refuses_twice() {
    let store = open_store().await;
    let now = Utc::now();

    store
        .proposals()
        .save(draft("prop-once", now), now, 7)
        .await
        .unwrap();
    store.checkout().sell("prop-once", now).await.unwrap();

    let err = store.checkout().sell("prop-once", now).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::State(StateError::AlreadySold { .. })
    ));
    assert!(err.is_precondition());

    // Still exactly one sale entry.
    assert_eq!(store.ledger().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_sell_expiry_boundary_at_millisecond_precision() {
    let store = open_store().await;
    let created = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

    store
        .proposals()
        .save(draft("prop-edge", created), created, 7)
        .await
        .unwrap();

    // One millisecond past the default 7-day window: refused, no writes.
    let too_late = created + Duration::days(7) + Duration::milliseconds(1);
    let err = store.checkout().sell("prop-edge", too_late).await.unwrap_err();
    assert!(matches!(err, StoreError::State(StateError::Expired { .. })));
    assert_eq!(store.ledger().count().await.unwrap(), 0);
    let stored = store.proposals().require("prop-edge").await.unwrap();
    assert_eq!(stored.status, ProposalStatus::Draft);

    // Exactly at the boundary: still sellable.
    let boundary = created + Duration::days(7);
    let outcome = store.checkout().sell("prop-edge", boundary).await.unwrap();
    assert_eq!(outcome.proposal.sold_at, Some(boundary));
}

#[tokio::test]
async fn test_sell_waits_for_ordered_unit() {
    let store = open_store().await;
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();

    store
        .proposals()
        .save(draft("prop-order", t0), t0, 7)
        .await
        .unwrap();
    let order = store.checkout().place_order("prop-order", t0).await.unwrap();

    // The device is paid for but not here yet.
    let err = store
        .checkout()
        .sell("prop-order", t0 + Duration::days(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::State(StateError::AwaitingReceipt { .. })
    ));
    let stored = store.proposals().require("prop-order").await.unwrap();
    assert_eq!(stored.status, ProposalStatus::Ordered);

    // Receive it, then the sale goes through and consumes it.
    store.products().receive(&order.product.id).await.unwrap();
    let outcome = store
        .checkout()
        .sell("prop-order", t0 + Duration::days(2))
        .await
        .unwrap();
    assert_eq!(
        outcome.consumed_product.map(|i| i.id),
        Some(order.product.id)
    );
    assert_eq!(store.products().count().await.unwrap(), 0);
    // Order-time stock entry + sale entry.
    assert_eq!(store.ledger().count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_manual_sale_takes_oldest_unit_not_reserved_for_others() {
    let store = open_store().await;
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();

    let mut held = ProductItem::new_stock("iPhone 15", "128GB", "Azul", &canonical_costs(), t0);
    held.observation = Some(reservation_note("Maria Souza"));
    let free = ProductItem::new_stock(
        "iPhone 15",
        "128GB",
        "Azul",
        &canonical_costs(),
        t0 + Duration::hours(1),
    );
    store.products().create(held.clone()).await.unwrap();
    store.products().create(free.clone()).await.unwrap();

    store
        .proposals()
        .save(draft("prop-joao", t0), t0, 7)
        .await
        .unwrap();
    let outcome = store.checkout().sell("prop-joao", t0).await.unwrap();

    // João gets the free unit; Maria's stays on the shelf.
    assert_eq!(outcome.consumed_product.map(|i| i.id), Some(free.id));
    let remaining = store.products().list().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, held.id);
}

#[tokio::test]
async fn test_manual_sale_prefers_the_unit_reserved_for_the_customer() {
    let store = open_store().await;
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();

    let free = ProductItem::new_stock("iPhone 15", "128GB", "Azul", &canonical_costs(), t0);
    let mut held = ProductItem::new_stock(
        "iPhone 15",
        "128GB",
        "Azul",
        &canonical_costs(),
        t0 + Duration::hours(1),
    );
    held.observation = Some(reservation_note("João Silva"));
    store.products().create(free.clone()).await.unwrap();
    store.products().create(held.clone()).await.unwrap();

    store
        .proposals()
        .save(draft("prop-joao", t0), t0, 7)
        .await
        .unwrap();
    let outcome = store.checkout().sell("prop-joao", t0).await.unwrap();

    // The held unit wins even though the free one is older.
    assert_eq!(outcome.consumed_product.map(|i| i.id), Some(held.id));
    let remaining = store.products().list().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, free.id);
}

#[tokio::test]
async fn test_manual_sale_matches_descriptor_case_insensitively() {
    let store = open_store().await;
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();

    let item = ProductItem::new_stock("iPhone 15", "128GB", "Azul", &canonical_costs(), t0);
    store.products().create(item.clone()).await.unwrap();

    let mut proposal = draft("prop-caixa", t0);
    proposal.product_name_only = Some("IPHONE 15".to_string());
    proposal.product_memory = Some("128gb".to_string());
    proposal.product_color = Some("azul".to_string());
    store.proposals().save(proposal, t0, 7).await.unwrap();

    let outcome = store.checkout().sell("prop-caixa", t0).await.unwrap();
    assert_eq!(outcome.consumed_product.map(|i| i.id), Some(item.id));
    assert_eq!(store.products().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_manual_sale_without_stock_match_still_sells() {
    let store = open_store().await;
    let now = Utc::now();

    store
        .proposals()
        .save(draft("prop-solo", now), now, 7)
        .await
        .unwrap();
    let outcome = store.checkout().sell("prop-solo", now).await.unwrap();

    assert!(outcome.consumed_product.is_none());
    assert_eq!(outcome.proposal.status, ProposalStatus::Sold);
    assert_eq!(store.ledger().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_sell_tolerates_a_deleted_linked_unit() {
    let store = open_store().await;
    let now = Utc::now();

    // The quoted unit was deleted after the proposal was written.
    let mut proposal = draft("prop-ghost", now);
    proposal.origin = ProposalOrigin::NewStock;
    proposal.product_id = Some("unit-long-gone".to_string());
    store.proposals().save(proposal, now, 7).await.unwrap();

    let outcome = store.checkout().sell("prop-ghost", now).await.unwrap();
    assert!(outcome.consumed_product.is_none());
    assert_eq!(outcome.proposal.status, ProposalStatus::Sold);
}

#[tokio::test]
async fn test_place_order_creates_reserved_ordered_unit() {
    let store = open_store().await;
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();

    store
        .proposals()
        .save(draft("prop-enc", t0), t0, 7)
        .await
        .unwrap();
    let outcome = store.checkout().place_order("prop-enc", t0).await.unwrap();

    assert_eq!(outcome.proposal.status, ProposalStatus::Ordered);
    assert_eq!(
        outcome.proposal.product_id.as_deref(),
        Some(outcome.product.id.as_str())
    );
    assert_eq!(outcome.product.status, StockStatus::Ordered);
    assert_eq!(outcome.product.total_cost_cents, 492_600);
    assert!(outcome
        .product
        .observation
        .as_deref()
        .unwrap()
        .contains("Reservado para João Silva"));

    // The money left at order time.
    let entries = store.ledger().list().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, LedgerEntryKind::StockEntry);
    assert_eq!(entries[0].amount_cents, 492_600);
}

#[tokio::test]
async fn test_place_order_refuses_repeat_and_sold() {
    let store = open_store().await;
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();

    store
        .proposals()
        .save(draft("prop-re", t0), t0, 7)
        .await
        .unwrap();
    let order = store.checkout().place_order("prop-re", t0).await.unwrap();

    let err = store.checkout().place_order("prop-re", t0).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::State(StateError::AlreadyOrdered { .. })
    ));

    store.products().receive(&order.product.id).await.unwrap();
    store.checkout().sell("prop-re", t0).await.unwrap();
    let err = store.checkout().place_order("prop-re", t0).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::State(StateError::AlreadySold { .. })
    ));
}

#[tokio::test]
async fn test_place_order_needs_the_split_descriptor() {
    let store = open_store().await;
    let now = Utc::now();

    let mut proposal = draft("prop-split", now);
    proposal.product_name_only = None;
    store.proposals().save(proposal, now, 7).await.unwrap();

    let err = store.checkout().place_order("prop-split", now).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.products().count().await.unwrap(), 0);
    assert_eq!(store.ledger().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_place_order_refuses_expired() {
    let store = open_store().await;
    let created = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

    store
        .proposals()
        .save(draft("prop-velha", created), created, 7)
        .await
        .unwrap();

    let err = store
        .checkout()
        .place_order("prop-velha", created + Duration::days(8))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::State(StateError::Expired { .. })));
    assert_eq!(store.products().count().await.unwrap(), 0);
}
