//! Live collection feeds: subscribers get a full fresh snapshot after
//! every committed batch that touches their collection.

use chrono::{Duration, TimeZone, Utc};

use pomar_core::money::{Money, Rate};
use pomar_core::pricing::CostInputs;
use pomar_core::types::{
    LedgerEntryKind, ProductItem, Proposal, ProposalOrigin, ProposalStatus,
};
use pomar_db::{Store, StoreConfig};

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

fn draft(id: &str, created_at: chrono::DateTime<Utc>) -> Proposal {
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
async fn test_product_feed_tracks_creates_and_deletes() {
    let store = open_store().await;
    let mut feed = store.subscribe_products();

    // Primed at open with the (empty) collection.
    assert!(feed.borrow().is_empty());

    let item = ProductItem::new_stock("iPhone 15", "128GB", "Azul", &canonical_costs(), Utc::now());
    store.products().create(item.clone()).await.unwrap();

    assert!(feed.has_changed().unwrap());
    {
        let snapshot = feed.borrow_and_update();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, item.id);
    }

    store.products().delete(&item.id).await.unwrap();
    assert!(feed.has_changed().unwrap());
    assert!(feed.borrow_and_update().is_empty());
}

#[tokio::test]
async fn test_sale_batch_notifies_every_touched_feed() {
    let store = open_store().await;
    let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let now = t0 + Duration::days(1);

    let item = ProductItem::new_stock("iPhone 15", "128GB", "Azul", &canonical_costs(), t0);
    store.products().create(item.clone()).await.unwrap();
    let mut proposal = draft("prop-feed", t0);
    proposal.origin = ProposalOrigin::NewStock;
    proposal.product_id = Some(item.id.clone());
    store.proposals().save(proposal, t0, 7).await.unwrap();

    let mut products = store.subscribe_products();
    let mut proposals = store.subscribe_proposals();
    let mut ledger = store.subscribe_ledger();

    store.checkout().sell("prop-feed", now).await.unwrap();

    assert!(products.has_changed().unwrap());
    assert!(proposals.has_changed().unwrap());
    assert!(ledger.has_changed().unwrap());

    assert!(products.borrow_and_update().is_empty());
    {
        let snapshot = proposals.borrow_and_update();
        assert_eq!(snapshot[0].status, ProposalStatus::Sold);
    }
    {
        let snapshot = ledger.borrow_and_update();
        assert_eq!(snapshot.len(), 2);
        // newest first: the sale precedes the acquisition
        assert_eq!(snapshot[0].kind, LedgerEntryKind::Sale);
        assert_eq!(snapshot[0].amount_cents, 591_120);
    }
}

#[tokio::test]
async fn test_settings_feed_tracks_saves() {
    let store = open_store().await;
    let mut feed = store.subscribe_settings();

    // Defaults before anything is saved.
    assert_eq!(feed.borrow().expiration_days, 7);

    let mut settings = store.settings().load().await.unwrap();
    settings.expiration_days = 10;
    store.settings().save(settings, Utc::now()).await.unwrap();

    assert!(feed.has_changed().unwrap());
    assert_eq!(feed.borrow_and_update().expiration_days, 10);
}

#[tokio::test]
async fn test_unrelated_writes_do_not_notify() {
    let store = open_store().await;
    let mut settings_feed = store.subscribe_settings();

    let item = ProductItem::new_stock("iPhone 15", "128GB", "Azul", &canonical_costs(), Utc::now());
    store.products().create(item).await.unwrap();

    // The product batch touches products and ledger, not settings.
    assert!(!settings_feed.has_changed().unwrap());
}
