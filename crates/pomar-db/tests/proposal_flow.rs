//! Proposal lifecycle against a real store: draft upserts, the sold
//! freeze, the expiry window at millisecond precision, and reopening
//! expired quotes as fresh drafts.

use chrono::{DateTime, Duration, TimeZone, Utc};

use pomar_core::error::StateError;
use pomar_core::types::{Proposal, ProposalOrigin, ProposalStatus};
use pomar_db::{Store, StoreConfig, StoreError};

async fn open_store() -> Store {
    Store::open(StoreConfig::in_memory())
        .await
        .expect("in-memory store")
}

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
async fn test_save_inserts_then_upserts_in_place() {
    let store = open_store().await;
    let now = Utc::now();

    let proposal = draft("prop-1", now);
    store.proposals().save(proposal.clone(), now, 7).await.unwrap();
    assert_eq!(store.proposals().count().await.unwrap(), 1);

    // Renegotiated price overwrites the same row.
    let mut renegotiated = proposal;
    renegotiated.selling_price_cents = 580_000;
    store.proposals().save(renegotiated, now, 7).await.unwrap();

    assert_eq!(store.proposals().count().await.unwrap(), 1);
    let stored = store.proposals().require("prop-1").await.unwrap();
    assert_eq!(stored.selling_price_cents, 580_000);
}

#[tokio::test]
async fn test_sold_proposals_refuse_edits() {
    let store = open_store().await;
    let now = Utc::now();

    // First save inserts; there is no stored row yet for the guard to
    // protect, so importing already-sold history works.
    let mut sold = draft("prop-sold", now);
    sold.status = ProposalStatus::Sold;
    sold.sold_at = Some(now);
    store.proposals().save(sold.clone(), now, 7).await.unwrap();

    sold.selling_price_cents = 1;
    let err = store.proposals().save(sold, now, 7).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::State(StateError::AlreadySold { .. })
    ));

    let stored = store.proposals().require("prop-sold").await.unwrap();
    assert_eq!(stored.selling_price_cents, 591_120);
}

#[tokio::test]
async fn test_expiry_boundary_is_strictly_greater() {
    let store = open_store().await;
    let created = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

    store
        .proposals()
        .save(draft("prop-exp", created), created, 7)
        .await
        .unwrap();

    // Exactly 7 × 86 400 000 ms later: still editable.
    let boundary = created + Duration::days(7);
    let mut edit = draft("prop-exp", created);
    edit.selling_price_cents = 600_000;
    store.proposals().save(edit, boundary, 7).await.unwrap();

    // One millisecond past the window: frozen.
    let mut late_edit = draft("prop-exp", created);
    late_edit.selling_price_cents = 610_000;
    let err = store
        .proposals()
        .save(late_edit, boundary + Duration::milliseconds(1), 7)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::State(StateError::Expired { .. })));

    let stored = store.proposals().require("prop-exp").await.unwrap();
    assert_eq!(stored.selling_price_cents, 600_000);
}

#[tokio::test]
async fn test_expiration_window_is_caller_supplied() {
    let store = open_store().await;
    let created = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let now = created + Duration::days(2);

    store
        .proposals()
        .save(draft("prop-janela", created), created, 7)
        .await
        .unwrap();

    // The same two-day-old draft is live under a 30-day window...
    store
        .proposals()
        .save(draft("prop-janela", created), now, 30)
        .await
        .unwrap();

    // ...and expired under a 1-day window.
    let err = store
        .proposals()
        .save(draft("prop-janela", created), now, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::State(StateError::Expired { .. })));
}

#[tokio::test]
async fn test_reopen_clones_into_fresh_draft_and_preserves_original() {
    let store = open_store().await;
    let created = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let now = created + Duration::days(30);

    let mut original = draft("prop-old", created);
    original.product_id = Some("unit-1".to_string());
    store
        .proposals()
        .save(original.clone(), created, 7)
        .await
        .unwrap();

    let fresh = store.proposals().reopen("prop-old", now).await.unwrap();

    assert_ne!(fresh.id, "prop-old");
    assert_eq!(fresh.created_at, now);
    assert_eq!(fresh.status, ProposalStatus::Draft);
    assert_eq!(fresh.product_id, None);
    assert_eq!(fresh.sold_at, None);
    // The quote content carries over.
    assert_eq!(fresh.selling_price_cents, 591_120);
    assert_eq!(fresh.customer_name, "João");

    // The expired original is untouched history.
    assert_eq!(store.proposals().count().await.unwrap(), 2);
    let stored = store.proposals().require("prop-old").await.unwrap();
    assert_eq!(stored.created_at, created);
    assert_eq!(stored.product_id.as_deref(), Some("unit-1"));
}

#[tokio::test]
async fn test_reopen_refuses_sold() {
    let store = open_store().await;
    let now = Utc::now();

    let mut sold = draft("prop-done", now);
    sold.status = ProposalStatus::Sold;
    sold.sold_at = Some(now);
    store.proposals().save(sold, now, 7).await.unwrap();

    let err = store.proposals().reopen("prop-done", now).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::State(StateError::AlreadySold { .. })
    ));
    assert_eq!(store.proposals().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_validation_rejects_blank_customer_before_any_write() {
    let store = open_store().await;
    let now = Utc::now();

    let mut proposal = draft("prop-bad", now);
    proposal.customer_name = "  ".to_string();

    let err = store.proposals().save(proposal, now, 7).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.proposals().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_works_on_any_status() {
    let store = open_store().await;
    let now = Utc::now();

    let mut sold = draft("prop-del", now);
    sold.status = ProposalStatus::Sold;
    sold.sold_at = Some(now);
    store.proposals().save(sold, now, 7).await.unwrap();

    store.proposals().delete("prop-del").await.unwrap();
    assert_eq!(store.proposals().count().await.unwrap(), 0);

    let err = store.proposals().delete("prop-del").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}
