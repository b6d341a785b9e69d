//! # Seed Data Generator
//!
//! Populates the database with demo inventory for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default catalog
//! cargo run -p pomar-db --bin seed
//!
//! # Limit the number of items
//! cargo run -p pomar-db --bin seed -- --count 12
//!
//! # Specify database path
//! cargo run -p pomar-db --bin seed -- --db ./data/pomar.db
//! ```
//!
//! ## Generated Data
//! - A catalog of imported iPhones (model × memory × color) with
//!   realistic USD costs, all priced at the 5.20 + 0.10 reference rate
//! - One used unit taken in a past trade
//! - One open proposal quoting the first item at the default margin
//!
//! Every created item writes its stock ledger entry, so the financial
//! summary is consistent out of the box.

use chrono::Utc;
use std::env;

use pomar_core::money::{Money, Rate};
use pomar_core::pricing::{self, CostInputs};
use pomar_core::types::{ProductItem, Proposal, ProposalOrigin, ProposalStatus};
use pomar_db::{Store, StoreConfig};
use uuid::Uuid;

/// Models with base USD cost in cents (128GB tier).
const MODELS: &[(&str, i64)] = &[
    ("iPhone 13", 42_000),
    ("iPhone 14", 55_000),
    ("iPhone 15", 72_000),
    ("iPhone 15 Pro", 95_000),
    ("iPhone 16", 90_000),
    ("iPhone 16 Pro", 115_000),
];

/// Memory tiers with USD cost addon in cents.
const MEMORIES: &[(&str, i64)] = &[("128GB", 0), ("256GB", 8_000), ("512GB", 18_000)];

const COLORS: &[&str] = &["Preto", "Azul", "Branco"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 24;
    let mut db_path = String::from("./pomar_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(24);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Pomar Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: 24)");
                println!("  -d, --db <PATH>    Database file path (default: ./pomar_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Pomar Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Items: {}", count);
    println!();

    // Open the store (creates the file, runs migrations)
    let store = Store::open(StoreConfig::new(&db_path)).await?;

    println!("✓ Store opened");
    println!("✓ Migrations applied");

    // Check existing inventory
    let existing = store.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating inventory...");

    let mut generated = 0;
    let mut first_item: Option<ProductItem> = None;

    'outer: for (model, base_usd) in MODELS {
        for (memory, addon_usd) in MEMORIES {
            for color in COLORS {
                if generated >= count {
                    break 'outer;
                }

                let costs = CostInputs {
                    cost_usd: Money::from_cents(base_usd + addon_usd),
                    fee_usd: Money::from_cents(2_000),
                    exchange_rate: Rate::from_milli(5_200),
                    spread: Rate::from_milli(100),
                    import_tax: Money::from_cents(5_000),
                };

                let item = ProductItem::new_stock(*model, *memory, *color, &costs, Utc::now());
                let created = store.products().create(item).await?;
                if first_item.is_none() {
                    first_item = Some(created);
                }

                generated += 1;
            }
        }
    }

    println!("  Generated {} new items", generated);

    // One used unit from a past trade-in
    let used = ProductItem::used(
        "iPhone 12",
        "64GB",
        "Roxo",
        Money::from_cents(120_000),
        Some(84),
        Utc::now(),
    );
    store.products().create(used).await?;
    println!("  Generated 1 used item");

    // One open proposal quoting the first item at the default margin
    if let Some(item) = first_item {
        let settings = store.settings().load().await?;
        let now = Utc::now();

        let total_cost = item.total_cost();
        let selling = pricing::selling_price(
            total_cost,
            pomar_core::Percent::from_bps(settings.default_margin_bps),
        );

        let proposal = Proposal {
            id: Uuid::new_v4().to_string(),
            customer_name: "Ana".to_string(),
            customer_surname: "Lima".to_string(),
            customer_phone: "+55 11 98888-0000".to_string(),
            product_name: item.descriptor(),
            product_name_only: Some(item.name.clone()),
            product_memory: Some(item.memory.clone()),
            product_color: Some(item.color.clone()),
            cost_usd_cents: item.cost_usd_cents,
            fee_usd_cents: item.fee_usd_cents,
            exchange_rate_milli: item.exchange_rate_milli,
            spread_milli: item.spread_milli,
            import_tax_cents: item.import_tax_cents,
            total_cost_cents: item.total_cost_cents,
            selling_price_cents: selling.cents(),
            created_at: now,
            origin: ProposalOrigin::NewStock,
            product_id: Some(item.id.clone()),
            status: ProposalStatus::Draft,
            sold_at: None,
            trade_in_name: None,
            trade_in_value_cents: None,
            trade_in_memory: None,
            trade_in_color: None,
            trade_in_battery: None,
        };

        let saved = store
            .proposals()
            .save(proposal, now, settings.expiration_days)
            .await?;
        println!(
            "  Generated 1 proposal: {} at {}",
            saved.product_name,
            saved.selling_price()
        );
    }

    // Verify the books add up
    println!();
    println!("Verifying ledger...");
    let summary = store.ledger().summary().await?;
    println!("  Stock investment: {}", summary.cash_out());
    println!("  Entries: {}", store.ledger().count().await?);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
