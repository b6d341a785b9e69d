//! # Repository Module
//!
//! Database repository implementations for the pomar store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  App layer                                                              │
//! │       │                                                                 │
//! │       │  store.products().create(item)                                  │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                      │
//! │  ├── validate the input (pomar-core rules)                              │
//! │  ├── build a WriteBatch                                                 │
//! │  └── apply it (one transaction) + refresh touched feeds                 │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Reads stay plain queries; every write goes through a batch so          │
//! │  multi-row operations are atomic by construction.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Inventory CRUD, receive, descriptor match
//! - [`proposal::ProposalRepository`] - Proposal lifecycle (draft/ordered/sold)
//! - [`ledger::LedgerRepository`] - Financial entries and aggregates
//! - [`settings::SettingsRepository`] - The global settings document

pub mod ledger;
pub mod product;
pub mod proposal;
pub mod settings;
