//! # Catalog Engine
//!
//! Mirrors a remote product catalog into a local store and filters the
//! mirrored catalog with free-text segment conditions.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine talks to the outside world only through the
//!   [`CatalogSource`] and [`ProductStore`] traits
//! - **Total mapping**: remote records never fail to map; bad numbers become zero
//! - **Safe predicates**: segment text compiles to typed clauses, never to SQL
//! - **One pass at a time**: a [`Reconciler`] serializes its sync passes
//!
//! ## Core Concepts
//!
//! ### Products
//!
//! A [`RemoteProduct`] is the raw record from the remote catalog. The
//! [`map_product`] function turns it into a [`LocalProduct`], keyed by the
//! remote id.
//!
//! ### Sync passes
//!
//! [`Reconciler::run`] fetches the whole remote catalog and upserts every
//! record, reporting a [`SyncSummary`]. Products missing from the remote side
//! are left as they are.
//!
//! ### Segments
//!
//! [`compile`] turns text such as `on sale price < 50 category:"shoes"` into
//! a [`SegmentCondition`]: an AND of [`Clause`]s. [`evaluate`] runs it
//! against a store.
//!
//! ## Quick Start
//!
//! ```rust
//! use catalog_engine::{compile, Clause, Comparator, LocalProduct};
//! use rust_decimal::Decimal;
//!
//! let condition = compile("on sale price < 50");
//! assert_eq!(
//!     condition.clauses(),
//!     &[
//!         Clause::OnSale,
//!         Clause::Price { op: Comparator::LessThan, value: Decimal::from(50) },
//!     ]
//! );
//!
//! let mut product = LocalProduct::new(1, "Sandal");
//! product.on_sale = true;
//! product.price = Decimal::from(20);
//! assert!(condition.matches(&product));
//! ```

pub mod error;
pub mod mapper;
pub mod product;
pub mod reconcile;
pub mod remote;
pub mod segment;
pub mod source;
pub mod store;

// Re-export main types at crate root
pub use error::Error;
pub use mapper::map_product;
pub use product::{LocalProduct, StockStatus};
pub use reconcile::{Reconciler, SyncOutcome, SyncPhase, SyncPolicy, SyncStatus, SyncSummary};
pub use remote::{RemoteProduct, Term};
pub use segment::{compile, evaluate, evaluate_condition, Clause, Comparator, SegmentCondition};
pub use source::{CatalogSource, StaticSource};
pub use store::{MemoryStore, ProductStore};

/// Identity of a product, shared by the remote catalog and the local store.
pub type ProductId = i64;
