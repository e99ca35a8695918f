//! Persistence for products, cart lines and user summaries.
//!
//! The [`InventoryStore`] trait is the only way the rest of the system
//! touches stored state. Stock is never written with a read-then-write:
//! every change goes through [`InventoryStore::apply_stock_delta`], which
//! applies the delta only if the result stays within bounds.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;
pub use query::{LineKindFilter, LineQuery};
pub use store::{InventoryStore, InventoryStoreExt, ProductRemoval, StatusUpdate, StockUpdate};
