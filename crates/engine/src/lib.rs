//! `stockledger-engine` — the inventory ledger engine.
//!
//! The engine is the single path through which stock state changes: it owns
//! the product catalog and the movement ledger behind one lock, applies
//! movements atomically, and serves the whole read-side aggregation layer.
//! Construct one per process (or per test) and inject it into consumers;
//! there is no ambient global state.

pub mod engine;
pub mod reports;

pub use engine::{DeletePolicy, InventoryEngine, StockShortage};
pub use reports::{
    CategorySummary, DEFAULT_TOP_MOVED_LIMIT, InventorySummary, KardexRow, MovementFilter,
    MovementTotals, ProductActivity,
};
