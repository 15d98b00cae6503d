use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{Entity, MovementId, ProductId, UserId};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Entry,
    Exit,
}

impl MovementKind {
    /// Sign a quantity for this direction: entries add, exits subtract.
    pub fn signed(self, quantity: i64) -> i64 {
        match self {
            MovementKind::Entry => quantity,
            MovementKind::Exit => -quantity,
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MovementKind::Entry => write!(f, "entry"),
            MovementKind::Exit => write!(f, "exit"),
        }
    }
}

/// Business reason for a stock movement.
///
/// Each direction has its own allowed subset: transfers and adjustments go
/// both ways, purchases and returns only come in, sales and waste only go out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementReason {
    Purchase,
    Sale,
    Transfer,
    Adjustment,
    Return,
    Waste,
}

impl MovementReason {
    /// Whether this reason is allowed for the given movement direction.
    pub fn allowed_for(self, kind: MovementKind) -> bool {
        use MovementReason::*;
        match kind {
            MovementKind::Entry => matches!(self, Purchase | Return | Transfer | Adjustment),
            MovementKind::Exit => matches!(self, Sale | Transfer | Waste | Adjustment),
        }
    }
}

impl core::fmt::Display for MovementReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            MovementReason::Purchase => "purchase",
            MovementReason::Sale => "sale",
            MovementReason::Transfer => "transfer",
            MovementReason::Adjustment => "adjustment",
            MovementReason::Return => "return",
            MovementReason::Waste => "waste",
        };
        write!(f, "{s}")
    }
}

/// One immutable stock change for one product.
///
/// Once appended to the ledger a movement is never updated or deleted; it is
/// the sole source of truth for stock history. `total_cost` is fixed at
/// append time and never recomputed, even if the product's unit cost later
/// changes. Amounts are in the smallest currency unit (e.g., cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub kind: MovementKind,
    pub reason: MovementReason,
    pub quantity: i64,
    /// Unit cost at the time of the movement.
    pub unit_cost: i64,
    /// `quantity * unit_cost`, fixed at append time.
    pub total_cost: i64,
    /// Free-text reference code (e.g. "PO-001").
    pub reference: String,
    pub notes: Option<String>,
    pub user_id: UserId,
    pub user_name: String,
    pub occurred_at: DateTime<Utc>,
    /// Storage location at the time of the movement.
    pub location: String,
}

impl Movement {
    /// Net stock effect of this movement.
    pub fn stock_delta(&self) -> i64 {
        self.kind.signed(self.quantity)
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for recording a movement through the ledger engine.
///
/// The engine assigns the id and timestamp and computes `total_cost`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRequest {
    pub product_id: ProductId,
    pub kind: MovementKind,
    pub reason: MovementReason,
    pub quantity: i64,
    pub unit_cost: i64,
    pub reference: String,
    pub notes: Option<String>,
    pub location: String,
    pub user_id: UserId,
    pub user_name: String,
}
