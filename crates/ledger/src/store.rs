use stockledger_core::ProductId;

use crate::movement::Movement;

/// Append-only in-memory movement ledger.
///
/// Movements are never updated or deleted; append order is the tie-break for
/// every chronological query. Not optimized for performance.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MovementLedger {
    movements: Vec<Movement>,
}

impl MovementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a movement. There is deliberately no way to remove one.
    pub fn append(&mut self, movement: Movement) {
        self.movements.push(movement);
    }

    /// All movements in append order.
    pub fn all(&self) -> &[Movement] {
        &self.movements
    }

    /// Movements for one product, in append order.
    pub fn for_product(&self, product_id: ProductId) -> impl Iterator<Item = &Movement> {
        self.movements
            .iter()
            .filter(move |m| m.product_id == product_id)
    }

    /// Whether any movement references the product.
    pub fn has_for_product(&self, product_id: ProductId) -> bool {
        self.for_product(product_id).next().is_some()
    }

    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }
}
