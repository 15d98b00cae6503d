use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use stockledger_catalog::{NewProduct, Product, ProductCatalog, ProductPatch};
use stockledger_core::{DomainError, DomainResult, MovementId, ProductId};
use stockledger_ledger::{Movement, MovementLedger, MovementRequest};

/// What `delete_product` does when the product has recorded movements.
///
/// Either way the engine never leaves orphan movements behind: a product
/// without history is simply removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Refuse deletion with a conflict error.
    #[default]
    Deny,
    /// Hide the product from listings and aggregates while keeping it
    /// resolvable by id, so kardex and movement history stay queryable.
    Tombstone,
}

/// Insufficient-stock preview for an exit.
///
/// The engine never blocks an exit on insufficient stock; this gives callers
/// the data to warn the user *before* submitting the movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockShortage {
    pub current_stock: i64,
    pub requested: i64,
    pub shortfall: i64,
}

#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub(crate) catalog: ProductCatalog,
    pub(crate) ledger: MovementLedger,
}

/// The inventory ledger engine: single writer over catalog + ledger.
///
/// Mutating operations serialize on the write side of one lock, so each call
/// is a single atomic transition with no intermediate state observable.
/// Read-side queries take the read side and see a consistent snapshot.
#[derive(Debug, Default)]
pub struct InventoryEngine {
    policy: DeletePolicy,
    state: RwLock<EngineState>,
}

impl InventoryEngine {
    pub fn new(policy: DeletePolicy) -> Self {
        Self {
            policy,
            state: RwLock::new(EngineState::default()),
        }
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.policy
    }

    // Writers validate fully before mutating, so the state behind a poisoned
    // lock is always consistent and can be recovered.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, EngineState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EngineState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a product to the catalog.
    pub fn add_product(&self, new: NewProduct) -> DomainResult<Product> {
        let mut state = self.write();
        let product = state.catalog.add(new)?;
        tracing::info!("Added product {} ({})", product.sku, product.id);
        Ok(product)
    }

    /// Merge a partial update over an existing product.
    pub fn update_product(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Product> {
        let mut state = self.write();
        let product = state.catalog.update(id, patch)?;
        tracing::debug!("Updated product {}", product.id);
        Ok(product)
    }

    /// Delete a product, subject to the configured [`DeletePolicy`] when it
    /// has recorded movements.
    pub fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        let mut state = self.write();
        if state.catalog.live(id).is_none() {
            return Err(DomainError::NotFound);
        }

        if state.ledger.has_for_product(id) {
            match self.policy {
                DeletePolicy::Deny => {
                    return Err(DomainError::conflict(
                        "product has recorded movements and cannot be deleted",
                    ));
                }
                DeletePolicy::Tombstone => {
                    state.catalog.tombstone(id)?;
                    tracing::info!("Tombstoned product {} (movement history retained)", id);
                    return Ok(());
                }
            }
        }

        state.catalog.remove(id)?;
        tracing::info!("Removed product {}", id);
        Ok(())
    }

    /// Resolve a product by id. Tombstoned products remain resolvable here
    /// for historical reports; deleted ones are `None`.
    pub fn product(&self, id: ProductId) -> Option<Product> {
        self.read().catalog.get(id).cloned()
    }

    /// Live products in catalog order.
    pub fn products(&self) -> Vec<Product> {
        self.read().catalog.products().cloned().collect()
    }

    /// All movements in ledger-append order.
    pub fn movements(&self) -> Vec<Movement> {
        self.read().ledger.all().to_vec()
    }

    /// Preview whether an exit of `quantity` would overdraw the product's
    /// current stock. Returns `None` when stock suffices.
    pub fn exit_shortage(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<Option<StockShortage>> {
        let state = self.read();
        let product = state.catalog.live(product_id).ok_or(DomainError::NotFound)?;
        if quantity > product.current_stock {
            Ok(Some(StockShortage {
                current_stock: product.current_stock,
                requested: quantity,
                shortfall: quantity - product.current_stock,
            }))
        } else {
            Ok(None)
        }
    }

    /// Apply a movement: validate, append to the ledger, and update the
    /// product's stock and valuation in one consistent step.
    ///
    /// Validation order: product exists, quantity positive, reason allowed
    /// for the direction, unit cost non-negative, reference non-blank. A
    /// rejected call leaves catalog and ledger unchanged. An exit exceeding
    /// current stock is *not* rejected; the stock goes negative (see
    /// [`Self::exit_shortage`] for the caller-side warning).
    pub fn record_movement(&self, request: MovementRequest) -> DomainResult<Movement> {
        let mut state = self.write();

        if state.catalog.live(request.product_id).is_none() {
            return Err(DomainError::NotFound);
        }
        if request.quantity <= 0 {
            return Err(DomainError::validation("quantity must be a positive integer"));
        }
        if !request.reason.allowed_for(request.kind) {
            return Err(DomainError::validation(format!(
                "reason '{}' is not allowed for {} movements",
                request.reason, request.kind
            )));
        }
        if request.unit_cost < 0 {
            return Err(DomainError::validation("unit cost cannot be negative"));
        }
        if request.reference.trim().is_empty() {
            return Err(DomainError::validation("reference cannot be empty"));
        }

        let movement = Movement {
            id: MovementId::new(),
            product_id: request.product_id,
            kind: request.kind,
            reason: request.reason,
            quantity: request.quantity,
            unit_cost: request.unit_cost,
            total_cost: request.quantity * request.unit_cost,
            reference: request.reference,
            notes: request.notes,
            user_id: request.user_id,
            user_name: request.user_name,
            occurred_at: Utc::now(),
            location: request.location,
        };

        // The stock update is the only fallible mutation; it runs before the
        // append so catalog and ledger can never diverge.
        state
            .catalog
            .adjust_stock(movement.product_id, movement.stock_delta())?;
        state.ledger.append(movement.clone());

        tracing::info!(
            "Recorded {} of {} units for product {} ({})",
            movement.kind,
            movement.quantity,
            movement.product_id,
            movement.reference
        );
        Ok(movement)
    }
}
