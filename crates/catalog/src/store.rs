use std::collections::HashMap;

use chrono::Utc;

use stockledger_core::{DomainError, DomainResult, ProductId};

use crate::product::{NewProduct, Product, ProductPatch};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProductRecord {
    product: Product,
    tombstoned: bool,
}

/// In-memory product catalog.
///
/// Insertion order is preserved so "catalog order" is deterministic for
/// listings, rankings, and tie-breaks. Tombstoned records disappear from
/// listings but stay resolvable by id for historical reports.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProductCatalog {
    order: Vec<ProductId>,
    records: HashMap<ProductId, ProductRecord>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new product: assigns the id and both timestamps, computes
    /// `total_value` from the initial stock and unit cost.
    pub fn add(&mut self, new: NewProduct) -> DomainResult<Product> {
        if new.sku.trim().is_empty() {
            return Err(DomainError::validation("SKU cannot be empty"));
        }
        if new.unit_cost < 0 {
            return Err(DomainError::validation("unit cost cannot be negative"));
        }

        let now = Utc::now();
        let product = Product {
            id: ProductId::new(),
            sku: new.sku,
            name: new.name,
            description: new.description,
            category: new.category,
            supplier: new.supplier,
            unit: new.unit,
            location: new.location,
            current_stock: new.current_stock,
            min_stock: new.min_stock,
            max_stock: new.max_stock,
            unit_cost: new.unit_cost,
            total_value: new.current_stock * new.unit_cost,
            barcode: new.barcode,
            status: new.status,
            created_at: now,
            updated_at: now,
        };

        self.order.push(product.id);
        self.records.insert(
            product.id,
            ProductRecord {
                product: product.clone(),
                tombstoned: false,
            },
        );
        Ok(product)
    }

    /// Merge a partial update over an existing (live) product, recompute
    /// `total_value`, and refresh `updated_at`.
    pub fn update(&mut self, id: ProductId, patch: ProductPatch) -> DomainResult<Product> {
        let record = self.live_record_mut(id).ok_or(DomainError::NotFound)?;
        patch.apply_to(&mut record.product);
        record.product.total_value = record.product.current_stock * record.product.unit_cost;
        record.product.updated_at = Utc::now();
        Ok(record.product.clone())
    }

    /// Hard removal. The ledger engine decides when this is allowed.
    pub fn remove(&mut self, id: ProductId) -> DomainResult<Product> {
        let record = self.records.remove(&id).ok_or(DomainError::NotFound)?;
        self.order.retain(|other| *other != id);
        Ok(record.product)
    }

    /// Mark a live product deleted while keeping it resolvable by id, so
    /// movement history and kardex remain queryable.
    pub fn tombstone(&mut self, id: ProductId) -> DomainResult<()> {
        let record = self.live_record_mut(id).ok_or(DomainError::NotFound)?;
        record.tombstoned = true;
        Ok(())
    }

    /// Resolve a product by id, including tombstoned records.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.records.get(&id).map(|r| &r.product)
    }

    /// Resolve a live (non-tombstoned) product by id.
    pub fn live(&self, id: ProductId) -> Option<&Product> {
        self.records
            .get(&id)
            .filter(|r| !r.tombstoned)
            .map(|r| &r.product)
    }

    /// Live products in catalog (insertion) order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.order.iter().filter_map(|id| self.live(*id))
    }

    /// Number of live products.
    pub fn len(&self) -> usize {
        self.products().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The ledger-engine-only stock path: apply a signed delta, recompute
    /// `total_value` from the product's stored unit cost, refresh
    /// `updated_at`. Callers outside the engine must not use this.
    pub fn adjust_stock(&mut self, id: ProductId, delta: i64) -> DomainResult<Product> {
        let record = self.live_record_mut(id).ok_or(DomainError::NotFound)?;
        record.product.current_stock += delta;
        record.product.total_value = record.product.current_stock * record.product.unit_cost;
        record.product.updated_at = Utc::now();
        Ok(record.product.clone())
    }

    /// Case-insensitive search over name/sku/barcode with an optional exact
    /// category filter, in catalog order.
    pub fn search(&self, query: &str, category: Option<&str>) -> Vec<&Product> {
        self.products()
            .filter(|p| query.is_empty() || p.matches_search(query))
            .filter(|p| category.is_none_or(|c| p.category == c))
            .collect()
    }

    fn live_record_mut(&mut self, id: ProductId) -> Option<&mut ProductRecord> {
        self.records.get_mut(&id).filter(|r| !r.tombstoned)
    }
}
