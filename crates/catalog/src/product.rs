use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{Entity, ProductId};

/// Product status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
}

/// Stock-level classification relative to the product's thresholds.
///
/// `Low` when current stock is at or below the minimum, `Good` when it is at
/// or above 80% of the maximum, `Medium` in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Low,
    Medium,
    Good,
}

/// Catalog record for one stock-keeping unit.
///
/// `current_stock` and `total_value` are derived fields maintained by the
/// catalog and the ledger engine; callers must not set them directly.
/// `current_stock` may go negative: exits are never blocked on insufficient
/// stock. All monetary amounts are in the smallest currency unit (e.g., cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub supplier: String,
    /// Unit of measure (e.g. "unit", "ream").
    pub unit: String,
    /// Storage location code (e.g. "A-01-001").
    pub location: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    pub unit_cost: i64,
    /// Always `current_stock * unit_cost` after any mutation.
    pub total_value: i64,
    pub barcode: String,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// A product is low on stock when at or below its minimum threshold.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }

    /// Classify the current stock against the min/max thresholds.
    pub fn stock_level(&self) -> StockLevel {
        if self.current_stock <= self.min_stock {
            StockLevel::Low
        } else if 5 * self.current_stock >= 4 * self.max_stock {
            // current_stock >= 0.8 * max_stock, in integer arithmetic.
            StockLevel::Good
        } else {
            StockLevel::Medium
        }
    }

    /// Case-insensitive match on name, sku, or barcode.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.sku.to_lowercase().contains(&query)
            || self.barcode.to_lowercase().contains(&query)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Caller-settable fields for a new product.
///
/// The catalog assigns the id and both timestamps and computes `total_value`
/// from the initial stock count and unit cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub supplier: String,
    pub unit: String,
    pub location: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    pub unit_cost: i64,
    pub barcode: String,
    pub status: ProductStatus,
}

/// Partial update merged over an existing product.
///
/// `current_stock` is included because the update path does not technically
/// forbid it, but stock should only move through the ledger engine — this is
/// a documented contract, not enforced by types. `total_value` is absent: it
/// is recomputed after every merge so the derived pair cannot be desynced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub current_stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub unit_cost: Option<i64>,
    pub barcode: Option<String>,
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    /// Merge the set fields over `product`. Does not touch derived fields or
    /// timestamps; the store owns those.
    pub(crate) fn apply_to(self, product: &mut Product) {
        if let Some(sku) = self.sku {
            product.sku = sku;
        }
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(supplier) = self.supplier {
            product.supplier = supplier;
        }
        if let Some(unit) = self.unit {
            product.unit = unit;
        }
        if let Some(location) = self.location {
            product.location = location;
        }
        if let Some(current_stock) = self.current_stock {
            product.current_stock = current_stock;
        }
        if let Some(min_stock) = self.min_stock {
            product.min_stock = min_stock;
        }
        if let Some(max_stock) = self.max_stock {
            product.max_stock = max_stock;
        }
        if let Some(unit_cost) = self.unit_cost {
            product.unit_cost = unit_cost;
        }
        if let Some(barcode) = self.barcode {
            product.barcode = barcode;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
    }
}
