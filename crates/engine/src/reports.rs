//! Read-side aggregation over the catalog + ledger snapshot.
//!
//! Every operation here is a pure read: it takes the read side of the engine
//! lock, derives its answer, and mutates nothing. Running balances are
//! recomputed from the full movement history, independent of the cached
//! stock on the product, so the two can be cross-checked.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockledger_catalog::Product;
use stockledger_core::ProductId;
use stockledger_ledger::{Movement, MovementKind, MovementReason};

use crate::engine::InventoryEngine;

/// Default ranking size for [`InventoryEngine::top_moved_products`].
pub const DEFAULT_TOP_MOVED_LIMIT: usize = 5;

/// One kardex row: a movement plus the stock balance right after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KardexRow {
    pub movement: Movement,
    pub running_balance: i64,
}

/// A product ranked by total moved quantity (entries and exits both counted
/// as positive magnitude).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductActivity {
    pub product: Product,
    pub moved_quantity: i64,
}

/// Movement totals split by direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementTotals {
    pub entry_count: usize,
    pub exit_count: usize,
    pub entry_value: i64,
    pub exit_value: i64,
    /// `entry_value - exit_value`.
    pub net_value: i64,
}

/// Inventory-wide summary statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_products: usize,
    pub total_valuation: i64,
    pub active_products: usize,
    pub category_count: usize,
    /// `total_valuation / total_products` in integer cents; 0 when empty.
    pub average_valuation: i64,
    pub movements: MovementTotals,
}

/// Per-category rollup, in first-seen catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub product_count: usize,
    pub total_stock: i64,
    pub total_value: i64,
}

/// Filter for [`InventoryEngine::movements_matching`].
///
/// `search` matches case-insensitively against the product name, product
/// sku, or the movement reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    pub search: Option<String>,
    pub kind: Option<MovementKind>,
    pub reason: Option<MovementReason>,
}

impl InventoryEngine {
    /// Products at or below their minimum stock threshold, in catalog order.
    pub fn low_stock_products(&self) -> Vec<Product> {
        self.read()
            .catalog
            .products()
            .filter(|p| p.is_low_stock())
            .cloned()
            .collect()
    }

    /// Products ranked by total moved quantity, descending; ties keep
    /// catalog order (stable sort). Zero-movement products rank last but
    /// are not excluded.
    pub fn top_moved_products(&self, limit: usize) -> Vec<ProductActivity> {
        let state = self.read();
        let mut ranked: Vec<ProductActivity> = state
            .catalog
            .products()
            .map(|product| ProductActivity {
                moved_quantity: state
                    .ledger
                    .for_product(product.id)
                    .map(|m| m.quantity)
                    .sum(),
                product: product.clone(),
            })
            .collect();
        ranked.sort_by(|a, b| b.moved_quantity.cmp(&a.moved_quantity));
        ranked.truncate(limit);
        ranked
    }

    /// All movements referencing the product, in ledger-append order.
    pub fn movements_for_product(&self, product_id: ProductId) -> Vec<Movement> {
        self.read()
            .ledger
            .for_product(product_id)
            .cloned()
            .collect()
    }

    /// The per-product kardex: movements in chronological order, each with
    /// the running balance after it. Recomputed from history on demand,
    /// independent of the product's cached `current_stock`.
    pub fn kardex(&self, product_id: ProductId) -> Vec<KardexRow> {
        let movements: Vec<Movement> = self
            .read()
            .ledger
            .for_product(product_id)
            .cloned()
            .collect();
        fold_kardex(movements)
    }

    /// Inventory-wide summary statistics over live products plus per-type
    /// movement totals over the whole ledger.
    pub fn summary_statistics(&self) -> InventorySummary {
        let state = self.read();

        let mut summary = InventorySummary::default();
        let mut categories: HashSet<&str> = HashSet::new();
        for product in state.catalog.products() {
            summary.total_products += 1;
            summary.total_valuation += product.total_value;
            if product.is_active() {
                summary.active_products += 1;
            }
            categories.insert(product.category.as_str());
        }
        summary.category_count = categories.len();
        summary.average_valuation = if summary.total_products == 0 {
            0
        } else {
            summary.total_valuation / summary.total_products as i64
        };

        for movement in state.ledger.all() {
            match movement.kind {
                MovementKind::Entry => {
                    summary.movements.entry_count += 1;
                    summary.movements.entry_value += movement.total_cost;
                }
                MovementKind::Exit => {
                    summary.movements.exit_count += 1;
                    summary.movements.exit_value += movement.total_cost;
                }
            }
        }
        summary.movements.net_value =
            summary.movements.entry_value - summary.movements.exit_value;

        summary
    }

    /// Per-category product count, summed stock, and summed value, in
    /// first-seen catalog order.
    pub fn category_breakdown(&self) -> Vec<CategorySummary> {
        let state = self.read();
        let mut breakdown: Vec<CategorySummary> = Vec::new();
        for product in state.catalog.products() {
            match breakdown
                .iter_mut()
                .find(|entry| entry.category == product.category)
            {
                Some(entry) => {
                    entry.product_count += 1;
                    entry.total_stock += product.current_stock;
                    entry.total_value += product.total_value;
                }
                None => breakdown.push(CategorySummary {
                    category: product.category.clone(),
                    product_count: 1,
                    total_stock: product.current_stock,
                    total_value: product.total_value,
                }),
            }
        }
        breakdown
    }

    /// Case-insensitive product search over name/sku/barcode with an
    /// optional exact category filter.
    pub fn search_products(&self, query: &str, category: Option<&str>) -> Vec<Product> {
        self.read()
            .catalog
            .search(query, category)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Movements matching the filter, in ledger-append order.
    pub fn movements_matching(&self, filter: &MovementFilter) -> Vec<Movement> {
        let state = self.read();
        state
            .ledger
            .all()
            .iter()
            .filter(|m| filter.kind.is_none_or(|kind| m.kind == kind))
            .filter(|m| filter.reason.is_none_or(|reason| m.reason == reason))
            .filter(|m| match &filter.search {
                None => true,
                Some(query) => {
                    let query = query.to_lowercase();
                    m.reference.to_lowercase().contains(&query)
                        || state.catalog.get(m.product_id).is_some_and(|p| {
                            p.name.to_lowercase().contains(&query)
                                || p.sku.to_lowercase().contains(&query)
                        })
                }
            })
            .cloned()
            .collect()
    }

    /// Movements whose timestamp falls on the given calendar day.
    pub fn movements_on(&self, date: NaiveDate) -> Vec<Movement> {
        self.read()
            .ledger
            .all()
            .iter()
            .filter(|m| m.occurred_at.date_naive() == date)
            .cloned()
            .collect()
    }
}

/// Sort chronologically (stable, so equal timestamps keep append order) and
/// fold the running balance.
fn fold_kardex(mut movements: Vec<Movement>) -> Vec<KardexRow> {
    movements.sort_by_key(|m| m.occurred_at);
    let mut running_balance = 0;
    movements
        .into_iter()
        .map(|movement| {
            running_balance += movement.stock_delta();
            KardexRow {
                running_balance,
                movement,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stockledger_catalog::{NewProduct, ProductStatus};
    use stockledger_core::{MovementId, UserId};
    use stockledger_ledger::MovementRequest;

    fn new_product(sku: &str, category: &str, stock: i64, min: i64, unit_cost: i64) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            description: String::new(),
            category: category.to_string(),
            supplier: "ACME".to_string(),
            unit: "unit".to_string(),
            location: "A-01-001".to_string(),
            current_stock: stock,
            min_stock: min,
            max_stock: 100,
            unit_cost,
            barcode: "0000".to_string(),
            status: ProductStatus::Active,
        }
    }

    fn request(product_id: ProductId, kind: MovementKind, reason: MovementReason, quantity: i64) -> MovementRequest {
        MovementRequest {
            product_id,
            kind,
            reason,
            quantity,
            unit_cost: 100,
            reference: "REF-001".to_string(),
            notes: None,
            location: "A-01-001".to_string(),
            user_id: UserId::new(),
            user_name: "admin".to_string(),
        }
    }

    fn fixed_movement(product_id: ProductId, kind: MovementKind, quantity: i64, at: &str) -> Movement {
        Movement {
            id: MovementId::new(),
            product_id,
            kind,
            reason: match kind {
                MovementKind::Entry => MovementReason::Purchase,
                MovementKind::Exit => MovementReason::Sale,
            },
            quantity,
            unit_cost: 100,
            total_cost: quantity * 100,
            reference: "REF-001".to_string(),
            notes: None,
            user_id: UserId::new(),
            user_name: "admin".to_string(),
            occurred_at: at.parse().unwrap(),
            location: "A-01-001".to_string(),
        }
    }

    #[test]
    fn low_stock_contains_exactly_the_products_at_or_below_min() {
        let engine = InventoryEngine::default();
        let low = engine.add_product(new_product("SKU-001", "A", 3, 20, 100)).unwrap();
        let boundary = engine.add_product(new_product("SKU-002", "A", 20, 20, 100)).unwrap();
        engine.add_product(new_product("SKU-003", "A", 21, 20, 100)).unwrap();

        let ids: Vec<_> = engine.low_stock_products().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![low.id, boundary.id]);
    }

    #[test]
    fn top_moved_ranks_by_magnitude_with_stable_ties() {
        let engine = InventoryEngine::default();
        let a = engine.add_product(new_product("SKU-001", "A", 50, 0, 100)).unwrap();
        let b = engine.add_product(new_product("SKU-002", "A", 50, 0, 100)).unwrap();
        let c = engine.add_product(new_product("SKU-003", "A", 50, 0, 100)).unwrap();
        let idle = engine.add_product(new_product("SKU-004", "A", 50, 0, 100)).unwrap();

        // b moves 12 (10 in + 2 out: magnitudes add up, not net), a moves 7, c moves 7.
        engine.record_movement(request(b.id, MovementKind::Entry, MovementReason::Purchase, 10)).unwrap();
        engine.record_movement(request(b.id, MovementKind::Exit, MovementReason::Sale, 2)).unwrap();
        engine.record_movement(request(a.id, MovementKind::Entry, MovementReason::Purchase, 7)).unwrap();
        engine.record_movement(request(c.id, MovementKind::Exit, MovementReason::Sale, 7)).unwrap();

        let ranked = engine.top_moved_products(DEFAULT_TOP_MOVED_LIMIT);
        let ids: Vec<_> = ranked.iter().map(|entry| entry.product.id).collect();
        // a and c tie at 7; catalog order breaks the tie. idle ranks last.
        assert_eq!(ids, vec![b.id, a.id, c.id, idle.id]);
        assert_eq!(ranked[0].moved_quantity, 12);
        assert_eq!(ranked[3].moved_quantity, 0);

        let top_two = engine.top_moved_products(2);
        assert_eq!(top_two.len(), 2);
        assert_eq!(top_two[0].product.id, b.id);
    }

    #[test]
    fn kardex_folds_running_balance_in_order() {
        let engine = InventoryEngine::default();
        let product = engine.add_product(new_product("SKU-001", "A", 0, 0, 100)).unwrap();

        engine.record_movement(request(product.id, MovementKind::Entry, MovementReason::Purchase, 10)).unwrap();
        engine.record_movement(request(product.id, MovementKind::Exit, MovementReason::Sale, 4)).unwrap();
        engine.record_movement(request(product.id, MovementKind::Entry, MovementReason::Return, 1)).unwrap();

        let rows = engine.kardex(product.id);
        let balances: Vec<_> = rows.iter().map(|row| row.running_balance).collect();
        assert_eq!(balances, vec![10, 6, 7]);
        // Kardex agrees with the cached stock.
        assert_eq!(rows.last().unwrap().running_balance, engine.product(product.id).unwrap().current_stock);
    }

    #[test]
    fn kardex_breaks_equal_timestamps_by_append_order() {
        let product_id = ProductId::new();
        let same_instant = "2024-01-15T10:00:00Z";
        let rows = fold_kardex(vec![
            fixed_movement(product_id, MovementKind::Entry, 10, same_instant),
            fixed_movement(product_id, MovementKind::Exit, 4, same_instant),
            fixed_movement(product_id, MovementKind::Entry, 1, "2024-01-14T10:00:00Z"),
        ]);

        // The older movement sorts first; the equal-timestamp pair keeps
        // its append order.
        let balances: Vec<_> = rows.iter().map(|row| row.running_balance).collect();
        assert_eq!(balances, vec![1, 11, 7]);
    }

    #[test]
    fn summary_statistics_cover_catalog_and_ledger() {
        let engine = InventoryEngine::default();
        let a = engine.add_product(new_product("SKU-001", "Electronics", 10, 0, 100)).unwrap();
        let b = engine.add_product(new_product("SKU-002", "Furniture", 5, 0, 200)).unwrap();
        engine
            .update_product(
                b.id,
                stockledger_catalog::ProductPatch {
                    status: Some(ProductStatus::Inactive),
                    ..Default::default()
                },
            )
            .unwrap();

        engine.record_movement(request(a.id, MovementKind::Entry, MovementReason::Purchase, 10)).unwrap();
        engine.record_movement(request(a.id, MovementKind::Exit, MovementReason::Sale, 3)).unwrap();

        let summary = engine.summary_statistics();
        assert_eq!(summary.total_products, 2);
        // a: (10+10-3)*100, b: 5*200.
        assert_eq!(summary.total_valuation, 17 * 100 + 5 * 200);
        assert_eq!(summary.active_products, 1);
        assert_eq!(summary.category_count, 2);
        assert_eq!(summary.average_valuation, (17 * 100 + 5 * 200) / 2);
        assert_eq!(summary.movements.entry_count, 1);
        assert_eq!(summary.movements.exit_count, 1);
        assert_eq!(summary.movements.entry_value, 10 * 100);
        assert_eq!(summary.movements.exit_value, 3 * 100);
        assert_eq!(summary.movements.net_value, 7 * 100);
    }

    #[test]
    fn summary_statistics_on_empty_engine_are_all_zero() {
        let engine = InventoryEngine::default();
        let summary = engine.summary_statistics();
        assert_eq!(summary, InventorySummary::default());
        assert_eq!(summary.average_valuation, 0);
    }

    #[test]
    fn category_breakdown_rolls_up_in_first_seen_order() {
        let engine = InventoryEngine::default();
        engine.add_product(new_product("SKU-001", "Electronics", 10, 0, 100)).unwrap();
        engine.add_product(new_product("SKU-002", "Furniture", 5, 0, 200)).unwrap();
        engine.add_product(new_product("SKU-003", "Electronics", 2, 0, 50)).unwrap();

        let breakdown = engine.category_breakdown();
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, "Electronics");
        assert_eq!(breakdown[0].product_count, 2);
        assert_eq!(breakdown[0].total_stock, 12);
        assert_eq!(breakdown[0].total_value, 10 * 100 + 2 * 50);
        assert_eq!(breakdown[1].category, "Furniture");
        assert_eq!(breakdown[1].product_count, 1);
    }

    #[test]
    fn movements_matching_filters_by_search_kind_and_reason() {
        let engine = InventoryEngine::default();
        let laptop = engine.add_product(new_product("SKU-001", "Electronics", 10, 0, 100)).unwrap();
        let chair = engine.add_product(new_product("SKU-002", "Furniture", 10, 0, 100)).unwrap();

        let mut req = request(laptop.id, MovementKind::Entry, MovementReason::Purchase, 5);
        req.reference = "PO-100".to_string();
        engine.record_movement(req).unwrap();
        let mut req = request(chair.id, MovementKind::Exit, MovementReason::Sale, 2);
        req.reference = "SO-200".to_string();
        engine.record_movement(req).unwrap();

        let all = engine.movements_matching(&MovementFilter::default());
        assert_eq!(all.len(), 2);

        let entries = engine.movements_matching(&MovementFilter {
            kind: Some(MovementKind::Entry),
            ..Default::default()
        });
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].product_id, laptop.id);

        let sales = engine.movements_matching(&MovementFilter {
            reason: Some(MovementReason::Sale),
            ..Default::default()
        });
        assert_eq!(sales.len(), 1);

        // Search hits the product sku and the movement reference.
        let by_sku = engine.movements_matching(&MovementFilter {
            search: Some("sku-002".to_string()),
            ..Default::default()
        });
        assert_eq!(by_sku.len(), 1);
        assert_eq!(by_sku[0].product_id, chair.id);

        let by_reference = engine.movements_matching(&MovementFilter {
            search: Some("po-100".to_string()),
            ..Default::default()
        });
        assert_eq!(by_reference.len(), 1);
        assert_eq!(by_reference[0].product_id, laptop.id);
    }

    #[test]
    fn movements_on_filters_by_calendar_day() {
        let engine = InventoryEngine::default();
        let product = engine.add_product(new_product("SKU-001", "A", 10, 0, 100)).unwrap();
        engine.record_movement(request(product.id, MovementKind::Entry, MovementReason::Purchase, 1)).unwrap();

        let today = Utc::now().date_naive();
        assert_eq!(engine.movements_on(today).len(), 1);

        let past = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap().date_naive();
        assert!(engine.movements_on(past).is_empty());
    }

    #[test]
    fn tombstoned_products_keep_their_kardex_but_leave_aggregates() {
        let engine = InventoryEngine::new(crate::engine::DeletePolicy::Tombstone);
        let product = engine.add_product(new_product("SKU-001", "A", 3, 20, 100)).unwrap();
        engine.record_movement(request(product.id, MovementKind::Entry, MovementReason::Purchase, 5)).unwrap();

        engine.delete_product(product.id).unwrap();

        assert!(engine.low_stock_products().is_empty());
        assert_eq!(engine.summary_statistics().total_products, 0);
        assert!(engine.top_moved_products(DEFAULT_TOP_MOVED_LIMIT).is_empty());
        // History is still queryable by id.
        assert_eq!(engine.kardex(product.id).len(), 1);
        assert_eq!(engine.movements_for_product(product.id).len(), 1);
    }
}
