use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use stockledger_catalog::{NewProduct, ProductStatus};
use stockledger_core::{ProductId, UserId};
use stockledger_engine::InventoryEngine;
use stockledger_ledger::{MovementKind, MovementReason, MovementRequest};

fn seeded_engine(movement_count: usize) -> (InventoryEngine, ProductId) {
    let engine = InventoryEngine::default();
    let product = engine
        .add_product(NewProduct {
            sku: "SKU-001".to_string(),
            name: "Benchmark widget".to_string(),
            description: String::new(),
            category: "Benchmarks".to_string(),
            supplier: "ACME".to_string(),
            unit: "unit".to_string(),
            location: "A-01-001".to_string(),
            current_stock: 0,
            min_stock: 10,
            max_stock: 10_000,
            unit_cost: 500,
            barcode: "0000".to_string(),
            status: ProductStatus::Active,
        })
        .expect("seed product");

    for i in 0..movement_count {
        let (kind, reason) = if i % 3 == 0 {
            (MovementKind::Exit, MovementReason::Sale)
        } else {
            (MovementKind::Entry, MovementReason::Purchase)
        };
        engine
            .record_movement(MovementRequest {
                product_id: product.id,
                kind,
                reason,
                quantity: 1 + (i as i64 % 20),
                unit_cost: 500,
                reference: format!("REF-{i}"),
                notes: None,
                location: "A-01-001".to_string(),
                user_id: UserId::new(),
                user_name: "bench".to_string(),
            })
            .expect("seed movement");
    }

    (engine, product.id)
}

fn bench_record_movement(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_movement");
    group.throughput(Throughput::Elements(1));

    group.bench_function("entry", |b| {
        let (engine, product_id) = seeded_engine(0);
        b.iter(|| {
            engine
                .record_movement(black_box(MovementRequest {
                    product_id,
                    kind: MovementKind::Entry,
                    reason: MovementReason::Purchase,
                    quantity: 5,
                    unit_cost: 500,
                    reference: "PO-001".to_string(),
                    notes: None,
                    location: "A-01-001".to_string(),
                    user_id: UserId::new(),
                    user_name: "bench".to_string(),
                }))
                .expect("record")
        });
    });

    group.finish();
}

/// Cached-stock read vs on-demand kardex refold, across ledger sizes.
fn bench_kardex_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("kardex_vs_cached_stock");

    for size in [100usize, 1_000, 10_000] {
        let (engine, product_id) = seeded_engine(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("kardex", size), &size, |b, _| {
            b.iter(|| black_box(engine.kardex(product_id)));
        });
        group.bench_with_input(BenchmarkId::new("cached_stock", size), &size, |b, _| {
            b.iter(|| black_box(engine.product(product_id).expect("product").current_stock));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_record_movement, bench_kardex_recompute);
criterion_main!(benches);
