//! Benchmarks for the detection hot path

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use poly_arb::config::{DetectorConfig, SizingConfig, ValidatorConfig};
use poly_arb::opportunity::{OpportunityDetector, OpportunityValidator};
use poly_arb::price::{PriceCache, PriceUpdate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn seeded_cache(markets: usize) -> Arc<PriceCache> {
    let cache = Arc::new(PriceCache::new());
    for i in 0..markets {
        // Every fourth market carries a 3c edge
        let no = if i % 4 == 0 { dec!(0.50) } else { dec!(0.53) };
        cache.update(
            &format!("market-{i}"),
            PriceUpdate::both(dec!(0.47), no).with_tokens(format!("y{i}"), format!("n{i}")),
        );
    }
    cache
}

fn benchmark_price_update(c: &mut Criterion) {
    let cache = seeded_cache(1);
    let detector = OpportunityDetector::new(
        Arc::clone(&cache),
        &DetectorConfig::default(),
        &SizingConfig::default(),
    );
    let snapshot = cache.get("market-0").unwrap();

    c.bench_function("detector_price_update", |b| {
        b.iter(|| detector.on_price_update(black_box(&snapshot)))
    });
}

fn benchmark_scan_all(c: &mut Criterion) {
    let cache = seeded_cache(500);
    let detector =
        OpportunityDetector::new(cache, &DetectorConfig::default(), &SizingConfig::default());

    c.bench_function("detector_scan_all_500", |b| {
        b.iter(|| black_box(detector.scan_all()))
    });
}

fn benchmark_rank(c: &mut Criterion) {
    let cache = seeded_cache(500);
    let detector =
        OpportunityDetector::new(cache, &DetectorConfig::default(), &SizingConfig::default());
    let opportunities = detector.scan_all();
    let validator = OpportunityValidator::new(&ValidatorConfig::default(), Decimal::new(2, 2));

    c.bench_function("validator_rank_125", |b| {
        b.iter(|| black_box(validator.rank(opportunities.clone())))
    });
}

criterion_group!(
    benches,
    benchmark_price_update,
    benchmark_scan_all,
    benchmark_rank
);
criterion_main!(benches);
