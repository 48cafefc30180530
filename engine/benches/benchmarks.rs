//! Performance benchmarks for tally-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tally_engine::{
    diff_items, resolve_payload, ConflictDetector, FieldPick, FieldResolution, Item,
    MergeStrategy, RecordSet,
};

/// Record sets with `count` items each, every pair diverged.
fn diverged_sets(count: usize) -> (RecordSet, RecordSet) {
    let local_items: Vec<_> = (0..count)
        .map(|i| {
            let mut item = Item::new(format!("item-{}", i), 1000);
            item.quantity = i as i64;
            item
        })
        .collect();
    let remote_items: Vec<_> = local_items
        .iter()
        .map(|item| {
            let mut r = item.clone();
            r.name = format!("{} (edited)", r.name);
            r.quantity += 1;
            r.modified_at = 2000;
            r
        })
        .collect();
    (
        RecordSet::new().with_items(local_items),
        RecordSet::new().with_items(remote_items),
    )
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detection");
    let detector = ConflictDetector::new("bench-device");

    for count in [10, 100, 1000] {
        let (local, remote) = diverged_sets(count);
        group.bench_with_input(
            BenchmarkId::new("detect_all_diverged", count),
            &count,
            |b, _| b.iter(|| detector.detect(black_box(&local), black_box(&remote), 5000)),
        );
    }

    // Converged sets: same pairing work, no conflict construction
    let (local, _) = diverged_sets(1000);
    group.bench_function("detect_all_converged", |b| {
        b.iter(|| detector.detect(black_box(&local), black_box(&local), 5000))
    });

    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_diff");

    let old = Item::new("Laptop", 1000);
    let mut new = old.clone();
    new.name = "Laptop Pro".into();
    new.quantity = 5;
    new.purchase_price = Some(1299.0);

    group.bench_function("diff_items", |b| {
        b.iter(|| diff_items(black_box(&old), black_box(&new)))
    });

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    let detector = ConflictDetector::new("bench-device");
    let (local, remote) = diverged_sets(1);
    let conflicts = detector.detect(&local, &remote, 5000);
    let conflict = &conflicts[0];

    group.bench_function("latest_wins", |b| {
        b.iter(|| resolve_payload(black_box(conflict), &MergeStrategy::LatestWins, 9000))
    });

    let field_level = MergeStrategy::FieldLevel {
        resolutions: vec![
            FieldResolution::new("name", FieldPick::UseRemote),
            FieldResolution::new("quantity", FieldPick::UseRemote),
        ],
    };
    group.bench_function("field_level", |b| {
        b.iter(|| resolve_payload(black_box(conflict), black_box(&field_level), 9000))
    });

    group.finish();
}

criterion_group!(benches, bench_detection, bench_diff, bench_merge);
criterion_main!(benches);
