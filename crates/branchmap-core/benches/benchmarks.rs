use branchmap_core::geometry::REGION_NAME_KEYS;
use branchmap_core::selector::filter_branches;
use branchmap_core::{BranchSearch, Dataset, MapLayer, Selector};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

const TOPOLOGY: &[u8] = include_bytes!("../tests/fixtures/india.json");

fn bench_dataset(c: &mut Criterion) {
    let json = include_str!("../data/branches.json");
    c.bench_function("parse bundled dataset", |b| {
        b.iter(|| Dataset::from_json_str(black_box(json)).unwrap())
    });

    let db = Dataset::bundled().unwrap();
    let raj = db.region("Rajasthan").unwrap();
    let branches = db.branches_for_region(raj);

    c.bench_function("filter region branches", |b| {
        b.iter(|| filter_branches(black_box(branches), black_box("na")).visible.len())
    });

    c.bench_function("search all branches", |b| {
        b.iter(|| db.find_branches(black_box("pur")).len())
    });
}

fn bench_geometry(c: &mut Criterion) {
    c.bench_function("decode + project topology", |b| {
        b.iter(|| {
            MapLayer::from_topology_bytes(
                black_box(TOPOLOGY),
                Some("India-States"),
                REGION_NAME_KEYS,
                600.0,
                600.0,
            )
            .unwrap()
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let mut selector = Selector::bundled().unwrap();
    selector.select_region("Rajasthan");
    selector.filter_branches("a");

    c.bench_function("render region detail", |b| {
        b.iter(|| selector.render().to_html().len())
    });
}

criterion_group!(benches, bench_dataset, bench_geometry, bench_render);
criterion_main!(benches);
