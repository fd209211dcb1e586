//! Criterion benchmarks for the per-selection path.
//!
//! Run with: cargo bench --bench hot_paths

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::DVec2;
use waste_dashboard::binder::{bind_dropdown, bind_map_click, Selection};
use waste_dashboard::dataset::{columns, BBox, DistrictBoundaries, DistrictRecord, DistrictShape, DistrictTable};
use waste_dashboard::metrics;
use waste_dashboard::DataContext;

const DISTRICTS: usize = 55;

fn name(i: usize) -> String {
    format!("District {i:02}")
}

fn table() -> DistrictTable {
    DistrictTable::from_records(
        (0..DISTRICTS)
            .map(|i| {
                let generated = 50.0 + i as f64 * 20.0;
                DistrictRecord::new(name(i))
                    .with(columns::CENSUS_2011, 1_000_000.0 + i as f64 * 25_000.0)
                    .with(columns::PROJECTED_2025, 1_300_000.0 + i as f64 * 30_000.0)
                    .with(columns::PROJECTED_2030, 1_450_000.0 + i as f64 * 32_000.0)
                    .with(columns::SW_GENERATED, generated)
                    .with(columns::SW_PROCESSED, generated * 0.6)
                    .with(columns::SW_GAP, generated * 0.4)
                    .with(columns::SW_GENERATED_2030, generated * 1.2)
                    .with(columns::SW_PROCESSED_2030, generated * 0.9)
                    .with(columns::PLASTIC_TPD, generated * 0.1)
                    .with(columns::CD_TPD_2025, generated * 0.2)
                    .with(columns::EWASTE_TPA, 400.0)
            })
            .collect(),
    )
}

/// 11 x 5 grid of one-degree districts with 64-vertex rings
fn boundaries() -> DistrictBoundaries {
    let shapes = (0..DISTRICTS)
        .map(|i| {
            let lon0 = 74.0 + (i % 11) as f64;
            let lat0 = 21.0 + (i / 11) as f64;
            let mut ring = Vec::with_capacity(64);
            for k in 0..16 {
                let t = k as f64 / 16.0;
                ring.push(DVec2::new(lon0 + t, lat0));
            }
            for k in 0..16 {
                let t = k as f64 / 16.0;
                ring.push(DVec2::new(lon0 + 1.0, lat0 + t));
            }
            for k in 0..16 {
                let t = k as f64 / 16.0;
                ring.push(DVec2::new(lon0 + 1.0 - t, lat0 + 1.0));
            }
            for k in 0..16 {
                let t = k as f64 / 16.0;
                ring.push(DVec2::new(lon0, lat0 + 1.0 - t));
            }
            let mut bbox = BBox::EMPTY;
            for p in &ring {
                bbox.extend(p.x, p.y);
            }
            DistrictShape {
                name: name(i),
                polygons: vec![vec![ring]],
                bbox,
            }
        })
        .collect();
    DistrictBoundaries::from_shapes(shapes).expect("synthetic shapes")
}

fn bench_derive(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics_derive");
    let table = table();
    let last = name(DISTRICTS - 1);

    group.bench_function("derive_for_last_district", |b| {
        b.iter(|| black_box(metrics::derive_for(&table, black_box(&last))));
    });

    group.finish();
}

fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("boundaries_locate");
    let boundaries = boundaries();

    group.bench_function("hit", |b| {
        b.iter(|| black_box(boundaries.locate(black_box(79.3), black_box(23.7))));
    });
    group.bench_function("miss_outside_state", |b| {
        b.iter(|| black_box(boundaries.locate(black_box(90.0), black_box(30.0))));
    });

    group.finish();
}

fn bench_bind(c: &mut Criterion) {
    let mut group = c.benchmark_group("binder");
    let ctx = DataContext::new(table()).with_boundaries(boundaries());
    let selection = Selection::select(name(27));

    group.bench_function("map_click", |b| {
        b.iter(|| black_box(bind_map_click(black_box(&selection), &ctx)));
    });
    group.bench_function("dropdown", |b| {
        b.iter(|| black_box(bind_dropdown(black_box(&selection), &ctx)));
    });

    group.finish();
}

criterion_group!(benches, bench_derive, bench_locate, bench_bind);
criterion_main!(benches);
