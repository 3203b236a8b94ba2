use rand::prelude::*;

use periodic_neighbors::{Geometry, UnitCell, Vector3D};
use periodic_neighbors::{NeighborList, NeighborListCache, NeighborListOptions};

use criterion::{Criterion, BenchmarkId, black_box, criterion_group, criterion_main};

/// Random positions at the density of liquid water (~0.1 atom / A^3)
fn liquid(n_atoms: usize) -> Geometry {
    let length = f64::cbrt(n_atoms as f64 / 0.1);
    let cell = UnitCell::cubic(length);

    let mut rng = StdRng::seed_from_u64(n_atoms as u64);
    let positions = (0..n_atoms).map(|_| Vector3D::new(
        rng.gen_range(0.0..length),
        rng.gen_range(0.0..length),
        rng.gen_range(0.0..length),
    )).collect();

    Geometry::new(cell, positions, 3.5).expect("invalid geometry")
}

fn neighbor_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor list");
    group.noise_threshold(0.05);
    group.sample_size(20);

    for &n_atoms in black_box(&[300, 3_000, 30_000]) {
        let geometry = liquid(n_atoms);

        let options = NeighborListOptions::default();
        group.bench_with_input(BenchmarkId::new("half", n_atoms), &geometry, |b, geometry| b.iter(|| {
            NeighborList::new(geometry, &options).expect("failed to build neighbor list")
        }));

        let options = NeighborListOptions { full_list: true, ..Default::default() };
        group.bench_with_input(BenchmarkId::new("full", n_atoms), &geometry, |b, geometry| b.iter(|| {
            NeighborList::new(geometry, &options).expect("failed to build neighbor list")
        }));
    }
}

fn neighbor_list_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor list cache");
    group.noise_threshold(0.05);
    group.sample_size(20);

    for &n_atoms in black_box(&[300, 3_000, 30_000]) {
        let geometry = liquid(n_atoms);
        let options = NeighborListOptions { skin: 0.5, ..Default::default() };

        let mut cache = NeighborListCache::new(options).expect("invalid options");
        cache.update(&geometry).expect("failed to build neighbor list");

        group.bench_with_input(BenchmarkId::new("reuse", n_atoms), &geometry, |b, geometry| b.iter(|| {
            cache.update(geometry).expect("failed to update neighbor list")
        }));
    }
}

criterion_group!(benches, neighbor_list, neighbor_list_cache);
criterion_main!(benches);
