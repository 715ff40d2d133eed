use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use earthgrid::mesh::sphere::weld::weld;
use earthgrid::mesh::{SphereGrid, WeldStrategy};

fn shell(level: usize, strategy: WeldStrategy) -> usize {
    SphereGrid::new(0.5, 1., level, 1)
        .with_strategy(strategy)
        .shell()
        .unwrap()
        .num_points()
}

fn random_cloud(n: usize, strategy: WeldStrategy) -> usize {
    let points: Array2<f64> = Array2::random((n, 3), Uniform::new(-1., 1.));
    let boundary = vec![true; n];

    weld(points.view(), &boundary, 1e-3, strategy).num_unique()
}

fn sphere_weld_bench(c: &mut Criterion) {
    c.bench_function("shell exhaustive 16", |b| {
        b.iter(|| shell(black_box(16), WeldStrategy::Exhaustive))
    });

    c.bench_function("shell spatial hash 16", |b| {
        b.iter(|| shell(black_box(16), WeldStrategy::SpatialHash))
    });

    c.bench_function("shell spatial hash 64", |b| {
        b.iter(|| shell(black_box(64), WeldStrategy::SpatialHash))
    });

    c.bench_function("random cloud spatial hash 10000", |b| {
        b.iter(|| random_cloud(black_box(10_000), WeldStrategy::SpatialHash))
    });
}

criterion_group!(benches, sphere_weld_bench);
criterion_main!(benches);
