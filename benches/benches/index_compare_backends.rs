// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_index::{Aabb, Aabb3, AabbTree, FlatVec, Ray, Ray3, SpatialIndex};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Axis-aligned cells of an `n`³ lattice, like brushes of a blocky level.
fn gen_lattice_boxes(n: usize, cell: f64) -> Vec<Aabb3<f64>> {
    let mut out = Vec::with_capacity(n * n * n);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let min = [x as f64 * cell, y as f64 * cell, z as f64 * cell];
                out.push(Aabb::new(min, min.map(|v| v + cell * 0.9)));
            }
        }
    }
    out
}

fn gen_random_boxes(count: usize, extent: f64, max_size: f64, seed: u64) -> Vec<Aabb3<f64>> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| {
            let min: [f64; 3] = core::array::from_fn(|_| rng.next_f64() * extent);
            let max = min.map(|v| v + 1.0 + rng.next_f64() * max_size);
            Aabb::new(min, max)
        })
        .collect()
}

fn gen_clustered_boxes(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Aabb3<f64>> {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let centers: Vec<[f64; 3]> = (0..n_clusters)
        .map(|_| core::array::from_fn(|_| rng.next_f64() * 4096.0))
        .collect();
    for c in centers {
        for _ in 0..per_cluster {
            let min: [f64; 3] = core::array::from_fn(|i| c[i] + (rng.next_f64() - 0.5) * spread);
            out.push(Aabb::new(min, min.map(|v| v + 16.0)));
        }
    }
    out
}

fn gen_rays(count: usize, extent: f64, seed: u64) -> Vec<Ray3<f64>> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| {
            let origin: [f64; 3] = core::array::from_fn(|_| rng.next_f64() * extent);
            let direction: [f64; 3] = core::array::from_fn(|_| rng.next_f64() - 0.5);
            Ray::new(origin, direction)
        })
        .collect()
}

fn build<I: SpatialIndex<f64, 3, u32>>(mut idx: I, boxes: &[Aabb3<f64>]) -> I {
    idx.clear_and_build(boxes.iter().copied().zip(0_u32..));
    idx
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[8usize, 16, 24] {
        let boxes = gen_lattice_boxes(n, 32.0);
        group.throughput(Throughput::Elements(boxes.len() as u64));
        group.bench_function(format!("aabb_tree_lattice_n{}", n), |b| {
            b.iter_batched(
                AabbTree::<f64, 3, u32>::new,
                |idx| black_box(build(idx, &boxes).height()),
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("flatvec_lattice_n{}", n), |b| {
            b.iter_batched(
                FlatVec::<f64, 3, u32>::default,
                |idx| black_box(build(idx, &boxes).len()),
                BatchSize::SmallInput,
            )
        });
    }
    let clustered = gen_clustered_boxes(32, 128, 400.0);
    group.bench_function("aabb_tree_clustered", |b| {
        b.iter_batched(
            AabbTree::<f64, 3, u32>::new,
            |idx| black_box(build(idx, &clustered).height()),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_ray_picking(c: &mut Criterion) {
    let mut group = c.benchmark_group("ray_picking");
    let rays = gen_rays(64, 4096.0, 0xFACE_FEED_CAFE_BABE);
    for &count in &[1_000usize, 10_000] {
        let boxes = gen_random_boxes(count, 4096.0, 48.0, 0xCAFE_F00D_DEAD_BEEF);
        let tree = build(AabbTree::<f64, 3, u32>::new(), &boxes);
        let flat = build(FlatVec::<f64, 3, u32>::default(), &boxes);
        group.throughput(Throughput::Elements(rays.len() as u64));
        group.bench_function(format!("aabb_tree_n{}", count), |b| {
            b.iter(|| {
                let hits: usize = rays.iter().map(|r| tree.find_intersectors(r).len()).sum();
                black_box(hits)
            })
        });
        group.bench_function(format!("flatvec_n{}", count), |b| {
            b.iter(|| {
                let hits: usize = rays.iter().map(|r| flat.find_intersectors(r).len()).sum();
                black_box(hits)
            })
        });
    }
    group.finish();
}

fn bench_point_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_queries");
    let boxes = gen_lattice_boxes(20, 32.0);
    let tree = build(AabbTree::<f64, 3, u32>::new(), &boxes);
    let flat = build(FlatVec::<f64, 3, u32>::default(), &boxes);
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    let points: Vec<[f64; 3]> = (0..256)
        .map(|_| core::array::from_fn(|_| rng.next_f64() * 640.0))
        .collect();
    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("aabb_tree", |b| {
        b.iter(|| {
            let hits: usize = points.iter().map(|p| tree.find_containers(p).len()).sum();
            black_box(hits)
        })
    });
    group.bench_function("flatvec", |b| {
        b.iter(|| {
            let hits: usize = points.iter().map(|p| flat.find_containers(p).len()).sum();
            black_box(hits)
        })
    });
    group.finish();
}

fn bench_update_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_churn");
    let boxes = gen_random_boxes(4096, 4096.0, 48.0, 0x0123_4567_89AB_CDEF);
    let moves = gen_random_boxes(4096, 4096.0, 48.0, 0xFEDC_BA98_7654_3210);
    group.throughput(Throughput::Elements(boxes.len() as u64));
    group.bench_function("aabb_tree_move_all", |b| {
        b.iter_batched(
            || build(AabbTree::<f64, 3, u32>::new(), &boxes),
            |mut idx| {
                for (i, (old, new)) in boxes.iter().zip(&moves).enumerate() {
                    let _ = idx.update(old, *new, i as u32);
                }
                black_box(idx.height())
            },
            BatchSize::LargeInput,
        )
    });
    group.bench_function("aabb_tree_rebuild", |b| {
        b.iter_batched(
            || build(AabbTree::<f64, 3, u32>::new(), &boxes),
            |idx| black_box(build(idx, &moves).height()),
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_ray_picking,
    bench_point_queries,
    bench_update_churn,
);
criterion_main!(benches);
