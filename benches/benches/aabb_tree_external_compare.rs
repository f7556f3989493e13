// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use canopy_index::{Aabb, Aabb3, AabbTree, SpatialIndex};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

use rstar::primitives::Rectangle;
use rstar::{AABB, RTree};

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

fn to_rstar_boxes(v: &[Aabb3<f64>]) -> Vec<Rectangle<[f64; 3]>> {
    v.iter()
        .map(|b| Rectangle::from_corners(b.min, b.max))
        .collect()
}

fn bench_aabb_tree_external_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("aabb_tree_external_compare");
    for &n in &[16usize, 24] {
        let boxes = gen_lattice_boxes(n, 10.0);
        let query = Aabb::new([20.0; 3], [80.0; 3]);
        group.throughput(Throughput::Elements(boxes.len() as u64));

        group.bench_function(format!("canopy_build_query_n{}", n), |b| {
            b.iter_batched(
                AabbTree::<f64, 3, u32>::new,
                |mut idx| {
                    idx.clear_and_build(boxes.iter().copied().zip(0_u32..));
                    black_box(idx.find_intersecting(&query).len())
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || to_rstar_boxes(&boxes),
                |rectangles| {
                    let tree = RTree::bulk_load(rectangles);
                    let aabb = AABB::from_corners(query.min, query.max);
                    let hits: usize = tree.locate_in_envelope_intersecting(&aabb).count();
                    black_box(hits)
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_aabb_tree_external_compare);
criterion_main!(benches);
