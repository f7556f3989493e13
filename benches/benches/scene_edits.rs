// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_index::Ray3;
use canopy_scene::{Bounds, Brush, Group, Layer, NodeData, NodeId, Scene, World};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// A world with one layer holding `groups` groups of `per_group` brushes each.
fn populated(groups: usize, per_group: usize) -> (Scene, NodeId, NodeId, Vec<NodeId>) {
    let mut scene = Scene::new();
    let world = scene.create(NodeData::World(World::default()));
    let layer = scene.create(NodeData::Layer(Layer::new("default")));
    scene.add_child(world, layer);
    let mut group_ids = Vec::with_capacity(groups);
    for g in 0..groups {
        let group = scene.create(NodeData::Group(Group::new(format!("g{g}"))));
        for i in 0..per_group {
            let min = [i as f64 * 64.0, g as f64 * 64.0, 0.0];
            let brush = scene.create(NodeData::Brush(Brush::new(
                Bounds::new(min, min.map(|v| v + 48.0)),
                "base",
            )));
            scene.add_child(group, brush);
        }
        scene.add_child(layer, group);
        group_ids.push(group);
    }
    (scene, world, layer, group_ids)
}

fn bench_attach(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_attach");
    for &groups in &[16usize, 64] {
        group.throughput(Throughput::Elements((groups * 32) as u64));
        group.bench_function(format!("populate_g{}", groups), |b| {
            b.iter(|| {
                let (scene, world, _, _) = populated(groups, 32);
                black_box(scene.family_size(world))
            })
        });
        group.bench_function(format!("detach_reattach_g{}", groups), |b| {
            b.iter_batched(
                || populated(groups, 32),
                |(mut scene, world, layer, ids)| {
                    for &g in &ids {
                        scene.remove_child(layer, g);
                    }
                    scene.add_children(layer, &ids);
                    black_box(scene.family_size(world))
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_pick(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_pick");
    let (scene, world, _, _) = populated(64, 64);
    let rays: Vec<Ray3<f64>> = (0..64)
        .map(|i| Ray3::new([i as f64 * 64.0 + 24.0, -100.0, 24.0], [0.0, 1.0, 0.0]))
        .collect();
    group.throughput(Throughput::Elements(rays.len() as u64));
    group.bench_function("pick_columns", |b| {
        b.iter(|| {
            let hits: usize = rays.iter().map(|r| scene.pick(world, r).len()).sum();
            black_box(hits)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_attach, bench_pick);
criterion_main!(benches);
