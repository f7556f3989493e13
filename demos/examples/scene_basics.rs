// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene basics.
//!
//! Build a world, select a brush, watch the family counters and the
//! notifications, then pick through the world's spatial index.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p canopy_demos --example scene_basics`

use canopy_index::{Ray3, SpatialIndex as _};
use canopy_scene::{Bounds, Brush, Entity, Group, Layer, NodeData, Scene, World};

fn main() {
    env_logger::init();

    let mut scene = Scene::new();
    let world = scene.create(NodeData::World(World::new(
        [("classname", "worldspawn")].into_iter().collect(),
    )));
    let layer = scene.create(NodeData::Layer(Layer::new("default")));
    scene.add_child(world, layer);

    let house = scene.create(NodeData::Group(Group::new("house")));
    let floor = scene.create(NodeData::Brush(Brush::new(
        Bounds::new([0.0, 0.0, -16.0], [256.0, 256.0, 0.0]),
        "floor01",
    )));
    let wall = scene.create(NodeData::Brush(Brush::new(
        Bounds::new([0.0, 0.0, 0.0], [16.0, 256.0, 128.0]),
        "brick",
    )));
    scene.add_children(house, &[floor, wall]);

    scene.record_notifications(true);
    scene.add_child(layer, house);
    for n in scene.take_notifications() {
        println!("  {n:?}");
    }

    let torch = scene.create(NodeData::Entity(Entity::point(
        [("classname", "light_torch"), ("targetname", "t1")]
            .into_iter()
            .collect(),
        Bounds::new([64.0, 64.0, 16.0], [72.0, 72.0, 40.0]),
    )));
    scene.add_child(layer, torch);

    scene.select(wall);
    println!(
        "world: family_size={} selected={}",
        scene.family_size(world),
        scene.family_member_selection_count(world)
    );

    // Look down onto the floor from above the torch.
    let ray = Ray3::new([68.0, 68.0, 500.0], [0.0, 0.0, -1.0]);
    let picked = scene.pick(world, &ray);
    println!("picked (nearest first): {picked:?}");
    assert_eq!(picked, vec![torch, floor]);

    // Detaching the group removes its brushes from the index.
    scene.remove_child(layer, house);
    println!(
        "after detaching the house: family_size={} selected={} indexed={}",
        scene.family_size(world),
        scene.family_member_selection_count(world),
        scene
            .spatial_index(world)
            .map_or(0, |i| i.len())
    );

    let targets = scene.find_attributables_with_attribute(world, "targetname", "t1");
    println!("targetname=t1: {targets:?}");

    // Clone the detached group, clipped to a smaller region.
    let copy = scene.clone_subtree(house, &Bounds::new([-64.0; 3], [64.0; 3]));
    for &child in scene.children(copy) {
        println!("clone child {child:?} bounds={:?}", scene.bounds(child));
    }
}
