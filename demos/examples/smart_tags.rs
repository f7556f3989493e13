// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Smart tags.
//!
//! Register a few smart tags and evaluate them against scene nodes as their
//! attributes change.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p canopy_demos --example smart_tags`

use canopy_scene::{Bounds, Brush, Entity, NodeData, Scene};
use canopy_tags::{SmartTag, TagError, TagMatcher, TagRegistry};

fn main() -> Result<(), TagError> {
    env_logger::init();

    let mut registry = TagRegistry::new();
    let trigger = registry.register_smart_tag(SmartTag::new(
        "trigger",
        TagMatcher::attribute_value("classname", "trigger_*"),
    ))?;
    let liquid = registry.register_smart_tag(SmartTag::new(
        "liquid",
        TagMatcher::Any(vec![
            TagMatcher::TextureName("*water*".into()),
            TagMatcher::TextureName("*lava*".into()),
            TagMatcher::TextureName("*slime*".into()),
        ]),
    ))?;

    // Registering a name twice is rejected.
    let duplicate = registry.register_smart_tag(SmartTag::new(
        "trigger",
        TagMatcher::HasAttribute("spawnflags".into()),
    ));
    println!("duplicate registration: {duplicate:?}");

    let mut scene = Scene::new();
    let entity = scene.create(NodeData::Entity(Entity::new(
        [("classname", "trigger_multiple")].into_iter().collect(),
    )));
    let pool = scene.create(NodeData::Brush(Brush::new(
        Bounds::new([0.0; 3], [128.0, 128.0, 32.0]),
        "*water1",
    )));

    for id in [entity, pool] {
        scene.update_tags(id, &registry);
    }
    println!(
        "entity: trigger={} | pool: liquid={}",
        scene.has_tag(entity, &trigger),
        scene.has_tag(pool, &liquid)
    );

    scene.set_attribute(entity, "classname", "func_wall");
    scene.update_tags(entity, &registry);
    println!("after edit: trigger={}", scene.has_tag(entity, &trigger));
    Ok(())
}
