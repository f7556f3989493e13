// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Scene: the node hierarchy of a level editor.
//!
//! A [`Scene`] is an arena of nodes addressed by generational [`NodeId`]s. Nodes
//! come in a closed set of kinds ([`NodeKind`]): worlds hold layers, layers and
//! groups hold groups, entities and brushes, entities hold brushes.
//!
//! - Every node caches the size of its subtree and how many nodes in it are
//!   selected; [`Scene::family_size`] and [`Scene::family_member_selection_count`]
//!   answer in constant time.
//! - Structural edits and property edits escalate [`Notification`]s up the
//!   ancestor chain. Worlds use them to keep an attribute index and a spatial
//!   index ([`canopy_index::AabbTree`]) of their descendants current.
//! - [`Visitor`]s traverse the hierarchy downwards ([`Scene::accept_and_recurse`])
//!   or upwards ([`Scene::accept_and_escalate`]) and may cancel early.
//! - Nodes are [`canopy_tags::Taggable`]; [`Scene::update_tags`] evaluates smart
//!   tags against them.
//!
//! Structural preconditions ([`Scene::can_add_child`], [`Scene::can_remove_child`],
//! [`Scene::is_selectable`]) are asserted: violating them is a logic error and
//! panics.
//!
//! # Example
//!
//! ```rust
//! use canopy_index::Ray3;
//! use canopy_scene::{Bounds, Brush, Entity, Layer, NodeData, Scene, World};
//!
//! let mut scene = Scene::new();
//! let world = scene.create(NodeData::World(World::default()));
//! let layer = scene.create(NodeData::Layer(Layer::new("default")));
//! scene.add_child(world, layer);
//!
//! let door = scene.create(NodeData::Entity(Entity::new(
//!     [("classname", "func_door"), ("targetname", "gate")].into_iter().collect(),
//! )));
//! let slab = scene.create(NodeData::Brush(Brush::new(
//!     Bounds::new([0.0, 0.0, 0.0], [64.0, 8.0, 128.0]),
//!     "door01",
//! )));
//! scene.add_child(door, slab);
//! scene.add_child(layer, door);
//!
//! assert_eq!(scene.family_size(world), 4);
//! scene.select(slab);
//! assert_eq!(scene.family_member_selection_count(world), 1);
//!
//! // The world indexed the door's attributes and the brush's bounds.
//! assert_eq!(
//!     scene.find_attributables_with_attribute(world, "targetname", "gate"),
//!     vec![door]
//! );
//! let ray = Ray3::new([32.0, -100.0, 64.0], [0.0, 1.0, 0.0]);
//! assert_eq!(scene.pick(world, &ray), vec![slab]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod attributes;
mod notify;
mod scene;
mod tagging;
mod types;
mod visit;
mod world;

pub use attributes::{Attribute, AttributeIndex, Attributes};
pub use notify::Notification;
pub use scene::Scene;
pub use types::{
    Bounds, Brush, Entity, Group, Layer, NodeData, NodeFlags, NodeId, NodeKind, SpatialTree, World,
};
pub use visit::{NodeRef, Visitor};
