// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! World caches and the hooks that keep them in sync with the hierarchy.
//!
//! A world indexes the attributes and bounds of every node below it. The scene
//! feeds it from the notification protocol:
//!
//! - a subtree is indexed when it is attached below the world and unindexed when
//!   it is detached;
//! - an edited node's old bounds leave the spatial index before the edit and its
//!   new bounds enter it afterwards;
//! - attribute edits update the attribute index of the nearest world.

use alloc::string::String;
use alloc::vec::Vec;

use canopy_index::{Ray3, SpatialIndex as _};

use crate::attributes::AttributeIndex;
use crate::notify::Notification;
use crate::scene::Scene;
use crate::types::{Bounds, NodeData, NodeId, NodeKind, SpatialTree, World};
use crate::visit::{NodeRef, Visitor};

/// What a subtree contributes to a world's caches.
#[derive(Debug, Default)]
struct IndexEntries {
    bounds: Vec<(Bounds, NodeId)>,
    attributes: Vec<(NodeId, String, String)>,
}

impl Visitor for IndexEntries {
    fn visit(&mut self, node: NodeRef<'_>) {
        let data = node.data();
        if let Some(bounds) = data.bounds() {
            self.bounds.push((bounds, node.id()));
        }
        if let Some(attributes) = data.attributes() {
            for a in attributes {
                self.attributes
                    .push((node.id(), a.name.clone(), a.value.clone()));
            }
        }
    }
}

/// Finds the nearest world while escalating.
#[derive(Debug, Default)]
struct NearestWorld(Option<NodeId>);

impl Visitor for NearestWorld {
    fn visit(&mut self, node: NodeRef<'_>) {
        if node.kind() == NodeKind::World {
            self.0.get_or_insert(node.id());
        }
    }

    fn cancelled(&self) -> bool {
        self.0.is_some()
    }
}

impl World {
    fn index_subtree(&mut self, entries: &IndexEntries) {
        for (bounds, id) in &entries.bounds {
            self.spatial.insert(*bounds, *id);
        }
        for (id, name, value) in &entries.attributes {
            self.attribute_index.insert(*id, name, value);
        }
    }

    fn unindex_subtree(&mut self, entries: &IndexEntries) {
        for (bounds, id) in &entries.bounds {
            self.unindex_bounds(*id, bounds);
        }
        for (id, name, value) in &entries.attributes {
            if !self.attribute_index.remove(*id, name, value) {
                log::warn!("attribute index out of sync: {name}={value:?} missing for {id:?}");
            }
        }
    }

    fn unindex_bounds(&mut self, id: NodeId, bounds: &Bounds) {
        // Empty boxes are never stored.
        if !bounds.is_empty() && !self.spatial.remove(bounds, &id) {
            log::warn!("spatial index out of sync: {id:?} missing at {bounds:?}");
        }
    }
}

impl Scene {
    // --- hooks ---

    pub(crate) fn world_created(&mut self, id: NodeId) {
        if let Some(world) = self.world_mut(id) {
            for a in &world.attributes {
                world.attribute_index.insert(id, &a.name, &a.value);
            }
        }
    }

    pub(crate) fn descendant_was_added(&mut self, parent: NodeId, node: NodeId) {
        let mut entries: Option<IndexEntries> = None;
        for ancestor in self.self_and_ancestors(parent) {
            self.notify(Notification::DescendantWasAdded { ancestor, node });
            if self.kind(ancestor) != NodeKind::World {
                continue;
            }
            let entries = entries.get_or_insert_with(|| self.index_entries(node));
            if let Some(world) = self.world_mut(ancestor) {
                if ancestor == parent {
                    world.default_layer.get_or_insert(node);
                }
                world.index_subtree(entries);
            }
        }
    }

    pub(crate) fn descendant_was_removed(&mut self, parent: NodeId, node: NodeId) {
        let mut entries: Option<IndexEntries> = None;
        for ancestor in self.self_and_ancestors(parent) {
            self.notify(Notification::DescendantWasRemoved { ancestor, node });
            if self.kind(ancestor) != NodeKind::World {
                continue;
            }
            let entries = entries.get_or_insert_with(|| self.index_entries(node));
            if let Some(world) = self.world_mut(ancestor) {
                world.unindex_subtree(entries);
            }
        }
    }

    /// Announce an upcoming edit of `id` to its parent and ancestors.
    pub(crate) fn node_will_change(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.notify(Notification::ChildWillChange { parent, child: id });
        let old = self.bounds(id);
        for ancestor in self.self_and_ancestors(parent) {
            self.notify(Notification::DescendantWillChange { ancestor, node: id });
            if let (Some(bounds), Some(world)) = (old, self.world_mut(ancestor)) {
                world.unindex_bounds(id, &bounds);
            }
        }
    }

    /// Announce a finished edit of `id` to its parent and ancestors.
    pub(crate) fn node_did_change(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.notify(Notification::ChildDidChange { parent, child: id });
        let new = self.bounds(id);
        for ancestor in self.self_and_ancestors(parent) {
            self.notify(Notification::DescendantDidChange { ancestor, node: id });
            if let (Some(bounds), Some(world)) = (new, self.world_mut(ancestor)) {
                world.spatial.insert(bounds, id);
            }
        }
    }

    fn index_entries(&self, root: NodeId) -> IndexEntries {
        let mut entries = IndexEntries::default();
        self.accept_and_recurse(root, &mut entries);
        entries
    }

    fn world_mut(&mut self, id: NodeId) -> Option<&mut World> {
        match &mut self.node_mut(id).data {
            NodeData::World(world) => Some(world),
            _ => None,
        }
    }

    /// The world `id` belongs to: `id` itself or its nearest world ancestor.
    pub fn world_of(&self, id: NodeId) -> Option<NodeId> {
        let mut nearest = NearestWorld::default();
        self.accept_and_escalate(id, &mut nearest);
        nearest.0
    }

    // --- attributes ---

    /// Value of an attribute of a world or entity.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.data(id).attributes().and_then(|a| a.get(name))
    }

    /// Set an attribute of a world or entity, keeping the attribute index current.
    ///
    /// # Panics
    ///
    /// If the node's kind has no attributes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        assert!(
            self.kind(id).is_attributable(),
            "{id:?} ({:?}) has no attributes",
            self.kind(id)
        );
        let old = self.attribute(id, name).map(String::from);
        if old.as_deref() == Some(value) {
            return;
        }
        self.node_will_change(id);
        if let Some(old) = &old {
            self.remove_from_index(id, name, old);
        }
        if let Some(attributes) = self.node_mut(id).data.attributes_mut() {
            attributes.set(name, value);
        }
        self.add_to_index(id, name, value);
        self.node_did_change(id);
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        let old = String::from(self.attribute(id, name)?);
        self.node_will_change(id);
        self.remove_from_index(id, name, &old);
        if let Some(attributes) = self.node_mut(id).data.attributes_mut() {
            attributes.remove(name);
        }
        self.node_did_change(id);
        Some(old)
    }

    /// Record `(name, value)` for `id` in the attribute index of its world.
    ///
    /// [`Scene::set_attribute`] calls this; use it directly only when restoring
    /// an index by hand.
    pub fn add_to_index(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(world) = self.world_of(id).and_then(|w| self.world_mut(w)) {
            world.attribute_index.insert(id, name, value);
        }
    }

    /// Drop `(name, value)` for `id` from the attribute index of its world.
    pub fn remove_from_index(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(world) = self.world_of(id).and_then(|w| self.world_mut(w))
            && !world.attribute_index.remove(id, name, value)
        {
            log::warn!("attribute index out of sync: {name}={value:?} missing for {id:?}");
        }
    }

    /// Attributable nodes in the world of `id` whose attribute `name` equals `value`.
    pub fn find_attributables_with_attribute(
        &self,
        id: NodeId,
        name: &str,
        value: &str,
    ) -> Vec<NodeId> {
        self.attribute_index_of(id)
            .map(|index| index.find(name, value))
            .unwrap_or_default()
    }

    /// Like [`Scene::find_attributables_with_attribute`], for every attribute
    /// named `prefix` followed by zero or more digits.
    pub fn find_attributables_with_numbered_attribute(
        &self,
        id: NodeId,
        prefix: &str,
        value: &str,
    ) -> Vec<NodeId> {
        self.attribute_index_of(id)
            .map(|index| index.find_numbered(prefix, value))
            .unwrap_or_default()
    }

    fn attribute_index_of(&self, id: NodeId) -> Option<&AttributeIndex> {
        match self.data(self.world_of(id)?) {
            NodeData::World(world) => Some(&world.attribute_index),
            _ => None,
        }
    }

    // --- bounds ---

    /// Move or resize a brush.
    ///
    /// # Panics
    ///
    /// If the node is not a brush.
    pub fn set_brush_bounds(&mut self, id: NodeId, bounds: Bounds) {
        assert_eq!(self.kind(id), NodeKind::Brush, "{id:?} is not a brush");
        if self.bounds(id) == Some(bounds) {
            return;
        }
        self.node_will_change(id);
        if let NodeData::Brush(brush) = &mut self.node_mut(id).data {
            brush.bounds = bounds;
        }
        self.node_did_change(id);
    }

    /// Change the texture of a brush.
    pub fn set_brush_texture(&mut self, id: NodeId, texture: &str) {
        assert_eq!(self.kind(id), NodeKind::Brush, "{id:?} is not a brush");
        self.node_will_change(id);
        if let NodeData::Brush(brush) = &mut self.node_mut(id).data {
            brush.texture = texture.into();
        }
        self.node_did_change(id);
    }

    /// Set or clear the bounds of a point entity.
    ///
    /// # Panics
    ///
    /// If the node is not an entity.
    pub fn set_entity_bounds(&mut self, id: NodeId, bounds: Option<Bounds>) {
        assert_eq!(self.kind(id), NodeKind::Entity, "{id:?} is not an entity");
        if self.bounds(id) == bounds {
            return;
        }
        self.node_will_change(id);
        if let NodeData::Entity(entity) = &mut self.node_mut(id).data {
            entity.bounds = bounds;
        }
        self.node_did_change(id);
    }

    // --- spatial queries ---

    /// Spatial index of a world; `None` if `world` is not a world.
    pub fn spatial_index(&self, world: NodeId) -> Option<&SpatialTree> {
        match self.data(world) {
            NodeData::World(w) => Some(&w.spatial),
            _ => None,
        }
    }

    /// Nodes of `world` hit by `ray`, nearest first.
    pub fn pick(&self, world: NodeId, ray: &Ray3<f64>) -> Vec<NodeId> {
        let Some(index) = self.spatial_index(world) else {
            return Vec::new();
        };
        let mut hits: Vec<(f64, NodeId)> = index
            .find_intersectors(ray)
            .into_iter()
            .filter_map(|id| Some((self.bounds(id)?.intersect_ray(ray)?, id)))
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    /// Nodes of `world` whose bounds contain `point`.
    pub fn find_containers(&self, world: NodeId, point: &[f64; 3]) -> Vec<NodeId> {
        self.spatial_index(world)
            .map(|index| index.find_containers(point))
            .unwrap_or_default()
    }

    /// Rebuild the spatial index of `world` from scratch.
    pub fn rebuild_spatial_index(&mut self, world: NodeId) {
        let mut entries = IndexEntries::default();
        self.recurse(world, &mut entries);
        if let Some(w) = self.world_mut(world) {
            w.spatial.clear_and_build(entries.bounds);
        }
    }
}
