// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identifiers, flags, and per-kind node data.

use alloc::string::String;

use bitflags::bitflags;
use canopy_index::{Aabb3, AabbTree};

use crate::attributes::{AttributeIndex, Attributes};

/// World-space bounds of a node.
pub type Bounds = Aabb3<f64>;

/// Spatial index kept by every [`World`].
pub type SpatialTree = AabbTree<f64, 3, NodeId>;

/// Identifier for a node in a [`Scene`](crate::Scene) (generational).
///
/// Ids of destroyed nodes are never confused with ids of nodes that later reuse
/// the same slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(u32, u32);

impl NodeId {
    pub(crate) fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.1
    }
}

bitflags! {
    /// Editing state that affects whether a node can be selected.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is locked against editing.
        const LOCKED = 0b0000_0001;
        /// Node is hidden from the views.
        const HIDDEN = 0b0000_0010;
    }
}

/// The closed set of node kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// Document root.
    World,
    /// Top-level partition of a world.
    Layer,
    /// Named collection of objects.
    Group,
    /// Attributed object, optionally made of brushes.
    Entity,
    /// Convex solid.
    Brush,
}

impl NodeKind {
    /// Whether a node of this kind accepts children of kind `child`.
    pub fn can_contain(self, child: Self) -> bool {
        match self {
            Self::World => child == Self::Layer,
            Self::Layer | Self::Group => {
                matches!(child, Self::Group | Self::Entity | Self::Brush)
            }
            Self::Entity => child == Self::Brush,
            Self::Brush => false,
        }
    }

    /// Whether nodes of this kind carry attributes.
    pub fn is_attributable(self) -> bool {
        matches!(self, Self::World | Self::Entity)
    }
}

/// Kind-specific payload of a node.
#[derive(Clone, Debug)]
pub enum NodeData {
    /// See [`World`].
    World(World),
    /// See [`Layer`].
    Layer(Layer),
    /// See [`Group`].
    Group(Group),
    /// See [`Entity`].
    Entity(Entity),
    /// See [`Brush`].
    Brush(Brush),
}

impl NodeData {
    /// The kind tag of this payload.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::World(_) => NodeKind::World,
            Self::Layer(_) => NodeKind::Layer,
            Self::Group(_) => NodeKind::Group,
            Self::Entity(_) => NodeKind::Entity,
            Self::Brush(_) => NodeKind::Brush,
        }
    }

    /// Bounds of the node itself, if it has any.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Self::Entity(e) => e.bounds,
            Self::Brush(b) => Some(b.bounds),
            Self::World(_) | Self::Layer(_) | Self::Group(_) => None,
        }
    }

    /// Attributes of attributable kinds.
    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Self::World(w) => Some(&w.attributes),
            Self::Entity(e) => Some(&e.attributes),
            Self::Layer(_) | Self::Group(_) | Self::Brush(_) => None,
        }
    }

    pub(crate) fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        match self {
            Self::World(w) => Some(&mut w.attributes),
            Self::Entity(e) => Some(&mut e.attributes),
            Self::Layer(_) | Self::Group(_) | Self::Brush(_) => None,
        }
    }

    /// Texture of a brush.
    pub fn texture(&self) -> Option<&str> {
        match self {
            Self::Brush(b) => Some(&b.texture),
            _ => None,
        }
    }

    /// Copy of this payload for a cloned node, with bounds clipped to `world_bounds`.
    ///
    /// Bounds with no overlap are kept as they are. World caches are not
    /// copied; they are rebuilt as the clone is assembled.
    pub(crate) fn clone_within(&self, world_bounds: &Bounds) -> Self {
        match self {
            Self::World(w) => Self::World(World::new(w.attributes.clone())),
            Self::Layer(l) => Self::Layer(l.clone()),
            Self::Group(g) => Self::Group(g.clone()),
            Self::Entity(e) => Self::Entity(Entity {
                attributes: e.attributes.clone(),
                bounds: e.bounds.map(|b| clip(&b, world_bounds)),
            }),
            Self::Brush(b) => Self::Brush(Brush {
                bounds: clip(&b.bounds, world_bounds),
                texture: b.texture.clone(),
            }),
        }
    }
}

fn clip(bounds: &Bounds, world_bounds: &Bounds) -> Bounds {
    let clipped = bounds.intersect(world_bounds);
    if clipped.is_empty() {
        *bounds
    } else {
        clipped
    }
}

/// Document root.
///
/// A world owns the document-wide caches: an index from attribute name and
/// value to the attributable nodes below it, and a spatial index over the
/// bounds of its descendants. Both are maintained by the scene as nodes are
/// attached, detached, and edited.
#[derive(Clone, Debug, Default)]
pub struct World {
    pub(crate) attributes: Attributes,
    pub(crate) default_layer: Option<NodeId>,
    pub(crate) attribute_index: AttributeIndex,
    pub(crate) spatial: SpatialTree,
}

impl World {
    /// Create a world with the given worldspawn attributes.
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            ..Default::default()
        }
    }

    /// Worldspawn attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The first layer added to this world, which cannot be removed.
    pub fn default_layer(&self) -> Option<NodeId> {
        self.default_layer
    }

    /// Attribute index over this world and its attributable descendants.
    pub fn attribute_index(&self) -> &AttributeIndex {
        &self.attribute_index
    }

    /// Spatial index over the bounds of this world's descendants.
    pub fn spatial_index(&self) -> &SpatialTree {
        &self.spatial
    }
}

/// Top-level partition of a world.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layer {
    /// Display name.
    pub name: String,
}

impl Layer {
    /// Create a layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Named collection of objects.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    /// Display name.
    pub name: String,
}

impl Group {
    /// Create a group.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Attributed object.
///
/// Point entities have their own bounds; brush entities take their extent from
/// their brushes and usually have none.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entity {
    pub(crate) attributes: Attributes,
    pub(crate) bounds: Option<Bounds>,
}

impl Entity {
    /// A brush entity with the given attributes.
    pub fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            bounds: None,
        }
    }

    /// A point entity occupying `bounds`.
    pub fn point(attributes: Attributes, bounds: Bounds) -> Self {
        Self {
            attributes,
            bounds: Some(bounds),
        }
    }

    /// Entity attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Bounds of a point entity.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

/// Convex solid.
#[derive(Clone, Debug, PartialEq)]
pub struct Brush {
    pub(crate) bounds: Bounds,
    pub(crate) texture: String,
}

impl Brush {
    /// Create a brush.
    pub fn new(bounds: Bounds, texture: impl Into<String>) -> Self {
        Self {
            bounds,
            texture: texture.into(),
        }
    }

    /// Bounds of the brush.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Texture name.
    pub fn texture(&self) -> &str {
        &self.texture
    }
}
