// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visitor traversal over the node hierarchy.

use canopy_tags::TagMask;

use crate::scene::Scene;
use crate::types::{Bounds, NodeData, NodeFlags, NodeId, NodeKind};

/// Read-only view of one node, handed to a [`Visitor`].
#[derive(Copy, Clone, Debug)]
pub struct NodeRef<'a> {
    scene: &'a Scene,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(scene: &'a Scene, id: NodeId) -> Self {
        Self { scene, id }
    }

    /// Id of the visited node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The scene the node lives in.
    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// Kind of the node.
    pub fn kind(&self) -> NodeKind {
        self.data().kind()
    }

    /// Kind data; match on it to dispatch per kind.
    pub fn data(&self) -> &'a NodeData {
        self.scene.data(self.id)
    }

    /// Parent of the node.
    pub fn parent(&self) -> Option<NodeId> {
        self.scene.parent(self.id)
    }

    /// Children of the node, in order.
    pub fn children(&self) -> &'a [NodeId] {
        self.scene.children(self.id)
    }

    /// Bounds of the node, if it has any.
    pub fn bounds(&self) -> Option<Bounds> {
        self.data().bounds()
    }

    /// Value of the named attribute.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.data().attributes().and_then(|a| a.get(name))
    }

    /// Whether the node is selected.
    pub fn is_selected(&self) -> bool {
        self.scene.is_selected(self.id)
    }

    /// Editing flags.
    pub fn flags(&self) -> NodeFlags {
        self.scene.flags(self.id)
    }

    /// Smart tags set on the node.
    pub fn tags(&self) -> TagMask {
        self.scene.tags(self.id)
    }
}

/// Operation applied to nodes during a traversal.
///
/// Implementors match on [`NodeRef::data`] for per-kind behavior.
pub trait Visitor {
    /// Visit one node.
    fn visit(&mut self, node: NodeRef<'_>);

    /// Stop the traversal before the next sibling subtree or ancestor.
    fn cancelled(&self) -> bool {
        false
    }
}

impl Scene {
    /// Visit `id` itself.
    pub fn accept<V: Visitor + ?Sized>(&self, id: NodeId, visitor: &mut V) {
        visitor.visit(NodeRef::new(self, id));
    }

    /// Visit `id`, then its descendants in pre-order.
    pub fn accept_and_recurse<V: Visitor + ?Sized>(&self, id: NodeId, visitor: &mut V) {
        self.accept(id, visitor);
        self.recurse(id, visitor);
    }

    /// Visit the descendants of `id` in pre-order.
    ///
    /// Cancellation is checked before descending into each next child.
    pub fn recurse<V: Visitor + ?Sized>(&self, id: NodeId, visitor: &mut V) {
        for &child in self.children(id) {
            if visitor.cancelled() {
                break;
            }
            self.accept_and_recurse(child, visitor);
        }
    }

    /// Visit the immediate children of `id`.
    pub fn iterate<V: Visitor + ?Sized>(&self, id: NodeId, visitor: &mut V) {
        for &child in self.children(id) {
            if visitor.cancelled() {
                break;
            }
            self.accept(child, visitor);
        }
    }

    /// Visit the ancestors of `id`, nearest first.
    pub fn escalate<V: Visitor + ?Sized>(&self, id: NodeId, visitor: &mut V) {
        if let Some(parent) = self.parent(id)
            && !visitor.cancelled()
        {
            self.accept_and_escalate(parent, visitor);
        }
    }

    /// Visit `id`, then its ancestors.
    pub fn accept_and_escalate<V: Visitor + ?Sized>(&self, id: NodeId, visitor: &mut V) {
        self.accept(id, visitor);
        self.escalate(id, visitor);
    }
}

/// Collects the ids of visited nodes.
#[derive(Clone, Debug, Default)]
pub(crate) struct CollectIds(pub(crate) alloc::vec::Vec<NodeId>);

impl Visitor for CollectIds {
    fn visit(&mut self, node: NodeRef<'_>) {
        self.0.push(node.id());
    }
}
