// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node arena and structural editing.

use alloc::vec::Vec;

use canopy_tags::TagMask;

use crate::notify::Notification;
use crate::types::{Bounds, NodeData, NodeFlags, NodeId, NodeKind};
use crate::visit::CollectIds;

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) family_size: usize,
    pub(crate) selected: bool,
    pub(crate) family_member_selection_count: usize,
    pub(crate) line_number: usize,
    pub(crate) line_count: usize,
    pub(crate) flags: NodeFlags,
    pub(crate) tags: TagMask,
    pub(crate) data: NodeData,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            family_size: 1,
            selected: false,
            family_member_selection_count: 0,
            line_number: 0,
            line_count: 0,
            flags: NodeFlags::empty(),
            tags: TagMask::EMPTY,
            data,
        }
    }
}

/// Arena owning every node of one or more hierarchies.
///
/// Nodes are created detached and linked with [`Scene::add_child`]. Each node
/// caches the size of its subtree and the number of selected nodes in it; both
/// are kept up to date by every structural edit and selection change.
///
/// Operations taking a [`NodeId`] panic if the id is stale.
pub struct Scene {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    journal: Option<Vec<Notification>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("recording", &self.journal.is_some())
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            journal: None,
        }
    }

    /// Create a detached node.
    pub fn create(&mut self, data: NodeData) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            self.generations[idx] += 1;
            self.nodes[idx] = Some(Node::new(data));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices."
            )]
            (idx as u32, self.generations[idx])
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(data)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        self.world_created(id);
        id
    }

    /// Destroy a detached root together with its whole subtree.
    pub fn destroy(&mut self, id: NodeId) {
        assert!(
            self.node(id).parent.is_none(),
            "cannot destroy {id:?}: node is attached"
        );
        let mut doomed = CollectIds::default();
        self.accept_and_recurse(id, &mut doomed);
        log::debug!("destroying {id:?} ({} nodes)", doomed.0.len());
        for dead in doomed.0 {
            self.nodes[dead.idx()] = None;
            self.free_list.push(dead.idx());
        }
    }

    /// Whether `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.generations.get(id.idx()) == Some(&id.generation())
            && self.nodes[id.idx()].is_some()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Whether the scene holds no live node.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- accessors ---

    /// Kind of a node.
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).data.kind()
    }

    /// Kind data of a node.
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.node(id).data
    }

    /// Parent of a node; `None` for roots.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of a node, in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Whether a node has children.
    pub fn has_children(&self, id: NodeId) -> bool {
        !self.node(id).children.is_empty()
    }

    /// Root of the hierarchy containing `id`.
    pub fn root(&self, mut id: NodeId) -> NodeId {
        while let Some(parent) = self.node(id).parent {
            id = parent;
        }
        id
    }

    /// Whether `ancestor` is a proper ancestor of `id`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = self.node(id).parent;
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.node(p).parent;
        }
        false
    }

    /// Number of nodes in the subtree rooted at `id`, including `id`.
    pub fn family_size(&self, id: NodeId) -> usize {
        self.node(id).family_size
    }

    /// Number of selected nodes in the subtree rooted at `id`, including `id`.
    pub fn family_member_selection_count(&self, id: NodeId) -> usize {
        self.node(id).family_member_selection_count
    }

    /// Whether any node in the subtree rooted at `id` is selected.
    pub fn family_member_selected(&self, id: NodeId) -> bool {
        self.family_member_selection_count(id) > 0
    }

    /// Editing flags of a node.
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.node(id).flags
    }

    /// Replace the editing flags of a node.
    ///
    /// Selection is left as is; callers deselect before locking or hiding.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        self.node_mut(id).flags = flags;
    }

    /// Bounds of a node, if its kind has any.
    pub fn bounds(&self, id: NodeId) -> Option<Bounds> {
        self.node(id).data.bounds()
    }

    // --- structure ---

    /// Whether `child` may be attached to `parent`.
    ///
    /// Requires both ids to be live, `child` to be a detached root that is not
    /// an ancestor of `parent`, and `parent`'s kind to accept `child`'s kind.
    pub fn can_add_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.is_alive(parent)
            && self.is_alive(child)
            && parent != child
            && self.node(child).parent.is_none()
            && self.kind(parent).can_contain(self.kind(child))
            && !self.is_ancestor_of(child, parent)
    }

    /// Whether `child` may be detached from `parent`.
    ///
    /// A world's default layer cannot be removed.
    pub fn can_remove_child(&self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return false;
        }
        if self.node(child).parent != Some(parent) {
            return false;
        }
        match &self.node(parent).data {
            NodeData::World(world) => world.default_layer != Some(child),
            NodeData::Layer(_) | NodeData::Group(_) | NodeData::Entity(_) | NodeData::Brush(_) => {
                true
            }
        }
    }

    /// Attach the detached root `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// If [`Scene::can_add_child`] is false.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            self.can_add_child(parent, child),
            "cannot add {child:?} to {parent:?}"
        );
        log::debug!("attaching {child:?} to {parent:?}");
        let subtree = self.parent_will_change(child);
        self.link(parent, child);
        self.parent_did_change(child, &subtree);
        self.descendant_was_added(parent, child);
    }

    /// Attach each of `children` to `parent`, in order.
    pub fn add_children(&mut self, parent: NodeId, children: &[NodeId]) {
        for &child in children {
            self.add_child(parent, child);
        }
    }

    /// Detach `child` from `parent`; it becomes a detached root.
    ///
    /// # Panics
    ///
    /// If [`Scene::can_remove_child`] is false.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            self.can_remove_child(parent, child),
            "cannot remove {child:?} from {parent:?}"
        );
        log::debug!("detaching {child:?} from {parent:?}");
        let subtree = self.parent_will_change(child);
        self.unlink(parent, child);
        self.parent_did_change(child, &subtree);
        self.descendant_was_removed(parent, child);
    }

    /// Detach each of `children` from `parent`.
    pub fn remove_children(&mut self, parent: NodeId, children: &[NodeId]) {
        for &child in children {
            self.remove_child(parent, child);
        }
    }

    /// Deep copy of the subtree rooted at `id`, as a new detached root.
    ///
    /// Structure, kind data, flags, tags and file position are copied; the copy
    /// starts unselected. Bounds are clipped to `world_bounds`; a brush or point
    /// entity lying entirely outside it keeps its own bounds, so a copy never
    /// holds an inverted box.
    pub fn clone_subtree(&mut self, id: NodeId, world_bounds: &Bounds) -> NodeId {
        let (data, flags, tags, line_number, line_count, children) = {
            let n = self.node(id);
            (
                n.data.clone_within(world_bounds),
                n.flags,
                n.tags,
                n.line_number,
                n.line_count,
                n.children.clone(),
            )
        };
        let copy = self.create(data);
        {
            let n = self.node_mut(copy);
            n.flags = flags;
            n.tags = tags;
            n.line_number = line_number;
            n.line_count = line_count;
        }
        for child in children {
            let child_copy = self.clone_subtree(child, world_bounds);
            self.add_child(copy, child_copy);
        }
        copy
    }

    // --- selection ---

    /// Whether a node can currently be selected.
    pub fn is_selectable(&self, id: NodeId) -> bool {
        let n = self.node(id);
        if n.flags.intersects(NodeFlags::LOCKED | NodeFlags::HIDDEN) {
            return false;
        }
        match n.data.kind() {
            NodeKind::World | NodeKind::Layer => false,
            NodeKind::Group | NodeKind::Brush => true,
            NodeKind::Entity => n.children.is_empty(),
        }
    }

    /// Whether a node is selected.
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.node(id).selected
    }

    /// Select a node. Selecting a selected node does nothing.
    ///
    /// # Panics
    ///
    /// If the node is not selectable.
    pub fn select(&mut self, id: NodeId) {
        assert!(self.is_selectable(id), "{id:?} is not selectable");
        if self.node(id).selected {
            return;
        }
        self.node_mut(id).selected = true;
        self.for_self_and_ancestors(id, |n| n.family_member_selection_count += 1);
    }

    /// Deselect a node. Deselecting an unselected node does nothing.
    pub fn deselect(&mut self, id: NodeId) {
        if !self.node(id).selected {
            return;
        }
        self.node_mut(id).selected = false;
        self.for_self_and_ancestors(id, |n| n.family_member_selection_count -= 1);
    }

    // --- file position ---

    /// Record where the node was read from.
    pub fn set_file_position(&mut self, id: NodeId, line_number: usize, line_count: usize) {
        let n = self.node_mut(id);
        n.line_number = line_number;
        n.line_count = line_count;
    }

    /// First line of the node in its source file.
    pub fn line_number(&self, id: NodeId) -> usize {
        self.node(id).line_number
    }

    /// Number of source lines the node spans.
    pub fn line_count(&self, id: NodeId) -> usize {
        self.node(id).line_count
    }

    /// Whether `line` lies within the node's source lines.
    pub fn contains_line(&self, id: NodeId, line: usize) -> bool {
        let n = self.node(id);
        line >= n.line_number && line - n.line_number < n.line_count
    }

    // --- notifications ---

    /// Start or stop recording notifications.
    ///
    /// Stopping discards anything not yet taken.
    pub fn record_notifications(&mut self, enabled: bool) {
        match (enabled, self.journal.is_some()) {
            (true, false) => self.journal = Some(Vec::new()),
            (false, true) => self.journal = None,
            _ => {}
        }
    }

    /// Notifications recorded since the last call.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.journal.as_mut().map(core::mem::take).unwrap_or_default()
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        log::trace!("{notification:?}");
        if let Some(journal) = &mut self.journal {
            journal.push(notification);
        }
    }

    /// Sends the will-change notifications for attaching or detaching `child`
    /// and returns its proper descendants in pre-order.
    fn parent_will_change(&mut self, child: NodeId) -> Vec<NodeId> {
        let mut descendants = CollectIds::default();
        self.recurse(child, &mut descendants);
        self.notify(Notification::ParentWillChange(child));
        for &d in &descendants.0 {
            self.notify(Notification::AncestorWillChange(d));
        }
        descendants.0
    }

    fn parent_did_change(&mut self, child: NodeId, descendants: &[NodeId]) {
        self.notify(Notification::ParentDidChange(child));
        for &d in descendants {
            self.notify(Notification::AncestorDidChange(d));
        }
    }

    // --- internals ---

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.idx()) {
            Some(Some(n)) if self.generations[id.idx()] == id.generation() => n,
            _ => panic!("dangling NodeId {id:?}"),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.idx()) {
            Some(Some(n)) if self.generations[id.idx()] == id.generation() => n,
            _ => panic!("dangling NodeId {id:?}"),
        }
    }

    /// `id` followed by its ancestors up to the root.
    pub(crate) fn self_and_ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            out.push(n);
            cur = self.node(n).parent;
        }
        out
    }

    fn for_self_and_ancestors(&mut self, id: NodeId, f: impl Fn(&mut Node)) {
        let mut cur = Some(id);
        while let Some(n) = cur {
            let node = self.node_mut(n);
            f(node);
            cur = node.parent;
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        let (size, selected) = {
            let c = self.node(child);
            (c.family_size, c.family_member_selection_count)
        };
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        self.for_self_and_ancestors(parent, |n| {
            n.family_size += size;
            n.family_member_selection_count += selected;
        });
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        let (size, selected) = {
            let c = self.node(child);
            (c.family_size, c.family_member_selection_count)
        };
        self.node_mut(parent).children.retain(|c| *c != child);
        self.node_mut(child).parent = None;
        self.for_self_and_ancestors(parent, |n| {
            n.family_size -= size;
            n.family_member_selection_count -= selected;
        });
    }
}
