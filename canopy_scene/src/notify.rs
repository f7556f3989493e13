// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notifications escalated through the hierarchy.

use crate::types::NodeId;

/// A notification delivered to a node while the hierarchy changes.
///
/// Attaching or detaching a node is bracketed:
///
/// 1. [`ParentWillChange`](Self::ParentWillChange) for the moved node, then
///    [`AncestorWillChange`](Self::AncestorWillChange) for each of its proper
///    descendants in pre-order.
/// 2. The link and the cached family counters change.
/// 3. [`ParentDidChange`](Self::ParentDidChange) and
///    [`AncestorDidChange`](Self::AncestorDidChange) in the same order.
/// 4. [`DescendantWasAdded`](Self::DescendantWasAdded) or
///    [`DescendantWasRemoved`](Self::DescendantWasRemoved) for the (old) parent
///    and each of its ancestors up to the root.
///
/// Property edits of a node are bracketed by
/// [`ChildWillChange`](Self::ChildWillChange)/[`ChildDidChange`](Self::ChildDidChange)
/// for its parent and
/// [`DescendantWillChange`](Self::DescendantWillChange)/[`DescendantDidChange`](Self::DescendantDidChange)
/// for each of its ancestors.
///
/// See [`Scene::record_notifications`](crate::Scene::record_notifications).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Notification {
    /// The node is about to be attached to or detached from a parent.
    ParentWillChange(NodeId),
    /// The node was attached to or detached from a parent.
    ParentDidChange(NodeId),
    /// An ancestor of the node is about to be attached or detached.
    AncestorWillChange(NodeId),
    /// An ancestor of the node was attached or detached.
    AncestorDidChange(NodeId),
    /// `node` was attached somewhere below `ancestor`.
    DescendantWasAdded {
        /// Receiver of the notification.
        ancestor: NodeId,
        /// Root of the attached subtree.
        node: NodeId,
    },
    /// `node` was detached from somewhere below `ancestor`.
    DescendantWasRemoved {
        /// Receiver of the notification.
        ancestor: NodeId,
        /// Root of the detached subtree.
        node: NodeId,
    },
    /// The child `child` of `parent` is about to change.
    ChildWillChange {
        /// Receiver of the notification.
        parent: NodeId,
        /// The node being edited.
        child: NodeId,
    },
    /// The child `child` of `parent` changed.
    ChildDidChange {
        /// Receiver of the notification.
        parent: NodeId,
        /// The edited node.
        child: NodeId,
    },
    /// `node`, somewhere below `ancestor`, is about to change.
    DescendantWillChange {
        /// Receiver of the notification.
        ancestor: NodeId,
        /// The node being edited.
        node: NodeId,
    },
    /// `node`, somewhere below `ancestor`, changed.
    DescendantDidChange {
        /// Receiver of the notification.
        ancestor: NodeId,
        /// The edited node.
        node: NodeId,
    },
}

impl Notification {
    /// The node receiving this notification.
    pub fn receiver(&self) -> NodeId {
        match *self {
            Self::ParentWillChange(id)
            | Self::ParentDidChange(id)
            | Self::AncestorWillChange(id)
            | Self::AncestorDidChange(id) => id,
            Self::DescendantWasAdded { ancestor, .. }
            | Self::DescendantWasRemoved { ancestor, .. }
            | Self::DescendantWillChange { ancestor, .. }
            | Self::DescendantDidChange { ancestor, .. } => ancestor,
            Self::ChildWillChange { parent, .. } | Self::ChildDidChange { parent, .. } => parent,
        }
    }
}
