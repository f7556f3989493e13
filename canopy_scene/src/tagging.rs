// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Smart tags on scene nodes.

use canopy_tags::{Tag, TagMask, TagRegistry, Taggable};

use crate::scene::{Node, Scene};
use crate::types::NodeId;

impl Taggable for Node {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.data.attributes().and_then(|a| a.get(name))
    }

    fn texture(&self) -> Option<&str> {
        self.data.texture()
    }

    fn tag_mask(&self) -> TagMask {
        self.tags
    }

    fn set_tag_mask(&mut self, mask: TagMask) {
        self.tags = mask;
    }
}

impl Scene {
    /// Smart tags set on a node.
    pub fn tags(&self, id: NodeId) -> TagMask {
        self.node(id).tags
    }

    /// Whether `tag` is set on a node.
    pub fn has_tag(&self, id: NodeId, tag: &Tag) -> bool {
        self.node(id).has_tag(tag)
    }

    /// Re-evaluate the registered smart tags for a node.
    ///
    /// Call after editing the node's attributes or texture.
    pub fn update_tags(&mut self, id: NodeId, registry: &TagRegistry) {
        registry.update_tags(self.node_mut(id));
    }
}
