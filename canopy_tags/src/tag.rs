// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tags, tag masks, and the [`Taggable`] trait.

use alloc::string::String;

use crate::matcher::TagMatcher;

/// Set of tags carried by a taggable object, one bit per registered tag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TagMask(u64);

impl TagMask {
    /// The mask with no tags set.
    pub const EMPTY: Self = Self(0);

    /// Number of distinct tags a mask can hold.
    pub const CAPACITY: usize = u64::BITS as usize;

    /// Create a mask from raw bits.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bits of this mask.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Whether no tag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether `tag` is set.
    pub const fn contains(self, tag: &Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// Set `tag`.
    pub fn insert(&mut self, tag: &Tag) {
        self.0 |= tag.bit();
    }

    /// Clear `tag`.
    pub fn remove(&mut self, tag: &Tag) {
        self.0 &= !tag.bit();
    }
}

/// A tag that has been registered with a [`TagRegistry`](crate::TagRegistry).
///
/// Cheap to clone; compare tags by value or test them against a [`TagMask`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    name: String,
    index: u32,
}

impl Tag {
    pub(crate) fn new(name: String, index: u32) -> Self {
        debug_assert!(
            (index as usize) < TagMask::CAPACITY,
            "tag index out of range"
        );
        Self { name, index }
    }

    /// Unique name of the tag.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bit position assigned at registration.
    pub fn index(&self) -> u32 {
        self.index
    }

    const fn bit(&self) -> u64 {
        1_u64 << self.index
    }
}

/// Definition of a smart tag: a name and the predicate deciding membership.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmartTag {
    name: String,
    matcher: TagMatcher,
}

impl SmartTag {
    /// Create a smart tag definition.
    pub fn new(name: impl Into<String>, matcher: TagMatcher) -> Self {
        Self {
            name: name.into(),
            matcher,
        }
    }

    /// Name the tag will be registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Predicate deciding membership.
    pub fn matcher(&self) -> &TagMatcher {
        &self.matcher
    }
}

/// An object whose attributes can be evaluated by smart tags.
pub trait Taggable {
    /// Value of the named attribute, if present.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Texture name for surface-like objects.
    fn texture(&self) -> Option<&str> {
        None
    }

    /// Tags currently set on this object.
    fn tag_mask(&self) -> TagMask;

    /// Replace the tags set on this object.
    fn set_tag_mask(&mut self, mask: TagMask);

    /// Whether `tag` is set.
    fn has_tag(&self, tag: &Tag) -> bool {
        self.tag_mask().contains(tag)
    }

    /// Set `tag`. Returns `true` if it was not set before.
    fn add_tag(&mut self, tag: &Tag) -> bool {
        let mut mask = self.tag_mask();
        if mask.contains(tag) {
            return false;
        }
        mask.insert(tag);
        self.set_tag_mask(mask);
        true
    }

    /// Clear `tag`. Returns `true` if it was set before.
    fn remove_tag(&mut self, tag: &Tag) -> bool {
        let mut mask = self.tag_mask();
        if !mask.contains(tag) {
            return false;
        }
        mask.remove(tag);
        self.set_tag_mask(mask);
        true
    }
}
