// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attributes of worlds and entities, and the per-world attribute index.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Bound;

use crate::types::NodeId;

/// A single `name = value` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, e.g. `classname`.
    pub name: String,
    /// Attribute value.
    pub value: String,
}

/// Ordered list of attributes with unique names.
///
/// Insertion order is kept because it is the order attributes are written back
/// to a map file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    /// Create an empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the named attribute.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Whether the named attribute exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate attributes in order.
    pub fn iter(&self) -> core::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set `name` to `value`, returning the previous value.
    pub(crate) fn set(&mut self, name: &str, value: &str) -> Option<String> {
        if let Some(a) = self.0.iter_mut().find(|a| a.name == name) {
            return Some(core::mem::replace(&mut a.value, value.into()));
        }
        self.0.push(Attribute {
            name: name.into(),
            value: value.into(),
        });
        None
    }

    /// Remove `name`, returning its value.
    pub(crate) fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.0.iter().position(|a| a.name == name)?;
        Some(self.0.remove(pos).value)
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = core::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (name, value) in iter {
            let name: String = name.into();
            let value: String = value.into();
            out.set(&name, &value);
        }
        out
    }
}

/// Index from attribute name and value to the nodes carrying that pair.
///
/// Lookups answer in sorted [`NodeId`] order.
#[derive(Clone, Debug, Default)]
pub struct AttributeIndex {
    entries: BTreeMap<String, BTreeMap<String, BTreeSet<NodeId>>>,
}

impl AttributeIndex {
    pub(crate) fn insert(&mut self, node: NodeId, name: &str, value: &str) {
        self.entries
            .entry(name.into())
            .or_default()
            .entry(value.into())
            .or_default()
            .insert(node);
    }

    /// Returns `false` if the pair was not indexed for `node`.
    pub(crate) fn remove(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(values) = self.entries.get_mut(name) else {
            return false;
        };
        let Some(nodes) = values.get_mut(value) else {
            return false;
        };
        let removed = nodes.remove(&node);
        if nodes.is_empty() {
            values.remove(value);
        }
        if values.is_empty() {
            self.entries.remove(name);
        }
        removed
    }

    /// Nodes whose attribute `name` equals `value`.
    pub fn find(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.entries
            .get(name)
            .and_then(|values| values.get(value))
            .map(|nodes| nodes.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Nodes with an attribute named `prefix` followed by zero or more ASCII
    /// digits (`target`, `target1`, `target22`, ...) whose value equals `value`.
    pub fn find_numbered(&self, prefix: &str, value: &str) -> Vec<NodeId> {
        let mut found = BTreeSet::new();
        let candidates = self
            .entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded));
        for (name, values) in candidates {
            let Some(suffix) = name.strip_prefix(prefix) else {
                break;
            };
            if !suffix.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if let Some(nodes) = values.get(value) {
                found.extend(nodes.iter().copied());
            }
        }
        found.into_iter().collect()
    }

    /// Number of indexed `(node, name, value)` triples.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeSet::len)
            .sum()
    }

    /// Whether nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
