// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Tags: predicate-based smart tags for editor objects.
//!
//! A smart tag is a named predicate over an object's attributes (for example
//! "every entity whose classname starts with `trigger_`" or "every brush with a
//! liquid texture"). Tags are registered once in a [`TagRegistry`], which assigns
//! each a bit in a [`TagMask`]. Objects implementing [`Taggable`] carry such a
//! mask; [`TagRegistry::update_tags`] recomputes it after the object changed.
//!
//! ```rust
//! use canopy_tags::{SmartTag, TagMask, TagMatcher, TagRegistry, Taggable};
//!
//! struct Light {
//!     classname: String,
//!     tags: TagMask,
//! }
//!
//! impl Taggable for Light {
//!     fn attribute(&self, name: &str) -> Option<&str> {
//!         (name == "classname").then_some(self.classname.as_str())
//!     }
//!     fn tag_mask(&self) -> TagMask {
//!         self.tags
//!     }
//!     fn set_tag_mask(&mut self, mask: TagMask) {
//!         self.tags = mask;
//!     }
//! }
//!
//! let mut registry = TagRegistry::new();
//! let lights = registry
//!     .register_smart_tag(SmartTag::new(
//!         "lights",
//!         TagMatcher::attribute_value("classname", "light*"),
//!     ))
//!     .unwrap();
//!
//! // Registering the same name twice is a logic error.
//! assert!(registry
//!     .register_smart_tag(SmartTag::new("lights", TagMatcher::HasAttribute("x".into())))
//!     .is_err());
//!
//! let mut light = Light { classname: "light_flame".into(), tags: TagMask::EMPTY };
//! registry.update_tags(&mut light);
//! assert!(light.has_tag(&lights));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod matcher;
pub mod registry;
pub mod tag;

pub use matcher::TagMatcher;
pub use registry::{TagError, TagRegistry};
pub use tag::{SmartTag, Tag, TagMask, Taggable};
