// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The smart tag registry.

use alloc::string::String;
use alloc::vec::Vec;

use crate::tag::{SmartTag, Tag, TagMask, Taggable};

/// Errors reported while registering smart tags.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// A smart tag with this name is already registered.
    #[error("smart tag `{0}` is already registered")]
    AlreadyRegistered(String),
    /// Every bit of [`TagMask`] is already assigned.
    #[error("cannot register more than {max} smart tags")]
    TooManyTags {
        /// Capacity of a tag mask.
        max: usize,
    },
}

#[derive(Clone, Debug)]
struct Registered {
    tag: Tag,
    smart: SmartTag,
}

/// Keeps the registered smart tags and updates the tag masks of taggable objects.
///
/// Tags are registered once, typically at startup; each receives its own bit in
/// [`TagMask`]. After any attribute change on a taggable object, call
/// [`TagRegistry::update_tags`] to bring its mask up to date.
#[derive(Clone, Debug, Default)]
pub struct TagRegistry {
    smart_tags: Vec<Registered>,
}

impl TagRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a smart tag and assign it the next free bit.
    ///
    /// Fails if a tag with the same name exists or all bits are taken.
    pub fn register_smart_tag(&mut self, smart: SmartTag) -> Result<Tag, TagError> {
        if self.is_registered(smart.name()) {
            return Err(TagError::AlreadyRegistered(smart.name().into()));
        }
        if self.smart_tags.len() >= TagMask::CAPACITY {
            return Err(TagError::TooManyTags {
                max: TagMask::CAPACITY,
            });
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "bounded by TagMask::CAPACITY above"
        )]
        let tag = Tag::new(smart.name().into(), self.smart_tags.len() as u32);
        log::debug!("registered smart tag `{}` as bit {}", tag.name(), tag.index());
        self.smart_tags.push(Registered {
            tag: tag.clone(),
            smart,
        });
        Ok(tag)
    }

    /// Whether a smart tag with this name is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.smart_tag(name).is_some()
    }

    /// The registered tag with this name.
    pub fn smart_tag(&self, name: &str) -> Option<&Tag> {
        self.smart_tags
            .iter()
            .find(|r| r.tag.name() == name)
            .map(|r| &r.tag)
    }

    /// All registered tags, in registration order.
    pub fn smart_tags(&self) -> impl Iterator<Item = &Tag> + '_ {
        self.smart_tags.iter().map(|r| &r.tag)
    }

    /// Number of registered tags.
    pub fn len(&self) -> usize {
        self.smart_tags.len()
    }

    /// Whether no tag is registered.
    pub fn is_empty(&self) -> bool {
        self.smart_tags.is_empty()
    }

    /// Re-evaluate every smart tag against `taggable` and update its mask.
    ///
    /// Bits that do not belong to a registered tag are left alone.
    pub fn update_tags<T: Taggable + ?Sized>(&self, taggable: &mut T) {
        let before = taggable.tag_mask();
        let mut mask = before;
        for r in &self.smart_tags {
            if r.smart.matcher().matches(&*taggable) {
                mask.insert(&r.tag);
            } else {
                mask.remove(&r.tag);
            }
        }
        if mask != before {
            log::trace!("tag mask {:#x} -> {:#x}", before.bits(), mask.bits());
            taggable.set_tag_mask(mask);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::TagMatcher;
    use alloc::format;
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct Thing {
        attributes: Vec<(String, String)>,
        texture: Option<String>,
        mask: TagMask,
    }

    impl Thing {
        fn with(name: &str, value: &str) -> Self {
            Self {
                attributes: vec![(name.into(), value.into())],
                ..Default::default()
            }
        }
    }

    impl Taggable for Thing {
        fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        }

        fn texture(&self) -> Option<&str> {
            self.texture.as_deref()
        }

        fn tag_mask(&self) -> TagMask {
            self.mask
        }

        fn set_tag_mask(&mut self, mask: TagMask) {
            self.mask = mask;
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = TagRegistry::new();
        let detail = SmartTag::new("detail", TagMatcher::HasAttribute("detail".into()));
        assert!(registry.register_smart_tag(detail.clone()).is_ok());
        assert_eq!(
            registry.register_smart_tag(detail),
            Err(TagError::AlreadyRegistered("detail".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registration_assigns_distinct_bits() {
        let mut registry = TagRegistry::new();
        let a = registry
            .register_smart_tag(SmartTag::new("a", TagMatcher::HasAttribute("a".into())))
            .unwrap();
        let b = registry
            .register_smart_tag(SmartTag::new("b", TagMatcher::HasAttribute("b".into())))
            .unwrap();
        assert_ne!(a.index(), b.index());
        assert_eq!(registry.smart_tag("b"), Some(&b));
        let names: Vec<_> = registry.smart_tags().map(Tag::name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn capacity_is_bounded_by_mask_width() {
        let mut registry = TagRegistry::new();
        for i in 0..TagMask::CAPACITY {
            let name = format!("tag{i}");
            registry
                .register_smart_tag(SmartTag::new(name.clone(), TagMatcher::HasAttribute(name)))
                .unwrap();
        }
        let overflow = SmartTag::new("one_more", TagMatcher::HasAttribute("x".into()));
        assert_eq!(
            registry.register_smart_tag(overflow),
            Err(TagError::TooManyTags {
                max: TagMask::CAPACITY
            })
        );
    }

    #[test]
    fn update_tags_follows_attribute_changes() {
        let mut registry = TagRegistry::new();
        let trigger = registry
            .register_smart_tag(SmartTag::new(
                "trigger",
                TagMatcher::attribute_value("classname", "trigger_*"),
            ))
            .unwrap();
        let mut thing = Thing::with("classname", "trigger_once");
        registry.update_tags(&mut thing);
        assert!(thing.has_tag(&trigger));

        thing.attributes[0].1 = "func_door".into();
        registry.update_tags(&mut thing);
        assert!(!thing.has_tag(&trigger));
    }

    #[test]
    fn update_tags_is_idempotent() {
        let mut registry = TagRegistry::new();
        registry
            .register_smart_tag(SmartTag::new(
                "liquid",
                TagMatcher::Any(vec![
                    TagMatcher::TextureName("*water*".into()),
                    TagMatcher::TextureName("*lava*".into()),
                ]),
            ))
            .unwrap();
        registry
            .register_smart_tag(SmartTag::new(
                "clip",
                TagMatcher::TextureName("clip".into()),
            ))
            .unwrap();
        let mut thing = Thing {
            texture: Some("e1_WATER1".into()),
            ..Default::default()
        };
        registry.update_tags(&mut thing);
        let first = thing.tag_mask();
        registry.update_tags(&mut thing);
        assert_eq!(thing.tag_mask(), first);
        assert_eq!(first.bits(), 0b01);
    }

    #[test]
    fn foreign_bits_survive_updates() {
        let mut registry = TagRegistry::new();
        registry
            .register_smart_tag(SmartTag::new("a", TagMatcher::HasAttribute("a".into())))
            .unwrap();
        let mut thing = Thing {
            mask: TagMask::from_bits(1 << 40),
            ..Default::default()
        };
        registry.update_tags(&mut thing);
        assert_eq!(thing.tag_mask().bits(), 1 << 40);
    }

    #[test]
    fn all_requires_every_matcher() {
        let matcher = TagMatcher::All(vec![
            TagMatcher::HasAttribute("classname".into()),
            TagMatcher::attribute_value("spawnflags", "1"),
        ]);
        assert!(!matcher.matches(&Thing::with("classname", "light")));
        let mut thing = Thing::with("classname", "light");
        thing.attributes.push(("spawnflags".into(), "1".into()));
        assert!(matcher.matches(&thing));
    }
}
