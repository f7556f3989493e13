// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Index: a generic N-dimensional AABB index for picking and selection.
//!
//! Canopy Index is the spatial building block of the Canopy scene graph.
//!
//! - Insert, update, and remove axis-aligned bounding boxes (AABBs) paired with user data.
//! - Query by ray (picking), by point (containment), or by box (marquee selection).
//! - Rebuild from a batch with [`SpatialIndex::clear_and_build`] after bulk edits.
//!
//! It is generic over the scalar type `T`, the dimensionality `N` and the payload `P`,
//! and does not depend on any geometry crate. Higher layers (like a scene graph)
//! compute world-space AABBs and feed them here.
//!
//! Entries are identified by their `(bounds, data)` pair. Keeping the index in sync
//! with the objects it describes is the caller's job; [`SpatialIndex::update`]
//! reports [`IndexError::NotFound`] when the caller's idea of an entry's bounds no
//! longer matches the index.
//!
//! # Example
//!
//! ```rust
//! use canopy_index::{Aabb, AabbTree, Ray, SpatialIndex};
//!
//! let mut idx: AabbTree<f64, 3, u32> = AabbTree::new();
//! idx.insert(Aabb::new([0.0; 3], [1.0; 3]), 1);
//! idx.insert(Aabb::new([5.0; 3], [6.0; 3]), 2);
//! idx.insert(Aabb::new([10.0; 3], [11.0; 3]), 3);
//!
//! // Pick along a ray that only passes through the second box.
//! let ray = Ray::new([-10.0, 5.5, 5.5], [1.0, 0.0, 0.0]);
//! assert_eq!(idx.find_intersectors(&ray), vec![2]);
//!
//! // Move the first box; the old bounds must match what was inserted.
//! idx.update(&Aabb::new([0.0; 3], [1.0; 3]), Aabb::new([2.0; 3], [3.0; 3]), 1)
//!     .unwrap();
//! assert_eq!(idx.find_containers(&[2.5; 3]), vec![1]);
//! ```
//!
//! ## Choosing a backend
//!
//! - [`AabbTree`]: dynamic BVH with logarithmic height. The default choice.
//! - [`FlatVec`]: linear scans. Good for very small sets, and as a reference when testing.
//!
//! ### Float semantics
//!
//! Boxes with a NaN coordinate are treated as empty and never stored.
//! Volume metrics use widened accumulators to reduce precision pitfalls.

#![no_std]

extern crate alloc;

pub mod backends;
pub mod index;
pub mod types;

pub use backends::aabb_tree::{AabbTree, AabbTreeF32, AabbTreeF64, AabbTreeI64};
pub use backends::flatvec::FlatVec;
pub use index::{IndexError, SpatialIndex};
pub use types::{Aabb, Aabb2, Aabb3, Ray, Ray3, RealScalar, Scalar};
