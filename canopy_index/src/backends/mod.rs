// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Implementations of [`SpatialIndex`](crate::SpatialIndex).
//!
//! - `aabb_tree`: dynamic binary BVH (aliases: `AabbTreeF32`, `AabbTreeF64`, `AabbTreeI64`).
//! - `flatvec`: flat vector with linear scans (small, simple, a reference for the tree).
//!
//! Insertion heuristic
//! -------------------
//! The AABB tree inserts a new leaf by walking down from the root and, at each
//! inner node, following the child whose volume grows the least when enlarged to
//! enclose the new bounds (ties go to the shorter child). The reached leaf is
//! replaced by an inner node holding the old leaf and the new one.
//! Volumes use widened accumulators (`f32`→`f64`, `f64`→`f64`, `i64`→`i128`).
//!
//! Balancing
//! ---------
//! Every inner node on the modified path is refit and rebalanced with single or
//! double rotations whenever the heights of its children differ by more than one.

pub mod aabb_tree;
pub mod flatvec;
