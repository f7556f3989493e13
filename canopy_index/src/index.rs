// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`SpatialIndex`] contract shared by every backend.

use alloc::vec::Vec;

use crate::types::{Aabb, Ray, RealScalar, Scalar};

/// Errors reported by spatial index operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// No entry with the given bounds and data exists.
    ///
    /// Returned by [`SpatialIndex::update`]. It means the caller's view of the
    /// index went out of sync with what was inserted; the index itself is unchanged.
    #[error("no entry with the given bounds and data exists in the index")]
    NotFound,
}

/// A mapping from `(bounds, data)` pairs to queryable entries.
///
/// Entries with [empty](Aabb::is_empty) bounds are never stored: inserting them
/// is a no-op and removing them reports `false`. Queries report every matching
/// entry exactly once, in no particular order.
pub trait SpatialIndex<T: Scalar, const N: usize, P> {
    /// Insert an entry. Does nothing if `bounds` is empty.
    fn insert(&mut self, bounds: Aabb<T, N>, data: P);

    /// Remove the entry with exactly these bounds and data.
    ///
    /// Returns `true` if an entry was found and removed.
    fn remove(&mut self, bounds: &Aabb<T, N>, data: &P) -> bool;

    /// Replace the bounds of the entry `(old, data)` with `new`.
    ///
    /// Returns [`IndexError::NotFound`] without touching the index if no such entry exists.
    /// If `new` is empty the entry is dropped.
    fn update(&mut self, old: &Aabb<T, N>, new: Aabb<T, N>, data: P) -> Result<(), IndexError> {
        if !self.remove(old, &data) {
            return Err(IndexError::NotFound);
        }
        self.insert(new, data);
        Ok(())
    }

    /// Remove all entries.
    fn clear(&mut self);

    /// Clear the index and rebuild it from `pairs`.
    ///
    /// Use after bulk edits where keeping the index in sync entry by entry is
    /// more expensive than starting over.
    fn clear_and_build<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (Aabb<T, N>, P)>,
        Self: Sized,
    {
        self.clear();
        for (bounds, data) in pairs {
            self.insert(bounds, data);
        }
    }

    /// Whether an entry with exactly these bounds and data exists.
    fn contains(&self, bounds: &Aabb<T, N>, data: &P) -> bool;

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Whether the index holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the longest root-to-leaf path, counted in nodes. Zero when empty.
    fn height(&self) -> usize;

    /// Union of all entry bounds, or `None` when the index is empty.
    fn bounds(&self) -> Option<Aabb<T, N>>;

    /// Data of every entry whose bounds contain `point`.
    fn find_containers(&self, point: &[T; N]) -> Vec<P>;

    /// Data of every entry whose bounds overlap `bounds`.
    fn find_intersecting(&self, bounds: &Aabb<T, N>) -> Vec<P>;

    /// Data of every entry whose bounds are hit by `ray`.
    fn find_intersectors(&self, ray: &Ray<T, N>) -> Vec<P>
    where
        T: RealScalar;
}
