// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector index with linear scans. Small and simple; good for tiny sets.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::index::SpatialIndex;
use crate::types::{Aabb, Ray, RealScalar, Scalar};

/// Flat vector index with linear scans.
#[derive(Clone)]
pub struct FlatVec<T: Scalar, const N: usize, P> {
    entries: Vec<(Aabb<T, N>, P)>,
}

impl<T: Scalar, const N: usize, P> Default for FlatVec<T, N, P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Scalar, const N: usize, P> Debug for FlatVec<T, N, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlatVec")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar, const N: usize, P: Clone> FlatVec<T, N, P> {
    fn scan(&self, test: impl Fn(&Aabb<T, N>) -> bool) -> Vec<P> {
        self.entries
            .iter()
            .filter(|(b, _)| test(b))
            .map(|(_, d)| d.clone())
            .collect()
    }
}

impl<T: Scalar, const N: usize, P: Clone + PartialEq> SpatialIndex<T, N, P> for FlatVec<T, N, P> {
    fn insert(&mut self, bounds: Aabb<T, N>, data: P) {
        if !bounds.is_empty() {
            self.entries.push((bounds, data));
        }
    }

    fn remove(&mut self, bounds: &Aabb<T, N>, data: &P) -> bool {
        if bounds.is_empty() {
            return false;
        }
        match self
            .entries
            .iter()
            .position(|(b, d)| b == bounds && d == data)
        {
            Some(i) => {
                self.entries.swap_remove(i);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn contains(&self, bounds: &Aabb<T, N>, data: &P) -> bool {
        self.entries.iter().any(|(b, d)| b == bounds && d == data)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    /// A flat list is a single level deep.
    fn height(&self) -> usize {
        usize::from(!self.entries.is_empty())
    }

    fn bounds(&self) -> Option<Aabb<T, N>> {
        let mut it = self.entries.iter();
        let (first, _) = it.next()?;
        Some(it.fold(*first, |acc, (b, _)| acc.union(b)))
    }

    fn find_containers(&self, point: &[T; N]) -> Vec<P> {
        self.scan(|b| b.contains_point(point))
    }

    fn find_intersecting(&self, bounds: &Aabb<T, N>) -> Vec<P> {
        self.scan(|b| b.intersects(bounds))
    }

    fn find_intersectors(&self, ray: &Ray<T, N>) -> Vec<P>
    where
        T: RealScalar,
    {
        self.scan(|b| b.intersect_ray(ray).is_some())
    }
}
