// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned bounding box in `N` dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Aabb<T, const N: usize> {
    /// Minimum corner.
    pub min: [T; N],
    /// Maximum corner.
    pub max: [T; N],
}

/// Two dimensional bounding box.
pub type Aabb2<T> = Aabb<T, 2>;

/// Three dimensional bounding box.
pub type Aabb3<T> = Aabb<T, 3>;

impl<T, const N: usize> Aabb<T, N> {
    /// Create a new AABB from min/max corners.
    pub const fn new(min: [T; N], max: [T; N]) -> Self {
        Self { min, max }
    }
}

impl<T: Copy + PartialOrd, const N: usize> Aabb<T, N> {
    /// Whether this AABB contains the point (boundary inclusive).
    pub fn contains_point(&self, point: &[T; N]) -> bool {
        (0..N).all(|i| le(self.min[i], point[i]) && le(point[i], self.max[i]))
    }

    /// Whether `other` lies entirely within this AABB.
    pub fn contains(&self, other: &Self) -> bool {
        (0..N).all(|i| le(self.min[i], other.min[i]) && le(other.max[i], self.max[i]))
    }

    /// Whether the two AABBs overlap. Touching faces count as overlap.
    pub fn intersects(&self, other: &Self) -> bool {
        (0..N).all(|i| le(self.min[i], other.max[i]) && le(other.min[i], self.max[i]))
    }

    /// The intersection of two AABBs. May be empty.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            min: core::array::from_fn(|i| max_t(self.min[i], other.min[i])),
            max: core::array::from_fn(|i| min_t(self.max[i], other.max[i])),
        }
    }

    /// The smallest AABB enclosing both inputs.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: core::array::from_fn(|i| min_t(self.min[i], other.min[i])),
            max: core::array::from_fn(|i| max_t(self.max[i], other.max[i])),
        }
    }

    /// Return true if the AABB has no volume: degenerate, inverted, or NaN on some axis.
    pub fn is_empty(&self) -> bool {
        (0..N).any(|i| !lt(self.min[i], self.max[i]))
    }
}

impl<T: RealScalar, const N: usize> Aabb<T, N> {
    /// Distance along `ray` to the first point inside this AABB, if the ray hits it.
    ///
    /// A ray starting inside the box reports a distance of zero. Uses the slab method;
    /// axes with a zero direction component only test the origin against the slab.
    pub fn intersect_ray(&self, ray: &Ray<T, N>) -> Option<T> {
        let mut t_min = T::zero();
        let mut t_max = T::infinity();
        for i in 0..N {
            let o = ray.origin[i];
            let d = ray.direction[i];
            if d == T::zero() {
                if lt(o, self.min[i]) || lt(self.max[i], o) {
                    return None;
                }
                continue;
            }
            let mut t1 = T::div(T::sub(self.min[i], o), d);
            let mut t2 = T::div(T::sub(self.max[i], o), d);
            if lt(t2, t1) {
                core::mem::swap(&mut t1, &mut t2);
            }
            t_min = max_t(t_min, t1);
            t_max = min_t(t_max, t2);
            if lt(t_max, t_min) {
                return None;
            }
        }
        Some(t_min)
    }
}

/// A half-line with an origin and a (not necessarily normalized) direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray<T, const N: usize> {
    /// Start point.
    pub origin: [T; N],
    /// Direction of travel.
    pub direction: [T; N],
}

/// Three dimensional ray, the common case for picking.
pub type Ray3<T> = Ray<T, 3>;

impl<T, const N: usize> Ray<T, N> {
    /// Create a ray from an origin and a direction.
    pub const fn new(origin: [T; N], direction: [T; N]) -> Self {
        Self { origin, direction }
    }
}

/// Numeric scalar abstraction for AABBs used by the index.
///
/// This trait provides the minimal set of operations required for the volume
/// heuristic, and an associated widened accumulator type for volumes
/// (e.g., f32→f64, i64→i128).
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Widened accumulator type suitable for volume/cost computations.
    type Acc: Copy
        + PartialOrd
        + core::ops::Add<Output = Self::Acc>
        + core::ops::Sub<Output = Self::Acc>
        + core::ops::Mul<Output = Self::Acc>
        + Debug;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Max of the scalar value and zero.
    fn max_zero(v: Self) -> Self;

    /// Convert a scalar to the accumulator type.
    fn widen(v: Self) -> Self::Acc;

    /// Multiplicative identity of the accumulator type.
    fn acc_one() -> Self::Acc;
}

/// Scalars that support division, needed for ray casting.
pub trait RealScalar: Scalar {
    /// Divide: a / b.
    fn div(a: Self, b: Self) -> Self;

    /// Positive infinity.
    fn infinity() -> Self;
}

impl Scalar for f32 {
    type Acc = f64;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as f64
    }

    #[inline]
    fn acc_one() -> Self::Acc {
        1.0
    }
}

impl Scalar for f64 {
    type Acc = Self;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v
    }

    #[inline]
    fn acc_one() -> Self::Acc {
        1.0
    }
}

impl Scalar for i64 {
    type Acc = i128;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as i128
    }

    #[inline]
    fn acc_one() -> Self::Acc {
        1
    }
}

impl RealScalar for f32 {
    #[inline]
    fn div(a: Self, b: Self) -> Self {
        a / b
    }

    #[inline]
    fn infinity() -> Self {
        Self::INFINITY
    }
}

impl RealScalar for f64 {
    #[inline]
    fn div(a: Self, b: Self) -> Self {
        a / b
    }

    #[inline]
    fn infinity() -> Self {
        Self::INFINITY
    }
}

/// Compute the volume of an AABB using the scalar's widened accumulator type.
///
/// Inverted axes contribute zero.
#[inline]
pub fn volume<T: Scalar, const N: usize>(a: &Aabb<T, N>) -> T::Acc {
    let mut acc = T::acc_one();
    for i in 0..N {
        acc = acc * T::widen(T::max_zero(T::sub(a.max[i], a.min[i])));
    }
    acc
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}
