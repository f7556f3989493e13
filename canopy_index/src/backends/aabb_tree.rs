// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic binary bounding volume hierarchy generic over scalar `T: Scalar`.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::index::SpatialIndex;
use crate::types::{Aabb, Ray, RealScalar, Scalar, volume};

/// A dynamic AABB tree holding one entry per leaf.
///
/// New entries descend towards the child whose volume grows the least. Every inner
/// node touched by an insertion or removal is refit and rebalanced with AVL-style
/// rotations, so the height stays logarithmic in the number of entries.
#[derive(Clone)]
pub struct AabbTree<T: Scalar, const N: usize, P> {
    root: Option<NodeIdx>,
    arena: Vec<Option<Node<T, N, P>>>,
    free_list: Vec<usize>,
    len: usize,
}

#[derive(Clone)]
enum Kind<P> {
    Leaf(P),
    Inner {
        left: NodeIdx,
        right: NodeIdx,
        height: usize,
    },
}

#[derive(Clone)]
struct Node<T, const N: usize, P> {
    bbox: Aabb<T, N>,
    kind: Kind<P>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    const fn get(self) -> usize {
        self.0
    }
}

enum Removal {
    NotFound,
    /// The entry was removed; carries the new root of the visited subtree.
    Removed(Option<NodeIdx>),
}

impl<T: Scalar, const N: usize, P> Default for AabbTree<T, N, P> {
    fn default() -> Self {
        Self {
            root: None,
            arena: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }
}

impl<T: Scalar, const N: usize, P> AabbTree<T, N, P> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, idx: NodeIdx) -> &Node<T, N, P> {
        self.arena[idx.get()]
            .as_ref()
            .expect("dangling AABB tree node")
    }

    fn node_mut(&mut self, idx: NodeIdx) -> &mut Node<T, N, P> {
        self.arena[idx.get()]
            .as_mut()
            .expect("dangling AABB tree node")
    }

    fn alloc(&mut self, node: Node<T, N, P>) -> NodeIdx {
        if let Some(i) = self.free_list.pop() {
            self.arena[i] = Some(node);
            NodeIdx::new(i)
        } else {
            self.arena.push(Some(node));
            NodeIdx::new(self.arena.len() - 1)
        }
    }

    fn release(&mut self, idx: NodeIdx) {
        self.arena[idx.get()] = None;
        self.free_list.push(idx.get());
    }

    fn children(&self, idx: NodeIdx) -> Option<(NodeIdx, NodeIdx)> {
        match self.node(idx).kind {
            Kind::Leaf(_) => None,
            Kind::Inner { left, right, .. } => Some((left, right)),
        }
    }

    fn height_of(&self, idx: NodeIdx) -> usize {
        match self.node(idx).kind {
            Kind::Leaf(_) => 1,
            Kind::Inner { height, .. } => height,
        }
    }

    fn set_children(&mut self, idx: NodeIdx, new_left: NodeIdx, new_right: NodeIdx) {
        if let Kind::Inner { left, right, .. } = &mut self.node_mut(idx).kind {
            *left = new_left;
            *right = new_right;
        }
    }

    /// Recompute bounds and height of an inner node from its children.
    fn refit(&mut self, idx: NodeIdx) {
        let Some((left, right)) = self.children(idx) else {
            return;
        };
        let bbox = self.node(left).bbox.union(&self.node(right).bbox);
        let h = 1 + self.height_of(left).max(self.height_of(right));
        let node = self.node_mut(idx);
        node.bbox = bbox;
        if let Kind::Inner { height, .. } = &mut node.kind {
            *height = h;
        }
    }

    /// Volume increase of the subtree at `idx` if it had to enclose `bounds`.
    fn growth(&self, idx: NodeIdx, bounds: &Aabb<T, N>) -> T::Acc {
        let bbox = self.node(idx).bbox;
        volume(&bbox.union(bounds)) - volume(&bbox)
    }

    fn descend_left(&self, left: NodeIdx, right: NodeIdx, bounds: &Aabb<T, N>) -> bool {
        match self.growth(left, bounds).partial_cmp(&self.growth(right, bounds)) {
            Some(Ordering::Less) => true,
            Some(Ordering::Greater) => false,
            _ => self.height_of(left) <= self.height_of(right),
        }
    }

    /// Insert `leaf` below `idx`; returns the new root of that subtree.
    fn insert_at(&mut self, idx: NodeIdx, leaf: NodeIdx) -> NodeIdx {
        let Some((left, right)) = self.children(idx) else {
            let bbox = self.node(idx).bbox.union(&self.node(leaf).bbox);
            return self.alloc(Node {
                bbox,
                kind: Kind::Inner {
                    left: idx,
                    right: leaf,
                    height: 2,
                },
            });
        };
        let bounds = self.node(leaf).bbox;
        if self.descend_left(left, right, &bounds) {
            let new_left = self.insert_at(left, leaf);
            self.set_children(idx, new_left, right);
        } else {
            let new_right = self.insert_at(right, leaf);
            self.set_children(idx, left, new_right);
        }
        self.refit(idx);
        self.rebalance(idx)
    }

    fn remove_at(&mut self, idx: NodeIdx, bounds: &Aabb<T, N>, data: &P) -> Removal
    where
        P: PartialEq,
    {
        let node = self.node(idx);
        if !node.bbox.contains(bounds) {
            return Removal::NotFound;
        }
        let Some((left, right)) = self.children(idx) else {
            let hit = node.bbox == *bounds && matches!(&node.kind, Kind::Leaf(d) if d == data);
            if !hit {
                return Removal::NotFound;
            }
            self.release(idx);
            return Removal::Removed(None);
        };
        for (child, sibling, child_is_left) in [(left, right, true), (right, left, false)] {
            match self.remove_at(child, bounds, data) {
                Removal::NotFound => continue,
                Removal::Removed(None) => {
                    // The sibling takes the place of this inner node.
                    self.release(idx);
                    return Removal::Removed(Some(sibling));
                }
                Removal::Removed(Some(new_child)) => {
                    if child_is_left {
                        self.set_children(idx, new_child, sibling);
                    } else {
                        self.set_children(idx, sibling, new_child);
                    }
                    self.refit(idx);
                    return Removal::Removed(Some(self.rebalance(idx)));
                }
            }
        }
        Removal::NotFound
    }

    /// Restore the height balance of `idx`; returns the new root of the subtree.
    fn rebalance(&mut self, idx: NodeIdx) -> NodeIdx {
        let Some((left, right)) = self.children(idx) else {
            return idx;
        };
        let hl = self.height_of(left);
        let hr = self.height_of(right);
        if hl > hr + 1 {
            if let Some((ll, lr)) = self.children(left)
                && self.height_of(lr) > self.height_of(ll)
            {
                let new_left = self.rotate_left(left);
                self.set_children(idx, new_left, right);
            }
            self.rotate_right(idx)
        } else if hr > hl + 1 {
            if let Some((rl, rr)) = self.children(right)
                && self.height_of(rl) > self.height_of(rr)
            {
                let new_right = self.rotate_right(right);
                self.set_children(idx, left, new_right);
            }
            self.rotate_left(idx)
        } else {
            idx
        }
    }

    /// `(pivot(a, b), c)` becomes `pivot(a, (b, c))`.
    fn rotate_right(&mut self, idx: NodeIdx) -> NodeIdx {
        let (pivot, right) = self.children(idx).expect("rotation of a leaf");
        let (a, b) = self.children(pivot).expect("rotation around a leaf");
        self.set_children(idx, b, right);
        self.refit(idx);
        self.set_children(pivot, a, idx);
        self.refit(pivot);
        pivot
    }

    /// `(a, pivot(b, c))` becomes `pivot((a, b), c)`.
    fn rotate_left(&mut self, idx: NodeIdx) -> NodeIdx {
        let (left, pivot) = self.children(idx).expect("rotation of a leaf");
        let (b, c) = self.children(pivot).expect("rotation around a leaf");
        self.set_children(idx, left, b);
        self.refit(idx);
        self.set_children(pivot, idx, c);
        self.refit(pivot);
        pivot
    }

    /// Collect the data of every leaf whose bounds pass `test`, pruning subtrees that fail it.
    fn collect(&self, test: impl Fn(&Aabb<T, N>) -> bool) -> Vec<P>
    where
        P: Clone,
    {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let n = self.node(i);
            if !test(&n.bbox) {
                continue;
            }
            match &n.kind {
                Kind::Leaf(data) => out.push(data.clone()),
                Kind::Inner { left, right, .. } => {
                    stack.push(*left);
                    stack.push(*right);
                }
            }
        }
        out
    }
}

impl<T: Scalar, const N: usize, P: Clone + PartialEq> SpatialIndex<T, N, P> for AabbTree<T, N, P> {
    fn insert(&mut self, bounds: Aabb<T, N>, data: P) {
        if bounds.is_empty() {
            return;
        }
        let leaf = self.alloc(Node {
            bbox: bounds,
            kind: Kind::Leaf(data),
        });
        let root = match self.root {
            None => leaf,
            Some(root) => self.insert_at(root, leaf),
        };
        self.root = Some(root);
        self.len += 1;
    }

    fn remove(&mut self, bounds: &Aabb<T, N>, data: &P) -> bool {
        if bounds.is_empty() {
            return false;
        }
        let Some(root) = self.root else {
            return false;
        };
        match self.remove_at(root, bounds, data) {
            Removal::NotFound => false,
            Removal::Removed(new_root) => {
                self.root = new_root;
                self.len -= 1;
                true
            }
        }
    }

    fn clear(&mut self) {
        self.root = None;
        self.arena.clear();
        self.free_list.clear();
        self.len = 0;
    }

    fn clear_and_build<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (Aabb<T, N>, P)>,
    {
        self.clear();
        for (bounds, data) in pairs {
            self.insert(bounds, data);
        }
        log::debug!(
            "rebuilt AABB tree: {} entries, height {}",
            self.len,
            self.height()
        );
    }

    fn contains(&self, bounds: &Aabb<T, N>, data: &P) -> bool {
        if bounds.is_empty() {
            return false;
        }
        let Some(root) = self.root else {
            return false;
        };
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let n = self.node(i);
            if !n.bbox.contains(bounds) {
                continue;
            }
            match &n.kind {
                Kind::Leaf(d) => {
                    if n.bbox == *bounds && d == data {
                        return true;
                    }
                }
                Kind::Inner { left, right, .. } => {
                    stack.push(*left);
                    stack.push(*right);
                }
            }
        }
        false
    }

    fn len(&self) -> usize {
        self.len
    }

    fn height(&self) -> usize {
        self.root.map(|r| self.height_of(r)).unwrap_or(0)
    }

    fn bounds(&self) -> Option<Aabb<T, N>> {
        self.root.map(|r| self.node(r).bbox)
    }

    fn find_containers(&self, point: &[T; N]) -> Vec<P> {
        self.collect(|b| b.contains_point(point))
    }

    fn find_intersecting(&self, bounds: &Aabb<T, N>) -> Vec<P> {
        self.collect(|b| b.intersects(bounds))
    }

    fn find_intersectors(&self, ray: &Ray<T, N>) -> Vec<P>
    where
        T: RealScalar,
    {
        self.collect(|b| b.intersect_ray(ray).is_some())
    }
}

impl<T: Scalar, const N: usize, P> Debug for AabbTree<T, N, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let height = self.root.map(|r| self.height_of(r)).unwrap_or(0);
        f.debug_struct("AabbTree")
            .field("len", &self.len)
            .field("height", &height)
            .field("arena_nodes", &self.arena.len())
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

/// Convenience type aliases for common scalar choices.
/// AABB tree with f32 coordinates and f64 metrics.
pub type AabbTreeF32<const N: usize, P> = AabbTree<f32, N, P>;

/// AABB tree with f64 coordinates and f64 metrics.
pub type AabbTreeF64<const N: usize, P> = AabbTree<f64, N, P>;

/// AABB tree with i64 coordinates and i128 metrics.
pub type AabbTreeI64<const N: usize, P> = AabbTree<i64, N, P>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::flatvec::FlatVec;
    use crate::index::IndexError;
    use crate::types::Aabb3;

    #[derive(Clone)]
    struct Rng(u64);

    impl Rng {
        fn next_u64(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }

        fn next_f64(&mut self) -> f64 {
            let v = self.next_u64() >> 11;
            (v as f64) / ((1_u64 << 53) as f64)
        }
    }

    fn random_boxes(count: usize, seed: u64) -> Vec<Aabb3<f64>> {
        let mut rng = Rng(seed);
        (0..count)
            .map(|_| {
                let min: [f64; 3] = core::array::from_fn(|_| rng.next_f64() * 1000.0);
                let max: [f64; 3] = core::array::from_fn(|i| min[i] + 1.0 + rng.next_f64() * 40.0);
                Aabb::new(min, max)
            })
            .collect()
    }

    fn cube(lo: f64, hi: f64) -> Aabb3<f64> {
        Aabb::new([lo; 3], [hi; 3])
    }

    /// Walk the whole tree and check cached bounds, heights, balance and length.
    fn assert_consistent<P>(tree: &AabbTree<f64, 3, P>) {
        fn walk<P>(tree: &AabbTree<f64, 3, P>, idx: NodeIdx, leaves: &mut usize) -> usize {
            let node = tree.node(idx);
            match node.kind {
                Kind::Leaf(_) => {
                    *leaves += 1;
                    1
                }
                Kind::Inner {
                    left,
                    right,
                    height,
                } => {
                    let hl = walk(tree, left, leaves);
                    let hr = walk(tree, right, leaves);
                    assert_eq!(height, 1 + hl.max(hr), "cached height must match");
                    assert!(hl.abs_diff(hr) <= 1, "subtrees must stay balanced");
                    let union = tree.node(left).bbox.union(&tree.node(right).bbox);
                    assert_eq!(node.bbox, union, "inner bounds must be the union");
                    height
                }
            }
        }
        let mut leaves = 0;
        if let Some(root) = tree.root {
            walk(tree, root, &mut leaves);
        }
        assert_eq!(leaves, tree.len, "leaf count must match len");
    }

    #[test]
    fn ray_picks_only_the_box_it_passes() {
        let mut tree: AabbTree<f64, 3, u32> = AabbTree::new();
        tree.insert(cube(0.0, 1.0), 1);
        tree.insert(cube(5.0, 6.0), 2);
        tree.insert(cube(10.0, 11.0), 3);
        let ray = Ray::new([-10.0, 5.5, 5.5], [1.0, 0.0, 0.0]);
        assert_eq!(tree.find_intersectors(&ray), vec![2]);
    }

    #[test]
    fn empty_bounds_are_ignored() {
        let mut tree: AabbTree<f64, 3, u32> = AabbTree::new();
        let flat = Aabb::new([0.0, 0.0, 0.0], [1.0, 1.0, 0.0]);
        tree.insert(flat, 7);
        assert!(tree.is_empty());
        assert!(!tree.remove(&flat, &7));
        assert!(!tree.contains(&flat, &7));
        assert_eq!(tree.bounds(), None);
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn insert_then_remove_empties_the_tree() {
        let mut tree: AabbTree<f64, 3, u32> = AabbTree::new();
        tree.insert(cube(0.0, 1.0), 1);
        assert!(!tree.is_empty());
        assert!(tree.remove(&cube(0.0, 1.0), &1));
        assert!(tree.is_empty());
        assert_eq!(tree.bounds(), None);
        assert!(!tree.remove(&cube(0.0, 1.0), &1));
    }

    #[test]
    fn remove_requires_matching_bounds_and_data() {
        let mut tree: AabbTree<f64, 3, u32> = AabbTree::new();
        tree.insert(cube(0.0, 1.0), 1);
        tree.insert(cube(0.0, 1.0), 2);
        assert!(!tree.remove(&cube(0.0, 2.0), &1));
        assert!(!tree.remove(&cube(0.0, 1.0), &3));
        assert!(tree.remove(&cube(0.0, 1.0), &2));
        assert!(tree.contains(&cube(0.0, 1.0), &1));
        assert!(!tree.contains(&cube(0.0, 1.0), &2));
    }

    #[test]
    fn update_of_missing_entry_leaves_tree_untouched() {
        let mut tree: AabbTree<f64, 3, u32> = AabbTree::new();
        tree.insert(cube(5.0, 6.0), 1);
        tree.insert(cube(7.0, 9.0), 2);
        let bounds_before = tree.bounds();
        let height_before = tree.height();

        let res = tree.update(&cube(0.0, 1.0), cube(2.0, 3.0), 99);
        assert_eq!(res, Err(IndexError::NotFound));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.bounds(), bounds_before);
        assert_eq!(tree.height(), height_before);
        assert!(tree.contains(&cube(5.0, 6.0), &1));
        assert!(tree.contains(&cube(7.0, 9.0), &2));
        assert!(!tree.contains(&cube(2.0, 3.0), &99));
    }

    #[test]
    fn update_moves_an_entry() {
        let mut tree: AabbTree<f64, 3, u32> = AabbTree::new();
        tree.insert(cube(0.0, 1.0), 1);
        tree.insert(cube(10.0, 11.0), 2);
        tree.update(&cube(0.0, 1.0), cube(20.0, 21.0), 1).unwrap();
        assert!(tree.find_containers(&[0.5, 0.5, 0.5]).is_empty());
        assert_eq!(tree.find_containers(&[20.5, 20.5, 20.5]), vec![1]);
        assert_eq!(tree.bounds(), Some(cube(10.0, 21.0)));
    }

    #[test]
    fn clear_and_build_contains_every_pair() {
        let boxes = random_boxes(300, 0x5EED_1234_ABCD_0001);
        let mut tree: AabbTree<f64, 3, usize> = AabbTree::new();
        tree.insert(cube(-5.0, -4.0), 10_000);
        tree.clear_and_build(boxes.iter().copied().zip(0..));
        assert_eq!(tree.len(), boxes.len());
        assert!(!tree.contains(&cube(-5.0, -4.0), &10_000));
        for (i, b) in boxes.iter().enumerate() {
            assert!(tree.contains(b, &i), "entry {i} must be found after rebuild");
        }
        assert_consistent(&tree);
    }

    #[test]
    fn bounds_is_union_of_entries() {
        let boxes = random_boxes(64, 0xB0B0_CAFE_0000_0042);
        let mut tree: AabbTree<f64, 3, usize> = AabbTree::new();
        let mut expected: Option<Aabb3<f64>> = None;
        for (i, b) in boxes.iter().enumerate() {
            tree.insert(*b, i);
            expected = Some(expected.map_or(*b, |e| e.union(b)));
            assert_eq!(tree.bounds(), expected);
        }
    }

    #[test]
    fn height_stays_logarithmic() {
        // Sorted insertion is the worst case for an unbalanced tree.
        let mut tree: AabbTree<f64, 3, usize> = AabbTree::new();
        for i in 0..1024 {
            let x = i as f64 * 2.0;
            tree.insert(Aabb::new([x, 0.0, 0.0], [x + 1.0, 1.0, 1.0]), i);
        }
        assert_consistent(&tree);
        // An AVL tree with 1024 leaves has fewer than 1.45 * log2(2048) levels.
        assert!(tree.height() <= 16, "height was {}", tree.height());
    }

    #[test]
    fn queries_match_linear_scan() {
        let boxes = random_boxes(500, 0xCAFE_F00D_DEAD_BEEF);
        let mut tree: AabbTree<f64, 3, usize> = AabbTree::new();
        let mut flat: FlatVec<f64, 3, usize> = FlatVec::default();
        for (i, b) in boxes.iter().enumerate() {
            tree.insert(*b, i);
            flat.insert(*b, i);
        }

        let mut rng = Rng(0x1234_5678_9ABC_DEF0);
        for _ in 0..50 {
            let origin: [f64; 3] = core::array::from_fn(|_| rng.next_f64() * 1200.0 - 100.0);
            let direction: [f64; 3] = core::array::from_fn(|_| rng.next_f64() * 2.0 - 1.0);
            let ray = Ray::new(origin, direction);
            let mut got = tree.find_intersectors(&ray);
            let mut want = flat.find_intersectors(&ray);
            got.sort_unstable();
            want.sort_unstable();
            assert_eq!(got, want, "ray hits must match the linear scan");

            let point: [f64; 3] = core::array::from_fn(|_| rng.next_f64() * 1000.0);
            let mut got = tree.find_containers(&point);
            let mut want = flat.find_containers(&point);
            got.sort_unstable();
            want.sort_unstable();
            assert_eq!(got, want, "point hits must match the linear scan");
        }
    }

    #[test]
    fn churn_keeps_structure_valid_and_arena_bounded() {
        let boxes = random_boxes(200, 0xDEAD_BEEF_0000_0001);
        let mut tree: AabbTree<f64, 3, usize> = AabbTree::new();
        for (i, b) in boxes.iter().enumerate() {
            tree.insert(*b, i);
        }
        let arena_before = tree.arena.len();

        let mut current = boxes.clone();
        let mut rng = Rng(0x0F0F_0F0F_1111_2222);
        for round in 0..1000 {
            let i = (rng.next_u64() % current.len() as u64) as usize;
            let dx = rng.next_f64() * 50.0 - 25.0;
            let old = current[i];
            let new = Aabb::new(
                [old.min[0] + dx, old.min[1], old.min[2]],
                [old.max[0] + dx, old.max[1], old.max[2]],
            );
            tree.update(&old, new, i)
                .unwrap_or_else(|e| panic!("round {round}: {e}"));
            current[i] = new;
        }
        assert_consistent(&tree);
        assert_eq!(tree.arena.len(), arena_before, "freed slots must be reused");
        for (i, b) in current.iter().enumerate() {
            assert!(tree.contains(b, &i));
        }

        for (i, b) in current.iter().enumerate().step_by(2) {
            assert!(tree.remove(b, &i));
        }
        assert_consistent(&tree);
        assert_eq!(tree.len(), current.len() / 2);
    }

    #[test]
    fn integer_scalars_support_point_queries() {
        let mut tree: AabbTree<i64, 2, u8> = AabbTree::new();
        tree.insert(Aabb::new([0, 0], [10, 10]), 1);
        tree.insert(Aabb::new([5, 5], [15, 15]), 2);
        let mut hits = tree.find_containers(&[6, 6]);
        hits.sort_unstable();
        assert_eq!(hits, vec![1, 2]);
        assert_eq!(tree.find_intersecting(&Aabb::new([11, 11], [12, 12])), vec![2]);
    }
}
