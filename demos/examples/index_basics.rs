// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! AABB tree basics.
//!
//! Insert a few boxes, pick with a ray, move a box, and probe a point.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p canopy_demos --example index_basics`

use canopy_index::{Aabb, AabbTree, IndexError, Ray, SpatialIndex};

fn main() {
    env_logger::init();

    let mut idx: AabbTree<f64, 3, u32> = AabbTree::new();
    idx.insert(Aabb::new([0.0; 3], [1.0; 3]), 1);
    idx.insert(Aabb::new([5.0; 3], [6.0; 3]), 2);
    idx.insert(Aabb::new([10.0; 3], [11.0; 3]), 3);
    println!("len={} height={} bounds={:?}", idx.len(), idx.height(), idx.bounds());

    // A ray along +x at y = z = 5.5 only crosses the middle box.
    let ray = Ray::new([-10.0, 5.5, 5.5], [1.0, 0.0, 0.0]);
    let hits = idx.find_intersectors(&ray);
    println!("ray hits: {hits:?}");
    assert_eq!(hits, vec![2]);

    // Move box 1; the old bounds identify the entry.
    idx.update(&Aabb::new([0.0; 3], [1.0; 3]), Aabb::new([2.0; 3], [3.0; 3]), 1)
        .expect("box 1 is indexed at its old bounds");
    println!("containers of (2.5, 2.5, 2.5): {:?}", idx.find_containers(&[2.5; 3]));

    // An update for an entry that does not exist leaves the index unchanged.
    let missing = idx.update(&Aabb::new([0.0; 3], [1.0; 3]), Aabb::new([2.0; 3], [3.0; 3]), 99);
    assert_eq!(missing, Err(IndexError::NotFound));
    println!("update of unknown entry: {missing:?}, len still {}", idx.len());

    // Bulk rebuild.
    let boxes = (0..100_u32).map(|i| {
        let lo = f64::from(i) * 2.0;
        (Aabb::new([lo; 3], [lo + 1.0; 3]), i)
    });
    idx.clear_and_build(boxes);
    println!("after rebuild: len={} height={}", idx.len(), idx.height());
}
