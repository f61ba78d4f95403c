//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Primitives and nodes live in two flat arenas and refer to each other by
//! index, so the tree owns everything it traverses and is built exactly once.
//!
//! Split policy: sort by bounding-box centroid along the longest axis of the
//! centroid bounds and split at the median.

use crate::hittable::{HitRecord, Hittable, Primitive};
use crate::scene::{SceneError, SceneResult};
use glint_math::{Aabb, Interval, Ray};
use std::cmp::Ordering;

/// Child slot of a BVH node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Child {
    /// Index into `Bvh::nodes`
    Node(u32),
    /// Index into `Bvh::primitives`
    Primitive(u32),
}

#[derive(Debug, Clone)]
struct BvhNode {
    bbox: Aabb,
    left: Child,
    right: Child,
}

/// Binary tree of bounding boxes over a fixed set of primitives.
#[derive(Debug, Clone)]
pub struct Bvh {
    primitives: Vec<Primitive>,
    nodes: Vec<BvhNode>,
    root: u32,
}

impl Bvh {
    /// Build a BVH over the given primitives. The list must not be empty.
    pub fn new(primitives: Vec<Primitive>) -> SceneResult<Self> {
        if primitives.is_empty() {
            return Err(SceneError::EmptyBvh);
        }

        let boxes: Vec<Aabb> = primitives.iter().map(|p| p.bounding_box()).collect();
        let mut indices: Vec<u32> = (0..primitives.len() as u32).collect();
        let mut nodes = Vec::with_capacity(primitives.len());

        let root = build(&boxes, &mut nodes, &mut indices);

        let bvh = Self {
            primitives,
            nodes,
            root,
        };
        log::debug!(
            "Built BVH: {} primitives, {} nodes, depth {}",
            bvh.primitives.len(),
            bvh.nodes.len(),
            bvh.depth()
        );
        Ok(bvh)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Number of node levels from the root to the deepest node.
    pub fn depth(&self) -> usize {
        self.node_depth(self.root)
    }

    fn node_depth(&self, index: u32) -> usize {
        let node = &self.nodes[index as usize];
        let child_depth = |child: Child| match child {
            Child::Node(i) => self.node_depth(i),
            Child::Primitive(_) => 0,
        };
        1 + child_depth(node.left).max(child_depth(node.right))
    }

    fn hit_child(&self, child: Child, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match child {
            Child::Node(i) => self.hit_node(i, ray, ray_t),
            Child::Primitive(i) => self.primitives[i as usize].hit(ray, ray_t),
        }
    }

    fn hit_node(&self, index: u32, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let node = &self.nodes[index as usize];
        if !node.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.hit_child(node.left, ray, ray_t);

        // Only check right up to closest hit
        let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
        let hit_right = self.hit_child(node.right, ray, ray_t.with_max(right_max));

        hit_right.or(hit_left)
    }
}

/// Recursively build the subtree over `indices`, returning its node index.
fn build(boxes: &[Aabb], nodes: &mut Vec<BvhNode>, indices: &mut [u32]) -> u32 {
    // Choose split axis based on centroid spread
    let centroid_bounds = indices.iter().fold(Aabb::EMPTY, |acc, &i| {
        let c = boxes[i as usize].centroid();
        Aabb::surrounding(&acc, &Aabb::from_points(c, c))
    });
    let axis = centroid_bounds.longest_axis();
    let key = |i: u32| boxes[i as usize].centroid()[axis];
    let compare = |a: &u32, b: &u32| key(*a).total_cmp(&key(*b));

    let (left, right) = match indices.len() {
        // A single primitive fills both slots
        1 => (Child::Primitive(indices[0]), Child::Primitive(indices[0])),
        2 => {
            let (a, b) = (indices[0], indices[1]);
            if compare(&a, &b) == Ordering::Greater {
                (Child::Primitive(b), Child::Primitive(a))
            } else {
                (Child::Primitive(a), Child::Primitive(b))
            }
        }
        n => {
            indices.sort_unstable_by(compare);
            let (lower, upper) = indices.split_at_mut(n / 2);
            (
                Child::Node(build(boxes, nodes, lower)),
                Child::Node(build(boxes, nodes, upper)),
            )
        }
    };

    let child_box = |child: Child, nodes: &[BvhNode]| match child {
        Child::Node(i) => nodes[i as usize].bbox,
        Child::Primitive(i) => boxes[i as usize],
    };
    let bbox = Aabb::surrounding(
        &child_box(left, nodes.as_slice()),
        &child_box(right, nodes.as_slice()),
    );

    nodes.push(BvhNode { bbox, left, right });
    (nodes.len() - 1) as u32
}

impl Hittable for Bvh {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.hit_node(self.root, ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.nodes[self.root as usize].bbox
    }
}
