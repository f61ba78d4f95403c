//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Cuboid, MaterialId, Quad, Sphere};
use glint_math::{Aabb, Interval, Ray, Vec3};

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: MaterialId,
    /// Surface parametrization
    pub u: f32,
    pub v: f32,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl HitRecord {
    /// Build a record from the ray parameter and the geometric outward normal.
    ///
    /// `outward_normal` must be unit length.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        material: MaterialId,
        (u, v): (f32, f32),
    ) -> Self {
        // If the ray and normal point in the same direction, we're inside
        let front_face = ray.direction().dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            p: ray.at(t),
            normal,
            material,
            u,
            v,
            t,
            front_face,
        }
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Closest intersection with a parameter inside `ray_t`, if any.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord>;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// Any single piece of scene geometry.
#[derive(Debug, Clone)]
pub enum Primitive {
    Sphere(Sphere),
    Quad(Quad),
    Cuboid(Cuboid),
}

impl Primitive {
    /// Material every surface of this primitive uses.
    pub fn material(&self) -> MaterialId {
        match self {
            Primitive::Sphere(s) => s.material(),
            Primitive::Quad(q) => q.material(),
            Primitive::Cuboid(c) => c.material(),
        }
    }
}

impl Hittable for Primitive {
    #[inline]
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match self {
            Primitive::Sphere(s) => s.hit(ray, ray_t),
            Primitive::Quad(q) => q.hit(ray, ray_t),
            Primitive::Cuboid(c) => c.hit(ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::Quad(q) => q.bounding_box(),
            Primitive::Cuboid(c) => c.bounding_box(),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}

impl From<Quad> for Primitive {
    fn from(q: Quad) -> Self {
        Primitive::Quad(q)
    }
}

impl From<Cuboid> for Primitive {
    fn from(c: Cuboid) -> Self {
        Primitive::Cuboid(c)
    }
}

/// An unordered list of primitives, tested by brute force.
#[derive(Debug, Clone)]
pub struct HittableList {
    objects: Vec<Primitive>,
    bbox: Aabb,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Into<Primitive>) {
        let object = object.into();
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[Primitive] {
        &self.objects
    }

    /// Take the primitives out, e.g. to hand them to a BVH.
    pub fn into_objects(self) -> Vec<Primitive> {
        self.objects
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Primitive> for HittableList {
    fn from_iter<I: IntoIterator<Item = Primitive>>(iter: I) -> Self {
        let mut list = HittableList::new();
        for object in iter {
            list.add(object);
        }
        list
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;

        for object in &self.objects {
            // Only hits at least as close as the best so far can replace it
            let interval = ray_t.with_max(closest.map_or(ray_t.max, |rec| rec.t));
            if let Some(rec) = object.hit(ray, interval) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
