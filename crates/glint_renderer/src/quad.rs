//! Planar parallelogram primitive, the building block of boxes.

use crate::hittable::{HitRecord, Hittable};
use crate::scene::{SceneError, SceneResult};
use crate::MaterialId;
use glint_math::{Aabb, Interval, Ray, Vec3};

/// Rays whose direction is this close to the plane are treated as parallel.
const PARALLEL_EPSILON: f32 = 1e-8;

/// The parallelogram `corner + a * u + b * v` for `a, b` in [0, 1].
#[derive(Debug, Clone)]
pub struct Quad {
    corner: Vec3,
    u: Vec3,
    v: Vec3,
    /// Unit normal, `u x v` normalized
    normal: Vec3,
    /// Plane offset: normal . x = d
    d: f32,
    /// `n / (n . n)` for the unnormalized normal; projects hit points onto (a, b)
    w: Vec3,
    material: MaterialId,
    bbox: Aabb,
}

impl Quad {
    /// Create a quad from a corner and its two edge vectors.
    ///
    /// Edges that are zero or parallel do not span a surface and are rejected.
    pub fn new(corner: Vec3, u: Vec3, v: Vec3, material: MaterialId) -> SceneResult<Self> {
        let n = u.cross(v);
        let normal = n
            .try_normalize()
            .ok_or(SceneError::DegenerateQuad { u, v })?;

        // Both diagonals, so the box covers every corner
        let bbox_diagonal1 = Aabb::from_points(corner, corner + u + v);
        let bbox_diagonal2 = Aabb::from_points(corner + u, corner + v);

        Ok(Self {
            corner,
            u,
            v,
            normal,
            d: normal.dot(corner),
            w: n / n.dot(n),
            material,
            bbox: Aabb::surrounding(&bbox_diagonal1, &bbox_diagonal2),
        })
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Planar coordinates (a, b) of a point already on the plane,
    /// or `None` if it lies outside the parallelogram.
    fn interior(&self, planar_hitpt: Vec3) -> Option<(f32, f32)> {
        let alpha = self.w.dot(planar_hitpt.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hitpt));

        let unit = Interval::new(0.0, 1.0);
        (unit.contains(alpha) && unit.contains(beta)).then_some((alpha, beta))
    }
}

impl Hittable for Quad {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let denom = self.normal.dot(ray.direction());

        // No hit if the ray is parallel to the plane
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let intersection = ray.at(t);
        let uv = self.interior(intersection - self.corner)?;

        Some(HitRecord::new(ray, t, self.normal, self.material, uv))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
