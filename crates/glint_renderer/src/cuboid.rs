//! Axis-aligned box built from six quads.

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::scene::{SceneError, SceneResult};
use crate::{MaterialId, Quad};
use glint_math::{Aabb, Interval, Ray, Vec3};

/// An axis-aligned box. Intersection is delegated to its six faces.
#[derive(Debug, Clone)]
pub struct Cuboid {
    sides: HittableList,
    material: MaterialId,
}

impl Cuboid {
    /// Create the box spanned by two opposite corners, given in any order.
    pub fn new(a: Vec3, b: Vec3, material: MaterialId) -> SceneResult<Self> {
        if a == b {
            return Err(SceneError::DegenerateBox(a));
        }

        let min = a.min(b);
        let max = a.max(b);

        let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
        let dy = Vec3::new(0.0, max.y - min.y, 0.0);
        let dz = Vec3::new(0.0, 0.0, max.z - min.z);

        let faces = [
            (Vec3::new(min.x, min.y, max.z), dx, dy),  // front
            (Vec3::new(max.x, min.y, max.z), -dz, dy), // right
            (Vec3::new(max.x, min.y, min.z), -dx, dy), // back
            (Vec3::new(min.x, min.y, min.z), dz, dy),  // left
            (Vec3::new(min.x, max.y, max.z), dx, -dz), // top
            (Vec3::new(min.x, min.y, min.z), dx, dz),  // bottom
        ];

        let mut sides = HittableList::new();
        for (corner, u, v) in faces {
            // A flat box still has the four faces that span its plane
            match Quad::new(corner, u, v, material) {
                Ok(quad) => sides.add(quad),
                Err(SceneError::DegenerateQuad { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        if sides.is_empty() {
            return Err(SceneError::DegenerateBox(min));
        }

        Ok(Self { sides, material })
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }
}

impl Hittable for Cuboid {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.sides.hit(ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.sides.bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: Interval = Interval {
        min: 0.001,
        max: f32::INFINITY,
    };

    fn unit_cube() -> Cuboid {
        Cuboid::new(Vec3::splat(1.0), Vec3::splat(-1.0), MaterialId::default()).unwrap()
    }

    #[test]
    fn test_cube_has_six_faces() {
        assert_eq!(unit_cube().sides.len(), 6);
    }

    #[test]
    fn test_cube_hit_from_each_axis() {
        let cube = unit_cube();
        for axis in [Vec3::X, Vec3::Y, Vec3::Z, -Vec3::X, -Vec3::Y, -Vec3::Z] {
            let ray = Ray::new_simple(axis * 5.0, -axis);
            let rec = cube.hit(&ray, RANGE).unwrap();

            assert!((rec.t - 4.0).abs() < 1e-5, "axis {axis:?} t {}", rec.t);
            assert!((rec.normal - axis).length() < 1e-5);
            assert!(rec.front_face);
        }
    }

    #[test]
    fn test_cube_hit_from_inside() {
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = unit_cube().hit(&ray, RANGE).unwrap();

        assert!((rec.t - 1.0).abs() < 1e-5);
        assert!(!rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_cube_miss() {
        let ray = Ray::new_simple(Vec3::new(2.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(unit_cube().hit(&ray, RANGE).is_none());
    }

    #[test]
    fn test_cube_bbox() {
        let bbox = unit_cube().bounding_box();
        assert_eq!(bbox.min(), Vec3::splat(-1.0));
        assert_eq!(bbox.max(), Vec3::splat(1.0));
    }

    #[test]
    fn test_coincident_corners_rejected() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(matches!(
            Cuboid::new(p, p, MaterialId::default()),
            Err(SceneError::DegenerateBox(_))
        ));

        // Collapsed along two axes: a segment has no faces at all
        let segment = Cuboid::new(Vec3::ZERO, Vec3::X, MaterialId::default());
        assert!(segment.is_err());
    }

    #[test]
    fn test_flat_box_is_still_hittable() {
        let slab = Cuboid::new(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            MaterialId::default(),
        )
        .unwrap();
        let ray = Ray::new_simple(Vec3::new(0.0, 3.0, 0.0), -Vec3::Y);
        let rec = slab.hit(&ray, RANGE).unwrap();
        assert!((rec.t - 3.0).abs() < 1e-5);
    }
}
