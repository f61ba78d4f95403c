//! Sphere primitive for ray tracing, optionally moving for motion blur.

use crate::hittable::{HitRecord, Hittable};
use crate::scene::{SceneError, SceneResult};
use crate::MaterialId;
use glint_math::{Aabb, Interval, Ray, Vec3};
use std::f32::consts::PI;

/// Linear motion of a sphere's center across `[time0, time1]`.
#[derive(Debug, Clone, Copy)]
struct Motion {
    /// center1 - center0
    displacement: Vec3,
    time0: f32,
    inv_duration: f32,
}

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    motion: Option<Motion>,
    radius: f32,
    material: MaterialId,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new stationary sphere. The radius must be positive.
    pub fn new(center: Vec3, radius: f32, material: MaterialId) -> SceneResult<Self> {
        check_radius(radius)?;
        let rvec = Vec3::splat(radius);

        Ok(Self {
            center,
            motion: None,
            radius,
            material,
            bbox: Aabb::from_points(center - rvec, center + rvec),
        })
    }

    /// Create a sphere moving from `center0` at `time0` to `center1` at `time1`.
    ///
    /// The bounding box covers the sphere over the whole interval.
    pub fn moving(
        center0: Vec3,
        center1: Vec3,
        time0: f32,
        time1: f32,
        radius: f32,
        material: MaterialId,
    ) -> SceneResult<Self> {
        check_radius(radius)?;
        if !(time0.is_finite() && time1.is_finite() && time0 < time1) {
            return Err(SceneError::InvalidTimeInterval { time0, time1 });
        }

        let rvec = Vec3::splat(radius);
        let box0 = Aabb::from_points(center0 - rvec, center0 + rvec);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);

        Ok(Self {
            center: center0,
            motion: Some(Motion {
                displacement: center1 - center0,
                time0,
                inv_duration: 1.0 / (time1 - time0),
            }),
            radius,
            material,
            bbox: Aabb::surrounding(&box0, &box1),
        })
    }

    /// Center of the sphere at the given time.
    ///
    /// Times outside the motion interval extrapolate linearly.
    pub fn center(&self, time: f32) -> Vec3 {
        match self.motion {
            Some(m) => self.center + (time - m.time0) * m.inv_duration * m.displacement,
            None => self.center,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle up from -Y
        // phi: angle around Y axis from -X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

fn check_radius(radius: f32) -> SceneResult<()> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(SceneError::DegenerateSphere(radius))
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let center = self.center(ray.time());
        let oc = center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.contains(root) {
            root = (h + sqrtd) / a;
            if !ray_t.contains(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - center) / self.radius;
        Some(HitRecord::new(
            ray,
            root,
            outward_normal,
            self.material,
            Self::get_sphere_uv(outward_normal),
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: Interval = Interval {
        min: 0.001,
        max: f32::INFINITY,
    };

    fn unit_sphere_ahead() -> Sphere {
        Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, MaterialId::default()).unwrap()
    }

    #[test]
    fn test_sphere_hit_smaller_root() {
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = unit_sphere_ahead().hit(&ray, RANGE).unwrap();

        assert!((rec.t - 0.5).abs() < 1e-5);
        assert!((rec.p - Vec3::new(0.0, 0.0, -0.5)).length() < 1e-5);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
        assert!(rec.front_face);
    }

    #[test]
    fn test_sphere_hit_off_axis() {
        // Closest approach 0.3 < radius 0.5
        let sphere = unit_sphere_ahead();
        let ray = Ray::new_simple(Vec3::new(0.3, 0.0, 2.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = sphere.hit(&ray, RANGE).unwrap();

        // z = -1 + sqrt(0.25 - 0.09) = -0.6
        assert!((rec.t - 2.6).abs() < 1e-4);
        assert!((rec.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere_ahead();

        // Pointing away
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.hit(&ray, RANGE).is_none());

        // Closest approach 0.6 > radius 0.5
        let ray = Ray::new_simple(Vec3::new(0.6, 0.0, 2.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.hit(&ray, RANGE).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_root() {
        let ray = Ray::new_simple(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = unit_sphere_ahead().hit(&ray, RANGE).unwrap();

        assert!((rec.t - 0.5).abs() < 1e-5);
        assert!(!rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_uv() {
        let (u, v) = Sphere::get_sphere_uv(Vec3::new(1.0, 0.0, 0.0));
        assert!((u - 0.5).abs() < 1e-5);
        assert!((v - 0.5).abs() < 1e-5);

        let (_, v) = Sphere::get_sphere_uv(Vec3::new(0.0, 1.0, 0.0));
        assert!((v - 1.0).abs() < 1e-5);

        let (u, v) = Sphere::get_sphere_uv(Vec3::new(0.0, 0.0, 1.0));
        assert!((u - 0.25).abs() < 1e-5);
        assert!((v - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_radius_rejected() {
        let mat = MaterialId::default();
        assert!(matches!(
            Sphere::new(Vec3::ZERO, 0.0, mat),
            Err(SceneError::DegenerateSphere(r)) if r == 0.0
        ));
        assert!(Sphere::new(Vec3::ZERO, -1.0, mat).is_err());
        assert!(Sphere::new(Vec3::ZERO, f32::NAN, mat).is_err());
    }

    #[test]
    fn test_moving_sphere_center_and_bbox() {
        let sphere = Sphere::moving(
            Vec3::ZERO,
            Vec3::new(0.0, 2.0, 0.0),
            0.0,
            1.0,
            0.5,
            MaterialId::default(),
        )
        .unwrap();

        assert_eq!(sphere.center(0.5), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(sphere.bounding_box().y, Interval::new(-0.5, 2.5));

        // The same ray hits early in the shutter and misses once the sphere moved away
        let early = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let late = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 1.0);
        assert!(sphere.hit(&early, RANGE).is_some());
        assert!(sphere.hit(&late, RANGE).is_none());
    }

    #[test]
    fn test_moving_sphere_rejects_bad_interval() {
        let result = Sphere::moving(Vec3::ZERO, Vec3::X, 1.0, 1.0, 0.5, MaterialId::default());
        assert!(matches!(result, Err(SceneError::InvalidTimeInterval { .. })));
    }
}
