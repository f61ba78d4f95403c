//! Camera for ray generation.

use crate::{RenderError, RenderResult};
use glint_math::random::{random_in_unit_disk, random_range};
use glint_math::{Ray, Vec3};
use rand::RngCore;

/// Thin-lens camera with a shutter interval for motion blur.
///
/// Every `with_*` setter recomputes the viewport, so a camera is always
/// ready to generate rays.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,       // Vertical field of view in degrees
    aperture: f32,   // Lens diameter
    focus_dist: f32, // Distance from camera to plane of perfect focus
    aspect_ratio: f32,

    shutter_open: f32,
    shutter_close: f32,

    // Cached computed values (set by initialize())
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Create a camera at the origin looking down -Z with a 90 degree fov.
    pub fn new() -> Self {
        let mut camera = Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
            aspect_ratio: 16.0 / 9.0,
            shutter_open: 0.0,
            shutter_close: 0.0,
            origin: Vec3::ZERO,
            lower_left_corner: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            lens_radius: 0.0,
        };
        camera.initialize();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.initialize();
        self
    }

    /// Set lens settings. An aperture of 0 disables defocus blur.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture.max(0.0);
        self.focus_dist = focus_dist;
        self.initialize();
        self
    }

    /// Set the viewport aspect ratio (width / height).
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.initialize();
        self
    }

    /// Set the interval ray timestamps are drawn from.
    pub fn with_shutter(mut self, open: f32, close: f32) -> Self {
        self.shutter_open = open;
        self.shutter_close = close;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn look_from(&self) -> Vec3 {
        self.look_from
    }

    pub fn shutter(&self) -> (f32, f32) {
        (self.shutter_open, self.shutter_close)
    }

    /// Check that the lens settings describe a usable viewport.
    ///
    /// The field of view must lie strictly between 0 and 180 degrees, the
    /// focus distance and aspect ratio must be positive, and the aperture
    /// must be finite.
    pub fn validate(&self) -> RenderResult<()> {
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(RenderError::InvalidCamera(format!(
                "vertical field of view must be in (0, 180) degrees, got {}",
                self.vfov
            )));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return Err(RenderError::InvalidCamera(format!(
                "focus distance must be positive, got {}",
                self.focus_dist
            )));
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(RenderError::InvalidCamera(format!(
                "aspect ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        if !self.aperture.is_finite() {
            return Err(RenderError::InvalidCamera(format!(
                "aperture must be finite, got {}",
                self.aperture
            )));
        }
        Ok(())
    }

    fn initialize(&mut self) {
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = self.aspect_ratio * viewport_height;

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at)
            .try_normalize()
            .unwrap_or(Vec3::Z);
        self.u = self.vup.cross(self.w).try_normalize().unwrap_or(Vec3::X);
        self.v = self.w.cross(self.u);

        self.origin = self.look_from;
        self.horizontal = self.focus_dist * viewport_width * self.u;
        self.vertical = self.focus_dist * viewport_height * self.v;
        self.lower_left_corner =
            self.origin - self.horizontal / 2.0 - self.vertical / 2.0 - self.focus_dist * self.w;

        self.lens_radius = self.aperture / 2.0;
    }

    /// Generate a ray through viewport coordinates `(s, t)`, both in [0, 1]
    /// with `(0, 0)` at the lower left.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius <= 0.0 {
            Vec3::ZERO
        } else {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        };

        let ray_origin = self.origin + offset;
        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        let ray_time = random_range(rng, self.shutter_open, self.shutter_close);

        Ray::new(ray_origin, target - ray_origin, ray_time)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
