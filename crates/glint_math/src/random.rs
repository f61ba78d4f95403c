//! Random sampling helpers.
//!
//! Every function takes the generator explicitly so each render worker can
//! own an independent, deterministically seeded stream.

use crate::{Vec3, Vec3Ext};
use rand::{Rng, RngCore};

/// Uniform sample in [0, 1).
#[inline]
pub fn random_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniform sample in [min, max). Returns `min` when the range is empty.
#[inline]
pub fn random_range(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * random_f32(rng)
}

/// Vector with each component uniform in [0, 1).
pub fn random_vec(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(random_f32(rng), random_f32(rng), random_f32(rng))
}

/// Vector with each component uniform in [min, max).
pub fn random_vec_range(rng: &mut dyn RngCore, min: f32, max: f32) -> Vec3 {
    Vec3::new(
        random_range(rng, min, max),
        random_range(rng, min, max),
        random_range(rng, min, max),
    )
}

/// Uniform point strictly inside the unit sphere (rejection sampling).
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_vec_range(rng, -1.0, 1.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_in_unit_sphere(rng);
        // Reject points too close to the center to normalize safely
        if !p.near_zero() {
            return p.normalize();
        }
    }
}

/// Uniform point strictly inside the unit disk in the XY plane.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(random_range(rng, -1.0, 1.0), random_range(rng, -1.0, 1.0), 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform direction on the hemisphere around `normal`.
pub fn random_on_hemisphere(rng: &mut dyn RngCore, normal: Vec3) -> Vec3 {
    let on_unit_sphere = random_unit_vector(rng);
    if on_unit_sphere.dot(normal) > 0.0 {
        on_unit_sphere
    } else {
        -on_unit_sphere
    }
}
