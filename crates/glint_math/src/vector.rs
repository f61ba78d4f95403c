// Scattering helpers for glam::Vec3
//
// glam already covers arithmetic, dot/cross and normalization; these are the
// optics operations the materials need on top of that.

use glam::Vec3;

/// Components smaller than this are treated as zero by `near_zero`.
const NEAR_ZERO_EPSILON: f32 = 1e-8;

/// Extension trait for Vec3 with reflection/refraction utilities.
pub trait Vec3Ext {
    /// True if every component is (almost) zero.
    ///
    /// Normalizing such a vector would produce NaNs.
    fn near_zero(&self) -> bool;

    /// Mirror this vector about the surface normal `n` (unit length).
    fn reflect(&self, n: Vec3) -> Vec3;

    /// Refract this unit vector through a surface with unit normal `n`,
    /// where `etai_over_etat` is the ratio of refractive indices.
    ///
    /// Callers must rule out total internal reflection first.
    fn refract(&self, n: Vec3, etai_over_etat: f32) -> Vec3;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn near_zero(&self) -> bool {
        self.abs().max_element() < NEAR_ZERO_EPSILON
    }

    #[inline]
    fn reflect(&self, n: Vec3) -> Vec3 {
        *self - 2.0 * self.dot(n) * n
    }

    #[inline]
    fn refract(&self, n: Vec3, etai_over_etat: f32) -> Vec3 {
        let cos_theta = (-*self).dot(n).min(1.0);
        let r_out_perp = etai_over_etat * (*self + cos_theta * n);
        let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
        r_out_perp + r_out_parallel
    }
}
