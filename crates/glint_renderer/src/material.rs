//! Materials describe how light interacts with surfaces.

use crate::hittable::HitRecord;
use crate::scene::{SceneError, SceneResult};
use glint_math::random::{random_f32, random_in_unit_sphere, random_unit_vector};
use glint_math::{Ray, Vec3, Vec3Ext};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Index of a material inside the scene that owns it.
///
/// Obtained from `SceneBuilder::add_material`; geometry stores the id
/// instead of a pointer so scenes can be shared freely between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialId(pub(crate) u32);

impl MaterialId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A scattered ray and the color it is multiplied by.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// Light interaction shared by every material variant.
pub trait Scatter {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;

    /// Light emitted at the given surface coordinates and point.
    ///
    /// Most materials return black (no emission).
    fn emitted(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        Color::ZERO
    }
}

/// Closed set of materials a scene can contain.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
    DiffuseLight(DiffuseLight),
}

impl Scatter for Material {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match self {
            Material::Lambertian(m) => m.scatter(ray_in, rec, rng),
            Material::Metal(m) => m.scatter(ray_in, rec, rng),
            Material::Dielectric(m) => m.scatter(ray_in, rec, rng),
            Material::DiffuseLight(m) => m.scatter(ray_in, rec, rng),
        }
    }

    fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Material::DiffuseLight(m) => m.emitted(u, v, p),
            Material::Lambertian(_) | Material::Metal(_) | Material::Dielectric(_) => Color::ZERO,
        }
    }
}

impl From<Lambertian> for Material {
    fn from(m: Lambertian) -> Self {
        Material::Lambertian(m)
    }
}

impl From<Metal> for Material {
    fn from(m: Metal) -> Self {
        Material::Metal(m)
    }
}

impl From<Dielectric> for Material {
    fn from(m: Dielectric) -> Self {
        Material::Dielectric(m)
    }
}

impl From<DiffuseLight> for Material {
    fn from(m: DiffuseLight) -> Self {
        Material::DiffuseLight(m)
    }
}

/// Serialized form of a material, as found in scene description files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDescription {
    Lambertian { albedo: Color },
    Metal { albedo: Color, fuzz: f32 },
    Dielectric { refraction_index: f32 },
    DiffuseLight { emit: Color },
}

impl TryFrom<&MaterialDescription> for Material {
    type Error = SceneError;

    fn try_from(desc: &MaterialDescription) -> SceneResult<Self> {
        Ok(match *desc {
            MaterialDescription::Lambertian { albedo } => Lambertian::new(albedo).into(),
            MaterialDescription::Metal { albedo, fuzz } => Metal::new(albedo, fuzz).into(),
            MaterialDescription::Dielectric { refraction_index } => {
                Dielectric::new(refraction_index)?.into()
            }
            MaterialDescription::DiffuseLight { emit } => DiffuseLight::new(emit).into(),
        })
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material; albedo is clamped to [0, 1].
    pub fn new(albedo: Color) -> Self {
        Self {
            albedo: albedo.clamp(Color::ZERO, Color::ONE),
        }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }
}

impl Scatter for Lambertian {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if scatter_direction.near_zero() {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scatter_direction, ray_in.time()),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone, PartialEq)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal, clamped to [0, 1]
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo: albedo.clamp(Color::ZERO, Color::ONE),
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }
}

impl Scatter for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let unit_direction = ray_in.direction().try_normalize()?;
        let mut scattered_dir = unit_direction.reflect(rec.normal);
        if self.fuzz > 0.0 {
            scattered_dir += self.fuzz * random_in_unit_sphere(rng);
        }

        // Fuzz can push the reflection below the surface; absorb those
        if scattered_dir.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scattered_dir, ray_in.time()),
        })
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone, PartialEq)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> SceneResult<Self> {
        if !(ior.is_finite() && ior > 0.0) {
            return Err(SceneError::InvalidRefractionIndex(ior));
        }
        Ok(Self { ior })
    }

    pub fn refraction_index(&self) -> f32 {
        self.ior
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Scatter for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let attenuation = Color::ONE;
        let refraction_ratio = if rec.front_face { 1.0 / self.ior } else { self.ior };
        let unit_direction = ray_in.direction().try_normalize()?;

        // Index-matched interface: nothing to reflect from, the ray passes straight through
        let direction = if refraction_ratio == 1.0 {
            unit_direction
        } else {
            let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
            let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

            // Total internal reflection
            let cannot_refract = refraction_ratio * sin_theta > 1.0;

            if cannot_refract || Self::reflectance(cos_theta, refraction_ratio) > random_f32(rng) {
                unit_direction.reflect(rec.normal)
            } else {
                unit_direction.refract(rec.normal, refraction_ratio)
            }
        };

        Some(ScatterResult {
            attenuation,
            scattered: Ray::new(rec.p, direction, ray_in.time()),
        })
    }
}

/// Diffuse light emitter.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffuseLight {
    emit: Color,
}

impl DiffuseLight {
    /// Create a new diffuse light; negative components are raised to zero.
    pub fn new(emit: Color) -> Self {
        Self {
            emit: emit.max(Color::ZERO),
        }
    }
}

impl Scatter for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        // Lights don't scatter rays
        None
    }

    fn emitted(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.emit
    }
}
