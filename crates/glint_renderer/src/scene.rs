//! Scene assembly: material arena, geometry, and the BVH built over it.

use crate::bvh::Bvh;
use crate::hittable::{HitRecord, Hittable, HittableList, Primitive};
use crate::material::{Material, MaterialId};
use glint_math::{Aabb, Interval, Ray, Vec3};
use thiserror::Error;

/// Errors raised while constructing scene content.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Sphere radius must be positive and finite, got {0}")]
    DegenerateSphere(f32),

    #[error("Quad edges {u} and {v} do not span a surface")]
    DegenerateQuad { u: Vec3, v: Vec3 },

    #[error("Box corners collapse to a point or line at {0}")]
    DegenerateBox(Vec3),

    #[error("Motion interval must satisfy time0 < time1, got [{time0}, {time1}]")]
    InvalidTimeInterval { time0: f32, time1: f32 },

    #[error("Refraction index must be positive and finite, got {0}")]
    InvalidRefractionIndex(f32),

    #[error("Material #{} is not registered in this scene", .0.index())]
    UnknownMaterial(MaterialId),

    #[error("Unknown material name: {0}")]
    UnknownMaterialName(String),

    #[error("Cannot build a BVH from an empty object list")]
    EmptyBvh,
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Collects materials and geometry, then freezes them into a `Scene`.
#[derive(Debug, Default)]
pub struct SceneBuilder {
    materials: Vec<Material>,
    objects: HittableList,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material and get the id geometry uses to refer to it.
    pub fn add_material(&mut self, material: impl Into<Material>) -> MaterialId {
        self.materials.push(material.into());
        MaterialId((self.materials.len() - 1) as u32)
    }

    /// Add a piece of geometry.
    pub fn add(&mut self, object: impl Into<Primitive>) -> &mut Self {
        self.objects.add(object);
        self
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Validate material references and build the BVH.
    ///
    /// A scene without geometry is allowed; every ray then misses.
    pub fn build(self) -> SceneResult<Scene> {
        if let Some(object) = self
            .objects
            .objects()
            .iter()
            .find(|o| o.material().index() >= self.materials.len())
        {
            return Err(SceneError::UnknownMaterial(object.material()));
        }

        let world = if self.objects.is_empty() {
            log::warn!("Scene has no geometry; only the background will be visible");
            None
        } else {
            Some(Bvh::new(self.objects.into_objects())?)
        };

        let scene = Scene {
            materials: self.materials,
            world,
        };
        log::info!(
            "Built scene: {} objects, {} materials",
            scene.object_count(),
            scene.materials.len()
        );
        Ok(scene)
    }
}

/// Immutable, thread-shareable scene ready for rendering.
#[derive(Debug, Clone)]
pub struct Scene {
    materials: Vec<Material>,
    world: Option<Bvh>,
}

impl Scene {
    pub fn builder() -> SceneBuilder {
        SceneBuilder::new()
    }

    /// Look up a material. Ids are validated when the scene is built.
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }

    pub fn object_count(&self) -> usize {
        self.world.as_ref().map_or(0, Bvh::len)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

impl Hittable for Scene {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.world.as_ref()?.hit(ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.world.as_ref().map_or(Aabb::EMPTY, Bvh::bounding_box)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cuboid, Lambertian, Metal, Sphere};

    #[test]
    fn test_build_scene_and_hit() {
        let mut builder = Scene::builder();
        let red = builder.add_material(Lambertian::new(Vec3::new(0.8, 0.1, 0.1)));
        let chrome = builder.add_material(Metal::new(Vec3::splat(0.9), 0.0));
        let block = Cuboid::new(Vec3::new(-1.0, -1.0, -4.0), Vec3::new(1.0, 1.0, -3.0), chrome);
        builder
            .add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, red).unwrap())
            .add(block.unwrap());
        let scene = builder.build().unwrap();

        assert_eq!(scene.object_count(), 2);
        assert_eq!(scene.material_count(), 2);

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = scene.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert_eq!(rec.material, red);
        assert!(matches!(scene.material(rec.material), Material::Lambertian(_)));

        let ray = Ray::new_simple(Vec3::new(0.8, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = scene.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert_eq!(rec.material, chrome);
        assert!((rec.t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_material_rejected() {
        let mut builder = Scene::builder();
        builder.add(Sphere::new(Vec3::ZERO, 1.0, MaterialId(3)).unwrap());

        assert_eq!(
            builder.build().unwrap_err(),
            SceneError::UnknownMaterial(MaterialId(3))
        );
    }

    #[test]
    fn test_empty_scene_misses_everything() {
        let scene = Scene::builder().build().unwrap();
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        assert_eq!(scene.object_count(), 0);
        assert!(scene.hit(&ray, Interval::UNIVERSE).is_none());
        assert_eq!(scene.bounding_box(), Aabb::EMPTY);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SceneError::DegenerateSphere(-1.0).to_string(),
            "Sphere radius must be positive and finite, got -1"
        );
        assert_eq!(
            SceneError::UnknownMaterial(MaterialId(7)).to_string(),
            "Material #7 is not registered in this scene"
        );
    }
}
