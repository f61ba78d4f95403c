//! Glint - CPU Path Tracing
//!
//! A Monte Carlo path tracer: spheres, quads and boxes behind a BVH,
//! four physically-motivated materials, a thin-lens camera with motion
//! blur, and a row-parallel renderer with reproducible seeding.
//!
//! Scenes are assembled with [`SceneBuilder`], taken from a built-in
//! [`PresetKind`], or loaded from a JSON [`SceneDescription`].

mod bvh;
mod camera;
mod cuboid;
mod description;
mod hittable;
mod material;
mod output;
mod presets;
mod quad;
mod renderer;
mod scene;
mod sphere;

pub use bvh::Bvh;
pub use camera::Camera;
pub use cuboid::Cuboid;
pub use description::{
    CameraDescription, DescriptionError, DescriptionResult, ObjectDescription, RenderSettings,
    SceneDescription,
};
pub use hittable::{HitRecord, Hittable, HittableList, Primitive};
pub use material::{
    Color, Dielectric, DiffuseLight, Lambertian, Material, MaterialDescription, MaterialId, Metal,
    Scatter, ScatterResult,
};
pub use output::{ImageBuffer, OutputError, OutputResult};
pub use presets::{build_preset, ParsePresetError, Preset, PresetKind};
pub use quad::Quad;
pub use renderer::{
    color_to_rgb, linear_to_gamma, ray_color, render, render_pixel, render_with_progress,
    Background, RenderConfig, RenderError, RenderProgress, RenderResult, MAX_IMAGE_PIXELS,
};
pub use scene::{Scene, SceneBuilder, SceneError, SceneResult};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from glint_math
pub use glint_math::{Aabb, Interval, Ray, Vec3};
