//! Built-in demo scenes.
//!
//! Every preset draws its random content from the generator it is given,
//! so a preset rendered with the same seed is always the same scene.

use crate::{
    Background, Camera, Color, Cuboid, Dielectric, DiffuseLight, Lambertian, Metal, Scene,
    SceneBuilder, SceneResult, Sphere,
};
use glint_math::random::{random_f32, random_range, random_vec, random_vec_range};
use glint_math::Vec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresetKind {
    RandomSpheres,
    BouncingSpheres,
    SimpleLight,
    TwoSpheres,
    Pyramid,
    MaterialShowcase,
}

impl PresetKind {
    pub const ALL: [PresetKind; 6] = [
        PresetKind::RandomSpheres,
        PresetKind::BouncingSpheres,
        PresetKind::SimpleLight,
        PresetKind::TwoSpheres,
        PresetKind::Pyramid,
        PresetKind::MaterialShowcase,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PresetKind::RandomSpheres => "random-spheres",
            PresetKind::BouncingSpheres => "bouncing-spheres",
            PresetKind::SimpleLight => "simple-light",
            PresetKind::TwoSpheres => "two-spheres",
            PresetKind::Pyramid => "pyramid",
            PresetKind::MaterialShowcase => "material-showcase",
        }
    }

    /// Comma-separated list of every preset name.
    pub fn names() -> String {
        PresetKind::ALL.map(PresetKind::name).join(", ")
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown preset '{0}' (expected one of: {})", PresetKind::names())]
pub struct ParsePresetError(String);

impl FromStr for PresetKind {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ParsePresetError(s.to_string()))
    }
}

/// A ready-to-render scene with the camera and background it was framed for.
#[derive(Debug, Clone)]
pub struct Preset {
    pub scene: Scene,
    pub camera: Camera,
    pub background: Background,
}

/// Build a preset scene for the given viewport aspect ratio.
pub fn build_preset(
    kind: PresetKind,
    aspect_ratio: f32,
    rng: &mut dyn RngCore,
) -> SceneResult<Preset> {
    log::info!("Building preset '{kind}'");
    let camera = Camera::new().with_aspect_ratio(aspect_ratio);

    let preset = match kind {
        PresetKind::RandomSpheres => Preset {
            scene: random_spheres(rng, false)?,
            camera: spheres_camera(camera),
            background: Background::Sky,
        },
        PresetKind::BouncingSpheres => Preset {
            scene: random_spheres(rng, true)?,
            camera: spheres_camera(camera).with_shutter(0.0, 1.0),
            background: Background::Sky,
        },
        PresetKind::SimpleLight => Preset {
            scene: simple_light()?,
            camera: camera
                .with_position(Vec3::new(26.0, 3.0, 6.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y)
                .with_lens(20.0, 0.0, 10.0),
            background: Background::Solid(Color::ZERO),
        },
        PresetKind::TwoSpheres => Preset {
            scene: two_spheres()?,
            camera: camera
                .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
                .with_lens(20.0, 0.0, 10.0),
            background: Background::Sky,
        },
        PresetKind::Pyramid => Preset {
            scene: pyramid(rng)?,
            camera: camera
                .with_position(Vec3::new(6.0, 10.0, 12.0), Vec3::ZERO, Vec3::Y)
                .with_lens(20.0, 0.0, 1.0),
            background: Background::Sky,
        },
        PresetKind::MaterialShowcase => Preset {
            scene: material_showcase()?,
            camera: camera
                .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
                .with_lens(90.0, 0.0, 1.0),
            background: Background::Sky,
        },
    };
    Ok(preset)
}

fn spheres_camera(camera: Camera) -> Camera {
    camera
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.1, 10.0)
}

/// Ground plane, a 22x22 grid of small spheres and three large ones.
///
/// With `bouncing`, the diffuse spheres rise over the shutter interval.
fn random_spheres(rng: &mut dyn RngCore, bouncing: bool) -> SceneResult<Scene> {
    let mut builder = SceneBuilder::new();

    let ground = builder.add_material(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    builder.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground)?);

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = random_f32(rng);
            let center = Vec3::new(
                a as f32 + 0.9 * random_f32(rng),
                0.2,
                b as f32 + 0.9 * random_f32(rng),
            );

            // Keep clear of the big metal sphere
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                // diffuse
                let albedo = random_vec(rng) * random_vec(rng);
                let material = builder.add_material(Lambertian::new(albedo));
                if bouncing {
                    let center1 = center + Vec3::new(0.0, random_range(rng, 0.0, 0.5), 0.0);
                    builder.add(Sphere::moving(center, center1, 0.0, 1.0, 0.2, material)?);
                } else {
                    builder.add(Sphere::new(center, 0.2, material)?);
                }
            } else if choose_mat < 0.95 {
                // metal
                let albedo = random_vec_range(rng, 0.5, 1.0);
                let fuzz = random_range(rng, 0.0, 0.5);
                let material = builder.add_material(Metal::new(albedo, fuzz));
                builder.add(Sphere::new(center, 0.2, material)?);
            } else {
                // glass
                let material = builder.add_material(Dielectric::new(1.5)?);
                builder.add(Sphere::new(center, 0.2, material)?);
            }
        }
    }

    let glass = builder.add_material(Dielectric::new(1.5)?);
    builder.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass)?);

    let diffuse = builder.add_material(Lambertian::new(Color::new(0.4, 0.2, 0.1)));
    builder.add(Sphere::new(Vec3::new(-4.0, 1.0, 0.0), 1.0, diffuse)?);

    let metal = builder.add_material(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0));
    builder.add(Sphere::new(Vec3::new(4.0, 1.0, 0.0), 1.0, metal)?);

    builder.build()
}

fn simple_light() -> SceneResult<Scene> {
    let mut builder = SceneBuilder::new();

    let material = builder.add_material(Lambertian::new(Color::new(0.2, 0.2, 0.7)));
    let red = builder.add_material(DiffuseLight::new(Color::new(1.0, 0.0, 0.0)));
    let green = builder.add_material(DiffuseLight::new(Color::new(0.0, 1.0, 0.0)));
    let blue = builder.add_material(DiffuseLight::new(Color::new(0.0, 0.0, 1.0)));

    builder
        .add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, material)?)
        .add(Sphere::new(Vec3::new(-3.0, 2.0, 2.0), 2.0, red)?)
        .add(Sphere::new(Vec3::new(3.0, 2.0, 2.0), 2.0, green)?)
        .add(Sphere::new(Vec3::new(0.0, 6.0, 6.0), 2.0, blue)?)
        .add(Sphere::new(Vec3::new(0.0, 2.0, 2.0), 2.0, material)?);

    builder.build()
}

fn two_spheres() -> SceneResult<Scene> {
    let mut builder = SceneBuilder::new();

    let material = builder.add_material(Lambertian::new(Color::new(0.2, 0.2, 0.7)));
    builder
        .add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, material)?)
        .add(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, material)?);

    builder.build()
}

/// Stepped pyramid of randomly colored cubes on a ground slab.
fn pyramid(rng: &mut dyn RngCore) -> SceneResult<Scene> {
    const STEP: f32 = 0.4;
    const HALF: f32 = 0.2;

    let mut builder = SceneBuilder::new();

    let ground = builder.add_material(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    builder.add(Cuboid::new(
        Vec3::new(-15.0, -3.0, -15.0),
        Vec3::new(15.0, 0.0, 15.0),
        ground,
    )?);

    // Each level is one step narrower on every side
    for level in 0..7 {
        let k = HALF + STEP * level as f32;
        let start = -3.0 + k;
        let count = (((3.0 - k) - start) / STEP - 1e-3).ceil() as usize;

        for a in 0..count {
            for b in 0..count {
                let center = Vec3::new(start + STEP * a as f32, k, start + STEP * (b + 1) as f32);
                let color = random_vec(rng) * random_vec(rng);
                let material = builder.add_material(Lambertian::new(color));
                builder.add(Cuboid::new(
                    center - Vec3::splat(HALF),
                    center + Vec3::splat(HALF),
                    material,
                )?);
            }
        }
    }

    builder.build()
}

/// A row of spheres covering every material, including unusual refraction indices.
fn material_showcase() -> SceneResult<Scene> {
    let mut builder = SceneBuilder::new();

    let yellow = builder.add_material(Lambertian::new(Color::new(0.8, 0.8, 0.0)));
    let purple = builder.add_material(Lambertian::new(Color::new(0.2, 0.1, 0.6)));
    let green_mirror = builder.add_material(Metal::new(Color::new(0.2, 0.6, 0.2), 0.0));
    let inverted = builder.add_material(Dielectric::new(0.5)?);
    let ice = builder.add_material(Dielectric::new(1.31)?);
    let diamond = builder.add_material(Dielectric::new(2.417)?);
    let air = builder.add_material(Dielectric::new(1.01)?);
    let dense = builder.add_material(Dielectric::new(10.0)?);

    let row = [purple, ice, yellow, diamond, green_mirror, air, purple];
    for (i, material) in row.into_iter().enumerate() {
        let x = i as f32 - 3.0;
        builder.add(Sphere::new(Vec3::new(x, 0.0, -3.0), 0.5, material)?);
    }

    builder
        .add(Sphere::new(Vec3::new(-1.0, 1.0, -3.0), 0.5, dense)?)
        .add(Sphere::new(Vec3::new(0.0, 1.0, -3.0), 0.5, inverted)?)
        .add(Sphere::new(Vec3::new(0.0, -100.5, -1.0), 100.0, diamond)?);

    builder.build()
}
