//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative bounce loop with a hard depth cutoff
//! - Anti-aliasing via jittered multi-sampling
//! - Gamma correction and 8-bit quantization
//! - Row-parallel rendering with one seeded RNG per row

use crate::output::ImageBuffer;
use crate::{Camera, Color, Hittable, Scatter, Scene};
use glint_math::random::random_f32;
use glint_math::{Interval, Ray};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use thiserror::Error;

/// Offset that keeps secondary rays from re-hitting the surface they left.
const T_MIN: f32 = 0.001;

/// Largest image the renderer will allocate (16384 x 16384).
pub const MAX_IMAGE_PIXELS: u64 = 1 << 28;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// What a ray sees when it leaves the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// Constant color
    Solid(Color),
    /// White-to-blue gradient along the ray's vertical direction
    #[default]
    Sky,
}

impl Background {
    pub fn color(&self, ray: &Ray) -> Color {
        match *self {
            Background::Solid(color) => color,
            Background::Sky => sky_gradient(ray),
        }
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize_or_zero();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub image_width: u32,
    pub image_height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    pub background: Background,
    /// Base seed; every row derives its own generator from it
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 400,
            image_height: 225,
            samples_per_pixel: 100,
            max_depth: 50,
            background: Background::Sky,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Image height for the given width and aspect ratio, at least 1.
    pub fn height_for_aspect(image_width: u32, aspect_ratio: f32) -> u32 {
        ((image_width as f32 / aspect_ratio) as u32).max(1)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.image_width as f32 / self.image_height as f32
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "image size must be non-zero, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        let pixels = self.image_width as u64 * self.image_height as u64;
        if pixels > MAX_IMAGE_PIXELS {
            return Err(RenderError::InvalidConfig(format!(
                "image of {}x{} exceeds the {MAX_IMAGE_PIXELS} pixel limit",
                self.image_width, self.image_height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "samples_per_pixel must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Compute the color seen by a ray.
///
/// Each bounce adds the surface emission weighted by the attenuation
/// gathered so far, then multiplies in the scatter attenuation. A path that
/// is still bouncing after `max_depth` hits contributes nothing more.
pub fn ray_color(
    ray: &Ray,
    background: &Background,
    scene: &Scene,
    max_depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut radiance = Color::ZERO;
    let mut throughput = Color::ONE;
    let mut ray = *ray;

    for _ in 0..max_depth {
        let Some(rec) = scene.hit(&ray, Interval::new(T_MIN, f32::INFINITY)) else {
            return radiance + throughput * background.color(&ray);
        };

        let material = scene.material(rec.material);
        radiance += throughput * material.emitted(rec.u, rec.v, rec.p);

        match material.scatter(&ray, &rec, rng) {
            Some(result) => {
                throughput *= result.attenuation;
                ray = result.scattered;
            }
            // Absorbed
            None => return radiance,
        }
    }

    radiance
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert an averaged linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let intensity = Interval::new(0.0, 0.999);
    let quantize = |c: f32| (256.0 * intensity.clamp(linear_to_gamma(c))) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Average `samples_per_pixel` jittered samples for pixel (x, y).
///
/// `y` counts rows from the top of the image.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // Viewport t runs bottom to top
    let j = config.image_height - 1 - y;
    let s_scale = config.image_width.saturating_sub(1).max(1) as f32;
    let t_scale = config.image_height.saturating_sub(1).max(1) as f32;

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let s = (x as f32 + random_f32(rng)) / s_scale;
        let t = (j as f32 + random_f32(rng)) / t_scale;
        let ray = camera.get_ray(s, t, rng);
        let sample = ray_color(&ray, &config.background, scene, config.max_depth, rng);

        if sample.is_finite() {
            pixel_color += sample;
        } else {
            log::trace!("Dropping non-finite sample {sample} at pixel ({x}, {y})");
        }
    }

    pixel_color / config.samples_per_pixel as f32
}

/// Generator for one image row, independent of which thread renders it.
pub(crate) fn row_rng(seed: u64, row: u32) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ row as u64)
}

/// Lock-free counter of finished rows, readable while a render runs.
#[derive(Debug, Default)]
pub struct RenderProgress {
    rows_done: AtomicUsize,
    total_rows: AtomicUsize,
}

impl RenderProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn start(&self, total_rows: usize) {
        self.rows_done.store(0, Ordering::Relaxed);
        self.total_rows.store(total_rows, Ordering::Relaxed);
    }

    fn row_finished(&self) {
        self.rows_done.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rows_done(&self) -> usize {
        self.rows_done.load(Ordering::Relaxed)
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows.load(Ordering::Relaxed)
    }

    /// Completed fraction in [0, 1]; 0 before the render starts.
    pub fn fraction(&self) -> f32 {
        match self.total_rows() {
            0 => 0.0,
            total => self.rows_done() as f32 / total as f32,
        }
    }

    pub fn is_finished(&self) -> bool {
        let total = self.total_rows();
        total > 0 && self.rows_done() >= total
    }
}

/// Render the scene to an 8-bit image.
pub fn render(scene: &Scene, camera: &Camera, config: &RenderConfig) -> RenderResult<ImageBuffer> {
    render_with_progress(scene, camera, config, &RenderProgress::new())
}

/// Render the scene, reporting finished rows through `progress`.
///
/// Rows run in parallel on the current rayon pool. Output is identical
/// for any number of threads.
pub fn render_with_progress(
    scene: &Scene,
    camera: &Camera,
    config: &RenderConfig,
    progress: &RenderProgress,
) -> RenderResult<ImageBuffer> {
    config.validate()?;
    camera.validate()?;

    let width = config.image_width;
    let height = config.image_height;
    log::info!(
        "Rendering {}x{} @ {} spp, max depth {}, {} threads",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth,
        rayon::current_num_threads()
    );

    let start = Instant::now();
    progress.start(height as usize);

    let mut image = ImageBuffer::new(width, height);
    image
        .pixels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            let mut rng = row_rng(config.seed, y);
            for (x, pixel) in row.iter_mut().enumerate() {
                let color = render_pixel(camera, scene, x as u32, y, config, &mut rng);
                *pixel = color_to_rgb(color);
            }
            progress.row_finished();
        });

    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(image)
}
