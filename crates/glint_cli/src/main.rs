use anyhow::{Context, Result};
use clap::Parser;
use glint_renderer::{
    build_preset, render_with_progress, Camera, PresetKind, RenderConfig, RenderProgress,
    RenderSettings, Scene, SceneDescription,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Render a scene with the glint path tracer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Built-in scene to render [default: random-spheres]
    #[arg(short, long, conflicts_with = "scene")]
    preset: Option<PresetKind>,

    /// JSON scene description to render
    #[arg(long, value_name = "FILE")]
    scene: Option<PathBuf>,

    /// Image width in pixels
    #[arg(short, long)]
    width: Option<u32>,

    /// Image aspect ratio (width / height)
    #[arg(long, allow_negative_numbers = true)]
    aspect_ratio: Option<f32>,

    /// Samples per pixel
    #[arg(short, long)]
    samples: Option<u32>,

    /// Maximum ray bounce depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Random seed for the scene and the sampler
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (defaults to one per core)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Output image; the extension picks the format (.ppm or .png)
    #[arg(short, long, default_value = "image.ppm")]
    output: PathBuf,
}

impl Args {
    fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            image_width: self.width,
            aspect_ratio: self.aspect_ratio,
            samples_per_pixel: self.samples,
            max_depth: self.max_depth,
            seed: self.seed,
        }
    }
}

/// Resolve the scene, camera and final render configuration.
///
/// Settings layer as defaults, then the scene file, then the command line.
fn load_scene(args: &Args) -> Result<(Scene, Camera, RenderConfig)> {
    let mut config = RenderConfig::default();

    if let Some(path) = &args.scene {
        let description = SceneDescription::load(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?;
        description
            .render
            .apply(&mut config)
            .with_context(|| format!("Invalid render settings in {}", path.display()))?;
        args.render_settings().apply(&mut config)?;
        config.background = description.background;
        config.validate()?;

        let scene = description
            .build_scene()
            .with_context(|| format!("Invalid scene {}", path.display()))?;
        let camera = description
            .build_camera(config.aspect_ratio())
            .with_context(|| format!("Invalid camera in {}", path.display()))?;
        return Ok((scene, camera, config));
    }

    args.render_settings().apply(&mut config)?;
    config.validate()?;

    let kind = args.preset.unwrap_or(PresetKind::RandomSpheres);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let preset = build_preset(kind, config.aspect_ratio(), &mut rng)
        .with_context(|| format!("Failed to build preset '{kind}'"))?;
    config.background = preset.background;

    Ok((preset.scene, preset.camera, config))
}

/// Log progress about once a second until `done` is set.
fn report_progress(progress: &RenderProgress, done: &AtomicBool) {
    let mut last_report = Instant::now();
    while !done.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_millis(100));
        if last_report.elapsed() >= Duration::from_secs(1) && !progress.is_finished() {
            log::info!(
                "Progress: {:5.1}% ({}/{} rows)",
                progress.fraction() * 100.0,
                progress.rows_done(),
                progress.total_rows()
            );
            last_report = Instant::now();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting glint");

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the thread pool")?;
    }

    let (scene, camera, config) = load_scene(&args)?;

    let progress = RenderProgress::new();
    let done = AtomicBool::new(false);
    let image = thread::scope(|s| {
        s.spawn(|| report_progress(&progress, &done));
        let result = render_with_progress(&scene, &camera, &config, &progress);
        done.store(true, Ordering::Relaxed);
        result
    })?;

    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let args = Args::parse_from([
            "glint", "--preset", "two-spheres", "-w", "64", "--aspect-ratio", "2", "-s", "3",
        ]);
        let (scene, camera, config) = load_scene(&args).unwrap();

        assert_eq!(scene.object_count(), 2);
        assert_eq!((config.image_width, config.image_height), (64, 32));
        assert_eq!(config.samples_per_pixel, 3);
        assert_eq!(config.max_depth, 50);
        assert!((camera.aspect_ratio() - 2.0).abs() < 1e-6);
        assert_eq!(args.output, PathBuf::from("image.ppm"));
    }

    #[test]
    fn test_preset_and_scene_conflict() {
        let result = Args::try_parse_from(["glint", "--preset", "pyramid", "--scene", "a.json"]);
        assert!(result.is_err());
        assert!(Args::try_parse_from(["glint", "--preset", "nope"]).is_err());
    }

    #[test]
    fn test_invalid_samples_rejected() {
        let args = Args::parse_from(["glint", "--samples", "0"]);
        assert!(load_scene(&args).is_err());
    }

    #[test]
    fn test_degenerate_aspect_ratio_rejected() {
        for ratio in ["0", "-2", "0.000001", "inf"] {
            let args = Args::parse_from(["glint", "-p", "two-spheres", "--aspect-ratio", ratio]);
            assert!(load_scene(&args).is_err(), "aspect ratio {ratio}");
        }
    }
}
