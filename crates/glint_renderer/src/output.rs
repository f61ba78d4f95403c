//! Rendered image storage and file writers.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// 8-bit RGB image, row-major with the top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 3]>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 3]; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let index = self.index(x, y);
        self.pixels[index] = rgb;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Flatten to packed RGB bytes.
    pub fn as_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    /// Write as plain-text PPM (`P3`), one pixel per line.
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "P3\n{} {}\n255\n", self.width, self.height)?;
        for [r, g, b] in &self.pixels {
            writeln!(writer, "{r} {g} {b}")?;
        }
        writer.flush()
    }

    pub fn save_ppm(&self, path: &Path) -> OutputResult<()> {
        let file = File::create(path)?;
        self.write_ppm(BufWriter::new(file))?;
        Ok(())
    }

    pub fn save_png(&self, path: &Path) -> OutputResult<()> {
        let img = image::RgbImage::from_raw(self.width, self.height, self.as_rgb_bytes())
            .ok_or_else(|| {
                OutputError::UnsupportedFormat(format!(
                    "{}x{} buffer does not hold {} pixels",
                    self.width,
                    self.height,
                    self.pixels.len()
                ))
            })?;
        img.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Save, picking the format from the file extension (`ppm` or `png`).
    pub fn save(&self, path: &Path) -> OutputResult<()> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("ppm") => self.save_ppm(path)?,
            Some("png") => self.save_png(path)?,
            other => {
                return Err(OutputError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        }
        log::info!("Wrote {}", path.display());
        Ok(())
    }
}
