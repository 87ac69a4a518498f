//! Core ray renderer.
//!
//! Implements single-bounce direct shading with:
//! - Point lights with shadow rays, or a headlight when the scene has none
//! - Multi-sampling (anti-aliasing and depth of field) per pixel
//! - Gamma correction on output
//!
//! Every (pixel, sample) pair draws from its own seeded RNG, so a frame is
//! reproducible no matter how rayon schedules the work.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use glint_core::{Color, SceneDescription};
use glint_math::Ray;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use thiserror::Error;

use crate::bucket::generate_buckets;
use crate::camera::{CameraError, CameraFrame};
use crate::render_pass::RenderPasses;
use crate::scene::{Scene, SceneError};

/// Offset along the surface normal for shadow ray origins, so a surface does
/// not shadow itself.
const SHADOW_EPSILON: f64 = 1e-6;

/// Errors that stop a frame before any pixel is rendered.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot render an empty {width}x{height} frame")]
    EmptyFrame { width: u32, height: u32 },

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Camera(#[from] CameraError),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Color of rays that hit nothing
    pub background: Color,
    /// Fraction of the surface color visible without direct light
    pub ambient: f64,
    /// Base seed for the per-sample random streams
    pub seed: u64,
    /// Bucket size for progressive rendering
    pub block_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            background: Color::ZERO,
            ambient: 0.1,
            seed: 0,
            block_size: crate::bucket::DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    /// Output settings taken from a scene description.
    pub fn from_description(desc: &SceneDescription) -> Self {
        Self {
            width: desc.width,
            height: desc.height,
            background: Color::from_array(desc.background),
            ..Default::default()
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Progress of a running render, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress {
    pub completed: usize,
    pub total: usize,
}

impl RenderProgress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Compute the color seen by a ray.
pub fn ray_color(ray: &Ray, scene: &Scene, config: &RenderConfig) -> Color {
    let Some(rec) = scene.nearest_hit(ray) else {
        return config.background;
    };

    let surface = rec.material.surface_color(rec.point);
    let mut color = rec.material.emission + surface * config.ambient;

    if scene.lights.is_empty() {
        // Headlight: full brightness where the surface faces the viewer
        let facing = rec.normal.dot(-ray.heading.normalize_or_zero()).max(0.0);
        return color + surface * facing;
    }

    let shadow_origin = rec.point + rec.normal * SHADOW_EPSILON;
    for light in &scene.lights {
        let to_light = light.position - shadow_origin;
        let distance = to_light.length();
        if distance == 0.0 {
            continue;
        }

        let direction = to_light / distance;
        let lambert = rec.normal.dot(direction);
        if lambert <= 0.0 {
            continue;
        }

        let shadow_ray = Ray::new(shadow_origin, direction);
        let occluded = scene
            .nearest_hit(&shadow_ray)
            .is_some_and(|blocker| blocker.distance < distance);
        if !occluded {
            color += surface * light.color * lambert;
        }
    }

    color
}

/// Random stream for one sample of one pixel.
fn sample_rng(seed: u64, pixel_index: u64, sample: u32) -> StdRng {
    let stream = pixel_index
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(sample as u64);
    StdRng::seed_from_u64(seed ^ stream)
}

/// Render a single pixel: every sample in parallel, then the average.
///
/// Samples are summed in index order once all of them are done, so the
/// result does not depend on thread timing. A camera with `samples == 0`
/// still takes one (pinhole) sample.
pub fn render_pixel(
    frame: &CameraFrame<'_>,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
) -> Color {
    let samples = frame.camera().samples.max(1);
    let pixel_index = y as u64 * config.width as u64 + x as u64;

    let colors: Vec<Color> = (0..samples)
        .into_par_iter()
        .map(|sample| {
            let mut rng = sample_rng(config.seed, pixel_index, sample);
            let ray = frame.create_ray(x, y, config.width, config.height, sample, &mut rng);
            ray_color(&ray, scene, config)
        })
        .collect();

    colors.iter().fold(Color::ZERO, |sum, c| sum + *c) / samples as f64
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let r = (255.0 * clamp_01(linear_to_gamma(color.x))) as u8;
    let g = (255.0 * clamp_01(linear_to_gamma(color.y))) as u8;
    let b = (255.0 * clamp_01(linear_to_gamma(color.z))) as u8;
    [r, g, b, 255]
}

/// Row-major linear color buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Paint a rectangle, clipped to the image.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);

        for py in y..y_end {
            let row = self.index(0, py);
            self.pixels[row + x as usize..row + x_end as usize].fill(color);
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }
}

/// Check the frame size, resolve cached bases and bind the camera.
fn begin_frame<'a>(scene: &'a Scene, config: &RenderConfig) -> RenderResult<CameraFrame<'a>> {
    if config.width == 0 || config.height == 0 {
        return Err(RenderError::EmptyFrame {
            width: config.width,
            height: config.height,
        });
    }

    scene.prepare()?;
    Ok(scene.camera.frame()?)
}

/// Render the entire scene to an image buffer.
pub fn render(scene: &Scene, config: &RenderConfig) -> RenderResult<ImageBuffer> {
    render_with_progress(scene, config, |_| {})
}

/// Render the entire scene, reporting each finished pixel.
///
/// `progress` is called from worker threads, once per pixel, after all of
/// that pixel's samples have been averaged.
pub fn render_with_progress<F>(
    scene: &Scene,
    config: &RenderConfig,
    progress: F,
) -> RenderResult<ImageBuffer>
where
    F: Fn(RenderProgress) + Sync,
{
    let frame = begin_frame(scene, config)?;
    let mut image = ImageBuffer::new(config.width, config.height);
    let total = image.pixels.len();
    let completed = AtomicUsize::new(0);
    let width = config.width as usize;

    log::info!(
        "Rendering {}x{} with {} samples per pixel",
        config.width,
        config.height,
        scene.camera.samples.max(1)
    );
    let start = Instant::now();

    image
        .pixels
        .par_iter_mut()
        .enumerate()
        .for_each(|(index, pixel)| {
            let x = (index % width) as u32;
            let y = (index / width) as u32;
            *pixel = render_pixel(&frame, scene, x, y, config);

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            progress(RenderProgress {
                completed: done,
                total,
            });
        });

    log::info!("Rendered {} pixels in {:.2?}", total, start.elapsed());
    Ok(image)
}

/// Render the scene coarse to fine.
///
/// The image is split into `config.block_size` buckets and every bucket
/// receives the same pass at once. Each pass renders one pixel per bucket
/// and paints it over the pass rectangle; `on_pass` sees the image after
/// every pass. Pixels come out exactly as in [`render`], so the last
/// callback shows the finished frame.
pub fn render_progressive<F>(
    scene: &Scene,
    config: &RenderConfig,
    mut on_pass: F,
) -> RenderResult<ImageBuffer>
where
    F: FnMut(usize, &ImageBuffer),
{
    let frame = begin_frame(scene, config)?;
    // A block larger than the image would only add passes that land nowhere
    let block_size = config
        .block_size
        .min(config.width.max(config.height))
        .max(1);
    let buckets = generate_buckets(config.width, config.height, block_size);
    let passes = RenderPasses::square(i32::try_from(block_size).unwrap_or(i32::MAX));
    let mut image = ImageBuffer::new(config.width, config.height);

    log::info!(
        "Rendering {}x{} progressively: {} buckets, {} passes",
        config.width,
        config.height,
        buckets.len(),
        passes.len()
    );
    let start = Instant::now();

    for (index, pass) in passes.iter().enumerate() {
        let painted: Vec<_> = buckets
            .par_iter()
            .filter_map(|bucket| bucket.place(pass))
            .map(|placed| {
                let color = render_pixel(&frame, scene, placed.x, placed.y, config);
                (placed, color)
            })
            .collect();

        for (placed, color) in painted {
            image.fill_rect(placed.x, placed.y, placed.paint_width, placed.paint_height, color);
        }

        on_pass(index, &image);
    }

    log::info!("Progressive render finished in {:.2?}", start.elapsed());
    Ok(image)
}
