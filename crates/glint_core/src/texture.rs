//! Texture loading and caching for materials.
//!
//! Images are decoded once into linear float RGBA and shared between every
//! projection that references them. The cache is owned by a render session
//! rather than living in a static, and it locks per path so that two threads
//! asking for the same file wait on one load instead of decoding it twice.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use glint_math::Vec3;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {path} has no pixels ({width}x{height})")]
    Empty { path: String, width: u32, height: u32 },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
///
/// Stores pixels in linear RGBA float format, row-major with row 0 at the
/// top of the image.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Pixel data as [R, G, B, A] per pixel
    pub pixels: Vec<[f32; 4]>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 4]>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Build a texture by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [f32; 4]) -> Self {
        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self::new(width, height, pixels, "<generated>")
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![[color.x as f32, color.y as f32, color.z as f32, 1.0]],
            path: "<solid>".to_string(),
        }
    }

    /// Look up the texel under normalized `(u, v)`.
    ///
    /// `u` grows to the right and `v` grows upward, so `v` is flipped against
    /// the image rows. Coordinates are floored onto the pixel grid and clamped
    /// to the image, so `u = 1.0` lands on the last column.
    pub fn get_color_at(&self, u: f64, v: f64) -> Vec3 {
        if self.width == 0 || self.height == 0 {
            return Vec3::ZERO;
        }

        let x = texel_index(u * self.width as f64, self.width);
        let y = texel_index((1.0 - v) * self.height as f64, self.height);

        let [r, g, b, _] = self.get_pixel(x, y);
        Vec3::new(r as f64, g as f64, b as f64)
    }

    /// Get pixel at integer coordinates.
    fn get_pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let idx = (y * self.width + x) as usize;
        self.pixels
            .get(idx)
            .copied()
            .unwrap_or([0.0, 0.0, 0.0, 1.0])
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 4]>()
    }
}

/// Floor a continuous coordinate onto `[0, dim - 1]`.
fn texel_index(coord: f64, dim: u32) -> u32 {
    // NaN saturates to 0 in the cast
    (coord.floor() as i64).clamp(0, dim as i64 - 1) as u32
}

type Slot = Arc<Mutex<Option<Arc<Texture>>>>;

/// Cache for loaded textures, keyed by the path as written in the scene.
pub struct TextureCache {
    /// One slot per requested path. The outer lock is only held while the
    /// slot is looked up; loading happens under the slot's own lock.
    slots: Mutex<HashMap<String, Slot>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Set the base directory for resolving relative paths.
    pub fn set_base_dir(&mut self, base_dir: impl Into<PathBuf>) {
        self.base_dir = Some(base_dir.into());
    }

    /// Load a texture from file, using the cache if available.
    ///
    /// Concurrent callers for the same path block on a single load. A failed
    /// load leaves the slot empty so a later call can retry.
    pub fn load(&self, path: &str) -> TextureResult<Arc<Texture>> {
        let slot = self.slot(path);
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(texture) = slot.as_ref() {
            return Ok(Arc::clone(texture));
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(load_texture_file(&full_path)?);
        *slot = Some(Arc::clone(&texture));

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Register an in-memory texture under `path`, replacing any cached one.
    pub fn insert(&self, path: &str, texture: Texture) -> Arc<Texture> {
        let texture = Arc::new(texture);
        let slot = self.slot(path);
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&texture));
        texture
    }

    /// Get a cached texture without loading.
    pub fn get(&self, path: &str) -> Option<Arc<Texture>> {
        let slot = self.lock_slots().get(path).cloned()?;
        let texture = slot.lock().unwrap_or_else(PoisonError::into_inner).clone();
        texture
    }

    /// Check if a texture is cached.
    pub fn is_cached(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Get the number of cached textures.
    pub fn len(&self) -> usize {
        self.loaded().len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all cached textures.
    pub fn clear(&mut self) {
        self.lock_slots().clear();
    }

    /// Get total memory usage of cached textures.
    pub fn total_size_bytes(&self) -> usize {
        self.loaded().iter().map(|t| t.size_bytes()).sum()
    }

    fn loaded(&self) -> Vec<Arc<Texture>> {
        let slots: Vec<Slot> = self.lock_slots().values().cloned().collect();
        slots
            .iter()
            .filter_map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .collect()
    }

    fn slot(&self, path: &str) -> Slot {
        Arc::clone(self.lock_slots().entry(path.to_string()).or_default())
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a texture from a file path.
fn load_texture_file(path: &Path) -> TextureResult<Texture> {
    let img = image::open(path).map_err(|source| TextureError::Image {
        path: path.display().to_string(),
        source,
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::Empty {
            path: path.display().to_string(),
            width,
            height,
        });
    }

    // Convert to linear float RGBA
    let pixels: Vec<[f32; 4]> = rgba
        .pixels()
        .map(|p| {
            [
                srgb_to_linear(p[0]),
                srgb_to_linear(p[1]),
                srgb_to_linear(p[2]),
                p[3] as f32 / 255.0, // Alpha is linear
            ]
        })
        .collect();

    Ok(Texture::new(
        width,
        height,
        pixels,
        path.to_string_lossy().to_string(),
    ))
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    /// 2x2 texture: red, green on top; blue, white on the bottom.
    fn quad_texture() -> Texture {
        Texture::from_fn(2, 2, |x, y| match (x, y) {
            (0, 0) => [1.0, 0.0, 0.0, 1.0],
            (1, 0) => [0.0, 1.0, 0.0, 1.0],
            (0, 1) => [0.0, 0.0, 1.0, 1.0],
            _ => [1.0, 1.0, 1.0, 1.0],
        })
    }

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color(Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(tex.width, 1);
        assert_eq!(tex.height, 1);

        let sample = tex.get_color_at(0.5, 0.5);
        assert!((sample.x - 1.0).abs() < 0.001);
        assert!((sample.y - 0.5).abs() < 0.001);
        assert!((sample.z - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_get_color_at_flips_v() {
        let tex = quad_texture();

        // v grows upward, so v near 1 is the top row
        assert_eq!(tex.get_color_at(0.25, 0.75), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(tex.get_color_at(0.75, 0.75), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(tex.get_color_at(0.25, 0.25), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(tex.get_color_at(0.75, 0.25), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_get_color_at_clamps() {
        let tex = quad_texture();

        // u = 1 and v = 0 land on the last column / row
        assert_eq!(tex.get_color_at(1.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(tex.get_color_at(-3.0, 7.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(tex.get_color_at(f64::NAN, 0.75), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_texture_cache() {
        let cache = TextureCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);

        let inserted = cache.insert("mem/quad.png", quad_texture());
        assert!(cache.is_cached("mem/quad.png"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_size_bytes(), 4 * 16);

        // Loading a cached path never touches the filesystem
        let loaded = cache.load("mem/quad.png").unwrap();
        assert!(Arc::ptr_eq(&inserted, &loaded));
    }

    #[test]
    fn test_texture_cache_missing_file() {
        let _ = env_logger::builder().is_test(true).try_init();

        let cache = TextureCache::with_base_dir("/nonexistent-glint-dir");
        let result = cache.load("missing.png");

        match result {
            Err(TextureError::Image { path, source }) => {
                assert!(path.ends_with("missing.png"), "{path}");
                assert!(matches!(source, image::ImageError::IoError(_)), "{source:?}");
            }
            other => panic!("expected image error, got {other:?}"),
        }
        // Failed loads are not cached
        assert!(!cache.is_cached("missing.png"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_texture_cache_loads_once_across_threads() {
        let _ = env_logger::builder().is_test(true).try_init();

        let dir = std::env::temp_dir().join(format!("glint-texture-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("checker.png");
        image::RgbaImage::from_fn(4, 4, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        })
        .save(&file)
        .unwrap();

        let cache = Arc::new(TextureCache::with_base_dir(&dir));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.load("checker.png").unwrap())
            })
            .collect();
        let textures: Vec<Arc<Texture>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Every thread got the same decoded image
        for texture in &textures[1..] {
            assert!(Arc::ptr_eq(&textures[0], texture));
        }
        assert_eq!(cache.len(), 1);
        assert_eq!(textures[0].width, 4);
        assert_eq!(textures[0].get_color_at(0.0, 1.0), Vec3::ONE);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_srgb_to_linear() {
        // Black stays black
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);

        // White stays white
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        // Mid-gray is darker in linear
        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }
}
