//! Image blocks for progressive rendering.
//!
//! Divides the image into buckets that receive the same render pass at the
//! same time, so the whole frame sharpens evenly.

use crate::render_pass::RenderPass;

/// A rectangular region of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of the bucket's top-left corner
    pub x: u32,
    /// Y coordinate of the bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Image position rendered by `pass` in this bucket, with the painted
    /// extent clipped to the bucket.
    ///
    /// Edge buckets are smaller than the pass layout; passes whose pixel
    /// falls outside them are skipped.
    pub fn place(&self, pass: &RenderPass) -> Option<PlacedPass> {
        let (dx, dy) = (u32::try_from(pass.dx).ok()?, u32::try_from(pass.dy).ok()?);
        if dx >= self.width || dy >= self.height {
            return None;
        }

        let paint_width = u32::try_from(pass.paint_width).ok()?.min(self.width - dx);
        let paint_height = u32::try_from(pass.paint_height).ok()?.min(self.height - dy);

        Some(PlacedPass {
            x: self.x + dx,
            y: self.y + dy,
            paint_width,
            paint_height,
        })
    }
}

/// A render pass positioned in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedPass {
    pub x: u32,
    pub y: u32,
    pub paint_width: u32,
    pub paint_height: u32,
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 16;

/// Cover the image with `bucket_size` buckets in row-major order. Buckets on
/// the right and bottom edges are cut to fit.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh));
            x += bucket_size;
        }
        y += bucket_size;
    }

    buckets
}
