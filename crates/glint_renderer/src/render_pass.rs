//! Progressive render passes.
//!
//! A block of pixels is refined coarse to fine: the first pass renders one
//! pixel and paints it over the whole block, the next passes render one pixel
//! per quadrant and paint the quadrant, and so on down to single pixels.
//! Each pixel position is rendered exactly once; the painted rectangles only
//! give a blocky preview until finer passes overwrite them.

use std::collections::{HashSet, VecDeque};

/// One step of progressive refinement within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPass {
    /// X offset of the rendered pixel within the block
    pub dx: i32,
    /// Y offset of the rendered pixel within the block
    pub dy: i32,
    /// Width of the rectangle painted with that pixel's color
    pub paint_width: i32,
    /// Height of the rectangle painted with that pixel's color
    pub paint_height: i32,
}

impl RenderPass {
    pub fn new(dx: i32, dy: i32, paint_width: i32, paint_height: i32) -> Self {
        Self {
            dx,
            dy,
            paint_width,
            paint_height,
        }
    }

    /// Split into quadrants, top-left first. A wide (or square) pass visits
    /// the quadrants row by row, a tall one column by column, so the second
    /// pixel rendered lies along the longer axis. Width or height of 1 is not
    /// split along that axis, so a 1x1 pass has no children.
    fn split(&self) -> impl Iterator<Item = RenderPass> {
        let left = (self.paint_width + 1) / 2;
        let right = self.paint_width - left;
        let top = (self.paint_height + 1) / 2;
        let bottom = self.paint_height - top;

        let top_left = RenderPass::new(self.dx, self.dy, left, top);
        let top_right = RenderPass::new(self.dx + left, self.dy, right, top);
        let bottom_left = RenderPass::new(self.dx, self.dy + top, left, bottom);
        let bottom_right = RenderPass::new(self.dx + left, self.dy + top, right, bottom);

        let quadrants = if self.paint_width >= self.paint_height {
            [top_left, top_right, bottom_left, bottom_right]
        } else {
            [top_left, bottom_left, top_right, bottom_right]
        };

        quadrants
            .into_iter()
            .filter(|pass| pass.paint_width > 0 && pass.paint_height > 0)
    }
}

/// Ordered passes covering a `max_pixel_width` x `max_pixel_height` block.
#[derive(Debug, Clone)]
pub struct RenderPasses {
    pub max_pixel_width: i32,
    pub max_pixel_height: i32,
    pub passes: Vec<RenderPass>,
}

impl RenderPasses {
    /// Generate passes for a block, ordered coarse to fine.
    ///
    /// Quadrants are subdivided breadth first. The top-left quadrant of a pass
    /// starts at the same offset as its parent, which already rendered that
    /// pixel, so after generation the list is deduplicated by offset keeping
    /// the first (coarsest) pass.
    pub fn new(max_pixel_width: i32, max_pixel_height: i32) -> Self {
        let mut generated = Vec::new();
        let mut queue = VecDeque::new();

        if max_pixel_width > 0 && max_pixel_height > 0 {
            queue.push_back(RenderPass::new(0, 0, max_pixel_width, max_pixel_height));
        }

        while let Some(pass) = queue.pop_front() {
            generated.push(pass);
            if pass.paint_width > 1 || pass.paint_height > 1 {
                queue.extend(pass.split());
            }
        }

        let mut seen = HashSet::with_capacity(generated.len());
        let passes: Vec<RenderPass> = generated
            .into_iter()
            .filter(|pass| seen.insert((pass.dx, pass.dy)))
            .collect();

        Self {
            max_pixel_width,
            max_pixel_height,
            passes,
        }
    }

    /// Passes for a square block.
    pub fn square(size: i32) -> Self {
        Self::new(size, size)
    }

    /// Number of passes (one per pixel of the block).
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenderPass> {
        self.passes.iter()
    }
}

impl<'a> IntoIterator for &'a RenderPasses {
    type Item = &'a RenderPass;
    type IntoIter = std::slice::Iter<'a, RenderPass>;

    fn into_iter(self) -> Self::IntoIter {
        self.passes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_position_exactly_once() {
        for size in 1..=100 {
            let passes = RenderPasses::square(size);
            let positions: HashSet<(i32, i32)> = passes.iter().map(|p| (p.dx, p.dy)).collect();

            assert_eq!(positions.len(), (size * size) as usize, "block size {size}");
            assert_eq!(passes.len(), (size * size) as usize, "block size {size}");
            assert!(positions
                .iter()
                .all(|&(x, y)| (0..size).contains(&x) && (0..size).contains(&y)));
        }
    }

    #[test]
    fn test_first_pass_paints_whole_block() {
        let passes = RenderPasses::square(16);
        assert_eq!(passes.passes[0], RenderPass::new(0, 0, 16, 16));

        // Next come the three new quadrants
        assert_eq!(passes.passes[1], RenderPass::new(8, 0, 8, 8));
        assert_eq!(passes.passes[2], RenderPass::new(0, 8, 8, 8));
        assert_eq!(passes.passes[3], RenderPass::new(8, 8, 8, 8));
    }

    #[test]
    fn test_tall_block_splits_down_first() {
        let passes = RenderPasses::new(4, 8);
        assert_eq!(passes.passes[0], RenderPass::new(0, 0, 4, 8));

        // Column by column: bottom-left before top-right
        assert_eq!(passes.passes[1], RenderPass::new(0, 4, 2, 4));
        assert_eq!(passes.passes[2], RenderPass::new(2, 0, 2, 4));
        assert_eq!(passes.passes[3], RenderPass::new(2, 4, 2, 4));
        assert_eq!(passes.len(), 4 * 8);
    }

    #[test]
    fn test_wide_block_splits_across_first() {
        let passes = RenderPasses::new(8, 4);
        assert_eq!(passes.passes[1], RenderPass::new(4, 0, 4, 2));
        assert_eq!(passes.passes[2], RenderPass::new(0, 2, 4, 2));
        assert_eq!(passes.passes[3], RenderPass::new(4, 2, 4, 2));
    }

    #[test]
    fn test_coarse_to_fine() {
        let passes = RenderPasses::square(37);
        let areas: Vec<i32> = passes
            .iter()
            .map(|p| p.paint_width * p.paint_height)
            .collect();

        assert_eq!(areas[0], 37 * 37);
        assert!(areas[1..].iter().all(|&a| a < areas[0]));
        // Uneven splits wobble a little, but never jump back to a coarse size
        for pair in areas.windows(2) {
            assert!(pair[1] <= pair[0] * 4, "{pair:?}");
        }
        assert_eq!(*areas.last().unwrap(), 1);
    }

    #[test]
    fn test_paint_rects_stay_in_block() {
        let passes = RenderPasses::new(13, 7);
        assert_eq!(passes.len(), 13 * 7);
        for pass in &passes {
            assert!(pass.paint_width >= 1 && pass.paint_height >= 1);
            assert!(pass.dx + pass.paint_width <= 13);
            assert!(pass.dy + pass.paint_height <= 7);
        }
    }

    #[test]
    fn test_painting_in_order_converges() {
        // Paint each pass with its own index; after all passes every pixel
        // carries the index of the pass that rendered it
        let (w, h) = (11, 6);
        let passes = RenderPasses::new(w, h);
        let mut canvas = vec![usize::MAX; (w * h) as usize];

        for (i, pass) in passes.iter().enumerate() {
            for y in pass.dy..pass.dy + pass.paint_height {
                for x in pass.dx..pass.dx + pass.paint_width {
                    canvas[(y * w + x) as usize] = i;
                }
            }
            if i == 0 {
                assert!(canvas.iter().all(|&c| c == 0));
            }
        }

        for (i, pass) in passes.iter().enumerate() {
            assert_eq!(canvas[(pass.dy * w + pass.dx) as usize], i);
        }
    }

    #[test]
    fn test_empty_block() {
        assert!(RenderPasses::square(0).is_empty());
        assert!(RenderPasses::new(5, 0).is_empty());
    }

    #[test]
    fn test_single_pixel() {
        let passes = RenderPasses::square(1);
        assert_eq!(passes.passes, vec![RenderPass::new(0, 0, 1, 1)]);
    }
}
