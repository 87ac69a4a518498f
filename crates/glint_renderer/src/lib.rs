//! Glint Renderer - CPU ray rendering
//!
//! Renders spheres and discs with direct lighting and image projections.
//!
//! - **Intersection**: analytic ray/plane, ray/disc and ray/sphere tests
//! - **Camera**: cached basis, anti-aliasing jitter, magnification and
//!   depth of field through a sunflower-sampled lens
//! - **Scheduling**: every (pixel, sample) pair is independent work on the
//!   rayon pool; pixels are averaged once all their samples are in
//! - **Progressive passes**: coarse-to-fine refinement per bucket

mod bucket;
mod camera;
mod disc;
mod hittable;
mod intersect;
mod render_pass;
mod renderer;
mod scene;
mod sphere;
mod sunflower;

pub use bucket::{generate_buckets, Bucket, PlacedPass, DEFAULT_BUCKET_SIZE};
pub use camera::{Camera, CameraError, CameraFrame};
pub use disc::Disc;
pub use hittable::{nearest_hit, HitRecord, Hittable};
pub use intersect::{ray_disc, ray_plane, ray_sphere};
pub use render_pass::{RenderPass, RenderPasses};
pub use renderer::{
    color_to_rgba, ray_color, render, render_pixel, render_progressive, render_with_progress,
    ImageBuffer, RenderConfig, RenderError, RenderProgress, RenderResult,
};
pub use scene::{PointLight, Scene, SceneError};
pub use sphere::Sphere;
pub use sunflower::sunflower;

/// Re-export math types from glint_math
pub use glint_math::{Mat3, Ray, Vec3};
/// Re-export scene data from glint_core
pub use glint_core::{Color, Material};
