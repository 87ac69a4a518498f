//! Camera for ray generation.
//!
//! Pixels are laid out on a view plane `view_plane_distance` in front of the
//! camera, one unit per pixel (scaled down by `magnification`), centered on
//! the heading. Camera space is `x` right, `y` up, `z` along the heading.

use std::sync::OnceLock;

use glint_math::{Mat3, Ray, Vec3};
use rand::{Rng, RngCore};
use thiserror::Error;

use crate::intersect::ray_plane;
use crate::sunflower::sunflower;

/// Boundary-ring weight passed to the lens sampler. Zero keeps the lens
/// samples spread over the whole aperture for small sample counts.
const LENS_BOUNDARY_ALPHA: f64 = 0.0;

/// Errors raised while building the camera basis.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CameraError {
    #[error("camera heading has zero length")]
    ZeroHeading,

    #[error("camera view_up {view_up} is parallel to heading {heading}")]
    ParallelViewUp { heading: Vec3, view_up: Vec3 },
}

/// Camera for generating rays into the scene.
#[derive(Clone, Debug)]
pub struct Camera {
    // Camera positioning
    origin: Vec3,
    heading: Vec3,
    view_up: Vec3,

    // Image plane
    pub view_plane_distance: f64,
    pub magnification: f64,

    // Lens settings
    pub lens_radius: f64,
    pub focal_distance: f64,

    // Sampling
    pub samples: u32,
    pub anti_alias: bool,

    // Cached `[x, y, heading]` basis, reset whenever the pose changes
    basis: OnceLock<Result<Mat3, CameraError>>,
}

impl Camera {
    /// Create a pinhole camera at the origin looking down +Z.
    pub fn new() -> Self {
        Self {
            origin: Vec3::ZERO,
            heading: Vec3::Z,
            view_up: Vec3::Y,
            view_plane_distance: 400.0,
            magnification: 1.0,
            lens_radius: 0.0,
            focal_distance: 1.0,
            samples: 1,
            anti_alias: false,
            basis: OnceLock::new(),
        }
    }

    /// Set camera pose.
    pub fn with_position(mut self, origin: Vec3, heading: Vec3, view_up: Vec3) -> Self {
        self.set_position(origin, heading, view_up);
        self
    }

    /// Set the image plane distance and zoom.
    pub fn with_view_plane(mut self, view_plane_distance: f64, magnification: f64) -> Self {
        self.view_plane_distance = view_plane_distance;
        self.magnification = magnification;
        self
    }

    /// Set lens settings. A zero radius is a pinhole.
    pub fn with_lens(mut self, lens_radius: f64, focal_distance: f64) -> Self {
        self.lens_radius = lens_radius;
        self.focal_distance = focal_distance;
        self
    }

    /// Set quality settings.
    pub fn with_samples(mut self, samples: u32, anti_alias: bool) -> Self {
        self.samples = samples;
        self.anti_alias = anti_alias;
        self
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    pub fn view_up(&self) -> Vec3 {
        self.view_up
    }

    /// Replace the camera pose, dropping the cached basis.
    pub fn set_position(&mut self, origin: Vec3, heading: Vec3, view_up: Vec3) {
        self.origin = origin;
        self.heading = heading;
        self.view_up = view_up;
        self.basis = OnceLock::new();
    }

    /// Move the camera. The basis only depends on the orientation, so the
    /// cache survives.
    pub fn translate(&mut self, offset: Vec3) {
        self.origin += offset;
    }

    /// Turn the camera in place.
    pub fn rotate(&mut self, rotation: Mat3) {
        self.set_position(self.origin, rotation * self.heading, rotation * self.view_up);
    }

    /// Depth of field is active for a non-zero lens and a sample budget.
    pub fn has_depth_of_field(&self) -> bool {
        self.lens_radius > 0.0 && self.samples > 0
    }

    /// Orthonormal camera basis `[x, y, heading]`, computed once.
    pub fn coordinate_system(&self) -> Result<Mat3, CameraError> {
        *self
            .basis
            .get_or_init(|| build_basis(self.heading, self.view_up))
    }

    /// Validate the basis and bind it for ray generation.
    ///
    /// Call once per frame; the returned frame is cheap to share across
    /// render threads.
    pub fn frame(&self) -> Result<CameraFrame<'_>, CameraError> {
        Ok(CameraFrame {
            camera: self,
            basis: self.coordinate_system()?,
        })
    }

    /// Generate the ray for one sample of pixel `(x, y)`.
    pub fn create_ray(
        &self,
        x: u32,
        y: u32,
        image_width: u32,
        image_height: u32,
        sample_index: u32,
        rng: &mut dyn RngCore,
    ) -> Result<Ray, CameraError> {
        Ok(self
            .frame()?
            .create_ray(x, y, image_width, image_height, sample_index, rng))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// A camera with its basis resolved.
#[derive(Clone, Copy, Debug)]
pub struct CameraFrame<'a> {
    camera: &'a Camera,
    basis: Mat3,
}

impl<'a> CameraFrame<'a> {
    pub fn camera(&self) -> &'a Camera {
        self.camera
    }

    pub fn basis(&self) -> Mat3 {
        self.basis
    }

    /// Generate the ray for one sample of pixel `(x, y)`.
    ///
    /// `rng` drives the anti-aliasing jitter and the lens sample jitter; a
    /// pinhole camera without anti-aliasing never touches it.
    pub fn create_ray(
        &self,
        x: u32,
        y: u32,
        image_width: u32,
        image_height: u32,
        sample_index: u32,
        rng: &mut dyn RngCore,
    ) -> Ray {
        let camera = self.camera;

        // Pixel center on the view plane, in pixel units
        let mut px = -(image_width as f64) / 2.0 + x as f64 + 0.5;
        let mut py = image_height as f64 / 2.0 - y as f64 - 0.5;

        if camera.anti_alias && camera.samples > 1 {
            px += rng.gen_range(-0.5..=0.5);
            py += rng.gen_range(-0.5..=0.5);
        }

        let mut heading = Vec3::new(
            px / camera.magnification,
            py / camera.magnification,
            camera.view_plane_distance,
        );
        let mut origin = camera.origin;

        if camera.has_depth_of_field() {
            let (lx, ly) = sunflower(
                camera.samples,
                LENS_BOUNDARY_ALPHA,
                sample_index + 1,
                Some(rng),
            );
            let lens = Vec3::new(lx, ly, 0.0) * camera.lens_radius;

            // Every lens point aims at the same spot on the focal plane
            let perfect = Ray::new(Vec3::ZERO, heading);
            let focal_plane = Vec3::new(0.0, 0.0, camera.focal_distance);
            if let Some(focal) = ray_plane(&perfect, focal_plane, Vec3::Z) {
                heading = focal - lens;
                origin += self.basis * lens;
            }
        }

        Ray::new(origin, self.basis * heading)
    }
}

fn build_basis(heading: Vec3, view_up: Vec3) -> Result<Mat3, CameraError> {
    let heading_n = heading.try_normalize().ok_or(CameraError::ZeroHeading)?;
    let camera_x = view_up
        .cross(heading_n)
        .try_normalize()
        .ok_or(CameraError::ParallelViewUp { heading, view_up })?;
    let camera_y = heading_n.cross(camera_x).normalize();

    Ok(Mat3::from_cols(camera_x, camera_y, heading_n))
}
