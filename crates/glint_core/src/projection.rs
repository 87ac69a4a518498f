//! UV projections from world-space surface points onto images.
//!
//! A projection owns a small frame (`origin`, `u`, `v`, and `w = u x v`).
//! Points are carried into that frame with the inverse of `[u, v, w]` and then
//! mapped to normalized texture coordinates by one of three families:
//!
//! - **Parallel**: planar, `(u, v)` are the first two local coordinates.
//! - **Cylindrical**: `u` is the angle around the `v` axis, `v` runs along it.
//! - **Spherical**: equirectangular longitude / colatitude around `v`.
//!
//! The inverse frame is built on first use and cached per instance. Any
//! change to the frame drops the cache.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::sync::{Arc, OnceLock};

use glint_math::{Mat3, Mat3Ext, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::texture::Texture;

/// How many times a cylindrical texture wraps around the axis.
pub const LATITUDE_REPETITIONS: f64 = 1.0;

/// Errors raised while preparing a projection.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ProjectionError {
    #[error("projection axes do not span 3D space (u = {u}, v = {v})")]
    DegenerateBasis { u: Vec3, v: Vec3 },
}

/// Projection family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    Parallel,
    Cylindrical,
    Spherical,
}

/// An image mapped onto surfaces through a projection frame.
#[derive(Clone)]
pub struct ImageProjection {
    kind: ProjectionKind,
    texture: Arc<Texture>,
    origin: Vec3,
    u: Vec3,
    v: Vec3,
    pub repeat_u: bool,
    pub repeat_v: bool,
    pub flip_u: bool,
    pub flip_v: bool,
    inverse: OnceLock<Result<Mat3, ProjectionError>>,
}

impl ImageProjection {
    /// Create a projection. Repetition and flipping start disabled.
    pub fn new(
        kind: ProjectionKind,
        texture: Arc<Texture>,
        origin: Vec3,
        u: Vec3,
        v: Vec3,
    ) -> Self {
        Self {
            kind,
            texture,
            origin,
            u,
            v,
            repeat_u: false,
            repeat_v: false,
            flip_u: false,
            flip_v: false,
            inverse: OnceLock::new(),
        }
    }

    /// Set tiling behaviour.
    pub fn with_repeat(mut self, repeat_u: bool, repeat_v: bool) -> Self {
        self.repeat_u = repeat_u;
        self.repeat_v = repeat_v;
        self
    }

    /// Mirror every other tile.
    pub fn with_flip(mut self, flip_u: bool, flip_v: bool) -> Self {
        self.flip_u = flip_u;
        self.flip_v = flip_v;
        self
    }

    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn u(&self) -> Vec3 {
        self.u
    }

    pub fn v(&self) -> Vec3 {
        self.v
    }

    /// Move the projection frame. Invalidates the cached inverse.
    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
        self.invalidate();
    }

    /// Replace the projection axes. Invalidates the cached inverse.
    pub fn set_axes(&mut self, u: Vec3, v: Vec3) {
        self.u = u;
        self.v = v;
        self.invalidate();
    }

    /// Translate along with the owning object.
    pub fn translate(&mut self, offset: Vec3) {
        self.set_origin(self.origin + offset);
    }

    /// Rotate along with the owning object about `pivot`.
    pub fn rotate(&mut self, rotation: Mat3, pivot: Vec3) {
        self.origin = rotation.rotate_about(self.origin, pivot);
        self.u = rotation * self.u;
        self.v = rotation * self.v;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.inverse = OnceLock::new();
    }

    /// Inverse of `[u, v, u x v]`, built once per frame change.
    pub fn inverse_basis(&self) -> Result<Mat3, ProjectionError> {
        *self.inverse.get_or_init(|| {
            let w = self.u.cross(self.v);
            Mat3::from_cols(self.u, self.v, w)
                .try_inverse()
                .ok_or(ProjectionError::DegenerateBasis { u: self.u, v: self.v })
        })
    }

    /// Build the cached inverse now, surfacing a degenerate frame as an error.
    ///
    /// Call this before handing the projection to render threads.
    pub fn prepare(&self) -> Result<(), ProjectionError> {
        self.inverse_basis().map(|_| ())
    }

    /// Carry a world-space point into the projection frame.
    pub fn local_point(&self, point: Vec3) -> Result<Vec3, ProjectionError> {
        Ok(self.inverse_basis()? * (point - self.origin))
    }

    /// Normalized texture coordinates for a world-space point.
    ///
    /// Returns `None` when a non-repeating coordinate falls outside `[0, 1)`,
    /// or when the frame is degenerate (which `prepare` reports up front).
    pub fn uv(&self, point: Vec3) -> Option<(f64, f64)> {
        let local = self.local_point(point).ok()?;

        match self.kind {
            ProjectionKind::Parallel => {
                let (u, v) = parallel_uv(local);
                Some((
                    wrap(u, self.repeat_u, self.flip_u)?,
                    wrap(v, self.repeat_v, self.flip_v)?,
                ))
            }
            ProjectionKind::Cylindrical => {
                let (u, v) = cylindrical_uv(local);
                Some((wrap(u, true, false)?, wrap(v, self.repeat_v, self.flip_v)?))
            }
            ProjectionKind::Spherical => Some(spherical_uv(local)),
        }
    }

    /// Texel color under a world-space point, if the point maps onto the image.
    pub fn color_at(&self, point: Vec3) -> Option<Vec3> {
        self.uv(point)
            .map(|(u, v)| self.texture.get_color_at(u, v))
    }
}

impl fmt::Debug for ImageProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageProjection")
            .field("kind", &self.kind)
            .field("texture", &self.texture.path)
            .field("origin", &self.origin)
            .field("u", &self.u)
            .field("v", &self.v)
            .field("repeat", &(self.repeat_u, self.repeat_v))
            .field("flip", &(self.flip_u, self.flip_v))
            .finish()
    }
}

/// Planar mapping: the first two local coordinates, unwrapped.
pub fn parallel_uv(local: Vec3) -> (f64, f64) {
    (local.x, local.y)
}

/// Cylindrical mapping around the local `v` axis.
pub fn cylindrical_uv(local: Vec3) -> (f64, f64) {
    let u = longitude(local.x, local.z) / TAU * LATITUDE_REPETITIONS;
    (u, local.y)
}

/// Equirectangular mapping around the local `v` axis.
///
/// Both poles collapse onto `phi = 0`; points on the axis get longitude 0.
pub fn spherical_uv(local: Vec3) -> (f64, f64) {
    let theta = longitude(local.x, local.z);

    let mut phi = (local.y / local.length()).clamp(-1.0, 1.0).acos();
    if !(0.0..PI).contains(&phi) {
        // NaN lands here too
        phi = 0.0;
    }

    (theta / TAU, phi / PI)
}

/// Angle in `[0, 2pi)` of `(x, z)` measured from `+x` towards `+z`.
fn longitude(x: f64, z: f64) -> f64 {
    let theta = (x / (x * x + z * z).sqrt()).clamp(-1.0, 1.0).acos();
    if theta.is_nan() {
        0.0
    } else if z < 0.0 {
        TAU - theta
    } else {
        theta
    }
}

/// Fold a coordinate into `[0, 1)`.
///
/// Without `repeat`, coordinates outside the unit range have no texel. With
/// `flip`, odd tiles are mirrored so neighbouring tiles meet edge to edge.
fn wrap(coord: f64, repeat: bool, flip: bool) -> Option<f64> {
    if !repeat {
        return (0.0..1.0).contains(&coord).then_some(coord);
    }

    let tile = coord.floor();
    let frac = coord - tile;
    if flip && (tile as i64).rem_euclid(2) == 1 {
        Some(1.0 - frac)
    } else {
        Some(frac)
    }
}
