//! Surface materials.
//!
//! A material is a flat base color, an optional emission, and an optional
//! image projection that overrides the base color wherever it maps a texel.

use glint_math::{Mat3, Vec3};

use crate::projection::{ImageProjection, ProjectionError};

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Material attached to a primitive.
///
/// Each primitive owns its material so that the projection frame can move
/// with the object it is painted on.
#[derive(Clone, Debug)]
pub struct Material {
    /// Material name (for diagnostics)
    pub name: String,

    /// Base color, used where no texel is available
    pub color: Color,

    /// Emitted light, added regardless of lighting
    pub emission: Color,

    /// Optional image projected onto the surface
    pub projection: Option<ImageProjection>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: Color::new(0.5, 0.5, 0.5), // Grey default
            emission: Color::ZERO,
            projection: None,
        }
    }
}

impl Material {
    /// Create a new material with a name and base color.
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            ..Default::default()
        }
    }

    /// Set emitted light.
    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    /// Attach an image projection.
    pub fn with_projection(mut self, projection: ImageProjection) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Check if this material is emissive.
    pub fn is_emissive(&self) -> bool {
        self.emission.length_squared() > 0.0
    }

    /// Surface color at a world-space point.
    pub fn surface_color(&self, point: Vec3) -> Color {
        self.projection
            .as_ref()
            .and_then(|projection| projection.color_at(point))
            .unwrap_or(self.color)
    }

    /// Build cached projection state ahead of rendering.
    pub fn prepare(&self) -> Result<(), ProjectionError> {
        match &self.projection {
            Some(projection) => projection.prepare(),
            None => Ok(()),
        }
    }

    /// Carry the projection along with a translated object.
    pub fn translate(&mut self, offset: Vec3) {
        if let Some(projection) = &mut self.projection {
            projection.translate(offset);
        }
    }

    /// Carry the projection along with a rotated object.
    pub fn rotate(&mut self, rotation: Mat3, pivot: Vec3) {
        if let Some(projection) = &mut self.projection {
            projection.rotate(rotation, pivot);
        }
    }
}
