//! Serializable scene description.
//!
//! This is the plain-data form a scene arrives in before the renderer builds
//! its own primitives from it. Vectors are `[x, y, z]` arrays so the JSON
//! stays readable, and every optional field has a default.

use serde::{Deserialize, Serialize};

use glint_math::Vec3;

use crate::material::{Color, Material};
use crate::projection::{ImageProjection, ProjectionKind};
use crate::texture::{TextureCache, TextureResult};

/// A complete scene: camera, output size, materials and primitives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescription {
    pub camera: CameraDescription,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default)]
    pub background: [f64; 3],

    #[serde(default)]
    pub materials: Vec<MaterialDescription>,

    #[serde(default)]
    pub spheres: Vec<SphereDescription>,

    #[serde(default)]
    pub discs: Vec<DiscDescription>,

    #[serde(default)]
    pub lights: Vec<LightDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraDescription {
    pub origin: [f64; 3],
    pub heading: [f64; 3],
    #[serde(default = "default_view_up")]
    pub view_up: [f64; 3],
    #[serde(default = "default_view_plane_distance")]
    pub view_plane_distance: f64,
    #[serde(default)]
    pub lens_radius: f64,
    #[serde(default = "default_focal_distance")]
    pub focal_distance: f64,
    #[serde(default = "default_samples")]
    pub samples: u32,
    #[serde(default)]
    pub anti_alias: bool,
    #[serde(default = "default_magnification")]
    pub magnification: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_color")]
    pub color: [f64; 3],
    #[serde(default)]
    pub emission: [f64; 3],
    #[serde(default)]
    pub projection: Option<ProjectionDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionDescription {
    pub kind: ProjectionKind,
    /// Image path, resolved through the texture cache
    pub image: String,
    #[serde(default)]
    pub origin: [f64; 3],
    #[serde(default = "default_u")]
    pub u: [f64; 3],
    #[serde(default = "default_view_up")]
    pub v: [f64; 3],
    #[serde(default)]
    pub repeat_u: bool,
    #[serde(default)]
    pub repeat_v: bool,
    #[serde(default)]
    pub flip_u: bool,
    #[serde(default)]
    pub flip_v: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereDescription {
    pub origin: [f64; 3],
    pub radius: f64,
    /// Index into `SceneDescription::materials`
    #[serde(default)]
    pub material: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscDescription {
    pub origin: [f64; 3],
    pub normal: [f64; 3],
    pub radius: f64,
    #[serde(default)]
    pub material: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightDescription {
    pub position: [f64; 3],
    #[serde(default = "default_light_color")]
    pub color: [f64; 3],
}

impl MaterialDescription {
    /// Resolve the description into a material, loading its image if any.
    pub fn to_material(&self, textures: &TextureCache) -> TextureResult<Material> {
        let mut material = Material::new(self.name.clone(), Vec3::from_array(self.color))
            .with_emission(Color::from_array(self.emission));

        if let Some(desc) = &self.projection {
            let texture = textures.load(&desc.image)?;
            let projection = ImageProjection::new(
                desc.kind,
                texture,
                Vec3::from_array(desc.origin),
                Vec3::from_array(desc.u),
                Vec3::from_array(desc.v),
            )
            .with_repeat(desc.repeat_u, desc.repeat_v)
            .with_flip(desc.flip_u, desc.flip_v);
            material = material.with_projection(projection);
        }

        Ok(material)
    }
}

impl Default for MaterialDescription {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: default_color(),
            emission: [0.0; 3],
            projection: None,
        }
    }
}

fn default_width() -> u32 {
    320
}

fn default_height() -> u32 {
    240
}

fn default_view_up() -> [f64; 3] {
    [0.0, 1.0, 0.0]
}

fn default_u() -> [f64; 3] {
    [1.0, 0.0, 0.0]
}

fn default_view_plane_distance() -> f64 {
    400.0
}

fn default_focal_distance() -> f64 {
    1.0
}

fn default_samples() -> u32 {
    1
}

fn default_magnification() -> f64 {
    1.0
}

fn default_color() -> [f64; 3] {
    [0.5, 0.5, 0.5]
}

fn default_light_color() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}
