//! Glint Core - scene data shared by the renderer and its front ends.
//!
//! This crate provides:
//!
//! - **Textures**: decoded images and a session-scoped `TextureCache`
//! - **Projections**: parallel, cylindrical and spherical UV mapping
//! - **Materials**: base color, emission and an optional projection
//! - **Scene description**: the serde form scenes are loaded from
//!
//! # Example
//!
//! ```ignore
//! use glint_core::{SceneDescription, TextureCache};
//!
//! let desc: SceneDescription = serde_json::from_str(&json)?;
//! let textures = TextureCache::with_base_dir("scenes/");
//! let material = desc.materials[0].to_material(&textures)?;
//! ```

pub mod description;
pub mod material;
pub mod projection;
pub mod texture;

// Re-export commonly used types
pub use description::{
    CameraDescription, DiscDescription, LightDescription, MaterialDescription,
    ProjectionDescription, SceneDescription, SphereDescription,
};
pub use material::{Color, Material};
pub use projection::{ImageProjection, ProjectionError, ProjectionKind};
pub use texture::{Texture, TextureCache, TextureError, TextureResult};
