//! Render-ready scene: camera, primitives and lights.

use glint_core::{
    Color, Material, ProjectionError, SceneDescription, TextureCache, TextureError,
};
use glint_math::{Ray, Vec3};
use thiserror::Error;

use crate::camera::{Camera, CameraError};
use crate::hittable::{nearest_hit, HitRecord, Hittable};
use crate::{Disc, Sphere};

/// Errors raised while building or preparing a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("{primitive} {index} uses material {material}, but only {count} materials are defined")]
    UnknownMaterial {
        primitive: &'static str,
        index: usize,
        material: usize,
        count: usize,
    },

    #[error("{primitive} {index} has invalid radius {radius}")]
    InvalidRadius {
        primitive: &'static str,
        index: usize,
        radius: f64,
    },

    #[error("disc {index} has a zero-length normal")]
    ZeroNormal { index: usize },

    #[error("texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("material '{name}' has an unusable projection: {source}")]
    Projection {
        name: String,
        #[source]
        source: ProjectionError,
    },

    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
}

/// An omnidirectional point light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
}

impl PointLight {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self { position, color }
    }
}

/// Everything a frame needs, read-only while rendering.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub camera: Camera,
    pub spheres: Vec<Sphere>,
    pub discs: Vec<Disc>,
    pub lights: Vec<PointLight>,
}

impl Scene {
    /// Create an empty scene seen through `camera`.
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            ..Default::default()
        }
    }

    pub fn add_sphere(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    pub fn add_disc(&mut self, disc: Disc) {
        self.discs.push(disc);
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    /// Build a scene from its description, loading images through `textures`.
    ///
    /// Primitives refer to materials by index. A description without any
    /// materials gives every primitive the default material.
    pub fn from_description(
        desc: &SceneDescription,
        textures: &TextureCache,
    ) -> Result<Self, SceneError> {
        let materials = desc
            .materials
            .iter()
            .map(|m| m.to_material(textures))
            .collect::<Result<Vec<_>, _>>()?;

        let material_for = |primitive: &'static str, index: usize, material: usize| {
            if materials.is_empty() {
                return Ok(Material::default());
            }
            materials
                .get(material)
                .cloned()
                .ok_or(SceneError::UnknownMaterial {
                    primitive,
                    index,
                    material,
                    count: materials.len(),
                })
        };

        let cam = &desc.camera;
        let camera = Camera::new()
            .with_position(
                Vec3::from_array(cam.origin),
                Vec3::from_array(cam.heading),
                Vec3::from_array(cam.view_up),
            )
            .with_view_plane(cam.view_plane_distance, cam.magnification)
            .with_lens(cam.lens_radius, cam.focal_distance)
            .with_samples(cam.samples, cam.anti_alias);

        let mut scene = Scene::new(camera);

        for (index, s) in desc.spheres.iter().enumerate() {
            check_radius("sphere", index, s.radius)?;
            let material = material_for("sphere", index, s.material)?;
            scene.add_sphere(Sphere::new(Vec3::from_array(s.origin), s.radius, material));
        }

        for (index, d) in desc.discs.iter().enumerate() {
            check_radius("disc", index, d.radius)?;
            let normal = Vec3::from_array(d.normal);
            if normal.length_squared() == 0.0 {
                return Err(SceneError::ZeroNormal { index });
            }
            let material = material_for("disc", index, d.material)?;
            scene.add_disc(Disc::new(Vec3::from_array(d.origin), normal, d.radius, material));
        }

        for light in &desc.lights {
            scene.add_light(PointLight::new(
                Vec3::from_array(light.position),
                Color::from_array(light.color),
            ));
        }

        log::debug!(
            "Built scene: {} spheres, {} discs, {} lights, {} materials",
            scene.spheres.len(),
            scene.discs.len(),
            scene.lights.len(),
            materials.len()
        );

        Ok(scene)
    }

    /// Resolve every lazily cached basis up front.
    ///
    /// Fails on a degenerate camera or projection, which would otherwise only
    /// show up as missing texels mid-render.
    pub fn prepare(&self) -> Result<(), SceneError> {
        self.camera.coordinate_system()?;

        for material in self.materials() {
            material
                .prepare()
                .map_err(|source| SceneError::Projection {
                    name: material.name.clone(),
                    source,
                })?;
        }

        if self.primitive_count() == 0 {
            log::warn!("Scene has no primitives, every pixel will be background");
        }

        Ok(())
    }

    /// All primitives in scene order: spheres first, then discs.
    pub fn objects(&self) -> impl Iterator<Item = &dyn Hittable> {
        self.spheres
            .iter()
            .map(|s| s as &dyn Hittable)
            .chain(self.discs.iter().map(|d| d as &dyn Hittable))
    }

    /// Closest hit along `ray`. Ties keep the primitive that comes first in
    /// scene order.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        nearest_hit(ray, self.objects())
    }

    pub fn primitive_count(&self) -> usize {
        self.spheres.len() + self.discs.len()
    }

    fn materials(&self) -> impl Iterator<Item = &Material> {
        self.spheres
            .iter()
            .map(Sphere::material)
            .chain(self.discs.iter().map(Disc::material))
    }
}

fn check_radius(primitive: &'static str, index: usize, radius: f64) -> Result<(), SceneError> {
    if radius > 0.0 && radius.is_finite() {
        Ok(())
    } else {
        Err(SceneError::InvalidRadius {
            primitive,
            index,
            radius,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{ImageProjection, ProjectionKind, Texture};
    use std::sync::Arc;

    fn parse(json: &str) -> SceneDescription {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_from_description() {
        let desc = parse(
            r#"{
                "camera": {
                    "origin": [0, 1, -10], "heading": [0, 0, 1],
                    "lens_radius": 0.5, "focal_distance": 10, "samples": 4
                },
                "materials": [ { "name": "a" }, { "name": "b", "color": [1, 0, 0] } ],
                "spheres": [ { "origin": [0, 0, 0], "radius": 1, "material": 1 } ],
                "discs": [ { "origin": [0, -1, 0], "normal": [0, 2, 0], "radius": 5 } ],
                "lights": [ { "position": [0, 10, 0], "color": [0.5, 0.5, 0.5] } ]
            }"#,
        );
        let scene = Scene::from_description(&desc, &TextureCache::new()).unwrap();

        assert_eq!(scene.camera.origin(), Vec3::new(0.0, 1.0, -10.0));
        assert_eq!(scene.camera.samples, 4);
        assert!(scene.camera.has_depth_of_field());
        assert_eq!(scene.spheres[0].material().name, "b");
        assert_eq!(scene.discs[0].material().name, "a");
        assert_eq!(scene.discs[0].normal(), Vec3::Y);
        assert_eq!(scene.lights[0].color, Color::splat(0.5));
        assert_eq!(scene.primitive_count(), 2);
        scene.prepare().unwrap();
    }

    #[test]
    fn test_no_materials_uses_default() {
        let desc = parse(
            r#"{
                "camera": { "origin": [0, 0, 0], "heading": [0, 0, 1] },
                "spheres": [ { "origin": [0, 0, 5], "radius": 1, "material": 3 } ]
            }"#,
        );
        let scene = Scene::from_description(&desc, &TextureCache::new()).unwrap();
        assert_eq!(scene.spheres[0].material().color, Material::default().color);
    }

    #[test]
    fn test_unknown_material() {
        let desc = parse(
            r#"{
                "camera": { "origin": [0, 0, 0], "heading": [0, 0, 1] },
                "materials": [ { "name": "only" } ],
                "discs": [
                    { "origin": [0, 0, 5], "normal": [0, 0, 1], "radius": 1, "material": 2 }
                ]
            }"#,
        );
        let err = Scene::from_description(&desc, &TextureCache::new()).unwrap_err();
        assert!(matches!(
            err,
            SceneError::UnknownMaterial { primitive: "disc", index: 0, material: 2, count: 1 }
        ));
    }

    #[test]
    fn test_invalid_geometry() {
        let desc = parse(
            r#"{
                "camera": { "origin": [0, 0, 0], "heading": [0, 0, 1] },
                "spheres": [
                    { "origin": [0, 0, 5], "radius": 1 },
                    { "origin": [0, 0, 9], "radius": -2 }
                ]
            }"#,
        );
        let err = Scene::from_description(&desc, &TextureCache::new()).unwrap_err();
        assert!(matches!(err, SceneError::InvalidRadius { primitive: "sphere", index: 1, .. }));

        let desc = parse(
            r#"{
                "camera": { "origin": [0, 0, 0], "heading": [0, 0, 1] },
                "discs": [ { "origin": [0, 0, 5], "normal": [0, 0, 0], "radius": 1 } ]
            }"#,
        );
        let err = Scene::from_description(&desc, &TextureCache::new()).unwrap_err();
        assert!(matches!(err, SceneError::ZeroNormal { index: 0 }));
    }

    #[test]
    fn test_missing_texture_is_an_error() {
        let desc = parse(
            r#"{
                "camera": { "origin": [0, 0, 0], "heading": [0, 0, 1] },
                "materials": [ { "projection": { "kind": "parallel", "image": "missing.png" } } ]
            }"#,
        );
        let textures = TextureCache::with_base_dir("/nonexistent-glint-dir");
        let err = Scene::from_description(&desc, &textures).unwrap_err();
        assert!(matches!(err, SceneError::Texture(_)));
    }

    #[test]
    fn test_prepare_reports_bad_camera() {
        let camera = Camera::new().with_position(Vec3::ZERO, Vec3::Y, Vec3::Y);
        let scene = Scene::new(camera);
        assert!(matches!(
            scene.prepare(),
            Err(SceneError::Camera(CameraError::ParallelViewUp { .. }))
        ));
    }

    #[test]
    fn test_prepare_reports_bad_projection() {
        let texture = Arc::new(Texture::solid_color(Color::ONE));
        // u and v are parallel, so the projection basis cannot be inverted
        let projection = ImageProjection::new(
            ProjectionKind::Parallel,
            texture,
            Vec3::ZERO,
            Vec3::X,
            Vec3::X * 2.0,
        );
        let material = Material::new("flat", Color::ONE).with_projection(projection);

        let mut scene = Scene::new(Camera::new());
        scene.add_sphere(Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0, material));

        match scene.prepare() {
            Err(SceneError::Projection { name, .. }) => assert_eq!(name, "flat"),
            other => panic!("expected projection error, got {other:?}"),
        }
    }

    #[test]
    fn test_nearest_hit_across_primitive_kinds() {
        let sphere_material = Material::new("sphere", Color::X);
        let disc_material = Material::new("disc", Color::Y);

        let mut scene = Scene::new(Camera::new());
        scene.add_sphere(Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0, sphere_material.clone()));
        scene.add_disc(Disc::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, 1.0, disc_material.clone()));

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let hit = scene.nearest_hit(&ray).unwrap();
        assert_eq!(hit.material.name, "disc");
        assert!((hit.distance - 5.0).abs() < 1e-12);

        // A disc that touches the sphere's front pole ties with it; the sphere
        // comes first in scene order
        let mut tied = Scene::new(Camera::new());
        tied.add_sphere(Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0, sphere_material));
        tied.add_disc(Disc::new(Vec3::new(0.0, 0.0, 9.0), Vec3::Z, 1.0, disc_material));
        assert_eq!(tied.nearest_hit(&ray).unwrap().material.name, "sphere");
    }
}
