//! Sphere primitive for ray tracing.

use glint_core::Material;
use glint_math::{Mat3, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::intersect::ray_sphere;

/// A sphere primitive.
#[derive(Clone, Debug)]
pub struct Sphere {
    origin: Vec3,
    radius: f64,
    material: Material,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(origin: Vec3, radius: f64, material: Material) -> Self {
        Self {
            origin,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Move the sphere and its projected texture.
    pub fn translate(&mut self, offset: Vec3) {
        self.origin += offset;
        self.material.translate(offset);
    }

    /// Spin the sphere about its own center. Only the texture frame moves.
    pub fn rotate(&mut self, rotation: Mat3) {
        self.material.rotate(rotation, self.origin);
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        let point = ray_sphere(ray, self)?;
        let outward_normal = if self.radius > 0.0 {
            (point - self.origin) / self.radius
        } else {
            -ray.heading.normalize_or_zero()
        };

        Some(HitRecord::new(ray, point, outward_normal, &self.material))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{Color, ImageProjection, ProjectionKind, Texture};
    use std::f64::consts::PI;
    use std::sync::Arc;

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::new("grey", Color::splat(0.5)),
        );

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = sphere.hit(&ray).unwrap();

        assert!((rec.distance - 0.5).abs() < 1e-12); // Should hit at t=0.5
        assert!(rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_sphere_hit_from_inside() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, Material::default());
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let rec = sphere.hit(&ray).unwrap();

        assert!(!rec.front_face);
        assert!((rec.distance - 2.0).abs() < 1e-12);
        // Normal faces back towards the center
        assert!((rec.normal + Vec3::X).length() < 1e-12);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, Material::default());

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.hit(&ray).is_none());
    }

    #[test]
    fn test_sphere_transforms_carry_texture() {
        let texture = Arc::new(Texture::solid_color(Color::ONE));
        let projection =
            ImageProjection::new(ProjectionKind::Spherical, texture, Vec3::ZERO, Vec3::X, Vec3::Y);
        let material = Material::new("globe", Color::ZERO).with_projection(projection);
        let mut sphere = Sphere::new(Vec3::ZERO, 1.0, material);

        sphere.translate(Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(sphere.origin(), Vec3::new(0.0, 3.0, 0.0));
        let projection = sphere.material().projection.as_ref().unwrap();
        assert_eq!(projection.origin(), Vec3::new(0.0, 3.0, 0.0));

        sphere.rotate(Mat3::from_rotation_y(PI));
        let projection = sphere.material().projection.as_ref().unwrap();
        assert_eq!(sphere.origin(), Vec3::new(0.0, 3.0, 0.0));
        assert!((projection.origin() - sphere.origin()).length() < 1e-12);
        assert!((projection.u() + Vec3::X).length() < 1e-12);
    }
}
