//! Disc primitive: a plane bounded by a radius around its origin.

use glint_core::Material;
use glint_math::{Mat3, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::intersect::ray_disc;

/// A flat, two-sided disc.
#[derive(Clone, Debug)]
pub struct Disc {
    origin: Vec3,
    normal: Vec3,
    radius: f64,
    material: Material,
}

impl Disc {
    /// Create a new disc. The normal is normalized; a zero normal yields a
    /// disc no ray can hit.
    pub fn new(origin: Vec3, normal: Vec3, radius: f64, material: Material) -> Self {
        Self {
            origin,
            normal: normal.normalize_or_zero(),
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Move the disc and its projected texture.
    pub fn translate(&mut self, offset: Vec3) {
        self.origin += offset;
        self.material.translate(offset);
    }

    /// Tilt the disc about its own origin.
    pub fn rotate(&mut self, rotation: Mat3) {
        self.normal = (rotation * self.normal).normalize_or_zero();
        self.material.rotate(rotation, self.origin);
    }
}

impl Hittable for Disc {
    fn hit(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        let point = ray_disc(ray, self)?;
        Some(HitRecord::new(ray, point, self.normal, &self.material))
    }
}
