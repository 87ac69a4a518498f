//! Hittable trait and HitRecord for ray-object intersection.

use glint_core::Material;
use glint_math::{Ray, Vec3};

/// Record of a ray-object intersection.
#[derive(Clone, Debug)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub point: Vec3,
    /// Unit surface normal at the point (always points against the ray)
    pub normal: Vec3,
    /// Distance from the ray origin to the point
    pub distance: f64,
    /// Material at the intersection point
    pub material: &'a Material,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record, orienting the normal against the ray.
    ///
    /// If the ray and the outward normal point the same way the ray is
    /// leaving the surface and the back face was hit.
    pub fn new(ray: &Ray, point: Vec3, outward_normal: Vec3, material: &'a Material) -> Self {
        let front_face = ray.heading.dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            point,
            normal,
            distance: ray.origin.distance(point),
            material,
            front_face,
        }
    }
}

/// Trait for objects that can be hit by rays.
///
/// Implementations must be pure: scene data is shared read-only between
/// every render thread.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object, returning the visible hit.
    fn hit(&self, ray: &Ray) -> Option<HitRecord<'_>>;
}

/// Pick the hit closest to the ray origin among `objects`.
///
/// Ties keep the earlier object.
pub fn nearest_hit<'a, I>(ray: &Ray, objects: I) -> Option<HitRecord<'a>>
where
    I: IntoIterator<Item = &'a dyn Hittable>,
{
    let mut closest: Option<HitRecord<'a>> = None;

    for object in objects {
        if let Some(rec) = object.hit(ray) {
            if closest.as_ref().map_or(true, |best| rec.distance < best.distance) {
                closest = Some(rec);
            }
        }
    }

    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Disc, Sphere};
    use glint_core::Color;

    #[test]
    fn test_face_normal_orientation() {
        let material = Material::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);

        let front = HitRecord::new(&ray, Vec3::new(0.0, 0.0, 1.0), Vec3::Z, &material);
        assert!(front.front_face);
        assert_eq!(front.normal, Vec3::Z);
        assert_eq!(front.distance, 4.0);

        let back = HitRecord::new(&ray, Vec3::new(0.0, 0.0, -1.0), -Vec3::Z, &material);
        assert!(!back.front_face);
        assert_eq!(back.normal, Vec3::Z);
    }

    #[test]
    fn test_nearest_hit_picks_closest() {
        let far = Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0, Material::new("far", Color::X));
        let near = Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0, Material::new("near", Color::Y));
        let floor = Disc::new(
            Vec3::new(0.0, 0.0, -20.0),
            Vec3::Z,
            5.0,
            Material::new("floor", Color::Z),
        );

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let objects: [&dyn Hittable; 3] = [&far, &floor, &near];
        let rec = nearest_hit(&ray, objects).unwrap();

        assert_eq!(rec.material.name, "near");
        assert!((rec.distance - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_hit_none() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0, Material::default());
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let objects: [&dyn Hittable; 1] = [&sphere];
        assert!(nearest_hit(&ray, objects).is_none());
    }
}
