use crate::Vec3;

/// A half-line in 3D space: every point `origin + t * heading` with `t >= 0`.
///
/// The heading is not required to be normalized. Intersection routines are
/// written so their results do not depend on its length.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub heading: Vec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, heading: Vec3) -> Self {
        Self { origin, heading }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the (possibly unnormalized) heading of the ray.
    #[inline]
    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * heading
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.heading * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            heading: Vec3::Z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_creation() {
        let origin = Vec3::new(1.0, 2.0, 3.0);
        let heading = Vec3::new(0.0, 1.0, 0.0);
        let ray = Ray::new(origin, heading);

        assert_eq!(ray.origin, origin);
        assert_eq!(ray.heading, heading);
        assert_eq!(ray.origin(), origin);
        assert_eq!(ray.heading(), heading);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_default_looks_down_z() {
        let ray = Ray::default();
        assert_eq!(ray.origin, Vec3::ZERO);
        assert_eq!(ray.heading, Vec3::Z);
    }
}
