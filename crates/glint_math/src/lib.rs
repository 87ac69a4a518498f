//! Glint math types.
//!
//! Thin layer over `glam`'s double-precision types. The renderer works in
//! `f64` throughout, so the aliases below are what every other crate uses.

// Re-export glam for convenience
pub use glam;

/// Double-precision 3D vector.
pub type Vec3 = glam::DVec3;

/// Double-precision 3x3 matrix (column-major).
pub type Mat3 = glam::DMat3;

mod ray;
mod transform;

pub use ray::Ray;
pub use transform::Mat3Ext;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_mat3_columns() {
        let m = Mat3::from_cols(Vec3::X, Vec3::Y, Vec3::Z);
        assert_eq!(m * Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, 3.0));
    }
}
