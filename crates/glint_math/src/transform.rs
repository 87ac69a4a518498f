// Transform utilities for Mat3
//
// Extends glam::DMat3 with the checked inversion and pivot rotation used by
// the camera, the primitives and the texture projections.

use crate::{Mat3, Vec3};

/// Smallest determinant magnitude accepted as invertible.
const MIN_DETERMINANT: f64 = 1e-12;

/// Extension trait for Mat3 to provide additional transform utilities
pub trait Mat3Ext {
    /// Invert the matrix, or `None` if it is singular (or not finite).
    fn try_inverse(&self) -> Option<Mat3>;

    /// Rotate a point about a pivot. The matrix is applied to the offset from
    /// the pivot, so the pivot itself is a fixed point.
    fn rotate_about(&self, point: Vec3, pivot: Vec3) -> Vec3;
}

impl Mat3Ext for Mat3 {
    fn try_inverse(&self) -> Option<Mat3> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < MIN_DETERMINANT {
            return None;
        }
        Some(self.inverse())
    }

    fn rotate_about(&self, point: Vec3, pivot: Vec3) -> Vec3 {
        pivot + *self * (point - pivot)
    }
}
