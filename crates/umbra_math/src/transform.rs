// Transform utilities for Mat4
//
// glam::Mat4 already provides transform_point3() and inverse(); normals need
// the inverse-transpose so they stay perpendicular under non-uniform scale.

use glam::{Mat4, Vec3};

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform a surface normal and renormalize it.
    ///
    /// Returns zero for a zero normal or a singular matrix.
    fn transform_normal(&self, normal: Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        if self.determinant().abs() < f32::EPSILON {
            return Vec3::ZERO;
        }
        let normal_matrix = self.inverse().transpose();
        normal_matrix.transform_vector3(normal).normalize_or_zero()
    }
}
