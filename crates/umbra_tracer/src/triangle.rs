//! Ray/triangle intersection.
//!
//! Intersects the ray with the triangle's supporting plane, then checks that
//! the plane hit lies on the inner side of all three edges. Degenerate
//! triangles and rays parallel to the plane report no hit. The front side
//! is the one `(v1 - v0) × (v2 - v0)` points to.

use umbra_math::{Ray, Vec3};

/// Triangles with sin² of the angle at `v0` below this never hit.
const DEGENERATE_SIN_SQ: f32 = 1e-12;

/// Relative bound on |n·d| below which the ray counts as parallel.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Relative slack on the edge tests so hits exactly on a shared edge are
/// reported by both neighbours instead of neither.
const EDGE_TOLERANCE: f32 = 1e-6;

/// Distance along `ray` to the triangle, if the ray hits it at `t > 0`.
///
/// Only the front side is hit unless `two_sided` is set.
pub fn intersect_triangle(ray: &Ray, [v0, v1, v2]: [Vec3; 3], two_sided: bool) -> Option<f32> {
    let e0 = v1 - v0;
    let e1 = v2 - v0;
    let normal = e0.cross(e1);
    let normal_len_sq = normal.length_squared();
    // Scale free; `<=` also catches zero-length edges
    if normal_len_sq <= DEGENERATE_SIN_SQ * e0.length_squared() * e1.length_squared() {
        return None;
    }

    let denominator = normal.dot(ray.direction);
    if denominator.abs() <= PARALLEL_EPSILON * normal_len_sq.sqrt() {
        return None;
    }
    if !two_sided && denominator > 0.0 {
        return None;
    }

    let t = normal.dot(v0 - ray.origin) / denominator;
    // Also rejects NaN
    if !(t > 0.0) {
        return None;
    }

    point_in_triangle(ray.at(t), [v0, v1, v2], normal).then_some(t)
}

/// Whether a point on the triangle's plane lies inside it.
///
/// `normal` is the unnormalized `(v1 - v0) × (v2 - v0)`. Each edge's cross
/// product with the point must agree in sign with it.
pub fn point_in_triangle(p: Vec3, [v0, v1, v2]: [Vec3; 3], normal: Vec3) -> bool {
    let tolerance = -EDGE_TOLERANCE * normal.length_squared();

    let edge0 = (v1 - v0).cross(p - v0).dot(normal);
    if edge0 < tolerance {
        return false;
    }
    let edge1 = (v2 - v1).cross(p - v1).dot(normal);
    if edge1 < tolerance {
        return false;
    }
    let edge2 = (v0 - v2).cross(p - v2).dot(normal);
    edge2 >= tolerance
}
