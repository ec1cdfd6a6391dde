use crate::Vec3;

/// A ray in 3D space with an origin and a unit-length direction.
///
/// Rays are ephemeral: the tracer builds one per query (primary, shadow or
/// reflection) and drops it once the intersection search is done.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray. The direction is normalized.
    ///
    /// A zero direction stays zero; such a ray intersects nothing.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a ray starting at `origin` and pointing at `target`.
    pub fn towards(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, target - origin)
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Move the origin `epsilon` along the direction.
    ///
    /// Used to start secondary rays just off the surface they leave.
    pub fn offset(&self, epsilon: f32) -> Self {
        Self {
            origin: self.at(epsilon),
            direction: self.direction,
        }
    }
}
