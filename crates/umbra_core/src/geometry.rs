//! Read-only geometry provider interface.
//!
//! The tracer never owns scene geometry: it reads faces, world-space vertex
//! positions and materials through this trait, addressing faces by index.

use umbra_math::{Mat4, Vec3};

use crate::material::Material;

/// A triangle as seen by the tracer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Vertex ids, counter-clockwise when seen from the front
    pub vertex_ids: [u32; 3],
    /// Unit outward normal in world space (zero for degenerate faces)
    pub normal: Vec3,
    /// Index into the provider's material list
    pub material_id: usize,
}

/// Trait for scene geometry the tracer can query.
///
/// Implementations must be immutable while a render is running; the tracer
/// shares them across worker threads.
pub trait Geometry: Send + Sync {
    /// Number of triangles.
    fn face_count(&self) -> usize;

    /// Face `id` in `0..face_count()`.
    fn face(&self, id: usize) -> Face;

    /// World-space position of vertex `id`.
    fn vertex(&self, id: u32) -> Vec3;

    /// Object-to-world transform already applied by `vertex`.
    fn world_transform(&self) -> Mat4;

    /// Number of materials.
    fn material_count(&self) -> usize;

    /// Material `id` in `0..material_count()`.
    fn material(&self, id: usize) -> &Material;

    /// World-space corners of face `id`.
    fn face_vertices(&self, id: usize) -> [Vec3; 3] {
        self.face(id).vertex_ids.map(|v| self.vertex(v))
    }

    /// Unit world-space normal of face `id`; zero for degenerate faces.
    fn face_normal(&self, id: usize) -> Vec3 {
        self.face(id).normal
    }
}
