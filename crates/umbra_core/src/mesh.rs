//! In-memory triangle mesh implementing the `Geometry` provider.
//!
//! Positions are stored in object space together with a world transform;
//! world-space positions and face normals are cached at construction so the
//! tracer's hot loop only does lookups.

use thiserror::Error;
use umbra_math::{Aabb, Mat4, Mat4Ext, Vec3};

use crate::geometry::{Face, Geometry};
use crate::material::Material;

/// Errors that can occur while assembling a mesh.
#[derive(Error, Debug, PartialEq)]
pub enum MeshError {
    #[error("index count {0} is not a multiple of 3")]
    IndexCount(usize),

    #[error("face {face} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    VertexOutOfRange {
        face: usize,
        vertex: u32,
        vertex_count: usize,
    },

    #[error("{material_ids} material ids given for {faces} faces")]
    MaterialIdCount { material_ids: usize, faces: usize },

    #[error("face {face} uses material {material}, but the mesh has {material_count} materials")]
    MaterialOutOfRange {
        face: usize,
        material: usize,
        material_count: usize,
    },
}

/// Result type for mesh construction.
pub type MeshResult<T> = Result<T, MeshError>;

/// A triangle mesh with per-face materials.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions in object space
    positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle, CCW winding)
    indices: Vec<u32>,

    /// Material index for each triangle
    material_ids: Vec<usize>,

    materials: Vec<Material>,

    transform: Mat4,

    /// Cached world-space positions
    world_positions: Vec<Vec3>,

    /// Cached world-space unit face normals
    face_normals: Vec<Vec3>,

    /// World-space bounds
    bounds: Aabb,
}

impl Mesh {
    /// Create a mesh, validating every index.
    pub fn new(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        material_ids: Vec<usize>,
        materials: Vec<Material>,
    ) -> MeshResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::IndexCount(indices.len()));
        }
        let faces = indices.len() / 3;
        if material_ids.len() != faces {
            return Err(MeshError::MaterialIdCount {
                material_ids: material_ids.len(),
                faces,
            });
        }
        for (face, chunk) in indices.chunks(3).enumerate() {
            if let Some(&vertex) = chunk.iter().find(|&&v| v as usize >= positions.len()) {
                return Err(MeshError::VertexOutOfRange {
                    face,
                    vertex,
                    vertex_count: positions.len(),
                });
            }
        }
        for (face, &material) in material_ids.iter().enumerate() {
            if material >= materials.len() {
                return Err(MeshError::MaterialOutOfRange {
                    face,
                    material,
                    material_count: materials.len(),
                });
            }
        }

        let mut mesh = Self {
            positions,
            indices,
            material_ids,
            materials,
            transform: Mat4::IDENTITY,
            world_positions: Vec::new(),
            face_normals: Vec::new(),
            bounds: Aabb::EMPTY,
        };
        mesh.update_world_cache();
        Ok(mesh)
    }

    /// Create a mesh where every triangle uses the same material.
    pub fn with_material(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        material: Material,
    ) -> MeshResult<Self> {
        let material_ids = vec![0; indices.len() / 3];
        Self::new(positions, indices, material_ids, vec![material])
    }

    /// Create an empty mesh (no triangles, no materials).
    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            indices: Vec::new(),
            material_ids: Vec::new(),
            materials: Vec::new(),
            transform: Mat4::IDENTITY,
            world_positions: Vec::new(),
            face_normals: Vec::new(),
            bounds: Aabb::EMPTY,
        }
    }

    /// Builder-style setter for the object-to-world transform.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self.update_world_cache();
        self
    }

    /// Append another mesh, keeping its world transform baked in.
    pub fn append(&mut self, other: &Mesh) {
        let to_local = self.transform.inverse();
        let vertex_base = self.positions.len() as u32;
        let material_base = self.materials.len();

        self.positions
            .extend(other.world_positions.iter().map(|&p| to_local.transform_point3(p)));
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_base));
        self.material_ids
            .extend(other.material_ids.iter().map(|&m| m + material_base));
        self.materials.extend(other.materials.iter().cloned());
        self.update_world_cache();
    }

    fn update_world_cache(&mut self) {
        self.world_positions = self
            .positions
            .iter()
            .map(|&p| self.transform.transform_point3(p))
            .collect();

        self.face_normals = self
            .indices
            .chunks(3)
            .enumerate()
            .map(|(face, chunk)| {
                let p0 = self.positions[chunk[0] as usize];
                let p1 = self.positions[chunk[1] as usize];
                let p2 = self.positions[chunk[2] as usize];
                let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
                if normal == Vec3::ZERO {
                    log::debug!("Face {} is degenerate and will never be hit", face);
                }
                self.transform.transform_normal(normal)
            })
            .collect();

        let used = self.indices.iter().map(|&i| self.world_positions[i as usize]);
        self.bounds = Aabb::enclosing(used);
    }

    /// World-space bounding box of all triangles.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }
}

impl Geometry for Mesh {
    fn face_count(&self) -> usize {
        self.triangle_count()
    }

    fn face(&self, id: usize) -> Face {
        let base = id * 3;
        Face {
            vertex_ids: [
                self.indices[base],
                self.indices[base + 1],
                self.indices[base + 2],
            ],
            normal: self.face_normals[id],
            material_id: self.material_ids[id],
        }
    }

    fn vertex(&self, id: u32) -> Vec3 {
        self.world_positions[id as usize]
    }

    fn world_transform(&self) -> Mat4 {
        self.transform
    }

    fn material_count(&self) -> usize {
        self.materials.len()
    }

    fn material(&self, id: usize) -> &Material {
        &self.materials[id]
    }
}
