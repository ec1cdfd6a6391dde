//! Umbra Core - Scene data consumed by the ray tracer.
//!
//! This crate provides:
//!
//! - **Geometry provider**: the read-only `Geometry` trait the tracer queries,
//!   plus `Mesh`, an in-memory triangle mesh implementing it
//! - **Materials**: Phong `Material` with an MTL-style `IlluminationModel`
//! - **Configuration**: validated render, light, camera and acceleration
//!   settings that can be loaded from JSON
//!
//! # Example
//!
//! ```ignore
//! use umbra_core::{Material, Mesh};
//!
//! let mesh = Mesh::with_material(positions, indices, Material::default())?;
//! println!("{} triangles", mesh.triangle_count());
//! ```

pub mod config;
pub mod geometry;
pub mod material;
pub mod mesh;

// Re-export commonly used types
pub use config::{
    AccelParams, CameraDesc, ConfigError, ConfigResult, LightDesc, RenderDesc, TraceConfig,
};
pub use geometry::{Face, Geometry};
pub use material::{Color, IlluminationModel, Material};
pub use mesh::{Mesh, MeshError, MeshResult};
