//! Umbra Tracer - CPU recursive ray tracing for triangle scenes.
//!
//! Traces primary rays from a pinhole camera, finds the nearest triangle
//! through an overlap-bounded box partition (or brute force), shades hits
//! with Phong lighting and soft shadows from sampled area lights, and
//! recurses for mirror materials.

mod accel;
mod camera;
mod light;
mod renderer;
mod tracer;
mod triangle;

pub use accel::{AccelerationStructure, BoundingBox, BoxNode, BuildStats};
pub use camera::Camera;
pub use light::{AreaLight, SAMPLES_PER_RADIUS};
pub use renderer::{build_acceleration_structure, color_to_rgba, render, trace_scene, ImageBuffer};
pub use tracer::{
    direct_light, in_shadow, nearest_hit, reflect, reflected_light, shade, shadow_factor, trace,
    trace_ray, Hit, SceneContext,
};
pub use triangle::{intersect_triangle, point_in_triangle};

/// Re-export common types from the sibling crates
pub use umbra_core::{Color, Geometry, Material, Mesh, TraceConfig};
pub use umbra_math::{Aabb, Ray, Vec3};
