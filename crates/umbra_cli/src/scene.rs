//! Built-in demo scene.

use umbra_core::{Color, Material, Mesh, MeshResult};
use umbra_math::Vec3;

/// Quad from four corners, counter-clockwise as seen from its front.
pub fn quad(corners: [Vec3; 4], material: Material) -> MeshResult<Mesh> {
    Mesh::with_material(corners.to_vec(), vec![0, 1, 2, 0, 2, 3], material)
}

/// Axis-aligned cube with outward-facing triangles.
pub fn cube(center: Vec3, half: f32, material: Material) -> MeshResult<Mesh> {
    let corner = |x: f32, y: f32, z: f32| center + half * Vec3::new(x, y, z);
    let positions = vec![
        corner(-1.0, -1.0, -1.0),
        corner(1.0, -1.0, -1.0),
        corner(1.0, 1.0, -1.0),
        corner(-1.0, 1.0, -1.0),
        corner(-1.0, -1.0, 1.0),
        corner(1.0, -1.0, 1.0),
        corner(1.0, 1.0, 1.0),
        corner(-1.0, 1.0, 1.0),
    ];
    #[rustfmt::skip]
    let indices = vec![
        4, 5, 6, 4, 6, 7, // +Z
        1, 0, 3, 1, 3, 2, // -Z
        5, 1, 2, 5, 2, 6, // +X
        0, 4, 7, 0, 7, 3, // -X
        3, 7, 6, 3, 6, 2, // +Y
        0, 1, 5, 0, 5, 4, // -Y
    ];
    Mesh::with_material(positions, indices, material)
}

/// Mirror floor, a diffuse cube resting on it and a back wall.
pub fn demo_scene() -> MeshResult<Mesh> {
    let mut scene = quad(
        [
            Vec3::new(-3.0, 0.0, 3.0),
            Vec3::new(3.0, 0.0, 3.0),
            Vec3::new(3.0, 0.0, -3.0),
            Vec3::new(-3.0, 0.0, -3.0),
        ],
        Material::mirror("floor", Color::splat(0.6)),
    )?;

    scene.append(&cube(
        Vec3::new(0.0, 0.5, 0.0),
        0.5,
        Material::diffuse("cube", Color::new(0.8, 0.3, 0.2))
            .with_ambient(Color::new(0.08, 0.03, 0.02))
            .with_specular(Color::splat(0.4), 32.0),
    )?);

    scene.append(&quad(
        [
            Vec3::new(-3.0, 0.0, -3.0),
            Vec3::new(3.0, 0.0, -3.0),
            Vec3::new(3.0, 3.0, -3.0),
            Vec3::new(-3.0, 3.0, -3.0),
        ],
        Material::diffuse("wall", Color::new(0.4, 0.5, 0.7)),
    )?);

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_core::Geometry;

    #[test]
    fn test_demo_scene() {
        let scene = demo_scene().expect("demo scene");

        assert_eq!(scene.triangle_count(), 2 + 12 + 2);
        assert_eq!(scene.material_count(), 3);
        assert!(scene.material(scene.face(0).material_id).is_reflective());
        assert!(!scene.material(scene.face(2).material_id).is_reflective());
    }

    #[test]
    fn test_cube_normals_point_outwards() {
        let center = Vec3::new(1.0, 2.0, 3.0);
        let mesh = cube(center, 0.5, Material::default()).expect("cube");

        for id in 0..mesh.face_count() {
            let face = mesh.face(id);
            let [a, b, c] = mesh.face_vertices(id);
            let face_center = (a + b + c) / 3.0;
            assert!(face.normal.dot(face_center - center) > 0.0, "face {id}");
        }
    }

    #[test]
    fn test_floor_faces_up() {
        let scene = demo_scene().expect("demo scene");
        assert!(scene.face(0).normal.abs_diff_eq(Vec3::Y, 1e-6));
        assert!(scene.face(1).normal.abs_diff_eq(Vec3::Y, 1e-6));
    }
}
