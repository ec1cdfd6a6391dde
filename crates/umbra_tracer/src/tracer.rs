//! Recursive ray tracing: nearest hit, Phong shading, soft shadows, mirrors.
//!
//! All state a ray needs is carried in a `SceneContext`, which only borrows
//! the scene. Functions here are pure reads, so any number of pixels can be
//! traced at once.

use umbra_core::{Color, Geometry, TraceConfig};
use umbra_math::{Ray, Vec3};

use crate::accel::AccelerationStructure;
use crate::light::AreaLight;
use crate::triangle::intersect_triangle;

/// Read-only view of everything a traced ray may query.
#[derive(Clone, Copy)]
pub struct SceneContext<'a> {
    pub geometry: &'a dyn Geometry,
    pub lights: &'a [AreaLight],
    /// `None` tests every face for every ray
    pub accel: Option<&'a AccelerationStructure>,
    pub config: &'a TraceConfig,
}

impl<'a> SceneContext<'a> {
    pub fn new(geometry: &'a dyn Geometry, lights: &'a [AreaLight], config: &'a TraceConfig) -> Self {
        Self {
            geometry,
            lights,
            accel: None,
            config,
        }
    }

    /// Route intersection queries through `accel`.
    pub fn with_acceleration(mut self, accel: Option<&'a AccelerationStructure>) -> Self {
        self.accel = accel;
        self
    }

    fn intersect(&self, ray: &Ray, face: usize) -> Option<f32> {
        intersect_triangle(ray, self.geometry.face_vertices(face), self.config.two_sided)
    }

    fn candidates(&self, ray: &Ray) -> Candidates {
        match self.accel {
            Some(accel) => Candidates::Listed(accel.candidate_faces(ray)),
            None => Candidates::All(self.geometry.face_count()),
        }
    }
}

/// Faces a ray has to be tested against.
enum Candidates {
    All(usize),
    Listed(Vec<usize>),
}

impl Candidates {
    fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let (all, listed): (usize, &[usize]) = match self {
            Candidates::All(count) => (*count, &[]),
            Candidates::Listed(faces) => (0, faces.as_slice()),
        };
        (0..all).chain(listed.iter().copied())
    }
}

/// Nearest intersection along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub face: usize,
    /// Distance along the (unit) ray direction
    pub t: f32,
    pub point: Vec3,
}

/// Color seen from `origin` looking towards `target`.
///
/// Primary rays are traced at depth 0. Beyond `max_depth` the background is
/// returned without testing any geometry.
pub fn trace_ray(ctx: &SceneContext, origin: Vec3, target: Vec3, depth: u32) -> Color {
    trace(ctx, &Ray::towards(origin, target), depth)
}

/// Color carried back along `ray` at recursion level `depth`.
pub fn trace(ctx: &SceneContext, ray: &Ray, depth: u32) -> Color {
    if depth > ctx.config.max_depth || ray.direction == Vec3::ZERO {
        return ctx.config.background;
    }

    match nearest_hit(ctx, ray) {
        Some(hit) => shade(ctx, &hit, ray, depth),
        None => ctx.config.background,
    }
}

/// Closest face the ray hits at `t > 0`.
///
/// Back faces are skipped unless the config is two-sided. Ties keep the
/// face tested first.
pub fn nearest_hit(ctx: &SceneContext, ray: &Ray) -> Option<Hit> {
    let mut nearest: Option<Hit> = None;
    for face in ctx.candidates(ray).iter() {
        let Some(t) = ctx.intersect(ray, face) else {
            continue;
        };
        if nearest.map_or(true, |hit| t < hit.t) {
            nearest = Some(Hit {
                face,
                t,
                point: ray.at(t),
            });
        }
    }
    nearest
}

/// Local lighting plus any mirror reflection at a hit.
pub fn shade(ctx: &SceneContext, hit: &Hit, ray: &Ray, depth: u32) -> Color {
    direct_light(ctx, hit, ray.direction) + reflected_light(ctx, hit, ray.direction, depth)
}

/// Ambient plus Phong diffuse and specular from every light sample that
/// sees the hit point, each light's samples weighted equally.
///
/// `view_dir` is the direction of the incoming ray.
pub fn direct_light(ctx: &SceneContext, hit: &Hit, view_dir: Vec3) -> Color {
    let material = ctx.geometry.material(ctx.geometry.face(hit.face).material_id);
    let normal = ctx.geometry.face_normal(hit.face);
    let to_eye = -view_dir;

    let mut color = material.ambient;
    for light in ctx.lights {
        let samples = light.samples();
        let weight = 1.0 / samples.len() as f32;

        let mut sum = Color::ZERO;
        for &sample in samples {
            let to_light = sample - hit.point;
            let distance = to_light.length();
            if distance <= 0.0 {
                continue;
            }
            let light_dir = to_light / distance;
            if in_shadow(ctx, hit.point, normal, light_dir, distance) {
                continue;
            }

            let diffuse = material.diffuse * normal.dot(light_dir).max(0.0);
            let reflected = reflect(-light_dir, normal);
            let specular =
                material.specular * reflected.dot(to_eye).max(0.0).powf(material.shininess);
            sum += diffuse + specular;
        }
        color += sum * weight * light.color();
    }
    color
}

/// Mirror contribution: the reflected ray's color scaled by the specular
/// coefficient. Zero for non-mirror materials.
pub fn reflected_light(ctx: &SceneContext, hit: &Hit, view_dir: Vec3, depth: u32) -> Color {
    let face = ctx.geometry.face(hit.face);
    let material = ctx.geometry.material(face.material_id);
    if !material.is_reflective() {
        return Color::ZERO;
    }

    let direction = reflect(view_dir, ctx.geometry.face_normal(hit.face));
    let ray = Ray::new(hit.point, direction).offset(ctx.config.shadow_epsilon);
    trace(ctx, &ray, depth + 1) * material.specular
}

/// Whether the light sample in direction `light_dir` at `distance` is hidden
/// from `point`.
///
/// Faces turned away from the light count as shadowed. Otherwise a shadow
/// ray starts `shadow_epsilon` off the surface and any face strictly between
/// it and the sample blocks the light.
pub fn in_shadow(
    ctx: &SceneContext,
    point: Vec3,
    normal: Vec3,
    light_dir: Vec3,
    distance: f32,
) -> bool {
    if normal.dot(light_dir) <= 0.0 {
        return true;
    }

    let epsilon = ctx.config.shadow_epsilon;
    let ray = Ray::new(point, light_dir).offset(epsilon);
    let limit = distance - epsilon;
    for face in ctx.candidates(&ray).iter() {
        if ctx.intersect(&ray, face).is_some_and(|t| t < limit) {
            return true;
        }
    }
    false
}

/// Fraction of the light's samples visible from `point`, in `[0, 1]`.
pub fn shadow_factor(ctx: &SceneContext, point: Vec3, normal: Vec3, light: &AreaLight) -> f32 {
    let samples = light.samples();
    let visible = samples
        .iter()
        .filter(|&&sample| {
            let to_light = sample - point;
            let distance = to_light.length();
            distance > 0.0 && !in_shadow(ctx, point, normal, to_light / distance, distance)
        })
        .count();
    visible as f32 / samples.len() as f32
}

/// Mirror `v` about the plane with unit normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use umbra_core::{Material, Mesh};

    fn quad(z: f32, half: f32, material: Material) -> Mesh {
        let positions = vec![
            Vec3::new(-half, -half, z),
            Vec3::new(half, -half, z),
            Vec3::new(half, half, z),
            Vec3::new(-half, half, z),
        ];
        Mesh::with_material(positions, vec![0, 1, 2, 0, 2, 3], material).expect("quad")
    }

    /// `quad` wound the other way, facing -Z.
    fn quad_facing_down(z: f32, half: f32) -> Mesh {
        let positions = vec![
            Vec3::new(-half, -half, z),
            Vec3::new(half, -half, z),
            Vec3::new(half, half, z),
            Vec3::new(-half, half, z),
        ];
        Mesh::with_material(positions, vec![0, 2, 1, 0, 3, 2], Material::default()).expect("quad")
    }

    #[test]
    fn test_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        assert_eq!(reflect(v, Vec3::Y), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_double_reflection_is_identity() {
        let n = Vec3::new(1.0, 2.0, -0.5).normalize();
        for v in [Vec3::X, Vec3::new(0.3, -0.7, 0.2), Vec3::new(-4.0, 1.0, 9.0)] {
            let back = reflect(reflect(v, n), n);
            assert!(back.abs_diff_eq(v, 1e-5), "{v} -> {back}");
        }
    }

    #[test]
    fn test_candidates_iter() {
        assert_eq!(Candidates::All(3).iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(
            Candidates::Listed(vec![5, 2]).iter().collect::<Vec<_>>(),
            vec![5, 2]
        );
    }

    #[test]
    fn test_nearest_hit_picks_closest() {
        let mut mesh = quad(-3.0, 1.0, Material::default());
        mesh.append(&quad(-1.0, 1.0, Material::default()));
        let config = TraceConfig::default();
        let ctx = SceneContext::new(&mesh, &[], &config);

        let hit = nearest_hit(&ctx, &Ray::new(Vec3::new(0.1, 0.2, 0.0), -Vec3::Z))
            .expect("ray hits both quads");
        assert!(hit.face >= 2);
        assert_relative_eq!(hit.t, 1.0, epsilon = 1e-5);
        assert_relative_eq!(hit.point.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_past_max_depth_returns_background() {
        let mesh = quad(-1.0, 1.0, Material::default());
        let config = TraceConfig {
            background: Color::new(0.1, 0.2, 0.3),
            max_depth: 2,
            ..Default::default()
        };
        let ctx = SceneContext::new(&mesh, &[], &config);

        let color = trace_ray(&ctx, Vec3::ZERO, -Vec3::Z, 3);
        assert_eq!(color, config.background);
    }

    #[test]
    fn test_degenerate_ray_returns_background() {
        let mesh = quad(-1.0, 1.0, Material::default());
        let config = TraceConfig::default();
        let ctx = SceneContext::new(&mesh, &[], &config);

        assert_eq!(trace_ray(&ctx, Vec3::ONE, Vec3::ONE, 0), config.background);
    }

    #[test]
    fn test_back_facing_light_is_shadowed() {
        let mesh = Mesh::empty();
        let config = TraceConfig::default();
        let ctx = SceneContext::new(&mesh, &[], &config);

        assert!(in_shadow(&ctx, Vec3::ZERO, Vec3::Z, -Vec3::Z, 1.0));
        assert!(in_shadow(&ctx, Vec3::ZERO, Vec3::Z, Vec3::X, 1.0));
        assert!(!in_shadow(&ctx, Vec3::ZERO, Vec3::Z, Vec3::Z, 1.0));
    }

    #[test]
    fn test_occluder_beyond_light_does_not_shadow() {
        // Blocker at z=2, light at z=1
        let mesh = quad_facing_down(2.0, 1.0);
        let config = TraceConfig::default();
        let ctx = SceneContext::new(&mesh, &[], &config);

        assert!(!in_shadow(&ctx, Vec3::ZERO, Vec3::Z, Vec3::Z, 1.0));
        assert!(in_shadow(&ctx, Vec3::ZERO, Vec3::Z, Vec3::Z, 3.0));
    }

    #[test]
    fn test_back_face_blocks_only_when_two_sided() {
        // Blocker at z=2 facing away from the shaded point
        let mesh = quad(2.0, 1.0, Material::default());
        let culled = TraceConfig::default();
        let two_sided = TraceConfig {
            two_sided: true,
            ..Default::default()
        };

        let ctx = SceneContext::new(&mesh, &[], &culled);
        assert!(!in_shadow(&ctx, Vec3::ZERO, Vec3::Z, Vec3::Z, 3.0));
        let ctx = SceneContext::new(&mesh, &[], &two_sided);
        assert!(in_shadow(&ctx, Vec3::ZERO, Vec3::Z, Vec3::Z, 3.0));
    }

    #[test]
    fn test_back_face_is_invisible_by_default() {
        let material = Material {
            ambient: Color::splat(0.3),
            ..Material::default()
        };
        let mesh = quad(0.0, 1.0, material);
        let background = Color::new(0.0, 0.0, 1.0);
        let culled = TraceConfig {
            background,
            ..Default::default()
        };
        let two_sided = TraceConfig {
            two_sided: true,
            ..culled.clone()
        };

        // Eye behind the +Z facing quad
        let eye = Vec3::new(0.0, 0.0, -2.0);
        let ctx = SceneContext::new(&mesh, &[], &culled);
        assert_eq!(trace_ray(&ctx, eye, Vec3::new(0.1, 0.2, 0.0), 0), background);
        let ctx = SceneContext::new(&mesh, &[], &two_sided);
        let color = trace_ray(&ctx, eye, Vec3::new(0.1, 0.2, 0.0), 0);
        assert!(color.abs_diff_eq(Color::splat(0.3), 1e-6), "{color}");
    }

    #[test]
    fn test_shadow_factor_fraction() {
        // Blocker covers x in [-1, 0] at z=1
        let positions = vec![
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(0.0, -1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];
        // Wound to face the shaded point below it
        let mesh = Mesh::with_material(positions, vec![0, 2, 1, 0, 3, 2], Material::default())
            .expect("blocker");
        let config = TraceConfig::default();
        let ctx = SceneContext::new(&mesh, &[], &config);

        let samples = vec![
            Vec3::new(-0.5, 0.0, 2.0),
            Vec3::new(0.5, 0.0, 2.0),
            Vec3::new(1.0, 0.0, 2.0),
            Vec3::new(1.5, 0.0, 2.0),
        ];
        let light = AreaLight::with_samples(Vec3::new(0.5, 0.0, 2.0), Color::ONE, 1.0, samples)
            .expect("light");

        assert_relative_eq!(shadow_factor(&ctx, Vec3::ZERO, Vec3::Z, &light), 0.75);
    }
}
