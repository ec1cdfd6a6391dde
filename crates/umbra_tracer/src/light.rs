//! Area lights sampled for soft shadows.
//!
//! A light is a sphere of radius `r` represented by points scattered over its
//! surface. Shading averages visibility over those points, which turns hard
//! shadow edges into penumbrae. A point light is the same type with radius 0
//! and a single sample at its center.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use umbra_core::config::validate_radius;
use umbra_core::{Color, ConfigError, ConfigResult, LightDesc};
use umbra_math::Vec3;

/// Sample points generated per unit of light radius.
pub const SAMPLES_PER_RADIUS: f32 = 80.0;

/// A spherical light with precomputed sample points.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaLight {
    center: Vec3,
    color: Color,
    radius: f32,
    samples: Vec<Vec3>,
}

impl AreaLight {
    /// A point light: one sample at `center`.
    pub fn point(center: Vec3, color: Color) -> Self {
        Self {
            center,
            color,
            radius: 0.0,
            samples: vec![center],
        }
    }

    /// A sphere light with samples placed uniformly on its surface.
    pub fn sphere(
        center: Vec3,
        color: Color,
        radius: f32,
        rng: &mut dyn RngCore,
    ) -> ConfigResult<Self> {
        validate_radius(radius)?;

        let count = Self::sample_count_for_radius(radius);
        if count == 1 {
            return Ok(Self {
                radius,
                ..Self::point(center, color)
            });
        }

        let samples = (0..count)
            .map(|_| center + radius * random_unit_vector(rng))
            .collect();
        Ok(Self {
            center,
            color,
            radius,
            samples,
        })
    }

    /// A light with caller-chosen sample points.
    pub fn with_samples(
        center: Vec3,
        color: Color,
        radius: f32,
        samples: Vec<Vec3>,
    ) -> ConfigResult<Self> {
        validate_radius(radius)?;
        if samples.is_empty() {
            return Err(ConfigError::EmptyLightSamples);
        }
        Ok(Self {
            center,
            color,
            radius,
            samples,
        })
    }

    /// Build a light from its description, seeding the sampler if asked to.
    pub fn from_desc(desc: &LightDesc) -> ConfigResult<Self> {
        let mut rng = match desc.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::sphere(desc.center, desc.color, desc.radius, &mut rng)
    }

    /// Number of samples a light of this radius gets (at least 1).
    pub fn sample_count_for_radius(radius: f32) -> usize {
        (radius * SAMPLES_PER_RADIUS).max(1.0) as usize
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Sample points, in generation order.
    pub fn samples(&self) -> &[Vec3] {
        &self.samples
    }

    pub fn is_point(&self) -> bool {
        self.samples.len() == 1
    }
}

#[inline]
fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}

/// Generate a random unit vector on the unit sphere.
fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Rejection sampling keeps the distribution uniform on the sphere
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_light() {
        let light = AreaLight::point(Vec3::new(1.0, 2.0, 3.0), Color::ONE);

        assert!(light.is_point());
        assert_eq!(light.radius(), 0.0);
        assert_eq!(light.samples(), &[Vec3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_sample_count_scales_with_radius() {
        assert_eq!(AreaLight::sample_count_for_radius(0.0), 1);
        assert_eq!(AreaLight::sample_count_for_radius(0.005), 1);
        assert_eq!(AreaLight::sample_count_for_radius(0.3), 24);
        assert_eq!(AreaLight::sample_count_for_radius(1.0), 80);

        let mut previous = 0;
        for step in 0..50 {
            let count = AreaLight::sample_count_for_radius(step as f32 * 0.05);
            assert!(count >= previous.max(1));
            previous = count;
        }
    }

    #[test]
    fn test_sphere_samples_lie_on_surface() {
        let mut rng = StdRng::seed_from_u64(42);
        let center = Vec3::new(0.0, 3.0, 0.0);
        let light = AreaLight::sphere(center, Color::splat(0.7), 0.5, &mut rng).expect("valid light");

        assert_eq!(light.samples().len(), 40);
        for sample in light.samples() {
            assert_relative_eq!((*sample - center).length(), 0.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_tiny_sphere_degenerates_to_point() {
        let mut rng = StdRng::seed_from_u64(1);
        let light = AreaLight::sphere(Vec3::ONE, Color::ONE, 0.01, &mut rng).expect("valid light");

        assert!(light.is_point());
        assert_eq!(light.samples(), &[Vec3::ONE]);
        assert_eq!(light.radius(), 0.01);
    }

    #[test]
    fn test_invalid_lights() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            AreaLight::sphere(Vec3::ZERO, Color::ONE, -1.0, &mut rng),
            Err(ConfigError::InvalidLightRadius(_))
        ));
        assert!(matches!(
            AreaLight::with_samples(Vec3::ZERO, Color::ONE, 0.0, vec![]),
            Err(ConfigError::EmptyLightSamples)
        ));
    }

    #[test]
    fn test_from_desc_is_reproducible_with_seed() {
        let desc = LightDesc {
            center: Vec3::ZERO,
            color: Color::ONE,
            radius: 0.2,
            seed: Some(9),
        };
        let a = AreaLight::from_desc(&desc).expect("valid light");
        let b = AreaLight::from_desc(&desc).expect("valid light");

        assert_eq!(a, b);
        assert_eq!(a.samples().len(), 16);
    }
}
