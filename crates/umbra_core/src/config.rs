//! Render configuration.
//!
//! Every settings struct has sensible defaults, round-trips through serde and
//! is checked by `validate()` before any work starts, so a bad value is
//! reported up front instead of surfacing mid-trace.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use umbra_math::Vec3;

use crate::material::Color;

/// Errors for invalid render settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("max_faces_per_leaf must be at least 1")]
    InvalidMaxFacesPerLeaf,

    #[error("max_overlap_fraction must be a non-negative number, got {0}")]
    InvalidOverlapFraction(f32),

    #[error("light radius must be a finite non-negative number, got {0}")]
    InvalidLightRadius(f32),

    #[error("a light needs at least one sample point")]
    EmptyLightSamples,

    #[error("shadow_epsilon must be a finite positive number, got {0}")]
    InvalidShadowEpsilon(f32),

    #[error("thread count must be at least 1")]
    InvalidThreadCount,

    #[error("vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f32),

    #[error("camera look_from and look_at coincide or are parallel to up")]
    DegenerateCamera,

    #[error("image size must be non-zero, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("could not parse render description: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration checks.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Acceleration structure build parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelParams {
    /// A box holding at most this many faces becomes a leaf
    pub max_faces_per_leaf: usize,
    /// A split is accepted only while the children overlap less than this
    pub max_overlap_fraction: f32,
    /// Children start with the parent's used split axes instead of fresh flags
    pub inherit_split_axes: bool,
}

impl Default for AccelParams {
    fn default() -> Self {
        Self {
            max_faces_per_leaf: 64,
            max_overlap_fraction: 0.3,
            inherit_split_axes: true,
        }
    }
}

impl AccelParams {
    pub fn new(max_faces_per_leaf: usize, max_overlap_fraction: f32) -> Self {
        Self {
            max_faces_per_leaf,
            max_overlap_fraction,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_faces_per_leaf == 0 {
            return Err(ConfigError::InvalidMaxFacesPerLeaf);
        }
        if self.max_overlap_fraction.is_nan() || self.max_overlap_fraction < 0.0 {
            return Err(ConfigError::InvalidOverlapFraction(self.max_overlap_fraction));
        }
        Ok(())
    }
}

/// Tracer settings shared by every pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Color returned for misses and past the recursion limit
    pub background: Color,
    /// Deepest reflection level still traced (primary rays are depth 0)
    pub max_depth: u32,
    /// Bias applied to secondary ray origins
    pub shadow_epsilon: f32,
    /// Dedicated worker pool size; `None` uses the global rayon pool
    pub threads: Option<usize>,
    /// Hit faces from both sides; by default only the side the normal
    /// points to is visible or blocks light
    pub two_sided: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            background: Color::ZERO,
            max_depth: 3,
            shadow_epsilon: 1e-4,
            threads: None,
            two_sided: false,
        }
    }
}

impl TraceConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.shadow_epsilon.is_finite() || self.shadow_epsilon <= 0.0 {
            return Err(ConfigError::InvalidShadowEpsilon(self.shadow_epsilon));
        }
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidThreadCount);
        }
        Ok(())
    }
}

/// Serialisable description of an area (or point) light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightDesc {
    pub center: Vec3,
    pub color: Color,
    /// Sphere radius; 0 makes a point light
    #[serde(default)]
    pub radius: f32,
    /// Seed for the sample point generator; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl LightDesc {
    pub fn point(center: Vec3, color: Color) -> Self {
        Self {
            center,
            color,
            radius: 0.0,
            seed: None,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        validate_radius(self.radius)
    }
}

/// Shared radius check for light descriptions and light constructors.
pub fn validate_radius(radius: f32) -> ConfigResult<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(ConfigError::InvalidLightRadius(radius));
    }
    Ok(())
}

/// Pinhole camera placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDesc {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            look_from: Vec3::new(0.0, 1.0, 4.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            vfov: 60.0,
        }
    }
}

impl CameraDesc {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(ConfigError::InvalidFieldOfView(self.vfov));
        }
        let forward = self.look_at - self.look_from;
        if forward.length_squared() <= f32::EPSILON
            || forward.cross(self.up).length_squared() <= f32::EPSILON
        {
            return Err(ConfigError::DegenerateCamera);
        }
        Ok(())
    }
}

/// Everything an offline render needs besides the geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDesc {
    pub width: u32,
    pub height: u32,
    /// Trace at twice the resolution and average 2x2 blocks
    pub supersample: bool,
    pub camera: CameraDesc,
    pub lights: Vec<LightDesc>,
    /// `None` traces every face for every ray
    pub accel: Option<AccelParams>,
    pub trace: TraceConfig,
}

impl Default for RenderDesc {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            supersample: false,
            camera: CameraDesc::default(),
            lights: vec![LightDesc {
                center: Vec3::new(0.0, 3.0, 0.0),
                color: Color::splat(0.7),
                radius: 0.3,
                seed: Some(7),
            }],
            accel: Some(AccelParams::default()),
            trace: TraceConfig::default(),
        }
    }
}

impl RenderDesc {
    /// Parse and validate a JSON render description.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let desc: RenderDesc = serde_json::from_str(json)?;
        desc.validate()?;
        Ok(desc)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }
        self.camera.validate()?;
        for light in &self.lights {
            light.validate()?;
        }
        if let Some(accel) = &self.accel {
            accel.validate()?;
        }
        self.trace.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AccelParams::default().validate().is_ok());
        assert!(TraceConfig::default().validate().is_ok());
        assert!(CameraDesc::default().validate().is_ok());
        assert!(RenderDesc::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_accel_params() {
        assert!(matches!(
            AccelParams::new(0, 0.5).validate(),
            Err(ConfigError::InvalidMaxFacesPerLeaf)
        ));
        assert!(matches!(
            AccelParams::new(4, -0.1).validate(),
            Err(ConfigError::InvalidOverlapFraction(_))
        ));
        assert!(AccelParams::new(4, f32::NAN).validate().is_err());
        // Zero is legal: every split gets rejected
        assert!(AccelParams::new(4, 0.0).validate().is_ok());
    }

    #[test]
    fn test_invalid_light_radius() {
        let mut light = LightDesc::point(Vec3::ZERO, Color::ONE);
        assert!(light.validate().is_ok());

        light.radius = -1.0;
        assert!(matches!(light.validate(), Err(ConfigError::InvalidLightRadius(_))));

        light.radius = f32::INFINITY;
        assert!(light.validate().is_err());
    }

    #[test]
    fn test_invalid_trace_config() {
        let config = TraceConfig {
            shadow_epsilon: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidShadowEpsilon(_))));

        let config = TraceConfig {
            threads: Some(0),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidThreadCount)));
    }

    #[test]
    fn test_invalid_camera() {
        let camera = CameraDesc {
            vfov: 180.0,
            ..Default::default()
        };
        assert!(matches!(camera.validate(), Err(ConfigError::InvalidFieldOfView(_))));

        let camera = CameraDesc {
            look_from: Vec3::new(0.0, 5.0, 0.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            vfov: 60.0,
        };
        assert!(matches!(camera.validate(), Err(ConfigError::DegenerateCamera)));
    }

    #[test]
    fn test_render_desc_from_json() {
        let json = r#"{
            "width": 64,
            "height": 48,
            "lights": [{ "center": [0.0, 2.0, 0.0], "color": [1.0, 1.0, 1.0] }],
            "accel": { "max_faces_per_leaf": 8 },
            "trace": { "max_depth": 5, "background": [0.1, 0.2, 0.3] }
        }"#;
        let desc = RenderDesc::from_json(json).expect("valid description");

        assert_eq!(desc.width, 64);
        assert_eq!(desc.lights.len(), 1);
        assert_eq!(desc.lights[0].radius, 0.0);
        let accel = desc.accel.expect("accel params");
        assert_eq!(accel.max_faces_per_leaf, 8);
        assert_eq!(accel.max_overlap_fraction, AccelParams::default().max_overlap_fraction);
        assert_eq!(desc.trace.max_depth, 5);
        assert_eq!(desc.trace.background, Vec3::new(0.1, 0.2, 0.3));
        assert!(!desc.trace.two_sided);

        let desc = RenderDesc::from_json(r#"{ "trace": { "two_sided": true } }"#)
            .expect("valid description");
        assert!(desc.trace.two_sided);
    }

    #[test]
    fn test_render_desc_brute_force_and_errors() {
        let desc = RenderDesc::from_json(r#"{ "accel": null }"#).expect("valid description");
        assert!(desc.accel.is_none());

        assert!(matches!(
            RenderDesc::from_json(r#"{ "width": 0 }"#),
            Err(ConfigError::InvalidResolution { .. })
        ));
        assert!(matches!(RenderDesc::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }
}
