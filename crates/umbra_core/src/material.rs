//! Phong materials.

use serde::{Deserialize, Serialize};
use umbra_math::Vec3;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Shading behaviour selected per material.
///
/// Numbering follows the MTL `illum` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IlluminationModel {
    /// `illum 1`: ambient and diffuse only
    Color,
    /// `illum 2`: ambient, diffuse and specular highlight
    Highlight,
    /// `illum 3`: highlight plus ray traced mirror reflection
    Mirror,
    /// Any other `illum` value, shaded like `Highlight`
    Other(u32),
}

impl IlluminationModel {
    /// Map an MTL `illum` number.
    pub fn from_mtl(illum: u32) -> Self {
        match illum {
            1 => Self::Color,
            2 => Self::Highlight,
            3 => Self::Mirror,
            n => Self::Other(n),
        }
    }

    /// True when hits spawn a reflection ray.
    pub fn is_reflective(self) -> bool {
        matches!(self, Self::Mirror)
    }
}

impl Default for IlluminationModel {
    fn default() -> Self {
        Self::Highlight
    }
}

/// A Phong material definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Material name (from the source file, may be empty)
    pub name: String,

    /// Ambient color, added unconditionally
    pub ambient: Color,

    /// Diffuse color, scaled by max(0, N·L)
    pub diffuse: Color,

    /// Specular color; also the mirror reflectance for `Mirror`
    pub specular: Color,

    /// Phong exponent
    pub shininess: f32,

    pub illumination: IlluminationModel,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: Color::splat(0.05),
            diffuse: Color::splat(0.5), // Grey default
            specular: Color::ZERO,
            shininess: 1.0,
            illumination: IlluminationModel::default(),
        }
    }
}

impl Material {
    /// Create a diffuse material with just a name and diffuse color.
    pub fn diffuse(name: impl Into<String>, diffuse: Color) -> Self {
        Self {
            name: name.into(),
            diffuse,
            ..Default::default()
        }
    }

    /// Create a mirror whose reflectance is `specular`.
    pub fn mirror(name: impl Into<String>, specular: Color) -> Self {
        Self {
            name: name.into(),
            ambient: Color::ZERO,
            diffuse: Color::ZERO,
            specular,
            shininess: 64.0,
            illumination: IlluminationModel::Mirror,
        }
    }

    /// Builder-style setter for the ambient term.
    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    /// Builder-style setter for the specular highlight.
    pub fn with_specular(mut self, specular: Color, shininess: f32) -> Self {
        self.specular = specular;
        self.shininess = shininess;
        self
    }

    pub fn is_reflective(&self) -> bool {
        self.illumination.is_reflective()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illumination_from_mtl() {
        assert_eq!(IlluminationModel::from_mtl(1), IlluminationModel::Color);
        assert_eq!(IlluminationModel::from_mtl(2), IlluminationModel::Highlight);
        assert_eq!(IlluminationModel::from_mtl(3), IlluminationModel::Mirror);
        assert_eq!(IlluminationModel::from_mtl(7), IlluminationModel::Other(7));
    }

    #[test]
    fn test_only_mirror_reflects() {
        assert!(IlluminationModel::Mirror.is_reflective());
        assert!(!IlluminationModel::Highlight.is_reflective());
        assert!(!IlluminationModel::Other(3).is_reflective());

        assert!(Material::mirror("m", Color::ONE).is_reflective());
        assert!(!Material::default().is_reflective());
    }

    #[test]
    fn test_material_builders() {
        let mat = Material::diffuse("red", Color::new(1.0, 0.0, 0.0))
            .with_ambient(Color::splat(0.1))
            .with_specular(Color::ONE, 32.0);

        assert_eq!(mat.name, "red");
        assert_eq!(mat.diffuse, Color::new(1.0, 0.0, 0.0));
        assert_eq!(mat.ambient, Color::splat(0.1));
        assert_eq!(mat.shininess, 32.0);
    }

    #[test]
    fn test_material_json_defaults() {
        let mat: Material = serde_json::from_str(r#"{ "name": "floor", "illumination": "mirror" }"#)
            .expect("valid material json");

        assert_eq!(mat.name, "floor");
        assert_eq!(mat.illumination, IlluminationModel::Mirror);
        assert_eq!(mat.diffuse, Material::default().diffuse);
    }
}
