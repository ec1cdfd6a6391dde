//! Pinhole camera for primary rays.

use umbra_core::CameraDesc;
use umbra_math::{Ray, Vec3};

/// Pinhole camera. Pixel centers lie on an image plane one unit ahead.
#[derive(Debug, Clone)]
pub struct Camera {
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    /// Vertical field of view in degrees
    vfov: f32,

    // Cached computed values (set by initialize())
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 320,
            image_height: 240,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
        }
    }

    pub fn from_desc(desc: &CameraDesc) -> Self {
        Self::new()
            .with_position(desc.look_from, desc.look_at, desc.up)
            .with_fov(desc.vfov)
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set vertical field of view in degrees.
    pub fn with_fov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Size the image plane for a resolution. Must run before `pixel_target`.
    pub fn initialize(&mut self, width: u32, height: u32) {
        self.image_width = width.max(1);
        self.image_height = height.max(1);

        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Camera basis vectors
        let w = (self.look_from - self.look_at).normalize_or_zero();
        let u = self.vup.cross(w).normalize_or_zero();
        let v = w.cross(u);

        // Rows go down the image
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        let viewport_upper_left = self.look_from - w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);
    }

    /// World-space center of pixel (x, y); (0, 0) is the top-left pixel.
    pub fn pixel_target(&self, x: u32, y: u32) -> Vec3 {
        self.pixel00_loc + x as f32 * self.pixel_delta_u + y as f32 * self.pixel_delta_v
    }

    /// Primary ray through the center of pixel (x, y).
    pub fn get_ray(&self, x: u32, y: u32) -> Ray {
        Ray::towards(self.look_from, self.pixel_target(x, y))
    }

    pub fn look_from(&self) -> Vec3 {
        self.look_from
    }
}
