//! Whole-image rendering.
//!
//! Rows are traced in parallel with rayon. Every worker writes only the
//! rows it owns, so the image needs no locking.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use umbra_core::{AccelParams, Color, ConfigResult, Geometry, RenderDesc};

use crate::accel::AccelerationStructure;
use crate::camera::Camera;
use crate::light::AreaLight;
use crate::tracer::{trace, SceneContext};

/// Linear color image, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Pixels of row `y`, left to right.
    pub fn row(&self, y: u32) -> &[Color] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    /// Convert to RGBA bytes: channels clamped to [0, 1], no gamma.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let c = color.clamp(Color::ZERO, Color::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8, 255]
}

/// Trace one ray through the center of every pixel.
///
/// Runs on the global rayon pool, or on a dedicated pool when
/// `ctx.config.threads` is set.
pub fn trace_scene(ctx: &SceneContext, camera: &Camera, width: u32, height: u32) -> ImageBuffer {
    let mut camera = camera.clone();
    camera.initialize(width, height);

    let mut image = ImageBuffer::new(width, height);
    if width == 0 || height == 0 {
        return image;
    }

    let start = Instant::now();
    let rows_done = AtomicUsize::new(0);
    let report_every = (height as usize / 10).max(1);

    let mut render_rows = || {
        image
            .pixels
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    let ray = camera.get_ray(x as u32, y as u32);
                    *pixel = trace(ctx, &ray, 0);
                }
                let done = rows_done.fetch_add(1, Ordering::Relaxed) + 1;
                if done % report_every == 0 {
                    log::debug!("Tracing: {}%", done * 100 / height as usize);
                }
            });
    };

    match ctx.config.threads {
        Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(render_rows),
            Err(e) => {
                log::warn!("Failed to build {} thread pool ({}), using global pool", threads, e);
                render_rows();
            }
        },
        None => render_rows(),
    }

    log::info!(
        "Traced {}x{} pixels in {:.2?}",
        width,
        height,
        start.elapsed()
    );
    image
}

/// Build the acceleration structure when parameters are given.
///
/// `None` parameters select brute-force intersection.
pub fn build_acceleration_structure(
    geometry: &dyn Geometry,
    params: Option<&AccelParams>,
) -> ConfigResult<Option<AccelerationStructure>> {
    match params {
        Some(params) => AccelerationStructure::build(geometry, params).map(Some),
        None => {
            log::info!("No acceleration structure, testing all {} faces per ray", geometry.face_count());
            Ok(None)
        }
    }
}

/// Render `geometry` as described by `desc`.
///
/// Builds lights, the acceleration structure and the camera, then traces at
/// the requested resolution (doubled when supersampling, without the
/// downsample).
pub fn render(desc: &RenderDesc, geometry: &dyn Geometry) -> ConfigResult<ImageBuffer> {
    desc.validate()?;

    let lights = desc
        .lights
        .iter()
        .map(AreaLight::from_desc)
        .collect::<ConfigResult<Vec<_>>>()?;
    log::info!(
        "{} lights with {} samples total",
        lights.len(),
        lights.iter().map(|l| l.samples().len()).sum::<usize>()
    );

    let accel = build_acceleration_structure(geometry, desc.accel.as_ref())?;
    let ctx = SceneContext::new(geometry, &lights, &desc.trace).with_acceleration(accel.as_ref());
    let camera = Camera::from_desc(&desc.camera);

    let scale = if desc.supersample { 2 } else { 1 };
    Ok(trace_scene(&ctx, &camera, desc.width * scale, desc.height * scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_core::{Mesh, TraceConfig};

    #[test]
    fn test_image_buffer() {
        let mut img = ImageBuffer::new(10, 10);
        assert_eq!(img.pixels.len(), 100);

        img.set(5, 5, Color::new(1.0, 0.5, 0.25));
        let c = img.get(5, 5);
        assert_eq!(c.x, 1.0);
        assert_eq!(c.y, 0.5);
        assert_eq!(c.z, 0.25);
        assert_eq!(img.row(5)[5], c);
    }

    #[test]
    fn test_color_to_rgba() {
        assert_eq!(color_to_rgba(Color::new(0.0, 0.5, 1.0)), [0, 127, 255, 255]);
        // Out-of-range channels are clamped
        assert_eq!(color_to_rgba(Color::new(-1.0, 2.0, 1.0)), [0, 255, 255, 255]);
    }

    #[test]
    fn test_empty_scene_renders_background() {
        let mesh = Mesh::empty();
        let config = TraceConfig {
            background: Color::new(0.2, 0.4, 0.6),
            ..Default::default()
        };
        let accel = build_acceleration_structure(&mesh, Some(&AccelParams::default()))
            .expect("valid params");
        let ctx = SceneContext::new(&mesh, &[], &config).with_acceleration(accel.as_ref());

        let image = trace_scene(&ctx, &Camera::new(), 8, 6);
        assert_eq!(image.width, 8);
        assert_eq!(image.height, 6);
        assert!(image.pixels.iter().all(|&p| p == config.background));
    }

    #[test]
    fn test_dedicated_pool_matches_global_pool() {
        let mesh = Mesh::with_material(
            vec![
                umbra_math::Vec3::new(-1.0, -1.0, -2.0),
                umbra_math::Vec3::new(1.0, -1.0, -2.0),
                umbra_math::Vec3::new(0.0, 1.0, -2.0),
            ],
            vec![0, 1, 2],
            umbra_core::Material::default(),
        )
        .expect("triangle");
        let lights = [AreaLight::point(umbra_math::Vec3::ZERO, Color::ONE)];
        let global = TraceConfig::default();
        let dedicated = TraceConfig {
            threads: Some(2),
            ..Default::default()
        };

        let a = trace_scene(&SceneContext::new(&mesh, &lights, &global), &Camera::new(), 16, 12);
        let b = trace_scene(&SceneContext::new(&mesh, &lights, &dedicated), &Camera::new(), 16, 12);
        assert_eq!(a, b);
    }
}
