//! Image post-processing and file output.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use umbra_tracer::{color_to_rgba, Color, ImageBuffer};

/// Average each 2x2 block into one pixel.
///
/// An odd trailing row or column is dropped.
pub fn supersample_2x2(source: &ImageBuffer) -> ImageBuffer {
    let mut result = ImageBuffer::new(source.width / 2, source.height / 2);
    for y in 0..result.height {
        for x in 0..result.width {
            let sum: Color = [(0, 0), (1, 0), (0, 1), (1, 1)]
                .into_iter()
                .map(|(dx, dy)| source.get(2 * x + dx, 2 * y + dy))
                .sum();
            result.set(x, y, sum / 4.0);
        }
    }
    result
}

/// Binary PPM (P6) bytes for the image.
pub fn encode_ppm(buffer: &ImageBuffer) -> Vec<u8> {
    let header = format!("P6\n{} {}\n255\n", buffer.width, buffer.height);
    let mut bytes = Vec::with_capacity(header.len() + buffer.pixels.len() * 3);
    bytes.extend_from_slice(header.as_bytes());
    for color in &buffer.pixels {
        let [r, g, b, _] = color_to_rgba(*color);
        bytes.extend_from_slice(&[r, g, b]);
    }
    bytes
}

/// Write the image; `.ppm` paths get PPM, anything else PNG.
pub fn write_image(buffer: &ImageBuffer, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();

    match ext.as_str() {
        "ppm" => fs::write(path, encode_ppm(buffer))
            .with_context(|| format!("failed to write {}", path.display()))?,
        "png" => image::save_buffer_with_format(
            path,
            &buffer.to_rgba8(),
            buffer.width,
            buffer.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("failed to write {}", path.display()))?,
        other => bail!("Unknown output format: {}", other),
    }

    log::info!("Wrote {}", path.display());
    Ok(())
}
