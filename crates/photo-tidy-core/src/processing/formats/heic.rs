use image::DynamicImage;
use std::path::Path;

use crate::error::{Error, Result};

/// File extensions treated as HEIC/HEIF (compared case-insensitively)
const HEIC_EXTENSIONS: [&str; 2] = ["heic", "heif"];

/// True when the file name ends in `.heic` or `.heif`
pub fn is_heic_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            HEIC_EXTENSIONS
                .iter()
                .any(|heic| ext.eq_ignore_ascii_case(heic))
        })
        .unwrap_or(false)
}

/// Decode the primary image of a HEIC/HEIF file into RGB pixels
#[cfg(feature = "heic")]
pub fn decode_heic(path: &Path) -> Result<DynamicImage> {
    use libheif_rs::{ColorSpace, HeifContext, RgbChroma};

    let path_str = path
        .to_str()
        .ok_or_else(|| Error::decode(path, "path is not valid UTF-8"))?;

    let ctx = HeifContext::read_from_file(path_str)
        .map_err(|e| Error::decode(path, format!("failed to read HEIC: {}", e)))?;

    let handle = ctx
        .primary_image_handle()
        .map_err(|e| Error::decode(path, format!("no primary image: {}", e)))?;

    let heif_img = handle
        .decode(ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| Error::decode(path, format!("failed to decode HEIC: {}", e)))?;

    let width = heif_img.width();
    let height = heif_img.height();

    let planes = heif_img.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| Error::decode(path, "HEIC image has no interleaved plane"))?;

    // Rows may be padded beyond width * 3 bytes
    let row_len = width as usize * 3;
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        let row = row
            .get(..row_len)
            .ok_or_else(|| Error::decode(path, "HEIC plane shorter than its width"))?;
        pixels.extend_from_slice(row);
    }

    let rgb = image::RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| Error::decode(path, "HEIC pixel buffer does not match its size"))?;

    Ok(DynamicImage::ImageRgb8(rgb))
}

/// Decode the primary image of a HEIC/HEIF file into RGB pixels
#[cfg(not(feature = "heic"))]
pub fn decode_heic(path: &Path) -> Result<DynamicImage> {
    Err(Error::UnsupportedFormat(format!(
        "{} (HEIC support requires the `heic` feature)",
        path.display()
    )))
}
