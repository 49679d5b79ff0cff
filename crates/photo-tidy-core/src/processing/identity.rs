//! Content identity of an image, computed from its decoded pixels.
//!
//! Two files that decode to the same pixels share a content key even when
//! their encoded bytes differ (metadata, comments, container details). The
//! key is only a pre-filter: [`ImageIdentity::pixel_eq`] always confirms a
//! key match by comparing the decoded bytes.

use blake3::Hash as Blake3Hash;
use image::ColorType;
use log::debug;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::ImageFormat;

/// BLAKE3 hash of a decoded pixel stream and its shape
pub type ContentKey = Blake3Hash;

/// Fully decoded pixel data of one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPixels {
    pub width: u32,
    pub height: u32,
    pub color: ColorType,
    pub bytes: Vec<u8>,
}

impl DecodedPixels {
    /// Hash the pixel stream together with its dimensions and layout
    pub fn content_key(&self) -> ContentKey {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.width.to_le_bytes());
        hasher.update(&self.height.to_le_bytes());
        hasher.update(&[color_tag(self.color)]);
        hasher.update(&self.bytes);
        hasher.finalize()
    }
}

/// A candidate image file identified by its decoded content
#[derive(Debug, Clone)]
pub struct ImageIdentity {
    pub(crate) path: PathBuf,
    pub(crate) content_key: ContentKey,
    pub(crate) format: ImageFormat,
}

impl ImageIdentity {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content_key(&self) -> &ContentKey {
        &self.content_key
    }

    /// Format reported by the decoder when the file was classified
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Decode this image again
    pub fn decode(&self) -> Result<DecodedPixels> {
        decode_pixels(&self.path, &[self.format]).map(|(_, pixels)| pixels)
    }

    /// True when this image decodes to exactly `pixels`.
    ///
    /// Cheap rejection on the content key first; a key match is confirmed
    /// byte for byte.
    pub fn matches_pixels(&self, pixels: &DecodedPixels) -> Result<bool> {
        if self.content_key != pixels.content_key() {
            return Ok(false);
        }
        Ok(self.decode()? == *pixels)
    }

    /// Pixel equality between two identities. Pure: neither side is changed.
    pub fn pixel_eq(&self, other: &ImageIdentity) -> Result<bool> {
        if self.content_key != other.content_key {
            return Ok(false);
        }
        let ours = self.decode()?;
        other.matches_pixels(&ours)
    }
}

/// Decode `path` if its content is one of the `recognised` formats.
///
/// The format is detected from the file contents, never from the extension.
pub fn decode_pixels(path: &Path, recognised: &[ImageFormat]) -> Result<(ImageFormat, DecodedPixels)> {
    let reader = image::io::Reader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| Error::decode(path, e))?;

    let detected = reader
        .format()
        .ok_or_else(|| Error::decode(path, "unrecognised image data"))?;

    let format = match ImageFormat::from_decoder(detected) {
        Some(format) if recognised.contains(&format) => format,
        Some(format) => {
            return Err(Error::UnsupportedFormat(format!(
                "{} is {}, which is not a recognised format",
                path.display(),
                format
            )))
        }
        None => return Err(Error::UnsupportedFormat(format!("{} ({:?})", path.display(), detected))),
    };

    let img = reader.decode().map_err(|e| Error::decode(path, e))?;

    let pixels = DecodedPixels {
        width: img.width(),
        height: img.height(),
        color: img.color(),
        bytes: img.into_bytes(),
    };

    Ok((format, pixels))
}

/// Classify a single file, returning why it is not an image on failure
pub fn try_classify(path: &Path, recognised: &[ImageFormat]) -> Result<ImageIdentity> {
    let (format, pixels) = decode_pixels(path, recognised)?;

    Ok(ImageIdentity {
        path: path.to_path_buf(),
        content_key: pixels.content_key(),
        format,
    })
}

/// Classify a file during a bulk scan. Anything that is not a decodable image
/// of a recognised format is `None`.
pub fn classify(path: &Path, recognised: &[ImageFormat]) -> Option<ImageIdentity> {
    match try_classify(path, recognised) {
        Ok(identity) => Some(identity),
        Err(e) => {
            debug!("Not an image: {} ({})", path.display(), e);
            None
        }
    }
}

/// True when the decoder reports JPEG for this file and its header parses
pub fn is_jpeg(path: &Path) -> bool {
    let reader = match image::io::Reader::open(path).and_then(|r| r.with_guessed_format()) {
        Ok(reader) => reader,
        Err(_) => return false,
    };

    reader.format() == Some(image::ImageFormat::Jpeg) && reader.into_dimensions().is_ok()
}

fn color_tag(color: ColorType) -> u8 {
    match color {
        ColorType::L8 => 1,
        ColorType::La8 => 2,
        ColorType::Rgb8 => 3,
        ColorType::Rgba8 => 4,
        ColorType::L16 => 5,
        ColorType::La16 => 6,
        ColorType::Rgb16 => 7,
        ColorType::Rgba16 => 8,
        ColorType::Rgb32F => 9,
        ColorType::Rgba32F => 10,
        _ => 0,
    }
}
