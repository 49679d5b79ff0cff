//! Fixture helpers shared by the integration tests.
//!
//! Images are generated at test time so the tests do not depend on files
//! outside the temporary directories they create.
#![allow(dead_code)]

use image::{ImageOutputFormat, Rgb, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// A small image whose pixels depend on `seed`
pub fn pattern(seed: u8) -> RgbImage {
    RgbImage::from_fn(24, 16, |x, y| {
        Rgb([
            (x as u8).wrapping_mul(9).wrapping_add(seed),
            (y as u8).wrapping_mul(13),
            seed.wrapping_mul(31),
        ])
    })
}

/// Encode `img` as JPEG bytes
pub fn jpeg_bytes(img: &RgbImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageOutputFormat::Jpeg(85)).unwrap();
    cursor.into_inner()
}

/// Insert a COM segment right after the SOI marker. The encoded bytes change,
/// the decoded pixels do not.
pub fn with_comment(jpeg: &[u8], comment: &str) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG stream");
    let length = (comment.len() + 2) as u16;

    let mut out = Vec::with_capacity(jpeg.len() + comment.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xFE]);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(comment.as_bytes());
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Write raw bytes to `dir/name`, returning the canonical path the scanners report
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    fs::canonicalize(path).unwrap()
}

/// Write `img` as a JPEG file
pub fn write_jpeg(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    write_file(dir, name, &jpeg_bytes(img))
}

/// Create empty files with the given names
pub fn touch_all(dir: &Path, names: &[&str]) {
    for name in names {
        write_file(dir, name, name.as_bytes());
    }
}
