use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Raster formats the classifier can be told to recognise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Tiff,
    Bmp,
}

impl ImageFormat {
    /// Map the format reported by the decoder onto a known format
    pub fn from_decoder(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::WebP => Some(Self::WebP),
            image::ImageFormat::Tiff => Some(Self::Tiff),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Gif => "GIF",
            Self::WebP => "WebP",
            Self::Tiff => "TIFF",
            Self::Bmp => "BMP",
        };
        f.write_str(name)
    }
}

/// Names of the regular files directly inside one directory.
///
/// Sorted so that every pass over it visits names in the same order.
pub type NameSet = BTreeSet<String>;

/// One planned rename inside the second directory of a merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    pub old_name: String,
    pub new_name: String,
}

/// Renames computed for a directory merge, in the order they must be applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePlan {
    pub renames: Vec<Rename>,
}

impl RenamePlan {
    /// True when the two directories share no file names
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rename> {
        self.renames.iter()
    }

    /// Look up the new name planned for `old_name`
    pub fn new_name_for(&self, old_name: &str) -> Option<&str> {
        self.renames
            .iter()
            .find(|r| r.old_name == old_name)
            .map(|r| r.new_name.as_str())
    }
}

/// Totals reported after a batch HEIC conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Directory the converted copy was written to
    pub destination: PathBuf,

    /// Files copied unchanged
    pub copied_files: usize,

    /// Subdirectories copied recursively
    pub copied_directories: usize,

    /// HEIC/HEIF files written as JPEG
    pub converted: usize,

    /// HEIC/HEIF files that could not be decoded or encoded
    pub failed: usize,
}
