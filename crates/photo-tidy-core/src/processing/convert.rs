//! Copy a directory while turning its HEIC/HEIF photos into JPEGs.

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage};
use log::{debug, info};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

use crate::config::Config;
use crate::discovery::validate_directory;
use crate::error::{Error, Result};
use crate::logging::{log_fs_modification, log_skipped};
use crate::processing::formats::{decode_heic, is_heic_path};
use crate::renaming::next_free_name;
use crate::types::ConversionSummary;

/// Convert one HEIC/HEIF file to a JPEG at `destination`.
///
/// Unlike the batch conversion, any failure here is returned to the caller.
pub fn convert_heic_file(source: &Path, destination: &Path, quality: u8) -> Result<()> {
    if destination.exists() {
        return Err(Error::DestinationAlreadyExists(destination.to_path_buf()));
    }

    let img = decode_heic(source)?;
    if let Err(e) = write_jpeg(&img, destination, quality) {
        // Do not leave a truncated JPEG behind
        let _ = fs::remove_file(destination);
        return Err(e);
    }

    log_fs_modification("convert", source, Some(&format!("to {}", destination.display())));
    Ok(())
}

/// Where the converted copy of `source` goes: a sibling directory named
/// `destination_name`, or `<source name><suffix>` when no name is given.
pub fn conversion_destination(source: &Path, destination_name: Option<&str>, suffix: &str) -> Result<PathBuf> {
    let source = fs::canonicalize(source).map_err(Error::at("resolve", source))?;
    let (Some(parent), Some(dir_name)) = (source.parent(), source.file_name()) else {
        return Err(Error::Configuration(format!(
            "{} has no parent directory to hold a converted copy",
            source.display()
        )));
    };

    let name = match destination_name {
        Some(name) => name.to_string(),
        None => format!("{}{}", dir_name.to_string_lossy(), suffix),
    };
    Ok(parent.join(name))
}

/// Copy `source` to a new sibling directory, converting HEIC/HEIF files to
/// JPEG on the way and copying everything else as-is.
///
/// The destination must not exist; this is checked before anything is
/// written. A HEIC file that cannot be converted is logged, counted as failed
/// and skipped. Copy errors abort the run.
pub fn convert_directory(
    source: &Path,
    destination_name: Option<&str>,
    config: &Config,
    shutdown: &AtomicBool,
) -> Result<ConversionSummary> {
    validate_directory(source)?;
    let destination = conversion_destination(source, destination_name, &config.converted_dir_suffix)?;
    if destination.exists() {
        return Err(Error::DestinationAlreadyExists(destination));
    }

    let entries = WalkDir::new(source)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .collect::<std::result::Result<Vec<_>, walkdir::Error>>()
        .map_err(io::Error::from)?;

    fs::create_dir(&destination).map_err(Error::at("create", &destination))?;
    log_fs_modification("create_dir", &destination, None);

    // Every source name is reserved so a converted file never lands on a copied one
    let mut taken: BTreeSet<String> = entries
        .iter()
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();

    let mut summary = ConversionSummary {
        destination: destination.clone(),
        ..ConversionSummary::default()
    };

    for entry in &entries {
        if shutdown.load(Ordering::Relaxed) {
            return Err(Error::Interrupted);
        }

        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            copy_tree(path, &destination.join(entry.file_name()))?;
            summary.copied_directories += 1;
        } else if file_type.is_file() && is_heic_path(path) {
            let jpeg_name = jpeg_name_for(entry.file_name(), &mut taken, config.max_rename_suffix)?;
            match convert_heic_file(path, &destination.join(&jpeg_name), config.jpeg_quality) {
                Ok(()) => summary.converted += 1,
                Err(e) => {
                    log_skipped(path, "convert", &e);
                    summary.failed += 1;
                }
            }
        } else if file_type.is_file() {
            fs::copy(path, destination.join(entry.file_name())).map_err(Error::at("copy", path))?;
            summary.copied_files += 1;
        } else {
            debug!("Skipping special file {}", path.display());
        }
    }

    info!(
        "Converted {} HEIC files ({} failed), copied {} files and {} directories into {}",
        summary.converted,
        summary.failed,
        summary.copied_files,
        summary.copied_directories,
        destination.display()
    );
    Ok(summary)
}

/// `IMG_0001.HEIC` -> `IMG_0001.jpg`, or the next free `IMG_0001(n).jpg`
fn jpeg_name_for(file_name: &OsStr, taken: &mut BTreeSet<String>, max_suffix: u32) -> Result<String> {
    let candidate = Path::new(file_name)
        .with_extension("jpg")
        .to_string_lossy()
        .into_owned();

    let name = if taken.contains(&candidate) {
        next_free_name(&candidate, taken, max_suffix)?
    } else {
        candidate
    };
    taken.insert(name.clone());
    Ok(name)
}

fn write_jpeg(img: &DynamicImage, destination: &Path, quality: u8) -> Result<()> {
    let encode_error = |reason: String| Error::Encode {
        path: destination.to_path_buf(),
        reason,
    };

    let rgb = img.to_rgb8();
    let mut writer = BufWriter::new(File::create(destination).map_err(Error::at("create", destination))?);
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(|e| encode_error(e.to_string()))?;
    writer.flush().map_err(Error::at("write", destination))?;
    Ok(())
}

/// Recursive copy of a directory tree
fn copy_tree(source: &Path, destination: &Path) -> Result<()> {
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(Error::at("create", &target))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target).map_err(Error::at("copy", entry.path()))?;
        }
    }
    Ok(())
}
