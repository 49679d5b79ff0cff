//! Grouping of pixel-identical images into duplicate classes.
//!
//! The first image seen with a given pixel content becomes the anchor
//! (representative) of its class; every later image that decodes to the same
//! pixels is attached to that anchor. Content keys only narrow down the
//! candidate anchors; membership is always confirmed by comparing pixels.

use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use crate::config::Config;
use crate::discovery::{list_file_paths, validate_directory};
use crate::error::Result;
use crate::processing::{classify_all, ContentKey, DecodedPixels, ImageIdentity};

/// A representative image and the images found to be pixel-identical to it
#[derive(Debug, Clone)]
pub struct DuplicateClass {
    pub representative: ImageIdentity,
    pub similar: Vec<ImageIdentity>,
}

impl DuplicateClass {
    fn new(representative: ImageIdentity) -> Self {
        Self {
            representative,
            similar: Vec::new(),
        }
    }

    /// False for a unique image
    pub fn has_duplicates(&self) -> bool {
        !self.similar.is_empty()
    }

    /// Paths of the similar members, in the order they were found
    pub fn similar_paths(&self) -> impl Iterator<Item = &Path> {
        self.similar.iter().map(|identity| identity.path())
    }
}

/// Anchors of the classes built so far, indexed by content key
#[derive(Default)]
struct AnchorIndex {
    classes: Vec<DuplicateClass>,
    by_key: HashMap<ContentKey, Vec<usize>>,
}

impl AnchorIndex {
    fn insert_anchor(&mut self, identity: ImageIdentity) {
        let index = self.classes.len();
        self.by_key.entry(identity.content_key).or_default().push(index);
        self.classes.push(DuplicateClass::new(identity));
    }

    fn attach(&mut self, index: usize, identity: ImageIdentity) {
        debug!(
            "{} duplicates {}",
            identity.path().display(),
            self.classes[index].representative.path().display()
        );
        self.classes[index].similar.push(identity);
    }

    /// Index of the first anchor whose pixels equal those of `identity`
    fn find_match(&self, identity: &ImageIdentity) -> Option<usize> {
        let candidates = self.by_key.get(identity.content_key())?;

        let pixels: DecodedPixels = match identity.decode() {
            Ok(pixels) => pixels,
            Err(e) => {
                warn!("Could not re-read {} for comparison: {}", identity.path().display(), e);
                return None;
            }
        };

        for &index in candidates {
            let anchor = &self.classes[index].representative;
            match anchor.matches_pixels(&pixels) {
                Ok(true) => return Some(index),
                Ok(false) => warn!(
                    "Content key collision between {} and {}, pixels differ",
                    anchor.path().display(),
                    identity.path().display()
                ),
                Err(e) => warn!("Could not re-read {} for comparison: {}", anchor.path().display(), e),
            }
        }
        None
    }

    fn into_classes(self) -> Vec<DuplicateClass> {
        self.classes
    }
}

/// Partition `identities` into classes of pixel-identical images.
///
/// Identities are taken in order; the first of each pixel content is the
/// representative.
pub fn group_identities(identities: impl IntoIterator<Item = ImageIdentity>) -> Vec<DuplicateClass> {
    let mut index = AnchorIndex::default();

    for identity in identities {
        match index.find_match(&identity) {
            Some(anchor) => index.attach(anchor, identity),
            None => index.insert_anchor(identity),
        }
    }

    index.into_classes()
}

/// Make every identity of `a` an anchor, then attach each identity of `b`
/// that matches one of them. Identities of `b` without a match are dropped.
pub fn group_cross_identities(
    a: impl IntoIterator<Item = ImageIdentity>,
    b: impl IntoIterator<Item = ImageIdentity>,
) -> Vec<DuplicateClass> {
    let mut index = AnchorIndex::default();

    for identity in a {
        index.insert_anchor(identity);
    }

    for identity in b {
        match index.find_match(&identity) {
            Some(anchor) => index.attach(anchor, identity),
            None => debug!("{} has no counterpart", identity.path().display()),
        }
    }

    index.into_classes()
}

/// Classify `paths` and group the images found into duplicate classes
pub fn group_duplicates(paths: &[PathBuf], config: &Config, shutdown: &AtomicBool) -> Result<Vec<DuplicateClass>> {
    let identities = classify_all(paths, config, shutdown)?;
    Ok(group_identities(identities))
}

/// Classify both listings and report which images of `paths_b` duplicate an
/// image of `paths_a`
pub fn group_cross_duplicates(
    paths_a: &[PathBuf],
    paths_b: &[PathBuf],
    config: &Config,
    shutdown: &AtomicBool,
) -> Result<Vec<DuplicateClass>> {
    let identities_a = classify_all(paths_a, config, shutdown)?;
    let identities_b = classify_all(paths_b, config, shutdown)?;
    Ok(group_cross_identities(identities_a, identities_b))
}

/// Outcome of a duplicate search
#[derive(Debug, Clone, Default)]
pub struct DuplicateReport {
    pub classes: Vec<DuplicateClass>,
}

impl DuplicateReport {
    /// Number of images classified
    pub fn image_count(&self) -> usize {
        self.classes.iter().map(|class| 1 + class.similar.len()).sum()
    }

    /// Number of images that duplicate a representative
    pub fn duplicate_count(&self) -> usize {
        self.classes.iter().map(|class| class.similar.len()).sum()
    }

    /// True when no duplicates were found
    pub fn is_clean(&self) -> bool {
        self.duplicate_count() == 0
    }

    /// Classes that have at least one duplicate
    pub fn with_duplicates(&self) -> impl Iterator<Item = &DuplicateClass> {
        self.classes.iter().filter(|class| class.has_duplicates())
    }

    /// Plain path listing of the classes with duplicates, for export
    pub fn summary(&self) -> Vec<ClassSummary> {
        self.with_duplicates()
            .map(|class| ClassSummary {
                representative: class.representative.path().to_path_buf(),
                similar: class.similar_paths().map(Path::to_path_buf).collect(),
            })
            .collect()
    }
}

/// Serializable view of one duplicate class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSummary {
    pub representative: PathBuf,
    pub similar: Vec<PathBuf>,
}

/// Find pixel-identical images among the files directly inside `directory`
pub fn find_duplicates_in_directory(directory: &Path, config: &Config, shutdown: &AtomicBool) -> Result<DuplicateReport> {
    let paths = list_file_paths(directory)?;
    info!("Scanning {} files in {}", paths.len(), directory.display());

    let classes = group_duplicates(&paths, config, shutdown)?;
    let report = DuplicateReport { classes };
    info!(
        "{} images, {} duplicates in {}",
        report.image_count(),
        report.duplicate_count(),
        directory.display()
    );
    Ok(report)
}

/// Find images in `dir_b` that duplicate an image in `dir_a`.
///
/// Both directories are validated before either is scanned.
pub fn find_duplicates_between(
    dir_a: &Path,
    dir_b: &Path,
    config: &Config,
    shutdown: &AtomicBool,
) -> Result<DuplicateReport> {
    validate_directory(dir_a)?;
    validate_directory(dir_b)?;

    let paths_a = list_file_paths(dir_a)?;
    let paths_b = list_file_paths(dir_b)?;
    info!(
        "Comparing {} files in {} against {} files in {}",
        paths_b.len(),
        dir_b.display(),
        paths_a.len(),
        dir_a.display()
    );

    let classes = group_cross_duplicates(&paths_a, &paths_b, config, shutdown)?;
    let report = DuplicateReport { classes };
    info!(
        "{} images in {} duplicate images in {}",
        report.duplicate_count(),
        dir_b.display(),
        dir_a.display()
    );
    Ok(report)
}
