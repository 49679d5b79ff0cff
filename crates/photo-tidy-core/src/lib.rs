//! Core functionality for tidying photo directories.
//!
//! This library provides:
//! - Pixel-level duplicate detection within one directory or across two
//! - Conflict-free renaming plans for merging two directories
//! - HEIC/HEIF to JPEG conversion of a directory copy
//!
//! Everything that changes the filesystem (applying a rename plan, writing a
//! converted copy) is a separate, explicit call.

use log::info;
use std::path::Path;
use std::sync::{atomic::AtomicBool, Arc};

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::{Config, LogLevel};
pub use deduplication::{ClassSummary, DuplicateClass, DuplicateReport};
pub use error::{Error, Result};
pub use processing::{ContentKey, ImageIdentity};
pub use types::*;

// -- Public Modules --
pub mod action;
pub mod config;
pub mod deduplication;
pub mod discovery;
pub mod logging;
pub mod processing;
pub mod renaming;
pub mod types;

/// Main entry point holding the configuration and the shutdown flag
pub struct PhotoTidy {
    config: Config,
    shutdown_requested: Arc<AtomicBool>,
}

impl PhotoTidy {
    /// Create a new PhotoTidy with the provided configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Flag that stops a running scan or conversion after the current file
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown_requested)
    }

    /// Find pixel-identical images directly inside `directory`
    pub fn find_duplicates(&self, directory: &Path) -> Result<DuplicateReport> {
        deduplication::find_duplicates_in_directory(directory, &self.config, &self.shutdown_requested)
    }

    /// Find images in `dir_b` that duplicate an image in `dir_a`
    pub fn find_duplicates_between(&self, dir_a: &Path, dir_b: &Path) -> Result<DuplicateReport> {
        deduplication::find_duplicates_between(dir_a, dir_b, &self.config, &self.shutdown_requested)
    }

    /// Compute the renames `dir_b` needs before its files can join `dir_a`
    pub fn plan_merge(&self, dir_a: &Path, dir_b: &Path) -> Result<RenamePlan> {
        renaming::plan_directory_merge(dir_a, dir_b, &self.config)
    }

    /// Apply a previously computed plan to `dir_b`
    pub fn apply_plan(&self, dir_b: &Path, plan: &RenamePlan) -> Result<usize> {
        info!("Applying {} renames in {}", plan.len(), dir_b.display());
        action::apply_rename_plan(dir_b, plan)
    }

    /// Copy `source` next to itself with every HEIC/HEIF file converted to JPEG
    pub fn convert_directory(&self, source: &Path, destination_name: Option<&str>) -> Result<ConversionSummary> {
        processing::convert_directory(source, destination_name, &self.config, &self.shutdown_requested)
    }
}
