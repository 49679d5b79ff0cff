//! Decoding, content identity and format conversion.

pub mod convert;
pub mod formats;
pub mod identity;

use log::info;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::Config;
use crate::error::{Error, Result};

// Expose the classifier
pub use identity::{classify, decode_pixels, is_jpeg, try_classify, ContentKey, DecodedPixels, ImageIdentity};

// Expose conversion
pub use convert::{convert_directory, convert_heic_file};

/// Build a rayon pool with `threads` workers (0 = one per CPU)
pub(crate) fn thread_pool(threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("photo-tidy-decode-{}", i))
        .build()
        .map_err(|e| Error::Configuration(format!("Failed to build thread pool: {}", e)))
}

/// Classify every path in parallel, keeping listing order and dropping
/// anything that is not a recognised image.
///
/// Each file is independent; when `shutdown` is raised the remaining files
/// are not decoded and the whole call reports `Interrupted`.
pub fn classify_all(paths: &[PathBuf], config: &Config, shutdown: &AtomicBool) -> Result<Vec<ImageIdentity>> {
    let pool = thread_pool(config.threads)?;

    let results: Vec<Option<ImageIdentity>> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                if shutdown.load(Ordering::Relaxed) {
                    return None;
                }
                classify(path, &config.recognised_formats)
            })
            .collect()
    });

    if shutdown.load(Ordering::Relaxed) {
        return Err(Error::Interrupted);
    }

    let identities: Vec<ImageIdentity> = results.into_iter().flatten().collect();
    info!("{} of {} files are recognised images", identities.len(), paths.len());
    Ok(identities)
}
