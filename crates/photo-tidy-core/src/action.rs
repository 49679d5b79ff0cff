//! Executes a confirmed rename plan on disk.
//!
//! Nothing else in the library touches the filesystem in a destructive way;
//! callers decide when (and whether) a computed plan is applied.

use log::error;
use std::fs;
use std::path::Path;

use crate::discovery::validate_directory;
use crate::error::{Error, Result};
use crate::logging::{log_file_error, log_fs_modification};
use crate::types::RenamePlan;

/// Apply `plan` inside `directory`, one rename at a time, in plan order.
///
/// Stops at the first rename that fails or whose target already exists;
/// renames performed before that point are kept. Returns the number of
/// renames performed.
pub fn apply_rename_plan(directory: &Path, plan: &RenamePlan) -> Result<usize> {
    validate_directory(directory)?;

    let mut applied = 0;
    for rename in plan.iter() {
        let from = directory.join(&rename.old_name);
        let to = directory.join(&rename.new_name);

        if to.exists() {
            error!(
                "Rename target appeared after planning: {} ({} of {} renames applied)",
                to.display(),
                applied,
                plan.len()
            );
            return Err(Error::RenameTargetExists(to));
        }

        if let Err(e) = fs::rename(&from, &to) {
            log_file_error(&from, "rename", &e);
            return Err(Error::at("rename", &from)(e));
        }

        log_fs_modification("rename", &from, Some(&format!("to {}", to.display())));
        applied += 1;
    }

    Ok(applied)
}
