//! Conflict-free names for merging the files of two directories.
//!
//! A name present in both directories keeps its extension and gets the
//! lowest free `(n)` suffix on its stem: `photo.jpg` becomes `photo(1).jpg`,
//! then `photo(2).jpg` if that is taken too.

use log::{debug, info};
use std::collections::BTreeSet;
use std::path::Path;

use crate::config::Config;
use crate::discovery::{list_file_names, validate_directory};
use crate::error::{Error, Result};
use crate::types::{NameSet, Rename, RenamePlan};

/// Split a file name into stem and extension at the last `.`.
///
/// The extension keeps its dot. Leading dots belong to the stem, so
/// `.bashrc` has no extension; a name without a dot has an empty extension.
pub fn split_name(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(pos) => name.split_at(leading + pos),
        None => (name, ""),
    }
}

/// `stem(counter)extension`
pub fn suffixed_name(stem: &str, counter: u32, extension: &str) -> String {
    format!("{}({}){}", stem, counter, extension)
}

/// First `name(n)` candidate, counting from 1, that is not in `taken`
pub fn next_free_name(name: &str, taken: &BTreeSet<String>, max_suffix: u32) -> Result<String> {
    let (stem, extension) = split_name(name);

    (1..=max_suffix)
        .map(|counter| suffixed_name(stem, counter, extension))
        .find(|candidate| !taken.contains(candidate))
        .ok_or_else(|| Error::NameCollisionExhausted {
            name: name.to_string(),
            limit: max_suffix,
        })
}

/// Plan new names for every file name present in both sets.
///
/// Colliding names are visited in lexicographic order. Each new name is
/// reserved as soon as it is chosen, so no two renames in the plan share a
/// target and no target exists in either set.
pub fn resolve_collisions(names_a: &NameSet, names_b: &NameSet, max_suffix: u32) -> Result<RenamePlan> {
    let colliding: Vec<&String> = names_a.intersection(names_b).collect();
    if colliding.is_empty() {
        debug!("No colliding file names");
        return Ok(RenamePlan::default());
    }

    let mut all_names: BTreeSet<String> = names_a.union(names_b).cloned().collect();
    let mut renames = Vec::with_capacity(colliding.len());

    for name in colliding {
        let new_name = next_free_name(name, &all_names, max_suffix)?;
        all_names.insert(new_name.clone());
        renames.push(Rename {
            old_name: name.clone(),
            new_name,
        });
    }

    Ok(RenamePlan { renames })
}

/// List both directories and plan the renames needed in `dir_b`.
///
/// Both paths are validated before either is listed.
pub fn plan_directory_merge(dir_a: &Path, dir_b: &Path, config: &Config) -> Result<RenamePlan> {
    validate_directory(dir_a)?;
    validate_directory(dir_b)?;

    let names_a = list_file_names(dir_a)?;
    let names_b = list_file_names(dir_b)?;

    let plan = resolve_collisions(&names_a, &names_b, config.max_rename_suffix)?;
    info!(
        "{} of {} file names in {} also appear in {}",
        plan.len(),
        names_b.len(),
        dir_b.display(),
        dir_a.display()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> NameSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("photo.jpg"), ("photo", ".jpg"));
        assert_eq!(split_name("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_name("README"), ("README", ""));
        assert_eq!(split_name(".bashrc"), (".bashrc", ""));
        assert_eq!(split_name(".config.json"), (".config", ".json"));
        assert_eq!(split_name("trailing."), ("trailing", "."));
    }

    #[test]
    fn test_single_collision() {
        let plan = resolve_collisions(&names(&["a.txt", "b.txt"]), &names(&["b.txt", "c.txt"]), 100).unwrap();

        assert_eq!(
            plan.renames,
            vec![Rename {
                old_name: "b.txt".to_string(),
                new_name: "b(1).txt".to_string(),
            }]
        );
    }

    #[test]
    fn test_no_overlap_is_empty() {
        let plan = resolve_collisions(&names(&["a.jpg", "b.jpg"]), &names(&["c.jpg", "d"]), 100).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_skips_taken_suffixes() {
        let a = names(&["photo.jpg", "photo(1).jpg"]);
        let b = names(&["photo.jpg", "photo(2).jpg"]);

        let plan = resolve_collisions(&a, &b, 100).unwrap();
        assert_eq!(plan.new_name_for("photo.jpg"), Some("photo(3).jpg"));
    }

    #[test]
    fn test_extension_preserved() {
        let plan = resolve_collisions(&names(&["photo.jpg"]), &names(&["photo.jpg"]), 100).unwrap();
        let new_name = plan.new_name_for("photo.jpg").unwrap();
        assert_eq!(new_name, "photo(1).jpg");
        assert!(!new_name.ends_with(')'));
    }

    #[test]
    fn test_new_names_are_unique_within_plan() {
        // "x(1).y" and "z(1).txt" already exist on one side
        let a = names(&["x", "x.y", "x(1).y", "z.txt"]);
        let b = names(&["x", "x.y", "z.txt", "z(1).txt"]);

        let plan = resolve_collisions(&a, &b, 100).unwrap();
        let all: NameSet = a.union(&b).cloned().collect();

        let mut seen = NameSet::new();
        for rename in plan.iter() {
            assert!(!all.contains(&rename.new_name), "{} already existed", rename.new_name);
            assert!(seen.insert(rename.new_name.clone()), "{} assigned twice", rename.new_name);
        }
        assert_eq!(plan.new_name_for("x"), Some("x(1)"));
        assert_eq!(plan.new_name_for("x.y"), Some("x(2).y"));
        assert_eq!(plan.new_name_for("z.txt"), Some("z(2).txt"));
    }

    #[test]
    fn test_already_suffixed_names() {
        let a = names(&["a.txt", "a(1).txt"]);
        let b = names(&["a.txt", "a(1).txt"]);

        let plan = resolve_collisions(&a, &b, 100).unwrap();
        assert_eq!(plan.new_name_for("a(1).txt"), Some("a(1)(1).txt"));
        assert_eq!(plan.new_name_for("a.txt"), Some("a(2).txt"));
    }

    #[test]
    fn test_plan_order_is_lexicographic() {
        let a = names(&["c.txt", "a.txt", "b.txt"]);
        let plan = resolve_collisions(&a, &a.clone(), 100).unwrap();

        let order: Vec<&str> = plan.iter().map(|r| r.old_name.as_str()).collect();
        assert_eq!(order, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_suffix_limit() {
        let a = names(&["f.txt", "f(1).txt", "f(2).txt"]);
        let b = names(&["f.txt"]);

        match resolve_collisions(&a, &b, 2) {
            Err(Error::NameCollisionExhausted { name, limit }) => {
                assert_eq!(name, "f.txt");
                assert_eq!(limit, 2);
            }
            other => panic!("expected NameCollisionExhausted, got {:?}", other),
        }
    }
}
