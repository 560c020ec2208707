//! Fork manager helpers
//!
//! A fork is an independent copy of a repository under another owner. The
//! platform layer owns the directory layout; this module holds the naming
//! rule and the data copy. Objects and refs are copied wholesale so the fork
//! is independently mutable; pull requests stay behind.

use crate::artifacts::core::Result;
use anyhow::Context;
use std::path::Path;
use walkdir::WalkDir;

/// Pick a repository name for a fork, resolving collisions with
/// `-fork1`, `-fork2`, ... suffixes
pub fn fork_name(taken: &[String], base: &str) -> String {
    if !taken.iter().any(|name| name == base) {
        return base.to_string();
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{}-fork{}", base, counter);
        if !taken.iter().any(|name| name == &candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Copy a repository's object store and refs into a fork directory
pub fn copy_revision_data(origin: &Path, fork: &Path) -> Result<()> {
    for area in ["objects", "refs"] {
        let src_root = origin.join(area);
        if !src_root.exists() {
            continue;
        }

        for entry in WalkDir::new(&src_root) {
            let entry = entry
                .with_context(|| format!("failed to walk {} of {}", area, origin.display()))?;
            let relative = entry
                .path()
                .strip_prefix(&src_root)
                .with_context(|| format!("path escapes {} area", area))?;
            let target = fork.join(area).join(relative);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)
                    .with_context(|| format!("failed to create {:?}", target))?;
            } else {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {:?}", parent))?;
                }
                std::fs::copy(entry.path(), &target)
                    .with_context(|| format!("failed to copy {:?}", entry.path()))?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fork_name_without_collision() {
        assert_eq!(fork_name(&["other".into()], "demo"), "demo");
    }

    #[test]
    fn test_fork_name_counts_past_collisions() {
        let taken = vec!["demo".into(), "demo-fork1".into(), "demo-fork2".into()];
        assert_eq!(fork_name(&taken, "demo"), "demo-fork3");
    }
}
