//! Branch directory
//!
//! Branches are named, mutable pointers into the commit graph. Each branch is
//! one text file under `refs/heads/<name>` holding the head object id; an
//! empty file is an "unborn" branch that has no commits yet. A marker file
//! under `refs/protected/<name>` flags the branch as protected, which blocks
//! deletion.
//!
//! Branch head files are the only mutable shared state in a repository, so
//! every head mutation happens under an exclusive file lock as a single
//! compare-and-swap: the caller states the head it observed, and the swap
//! fails with a conflict when another writer got there first. Advancing to
//! the already-current head is a no-op, which makes write-path retries
//! idempotent.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::{Error, Result};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::{Read, Seek, SeekFrom, Write};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Branch reference manager of one repository
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory holding `refs/`
    path: Box<Path>,
}

impl Refs {
    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    /// Create a branch pointing at the given head (`None` for unborn)
    pub fn create_branch(&self, name: &BranchName, head: Option<&ObjectId>) -> Result<()> {
        let branch_path = self.branch_path(name);

        if branch_path.exists() {
            return Err(Error::conflict(format!("branch {} already exists", name)));
        }

        std::fs::create_dir_all(branch_path.parent().with_context(|| {
            format!("invalid branch ref path {}", branch_path.display())
        })?)?;

        let raw_ref = head.map(|oid| oid.to_string()).unwrap_or_default();
        std::fs::write(&branch_path, raw_ref)
            .with_context(|| format!("failed to write branch ref at {:?}", branch_path))?;

        Ok(())
    }

    /// Read a branch's head commit id; `Ok(None)` for an unborn branch
    pub fn read_head(&self, name: &BranchName) -> Result<Option<ObjectId>> {
        let branch_path = self.branch_path(name);
        if !branch_path.is_file() {
            return Err(Error::not_found(format!("branch {} not found", name)));
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("failed to read branch ref at {:?}", branch_path))?;
        let content = content.trim();

        if content.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ObjectId::try_parse(content.to_string())?))
        }
    }

    /// Atomically advance a branch head from `expected_old` to `new_oid`
    ///
    /// Runs as one compare-and-swap under an exclusive lock on the ref file.
    /// Advancing to the current head again is a no-op so that a retried
    /// write-path completion cannot double-apply; any other mismatch between
    /// the stored head and `expected_old` means a concurrent writer won, and
    /// the swap fails with `Conflict` leaving the ref untouched.
    pub fn advance_head(
        &self,
        name: &BranchName,
        expected_old: Option<&ObjectId>,
        new_oid: &ObjectId,
    ) -> Result<()> {
        let branch_path = self.branch_path(name);
        if !branch_path.is_file() {
            return Err(Error::not_found(format!("branch {} not found", name)));
        }

        let mut ref_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&branch_path)
            .with_context(|| format!("failed to open branch ref at {:?}", branch_path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)
            .with_context(|| format!("failed to lock branch ref at {:?}", branch_path))?;

        let file = lock.deref_mut();
        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("failed to read branch ref at {:?}", branch_path))?;
        let content = content.trim();

        let current = if content.is_empty() {
            None
        } else {
            Some(ObjectId::try_parse(content.to_string())?)
        };

        if current.as_ref() == Some(new_oid) {
            // idempotent retry of an already-applied advance
            return Ok(());
        }

        if current.as_ref() != expected_old {
            return Err(Error::conflict(format!(
                "branch {} was updated concurrently (expected {}, found {})",
                name,
                expected_old.map(|o| o.to_short_oid()).unwrap_or_else(|| "<none>".into()),
                current.map(|o| o.to_short_oid()).unwrap_or_else(|| "<none>".into()),
            )));
        }

        file.seek(SeekFrom::Start(0))?;
        file.set_len(0)?;
        file.write_all(new_oid.as_ref().as_bytes())?;

        tracing::debug!(branch = %name, head = %new_oid.to_short_oid(), "advanced branch head");
        Ok(())
    }

    /// Delete a branch; protected branches refuse
    pub fn delete_branch(&self, name: &BranchName) -> Result<Option<ObjectId>> {
        if self.is_protected(name) {
            return Err(Error::forbidden(format!(
                "cannot delete protected branch {}",
                name
            )));
        }

        let head = self.read_head(name)?;
        let branch_path = self.branch_path(name);

        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch ref at {:?}", branch_path))?;
        self.prune_empty_parent_dirs(&branch_path, self.heads_path().as_path())?;

        Ok(head)
    }

    /// Rename a branch, carrying its head and protection marker along
    ///
    /// Uniqueness is atomic: the target is checked and the ref file renamed
    /// in place, so there is never a moment with two refs or none.
    pub fn rename_branch(&self, old_name: &BranchName, new_name: &BranchName) -> Result<()> {
        let old_path = self.branch_path(old_name);
        if !old_path.is_file() {
            return Err(Error::not_found(format!("branch {} not found", old_name)));
        }

        let new_path = self.branch_path(new_name);
        if new_path.exists() {
            return Err(Error::conflict(format!(
                "branch {} already exists",
                new_name
            )));
        }

        std::fs::create_dir_all(new_path.parent().with_context(|| {
            format!("invalid branch ref path {}", new_path.display())
        })?)?;
        std::fs::rename(&old_path, &new_path)
            .with_context(|| format!("failed to rename branch {} to {}", old_name, new_name))?;
        self.prune_empty_parent_dirs(&old_path, self.heads_path().as_path())?;

        let old_marker = self.protected_marker_path(old_name);
        if old_marker.is_file() {
            let new_marker = self.protected_marker_path(new_name);
            std::fs::create_dir_all(new_marker.parent().with_context(|| {
                format!("invalid protection marker path {}", new_marker.display())
            })?)?;
            std::fs::rename(&old_marker, &new_marker)
                .with_context(|| format!("failed to move marker to {:?}", new_marker))?;
            self.prune_empty_parent_dirs(&old_marker, self.protected_path().as_path())?;
        }

        Ok(())
    }

    pub fn is_protected(&self, name: &BranchName) -> bool {
        self.protected_marker_path(name).is_file()
    }

    pub fn set_protection(&self, name: &BranchName, protected: bool) -> Result<()> {
        if !self.branch_exists(name) {
            return Err(Error::not_found(format!("branch {} not found", name)));
        }

        let marker_path = self.protected_marker_path(name);
        if protected {
            std::fs::create_dir_all(marker_path.parent().with_context(|| {
                format!("invalid protection marker path {}", marker_path.display())
            })?)?;
            std::fs::write(&marker_path, "")
                .with_context(|| format!("failed to write marker at {:?}", marker_path))?;
        } else if marker_path.exists() {
            std::fs::remove_file(&marker_path)
                .with_context(|| format!("failed to remove marker at {:?}", marker_path))?;
            self.prune_empty_parent_dirs(&marker_path, self.protected_path().as_path())?;
        }

        Ok(())
    }

    /// List branch names, sorted
    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        let heads = self.heads_path();
        if !heads.exists() {
            return Ok(Vec::new());
        }

        let mut branches = WalkDir::new(&heads)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&heads).ok()?;
                BranchName::try_parse(relative_path.to_string_lossy().to_string()).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    fn branch_path(&self, name: &BranchName) -> PathBuf {
        self.heads_path().join(name.as_ref())
    }

    fn protected_marker_path(&self, name: &BranchName) -> PathBuf {
        self.protected_path().join(name.as_ref())
    }

    fn prune_empty_parent_dirs(&self, path: &Path, stop: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && parent != stop
            && parent.exists()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("failed to remove empty ref directory {:?}", parent))?;
            self.prune_empty_parent_dirs(parent, stop)?;
        }

        Ok(())
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    fn protected_path(&self) -> PathBuf {
        self.refs_path().join("protected")
    }
}
