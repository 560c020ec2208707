//! Snapshot archives
//!
//! Exports the file state at a commit as a gzip-compressed tarball named
//! `<repo>-<commit>.tar.gz`. Entries are emitted directories first, then
//! files, each group sorted by path, with zeroed timestamps and fixed modes,
//! so archiving the same commit twice yields byte-identical output.

use crate::areas::database::Database;
use crate::artifacts::core::Result;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::tree::Snapshot;
use anyhow::Context;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub fn archive_file_name(repo_name: &str, commit: &ObjectId) -> String {
    format!("{}-{}.tar.gz", repo_name, commit.as_ref())
}

/// Write the snapshot at a commit as a deterministic tarball
pub fn write_tarball(
    database: &Database,
    snapshot: &Snapshot,
    repo_name: &str,
    commit: &ObjectId,
    dest_dir: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("failed to create archive directory {:?}", dest_dir))?;

    let archive_path = dest_dir.join(archive_file_name(repo_name, commit));
    let file = std::fs::File::create(&archive_path)
        .with_context(|| format!("failed to create archive at {:?}", archive_path))?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    let mut directories = BTreeSet::new();
    for path in snapshot.paths() {
        let mut cursor = path.as_str();
        while let Some((dir, _)) = cursor.rsplit_once('/') {
            directories.insert(dir.to_string());
            cursor = dir;
        }
    }

    for directory in &directories {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Directory);
        header.set_size(0);
        header.set_mode(0o755);
        header.set_mtime(0);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{}/", directory), std::io::empty())
            .with_context(|| format!("failed to archive directory {}", directory))?;
    }

    for (path, blob_oid) in snapshot.entries() {
        let blob = database.load_blob(blob_oid)?;
        let content = blob.content().as_bytes();

        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        header.set_cksum();
        builder
            .append_data(&mut header, path, content)
            .with_context(|| format!("failed to archive file {}", path))?;
    }

    builder
        .into_inner()
        .context("failed to finish archive")?
        .finish()
        .context("failed to finish archive compression")?;

    tracing::debug!(archive = %archive_path.display(), "wrote snapshot archive");
    Ok(archive_path)
}
