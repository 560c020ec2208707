//! Diff and compare engine
//!
//! Two revisions are compared at the file level by diffing their snapshots:
//! paths present only in the newer side are additions, paths present on both
//! sides with different blob digests are modifications, paths present only in
//! the older side are deletions. Branch comparison additionally walks both
//! first-parent histories and partitions them by set difference into ahead
//! and behind commit lists.

use crate::areas::database::Database;
use crate::artifacts::core::Result;
use crate::artifacts::objects::change::ChangeAction;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::tree::Snapshot;
use bitflags::bitflags;
use std::collections::HashSet;

bitflags! {
    /// Which change kinds a diff listing should include
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DiffFilter: u8 {
        const ADDED = 1 << 0;
        const MODIFIED = 1 << 1;
        const DELETED = 1 << 2;
    }
}

impl Default for DiffFilter {
    fn default() -> Self {
        DiffFilter::all()
    }
}

impl DiffFilter {
    pub fn admits(&self, action: ChangeAction) -> bool {
        match action {
            ChangeAction::Added => self.contains(DiffFilter::ADDED),
            ChangeAction::Modified => self.contains(DiffFilter::MODIFIED),
            ChangeAction::Deleted => self.contains(DiffFilter::DELETED),
        }
    }
}

/// One file-level difference between two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub path: String,
    pub action: ChangeAction,
    /// Blob digest on the older side, absent for additions
    pub old_blob: Option<ObjectId>,
    /// Blob digest on the newer side, absent for deletions
    pub new_blob: Option<ObjectId>,
}

/// File-level diff of two snapshots, sorted by path
pub fn diff_snapshots(base: &Snapshot, other: &Snapshot, filter: DiffFilter) -> Vec<DiffEntry> {
    let mut entries = Vec::new();

    for (path, new_blob) in other.entries() {
        match base.get(path) {
            None => entries.push(DiffEntry {
                path: path.clone(),
                action: ChangeAction::Added,
                old_blob: None,
                new_blob: Some(new_blob.clone()),
            }),
            Some(old_blob) if old_blob != new_blob => entries.push(DiffEntry {
                path: path.clone(),
                action: ChangeAction::Modified,
                old_blob: Some(old_blob.clone()),
                new_blob: Some(new_blob.clone()),
            }),
            Some(_) => {}
        }
    }

    for (path, old_blob) in base.entries() {
        if !other.contains(path) {
            entries.push(DiffEntry {
                path: path.clone(),
                action: ChangeAction::Deleted,
                old_blob: Some(old_blob.clone()),
                new_blob: None,
            });
        }
    }

    entries.retain(|entry| filter.admits(entry.action));
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries
}

/// Diff the snapshots at two commits
pub fn diff_commits(
    database: &Database,
    base: Option<&ObjectId>,
    other: Option<&ObjectId>,
    filter: DiffFilter,
) -> Result<Vec<DiffEntry>> {
    let base_snapshot = Snapshot::of(database, base)?;
    let other_snapshot = Snapshot::of(database, other)?;
    Ok(diff_snapshots(&base_snapshot, &other_snapshot, filter))
}

/// A commit paired with its digest, as listed by history and compare views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    pub oid: ObjectId,
    pub commit: Commit,
}

/// Result of comparing a base revision with another revision
#[derive(Debug, Clone)]
pub struct BranchComparison {
    /// Commits reachable from the compared revision but not from base,
    /// newest first
    pub ahead: Vec<CommitEntry>,
    /// Commits reachable from base but not from the compared revision,
    /// newest first
    pub behind: Vec<CommitEntry>,
    /// File-level diff from base to the compared revision
    pub diff: Vec<DiffEntry>,
}

impl BranchComparison {
    pub fn is_identical(&self) -> bool {
        self.ahead.is_empty() && self.behind.is_empty()
    }
}

/// First-parent history from a head, newest first
pub fn first_parent_walk(
    database: &Database,
    head: Option<&ObjectId>,
) -> Result<Vec<CommitEntry>> {
    let mut entries = Vec::new();
    let mut cursor = head.cloned();
    while let Some(oid) = cursor {
        let commit = database.load_commit(&oid)?;
        cursor = commit.parent().cloned();
        entries.push(CommitEntry { oid, commit });
    }
    Ok(entries)
}

/// Compare two revision heads by history set difference and snapshot diff
pub fn compare(
    database: &Database,
    base_head: Option<&ObjectId>,
    other_head: Option<&ObjectId>,
) -> Result<BranchComparison> {
    let base_history = first_parent_walk(database, base_head)?;
    let other_history = first_parent_walk(database, other_head)?;

    let base_set: HashSet<&ObjectId> = base_history.iter().map(|e| &e.oid).collect();
    let other_set: HashSet<&ObjectId> = other_history.iter().map(|e| &e.oid).collect();

    let ahead = other_history
        .iter()
        .filter(|e| !base_set.contains(&e.oid))
        .cloned()
        .collect();
    let behind = base_history
        .iter()
        .filter(|e| !other_set.contains(&e.oid))
        .cloned()
        .collect();

    let diff = diff_commits(database, base_head, other_head, DiffFilter::all())?;

    Ok(BranchComparison {
        ahead,
        behind,
        diff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::change::FileChange;
    use crate::artifacts::objects::commit::{Author, Commit};
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    fn author() -> Author {
        let ts = chrono::DateTime::parse_from_rfc3339("2024-05-01T10:30:00+02:00").unwrap();
        Author::new_with_timestamp("alice".to_string(), ts)
    }

    fn store_commit(
        database: &Database,
        parents: Vec<ObjectId>,
        message: &str,
        changes: Vec<(&str, Option<&str>)>,
    ) -> ObjectId {
        let changes = changes
            .into_iter()
            .map(|(path, content)| match content {
                Some(content) => {
                    let blob = Blob::new(content.to_string());
                    let blob_oid = database.store(&blob).unwrap();
                    FileChange::added(path, blob_oid)
                }
                None => FileChange::deleted(path),
            })
            .collect();
        let commit = Commit::new(parents, author(), message.to_string(), changes);
        database.store(&commit).unwrap()
    }

    #[test]
    fn test_compare_partitions_histories() {
        let temp = TempDir::new().unwrap();
        let database = Database::new(temp.path().into());

        let root = store_commit(&database, vec![], "root", vec![("a.txt", Some("a"))]);
        let on_main = store_commit(
            &database,
            vec![root.clone()],
            "main work",
            vec![("b.txt", Some("b"))],
        );
        let on_feature = store_commit(
            &database,
            vec![root.clone()],
            "feature work",
            vec![("c.txt", Some("c"))],
        );

        let comparison = compare(&database, Some(&on_main), Some(&on_feature)).unwrap();
        assert_eq!(comparison.ahead.len(), 1);
        assert_eq!(comparison.ahead[0].oid, on_feature);
        assert_eq!(comparison.behind.len(), 1);
        assert_eq!(comparison.behind[0].oid, on_main);
        assert!(!comparison.is_identical());

        let same = compare(&database, Some(&root), Some(&root)).unwrap();
        assert!(same.is_identical());
        assert!(same.diff.is_empty());
    }

    #[test]
    fn test_diff_classifies_add_modify_delete() {
        let temp = TempDir::new().unwrap();
        let database = Database::new(temp.path().into());

        let base = store_commit(
            &database,
            vec![],
            "base",
            vec![("keep.txt", Some("same")), ("edit.txt", Some("v1")), ("gone.txt", Some("x"))],
        );
        let tip = store_commit(
            &database,
            vec![base.clone()],
            "tip",
            vec![("edit.txt", Some("v2")), ("gone.txt", None), ("new.txt", Some("n"))],
        );

        let diff = diff_commits(&database, Some(&base), Some(&tip), DiffFilter::all()).unwrap();
        let summary: Vec<(&str, ChangeAction)> = diff
            .iter()
            .map(|e| (e.path.as_str(), e.action))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("edit.txt", ChangeAction::Modified),
                ("gone.txt", ChangeAction::Deleted),
                ("new.txt", ChangeAction::Added),
            ]
        );

        let only_deletions =
            diff_commits(&database, Some(&base), Some(&tip), DiffFilter::DELETED).unwrap();
        assert_eq!(only_deletions.len(), 1);
        assert_eq!(only_deletions[0].path, "gone.txt");
        assert!(only_deletions[0].new_blob.is_none());
    }

    #[test]
    fn test_diff_against_empty_base_lists_everything_as_added() {
        let temp = TempDir::new().unwrap();
        let database = Database::new(temp.path().into());

        let tip = store_commit(&database, vec![], "initial", vec![("a.txt", Some("a"))]);
        let diff = diff_commits(&database, None, Some(&tip), DiffFilter::all()).unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].action, ChangeAction::Added);
        assert!(diff[0].old_blob.is_none());
    }
}
