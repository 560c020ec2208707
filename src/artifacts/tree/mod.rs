//! Snapshot and tree builder
//!
//! Commits store change lists, not full file listings. The state of a
//! repository at a commit is reconstructed by walking the first-parent chain
//! back to the root and replaying the change lists oldest first into a flat
//! `path -> blob` map. The nested tree view used by listings is derived from
//! that map by splitting paths on `/`.

use crate::areas::database::Database;
use crate::artifacts::core::{Error, Result};
use crate::artifacts::objects::change::ChangeAction;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;

/// Flat file listing of a repository at one commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<String, ObjectId>,
}

impl Snapshot {
    /// Reconstruct the snapshot at a commit (`None` yields the empty snapshot)
    pub fn of(database: &Database, head: Option<&ObjectId>) -> Result<Snapshot> {
        let mut chain = Vec::new();
        let mut cursor = head.cloned();
        while let Some(oid) = cursor {
            let commit = database.load_commit(&oid)?;
            cursor = commit.parent().cloned();
            chain.push(commit);
        }

        // replay oldest first so later changes win
        let mut entries = BTreeMap::new();
        for commit in chain.iter().rev() {
            for change in commit.changes() {
                match change.action() {
                    ChangeAction::Added | ChangeAction::Modified => {
                        if let Some(blob_oid) = change.blob_oid() {
                            entries.insert(change.path().to_string(), blob_oid.clone());
                        }
                    }
                    ChangeAction::Deleted => {
                        entries.remove(change.path());
                    }
                }
            }
        }

        Ok(Snapshot { entries })
    }

    pub fn get(&self, path: &str) -> Option<&ObjectId> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Files sorted by path
    pub fn entries(&self) -> impl Iterator<Item = (&String, &ObjectId)> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Locate a README at the snapshot root, if any
    ///
    /// Matches `README`, `README.md`, `README.txt` and `README.rst`
    /// case-insensitively; the lexicographically first match wins.
    pub fn find_readme(&self) -> Option<(&String, &ObjectId)> {
        let re = regex::Regex::new(r"(?i)^README(\.md|\.txt|\.rst)?$").ok()?;
        self.entries
            .iter()
            .find(|(path, _)| !path.contains('/') && re.is_match(path))
    }

    /// Derive the nested tree view
    pub fn to_tree(&self) -> TreeNode {
        let mut root = TreeNode::new_dir(String::new());
        for (path, blob_oid) in &self.entries {
            root.insert(path, blob_oid.clone());
        }
        root
    }
}

/// One node of the nested tree view, directories first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    name: String,
    /// `Some` for files, `None` for directories
    blob_oid: Option<ObjectId>,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn new_dir(name: String) -> Self {
        TreeNode {
            name,
            blob_oid: None,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.blob_oid.is_none()
    }

    pub fn blob_oid(&self) -> Option<&ObjectId> {
        self.blob_oid.as_ref()
    }

    /// Children ordered directories first, then files, each alphabetically
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    fn insert(&mut self, path: &str, blob_oid: ObjectId) {
        match path.split_once('/') {
            Some((dir, rest)) => {
                let child = match self
                    .children
                    .iter_mut()
                    .position(|c| c.is_dir() && c.name == dir)
                {
                    Some(index) => &mut self.children[index],
                    None => {
                        self.children.push(TreeNode::new_dir(dir.to_string()));
                        self.children.last_mut().unwrap()
                    }
                };
                child.insert(rest, blob_oid);
            }
            None => {
                self.children.push(TreeNode {
                    name: path.to_string(),
                    blob_oid: Some(blob_oid),
                    children: Vec::new(),
                });
            }
        }
        self.children
            .sort_by(|a, b| b.is_dir().cmp(&a.is_dir()).then(a.name.cmp(&b.name)));
    }
}

/// Look up a single file's blob in a snapshot, with a typed miss
pub fn blob_at<'a>(snapshot: &'a Snapshot, path: &str) -> Result<&'a ObjectId> {
    snapshot
        .get(path)
        .ok_or_else(|| Error::not_found(format!("file {} not found", path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(fill: char) -> ObjectId {
        ObjectId::try_parse(fill.to_string().repeat(40)).unwrap()
    }

    fn snapshot_of(entries: Vec<(&str, ObjectId)>) -> Snapshot {
        Snapshot {
            entries: entries
                .into_iter()
                .map(|(path, blob)| (path.to_string(), blob))
                .collect(),
        }
    }

    #[test]
    fn test_tree_orders_directories_before_files() {
        let snapshot = snapshot_of(vec![
            ("zeta.txt", oid('a')),
            ("src/main.rs", oid('b')),
            ("src/lib.rs", oid('c')),
            ("alpha.txt", oid('d')),
        ]);

        let tree = snapshot.to_tree();
        let names: Vec<&str> = tree.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["src", "alpha.txt", "zeta.txt"]);

        let src = &tree.children()[0];
        assert!(src.is_dir());
        let src_names: Vec<&str> = src.children().iter().map(|c| c.name()).collect();
        assert_eq!(src_names, vec!["lib.rs", "main.rs"]);
    }

    #[test]
    fn test_tree_is_insertion_order_independent() {
        let forward = snapshot_of(vec![("a/b.txt", oid('a')), ("a/c.txt", oid('b'))]);
        let backward = snapshot_of(vec![("a/c.txt", oid('b')), ("a/b.txt", oid('a'))]);
        assert_eq!(forward.to_tree(), backward.to_tree());
    }

    #[test]
    fn test_find_readme_is_case_insensitive_and_root_only() {
        let snapshot = snapshot_of(vec![
            ("docs/README.md", oid('a')),
            ("ReadMe.rst", oid('b')),
            ("readme.markdown", oid('c')),
        ]);
        let (path, blob) = snapshot.find_readme().unwrap();
        assert_eq!(path, "ReadMe.rst");
        assert_eq!(blob, &oid('b'));
    }

    #[test]
    fn test_find_readme_misses_when_absent() {
        let snapshot = snapshot_of(vec![("docs/README.md", oid('a'))]);
        assert!(snapshot.find_readme().is_none());
    }

    #[test]
    fn test_blob_at_typed_miss() {
        let snapshot = snapshot_of(vec![("a.txt", oid('a'))]);
        assert_eq!(blob_at(&snapshot, "a.txt").unwrap(), &oid('a'));
        assert!(matches!(
            blob_at(&snapshot, "missing.txt"),
            Err(Error::NotFound(_))
        ));
    }
}
