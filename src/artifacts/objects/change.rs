//! File change entries carried by commits
//!
//! A commit records an ordered list of changes; each entry names the path,
//! the action taken, and the blob digest of the new content when applicable
//! (deleted entries carry no digest).
//!
//! ## Line format
//!
//! `change <action> <blob-sha|-> <path>` — the path comes last so it may
//! contain spaces.

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Added,
    Modified,
    Deleted,
}

impl ChangeAction {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeAction::Added => "added",
            ChangeAction::Modified => "modified",
            ChangeAction::Deleted => "deleted",
        }
    }
}

impl TryFrom<&str> for ChangeAction {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "added" => Ok(ChangeAction::Added),
            "modified" => Ok(ChangeAction::Modified),
            "deleted" => Ok(ChangeAction::Deleted),
            _ => Err(anyhow::anyhow!("Invalid change action: {}", value)),
        }
    }
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a commit's ordered change list
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct FileChange {
    path: String,
    action: ChangeAction,
    /// Blob digest of the resulting content; `None` for deletions
    blob_oid: Option<ObjectId>,
}

impl FileChange {
    pub fn added(path: impl Into<String>, blob_oid: ObjectId) -> Self {
        FileChange::new(path.into(), ChangeAction::Added, Some(blob_oid))
    }

    pub fn modified(path: impl Into<String>, blob_oid: ObjectId) -> Self {
        FileChange::new(path.into(), ChangeAction::Modified, Some(blob_oid))
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        FileChange::new(path.into(), ChangeAction::Deleted, None)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn action(&self) -> ChangeAction {
        self.action
    }

    pub fn blob_oid(&self) -> Option<&ObjectId> {
        self.blob_oid.as_ref()
    }

    pub fn to_line(&self) -> String {
        let blob = match &self.blob_oid {
            Some(oid) => oid.to_string(),
            None => "-".to_string(),
        };
        format!("change {} {} {}", self.action, blob, self.path)
    }

    pub fn try_parse_line(line: &str) -> anyhow::Result<Self> {
        let rest = line
            .strip_prefix("change ")
            .context("Invalid change line: missing prefix")?;

        let mut parts = rest.splitn(3, ' ');
        let action = parts
            .next()
            .context("Invalid change line: missing action")?;
        let blob = parts
            .next()
            .context("Invalid change line: missing blob digest")?;
        let path = parts.next().context("Invalid change line: missing path")?;

        if path.is_empty() {
            anyhow::bail!("Invalid change line: empty path");
        }

        let action = ChangeAction::try_from(action)?;
        let blob_oid = match blob {
            "-" => None,
            sha => Some(ObjectId::try_parse(sha.to_string())?),
        };

        if action == ChangeAction::Deleted && blob_oid.is_some() {
            anyhow::bail!("Invalid change line: deletion carries a blob digest");
        }
        if action != ChangeAction::Deleted && blob_oid.is_none() {
            anyhow::bail!("Invalid change line: {} without a blob digest", action);
        }

        Ok(FileChange::new(path.to_string(), action, blob_oid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some_oid() -> ObjectId {
        ObjectId::try_parse("a".repeat(40)).unwrap()
    }

    #[test]
    fn test_line_round_trip() {
        let change = FileChange::added("docs/guide with spaces.md", some_oid());
        let parsed = FileChange::try_parse_line(&change.to_line()).unwrap();
        assert_eq!(parsed, change);
    }

    #[test]
    fn test_deletion_has_no_blob() {
        let change = FileChange::deleted("src/old.rs");
        let line = change.to_line();
        assert_eq!(line, "change deleted - src/old.rs");
        assert_eq!(FileChange::try_parse_line(&line).unwrap(), change);
    }

    #[test]
    fn test_added_without_blob_is_rejected() {
        assert!(FileChange::try_parse_line("change added - src/new.rs").is_err());
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let line = format!("change renamed {} a.txt", "a".repeat(40));
        assert!(FileChange::try_parse_line(&line).is_err());
    }
}
