//! Commit object
//!
//! Commits are immutable revisions of a repository. They contain:
//! - Parent commit id(s) (zero for a repository's first commit)
//! - Author (platform username) and timestamp
//! - Commit message
//! - An ordered list of file changes
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! parent <parent-sha>
//! author <username> <timestamp> <timezone>
//! change <action> <blob-sha|-> <path>
//!
//! <commit message>
//! ```
//!
//! The commit's id is the SHA-1 digest of these bytes, so it is derived from
//! author, message, timestamp, parents and change set together. No field is
//! ever mutated after creation; only branch pointers move.

use crate::artifacts::objects::change::FileChange;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Commit author
///
/// The platform's identity boundary hands the core a resolved username; no
/// email is stored.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create a new author stamped with the current time
    pub fn new(name: String) -> Self {
        Author {
            name,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author { name, timestamp }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }

    /// Format author info as serialized: "name timestamp timezone"
    pub fn display(&self) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Format timestamp in human-readable form
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Format: "name timestamp timezone"; split from the right so the
        // username may contain spaces
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(anyhow::anyhow!("Invalid author format"));
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("Invalid timestamp"))?;
        let name = parts[2].to_string();

        // The timestamp is the instant; the timezone only tells how to
        // display it. Attaching the offset must not move the instant.
        let offset = timezone
            .parse::<chrono::FixedOffset>()
            .map_err(|_| anyhow::anyhow!("Invalid timezone"))?;
        let datetime = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            timestamp: datetime,
        })
    }
}

/// Immutable revision record
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit ids (empty for the first commit, two for merge commits)
    parents: Vec<ObjectId>,
    /// Author who recorded the revision
    author: Author,
    /// Commit message
    message: String,
    /// Ordered file change list
    changes: Vec<FileChange>,
}

impl Commit {
    pub fn new(
        parents: Vec<ObjectId>,
        author: Author,
        message: String,
        changes: Vec<FileChange>,
    ) -> Self {
        Commit {
            parents,
            author,
            message,
            changes,
        }
    }

    /// Get the first line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// First parent, the one followed when walking a branch's history
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.author.timestamp()
    }

    pub fn changes(&self) -> &[FileChange] {
        &self.changes
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut object_content = vec![];

        for parent in &self.parents {
            object_content.push(format!("parent {}", parent.as_ref()));
        }
        object_content.push(format!("author {}", self.author.display()));
        for change in &self.changes {
            object_content.push(change.to_line());
        }
        object_content.push(String::new());
        object_content.push(self.message.to_string());

        let object_content = object_content.join("\n");
        let content_bytes = object_content.as_bytes();

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;
        let mut lines = content.lines();

        // Parse all parent lines (0, 1, or multiple)
        let mut parents = Vec::new();
        let mut next_line = lines
            .next()
            .context("Invalid commit object: missing author line")?;

        while let Some(parent_oid) = next_line.strip_prefix("parent ") {
            parents.push(ObjectId::try_parse(parent_oid.to_string())?);

            next_line = lines
                .next()
                .context("Invalid commit object: missing author line")?;
        }

        let author = next_line
            .strip_prefix("author ")
            .context("Invalid commit object: invalid author line")?;
        let author = Author::try_from(author)?;

        // Parse change lines until the blank separator
        let mut changes = Vec::new();
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }
            changes.push(FileChange::try_parse_line(line)?);
        }

        let message = lines.collect::<Vec<&str>>().join("\n");
        Ok(Self::new(parents, author, message, changes))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut lines = vec![];

        for parent in &self.parents {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("author {}", self.author.display()));
        for change in &self.changes {
            lines.push(change.to_line());
        }
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn fixed_author() -> Author {
        let ts = chrono::DateTime::parse_from_rfc3339("2024-05-01T10:30:00+02:00").unwrap();
        Author::new_with_timestamp("alice".to_string(), ts)
    }

    fn strip_header(bytes: Bytes) -> Cursor<Vec<u8>> {
        let nul = bytes.iter().position(|b| *b == 0).unwrap();
        Cursor::new(bytes[nul + 1..].to_vec())
    }

    #[test]
    fn test_serialization_round_trip_preserves_all_fields() {
        let parent = ObjectId::try_parse("b".repeat(40)).unwrap();
        let blob = ObjectId::try_parse("c".repeat(40)).unwrap();
        let commit = Commit::new(
            vec![parent],
            fixed_author(),
            "add readme\n\nwith a body".to_string(),
            vec![
                FileChange::added("README.md", blob),
                FileChange::deleted("old.txt"),
            ],
        );

        let bytes = commit.serialize().unwrap();
        let parsed = Commit::deserialize(strip_header(bytes)).unwrap();
        assert_eq!(parsed, commit);
    }

    #[test]
    fn test_author_line_keeps_instant_and_offset() {
        let author = fixed_author();
        let parsed = Author::try_from(author.display().as_str()).unwrap();
        assert_eq!(parsed, author);
        assert_eq!(
            parsed.timestamp().timestamp(),
            author.timestamp().timestamp()
        );
        assert_eq!(parsed.readable_timestamp(), author.readable_timestamp());
    }

    #[test]
    fn test_root_commit_has_no_parents() {
        let commit = Commit::new(vec![], fixed_author(), "initial".to_string(), vec![]);
        let bytes = commit.serialize().unwrap();
        let parsed = Commit::deserialize(strip_header(bytes)).unwrap();
        assert!(parsed.parents().is_empty());
        assert!(parsed.parent().is_none());
    }

    #[test]
    fn test_id_is_content_derived() {
        let a = Commit::new(vec![], fixed_author(), "same".to_string(), vec![]);
        let b = Commit::new(vec![], fixed_author(), "same".to_string(), vec![]);
        let c = Commit::new(vec![], fixed_author(), "different".to_string(), vec![]);
        assert_eq!(a.object_id().unwrap(), b.object_id().unwrap());
        assert_ne!(a.object_id().unwrap(), c.object_id().unwrap());
    }

    #[test]
    fn test_merge_commit_keeps_parent_order() {
        let target = ObjectId::try_parse("d".repeat(40)).unwrap();
        let source = ObjectId::try_parse("e".repeat(40)).unwrap();
        let commit = Commit::new(
            vec![target.clone(), source],
            fixed_author(),
            "Merged PR #1: feature".to_string(),
            vec![],
        );
        // walking history follows the target side
        assert_eq!(commit.parent(), Some(&target));
    }
}
