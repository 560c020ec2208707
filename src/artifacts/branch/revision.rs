//! Revision reference resolution
//!
//! User-facing operations accept either a branch name or a full 40-hex commit
//! id. Branch names take precedence: a branch named after a hex string shadows
//! the commit with that id.

use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::{Error, Result};
use crate::artifacts::objects::object_id::ObjectId;

/// A revision reference resolved to a concrete commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRef {
    Branch { name: BranchName, commit: ObjectId },
    Commit { commit: ObjectId },
}

impl ResolvedRef {
    /// Resolve a branch name or full commit id
    ///
    /// An existing branch without commits resolves to an error since there is
    /// no revision to point at.
    pub fn resolve(refs: &Refs, database: &Database, reference: &str) -> Result<Self> {
        if let Ok(name) = BranchName::try_parse(reference.to_string())
            && refs.branch_exists(&name)
        {
            return match refs.read_head(&name)? {
                Some(commit) => Ok(ResolvedRef::Branch { name, commit }),
                None => Err(Error::not_found(format!(
                    "branch {} has no commits",
                    reference
                ))),
            };
        }

        if ObjectId::looks_like_oid(reference) {
            let commit = ObjectId::try_parse(reference.to_string())?;
            if database.contains(&commit) {
                database.load_commit(&commit)?;
                return Ok(ResolvedRef::Commit { commit });
            }
        }

        Err(Error::not_found(format!(
            "reference {} not found",
            reference
        )))
    }

    pub fn commit_id(&self) -> &ObjectId {
        match self {
            ResolvedRef::Branch { commit, .. } => commit,
            ResolvedRef::Commit { commit } => commit,
        }
    }
}
