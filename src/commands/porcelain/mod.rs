//! User-facing platform commands
//!
//! ## Commands
//!
//! - `repo`: Create, show, list and delete repositories; collaborators
//! - `branch`: Create, list, rename, protect and delete branches
//! - `file`: Write, read and delete files; tree listings
//! - `log`: Commit history and file history
//! - `diff`: Revision diffs and branch comparison
//! - `pull`: Pull-request lifecycle and merging
//! - `fork`: Fork, unfork and fork listings
//! - `archive`: Snapshot tarball export

pub mod archive;
pub mod branch;
pub mod diff;
pub mod file;
pub mod fork;
pub mod log;
pub mod pull;
pub mod repo;

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::{Error, Result};
use crate::artifacts::objects::object_id::ObjectId;

// User-supplied names and digests arrive as raw strings; a malformed one is
// a validation outcome, not a storage fault.
pub(crate) fn parse_branch(name: &str) -> Result<BranchName> {
    BranchName::try_parse(name.to_string()).map_err(|e| Error::validation(e.to_string()))
}

pub(crate) fn parse_digest(value: &str) -> Result<ObjectId> {
    ObjectId::try_parse(value.to_string()).map_err(|e| Error::validation(e.to_string()))
}
