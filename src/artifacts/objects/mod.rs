//! Revision-model object types and operations
//!
//! The platform stores repository history as content-addressed objects
//! identified by SHA-1 digests. There are two stored types:
//!
//! - **Blob**: one file version (raw content)
//! - **Commit**: a revision with author, message, parent ids and an ordered
//!   list of file changes
//!
//! Trees are never stored; they are derived from a commit's change history
//! (see `artifacts::tree`). All objects serialize to the envelope format
//! `<type> <size>\0<content>`, and their id is the digest of those bytes, so
//! identity is deterministic and putting identical content twice is a no-op.

pub mod blob;
pub mod change;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 digest in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
