//! Revision-model data structures and algorithms
//!
//! This module contains the core platform types and algorithms:
//!
//! - `archive`: Snapshot tarball export
//! - `auth`: Authorization capability checks
//! - `branch`: Branch names and revision reference resolution
//! - `core`: Error taxonomy shared by every operation
//! - `diff`: Snapshot diffing and branch comparison
//! - `fork`: Fork naming and data copy helpers
//! - `merge`: Pull requests and the merge engine
//! - `objects`: Stored object types (blob, commit)
//! - `repo`: Repository metadata records
//! - `tree`: Snapshot replay and the nested tree view

pub mod archive;
pub mod auth;
pub mod branch;
pub mod core;
pub mod diff;
pub mod fork;
pub mod merge;
pub mod objects;
pub mod repo;
pub mod tree;
