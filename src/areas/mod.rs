//! Storage areas of the hosted platform
//!
//! This module contains the persistence building blocks, one per concern:
//!
//! - `database`: content-addressed object store (blobs, commits) per repository
//! - `refs`: branch directory — named mutable pointers into the commit graph
//! - `pulls`: numbered pull-request records per repository
//! - `repository`: one hosted repository, wiring the areas above together
//! - `platform`: composition root owning the data directory and all repositories

pub mod database;
pub mod platform;
pub mod pulls;
pub mod refs;
pub mod repository;
