//! Platform command implementations
//!
//! User-facing operations, each implemented as an extension of `Platform`
//! that performs the underlying library call and renders the result to the
//! platform's writer.

pub mod porcelain;
