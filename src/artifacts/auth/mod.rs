//! Authorization capability checks
//!
//! The identity provider is an external collaborator: every operation
//! receives an already-resolved `AccessContext` (username + platform role)
//! and the core only decides what that identity may do. The scattered
//! owner/collaborator/admin checks of a typical controller layer collapse
//! into the three capability predicates here, used uniformly by every write
//! path.

use crate::artifacts::core::{Error, Result};
use crate::artifacts::repo::{Permission, RepoMeta, Visibility};
use derive_new::new;

/// Platform-wide role supplied by the identity boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    /// Platform administrators may delete any repository
    Admin,
}

/// Resolved identity of the caller
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct AccessContext {
    user: String,
    role: Role,
}

impl AccessContext {
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.role
    }

    fn is_owner(&self, meta: &RepoMeta) -> bool {
        meta.owner == self.user
    }

    /// Read access: public repositories, the owner, and any collaborator
    pub fn can_read(&self, meta: &RepoMeta) -> bool {
        meta.visibility == Visibility::Public
            || self.is_owner(meta)
            || meta.permission_of(&self.user).is_some()
    }

    /// Write access: owner, or collaborator with write/admin permission
    pub fn can_write(&self, meta: &RepoMeta) -> bool {
        self.is_owner(meta)
            || meta
                .permission_of(&self.user)
                .is_some_and(|p| p >= Permission::Write)
    }

    /// Administrative access: owner, admin collaborator, or platform admin
    pub fn can_administer(&self, meta: &RepoMeta) -> bool {
        self.role == Role::Admin
            || self.is_owner(meta)
            || meta.permission_of(&self.user) == Some(Permission::Admin)
    }

    pub fn require_read(&self, meta: &RepoMeta) -> Result<()> {
        if self.can_read(meta) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "repository {} is private",
                meta.id()
            )))
        }
    }

    pub fn require_write(&self, meta: &RepoMeta) -> Result<()> {
        if self.can_write(meta) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "write permission required on {}",
                meta.id()
            )))
        }
    }

    pub fn require_admin(&self, meta: &RepoMeta) -> Result<()> {
        if self.can_administer(meta) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "admin permission required on {}",
                meta.id()
            )))
        }
    }
}
