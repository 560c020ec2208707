//! Repository metadata records
//!
//! One `RepoMeta` record is persisted per hosted repository (`repo.json`).
//! Repository identity is the `(owner, name)` pair; everything else here is
//! plain metadata the authorization checks and the fork manager read.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// Collaborator permission level, ordered weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Admin,
}

impl Permission {
    pub fn try_parse(value: &str) -> Option<Permission> {
        match value {
            "read" => Some(Permission::Read),
            "write" => Some(Permission::Write),
            "admin" => Some(Permission::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub user: String,
    pub permission: Permission,
}

/// Repository identity: owner username + repository name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse an `owner/name` pair
    pub fn try_parse(value: &str) -> anyhow::Result<Self> {
        match value.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                Ok(RepoId::new(owner, name))
            }
            _ => Err(anyhow::anyhow!(
                "invalid repository reference '{}', expected owner/name",
                value
            )),
        }
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Persisted repository metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoMeta {
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub description: Option<String>,
    pub visibility: Visibility,
    pub default_branch: String,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    #[serde(default)]
    pub is_fork: bool,
    #[serde(default)]
    pub fork_from: Option<RepoId>,
}

impl RepoMeta {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        visibility: Visibility,
    ) -> Self {
        RepoMeta {
            name: name.into(),
            owner: owner.into(),
            description,
            visibility,
            default_branch: DEFAULT_BRANCH.to_string(),
            collaborators: Vec::new(),
            is_fork: false,
            fork_from: None,
        }
    }

    pub fn id(&self) -> RepoId {
        RepoId::new(self.owner.clone(), self.name.clone())
    }

    pub fn permission_of(&self, user: &str) -> Option<Permission> {
        self.collaborators
            .iter()
            .find(|c| c.user == user)
            .map(|c| c.permission)
    }

    /// Normalize a user-supplied repository name: trim, lowercase, collapse
    /// whitespace runs into hyphens
    pub fn normalize_name(raw: &str) -> String {
        raw.trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Name given to the branch every repository starts with
pub const DEFAULT_BRANCH: &str = "main";
