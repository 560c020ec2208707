//! Platform composition root
//!
//! Owns the data directory and the repository namespace (`<root>/<owner>/
//! <name>`), enforces authorization through `AccessContext`, and hosts the
//! cross-repository operations: lifecycle, collaborators, forks, archives.
//! Everything below this layer is unguarded.

use crate::areas::repository::Repository;
use crate::artifacts::archive;
use crate::artifacts::auth::AccessContext;
use crate::artifacts::core::{Error, Result};
use crate::artifacts::fork;
use crate::artifacts::repo::{Collaborator, Permission, RepoId, RepoMeta, Visibility};
use anyhow::Context;
use std::path::{Path, PathBuf};

pub struct Platform {
    root: Box<Path>,
    writer: Box<dyn std::io::Write>,
}

impl Platform {
    pub fn new(root: impl Into<PathBuf>) -> Result<Platform> {
        Self::with_writer(root, Box::new(std::io::stdout()))
    }

    pub fn with_writer(
        root: impl Into<PathBuf>,
        writer: Box<dyn std::io::Write>,
    ) -> Result<Platform> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create data directory {:?}", root))?;
        Ok(Platform {
            root: root.into_boxed_path(),
            writer,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn writer(&mut self) -> &mut dyn std::io::Write {
        &mut *self.writer
    }

    fn repo_path(&self, id: &RepoId) -> PathBuf {
        self.root.join(&id.owner).join(&id.name)
    }

    // ------------------------------------------------------------------
    // lifecycle

    /// Create a repository owned by the caller
    ///
    /// The name is normalized (trimmed, lowercased, whitespace runs become
    /// hyphens) before the uniqueness check.
    pub fn create_repository(
        &self,
        ctx: &AccessContext,
        name: &str,
        description: Option<String>,
        visibility: Visibility,
    ) -> Result<Repository> {
        let name = RepoMeta::normalize_name(name);
        if name.is_empty() {
            return Err(Error::validation("repository name cannot be empty"));
        }

        let meta = RepoMeta::new(ctx.user(), name, description, visibility);
        Repository::init(&self.repo_path(&meta.id()), meta)
    }

    /// Open a repository the caller may read
    pub fn get_repository(&self, ctx: &AccessContext, id: &RepoId) -> Result<Repository> {
        let repository = self.open_unchecked(id)?;
        ctx.require_read(repository.meta())?;
        Ok(repository)
    }

    fn open_unchecked(&self, id: &RepoId) -> Result<Repository> {
        let path = self.repo_path(id);
        if !path.join("repo.json").is_file() {
            return Err(Error::not_found(format!("repository {} not found", id)));
        }
        Repository::open(&path)
    }

    /// Repositories under one owner that the caller may read, sorted by name
    pub fn list_repositories(&self, ctx: &AccessContext, owner: &str) -> Result<Vec<RepoMeta>> {
        let owner_path = self.root.join(owner);
        if !owner_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut metas = Vec::new();
        for entry in std::fs::read_dir(&owner_path)? {
            let path = entry?.path();
            if path.join("repo.json").is_file() {
                let repository = Repository::open(&path)?;
                if ctx.can_read(repository.meta()) {
                    metas.push(repository.meta().clone());
                }
            }
        }
        metas.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(metas)
    }

    /// Delete a repository and everything under it
    pub fn delete_repository(&self, ctx: &AccessContext, id: &RepoId) -> Result<()> {
        let repository = self.open_unchecked(id)?;
        ctx.require_admin(repository.meta())?;

        std::fs::remove_dir_all(self.repo_path(id))
            .with_context(|| format!("failed to delete repository {}", id))?;

        tracing::info!(repo = %id, user = ctx.user(), "deleted repository");
        Ok(())
    }

    // ------------------------------------------------------------------
    // collaborators

    pub fn add_collaborator(
        &self,
        ctx: &AccessContext,
        id: &RepoId,
        user: &str,
        permission: Permission,
    ) -> Result<()> {
        let mut repository = self.open_unchecked(id)?;
        ctx.require_admin(repository.meta())?;

        if user == repository.meta().owner {
            return Err(Error::validation(format!(
                "{} already owns {}",
                user, id
            )));
        }

        let meta = repository.meta_mut();
        match meta.collaborators.iter_mut().find(|c| c.user == user) {
            Some(existing) => existing.permission = permission,
            None => meta.collaborators.push(Collaborator {
                user: user.to_string(),
                permission,
            }),
        }
        repository.save_meta()?;

        tracing::info!(repo = %id, collaborator = user, "updated collaborator");
        Ok(())
    }

    pub fn remove_collaborator(
        &self,
        ctx: &AccessContext,
        id: &RepoId,
        user: &str,
    ) -> Result<()> {
        let mut repository = self.open_unchecked(id)?;
        ctx.require_admin(repository.meta())?;

        let meta = repository.meta_mut();
        let before = meta.collaborators.len();
        meta.collaborators.retain(|c| c.user != user);
        if meta.collaborators.len() == before {
            return Err(Error::not_found(format!(
                "{} is not a collaborator on {}",
                user, id
            )));
        }
        repository.save_meta()?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // forks

    /// Fork a repository under the caller's namespace
    ///
    /// The fork copies metadata, the object store and all refs; pull requests
    /// are not copied. One fork per user and origin.
    pub fn fork(&self, ctx: &AccessContext, origin_id: &RepoId) -> Result<RepoMeta> {
        let origin = self.get_repository(ctx, origin_id)?;

        if origin_id.owner == ctx.user() {
            return Err(Error::validation(format!(
                "cannot fork own repository {}",
                origin_id
            )));
        }
        if self.find_fork(ctx.user(), origin_id)?.is_some() {
            return Err(Error::conflict(format!(
                "{} already forked {}",
                ctx.user(),
                origin_id
            )));
        }

        let taken: Vec<String> = self
            .list_repositories(ctx, ctx.user())?
            .into_iter()
            .map(|meta| meta.name)
            .collect();
        let name = fork::fork_name(&taken, &origin_id.name);

        let mut meta = RepoMeta::new(
            ctx.user(),
            name,
            origin.meta().description.clone(),
            origin.meta().visibility,
        );
        meta.default_branch = origin.meta().default_branch.clone();
        meta.is_fork = true;
        meta.fork_from = Some(origin_id.clone());

        let fork_path = self.repo_path(&meta.id());
        std::fs::create_dir_all(&fork_path)
            .with_context(|| format!("failed to create fork directory {:?}", fork_path))?;
        fork::copy_revision_data(origin.path(), &fork_path)?;

        let json = serde_json::to_vec_pretty(&meta)?;
        std::fs::write(fork_path.join("repo.json"), json)
            .with_context(|| format!("failed to write fork metadata at {:?}", fork_path))?;

        tracing::info!(origin = %origin_id, fork = %meta.id(), "forked repository");
        Ok(meta)
    }

    /// Delete the caller's fork of a repository
    pub fn unfork(&self, ctx: &AccessContext, origin_id: &RepoId) -> Result<()> {
        let fork = self.find_fork(ctx.user(), origin_id)?.ok_or_else(|| {
            Error::not_found(format!("{} has no fork of {}", ctx.user(), origin_id))
        })?;

        std::fs::remove_dir_all(self.repo_path(&fork.id()))
            .with_context(|| format!("failed to delete fork {}", fork.id()))?;

        tracing::info!(origin = %origin_id, fork = %fork.id(), "deleted fork");
        Ok(())
    }

    /// All forks of an origin the caller may see
    pub fn list_forks(&self, ctx: &AccessContext, origin_id: &RepoId) -> Result<Vec<RepoMeta>> {
        let mut forks = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let owner_path = entry?.path();
            if !owner_path.is_dir() {
                continue;
            }
            for repo_entry in std::fs::read_dir(&owner_path)? {
                let repo_path = repo_entry?.path();
                if !repo_path.join("repo.json").is_file() {
                    continue;
                }
                let repository = Repository::open(&repo_path)?;
                if repository.meta().fork_from.as_ref() == Some(origin_id)
                    && ctx.can_read(repository.meta())
                {
                    forks.push(repository.meta().clone());
                }
            }
        }
        forks.sort_by(|a, b| (&a.owner, &a.name).cmp(&(&b.owner, &b.name)));

        Ok(forks)
    }

    fn find_fork(&self, user: &str, origin_id: &RepoId) -> Result<Option<RepoMeta>> {
        let owner_path = self.root.join(user);
        if !owner_path.is_dir() {
            return Ok(None);
        }

        for entry in std::fs::read_dir(&owner_path)? {
            let path = entry?.path();
            if path.join("repo.json").is_file() {
                let repository = Repository::open(&path)?;
                if repository.meta().fork_from.as_ref() == Some(origin_id) {
                    return Ok(Some(repository.meta().clone()));
                }
            }
        }
        Ok(None)
    }

    // ------------------------------------------------------------------
    // archives

    /// Export the snapshot at a revision as a tarball in `dest_dir`
    pub fn archive_repository(
        &self,
        ctx: &AccessContext,
        id: &RepoId,
        reference: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let repository = self.get_repository(ctx, id)?;
        let resolved = repository.resolve(reference)?;
        let snapshot = repository.snapshot_at(reference)?;

        archive::write_tarball(
            repository.database(),
            &snapshot,
            &id.name,
            resolved.commit_id(),
            dest_dir,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::auth::Role;
    use crate::artifacts::branch::branch_name::BranchName;
    use crate::artifacts::objects::commit::Author;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    fn ctx(user: &str) -> AccessContext {
        AccessContext::new(user.to_string(), Role::User)
    }

    fn platform(temp: &TempDir) -> Platform {
        Platform::new(temp.path().join("data")).unwrap()
    }

    #[test]
    fn test_create_normalizes_name_and_rejects_duplicates() {
        let temp = TempDir::new().unwrap();
        let platform = platform(&temp);
        let alice = ctx("alice");

        let repository = platform
            .create_repository(&alice, "  My Demo  Repo ", None, Visibility::Public)
            .unwrap();
        assert_eq!(repository.meta().name, "my-demo-repo");

        assert!(matches!(
            platform.create_repository(&alice, "my demo repo", None, Visibility::Public),
            Err(Error::Conflict(_))
        ));
        assert!(matches!(
            platform.create_repository(&alice, "   ", None, Visibility::Public),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_private_repository_is_hidden_from_outsiders() {
        let temp = TempDir::new().unwrap();
        let platform = platform(&temp);
        let alice = ctx("alice");
        let mallory = ctx("mallory");

        platform
            .create_repository(&alice, "secret", None, Visibility::Private)
            .unwrap();
        let id = RepoId::new("alice", "secret");

        assert!(matches!(
            platform.get_repository(&mallory, &id),
            Err(Error::Forbidden(_))
        ));
        assert!(platform.list_repositories(&mallory, "alice").unwrap().is_empty());

        platform
            .add_collaborator(&alice, &id, "mallory", Permission::Read)
            .unwrap();
        assert!(platform.get_repository(&mallory, &id).is_ok());
    }

    #[test]
    fn test_collaborator_permissions_gate_writes() {
        let temp = TempDir::new().unwrap();
        let platform = platform(&temp);
        let alice = ctx("alice");
        let bob = ctx("bob");

        platform
            .create_repository(&alice, "demo", None, Visibility::Public)
            .unwrap();
        let id = RepoId::new("alice", "demo");

        assert!(matches!(
            platform.add_collaborator(&bob, &id, "bob", Permission::Write),
            Err(Error::Forbidden(_))
        ));

        platform
            .add_collaborator(&alice, &id, "bob", Permission::Write)
            .unwrap();
        let repository = platform.get_repository(&bob, &id).unwrap();
        assert!(bob.can_write(repository.meta()));

        platform.remove_collaborator(&alice, &id, "bob").unwrap();
        assert!(matches!(
            platform.remove_collaborator(&alice, &id, "bob"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_fork_copies_data_but_not_pulls() {
        let temp = TempDir::new().unwrap();
        let platform = platform(&temp);
        let alice = ctx("alice");
        let bob = ctx("bob");

        let origin = platform
            .create_repository(&alice, "demo", Some("docs".into()), Visibility::Public)
            .unwrap();
        let main = BranchName::try_parse("main".to_string()).unwrap();
        origin
            .put_file(&main, "a.txt", "a", Author::new("alice".into()), "base")
            .unwrap();
        let feature = BranchName::try_parse("feature".to_string()).unwrap();
        origin.create_branch(&feature, None).unwrap();
        origin
            .open_pull_request("alice", "wip", None, &feature, &main, vec![], true)
            .unwrap();

        let origin_id = RepoId::new("alice", "demo");
        let fork_meta = platform.fork(&bob, &origin_id).unwrap();
        assert_eq!(fork_meta.name, "demo");
        assert!(fork_meta.is_fork);
        assert_eq!(fork_meta.fork_from, Some(origin_id.clone()));
        assert_eq!(fork_meta.description.as_deref(), Some("docs"));

        let fork = platform.get_repository(&bob, &fork_meta.id()).unwrap();
        assert_eq!(
            fork.get_file_content("main", "a.txt").unwrap().content(),
            "a"
        );
        assert_eq!(fork.list_branches().unwrap().len(), 2);
        assert!(fork.list_pull_requests(None).unwrap().is_empty());

        // second fork of the same origin is refused
        assert!(matches!(
            platform.fork(&bob, &origin_id),
            Err(Error::Conflict(_))
        ));

        // fork is independently mutable
        fork.put_file(&main, "b.txt", "b", Author::new("bob".into()), "fork work")
            .unwrap();
        assert!(matches!(
            origin.get_file_content("main", "b.txt"),
            Err(Error::NotFound(_))
        ));

        assert_eq!(platform.list_forks(&bob, &origin_id).unwrap().len(), 1);
        platform.unfork(&bob, &origin_id).unwrap();
        assert!(matches!(
            platform.unfork(&bob, &origin_id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_fork_name_collision_gets_suffix() {
        let temp = TempDir::new().unwrap();
        let platform = platform(&temp);
        let alice = ctx("alice");
        let bob = ctx("bob");

        platform
            .create_repository(&alice, "demo", None, Visibility::Public)
            .unwrap();
        platform
            .create_repository(&bob, "demo", None, Visibility::Public)
            .unwrap();

        let fork_meta = platform.fork(&bob, &RepoId::new("alice", "demo")).unwrap();
        assert_eq!(fork_meta.name, "demo-fork1");
    }

    #[test]
    fn test_delete_repository_requires_admin() {
        let temp = TempDir::new().unwrap();
        let platform = platform(&temp);
        let alice = ctx("alice");
        let mallory = ctx("mallory");
        let root = AccessContext::new("root".to_string(), Role::Admin);

        platform
            .create_repository(&alice, "demo", None, Visibility::Public)
            .unwrap();
        let id = RepoId::new("alice", "demo");

        assert!(matches!(
            platform.delete_repository(&mallory, &id),
            Err(Error::Forbidden(_))
        ));
        platform.delete_repository(&root, &id).unwrap();
        assert!(matches!(
            platform.get_repository(&alice, &id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_archive_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let platform = platform(&temp);
        let alice = ctx("alice");

        let repository = platform
            .create_repository(&alice, "demo", None, Visibility::Public)
            .unwrap();
        let main = BranchName::try_parse("main".to_string()).unwrap();
        repository
            .put_file(&main, "src/lib.rs", "pub fn x() {}", Author::new("alice".into()), "one")
            .unwrap();
        repository
            .put_file(&main, "README.md", "# demo", Author::new("alice".into()), "two")
            .unwrap();

        let id = RepoId::new("alice", "demo");
        let first = platform
            .archive_repository(&alice, &id, "main", &temp.path().join("out1"))
            .unwrap();
        let second = platform
            .archive_repository(&alice, &id, "main", &temp.path().join("out2"))
            .unwrap();

        let head = repository.refs().read_head(&main).unwrap().unwrap();
        assert_eq!(
            first.file_name().unwrap().to_string_lossy(),
            format!("demo-{}.tar.gz", head)
        );
        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }
}
