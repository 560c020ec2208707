//! One hosted repository
//!
//! A repository is a directory under the platform data root:
//!
//! ```text
//! <root>/<owner>/<name>/
//!   repo.json          metadata record
//!   objects/           content-addressed blob and commit store
//!   refs/heads/        branch head files
//!   refs/protected/    protection markers
//!   pulls/             numbered pull-request records
//! ```
//!
//! `Repository` wires the storage areas together and implements the revision
//! operations on top of them. It performs no authorization; the platform
//! layer checks capabilities before calling in.

use crate::areas::database::Database;
use crate::areas::pulls::Pulls;
use crate::areas::refs::Refs;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::revision::ResolvedRef;
use crate::artifacts::core::{Error, Result};
use crate::artifacts::diff::{self, BranchComparison, CommitEntry, DiffEntry, DiffFilter};
use crate::artifacts::merge::pull_request::{MergeStrategy, PullRequest, PullStatus};
use crate::artifacts::merge::{self, mergeable};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::change::FileChange;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::repo::RepoMeta;
use crate::artifacts::tree::{self, Snapshot, TreeNode};
use anyhow::Context;
use std::path::Path;

const META_FILE: &str = "repo.json";

/// A page of commit history, newest first
#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub entries: Vec<CommitEntry>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

/// A branch listed with its head and protection flag
#[derive(Debug, Clone)]
pub struct BranchEntry {
    pub name: BranchName,
    pub head: Option<ObjectId>,
    pub protected: bool,
}

#[derive(Debug)]
pub struct Repository {
    path: Box<Path>,
    meta: RepoMeta,
    database: Database,
    refs: Refs,
    pulls: Pulls,
}

impl Repository {
    /// Initialize a repository directory with an unborn, protected default
    /// branch
    pub fn init(path: &Path, meta: RepoMeta) -> Result<Repository> {
        if path.join(META_FILE).exists() {
            return Err(Error::conflict(format!(
                "repository {} already exists",
                meta.id()
            )));
        }

        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create repository directory {:?}", path))?;

        let repository = Self::assemble(path, meta)?;
        repository.save_meta()?;

        let default_branch = repository.default_branch()?;
        repository.refs.create_branch(&default_branch, None)?;
        repository.refs.set_protection(&default_branch, true)?;

        tracing::info!(repo = %repository.meta.id(), "initialized repository");
        Ok(repository)
    }

    /// Open an existing repository directory
    pub fn open(path: &Path) -> Result<Repository> {
        let meta_path = path.join(META_FILE);
        if !meta_path.is_file() {
            return Err(Error::not_found(format!(
                "no repository at {}",
                path.display()
            )));
        }

        let content = std::fs::read(&meta_path)
            .with_context(|| format!("failed to read metadata at {:?}", meta_path))?;
        let meta: RepoMeta = serde_json::from_slice(&content)?;

        Self::assemble(path, meta)
    }

    fn assemble(path: &Path, meta: RepoMeta) -> Result<Repository> {
        Ok(Repository {
            path: path.into(),
            meta,
            database: Database::new(path.join("objects").into_boxed_path()),
            refs: Refs::new(path.into()),
            pulls: Pulls::new(path.into()),
        })
    }

    pub fn save_meta(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.meta)?;
        std::fs::write(self.path.join(META_FILE), json)
            .with_context(|| format!("failed to write metadata at {:?}", self.path))?;
        Ok(())
    }

    pub fn meta(&self) -> &RepoMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut RepoMeta {
        &mut self.meta
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    fn default_branch(&self) -> Result<BranchName> {
        Ok(BranchName::try_parse(self.meta.default_branch.clone())?)
    }

    // ------------------------------------------------------------------
    // commits

    /// Record a commit on a branch and advance its head
    ///
    /// The branch head read at the start is the compare-and-swap expectation,
    /// so a concurrent commit on the same branch fails with `Conflict`
    /// instead of silently dropping a revision.
    pub fn create_commit(
        &self,
        branch: &BranchName,
        author: Author,
        message: &str,
        changes: Vec<FileChange>,
    ) -> Result<ObjectId> {
        if message.trim().is_empty() {
            return Err(Error::validation("commit message cannot be empty"));
        }

        let head = self.refs.read_head(branch)?;
        if let Some(parent) = &head
            && !self.database.contains(parent)
        {
            return Err(Error::not_found(format!(
                "parent commit {} not found",
                parent.to_short_oid()
            )));
        }
        let commit = Commit::new(
            head.clone().into_iter().collect(),
            author,
            message.to_string(),
            changes,
        );
        let commit_oid = self.database.store(&commit)?;
        self.refs.advance_head(branch, head.as_ref(), &commit_oid)?;

        tracing::info!(
            repo = %self.meta.id(),
            branch = %branch,
            commit = %commit_oid.to_short_oid(),
            "created commit"
        );
        Ok(commit_oid)
    }

    pub fn get_commit(&self, oid: &ObjectId) -> Result<Commit> {
        self.database.load_commit(oid)
    }

    /// Paginated first-parent history of a revision (default branch when
    /// `reference` is `None`); an unborn branch lists nothing
    pub fn list_commits(
        &self,
        reference: Option<&str>,
        page: usize,
        per_page: usize,
    ) -> Result<HistoryPage> {
        if per_page == 0 {
            return Err(Error::validation("page size must be positive"));
        }

        let head = match reference {
            None => self.refs.read_head(&self.default_branch()?)?,
            Some(reference) => {
                // an existing but unborn branch has an empty history
                if let Ok(name) = BranchName::try_parse(reference.to_string())
                    && self.refs.branch_exists(&name)
                {
                    self.refs.read_head(&name)?
                } else {
                    Some(self.resolve(reference)?.commit_id().clone())
                }
            }
        };

        let history = diff::first_parent_walk(&self.database, head.as_ref())?;
        let total = history.len();
        let entries = history
            .into_iter()
            .skip(page.saturating_sub(1) * per_page)
            .take(per_page)
            .collect();

        Ok(HistoryPage {
            entries,
            total,
            page: page.max(1),
            per_page,
        })
    }

    /// Commits of a revision's history that touched the given path
    pub fn file_history(&self, reference: &str, path: &str) -> Result<Vec<CommitEntry>> {
        let resolved = self.resolve(reference)?;
        let history = diff::first_parent_walk(&self.database, Some(resolved.commit_id()))?;

        Ok(history
            .into_iter()
            .filter(|entry| entry.commit.changes().iter().any(|c| c.path() == path))
            .collect())
    }

    pub fn resolve(&self, reference: &str) -> Result<ResolvedRef> {
        ResolvedRef::resolve(&self.refs, &self.database, reference)
    }

    // ------------------------------------------------------------------
    // files

    /// Write one file on a branch as a new commit
    pub fn put_file(
        &self,
        branch: &BranchName,
        path: &str,
        content: &str,
        author: Author,
        message: &str,
    ) -> Result<ObjectId> {
        validate_file_path(path)?;

        let head = self.refs.read_head(branch)?;
        let snapshot = Snapshot::of(&self.database, head.as_ref())?;

        let blob_oid = self.database.store(&Blob::new(content.to_string()))?;
        let change = if snapshot.contains(path) {
            FileChange::modified(path, blob_oid)
        } else {
            FileChange::added(path, blob_oid)
        };

        self.create_commit(branch, author, message, vec![change])
    }

    /// Remove one file on a branch as a new commit
    pub fn delete_file(
        &self,
        branch: &BranchName,
        path: &str,
        author: Author,
        message: &str,
    ) -> Result<ObjectId> {
        let head = self.refs.read_head(branch)?;
        let snapshot = Snapshot::of(&self.database, head.as_ref())?;
        if !snapshot.contains(path) {
            return Err(Error::not_found(format!("file {} not found", path)));
        }

        self.create_commit(branch, author, message, vec![FileChange::deleted(path)])
    }

    /// Read one file's content at a revision
    pub fn get_file_content(&self, reference: &str, path: &str) -> Result<Blob> {
        let snapshot = self.snapshot_at(reference)?;
        let blob_oid = tree::blob_at(&snapshot, path)?;
        self.database.load_blob(blob_oid)
    }

    /// Flat file listing at a revision
    pub fn snapshot_at(&self, reference: &str) -> Result<Snapshot> {
        let resolved = self.resolve(reference)?;
        Snapshot::of(&self.database, Some(resolved.commit_id()))
    }

    /// Nested tree view at a revision, directories before files
    pub fn tree_at(&self, reference: &str) -> Result<TreeNode> {
        Ok(self.snapshot_at(reference)?.to_tree())
    }

    /// Root-level README at a revision, if any
    pub fn readme(&self, reference: &str) -> Result<Option<(String, Blob)>> {
        let snapshot = self.snapshot_at(reference)?;
        match snapshot.find_readme() {
            Some((path, blob_oid)) => {
                let blob = self.database.load_blob(blob_oid)?;
                Ok(Some((path.clone(), blob)))
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // branches

    /// Create a branch from another branch or a commit id (default branch
    /// head when `from` is `None`)
    pub fn create_branch(&self, name: &BranchName, from: Option<&str>) -> Result<()> {
        let head = match from {
            Some(reference) => Some(self.resolve(reference)?.commit_id().clone()),
            None => self.refs.read_head(&self.default_branch()?)?,
        };

        self.refs.create_branch(name, head.as_ref())?;
        tracing::info!(repo = %self.meta.id(), branch = %name, "created branch");
        Ok(())
    }

    pub fn delete_branch(&self, name: &BranchName) -> Result<()> {
        if name.as_ref() == self.meta.default_branch {
            return Err(Error::forbidden(format!(
                "cannot delete default branch {}",
                name
            )));
        }

        self.refs.delete_branch(name)?;
        tracing::info!(repo = %self.meta.id(), branch = %name, "deleted branch");
        Ok(())
    }

    /// Rename a branch, following the default-branch name if it moves
    pub fn rename_branch(&mut self, old_name: &BranchName, new_name: &BranchName) -> Result<()> {
        self.refs.rename_branch(old_name, new_name)?;

        if old_name.as_ref() == self.meta.default_branch {
            self.meta.default_branch = new_name.as_ref().to_string();
            self.save_meta()?;
        }

        Ok(())
    }

    pub fn set_branch_protection(&self, name: &BranchName, protected: bool) -> Result<()> {
        self.refs.set_protection(name, protected)
    }

    pub fn list_branches(&self) -> Result<Vec<BranchEntry>> {
        self.refs
            .list_branches()?
            .into_iter()
            .map(|name| {
                let head = self.refs.read_head(&name)?;
                let protected = self.refs.is_protected(&name);
                Ok(BranchEntry {
                    name,
                    head,
                    protected,
                })
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // compare and diff

    /// Compare a base revision with another revision
    pub fn compare(&self, base: &str, other: &str) -> Result<BranchComparison> {
        let base_head = self.resolve(base)?.commit_id().clone();
        let other_head = self.resolve(other)?.commit_id().clone();
        diff::compare(&self.database, Some(&base_head), Some(&other_head))
    }

    /// File-level diff from one revision to another
    pub fn diff(&self, base: &str, other: &str, filter: DiffFilter) -> Result<Vec<DiffEntry>> {
        let base_head = self.resolve(base)?.commit_id().clone();
        let other_head = self.resolve(other)?.commit_id().clone();
        diff::diff_commits(
            &self.database,
            Some(&base_head),
            Some(&other_head),
            filter,
        )
    }

    /// File-level change set introduced by one commit over its first parent
    pub fn commit_diff(&self, oid: &ObjectId, filter: DiffFilter) -> Result<Vec<DiffEntry>> {
        let commit = self.database.load_commit(oid)?;
        diff::diff_commits(&self.database, commit.parent(), Some(oid), filter)
    }

    // ------------------------------------------------------------------
    // pull requests

    /// Open a pull request from a source branch into a target branch
    #[allow(clippy::too_many_arguments)]
    pub fn open_pull_request(
        &self,
        author: &str,
        title: &str,
        description: Option<String>,
        source_branch: &BranchName,
        target_branch: &BranchName,
        reviewers: Vec<String>,
        draft: bool,
    ) -> Result<PullRequest> {
        if title.trim().is_empty() {
            return Err(Error::validation("pull request title cannot be empty"));
        }
        if source_branch == target_branch {
            return Err(Error::validation(
                "source and target branches must differ",
            ));
        }

        let source_head = self.refs.read_head(source_branch)?.ok_or_else(|| {
            Error::validation(format!("branch {} has no commits", source_branch))
        })?;
        let target_head = self.refs.read_head(target_branch)?;

        let duplicate = self.pulls.list()?.into_iter().any(|pull| {
            pull.is_open()
                && pull.source_branch == source_branch.as_ref()
                && pull.target_branch == target_branch.as_ref()
        });
        if duplicate {
            return Err(Error::conflict(format!(
                "an open pull request from {} into {} already exists",
                source_branch, target_branch
            )));
        }

        let pull = PullRequest {
            number: self.pulls.next_number()?,
            title: title.trim().to_string(),
            description,
            author: author.to_string(),
            source_branch: source_branch.as_ref().to_string(),
            target_branch: target_branch.as_ref().to_string(),
            head_sha: source_head.to_string(),
            base_sha: target_head.map(|oid| oid.to_string()).unwrap_or_default(),
            status: if draft {
                PullStatus::Draft
            } else {
                PullStatus::Open
            },
            reviewers,
            merge_commit_sha: None,
            created_at: chrono::Utc::now(),
        };
        self.pulls.save(&pull)?;

        tracing::info!(
            repo = %self.meta.id(),
            pull = pull.number,
            source = %source_branch,
            target = %target_branch,
            "opened pull request"
        );
        Ok(pull)
    }

    pub fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        self.pulls.load(number)
    }

    /// Pull requests, newest first, optionally filtered by status
    pub fn list_pull_requests(&self, status: Option<PullStatus>) -> Result<Vec<PullRequest>> {
        let mut pulls = self.pulls.list()?;
        if let Some(status) = status {
            pulls.retain(|pull| pull.status == status);
        }
        Ok(pulls)
    }

    /// Whether a pull request's branches currently differ
    pub fn pull_request_mergeable(&self, number: u64) -> Result<bool> {
        let pull = self.pulls.load(number)?;
        if !pull.is_open() {
            return Ok(false);
        }

        let source = BranchName::try_parse(pull.source_branch.clone())?;
        let target = BranchName::try_parse(pull.target_branch.clone())?;
        let source_head = self.refs.read_head(&source)?;
        let target_head = self.refs.read_head(&target)?;
        Ok(mergeable(target_head.as_ref(), source_head.as_ref()))
    }

    /// Merge an open pull request into its target branch
    ///
    /// Terminal states absorb: merging a merged or closed pull request fails
    /// with `Conflict`, and the first merge records `merge_commit_sha`
    /// permanently.
    pub fn merge_pull_request(
        &self,
        number: u64,
        strategy: MergeStrategy,
        author: Author,
    ) -> Result<PullRequest> {
        let mut pull = self.pulls.load(number)?;
        match pull.status {
            PullStatus::Open => {}
            PullStatus::Draft => {
                return Err(Error::validation(format!(
                    "pull request #{} is a draft",
                    number
                )));
            }
            PullStatus::Merged | PullStatus::Closed => {
                return Err(Error::conflict(format!(
                    "pull request #{} is already {}",
                    number, pull.status
                )));
            }
        }

        let source = BranchName::try_parse(pull.source_branch.clone())?;
        let target = BranchName::try_parse(pull.target_branch.clone())?;
        let source_head = self.refs.read_head(&source)?.ok_or_else(|| {
            Error::conflict(format!("branch {} has no commits", source))
        })?;
        let target_head = self.refs.read_head(&target)?;

        let commit = merge::build_merge_commit(
            &self.database,
            strategy,
            &pull,
            author,
            target_head.as_ref(),
            &source_head,
        )?;
        let merge_oid = self.database.store(&commit)?;
        self.refs
            .advance_head(&target, target_head.as_ref(), &merge_oid)?;

        pull.status = PullStatus::Merged;
        pull.head_sha = source_head.to_string();
        pull.merge_commit_sha = Some(merge_oid.to_string());
        self.pulls.save(&pull)?;

        tracing::info!(
            repo = %self.meta.id(),
            pull = number,
            commit = %merge_oid.to_short_oid(),
            "merged pull request"
        );
        Ok(pull)
    }

    /// Close a pull request without merging
    pub fn close_pull_request(&self, number: u64) -> Result<PullRequest> {
        let mut pull = self.pulls.load(number)?;
        if !pull.is_open() {
            return Err(Error::conflict(format!(
                "pull request #{} is already {}",
                number, pull.status
            )));
        }

        pull.status = PullStatus::Closed;
        self.pulls.save(&pull)?;
        Ok(pull)
    }

    /// Promote a draft pull request to open
    pub fn mark_ready_for_review(&self, number: u64) -> Result<PullRequest> {
        let mut pull = self.pulls.load(number)?;
        if pull.status != PullStatus::Draft {
            return Err(Error::conflict(format!(
                "pull request #{} is not a draft",
                number
            )));
        }

        pull.status = PullStatus::Open;
        self.pulls.save(&pull)?;
        Ok(pull)
    }
}

fn validate_file_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::validation("file path cannot be empty"));
    }
    if path.starts_with('/') || path.ends_with('/') {
        return Err(Error::validation(format!(
            "file path {} cannot start or end with /",
            path
        )));
    }
    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(Error::validation(format!("invalid file path {}", path)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::repo::Visibility;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    fn author() -> Author {
        Author::new("alice".to_string())
    }

    fn init_repo(temp: &TempDir) -> Repository {
        let meta = RepoMeta::new("alice", "demo", None, Visibility::Public);
        Repository::init(&temp.path().join("alice").join("demo"), meta).unwrap()
    }

    fn main_branch() -> BranchName {
        BranchName::try_parse("main".to_string()).unwrap()
    }

    #[test]
    fn test_init_creates_protected_unborn_default_branch() {
        let temp = TempDir::new().unwrap();
        let repository = init_repo(&temp);

        let branches = repository.list_branches().unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].name.as_ref(), "main");
        assert!(branches[0].head.is_none());
        assert!(branches[0].protected);

        let page = repository.list_commits(None, 1, 10).unwrap();
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_put_get_delete_file_round_trip() {
        let temp = TempDir::new().unwrap();
        let repository = init_repo(&temp);
        let main = main_branch();

        repository
            .put_file(&main, "docs/guide.md", "hello", author(), "add guide")
            .unwrap();
        let blob = repository.get_file_content("main", "docs/guide.md").unwrap();
        assert_eq!(blob.content(), "hello");

        repository
            .put_file(&main, "docs/guide.md", "hello v2", author(), "update guide")
            .unwrap();
        let blob = repository.get_file_content("main", "docs/guide.md").unwrap();
        assert_eq!(blob.content(), "hello v2");

        repository
            .delete_file(&main, "docs/guide.md", author(), "drop guide")
            .unwrap();
        assert!(matches!(
            repository.get_file_content("main", "docs/guide.md"),
            Err(Error::NotFound(_))
        ));

        let page = repository.list_commits(Some("main"), 1, 10).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.entries[0].commit.message(), "drop guide");
    }

    #[test]
    fn test_delete_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let repository = init_repo(&temp);
        assert!(matches!(
            repository.delete_file(&main_branch(), "nope.txt", author(), "drop"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_empty_commit_message_is_rejected() {
        let temp = TempDir::new().unwrap();
        let repository = init_repo(&temp);
        assert!(matches!(
            repository.put_file(&main_branch(), "a.txt", "a", author(), "   "),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_branch_from_commit_hash_and_from_branch() {
        let temp = TempDir::new().unwrap();
        let repository = init_repo(&temp);
        let main = main_branch();

        let first = repository
            .put_file(&main, "a.txt", "a", author(), "first")
            .unwrap();
        repository
            .put_file(&main, "b.txt", "b", author(), "second")
            .unwrap();

        let from_commit = BranchName::try_parse("from-commit".to_string()).unwrap();
        repository
            .create_branch(&from_commit, Some(first.as_ref()))
            .unwrap();
        assert_eq!(
            repository.refs().read_head(&from_commit).unwrap(),
            Some(first)
        );

        let from_main = BranchName::try_parse("from-main".to_string()).unwrap();
        repository.create_branch(&from_main, Some("main")).unwrap();
        assert_eq!(
            repository.refs().read_head(&from_main).unwrap(),
            repository.refs().read_head(&main).unwrap()
        );
    }

    #[test]
    fn test_default_branch_cannot_be_deleted_and_rename_follows() {
        let temp = TempDir::new().unwrap();
        let mut repository = init_repo(&temp);

        assert!(matches!(
            repository.delete_branch(&main_branch()),
            Err(Error::Forbidden(_))
        ));

        let trunk = BranchName::try_parse("trunk".to_string()).unwrap();
        repository.rename_branch(&main_branch(), &trunk).unwrap();
        assert_eq!(repository.meta().default_branch, "trunk");
        assert!(repository.refs().is_protected(&trunk));
    }

    #[test]
    fn test_pull_request_lifecycle_with_merge() {
        let temp = TempDir::new().unwrap();
        let repository = init_repo(&temp);
        let main = main_branch();
        let feature = BranchName::try_parse("feature".to_string()).unwrap();

        repository
            .put_file(&main, "a.txt", "a", author(), "base")
            .unwrap();
        repository.create_branch(&feature, None).unwrap();
        repository
            .put_file(&feature, "b.txt", "b", author(), "feature work")
            .unwrap();

        let pull = repository
            .open_pull_request("bob", "add b", None, &feature, &main, vec![], false)
            .unwrap();
        assert_eq!(pull.number, 1);
        assert!(repository.pull_request_mergeable(1).unwrap());

        // a second open pull request for the same pair is refused
        assert!(matches!(
            repository.open_pull_request("bob", "again", None, &feature, &main, vec![], false),
            Err(Error::Conflict(_))
        ));

        let merged = repository
            .merge_pull_request(1, MergeStrategy::Merge, author())
            .unwrap();
        assert_eq!(merged.status, PullStatus::Merged);
        let merge_oid =
            ObjectId::try_parse(merged.merge_commit_sha.clone().unwrap()).unwrap();
        assert_eq!(
            repository.refs().read_head(&main).unwrap(),
            Some(merge_oid)
        );
        assert_eq!(
            repository
                .get_file_content("main", "b.txt")
                .unwrap()
                .content(),
            "b"
        );

        // double merge
        assert!(matches!(
            repository.merge_pull_request(1, MergeStrategy::Merge, author()),
            Err(Error::Conflict(_))
        ));
    }

    #[test]
    fn test_draft_pull_request_must_be_marked_ready() {
        let temp = TempDir::new().unwrap();
        let repository = init_repo(&temp);
        let main = main_branch();
        let feature = BranchName::try_parse("feature".to_string()).unwrap();

        repository
            .put_file(&main, "a.txt", "a", author(), "base")
            .unwrap();
        repository.create_branch(&feature, None).unwrap();
        repository
            .put_file(&feature, "b.txt", "b", author(), "work")
            .unwrap();

        let pull = repository
            .open_pull_request("bob", "wip", None, &feature, &main, vec![], true)
            .unwrap();
        assert_eq!(pull.status, PullStatus::Draft);
        assert!(matches!(
            repository.merge_pull_request(pull.number, MergeStrategy::Merge, author()),
            Err(Error::Validation(_))
        ));

        repository.mark_ready_for_review(pull.number).unwrap();
        repository
            .merge_pull_request(pull.number, MergeStrategy::Merge, author())
            .unwrap();
    }

    #[test]
    fn test_squash_merge_has_single_parent() {
        let temp = TempDir::new().unwrap();
        let repository = init_repo(&temp);
        let main = main_branch();
        let feature = BranchName::try_parse("feature".to_string()).unwrap();

        repository
            .put_file(&main, "a.txt", "a", author(), "base")
            .unwrap();
        let base_head = repository.refs().read_head(&main).unwrap().unwrap();
        repository.create_branch(&feature, None).unwrap();
        repository
            .put_file(&feature, "b.txt", "b", author(), "one")
            .unwrap();
        repository
            .put_file(&feature, "c.txt", "c", author(), "two")
            .unwrap();

        repository
            .open_pull_request("bob", "squashed", None, &feature, &main, vec![], false)
            .unwrap();
        let merged = repository
            .merge_pull_request(1, MergeStrategy::Squash, author())
            .unwrap();

        let merge_oid = ObjectId::try_parse(merged.merge_commit_sha.unwrap()).unwrap();
        let commit = repository.get_commit(&merge_oid).unwrap();
        assert_eq!(commit.parents(), std::slice::from_ref(&base_head));
        assert!(commit.message().contains("one\ntwo"));
    }

    #[test]
    fn test_file_history_filters_by_path() {
        let temp = TempDir::new().unwrap();
        let repository = init_repo(&temp);
        let main = main_branch();

        repository
            .put_file(&main, "a.txt", "a", author(), "touch a")
            .unwrap();
        repository
            .put_file(&main, "b.txt", "b", author(), "touch b")
            .unwrap();
        repository
            .put_file(&main, "a.txt", "a2", author(), "touch a again")
            .unwrap();

        let history = repository.file_history("main", "a.txt").unwrap();
        let messages: Vec<&str> = history
            .iter()
            .map(|entry| entry.commit.message())
            .collect();
        assert_eq!(messages, vec!["touch a again", "touch a"]);
    }

    #[test]
    fn test_pagination_windows_history() {
        let temp = TempDir::new().unwrap();
        let repository = init_repo(&temp);
        let main = main_branch();

        for n in 0..5 {
            repository
                .put_file(&main, "a.txt", &format!("v{}", n), author(), &format!("rev {}", n))
                .unwrap();
        }

        let page = repository.list_commits(Some("main"), 2, 2).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].commit.message(), "rev 2");

        let past_end = repository.list_commits(Some("main"), 9, 2).unwrap();
        assert!(past_end.entries.is_empty());
    }

    #[test]
    fn test_readme_detection() {
        let temp = TempDir::new().unwrap();
        let repository = init_repo(&temp);
        let main = main_branch();

        repository
            .put_file(&main, "readme.MD", "# hi", author(), "add readme")
            .unwrap();
        let (path, blob) = repository.readme("main").unwrap().unwrap();
        assert_eq!(path, "readme.MD");
        assert_eq!(blob.content(), "# hi");
    }

    #[test]
    fn test_invalid_file_paths_are_rejected() {
        let temp = TempDir::new().unwrap();
        let repository = init_repo(&temp);
        for path in ["", "/abs.txt", "dir/", "a//b.txt", "../up.txt", "a/./b"] {
            assert!(
                matches!(
                    repository.put_file(&main_branch(), path, "x", author(), "msg"),
                    Err(Error::Validation(_))
                ),
                "path {:?} should be rejected",
                path
            );
        }
    }
}
