//! Merge engine
//!
//! Integrates a pull request's source branch into its target branch by
//! producing one new commit on the target. There is no three-way content
//! merge: the integrating commit's change set rewrites the target so its
//! resulting file state equals the source head's state, and mergeability is
//! the weak heuristic "the two heads differ".
//!
//! Strategies only vary the commit's parents and message:
//!
//! - `merge` and `rebase`: both heads as parents, target side first
//! - `squash`: the target head as sole parent, message body concatenating
//!   the source-only commit messages in chronological order

pub mod pull_request;

use crate::areas::database::Database;
use crate::artifacts::core::{Error, Result};
use crate::artifacts::diff;
use crate::artifacts::merge::pull_request::{MergeStrategy, PullRequest};
use crate::artifacts::objects::change::{ChangeAction, FileChange};
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;

/// Whether a pull request's branches can be integrated
///
/// Heads pointing at the same commit have nothing to integrate. This is a
/// deliberately weak heuristic; content conflicts are not detected.
pub fn mergeable(target_head: Option<&ObjectId>, source_head: Option<&ObjectId>) -> bool {
    source_head.is_some() && target_head != source_head
}

/// Build the integrating commit for a pull request
///
/// The commit is not stored and no branch moves; the caller persists it and
/// compare-and-swaps the target head.
pub fn build_merge_commit(
    database: &Database,
    strategy: MergeStrategy,
    pull: &PullRequest,
    author: Author,
    target_head: Option<&ObjectId>,
    source_head: &ObjectId,
) -> Result<Commit> {
    if !mergeable(target_head, Some(source_head)) {
        return Err(Error::conflict(format!(
            "pull request #{} has nothing to merge",
            pull.number
        )));
    }

    let changes = integration_changes(database, target_head, source_head)?;
    let headline = format!("Merged PR #{}: {}", pull.number, pull.title);

    let (parents, message) = match strategy {
        MergeStrategy::Merge | MergeStrategy::Rebase => {
            let mut parents = Vec::new();
            parents.extend(target_head.cloned());
            parents.push(source_head.clone());
            (parents, headline)
        }
        MergeStrategy::Squash => {
            let comparison = diff::compare(database, target_head, Some(source_head))?;
            let mut messages: Vec<String> = comparison
                .ahead
                .iter()
                .map(|entry| entry.commit.message().to_string())
                .collect();
            messages.reverse();

            let message = format!("{}\n\n{}", headline, messages.join("\n"));
            (target_head.cloned().into_iter().collect(), message)
        }
    };

    Ok(Commit::new(parents, author, message, changes))
}

/// Change set turning the target head's file state into the source head's
fn integration_changes(
    database: &Database,
    target_head: Option<&ObjectId>,
    source_head: &ObjectId,
) -> Result<Vec<FileChange>> {
    let entries = diff::diff_commits(
        database,
        target_head,
        Some(source_head),
        diff::DiffFilter::all(),
    )?;

    entries
        .into_iter()
        .map(|entry| {
            Ok(match (entry.action, entry.new_blob) {
                (ChangeAction::Deleted, _) => FileChange::deleted(entry.path),
                (ChangeAction::Added, Some(blob)) => FileChange::added(entry.path, blob),
                (ChangeAction::Modified, Some(blob)) => FileChange::modified(entry.path, blob),
                (action, None) => {
                    return Err(Error::Storage(anyhow::anyhow!(
                        "diff entry {} {} lost its blob digest",
                        action,
                        entry.path
                    )));
                }
            })
        })
        .collect()
}
