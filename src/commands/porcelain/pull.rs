use crate::areas::platform::Platform;
use crate::artifacts::auth::AccessContext;
use crate::artifacts::core::Result;
use crate::artifacts::merge::pull_request::{MergeStrategy, PullRequest, PullStatus};
use crate::artifacts::objects::commit::Author;
use crate::artifacts::repo::RepoId;
use colored::Colorize;
use std::io::Write;

impl Platform {
    #[allow(clippy::too_many_arguments)]
    pub fn pull_open(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        title: &str,
        description: Option<String>,
        source: &str,
        target: &str,
        reviewers: Vec<String>,
        draft: bool,
    ) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        ctx.require_write(repository.meta())?;

        let source = super::parse_branch(source)?;
        let target = super::parse_branch(target)?;
        let pull = repository.open_pull_request(
            ctx.user(),
            title,
            description,
            &source,
            &target,
            reviewers,
            draft,
        )?;
        writeln!(
            self.writer(),
            "Opened pull request {}: {}",
            format!("#{}", pull.number).bold(),
            pull.title
        )?;
        Ok(())
    }

    pub fn pull_show(&mut self, ctx: &AccessContext, id: &RepoId, number: u64) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        let pull = repository.get_pull_request(number)?;
        let mergeable = repository.pull_request_mergeable(number)?;
        self.display_pull(&pull)?;
        if pull.is_open() {
            let verdict = if mergeable {
                "mergeable".green()
            } else {
                "nothing to merge".yellow()
            };
            writeln!(self.writer(), "  {}", verdict)?;
        }
        Ok(())
    }

    pub fn pull_list(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        status: Option<PullStatus>,
    ) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        let pulls = repository.list_pull_requests(status)?;
        for pull in &pulls {
            writeln!(
                self.writer(),
                "#{} [{}] {} ({} -> {})",
                pull.number,
                pull.status,
                pull.title,
                pull.source_branch,
                pull.target_branch
            )?;
        }
        Ok(())
    }

    pub fn pull_merge(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        number: u64,
        strategy: MergeStrategy,
    ) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        ctx.require_write(repository.meta())?;

        let author = Author::new(ctx.user().to_string());
        let pull = repository.merge_pull_request(number, strategy, author)?;
        let merge_sha = pull.merge_commit_sha.as_deref().unwrap_or_default();
        writeln!(
            self.writer(),
            "Merged pull request #{} into {} ({})",
            pull.number,
            pull.target_branch,
            &merge_sha[..merge_sha.len().min(7)]
        )?;
        Ok(())
    }

    pub fn pull_close(&mut self, ctx: &AccessContext, id: &RepoId, number: u64) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        ctx.require_write(repository.meta())?;

        let pull = repository.close_pull_request(number)?;
        writeln!(self.writer(), "Closed pull request #{}", pull.number)?;
        Ok(())
    }

    pub fn pull_ready(&mut self, ctx: &AccessContext, id: &RepoId, number: u64) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        ctx.require_write(repository.meta())?;

        let pull = repository.mark_ready_for_review(number)?;
        writeln!(
            self.writer(),
            "Pull request #{} is ready for review",
            pull.number
        )?;
        Ok(())
    }

    fn display_pull(&mut self, pull: &PullRequest) -> Result<()> {
        writeln!(
            self.writer(),
            "{} {} [{}]",
            format!("#{}", pull.number).bold(),
            pull.title,
            pull.status
        )?;
        writeln!(
            self.writer(),
            "  {} wants to merge {} into {}",
            pull.author,
            pull.source_branch,
            pull.target_branch
        )?;
        if let Some(description) = &pull.description {
            writeln!(self.writer(), "  {}", description)?;
        }
        if !pull.reviewers.is_empty() {
            writeln!(self.writer(), "  reviewers: {}", pull.reviewers.join(", "))?;
        }
        if let Some(merge_sha) = &pull.merge_commit_sha {
            writeln!(self.writer(), "  merged as {}", merge_sha)?;
        }
        Ok(())
    }
}
