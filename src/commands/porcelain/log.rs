use crate::areas::platform::Platform;
use crate::artifacts::auth::AccessContext;
use crate::artifacts::core::Result;
use crate::artifacts::diff::CommitEntry;
use crate::artifacts::repo::RepoId;
use colored::Colorize;
use std::io::Write;

#[derive(Debug, Clone)]
pub struct LogOptions {
    pub reference: Option<String>,
    pub page: usize,
    pub per_page: usize,
    pub oneline: bool,
}

impl Platform {
    /// Print a page of a revision's history, newest first
    pub fn log(&mut self, ctx: &AccessContext, id: &RepoId, opts: &LogOptions) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        let page = repository.list_commits(opts.reference.as_deref(), opts.page, opts.per_page)?;

        for entry in &page.entries {
            self.display_commit(entry, opts.oneline)?;
        }
        writeln!(
            self.writer(),
            "page {} of {} commit(s)",
            page.page,
            page.total
        )?;
        Ok(())
    }

    /// Print the commits of a revision's history that touched a path
    pub fn file_log(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        reference: Option<&str>,
        path: &str,
    ) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        let reference = reference
            .map(str::to_string)
            .unwrap_or_else(|| repository.meta().default_branch.clone());
        let history = repository.file_history(&reference, path)?;
        for entry in &history {
            self.display_commit(entry, true)?;
        }
        Ok(())
    }

    fn display_commit(&mut self, entry: &CommitEntry, oneline: bool) -> Result<()> {
        if oneline {
            writeln!(
                self.writer(),
                "{} {}",
                entry.oid.to_short_oid().yellow(),
                entry.commit.short_message()
            )?;
            return Ok(());
        }

        writeln!(self.writer(), "{}", format!("commit {}", entry.oid).yellow())?;
        if entry.commit.parents().len() > 1 {
            let parents: Vec<String> = entry
                .commit
                .parents()
                .iter()
                .map(|p| p.to_short_oid())
                .collect();
            writeln!(self.writer(), "Merge: {}", parents.join(" "))?;
        }
        writeln!(self.writer(), "Author: {}", entry.commit.author().name())?;
        writeln!(
            self.writer(),
            "Date:   {}",
            entry.commit.author().readable_timestamp()
        )?;
        writeln!(self.writer())?;
        for line in entry.commit.message().lines() {
            writeln!(self.writer(), "    {}", line)?;
        }
        writeln!(self.writer())?;
        Ok(())
    }
}
