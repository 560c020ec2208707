use crate::areas::platform::Platform;
use crate::artifacts::auth::AccessContext;
use crate::artifacts::core::Result;
use crate::artifacts::diff::{DiffEntry, DiffFilter};
use crate::artifacts::objects::change::ChangeAction;
use crate::artifacts::repo::RepoId;
use colored::Colorize;
use std::io::Write;

impl Platform {
    /// Print the file-level diff from one revision to another
    pub fn diff(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        base: &str,
        other: &str,
        filter: DiffFilter,
    ) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        let entries = repository.diff(base, other, filter)?;
        for entry in &entries {
            self.display_diff_entry(entry)?;
        }
        Ok(())
    }

    /// Print ahead/behind commits and the file diff between two revisions
    pub fn compare(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        base: &str,
        other: &str,
    ) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        let comparison = repository.compare(base, other)?;

        if comparison.is_identical() {
            writeln!(self.writer(), "{} and {} are identical", base, other)?;
            return Ok(());
        }

        writeln!(
            self.writer(),
            "{} is {} ahead, {} behind {}",
            other.bold(),
            comparison.ahead.len(),
            comparison.behind.len(),
            base.bold()
        )?;
        for entry in &comparison.ahead {
            writeln!(
                self.writer(),
                "  {} {}",
                entry.oid.to_short_oid().yellow(),
                entry.commit.short_message()
            )?;
        }
        writeln!(self.writer())?;
        for entry in &comparison.diff {
            self.display_diff_entry(entry)?;
        }
        Ok(())
    }

    fn display_diff_entry(&mut self, entry: &DiffEntry) -> Result<()> {
        let line = match entry.action {
            ChangeAction::Added => format!("A  {}", entry.path).green(),
            ChangeAction::Modified => format!("M  {}", entry.path).yellow(),
            ChangeAction::Deleted => format!("D  {}", entry.path).red(),
        };
        writeln!(self.writer(), "{}", line)?;
        Ok(())
    }
}
