use crate::areas::platform::Platform;
use crate::artifacts::auth::AccessContext;
use crate::artifacts::core::Result;
use crate::artifacts::repo::RepoId;
use colored::Colorize;
use std::io::Write;

impl Platform {
    pub fn branch_create(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        name: &str,
        from: Option<&str>,
    ) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        ctx.require_write(repository.meta())?;

        let name = super::parse_branch(name)?;
        repository.create_branch(&name, from)?;
        writeln!(self.writer(), "Created branch {}", name)?;
        Ok(())
    }

    pub fn branch_delete(&mut self, ctx: &AccessContext, id: &RepoId, name: &str) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        ctx.require_write(repository.meta())?;

        let name = super::parse_branch(name)?;
        repository.delete_branch(&name)?;
        writeln!(self.writer(), "Deleted branch {}", name)?;
        Ok(())
    }

    pub fn branch_rename(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        old_name: &str,
        new_name: &str,
    ) -> Result<()> {
        let mut repository = self.get_repository(ctx, id)?;
        ctx.require_write(repository.meta())?;

        let old_name = super::parse_branch(old_name)?;
        let new_name = super::parse_branch(new_name)?;
        repository.rename_branch(&old_name, &new_name)?;
        writeln!(self.writer(), "Renamed branch {} to {}", old_name, new_name)?;
        Ok(())
    }

    pub fn branch_protect(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        name: &str,
        protected: bool,
    ) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        ctx.require_admin(repository.meta())?;

        let name = super::parse_branch(name)?;
        repository.set_branch_protection(&name, protected)?;
        let state = if protected { "Protected" } else { "Unprotected" };
        writeln!(self.writer(), "{} branch {}", state, name)?;
        Ok(())
    }

    pub fn branch_list(&mut self, ctx: &AccessContext, id: &RepoId) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        let default_branch = repository.meta().default_branch.clone();
        let branches = repository.list_branches()?;

        for branch in branches {
            let head = match &branch.head {
                Some(oid) => oid.to_short_oid(),
                None => "unborn".to_string(),
            };
            let mut line = format!("{} {}", head, branch.name);
            if branch.name.as_ref() == default_branch {
                line = format!("{} {}", line, "(default)".green());
            }
            if branch.protected {
                line = format!("{} {}", line, "(protected)".yellow());
            }
            writeln!(self.writer(), "{}", line)?;
        }
        Ok(())
    }
}
