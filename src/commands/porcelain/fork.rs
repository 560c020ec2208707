use crate::areas::platform::Platform;
use crate::artifacts::auth::AccessContext;
use crate::artifacts::core::Result;
use crate::artifacts::repo::RepoId;
use colored::Colorize;
use std::io::Write;

impl Platform {
    pub fn fork_create(&mut self, ctx: &AccessContext, origin: &RepoId) -> Result<()> {
        let meta = self.fork(ctx, origin)?;
        writeln!(
            self.writer(),
            "Forked {} as {}",
            origin,
            meta.id().to_string().bold()
        )?;
        Ok(())
    }

    pub fn fork_delete(&mut self, ctx: &AccessContext, origin: &RepoId) -> Result<()> {
        self.unfork(ctx, origin)?;
        writeln!(self.writer(), "Deleted fork of {}", origin)?;
        Ok(())
    }

    pub fn fork_list(&mut self, ctx: &AccessContext, origin: &RepoId) -> Result<()> {
        let forks = self.list_forks(ctx, origin)?;
        for fork in &forks {
            writeln!(self.writer(), "{}", fork.id())?;
        }
        Ok(())
    }
}
