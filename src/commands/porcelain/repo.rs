use crate::areas::platform::Platform;
use crate::artifacts::auth::AccessContext;
use crate::artifacts::core::Result;
use crate::artifacts::repo::{Permission, RepoId, Visibility};
use colored::Colorize;
use std::io::Write;

impl Platform {
    pub fn repo_create(
        &mut self,
        ctx: &AccessContext,
        name: &str,
        description: Option<String>,
        visibility: Visibility,
    ) -> Result<()> {
        let repository = self.create_repository(ctx, name, description, visibility)?;
        let id = repository.meta().id();
        writeln!(self.writer(), "Created repository {}", id.to_string().bold())?;
        Ok(())
    }

    pub fn repo_show(&mut self, ctx: &AccessContext, id: &RepoId) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        let meta = repository.meta().clone();

        let visibility = match meta.visibility {
            Visibility::Public => "public".green(),
            Visibility::Private => "private".yellow(),
        };
        writeln!(self.writer(), "{} ({})", meta.id().to_string().bold(), visibility)?;
        if let Some(description) = &meta.description {
            writeln!(self.writer(), "  {}", description)?;
        }
        if let Some(origin) = &meta.fork_from {
            writeln!(self.writer(), "  forked from {}", origin)?;
        }
        writeln!(self.writer(), "  default branch: {}", meta.default_branch)?;
        for collaborator in &meta.collaborators {
            writeln!(
                self.writer(),
                "  collaborator: {} ({:?})",
                collaborator.user,
                collaborator.permission
            )?;
        }

        let readme = repository.readme(&meta.default_branch).unwrap_or(None);
        if let Some((path, blob)) = readme {
            writeln!(self.writer(), "\n{}", path.underline())?;
            writeln!(self.writer(), "{}", blob.content())?;
        }

        Ok(())
    }

    pub fn repo_list(&mut self, ctx: &AccessContext, owner: &str) -> Result<()> {
        let metas = self.list_repositories(ctx, owner)?;
        for meta in metas {
            let marker = if meta.is_fork { " (fork)" } else { "" };
            writeln!(self.writer(), "{}{}", meta.id(), marker)?;
        }
        Ok(())
    }

    pub fn repo_delete(&mut self, ctx: &AccessContext, id: &RepoId) -> Result<()> {
        self.delete_repository(ctx, id)?;
        writeln!(self.writer(), "Deleted repository {}", id)?;
        Ok(())
    }

    pub fn collaborator_add(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        user: &str,
        permission: Permission,
    ) -> Result<()> {
        self.add_collaborator(ctx, id, user, permission)?;
        writeln!(self.writer(), "Added {} to {}", user, id)?;
        Ok(())
    }

    pub fn collaborator_remove(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        user: &str,
    ) -> Result<()> {
        self.remove_collaborator(ctx, id, user)?;
        writeln!(self.writer(), "Removed {} from {}", user, id)?;
        Ok(())
    }
}
