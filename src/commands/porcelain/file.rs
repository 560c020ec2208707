use crate::areas::platform::Platform;
use crate::artifacts::auth::AccessContext;
use crate::artifacts::core::Result;
use crate::artifacts::objects::commit::Author;
use crate::artifacts::repo::RepoId;
use crate::artifacts::tree::TreeNode;
use colored::Colorize;
use std::io::Write;

impl Platform {
    /// Create or update one file on a branch
    pub fn file_put(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        ctx.require_write(repository.meta())?;

        let branch = super::parse_branch(branch)?;
        let author = Author::new(ctx.user().to_string());
        let commit_oid = repository.put_file(&branch, path, content, author, message)?;
        writeln!(
            self.writer(),
            "[{} {}] {}",
            branch,
            commit_oid.to_short_oid(),
            message
        )?;
        Ok(())
    }

    pub fn file_delete(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        branch: &str,
        path: &str,
        message: &str,
    ) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        ctx.require_write(repository.meta())?;

        let branch = super::parse_branch(branch)?;
        let author = Author::new(ctx.user().to_string());
        let commit_oid = repository.delete_file(&branch, path, author, message)?;
        writeln!(
            self.writer(),
            "[{} {}] {}",
            branch,
            commit_oid.to_short_oid(),
            message
        )?;
        Ok(())
    }

    /// Print one file's content at a revision
    pub fn file_cat(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        reference: &str,
        path: &str,
    ) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        let blob = repository.get_file_content(reference, path)?;
        write!(self.writer(), "{}", blob.content())?;
        Ok(())
    }

    /// Print a blob's content by digest, independent of any commit or path
    pub fn blob_cat(&mut self, ctx: &AccessContext, id: &RepoId, digest: &str) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        let digest = super::parse_digest(digest)?;
        let blob = repository.database().load_blob(&digest)?;
        write!(self.writer(), "{}", blob.content())?;
        Ok(())
    }

    /// Print the nested tree at a revision, directories before files
    pub fn file_tree(&mut self, ctx: &AccessContext, id: &RepoId, reference: &str) -> Result<()> {
        let repository = self.get_repository(ctx, id)?;
        let tree = repository.tree_at(reference)?;
        let rendered = render_tree(&tree, 0);
        write!(self.writer(), "{}", rendered)?;
        Ok(())
    }
}

fn render_tree(node: &TreeNode, depth: usize) -> String {
    let mut out = String::new();
    for child in node.children() {
        let indent = "  ".repeat(depth);
        if child.is_dir() {
            out.push_str(&format!("{}{}/\n", indent, child.name().blue().bold()));
            out.push_str(&render_tree(child, depth + 1));
        } else {
            out.push_str(&format!("{}{}\n", indent, child.name()));
        }
    }
    out
}
