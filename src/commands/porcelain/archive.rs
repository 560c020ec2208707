use crate::areas::platform::Platform;
use crate::artifacts::auth::AccessContext;
use crate::artifacts::core::Result;
use crate::artifacts::repo::RepoId;
use std::io::Write;
use std::path::Path;

impl Platform {
    /// Export the snapshot at a revision as a tarball
    pub fn archive(
        &mut self,
        ctx: &AccessContext,
        id: &RepoId,
        reference: &str,
        dest_dir: &Path,
    ) -> Result<()> {
        let archive_path = self.archive_repository(ctx, id, reference, dest_dir)?;
        writeln!(self.writer(), "Wrote {}", archive_path.display())?;
        Ok(())
    }
}
