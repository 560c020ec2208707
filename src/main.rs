use bithub::areas::platform::Platform;
use bithub::artifacts::auth::{AccessContext, Role};
use bithub::artifacts::core::Error;
use bithub::artifacts::diff::DiffFilter;
use bithub::artifacts::merge::pull_request::{MergeStrategy, PullStatus};
use bithub::artifacts::repo::{Permission, RepoId, Visibility};
use bithub::commands::porcelain::log::LogOptions;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bithub",
    version = "0.1.0",
    about = "A simple hosted source-control platform",
    long_about = "This is a simple hosted source-control platform, written in Rust. \
    It stores repositories, branches, commits, pull requests and forks under a \
    local data directory, and is a learning project rather than a production forge.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "BITHUB_ROOT",
        default_value = "data",
        help = "Platform data directory"
    )]
    root: PathBuf,
    #[arg(
        long,
        global = true,
        env = "BITHUB_USER",
        default_value = "anonymous",
        help = "Acting username"
    )]
    user: String,
    #[arg(long, global = true, help = "Act with the platform administrator role")]
    admin: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PermissionArg {
    Read,
    Write,
    Admin,
}

impl From<PermissionArg> for Permission {
    fn from(value: PermissionArg) -> Self {
        match value {
            PermissionArg::Read => Permission::Read,
            PermissionArg::Write => Permission::Write,
            PermissionArg::Admin => Permission::Admin,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Merge,
    Squash,
    Rebase,
}

impl From<StrategyArg> for MergeStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Merge => MergeStrategy::Merge,
            StrategyArg::Squash => MergeStrategy::Squash,
            StrategyArg::Rebase => MergeStrategy::Rebase,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Open,
    Draft,
    Closed,
    Merged,
}

impl From<StatusArg> for PullStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Open => PullStatus::Open,
            StatusArg::Draft => PullStatus::Draft,
            StatusArg::Closed => PullStatus::Closed,
            StatusArg::Merged => PullStatus::Merged,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand, about = "Manage repositories")]
    Repo(RepoCommands),
    #[command(subcommand, about = "Manage branches")]
    Branch(BranchCommands),
    #[command(about = "Create or update a file on a branch")]
    Put {
        repo: String,
        branch: String,
        path: String,
        #[arg(long, help = "New file content")]
        content: String,
        #[arg(short, long, help = "Commit message")]
        message: String,
    },
    #[command(about = "Delete a file on a branch")]
    Rm {
        repo: String,
        branch: String,
        path: String,
        #[arg(short, long, help = "Commit message")]
        message: String,
    },
    #[command(about = "Print a file's content at a revision")]
    Cat {
        repo: String,
        reference: String,
        path: String,
    },
    #[command(about = "Print a blob's content by digest")]
    CatBlob { repo: String, digest: String },
    #[command(about = "Print the file tree at a revision")]
    Tree { repo: String, reference: String },
    #[command(about = "Show commit history")]
    Log {
        repo: String,
        #[arg(help = "Branch name or commit id (default branch when omitted)")]
        reference: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        per_page: usize,
        #[arg(long, help = "One line per commit")]
        oneline: bool,
        #[arg(long, help = "Only commits touching this path")]
        path: Option<String>,
    },
    #[command(about = "Show the file-level diff between two revisions")]
    Diff {
        repo: String,
        base: String,
        other: String,
        #[arg(long, help = "Only additions")]
        added: bool,
        #[arg(long, help = "Only modifications")]
        modified: bool,
        #[arg(long, help = "Only deletions")]
        deleted: bool,
    },
    #[command(about = "Compare two revisions (ahead/behind and file diff)")]
    Compare {
        repo: String,
        base: String,
        other: String,
    },
    #[command(subcommand, about = "Manage pull requests")]
    Pr(PrCommands),
    #[command(about = "Fork a repository under your namespace")]
    Fork { repo: String },
    #[command(about = "Delete your fork of a repository")]
    Unfork { repo: String },
    #[command(about = "List forks of a repository")]
    Forks { repo: String },
    #[command(about = "Export the snapshot at a revision as a tarball")]
    Archive {
        repo: String,
        reference: String,
        #[arg(long, default_value = ".", help = "Destination directory")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum RepoCommands {
    #[command(about = "Create a repository")]
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, help = "Create the repository as private")]
        private: bool,
    },
    #[command(about = "Show a repository's metadata and README")]
    Show { repo: String },
    #[command(about = "List a user's repositories")]
    List { owner: String },
    #[command(about = "Delete a repository")]
    Delete { repo: String },
    #[command(about = "Add or update a collaborator")]
    AddCollaborator {
        repo: String,
        collaborator: String,
        #[arg(long, value_enum, default_value_t = PermissionArg::Read)]
        permission: PermissionArg,
    },
    #[command(about = "Remove a collaborator")]
    RemoveCollaborator { repo: String, collaborator: String },
}

#[derive(Subcommand)]
enum BranchCommands {
    #[command(about = "Create a branch from a branch or commit id")]
    Create {
        repo: String,
        name: String,
        #[arg(long, help = "Source branch or commit id (default branch head when omitted)")]
        from: Option<String>,
    },
    #[command(about = "List branches with heads and protection")]
    List { repo: String },
    #[command(about = "Delete a branch")]
    Delete { repo: String, name: String },
    #[command(about = "Rename a branch")]
    Rename {
        repo: String,
        old_name: String,
        new_name: String,
    },
    #[command(about = "Protect a branch against deletion")]
    Protect { repo: String, name: String },
    #[command(about = "Remove a branch's protection")]
    Unprotect { repo: String, name: String },
}

#[derive(Subcommand)]
enum PrCommands {
    #[command(about = "Open a pull request")]
    Open {
        repo: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        #[arg(long, help = "Reviewer username (repeatable)")]
        reviewer: Vec<String>,
        #[arg(long, help = "Open as draft")]
        draft: bool,
    },
    #[command(about = "List pull requests")]
    List {
        repo: String,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    #[command(about = "Show one pull request")]
    Show { repo: String, number: u64 },
    #[command(about = "Merge an open pull request")]
    Merge {
        repo: String,
        number: u64,
        #[arg(long, value_enum, default_value_t = StrategyArg::Merge)]
        strategy: StrategyArg,
    },
    #[command(about = "Close a pull request without merging")]
    Close { repo: String, number: u64 },
    #[command(about = "Mark a draft pull request ready for review")]
    Ready { repo: String, number: u64 },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("{} {}", format!("error[{}]:", error.kind()).red().bold(), error);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> bithub::artifacts::core::Result<()> {
    let role = if cli.admin { Role::Admin } else { Role::User };
    let ctx = AccessContext::new(cli.user.clone(), role);
    let mut platform = Platform::new(&cli.root)?;

    match cli.command {
        Commands::Repo(command) => match command {
            RepoCommands::Create {
                name,
                description,
                private,
            } => {
                let visibility = if private {
                    Visibility::Private
                } else {
                    Visibility::Public
                };
                platform.repo_create(&ctx, &name, description, visibility)
            }
            RepoCommands::Show { repo } => platform.repo_show(&ctx, &parse_repo(&repo)?),
            RepoCommands::List { owner } => platform.repo_list(&ctx, &owner),
            RepoCommands::Delete { repo } => platform.repo_delete(&ctx, &parse_repo(&repo)?),
            RepoCommands::AddCollaborator {
                repo,
                collaborator,
                permission,
            } => platform.collaborator_add(
                &ctx,
                &parse_repo(&repo)?,
                &collaborator,
                permission.into(),
            ),
            RepoCommands::RemoveCollaborator { repo, collaborator } => {
                platform.collaborator_remove(&ctx, &parse_repo(&repo)?, &collaborator)
            }
        },
        Commands::Branch(command) => match command {
            BranchCommands::Create { repo, name, from } => {
                platform.branch_create(&ctx, &parse_repo(&repo)?, &name, from.as_deref())
            }
            BranchCommands::List { repo } => platform.branch_list(&ctx, &parse_repo(&repo)?),
            BranchCommands::Delete { repo, name } => {
                platform.branch_delete(&ctx, &parse_repo(&repo)?, &name)
            }
            BranchCommands::Rename {
                repo,
                old_name,
                new_name,
            } => platform.branch_rename(&ctx, &parse_repo(&repo)?, &old_name, &new_name),
            BranchCommands::Protect { repo, name } => {
                platform.branch_protect(&ctx, &parse_repo(&repo)?, &name, true)
            }
            BranchCommands::Unprotect { repo, name } => {
                platform.branch_protect(&ctx, &parse_repo(&repo)?, &name, false)
            }
        },
        Commands::Put {
            repo,
            branch,
            path,
            content,
            message,
        } => platform.file_put(&ctx, &parse_repo(&repo)?, &branch, &path, &content, &message),
        Commands::Rm {
            repo,
            branch,
            path,
            message,
        } => platform.file_delete(&ctx, &parse_repo(&repo)?, &branch, &path, &message),
        Commands::Cat {
            repo,
            reference,
            path,
        } => platform.file_cat(&ctx, &parse_repo(&repo)?, &reference, &path),
        Commands::CatBlob { repo, digest } => {
            platform.blob_cat(&ctx, &parse_repo(&repo)?, &digest)
        }
        Commands::Tree { repo, reference } => {
            platform.file_tree(&ctx, &parse_repo(&repo)?, &reference)
        }
        Commands::Log {
            repo,
            reference,
            page,
            per_page,
            oneline,
            path,
        } => match path {
            Some(path) => {
                platform.file_log(&ctx, &parse_repo(&repo)?, reference.as_deref(), &path)
            }
            None => platform.log(
                &ctx,
                &parse_repo(&repo)?,
                &LogOptions {
                    reference,
                    page,
                    per_page,
                    oneline,
                },
            ),
        },
        Commands::Diff {
            repo,
            base,
            other,
            added,
            modified,
            deleted,
        } => {
            let mut filter = DiffFilter::empty();
            if added {
                filter |= DiffFilter::ADDED;
            }
            if modified {
                filter |= DiffFilter::MODIFIED;
            }
            if deleted {
                filter |= DiffFilter::DELETED;
            }
            if filter.is_empty() {
                filter = DiffFilter::all();
            }
            platform.diff(&ctx, &parse_repo(&repo)?, &base, &other, filter)
        }
        Commands::Compare { repo, base, other } => {
            platform.compare(&ctx, &parse_repo(&repo)?, &base, &other)
        }
        Commands::Pr(command) => match command {
            PrCommands::Open {
                repo,
                title,
                description,
                source,
                target,
                reviewer,
                draft,
            } => platform.pull_open(
                &ctx,
                &parse_repo(&repo)?,
                &title,
                description,
                &source,
                &target,
                reviewer,
                draft,
            ),
            PrCommands::List { repo, status } => {
                platform.pull_list(&ctx, &parse_repo(&repo)?, status.map(Into::into))
            }
            PrCommands::Show { repo, number } => {
                platform.pull_show(&ctx, &parse_repo(&repo)?, number)
            }
            PrCommands::Merge {
                repo,
                number,
                strategy,
            } => platform.pull_merge(&ctx, &parse_repo(&repo)?, number, strategy.into()),
            PrCommands::Close { repo, number } => {
                platform.pull_close(&ctx, &parse_repo(&repo)?, number)
            }
            PrCommands::Ready { repo, number } => {
                platform.pull_ready(&ctx, &parse_repo(&repo)?, number)
            }
        },
        Commands::Fork { repo } => platform.fork_create(&ctx, &parse_repo(&repo)?),
        Commands::Unfork { repo } => platform.fork_delete(&ctx, &parse_repo(&repo)?),
        Commands::Forks { repo } => platform.fork_list(&ctx, &parse_repo(&repo)?),
        Commands::Archive {
            repo,
            reference,
            out,
        } => platform.archive(&ctx, &parse_repo(&repo)?, &reference, &out),
    }
}

fn parse_repo(value: &str) -> Result<RepoId, Error> {
    RepoId::try_parse(value).map_err(|e| Error::validation(e.to_string()))
}
