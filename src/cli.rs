use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pgit")]
#[command(about = "Git for managed projects: sync, branches, history and resource diffs")]
#[command(version)]
pub struct Cli {
    /// Project to operate on
    #[arg(long, short, env = "PGIT_PROJECT", global = true)]
    pub project: Option<String>,

    /// Acting user, defaults to the login name
    #[arg(long, short, env = "PGIT_USER", global = true)]
    pub user: Option<String>,

    /// Config file, overrides $PROJECT_GIT_CONFIG
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a project backed by a remote repository
    Init {
        /// Remote URI (https://... or git@host:owner/repo.git)
        uri: String,
        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Register a project without a remote
    InitLocal {
        #[arg(long)]
        email: String,
    },
    /// Show uncommitted resources
    Status {
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Commit resources, all uncommitted ones when none are given
    Commit {
        #[arg(short, long)]
        message: String,
        #[arg(long)]
        amend: bool,
        paths: Vec<String>,
    },
    /// Fetch and merge the current branch from the default remote
    Pull {
        #[arg(long)]
        import_tags: bool,
        #[arg(long)]
        import_theme: bool,
        #[arg(long)]
        import_images: bool,
    },
    /// Push to a remote
    Push {
        /// Remote name, defaults to the configured default remote
        remote: Option<String>,
        /// Push every local branch
        #[arg(long)]
        all: bool,
        #[arg(long)]
        tags: bool,
        #[arg(long, short)]
        force: bool,
    },
    /// List, create, check out or delete branches
    Branch {
        #[command(subcommand)]
        action: Option<BranchAction>,
    },
    /// Show commit history
    History {
        /// Draw the lane graph
        #[arg(long)]
        graph: bool,
        #[arg(long, default_value_t = 0)]
        skip: usize,
        /// Number of commits, defaults to the configured page size
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Show the files of a commit, or one file's change in it
    Show {
        hash: String,
        path: Option<String>,
    },
    /// Diff a resource between HEAD and the working tree
    Diff { path: String },
    /// Discard uncommitted changes to resources
    Discard {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Manage remotes
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
    /// Update the acting user's credentials for the project
    Credentials {
        #[command(flatten)]
        credentials: CredentialArgs,
    },
}

#[derive(Subcommand)]
pub enum BranchAction {
    /// List local and remote branches
    List,
    Create {
        name: String,
        /// Branch or commit to start from, defaults to HEAD
        start_point: Option<String>,
    },
    Checkout { name: String },
    Delete { name: String },
}

#[derive(Subcommand)]
pub enum RemoteAction {
    List,
    Add {
        name: String,
        url: String,
        #[command(flatten)]
        credentials: RemoteCredentialArgs,
    },
    Remove { name: String },
    SetUrl {
        name: String,
        url: String,
        #[command(flatten)]
        credentials: RemoteCredentialArgs,
    },
}

#[derive(clap::Args)]
pub struct CredentialArgs {
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub git_username: String,
    #[arg(long, env = "PGIT_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,
    /// Private key file for ssh remotes
    #[arg(long)]
    pub ssh_key: Option<PathBuf>,
}

/// Credentials used only for one remote. Nothing is stored when
/// `--git-username` is absent.
#[derive(clap::Args)]
pub struct RemoteCredentialArgs {
    #[arg(long)]
    pub git_username: Option<String>,
    #[arg(long, env = "PGIT_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub ssh_key: Option<PathBuf>,
}
