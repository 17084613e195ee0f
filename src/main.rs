mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use console::style;
use project_git::{Config, Workspace};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{} {:#}", style("✗").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let workspace = Workspace::open(config);

    let project = cli
        .project
        .ok_or_else(|| anyhow::anyhow!("no project given; pass --project or set PGIT_PROJECT"))?;
    let user = cli.user.unwrap_or_else(commands::default_user);
    let session = workspace.session(&project, &user);

    match cli.command {
        Commands::Init { uri, credentials } => commands::init::handle_init(&session, &uri, credentials),
        Commands::InitLocal { email } => commands::init::handle_init_local(&session, &email),
        Commands::Status { json } => commands::status::handle_status(&session, json),
        Commands::Commit {
            message,
            amend,
            paths,
        } => commands::commit::handle_commit(&session, paths, &message, amend),
        Commands::Pull {
            import_tags,
            import_theme,
            import_images,
        } => commands::sync::handle_pull(&session, import_tags, import_theme, import_images),
        Commands::Push {
            remote,
            all,
            tags,
            force,
        } => {
            let remote = remote.unwrap_or_else(|| workspace.config().default_remote.clone());
            commands::sync::handle_push(&session, &remote, all, tags, force)
        }
        Commands::Branch { action } => commands::branch::handle_branch(&session, action),
        Commands::History { graph, skip, limit } => {
            let limit = limit.unwrap_or(workspace.config().history_page_size);
            commands::history::handle_history(&session, skip, limit, graph)
        }
        Commands::Show { hash, path } => commands::diff::handle_show(&session, &hash, path.as_deref()),
        Commands::Diff { path } => commands::diff::handle_diff(&session, &path),
        Commands::Discard { paths } => commands::commit::handle_discard(&session, &paths),
        Commands::Remote { action } => commands::remote::handle_remote(&session, action),
        Commands::Credentials { credentials } => {
            commands::init::handle_credentials(&session, credentials)
        }
    }
}
