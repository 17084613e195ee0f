use console::style;
use project_git::ProjectSession;

use super::read_key;
use crate::cli::{RemoteAction, RemoteCredentialArgs};

pub fn handle_remote(session: &ProjectSession<'_>, action: RemoteAction) -> anyhow::Result<()> {
    match action {
        RemoteAction::List => {
            let remotes = session.list_remotes()?;
            if remotes.is_empty() {
                println!("No remotes configured");
            }
            for remote in remotes {
                println!("{}\t{}", style(&remote.name).cyan().bold(), remote.url);
            }
            Ok(())
        }
        RemoteAction::Add {
            name,
            url,
            credentials,
        } => {
            session.add_remote(&name, &url)?;
            save_credentials(session, &name, credentials)?;
            println!(
                "{} Added remote {} -> {}",
                style("✓").green().bold(),
                style(&name).cyan(),
                url
            );
            Ok(())
        }
        RemoteAction::Remove { name } => {
            session.remove_remote(&name)?;
            println!(
                "{} Removed remote {}",
                style("✓").green().bold(),
                style(&name).cyan()
            );
            Ok(())
        }
        RemoteAction::SetUrl {
            name,
            url,
            credentials,
        } => {
            session.set_remote_url(&name, &url)?;
            save_credentials(session, &name, credentials)?;
            println!(
                "{} Remote {} now points at {}",
                style("✓").green().bold(),
                style(&name).cyan(),
                url
            );
            Ok(())
        }
    }
}

fn save_credentials(
    session: &ProjectSession<'_>,
    remote: &str,
    args: RemoteCredentialArgs,
) -> anyhow::Result<()> {
    let Some(git_username) = args.git_username else {
        return Ok(());
    };
    let ssh_key = read_key(args.ssh_key.as_deref())?;
    session.save_remote_credentials(remote, &git_username, &args.password, &ssh_key)?;
    Ok(())
}
