use console::style;
use project_git::store::UserCredentials;
use project_git::ProjectSession;

use super::read_key;
use crate::cli::CredentialArgs;

fn to_credentials(args: CredentialArgs) -> anyhow::Result<UserCredentials> {
    Ok(UserCredentials {
        ssh_key: read_key(args.ssh_key.as_deref())?,
        email: args.email,
        git_username: args.git_username,
        password: args.password,
    })
}

pub fn handle_init(
    session: &ProjectSession<'_>,
    uri: &str,
    args: CredentialArgs,
) -> anyhow::Result<()> {
    let credentials = to_credentials(args)?;
    if credentials.email.is_empty() {
        anyhow::bail!("--email is required to register a project");
    }

    println!(
        "{} Registering {} from {}...",
        style("🔗").blue().bold(),
        style(session.project()).cyan().bold(),
        style(uri).dim()
    );
    session.initialize_project(uri, &credentials)?;

    println!(
        "{} Project {} is ready at {}",
        style("✓").green().bold(),
        style(session.project()).cyan(),
        session.path().display()
    );
    Ok(())
}

pub fn handle_init_local(session: &ProjectSession<'_>, email: &str) -> anyhow::Result<()> {
    session.initialize_local_project(email)?;

    println!(
        "{} Project {} is ready at {} (no remote)",
        style("✓").green().bold(),
        style(session.project()).cyan(),
        session.path().display()
    );
    Ok(())
}

/// Create or update the acting user's credentials. Blank secrets keep their
/// stored value.
pub fn handle_credentials(session: &ProjectSession<'_>, args: CredentialArgs) -> anyhow::Result<()> {
    let credentials = to_credentials(args)?;
    session.save_user_credentials(&credentials)?;

    let mode = if session.is_ssh_authentication()? {
        "ssh"
    } else {
        "https"
    };
    println!(
        "{} Saved {} credentials for {}",
        style("✓").green().bold(),
        mode,
        style(session.user()).cyan()
    );
    Ok(())
}
