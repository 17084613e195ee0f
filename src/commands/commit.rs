use console::style;
use project_git::ProjectSession;

/// Commit `paths`, or every uncommitted resource when `paths` is empty.
pub fn handle_commit(
    session: &ProjectSession<'_>,
    paths: Vec<String>,
    message: &str,
    amend: bool,
) -> anyhow::Result<()> {
    let paths = if paths.is_empty() {
        session
            .uncommitted_changes()?
            .into_iter()
            .map(|row| row.resource)
            .collect()
    } else {
        paths
    };

    if paths.is_empty() && !amend {
        println!("{} Nothing to commit", style("✨").green().bold());
        return Ok(());
    }

    session.commit(&paths, message, amend)?;

    let head = session.commit_history(0, 1)?;
    let short_hash = head.first().map(|c| c.short_hash.as_str()).unwrap_or_default();
    println!(
        "{} [{} {}] {} ({} resources)",
        style("✓").green().bold(),
        style(session.current_branch()?).cyan(),
        style(short_hash).yellow(),
        message,
        paths.len()
    );
    Ok(())
}

pub fn handle_discard(session: &ProjectSession<'_>, paths: &[String]) -> anyhow::Result<()> {
    session.discard_changes(paths)?;

    for path in paths {
        println!(
            "  {} Discarded {}",
            style("↺").yellow().bold(),
            style(path).cyan()
        );
    }
    Ok(())
}
