use console::style;
use inquire::Confirm;
use project_git::git::merge::MergeOutcome;
use project_git::ProjectSession;

pub fn handle_pull(
    session: &ProjectSession<'_>,
    import_tags: bool,
    import_theme: bool,
    import_images: bool,
) -> anyhow::Result<()> {
    let outcome = session.pull(import_tags, import_theme, import_images)?;

    let icon = match outcome {
        MergeOutcome::UpToDate => style("✨").green().bold(),
        MergeOutcome::FastForward(_) | MergeOutcome::Merged(_) => style("✓").green().bold(),
    };
    println!("{icon} {outcome}");
    Ok(())
}

/// Push, offering a forced retry when the remote rejects a non-fast-forward.
pub fn handle_push(
    session: &ProjectSession<'_>,
    remote: &str,
    all: bool,
    tags: bool,
    force: bool,
) -> anyhow::Result<()> {
    let pushed = match session.push(remote, all, tags, force) {
        Ok(pushed) => pushed,
        Err(e) if e.is_non_fast_forward() && !force => {
            eprintln!(
                "{} {}",
                style("⚠").yellow().bold(),
                style(&e).yellow()
            );
            let retry = Confirm::new("The remote has commits you don't have. Force push anyway?")
                .with_default(false)
                .prompt()?;
            if !retry {
                println!("{} Push cancelled", style("⚠").yellow().bold());
                return Ok(());
            }
            session.push(remote, all, tags, true)?
        }
        Err(e) => return Err(e.into()),
    };

    if pushed.is_empty() {
        println!("{} Everything up-to-date", style("✨").green().bold());
        return Ok(());
    }
    for refspec in &pushed {
        println!(
            "  {} {} -> {}",
            style("✓").green().bold(),
            style(refspec).cyan(),
            style(remote).dim()
        );
    }
    Ok(())
}
