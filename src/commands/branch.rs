use console::style;
use inquire::Select;
use project_git::git::branches::{RestoreOutcome, SwitchOutcome};
use project_git::{GitError, ProjectSession};

use crate::cli::BranchAction;

pub fn handle_branch(
    session: &ProjectSession<'_>,
    action: Option<BranchAction>,
) -> anyhow::Result<()> {
    match action {
        None => select_and_checkout(session),
        Some(BranchAction::List) => list_branches(session),
        Some(BranchAction::Create { name, start_point }) => {
            session.create_branch(&name, start_point.as_deref())?;
            println!(
                "{} Created branch {}",
                style("✓").green().bold(),
                style(&name).cyan()
            );
            Ok(())
        }
        Some(BranchAction::Checkout { name }) => checkout(session, &name),
        Some(BranchAction::Delete { name }) => {
            session.delete_branch(&name)?;
            println!(
                "{} Deleted branch {}",
                style("✓").green().bold(),
                style(&name).cyan()
            );
            Ok(())
        }
    }
}

fn select_and_checkout(session: &ProjectSession<'_>) -> anyhow::Result<()> {
    let current = session.current_branch()?;
    let branches: Vec<String> = session
        .local_branches()?
        .into_iter()
        .filter(|b| *b != current)
        .collect();

    if branches.is_empty() {
        println!("No other branches found");
        return Ok(());
    }

    match Select::new("Select a branch:", branches).prompt() {
        Ok(chosen_branch) => checkout(session, &chosen_branch),
        Err(err) => {
            eprintln!(
                "{} Selection cancelled: {}",
                style("⚠").yellow().bold(),
                style(err).yellow()
            );
            Ok(())
        }
    }
}

fn checkout(session: &ProjectSession<'_>, name: &str) -> anyhow::Result<()> {
    match session.checkout_branch(name) {
        Ok(outcome) => {
            report_switch(&outcome);
            Ok(())
        }
        Err(GitError::StashApplyConflict { branch }) => {
            println!(
                "{} Switched to branch: {}",
                style("✓").green().bold(),
                style(&branch).cyan()
            );
            eprintln!(
                "{} Stashed changes for {} conflict with it and were kept in the stash",
                style("⚠").yellow().bold(),
                style(&branch).yellow()
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn report_switch(outcome: &SwitchOutcome) {
    println!(
        "{} Switched to branch: {}",
        style("✓").green().bold(),
        style(&outcome.to).cyan()
    );
    if outcome.stashed {
        println!(
            "  {} Changes on {} were stashed",
            style("📦").blue(),
            style(&outcome.from).cyan()
        );
    }
    match outcome.restore {
        RestoreOutcome::Nothing => {}
        RestoreOutcome::Restored => println!(
            "  {} Restored stashed changes for {}",
            style("↺").green(),
            style(&outcome.to).cyan()
        ),
        RestoreOutcome::DiscardedOnConflict => eprintln!(
            "  {} Stashed changes for {} conflicted and were discarded",
            style("⚠").yellow().bold(),
            style(&outcome.to).yellow()
        ),
    }
}

fn list_branches(session: &ProjectSession<'_>) -> anyhow::Result<()> {
    let current = session.current_branch()?;

    for branch in session.local_branches()? {
        if branch == current {
            println!("{} {}", style("*").green().bold(), style(&branch).green().bold());
        } else {
            println!("  {branch}");
        }
    }
    for branch in session.remote_branches()? {
        println!("  {}", style(format!("remotes/{branch}")).red());
    }
    Ok(())
}
