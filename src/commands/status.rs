use console::style;
use project_git::diff::{ChangeKind, ChangeRow};
use project_git::ProjectSession;

pub fn handle_status(session: &ProjectSession<'_>, json: bool) -> anyhow::Result<()> {
    let branch = session.current_branch()?;
    let rows = session.uncommitted_changes()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("On branch {}", style(&branch).cyan().bold());
    if rows.is_empty() {
        println!("{} Nothing to commit", style("✨").green().bold());
        return Ok(());
    }

    println!();
    for row in &rows {
        print_row(row);
    }
    Ok(())
}

fn print_row(row: &ChangeRow) {
    let kind = format!("{:<12}", row.kind.to_string());
    let kind = match row.kind {
        ChangeKind::Deleted => style(kind).red(),
        ChangeKind::Created => style(kind).green(),
        ChangeKind::Uncommitted | ChangeKind::Modified => style(kind).yellow(),
    };
    let detail = format!("{} {}", row.actor, row.timestamp);
    println!(
        "  {} {} {}",
        kind,
        style(&row.resource).bold(),
        style(detail.trim_end()).dim()
    );
}
