use console::style;
use project_git::diff::{diff_text, LineOp};
use project_git::ProjectSession;

pub fn handle_diff(session: &ProjectSession<'_>, path: &str) -> anyhow::Result<()> {
    let (old, new) = session.resource_diff(path)?;
    print_diff(path, &old, &new);
    Ok(())
}

/// Without `path`, list the commit's files; with it, diff that file against
/// the commit's first parent.
pub fn handle_show(
    session: &ProjectSession<'_>,
    hash: &str,
    path: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(path) = path {
        let (old, new) = session.commit_file_diff(hash, path)?;
        print_diff(path, &old, &new);
        return Ok(());
    }

    let files = session.commit_files(hash)?;
    if files.is_empty() {
        println!("No file changes");
    }
    for entry in files {
        let (change, file) = entry.split_once(':').unwrap_or(("", entry.as_str()));
        let padded = format!("{change:<7}");
        let change = match change {
            "ADD" => style(padded).green(),
            "DELETE" => style(padded).red(),
            _ => style(padded).yellow(),
        };
        println!("  {change} {file}");
    }
    Ok(())
}

fn print_diff(path: &str, old: &str, new: &str) {
    println!("{}", style(format!("--- a/{path}")).bold());
    println!("{}", style(format!("+++ b/{path}")).bold());

    for line in diff_text(old, new) {
        match line.op {
            LineOp::Unchanged => println!(" {}", line.text()),
            LineOp::Added => println!("{}", style(format!("+{}", line.text())).green()),
            LineOp::Removed => println!("{}", style(format!("-{}", line.text())).red()),
        }
    }
}
