use console::{style, Color};
use project_git::graph::{lane_glyphs, layout, LaneAssignment, PALETTE_SIZE};
use project_git::session::CommitRow;
use project_git::ProjectSession;

const LANE_COLORS: [Color; PALETTE_SIZE] = [
    Color::Cyan,
    Color::Green,
    Color::Magenta,
    Color::Yellow,
    Color::Blue,
    Color::Red,
    Color::Color256(208),
    Color::Color256(141),
];

pub fn handle_history(
    session: &ProjectSession<'_>,
    skip: usize,
    limit: usize,
    graph: bool,
) -> anyhow::Result<()> {
    let commits = session.commit_log(skip, limit)?;
    if commits.is_empty() {
        println!("No commits yet");
        return Ok(());
    }

    let lanes = if graph { layout(&commits) } else { Vec::new() };

    for (i, commit) in commits.into_iter().enumerate() {
        let prefix = lanes.get(i).map(graph_prefix).unwrap_or_default();
        print_commit(&prefix, &CommitRow::from(commit));
    }
    Ok(())
}

fn graph_prefix(assignment: &LaneAssignment) -> String {
    let color = LANE_COLORS[assignment.color % LANE_COLORS.len()];
    format!("{} ", style(lane_glyphs(assignment)).fg(color))
}

fn print_commit(prefix: &str, row: &CommitRow) {
    let refs = if row.refs.is_empty() {
        String::new()
    } else {
        format!(" {}", style(format!("({})", row.refs)).green().bold())
    };
    println!(
        "{}{} {} {}{} {}",
        prefix,
        style(&row.short_hash).yellow(),
        style(&row.date).dim(),
        style(&row.author).blue(),
        refs,
        row.message
    );
}
