use super::layout::LaneAssignment;

/// One text row of lane glyphs for a commit.
///
/// `*` marks the commit, `|` a lane passing by, `/` a lane joining the
/// commit and `\` a lane opened for a merge parent.
pub fn lane_glyphs(assignment: &LaneAssignment) -> String {
    let width = assignment
        .lanes_before
        .len()
        .max(assignment.lanes_after.len())
        .max(assignment.lane + 1);

    let mut row = String::with_capacity(width * 2);
    for i in 0..width {
        let glyph = if i == assignment.lane {
            '*'
        } else if assignment.converging.contains(&i) {
            '/'
        } else if assignment.merge_lanes.contains(&i)
            && !is_active(&assignment.lanes_before, i)
        {
            '\\'
        } else if is_active(&assignment.lanes_before, i) || is_active(&assignment.lanes_after, i) {
            '|'
        } else {
            ' '
        };
        row.push(glyph);
        row.push(' ');
    }

    row.trim_end().to_string()
}

fn is_active(lanes: &[Option<String>], i: usize) -> bool {
    lanes.get(i).is_some_and(Option::is_some)
}
