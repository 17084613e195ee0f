use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp {
    Unchanged,
    Added,
    Removed,
}

impl fmt::Display for LineOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineOp::Unchanged => "UNCHANGED",
            LineOp::Added => "ADDED",
            LineOp::Removed => "REMOVED",
        };
        f.write_str(name)
    }
}

/// One aligned row of a line diff.
///
/// `Unchanged` rows carry both sides, `Added` only the new side and `Removed`
/// only the old side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub op: LineOp,
    pub old_text: Option<String>,
    pub new_text: Option<String>,
}

impl DiffLine {
    fn unchanged(old: &str, new: &str) -> Self {
        Self {
            op: LineOp::Unchanged,
            old_text: Some(old.to_string()),
            new_text: Some(new.to_string()),
        }
    }

    fn added(new: &str) -> Self {
        Self {
            op: LineOp::Added,
            old_text: None,
            new_text: Some(new.to_string()),
        }
    }

    fn removed(old: &str) -> Self {
        Self {
            op: LineOp::Removed,
            old_text: Some(old.to_string()),
            new_text: None,
        }
    }

    /// Text to display for this row, preferring the new side.
    pub fn text(&self) -> &str {
        self.new_text
            .as_deref()
            .or(self.old_text.as_deref())
            .unwrap_or_default()
    }
}

/// Align two line sequences through their longest common subsequence.
///
/// Backtracking walks from the end of both inputs; on a mismatch it steps
/// back through the new side (an addition) whenever that keeps at least as
/// long a common subsequence, which places removals before additions in the
/// output.
pub fn diff_lines<S: AsRef<str>>(old: &[S], new: &[S]) -> Vec<DiffLine> {
    let m = old.len();
    let n = new.len();

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            dp[i][j] = if old[i - 1].as_ref() == new[j - 1].as_ref() {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(m.max(n));
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old[i - 1].as_ref() == new[j - 1].as_ref() {
            ops.push(DiffLine::unchanged(old[i - 1].as_ref(), new[j - 1].as_ref()));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || dp[i][j - 1] >= dp[i - 1][j]) {
            ops.push(DiffLine::added(new[j - 1].as_ref()));
            j -= 1;
        } else {
            ops.push(DiffLine::removed(old[i - 1].as_ref()));
            i -= 1;
        }
    }

    ops.reverse();
    ops
}

/// Line diff of two whole texts.
pub fn diff_text(old: &str, new: &str) -> Vec<DiffLine> {
    let old: Vec<&str> = old.lines().collect();
    let new: Vec<&str> = new.lines().collect();
    diff_lines(&old, &new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_side(ops: &[DiffLine]) -> Vec<&str> {
        ops.iter()
            .filter(|l| l.op != LineOp::Removed)
            .filter_map(|l| l.new_text.as_deref())
            .collect()
    }

    fn old_side(ops: &[DiffLine]) -> Vec<&str> {
        ops.iter()
            .filter(|l| l.op != LineOp::Added)
            .filter_map(|l| l.old_text.as_deref())
            .collect()
    }

    #[test]
    fn replaced_line_is_removed_then_added() {
        let ops = diff_lines(&["a", "b", "c"], &["a", "x", "c"]);

        let summary: Vec<(LineOp, &str)> = ops.iter().map(|l| (l.op, l.text())).collect();
        assert_eq!(
            summary,
            vec![
                (LineOp::Unchanged, "a"),
                (LineOp::Removed, "b"),
                (LineOp::Added, "x"),
                (LineOp::Unchanged, "c"),
            ]
        );
    }

    #[test]
    fn identical_inputs_are_all_unchanged() {
        let lines = ["one", "two", "two", "three"];

        let ops = diff_lines(&lines, &lines);

        assert_eq!(ops.len(), lines.len());
        assert!(ops.iter().all(|l| l.op == LineOp::Unchanged));
    }

    #[test]
    fn both_sides_are_reconstructed() {
        let cases: &[(&[&str], &[&str])] = &[
            (&["a", "b", "c", "d"], &["b", "c", "e", "a"]),
            (&[], &["only", "new"]),
            (&["only", "old"], &[]),
            (&["x", "y", "x", "y"], &["y", "x", "y", "x", "z"]),
            (&["same"], &["same"]),
        ];

        for (old, new) in cases {
            let ops = diff_lines(*old, *new);
            assert_eq!(new_side(&ops), *new, "new side of {old:?} -> {new:?}");
            assert_eq!(old_side(&ops), *old, "old side of {old:?} -> {new:?}");
        }
    }

    #[test]
    fn common_subsequence_is_kept() {
        let ops = diff_lines(&["a", "b", "c", "d"], &["a", "c", "d", "e"]);

        let unchanged = ops.iter().filter(|l| l.op == LineOp::Unchanged).count();
        assert_eq!(unchanged, 3);
        assert_eq!(ops.len(), 5);
    }

    #[test]
    fn empty_inputs_produce_no_ops() {
        let empty: [&str; 0] = [];
        assert!(diff_lines(&empty, &empty).is_empty());
        assert!(diff_text("", "").is_empty());
    }

    #[test]
    fn text_diff_splits_on_lines() {
        let ops = diff_text("{\n  \"a\": 1\n}\n", "{\n  \"a\": 2\n}\n");

        assert_eq!(ops.len(), 4);
        assert_eq!(ops[1].op, LineOp::Removed);
        assert_eq!(ops[1].old_text.as_deref(), Some("  \"a\": 1"));
        assert_eq!(ops[2].op, LineOp::Added);
    }
}
