use crate::git::commits::CommitInfo;

/// Number of lane colors; lane colors cycle through it.
pub const PALETTE_SIZE: usize = 8;

/// A commit as the layout sees it.
pub trait GraphNode {
    fn hash(&self) -> &str;
    /// Parent hashes, first parent first.
    fn parents(&self) -> &[String];
}

impl GraphNode for CommitInfo {
    fn hash(&self) -> &str {
        &self.hash
    }

    fn parents(&self) -> &[String] {
        &self.parents
    }
}

/// Rendering lanes assigned to one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneAssignment {
    pub lane: usize,
    pub color: usize,
    /// Other lanes that were waiting for this commit and end here.
    pub converging: Vec<usize>,
    /// Lane of each parent after the first, in parent order.
    pub merge_lanes: Vec<usize>,
    /// Hash each lane expected before this commit was placed.
    pub lanes_before: Vec<Option<String>>,
    /// Hash each lane expects once this commit is placed.
    pub lanes_after: Vec<Option<String>>,
}

/// Assign lanes to `commits`, which must be ordered newest first.
///
/// Each lane slot holds the hash it expects next, or `None` when free. Free
/// slots are always reused, lowest index first, before a lane is appended.
/// Lanes converging into a commit are released only after its merge parents
/// have been placed, so a commit never opens a lane it also closes.
///
/// Branches sharing a parent each keep a lane expecting it until the parent
/// is placed; those lanes converge there. Apart from that pending case a
/// hash is expected by at most one lane.
pub fn layout<N: GraphNode>(commits: &[N]) -> Vec<LaneAssignment> {
    let mut active: Vec<Option<String>> = Vec::new();
    let mut assignments = Vec::with_capacity(commits.len());

    for commit in commits {
        let hash = commit.hash();
        let lanes_before = active.clone();

        let lane = match position_of(&active, hash) {
            Some(lane) => lane,
            None => claim_free_lane(&mut active),
        };

        let converging: Vec<usize> = active
            .iter()
            .enumerate()
            .filter(|(i, expected)| *i != lane && expected.as_deref() == Some(hash))
            .map(|(i, _)| i)
            .collect();

        let parents = commit.parents();
        active[lane] = parents.first().cloned();

        let mut merge_lanes = Vec::with_capacity(parents.len().saturating_sub(1));
        for parent in parents.iter().skip(1) {
            let parent_lane = match position_of(&active, parent) {
                Some(existing) => existing,
                None => {
                    let slot = claim_free_lane(&mut active);
                    active[slot] = Some(parent.clone());
                    slot
                }
            };
            merge_lanes.push(parent_lane);
        }

        for &closed in &converging {
            active[closed] = None;
        }

        assignments.push(LaneAssignment {
            lane,
            color: lane % PALETTE_SIZE,
            converging,
            merge_lanes,
            lanes_before,
            lanes_after: active.clone(),
        });
    }

    assignments
}

fn position_of(active: &[Option<String>], hash: &str) -> Option<usize> {
    active.iter().position(|expected| expected.as_deref() == Some(hash))
}

fn claim_free_lane(active: &mut Vec<Option<String>>) -> usize {
    match active.iter().position(Option::is_none) {
        Some(free) => free,
        None => {
            active.push(None);
            active.len() - 1
        }
    }
}
