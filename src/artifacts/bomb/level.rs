use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// Commit and tree at the tip of the history being grown
///
/// This is the accumulator threaded through the level fold: each level
/// consumes the previous tip and yields the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Tip {
    pub commit: ObjectId,
    pub tree: ObjectId,
}

/// Objects written for one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Level {
    /// Zero-based level index
    pub index: usize,
    pub tree: ObjectId,
    pub commit: ObjectId,
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Detonation {
    pub branch: BranchName,
    pub seed: Tip,
    pub levels: Vec<Level>,
}

impl Detonation {
    /// Tip the branch points at after the run
    pub fn tip(&self) -> Tip {
        self.levels
            .last()
            .map(|level| Tip::new(level.commit, level.tree))
            .unwrap_or(self.seed)
    }

    /// Number of objects added to the store: one tree and one commit per level
    pub fn objects_written(&self) -> usize {
        self.levels.len() * 2
    }
}
