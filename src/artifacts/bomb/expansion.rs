//! Size of a tree once fully expanded
//!
//! A generated tree references its child `FANOUT` times, so the number of
//! paths a checkout would create grows exponentially with the number of
//! levels. Counting is memoised per tree id, which keeps the walk linear in
//! the number of distinct trees.

use crate::areas::database::Database;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::HashMap;

pub struct Expansion<'d> {
    database: &'d Database,
    leaves: HashMap<ObjectId, u128>,
}

impl<'d> Expansion<'d> {
    pub fn new(database: &'d Database) -> Self {
        Expansion {
            database,
            leaves: HashMap::new(),
        }
    }

    /// Number of non-tree entries reachable from `tree_oid` by naive expansion
    ///
    /// Blobs, symlinks and submodule links each count as one leaf. Saturates
    /// at `u128::MAX`.
    pub fn leaf_count(&mut self, tree_oid: &ObjectId) -> anyhow::Result<u128> {
        if let Some(count) = self.leaves.get(tree_oid) {
            return Ok(*count);
        }

        let tree = self.database.read_tree(tree_oid)?;
        let mut count = 0u128;
        for entry in tree.entries() {
            let entry_count = if entry.mode.is_tree() {
                self.leaf_count(&entry.oid)?
            } else {
                1
            };
            count = count.saturating_add(entry_count);
        }

        self.leaves.insert(*tree_oid, count);
        Ok(count)
    }

    /// Number of distinct trees visited so far
    pub fn distinct_trees(&self) -> usize {
        self.leaves.len()
    }
}

/// `seed_leaves * fanout^levels`, saturating at `u128::MAX`
pub fn expected_leaf_count(seed_leaves: u128, fanout: usize, levels: usize) -> u128 {
    (0..levels).fold(seed_leaves, |acc, _| acc.saturating_mul(fanout as u128))
}
