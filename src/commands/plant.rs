use crate::areas::repository::Repository;
use crate::artifacts::bomb::expansion::Expansion;
use crate::artifacts::bomb::level::{Detonation, Level, Tip};
use crate::artifacts::bomb::{FANOUT, LEVELS, hex_label, identity, level_message};
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use colored::Colorize;
use std::io::Write;
use tracing::{info, warn};

impl Repository {
    /// Stack `LEVELS` fan-out levels on top of the primary branch
    pub fn plant_bomb(&mut self) -> anyhow::Result<Detonation> {
        self.plant_bomb_with(LEVELS)
    }

    /// Stack `levels` fan-out levels on top of the primary branch
    ///
    /// Every level writes one tree and one commit, then moves the branch to
    /// the new commit, so the branch always names a fully stored history. Any
    /// error aborts the run; objects written before it stay behind unreferenced.
    pub fn plant_bomb_with(&mut self, levels: usize) -> anyhow::Result<Detonation> {
        let branch = self.refs().primary_branch()?;
        let seed = self.seed(&branch)?;
        info!(branch = %branch, commit = %seed.commit, tree = %seed.tree, "seeded from branch tip");

        let (_, built) = (0..levels).try_fold(
            (seed, Vec::with_capacity(levels)),
            |(tip, mut built), index| -> anyhow::Result<_> {
                let level = self.add_level(&branch, tip, index)?;
                writeln!(
                    self.writer(),
                    "[{}] {}",
                    level.commit.to_short_oid().yellow(),
                    level_message(index)
                )?;

                built.push(level);
                Ok((Tip::new(level.commit, level.tree), built))
            },
        )?;

        let detonation = Detonation::new(branch, seed, built);
        self.report(&detonation)?;

        Ok(detonation)
    }

    /// Write a tree of `FANOUT` hex-labelled entries, all pointing at `child`
    pub fn write_fanout_tree(&self, child: ObjectId) -> anyhow::Result<ObjectId> {
        let tree = Tree::fanout(child, FANOUT, hex_label)?;
        self.database().store(&tree)
    }

    /// Write the commit for level `level_index` with the fixed identity
    pub fn write_level_commit(
        &self,
        tree: ObjectId,
        parent: Option<ObjectId>,
        level_index: usize,
    ) -> anyhow::Result<ObjectId> {
        let commit = Commit::new(
            parent.into_iter().collect(),
            tree,
            identity(),
            level_message(level_index),
        );
        self.database().store(&commit)
    }

    fn seed(&self, branch: &BranchName) -> anyhow::Result<Tip> {
        let commit_oid = self.refs().read_head(branch)?;
        let commit = self.database().read_slim_commit(&commit_oid)?;

        Ok(Tip::new(commit_oid, commit.tree_oid))
    }

    fn add_level(&self, branch: &BranchName, tip: Tip, index: usize) -> anyhow::Result<Level> {
        let tree = self.write_fanout_tree(tip.tree)?;
        let commit = self.write_level_commit(tree, Some(tip.commit), index)?;
        self.refs().update_head(branch, &commit)?;

        info!(level = index + 1, tree = %tree, commit = %commit, "added level");
        Ok(Level::new(index, tree, commit))
    }

    /// Print the summary line. The checkout size needs every tree under the
    /// seed to be a readable loose object, so it is left out when one is not.
    fn report(&self, detonation: &Detonation) -> anyhow::Result<()> {
        let leaves = match Expansion::new(self.database()).leaf_count(&detonation.tip().tree) {
            Ok(leaves) => Some(leaves),
            Err(e) => {
                warn!(
                    tree = %detonation.seed.tree,
                    error = %format!("{:#}", e),
                    "unable to measure checkout size"
                );
                None
            }
        };

        info!(
            branch = %detonation.branch,
            levels = detonation.levels.len(),
            objects = detonation.objects_written(),
            leaves = ?leaves,
            "history planted"
        );

        let checkout = match leaves {
            Some(u128::MAX) => format!(
                ", at least {} files on checkout",
                u128::MAX.to_string().bold()
            ),
            Some(leaves) => format!(", {} files on checkout", leaves.to_string().bold()),
            None => String::new(),
        };

        writeln!(
            self.writer(),
            "{} now at {}: {} levels, {} new objects{}",
            detonation.branch.to_string().green(),
            detonation.tip().commit.to_short_oid().yellow(),
            detonation.levels.len(),
            detonation.objects_written(),
            checkout
        )?;

        Ok(())
    }
}
