use crate::common::{Seed, seeded_repository};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;
use treebomb::areas::repository::Repository;

#[rstest]
fn every_level_commits_on_top_of_the_previous_one(
    seeded_repository: (TempDir, Seed),
) -> Result<(), Box<dyn std::error::Error>> {
    let (dir, seed) = seeded_repository;

    let mut repository = Repository::new(dir.path(), Box::new(std::io::sink()))?;
    let detonation = repository.plant_bomb_with(4)?;
    assert_eq!(detonation.levels.len(), 4);

    let mut parent = seed.commit;
    let mut child_tree = seed.tree;
    for (index, level) in detonation.levels.iter().enumerate() {
        assert_eq!(level.index, index);

        let commit = repository.database().read_commit(&level.commit)?;
        assert_eq!(commit.parents(), &[parent]);
        assert_eq!(commit.tree_oid(), &level.tree);
        assert_eq!(commit.message(), format!("Add level {}", index + 1));
        assert_eq!(commit.author().display(), "treebomb <treebomb@localhost> 0 +0000");
        assert_eq!(commit.committer(), commit.author());

        let tree = repository.database().read_tree(&level.tree)?;
        assert_eq!(tree.len(), 16);
        assert!(tree.entries().all(|entry| entry.oid == child_tree));

        parent = level.commit;
        child_tree = level.tree;
    }

    assert_eq!(repository.refs().read_head(&detonation.branch)?, parent);

    Ok(())
}

#[rstest]
fn running_again_extends_the_generated_history(
    seeded_repository: (TempDir, Seed),
) -> Result<(), Box<dyn std::error::Error>> {
    let (dir, _seed) = seeded_repository;

    let mut repository = Repository::new(dir.path(), Box::new(std::io::sink()))?;
    let first = repository.plant_bomb_with(2)?;
    let second = repository.plant_bomb_with(1)?;

    assert_eq!(second.seed, first.tip());

    let commit = repository.database().read_commit(&second.tip().commit)?;
    assert_eq!(commit.parent(), Some(&first.tip().commit));
    // level numbering restarts with every run
    assert_eq!(commit.message(), "Add level 1");

    Ok(())
}

#[rstest]
fn zero_levels_leave_branch_on_seed(
    seeded_repository: (TempDir, Seed),
) -> Result<(), Box<dyn std::error::Error>> {
    let (dir, seed) = seeded_repository;

    let mut repository = Repository::new(dir.path(), Box::new(std::io::sink()))?;
    let detonation = repository.plant_bomb_with(0)?;

    assert_eq!(detonation.tip().commit, seed.commit);
    assert_eq!(detonation.objects_written(), 0);
    assert_eq!(repository.refs().read_head(&detonation.branch)?, seed.commit);

    Ok(())
}
