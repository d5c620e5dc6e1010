use crate::common::{Seed, loose_object_files, seeded_repository};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;
use treebomb::areas::repository::Repository;
use treebomb::artifacts::bomb::expansion::{Expansion, expected_leaf_count};
use treebomb::artifacts::bomb::{FANOUT, LEVELS};

#[rstest]
#[case(1)]
#[case(3)]
#[case(8)]
fn each_level_stores_two_objects_and_multiplies_files_by_sixteen(
    seeded_repository: (TempDir, Seed),
    #[case] levels: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let (dir, seed) = seeded_repository;
    let objects_before = loose_object_files(dir.path()).len();

    let mut repository = Repository::new(dir.path(), Box::new(std::io::sink()))?;
    let detonation = repository.plant_bomb_with(levels)?;

    let objects_after = loose_object_files(dir.path()).len();
    assert_eq!(objects_after - objects_before, 2 * levels);
    assert_eq!(detonation.objects_written(), 2 * levels);

    let mut expansion = Expansion::new(repository.database());
    assert_eq!(expansion.leaf_count(&seed.tree)?, seed.files);
    let seed_trees = expansion.distinct_trees();

    let leaves = expansion.leaf_count(&detonation.tip().tree)?;
    assert_eq!(leaves, seed.files * 16u128.pow(levels as u32));
    assert_eq!(leaves, expected_leaf_count(seed.files, FANOUT, levels));

    // only one new tree per level had to be walked
    assert_eq!(expansion.distinct_trees() - seed_trees, levels);

    Ok(())
}

#[rstest]
fn full_run_adds_sixty_four_objects_and_saturates_the_count(
    seeded_repository: (TempDir, Seed),
) -> Result<(), Box<dyn std::error::Error>> {
    let (dir, _seed) = seeded_repository;
    let objects_before = loose_object_files(dir.path()).len();

    let mut repository = Repository::new(dir.path(), Box::new(std::io::sink()))?;
    let detonation = repository.plant_bomb()?;

    assert_eq!(detonation.levels.len(), LEVELS);
    assert_eq!(loose_object_files(dir.path()).len() - objects_before, 2 * LEVELS);

    // 4 seed files * 16^32 does not fit in 128 bits
    let mut expansion = Expansion::new(repository.database());
    assert_eq!(expansion.leaf_count(&detonation.tip().tree)?, u128::MAX);

    Ok(())
}
