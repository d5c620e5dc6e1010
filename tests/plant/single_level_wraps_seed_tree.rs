use crate::common::{Seed, fanout_tree_content, inflate_object, read_branch, seeded_repository};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;
use treebomb::areas::repository::Repository;
use treebomb::artifacts::objects::object_id::ObjectId;

#[rstest]
fn one_level_wraps_seed_tree_in_fanout_tree(
    seeded_repository: (TempDir, Seed),
) -> Result<(), Box<dyn std::error::Error>> {
    let (dir, seed) = seeded_repository;

    let mut repository = Repository::new(dir.path(), Box::new(std::io::sink()))?;
    let detonation = repository.plant_bomb_with(1)?;

    // branch moved to the new commit
    let head = read_branch(dir.path(), "master");
    assert_eq!(head, detonation.tip().commit.to_hex());
    assert_eq!(detonation.seed.commit, seed.commit);
    assert_eq!(detonation.seed.tree, seed.tree);

    // the commit names the new tree, the seed commit as parent and level 1
    let framed = inflate_object(dir.path(), &head);
    let framed = String::from_utf8(framed)?;
    let (header, text) = framed.split_once('\0').expect("missing header");
    assert_eq!(header, format!("commit {}", text.len()));

    let tree_hex = text
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("tree "))
        .expect("missing tree line");
    assert!(text.contains(&format!("parent {}", seed.commit)));
    assert!(text.ends_with("Add level 1"));
    assert!(text.contains("author treebomb <treebomb@localhost> 0 +0000"));
    assert!(text.contains("committer treebomb <treebomb@localhost> 0 +0000"));

    // the new tree is 16 directories, all pointing at the seed tree
    let tree = ObjectId::try_parse(tree_hex)?;
    let framed = inflate_object(dir.path(), tree_hex);
    let mut expected = b"tree 416\0".to_vec();
    expected.extend(fanout_tree_content(&seed.tree));
    assert_eq!(framed, expected);
    assert_eq!(detonation.tip().tree, tree);

    Ok(())
}

#[rstest]
fn fanout_tree_is_read_back_as_sixteen_directories(
    seeded_repository: (TempDir, Seed),
) -> Result<(), Box<dyn std::error::Error>> {
    let (dir, seed) = seeded_repository;

    let repository = Repository::new(dir.path(), Box::new(std::io::sink()))?;
    let tree_oid = repository.write_fanout_tree(seed.tree)?;
    let tree = repository.database().read_tree(&tree_oid)?;

    let names = tree.entries().map(|e| e.name.clone()).collect::<Vec<_>>();
    assert_eq!(names.concat(), "0123456789abcdef");
    assert!(tree.entries().all(|e| e.mode.is_tree() && e.oid == seed.tree));

    Ok(())
}
