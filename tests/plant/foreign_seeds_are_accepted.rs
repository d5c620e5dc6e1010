use crate::common::{Seed, database, read_branch, run_treebomb_command, seeded_repository};
use assert_fs::TempDir;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::Path;
use treebomb::areas::repository::Repository;
use treebomb::artifacts::objects::object_id::ObjectId;
use treebomb::artifacts::objects::object_type::ObjectType;

/// Delete the loose `docs` subtree of the seed, as if it lived in a pack
fn remove_docs_subtree(dir: &Path, seed: &Seed) -> Result<(), Box<dyn std::error::Error>> {
    let database = database(dir);
    let root = database.read_tree(&seed.tree)?;
    let docs = root
        .entries()
        .find(|entry| entry.name == "docs")
        .expect("seed tree has a docs directory");

    std::fs::remove_file(database.object_path(&docs.oid))?;
    Ok(())
}

/// Store `content` as a commit and point master at it
fn write_foreign_commit(
    dir: &Path,
    content: &[u8],
) -> Result<ObjectId, Box<dyn std::error::Error>> {
    let oid = database(dir).write(ObjectType::Commit, content)?;
    std::fs::write(dir.join(".git/refs/heads/master"), format!("{}\n", oid))?;
    Ok(oid)
}

#[rstest]
fn missing_seed_subtree_does_not_fail_the_run(
    seeded_repository: (TempDir, Seed),
) -> Result<(), Box<dyn std::error::Error>> {
    let (dir, seed) = seeded_repository;
    remove_docs_subtree(dir.path(), &seed)?;

    let mut repository = Repository::new(dir.path(), Box::new(std::io::sink()))?;
    let detonation = repository.plant_bomb_with(1)?;

    assert_eq!(read_branch(dir.path(), "master"), detonation.tip().commit.to_hex());
    let commit = repository.database().read_commit(&detonation.tip().commit)?;
    assert_eq!(commit.parent(), Some(&seed.commit));

    Ok(())
}

#[rstest]
fn summary_omits_checkout_size_when_seed_subtree_is_missing(
    seeded_repository: (TempDir, Seed),
) -> Result<(), Box<dyn std::error::Error>> {
    let (dir, seed) = seeded_repository;
    remove_docs_subtree(dir.path(), &seed)?;

    run_treebomb_command(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Add level 32\n"))
        .stdout(predicate::str::contains("64 new objects"))
        .stdout(predicate::str::contains("files on checkout").not());

    assert!(read_branch(dir.path(), "master") != seed.commit.to_hex());

    Ok(())
}

#[rstest]
fn latin1_seed_commit_is_extended(
    seeded_repository: (TempDir, Seed),
) -> Result<(), Box<dyn std::error::Error>> {
    let (dir, seed) = seeded_repository;

    let mut content = format!("tree {}\n", seed.tree).into_bytes();
    content.extend_from_slice(b"author Jos\xe9 <jose@example.com> 1700000000 +0100\n");
    content.extend_from_slice(b"committer Jos\xe9 <jose@example.com> 1700000000 +0100\n");
    content.extend_from_slice(b"encoding ISO-8859-1\n\nCaf\xe9\n");
    let foreign = write_foreign_commit(dir.path(), &content)?;

    let mut repository = Repository::new(dir.path(), Box::new(std::io::sink()))?;
    let detonation = repository.plant_bomb_with(2)?;

    assert_eq!(detonation.seed.commit, foreign);
    assert_eq!(detonation.seed.tree, seed.tree);

    let first = repository.database().read_commit(&detonation.levels[0].commit)?;
    assert_eq!(first.parent(), Some(&foreign));
    assert_eq!(read_branch(dir.path(), "master"), detonation.tip().commit.to_hex());

    Ok(())
}

#[rstest]
fn seed_with_unparseable_author_is_extended(
    seeded_repository: (TempDir, Seed),
) -> Result<(), Box<dyn std::error::Error>> {
    let (dir, seed) = seeded_repository;

    let content = format!(
        "tree {}\nauthor nobody\ncommitter Some One <one@example.com> 1700000000 +99\n\nodd\n",
        seed.tree
    );
    let foreign = write_foreign_commit(dir.path(), content.as_bytes())?;

    let mut repository = Repository::new(dir.path(), Box::new(std::io::sink()))?;
    let detonation = repository.plant_bomb_with(1)?;

    assert_eq!(detonation.seed.commit, foreign);
    assert_eq!(read_branch(dir.path(), "master"), detonation.tip().commit.to_hex());

    Ok(())
}
