//! Git references
//!
//! Only two kinds of ref are touched:
//! - HEAD, to learn which branch is checked out (`ref: refs/heads/<name>`)
//! - the branch ref itself, a file holding the 40-character hex id of the tip
//!
//! ## Updates
//!
//! A branch is moved by writing the new id to `<ref>.lock`, created
//! exclusively, and renaming it over the ref. Readers see either the old or
//! the new id, never a partial write, and a concurrent git process holding the
//! lock makes the update fail instead of racing it.

use crate::artifacts::branch::DEFAULT_BRANCH;
use crate::artifacts::branch::branch_name::{BranchName, SymRefName};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

const LOCK_SUFFIX: &str = ".lock";

/// References manager rooted at the git directory
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the git directory (typically `.git`)
    path: Box<Path>,
}

/// Contents of a ref file
#[derive(Debug, Clone, PartialEq, Eq)]
enum SymRefOrOid {
    SymRef { sym_ref_name: SymRefName },
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn parse(content: &str) -> anyhow::Result<SymRefOrOid> {
        let content = content.trim();

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(SymRefOrOid::SymRef {
                sym_ref_name: SymRefName::new(symref_match[1].trim().to_string()),
            })
        } else {
            Ok(SymRefOrOid::Oid(ObjectId::try_parse(content)?))
        }
    }
}

impl Refs {
    /// Branch HEAD points at, or `master` when HEAD is missing or detached
    pub fn primary_branch(&self) -> anyhow::Result<BranchName> {
        let head_path = self.head_path();
        if !head_path.exists() {
            return BranchName::try_parse(DEFAULT_BRANCH.to_string());
        }

        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read HEAD at {:?}", head_path))?;

        match SymRefOrOid::parse(&content) {
            Ok(SymRefOrOid::SymRef { sym_ref_name }) => {
                BranchName::try_parse_sym_ref_name(&sym_ref_name)
            }
            Ok(SymRefOrOid::Oid(_)) | Err(_) => {
                BranchName::try_parse(DEFAULT_BRANCH.to_string())
            }
        }
    }

    /// Commit the branch currently points at
    ///
    /// Fails if the ref file is missing or does not hold a full hex object id.
    pub fn read_head(&self, branch: &BranchName) -> anyhow::Result<ObjectId> {
        let ref_path = self.branch_path(branch);
        let content = std::fs::read_to_string(&ref_path)
            .with_context(|| format!("failed to read ref file at {:?}", ref_path))?;

        match SymRefOrOid::parse(&content)
            .with_context(|| format!("malformed ref file at {:?}", ref_path))?
        {
            SymRefOrOid::Oid(oid) => Ok(oid),
            SymRefOrOid::SymRef { sym_ref_name } => anyhow::bail!(
                "branch {} is a symbolic ref to {}",
                branch,
                sym_ref_name.as_ref_path()
            ),
        }
    }

    /// Point the branch at `oid`, replacing the ref file atomically
    pub fn update_head(&self, branch: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        let ref_path = self.branch_path(branch);
        self.update_ref_file(&ref_path, &format!("{}\n", oid))?;
        debug!(branch = %branch, oid = %oid, "updated ref");

        Ok(())
    }

    fn update_ref_file(&self, path: &Path, raw_ref: &str) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .with_context(|| format!("invalid ref path {:?}", path))?;
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create parent directories for ref file at {:?}", path)
        })?;

        let mut lock_path = path.as_os_str().to_owned();
        lock_path.push(LOCK_SUFFIX);
        let lock_path = PathBuf::from(lock_path);

        let mut lock_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .with_context(|| format!("failed to lock ref file at {:?}", lock_path))?;

        let written = lock_file
            .write_all(raw_ref.as_bytes())
            .and_then(|_| lock_file.sync_all());
        drop(lock_file);

        if let Err(e) = written {
            let _ = std::fs::remove_file(&lock_path);
            return Err(e).with_context(|| format!("failed to write ref file at {:?}", lock_path));
        }

        if let Err(e) = std::fs::rename(&lock_path, path) {
            let _ = std::fs::remove_file(&lock_path);
            return Err(e)
                .with_context(|| format!("failed to move {:?} into place at {:?}", lock_path, path));
        }

        Ok(())
    }

    pub fn branch_path(&self, branch: &BranchName) -> PathBuf {
        self.path.join(branch.ref_path())
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }
}
