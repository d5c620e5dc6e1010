//! Git tree object
//!
//! Trees are directory listings: each entry names a child object together with
//! its mode.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! ## Ordering
//!
//! Entries are serialized in git's canonical order, which compares directory
//! names as if they ended with `/`. Entries are keyed that way internally, so
//! serialization never depends on the order in which entries were added.

use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// A single `<mode> <name>\0<oid>` record
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: String,
    pub oid: ObjectId,
}

impl TreeEntry {
    fn sort_key(&self) -> String {
        if self.mode.is_tree() {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }

    fn write_to(&self, writer: &mut impl Write) -> anyhow::Result<()> {
        write!(writer, "{} {}", self.mode.as_str(), self.name)?;
        writer.write_all(&[0])?;
        self.oid.write_raw_to(writer)
    }
}

/// Git tree object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    /// Build a tree of `fanout` subdirectories that all point at `child`
    ///
    /// Entry `i` is named `label_for(i)`. Every entry shares the same child
    /// oid, so the tree adds a single object to the store while multiplying the
    /// number of paths below it by `fanout`.
    pub fn fanout(
        child: ObjectId,
        fanout: usize,
        label_for: impl Fn(usize) -> String,
    ) -> anyhow::Result<Self> {
        let mut tree = Self::default();

        for i in 0..fanout {
            tree.add_entry(TreeEntry::new(EntryMode::Directory, label_for(i), child))?;
        }

        Ok(tree)
    }

    /// Add an entry, rejecting names git would refuse and duplicates
    pub fn add_entry(&mut self, entry: TreeEntry) -> anyhow::Result<()> {
        if entry.name.is_empty() || entry.name.contains(['/', '\0']) {
            anyhow::bail!("Invalid tree entry name: {:?}", entry.name);
        }

        let duplicate = self.entries.contains_key(&entry.name)
            || self.entries.contains_key(&format!("{}/", entry.name));
        if duplicate {
            anyhow::bail!("Duplicate tree entry name: {}", entry.name);
        }

        self.entries.insert(entry.sort_key(), entry);
        Ok(())
    }

    /// Entries in canonical order
    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content = Vec::new();
        for entry in self.entries() {
            entry.write_to(&mut content)?;
        }

        Ok(Bytes::from(content))
    }
}

impl Unpackable for Tree {
    fn deserialize(content: &[u8]) -> anyhow::Result<Self> {
        let mut tree = Self::default();
        let mut reader = content;

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            // Read "mode " (space-delimited)
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                anyhow::bail!("unexpected EOF in mode");
            }
            let mode = EntryMode::from_octal_str(std::str::from_utf8(&mode_bytes)?)?;

            // Read "name\0"
            name_bytes.clear();
            reader.read_until(b'\0', &mut name_bytes)?;
            if name_bytes.pop() != Some(b'\0') {
                anyhow::bail!("unexpected EOF in name");
            }
            let name = String::from_utf8(name_bytes.clone())?;

            let oid = ObjectId::read_raw_from(&mut reader).context("unexpected EOF in object id")?;

            tree.add_entry(TreeEntry::new(mode, name, oid))?;
        }

        Ok(tree)
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}
