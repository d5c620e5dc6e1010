//! Loose-object store
//!
//! Each object lives in its own zlib-compressed file at
//! `objects/<first-byte-hex>/<remaining-bytes-hex>`, holding the framed bytes
//! `<type> <size>\0<content>`. The path is a pure function of the content, so
//! writing the same object twice is harmless.

use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object::{self, Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).exists()
    }

    /// Store `content` as an object of type `object_type` and return its id
    ///
    /// `content` must already be in canonical form for its type.
    pub fn write(&self, object_type: ObjectType, content: &[u8]) -> anyhow::Result<ObjectId> {
        let object_id = object::hash_object(object_type, content);
        let object_path = self.object_path(&object_id);

        // the path is derived from the content, so an existing file already
        // holds these exact bytes
        if object_path.exists() {
            debug!(oid = %object_id, kind = %object_type, "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir).context(format!(
            "Unable to create object directory {}",
            object_dir.display()
        ))?;

        self.write_object(&object_path, object::frame(object_type, content))?;
        debug!(
            oid = %object_id,
            kind = %object_type,
            size = content.len(),
            path = %object_path.display(),
            "created object"
        );

        Ok(object_id)
    }

    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        self.write(object.object_type(), &object.serialize()?)
    }

    /// Read an object back as its type and canonical content
    pub fn read(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, Bytes)> {
        let object_path = self.object_path(object_id);
        let compressed = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        let framed = Self::decompress(&compressed)
            .with_context(|| format!("Unable to inflate object {}", object_id))?;

        object::unframe(framed).with_context(|| format!("Malformed object {}", object_id))
    }

    pub fn read_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let content = self.read_as(object_id, ObjectType::Commit)?;
        Commit::deserialize(&content)
            .with_context(|| format!("Unable to parse commit {}", object_id))
    }

    /// Read only the tree and parents of a commit
    pub fn read_slim_commit(&self, object_id: &ObjectId) -> anyhow::Result<SlimCommit> {
        let content = self.read_as(object_id, ObjectType::Commit)?;
        SlimCommit::deserialize(&content)
            .with_context(|| format!("Unable to parse commit {}", object_id))
    }

    pub fn read_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        let content = self.read_as(object_id, ObjectType::Tree)?;
        Tree::deserialize(&content)
            .with_context(|| format!("Unable to parse tree {}", object_id))
    }

    fn read_as(&self, object_id: &ObjectId, expected: ObjectType) -> anyhow::Result<Bytes> {
        let (object_type, content) = self.read(object_id)?;
        if object_type != expected {
            anyhow::bail!(
                "Object {} is a {}, expected a {}",
                object_id,
                object_type,
                expected
            );
        }

        Ok(content)
    }

    fn write_object(&self, object_path: &Path, framed: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let compressed = Self::compress(&framed)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        let written = file.write_all(&compressed);
        drop(file);

        // rename the temp file to the object file to make it atomic
        let stored = written
            .context(format!(
                "Unable to write object file {}",
                temp_object_path.display()
            ))
            .and_then(|_| {
                std::fs::rename(&temp_object_path, object_path).context(format!(
                    "Unable to rename object file to {}",
                    object_path.display()
                ))
            });

        if stored.is_err() {
            let _ = std::fs::remove_file(&temp_object_path);
        }

        stored
    }

    fn compress(data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
