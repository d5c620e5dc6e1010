use crate::artifacts::objects::OBJECT_ID_RAW_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::{Context, Result};
use bytes::{BufMut, Bytes, BytesMut};
use sha1::{Digest, Sha1};

/// Canonical content of an object, without the `<type> <size>\0` header
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Decode an object from its canonical content (header already stripped)
pub trait Unpackable {
    fn deserialize(content: &[u8]) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn object_id(&self) -> Result<ObjectId> {
        Ok(hash_object(self.object_type(), &self.serialize()?))
    }
}

/// Prepend the canonical header to `content`
pub fn frame(object_type: ObjectType, content: &[u8]) -> Bytes {
    let header = object_type.header(content.len());
    let mut framed = BytesMut::with_capacity(header.len() + content.len());
    framed.put_slice(header.as_bytes());
    framed.put_slice(content);
    framed.freeze()
}

/// SHA-1 of the framed object
pub fn hash_object(object_type: ObjectType, content: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(object_type.header(content.len()).as_bytes());
    hasher.update(content);

    let mut raw = [0u8; OBJECT_ID_RAW_LENGTH];
    raw.copy_from_slice(&hasher.finalize());

    ObjectId::from_raw(raw)
}

/// Split framed bytes into type and content, validating the declared size
pub fn unframe(framed: Bytes) -> Result<(ObjectType, Bytes)> {
    let nul = framed
        .iter()
        .position(|&b| b == 0)
        .context("Invalid object: missing header terminator")?;
    let header =
        std::str::from_utf8(&framed[..nul]).context("Invalid object: header is not UTF-8")?;

    let (object_type, size) = header
        .split_once(' ')
        .with_context(|| format!("Invalid object header: {:?}", header))?;
    let object_type = ObjectType::try_from(object_type)?;
    let size = size
        .parse::<usize>()
        .with_context(|| format!("Invalid object size: {:?}", size))?;

    let content = framed.slice(nul + 1..);
    if content.len() != size {
        anyhow::bail!(
            "Object size mismatch: header declares {} bytes, found {}",
            size,
            content.len()
        );
    }

    Ok((object_type, content))
}
