//! Object framing.
//!
//! Every object is hashed and stored in its framed form:
//!
//! ```text
//! <type> <size>\0<payload>
//! ```
//!
//! `type` is `blob` or `tree`, `size` is the decimal byte length of
//! `payload`. The object hash is the SHA-1 of the complete framed bytes, so
//! the same payload framed as a blob and as a tree yields different hashes.

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::hash::Hash;
use std::fmt;

/// Object types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// A blob (file content).
    Blob,
    /// A tree (directory structure).
    Tree,
}

impl ObjectType {
    /// Get the type tag used in the object header.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
        }
    }

    /// Parse a type tag.
    pub fn parse(tag: &[u8]) -> Result<Self> {
        match tag {
            b"blob" => Ok(ObjectType::Blob),
            b"tree" => Ok(ObjectType::Tree),
            other => Err(Error::type_mismatch(
                "blob or tree",
                String::from_utf8_lossy(other),
            )),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `<type> <size>\0` prefix of a framed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHeader {
    /// Object type.
    pub object_type: ObjectType,
    /// Declared payload length in bytes.
    pub size: u64,
}

impl ObjectHeader {
    /// Create a header describing `payload`.
    pub fn for_payload(object_type: ObjectType, payload: &[u8]) -> Self {
        Self {
            object_type,
            size: payload.len() as u64,
        }
    }

    /// Encode the header, including the trailing null byte.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = format!("{} {}", self.object_type.as_str(), self.size).into_bytes();
        buf.push(0);
        buf
    }

    /// Split framed bytes into the header and the payload that follows it.
    ///
    /// The declared size is returned as-is and not checked against the
    /// payload length.
    pub fn parse(framed: &[u8]) -> Result<(Self, &[u8])> {
        let mut cursor = ByteCursor::new(framed);

        let tag = cursor
            .read_until(b' ')
            .ok_or_else(|| Error::malformed("missing space after object type"))?;
        let object_type = ObjectType::parse(tag)?;

        let size = cursor
            .read_until(0)
            .ok_or_else(|| Error::malformed("missing null byte after object size"))?;
        let size = parse_size(size)?;

        Ok((Self { object_type, size }, cursor.rest()))
    }
}

fn parse_size(digits: &[u8]) -> Result<u64> {
    std::str::from_utf8(digits)
        .ok()
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| {
            Error::malformed(format!(
                "invalid object size: {:?}",
                String::from_utf8_lossy(digits)
            ))
        })
}

/// Frame a payload as `<type> <size>\0<payload>`.
///
/// The whole object is buffered in memory.
pub fn frame(object_type: ObjectType, payload: &[u8]) -> Vec<u8> {
    let header = ObjectHeader::for_payload(object_type, payload).encode();
    let mut framed = Vec::with_capacity(header.len() + payload.len());
    framed.extend_from_slice(&header);
    framed.extend_from_slice(payload);
    framed
}

/// Compute the object hash of a payload of the given type.
pub fn hash_object(object_type: ObjectType, payload: &[u8]) -> Hash {
    Hash::hash_bytes(&frame(object_type, payload))
}
