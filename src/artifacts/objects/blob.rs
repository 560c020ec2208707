//! Blob object
//!
//! Blobs store one file version's content. They carry only the raw data;
//! paths live in commit change lists, so identical content shared by several
//! paths or commits is stored once per repository.
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// Content-addressed file content
///
/// Each unique file content is stored as a blob, identified by the SHA-1
/// digest of its envelope. Putting the same content twice yields the same
/// digest.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    /// File content
    content: String,
}

impl Blob {
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Content size in bytes
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content_bytes = self.content.as_bytes();

        let mut blob_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        blob_bytes.write_all(header.as_bytes())?;
        blob_bytes.write_all(content_bytes)?;

        Ok(Bytes::from(blob_bytes))
    }
}

impl Unpackable for Blob {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;
        Ok(Self::new(content))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn display(&self) -> String {
        self.content.to_string()
    }
}
