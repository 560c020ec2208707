use crate::artifacts::core::{Error, Result};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Content-addressed object store of one repository
///
/// Objects live in `objects/<2-hex>/<38-hex>`, zlib-compressed, written via
/// temp file + atomic rename. An object file, once in place, is immutable;
/// storing the same content again is a no-op, which makes blob `put`
/// idempotent by construction.
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    /// Store an object unless it already exists; returns its digest
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            std::fs::create_dir_all(
                object_path
                    .parent()
                    .context(format!("Invalid object path {}", object_path.display()))?,
            )
            .context(format!(
                "Unable to create object directory {}",
                object_path.display()
            ))?;

            self.write_object(object_path, object.serialize()?)?;
        }

        Ok(object_id)
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    /// Load a blob by digest, regardless of which commit/path references it
    pub fn load_blob(&self, object_id: &ObjectId) -> Result<Blob> {
        match self.parse_object(object_id)? {
            ObjectBox::Blob(blob) => Ok(*blob),
            ObjectBox::Commit(_) => Err(Error::not_found(format!(
                "blob {} not found",
                object_id.to_short_oid()
            ))),
        }
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> Result<Commit> {
        match self.parse_object(object_id)? {
            ObjectBox::Commit(commit) => Ok(*commit),
            ObjectBox::Blob(_) => Err(Error::not_found(format!(
                "commit {} not found",
                object_id.to_short_oid()
            ))),
        }
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(
                Blob::deserialize(object_reader).map_err(Error::Storage)?,
            ))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(
                Commit::deserialize(object_reader).map_err(Error::Storage)?,
            ))),
        }
    }

    fn parse_object_as_bytes(&self, object_id: &ObjectId) -> Result<(ObjectType, impl BufRead)> {
        let object_path = self.path.join(object_id.to_path());
        if !object_path.exists() {
            return Err(Error::not_found(format!(
                "object {} not found",
                object_id.to_short_oid()
            )));
        }

        let object_content = self.read_object(object_path)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type =
            ObjectType::parse_object_type(&mut object_reader).map_err(Error::Storage)?;

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_path: PathBuf) -> Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Ok(Self::decompress(object_content.into())?)
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
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
