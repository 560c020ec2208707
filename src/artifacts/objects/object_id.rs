//! Object identifier (SHA-1 digest)
//!
//! Object ids are 40-character hexadecimal strings uniquely identifying
//! stored objects (blobs and commits). The digest is computed over our own
//! serialization envelope, so it is deterministic and collision-resistant for
//! practical purposes, but it is an opaque identifier, not a byte-exact Git
//! hash.
//!
//! ## Storage
//!
//! Objects are stored in `objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use std::path::PathBuf;

/// Content digest identifying a stored object
///
/// A 40-character hexadecimal string. Implements parsing, validation, and
/// conversion to the fan-out storage path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object id from a string
    ///
    /// # Returns
    ///
    /// Validated ObjectId or error if invalid length/characters
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object id length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid object id characters: {}", id));
        }
        Ok(Self(id.to_string()))
    }

    /// Whether a string has the shape of a full object id
    pub fn looks_like_oid(s: &str) -> bool {
        s.len() == OBJECT_ID_LENGTH && s.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Convert to file system path for object storage
    ///
    /// Splits the digest as `XX/YYYYYY...` where XX is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// Get abbreviated form of the object id (first 7 characters)
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_valid_oids_parse(oid in "[0-9a-f]{40}") {
            prop_assert!(ObjectId::try_parse(oid.clone()).is_ok());
            prop_assert!(ObjectId::looks_like_oid(&oid));
        }

        #[test]
        fn test_wrong_length_is_rejected(oid in "[0-9a-f]{1,39}") {
            prop_assert!(ObjectId::try_parse(oid).is_err());
        }
    }

    #[test]
    fn test_non_hex_is_rejected() {
        assert!(ObjectId::try_parse("g".repeat(40)).is_err());
    }

    #[test]
    fn test_to_path_fans_out_on_first_two_chars() {
        let oid = ObjectId::try_parse(format!("ab{}", "c".repeat(38))).unwrap();
        assert_eq!(oid.to_path(), PathBuf::from("ab").join("c".repeat(38)));
    }
}
