//! Hash-sharded object storage.
//!
//! Objects live at `objects/{first 2 hex chars}/{remaining 38 hex chars}`
//! and hold the zlib-compressed framed object.

use crate::codec;
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{self, ObjectHeader, ObjectType};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A content-addressed object directory.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    objects_dir: PathBuf,
}

impl ObjectStore {
    /// Create a store rooted at an `objects` directory.
    ///
    /// Nothing is touched on disk until an object is written.
    pub fn new<P: AsRef<Path>>(objects_dir: P) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
        }
    }

    /// Get the objects directory.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// Get the path to an object file given its hash.
    ///
    /// Returns: `objects/{prefix}/{suffix}`
    pub fn object_path(&self, hash: &Hash) -> PathBuf {
        self.objects_dir.join(hash.prefix()).join(hash.suffix())
    }

    /// Check whether an object file exists.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.object_path(hash).is_file()
    }

    /// Write compressed object bytes under `hash`.
    ///
    /// The shard directory is created on demand and the file is written
    /// atomically. An existing object file is left untouched, since identical
    /// hashes imply identical content.
    pub fn put(&self, hash: &Hash, compressed: &[u8]) -> Result<()> {
        let obj_path = self.object_path(hash);
        if obj_path.exists() {
            tracing::trace!(%hash, "object already present");
            return Ok(());
        }

        let shard_dir = self.objects_dir.join(hash.prefix());
        fs::create_dir_all(&shard_dir)
            .map_err(|e| Error::io_at("create directory", &shard_dir, e))?;

        let mut temp_file = tempfile::NamedTempFile::new_in(&shard_dir)
            .map_err(|e| Error::io_at("create temp file in", &shard_dir, e))?;
        temp_file
            .write_all(compressed)
            .map_err(|e| Error::io_at("write", &obj_path, e))?;
        temp_file
            .flush()
            .map_err(|e| Error::io_at("write", &obj_path, e))?;

        temp_file
            .persist(&obj_path)
            .map_err(|e| Error::io_at("persist", &obj_path, e.error))?;

        tracing::debug!(%hash, bytes = compressed.len(), "stored object");
        Ok(())
    }

    /// Read the compressed bytes of the object with the given hex id.
    ///
    /// The id must be exactly 40 characters; anything else fails with
    /// `InvalidHash` before the filesystem is consulted.
    pub fn get(&self, hash_hex: &str) -> Result<Vec<u8>> {
        let hash = Hash::from_hex(hash_hex)?;
        self.get_by_hash(&hash)
    }

    /// Read the compressed bytes of an object.
    pub fn get_by_hash(&self, hash: &Hash) -> Result<Vec<u8>> {
        let obj_path = self.object_path(hash);
        fs::read(&obj_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::object_not_found(hash.to_hex(), &obj_path),
            _ => Error::io_at("read object", &obj_path, e),
        })
    }

    /// Read and decompress an object, returning its framed bytes.
    pub fn read_framed(&self, hash: &Hash) -> Result<Vec<u8>> {
        let compressed = self.get_by_hash(hash)?;
        codec::decode(&compressed).map_err(|e| Error::decode(self.object_path(hash), e))
    }

    /// Frame, hash, compress and store a payload.
    ///
    /// Returns the hash of the stored object.
    pub fn write_object(&self, object_type: ObjectType, payload: &[u8]) -> Result<Hash> {
        let framed = object::frame(object_type, payload);
        let hash = Hash::hash_bytes(&framed);

        let compressed = codec::encode(&framed)
            .map_err(|e| Error::io_at("compress", self.object_path(&hash), e))?;
        self.put(&hash, &compressed)?;

        tracing::debug!(%hash, %object_type, size = payload.len(), "wrote object");
        Ok(hash)
    }

    /// Read an object and split it into its type and payload.
    ///
    /// A declared size that disagrees with the payload is logged, not
    /// rejected.
    pub fn read_object(&self, hash: &Hash) -> Result<(ObjectType, Vec<u8>)> {
        let framed = self.read_framed(hash)?;
        let (header, payload) = ObjectHeader::parse(&framed)?;

        if header.size != payload.len() as u64 {
            tracing::warn!(
                %hash,
                declared = header.size,
                actual = payload.len(),
                "object size does not match header"
            );
        }

        tracing::debug!(%hash, object_type = %header.object_type, "read object");
        Ok((header.object_type, payload.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, ObjectStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = ObjectStore::new(temp_dir.path().join("objects"));
        (temp_dir, store)
    }

    #[test]
    fn test_object_path_sharding() {
        let store = ObjectStore::new("/repo/.git/objects");
        let hash = Hash::from_hex("d670460b4b4aece5915caf5c68d12f560a9fe3e4").unwrap();
        assert_eq!(
            store.object_path(&hash),
            PathBuf::from("/repo/.git/objects/d6/70460b4b4aece5915caf5c68d12f560a9fe3e4")
        );
    }

    #[test]
    fn test_put_and_get() {
        let (_temp, store) = test_store();
        let hash = Hash::hash_bytes(b"anything");

        store.put(&hash, b"compressed bytes").unwrap();
        assert!(store.contains(&hash));
        assert!(store.objects_dir().join(hash.prefix()).is_dir());
        assert_eq!(store.get(&hash.to_hex()).unwrap(), b"compressed bytes");
    }

    #[test]
    fn test_put_existing_is_noop() {
        let (_temp, store) = test_store();
        let hash = Hash::hash_bytes(b"anything");

        store.put(&hash, b"first").unwrap();
        store.put(&hash, b"second").unwrap();
        assert_eq!(store.get_by_hash(&hash).unwrap(), b"first");
    }

    #[test]
    fn test_put_failure_names_path() {
        let (_temp, store) = test_store();
        let hash = Hash::hash_bytes(b"anything");

        // A regular file where the shard directory should go
        fs::create_dir_all(store.objects_dir()).unwrap();
        fs::write(store.objects_dir().join(hash.prefix()), b"not a dir").unwrap();

        match store.put(&hash, b"bytes") {
            Err(Error::IoAt { path, .. }) => {
                assert!(path.starts_with(store.objects_dir().join(hash.prefix())))
            }
            other => panic!("expected IoAt, got {:?}", other),
        }
    }

    #[test]
    fn test_get_invalid_hash_length() {
        let (_temp, store) = test_store();
        assert!(matches!(store.get("123"), Err(Error::InvalidHash { .. })));
        assert!(matches!(
            store.get(&"a".repeat(41)),
            Err(Error::InvalidHash { .. })
        ));
    }

    #[test]
    fn test_get_missing_object() {
        let (_temp, store) = test_store();
        let hash = Hash::hash_bytes(b"missing");
        assert!(matches!(
            store.get(&hash.to_hex()),
            Err(Error::ObjectNotFound { .. })
        ));
    }

    #[test]
    fn test_write_and_read_object() {
        let (_temp, store) = test_store();
        let hash = store.write_object(ObjectType::Blob, b"test content\n").unwrap();
        assert_eq!(hash.to_hex(), "d670460b4b4aece5915caf5c68d12f560a9fe3e4");

        let (object_type, payload) = store.read_object(&hash).unwrap();
        assert_eq!(object_type, ObjectType::Blob);
        assert_eq!(payload, b"test content\n");
    }

    #[test]
    fn test_stored_file_is_zlib_of_frame() {
        let (_temp, store) = test_store();
        let hash = store.write_object(ObjectType::Blob, b"hello").unwrap();

        let on_disk = fs::read(store.object_path(&hash)).unwrap();
        assert_eq!(codec::decode(&on_disk).unwrap(), b"blob 5\0hello");
    }

    #[test]
    fn test_read_corrupted_object() {
        let (_temp, store) = test_store();
        let hash = Hash::hash_bytes(b"corrupt");
        store.put(&hash, b"not a zlib stream").unwrap();

        assert!(matches!(
            store.read_object(&hash),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn test_write_is_deduplicated() {
        let (_temp, store) = test_store();
        let hash1 = store.write_object(ObjectType::Blob, b"same").unwrap();
        let hash2 = store.write_object(ObjectType::Blob, b"same").unwrap();
        assert_eq!(hash1, hash2);

        let shard: Vec<_> = fs::read_dir(store.objects_dir().join(hash1.prefix()))
            .unwrap()
            .collect();
        assert_eq!(shard.len(), 1);
    }
}
