//! Repository handle: layout initialization and object commands.

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{self, ObjectType};
use crate::store::ObjectStore;
use crate::tree::{self, TreeEntry};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the metadata directory inside a working tree.
pub const GIT_DIR: &str = ".git";

/// Contents written to `HEAD` on initialization.
pub const DEFAULT_HEAD: &str = "ref: refs/heads/master\n";

/// A repository rooted at a working-tree directory.
///
/// Objects live under `<root>/.git/objects`.
#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    store: ObjectStore,
    initialized: bool,
}

impl Repository {
    /// Create a handle for `root` without touching the filesystem.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let store = ObjectStore::new(root.join(GIT_DIR).join("objects"));
        Self {
            root,
            store,
            initialized: false,
        }
    }

    /// Open an existing repository.
    ///
    /// Validates that the objects directory is present.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let repo = Self::new(root);

        if !repo.store.objects_dir().is_dir() {
            return Err(Error::invalid_repository(
                &repo.root,
                format!("{} not found", repo.store.objects_dir().display()),
            ));
        }

        Ok(repo)
    }

    /// Initialize the repository layout.
    ///
    /// Creates:
    /// - `.git/objects/` for storing objects
    /// - `.git/refs/` for references
    /// - `.git/HEAD` pointing at the default branch
    ///
    /// A second call on the same handle fails with `AlreadyInitialized` and
    /// leaves the existing files alone.
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Err(Error::already_initialized(&self.root));
        }

        let git_dir = self.git_dir();
        for dir in [git_dir.clone(), git_dir.join("objects"), git_dir.join("refs")] {
            fs::create_dir_all(&dir).map_err(|e| Error::io_at("create directory", &dir, e))?;
        }

        let head_path = git_dir.join("HEAD");
        fs::write(&head_path, DEFAULT_HEAD).map_err(|e| Error::io_at("write", &head_path, e))?;

        self.initialized = true;
        tracing::info!(root = %self.root.display(), "initialized repository");
        Ok(())
    }

    /// Get the working-tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the `.git` directory.
    pub fn git_dir(&self) -> PathBuf {
        self.root.join(GIT_DIR)
    }

    /// Get the object store.
    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Read an object by hex id, returning its type and payload.
    pub fn read_object(&self, hash_hex: &str) -> Result<(ObjectType, Vec<u8>)> {
        let hash = Hash::from_hex(hash_hex)?;
        self.store.read_object(&hash)
    }

    /// Return the full content of a blob.
    ///
    /// Everything after the header's null byte is returned, including any
    /// null bytes inside the content.
    pub fn cat_file(&self, hash_hex: &str) -> Result<Vec<u8>> {
        match self.read_object(hash_hex)? {
            (ObjectType::Blob, payload) => Ok(payload),
            (other, _) => Err(Error::type_mismatch(
                ObjectType::Blob.as_str(),
                other.as_str(),
            )),
        }
    }

    /// Parse a stored tree into its entries, in stored order.
    pub fn tree_entries(&self, hash_hex: &str) -> Result<Vec<TreeEntry>> {
        match self.read_object(hash_hex)? {
            (ObjectType::Tree, payload) => tree::decode_tree(&payload),
            (other, _) => Err(Error::type_mismatch(
                ObjectType::Tree.as_str(),
                other.as_str(),
            )),
        }
    }

    /// List the entry names of a stored tree.
    ///
    /// Names are sorted bytewise and newline-terminated.
    pub fn read_tree(&self, hash_hex: &str) -> Result<Vec<u8>> {
        let entries = self.tree_entries(hash_hex)?;
        Ok(tree::name_listing(&entries))
    }

    /// Compute the blob hash of a file without storing it.
    pub fn hash_blob(&self, path: &Path) -> Result<Hash> {
        let content = read_file(path)?;
        Ok(object::hash_object(ObjectType::Blob, &content))
    }

    /// Store the content of a file as a blob.
    pub fn write_blob(&self, path: &Path) -> Result<Hash> {
        let content = read_file(path)?;
        self.store.write_object(ObjectType::Blob, &content)
    }

    /// Store in-memory bytes as a blob.
    pub fn write_blob_bytes(&self, content: &[u8]) -> Result<Hash> {
        self.store.write_object(ObjectType::Blob, content)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io_at("read", path, e))
}
