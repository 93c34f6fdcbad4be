//! # minigit core
//!
//! A minimal git-compatible content-addressed object store.
//!
//! File contents and directory structure are stored as immutable objects
//! addressed by the SHA-1 of their framed bytes (`<type> <size>\0<payload>`),
//! zlib-compressed under `.git/objects/{2 hex chars}/{38 hex chars}`.
//!
//! ## Features
//!
//! - Blob and tree objects, byte-compatible with git
//! - Recursive tree creation from a directory
//! - Tree parsing with explicit truncation errors
//! - Atomic, deduplicated object writes
//!
//! ## Example
//!
//! ```no_run
//! use minigit_core::Repository;
//! use std::io::Write;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Initialize a new repository
//! let mut repo = Repository::new("./work");
//! repo.init()?;
//!
//! // Store a file and read it back
//! let blob = repo.write_blob(Path::new("./work/README.md"))?;
//! let content = repo.cat_file(&blob.to_hex())?;
//!
//! // Store the whole working tree and list its top-level entries
//! let tree = repo.write_tree(Path::new("./work"))?;
//! std::io::stdout().write_all(&repo.read_tree(&tree.to_hex())?)?;
//! # let _ = content;
//! # Ok(())
//! # }
//! ```

pub mod codec;
mod cursor;
mod error;
mod hash;
mod object;
mod repository;
mod store;
mod tree;
mod walk;

pub use error::{Error, Result};
pub use hash::{HASH_SIZE, HEX_LEN, Hash};
pub use object::{ObjectHeader, ObjectType, frame, hash_object};
pub use repository::{DEFAULT_HEAD, GIT_DIR, Repository};
pub use store::ObjectStore;
pub use tree::{FileMode, TreeEntry, decode_tree, encode_tree, file_modes, name_listing};
