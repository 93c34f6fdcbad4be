//! Directory walking and tree creation.

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::ObjectType;
use crate::repository::{GIT_DIR, Repository};
use crate::tree::{self, TreeEntry, file_modes};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

impl Repository {
    /// Store a directory recursively as a tree.
    ///
    /// Every file becomes a blob and every subdirectory a subtree; all of
    /// them are written to the store. The `.git` directory is skipped at
    /// every level. Returns the hash of the root tree.
    pub fn write_tree(&self, dir: &Path) -> Result<Hash> {
        let mut entries = Vec::new();

        // Only immediate children, with all ignore-file filtering disabled
        let walker = ignore::WalkBuilder::new(dir)
            .max_depth(Some(1))
            .standard_filters(false)
            .build();

        for entry in walker {
            let entry = entry?;
            let entry_path = entry.path();

            // Skip the directory itself
            if entry.depth() == 0 {
                continue;
            }

            if entry.file_name() == GIT_DIR {
                continue;
            }
            let file_name = name_bytes(entry.file_name(), entry_path)?;

            // Stat the entry itself; symlinks are not followed
            let metadata = fs::symlink_metadata(entry_path)
                .map_err(|e| Error::io_at("stat", entry_path, e))?;
            let file_type = metadata.file_type();

            if file_type.is_symlink() {
                tracing::warn!(path = %entry_path.display(), "skipping symbolic link");
            } else if file_type.is_dir() {
                let hash = self.write_tree(entry_path)?;
                entries.push(TreeEntry::new(file_modes::DIRECTORY, file_name, hash)?);
            } else if file_type.is_file() {
                let hash = self.write_blob(entry_path)?;
                entries.push(TreeEntry::new(get_file_mode(&metadata), file_name, hash)?);
            } else {
                tracing::warn!(path = %entry_path.display(), "skipping unsupported file type");
            }
        }

        let payload = tree::encode_tree(entries);
        let hash = self.store().write_object(ObjectType::Tree, &payload)?;
        tracing::debug!(%hash, dir = %dir.display(), "wrote tree");
        Ok(hash)
    }
}

/// Raw bytes of a directory entry name.
#[cfg(unix)]
fn name_bytes(name: &OsStr, _path: &Path) -> Result<Vec<u8>> {
    use std::os::unix::ffi::OsStrExt;

    Ok(name.as_bytes().to_vec())
}

/// Name bytes on platforms without byte-oriented file names.
#[cfg(not(unix))]
fn name_bytes(name: &OsStr, path: &Path) -> Result<Vec<u8>> {
    name.to_str()
        .map(|s| s.as_bytes().to_vec())
        .ok_or_else(|| {
            Error::invalid_tree_entry(format!("Invalid filename: {}", path.display()))
        })
}

/// Get the file mode from metadata.
#[cfg(unix)]
fn get_file_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    if metadata.permissions().mode() & 0o111 != 0 {
        file_modes::EXECUTABLE
    } else {
        file_modes::REGULAR
    }
}

/// Get the file mode from metadata (non-Unix fallback).
#[cfg(not(unix))]
fn get_file_mode(_metadata: &fs::Metadata) -> u32 {
    file_modes::REGULAR
}
