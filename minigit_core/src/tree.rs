//! Tree encoding and parsing.
//!
//! A tree payload is a sequence of unterminated records:
//!
//! ```text
//! <mode as octal ascii> <name>\0<20-byte raw hash>
//! ```
//!
//! The hash field is binary and may itself contain null bytes, so it is
//! always consumed as exactly 20 bytes rather than scanned for a delimiter.

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::hash::{HASH_SIZE, Hash};
use crate::object::ObjectType;
use std::borrow::Cow;
use std::cmp::Ordering;

/// File mode as stored in a tree entry.
pub type FileMode = u32;

/// Common file modes.
pub mod file_modes {
    use super::FileMode;

    /// Regular file (non-executable).
    pub const REGULAR: FileMode = 0o100644;

    /// Executable file.
    pub const EXECUTABLE: FileMode = 0o100755;

    /// Directory.
    pub const DIRECTORY: FileMode = 0o40000;
}

/// An entry in a tree (file or subdirectory).
///
/// Mode and name are kept as the raw bytes found in the payload, so any
/// well-framed tree can be read back even if it was not written here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Mode field as octal ASCII digits.
    pub mode: Vec<u8>,
    /// Base name of the entry.
    pub name: Vec<u8>,
    /// Hash of the referenced object.
    pub hash: Hash,
}

impl TreeEntry {
    /// Create a new tree entry for writing.
    pub fn new(mode: FileMode, name: impl Into<Vec<u8>>, hash: Hash) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(Error::invalid_tree_entry("Name cannot be empty"));
        }

        if name.contains(&0) {
            return Err(Error::invalid_tree_entry("Name cannot contain null bytes"));
        }

        if name.contains(&b'/') {
            return Err(Error::invalid_tree_entry(format!(
                "Name cannot contain path separators: {}",
                String::from_utf8_lossy(&name)
            )));
        }

        Ok(Self {
            mode: format!("{:o}", mode).into_bytes(),
            name,
            hash,
        })
    }

    /// Numeric mode, if the mode field is valid octal.
    pub fn file_mode(&self) -> Option<FileMode> {
        std::str::from_utf8(&self.mode)
            .ok()
            .filter(|s| !s.is_empty())
            .and_then(|s| FileMode::from_str_radix(s, 8).ok())
    }

    /// Name for display; invalid UTF-8 is replaced.
    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Whether this entry references a subtree.
    pub fn is_tree(&self) -> bool {
        self.file_mode() == Some(file_modes::DIRECTORY)
    }

    /// Type of the referenced object.
    pub fn object_type(&self) -> ObjectType {
        if self.is_tree() {
            ObjectType::Tree
        } else {
            ObjectType::Blob
        }
    }

    /// Encode the entry as `<mode> <name>\0<raw hash>`.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.mode.len() + self.name.len() + 2 + HASH_SIZE);
        buf.extend_from_slice(&self.mode);
        buf.push(b' ');
        buf.extend_from_slice(&self.name);
        buf.push(0);
        buf.extend_from_slice(self.hash.as_bytes());
        buf
    }

    /// Decode one entry at the cursor.
    ///
    /// Mode and name are taken as-is; only running out of bytes is an error.
    fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let start = cursor.position();

        let mode = cursor.read_until(b' ').ok_or_else(|| {
            Error::truncated(format!("entry at offset {} has no mode terminator", start))
        })?;

        let name = cursor.read_until(0).ok_or_else(|| {
            Error::truncated(format!("entry at offset {} has no name terminator", start))
        })?;

        let hash = cursor.read_exact(HASH_SIZE).ok_or_else(|| {
            Error::truncated(format!(
                "entry {:?} is missing its {}-byte hash",
                String::from_utf8_lossy(name),
                HASH_SIZE
            ))
        })?;
        let mut hash_bytes = [0u8; HASH_SIZE];
        hash_bytes.copy_from_slice(hash);

        Ok(Self {
            mode: mode.to_vec(),
            name: name.to_vec(),
            hash: Hash::from_bytes(hash_bytes),
        })
    }

    /// Name used for canonical ordering: directories sort as if they had a
    /// trailing `/`.
    fn sort_key(&self) -> impl Iterator<Item = u8> + '_ {
        let suffix = self.is_tree().then_some(b'/');
        self.name.iter().copied().chain(suffix)
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    /// Compare in canonical tree order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(other.sort_key())
            .then_with(|| self.mode.cmp(&other.mode))
            .then_with(|| self.hash.as_bytes().cmp(other.hash.as_bytes()))
    }
}

/// Encode a list of tree entries in canonical order.
pub fn encode_tree(mut entries: Vec<TreeEntry>) -> Vec<u8> {
    entries.sort();

    let mut buf = Vec::new();
    for entry in entries {
        buf.extend_from_slice(&entry.encode());
    }
    buf
}

/// Decode a tree payload into its entries, in stored order.
///
/// Parsing stops when no byte is left to peek at; running out of bytes
/// inside an entry is a `TruncatedPayload` error.
pub fn decode_tree(payload: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut cursor = ByteCursor::new(payload);
    let mut entries = Vec::new();

    while cursor.peek().is_some() {
        let entry = TreeEntry::decode(&mut cursor)?;
        tracing::trace!(name = %entry.display_name(), "parsed tree entry");
        entries.push(entry);
    }

    Ok(entries)
}

/// Render entry names sorted bytewise, one per line with a trailing newline.
pub fn name_listing(entries: &[TreeEntry]) -> Vec<u8> {
    let mut names: Vec<&[u8]> = entries.iter().map(|e| e.name.as_slice()).collect();
    names.sort_unstable();

    let mut listing = Vec::new();
    for name in names {
        listing.extend_from_slice(name);
        listing.push(b'\n');
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(name: &str) -> TreeEntry {
        TreeEntry::new(file_modes::REGULAR, name, Hash::hash_bytes(name.as_bytes())).unwrap()
    }

    fn dir(name: &str) -> TreeEntry {
        TreeEntry::new(file_modes::DIRECTORY, name, Hash::hash_bytes(name.as_bytes())).unwrap()
    }

    #[test]
    fn test_entry_encode_layout() {
        let hash = Hash::from_bytes([0xab; HASH_SIZE]);
        let entry = TreeEntry::new(file_modes::REGULAR, "a.txt", hash).unwrap();

        let mut expected = b"100644 a.txt\0".to_vec();
        expected.extend_from_slice(&[0xab; HASH_SIZE]);
        assert_eq!(entry.encode(), expected);

        let subdir = TreeEntry::new(file_modes::DIRECTORY, "src", hash).unwrap();
        assert!(subdir.encode().starts_with(b"40000 src\0"));
    }

    #[test]
    fn test_entry_name_validation() {
        let hash = Hash::hash_bytes(b"test");
        assert!(TreeEntry::new(file_modes::REGULAR, "", hash).is_err());
        assert!(TreeEntry::new(file_modes::REGULAR, "a/b", hash).is_err());
        assert!(TreeEntry::new(file_modes::REGULAR, "test\0file", hash).is_err());
    }

    #[test]
    fn test_canonical_order_directories_sort_with_slash() {
        // "foo" as a directory compares as "foo/", which sorts after "foo.txt"
        let encoded = encode_tree(vec![dir("foo"), blob("foo.txt"), blob("bar")]);
        let decoded = decode_tree(&encoded).unwrap();
        let names: Vec<_> = decoded.iter().map(|e| e.display_name()).collect();
        assert_eq!(names, vec!["bar", "foo.txt", "foo"]);
    }

    #[test]
    fn test_decode_hash_with_null_bytes() {
        let hash = Hash::from_bytes([0u8; HASH_SIZE]);
        let entries = vec![
            TreeEntry::new(file_modes::REGULAR, "zeros", hash).unwrap(),
            blob("after"),
        ];
        let decoded = decode_tree(&encode_tree(entries)).unwrap();
        assert_eq!(decoded.len(), 2);
        let zeros = decoded.iter().find(|e| e.name == b"zeros").unwrap();
        assert_eq!(zeros.hash, hash);
    }

    #[test]
    fn test_empty_tree() {
        let encoded = encode_tree(Vec::new());
        assert!(encoded.is_empty());
        assert!(decode_tree(&encoded).unwrap().is_empty());
        assert!(name_listing(&[]).is_empty());
    }

    #[test]
    fn test_decode_truncated_hash() {
        let mut encoded = blob("file").encode();
        encoded.truncate(encoded.len() - 1);
        assert!(matches!(
            decode_tree(&encoded),
            Err(Error::TruncatedPayload { .. })
        ));
    }

    #[test]
    fn test_decode_truncated_name() {
        assert!(matches!(
            decode_tree(b"100644 no-terminator"),
            Err(Error::TruncatedPayload { .. })
        ));
        assert!(matches!(
            decode_tree(b"100644"),
            Err(Error::TruncatedPayload { .. })
        ));
    }

    #[test]
    fn test_decode_keeps_raw_mode_and_name() {
        let mut payload = b"10x644 caf\xe9\0".to_vec();
        payload.extend_from_slice(&[1u8; HASH_SIZE]);

        let decoded = decode_tree(&payload).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].mode, b"10x644");
        assert_eq!(decoded[0].name, b"caf\xe9");
        assert_eq!(decoded[0].file_mode(), None);
        assert_eq!(decoded[0].object_type(), ObjectType::Blob);

        // Re-encoding reproduces the stored bytes
        assert_eq!(decoded[0].encode(), payload);
    }

    #[test]
    fn test_directory_mode_with_leading_zero() {
        let mut payload = b"040000 sub\0".to_vec();
        payload.extend_from_slice(&[2u8; HASH_SIZE]);

        let decoded = decode_tree(&payload).unwrap();
        assert!(decoded[0].is_tree());
        assert_eq!(decoded[0].file_mode(), Some(file_modes::DIRECTORY));
    }

    #[test]
    fn test_name_listing_sorted_with_trailing_newline() {
        let listing = name_listing(&[blob("b.txt"), dir("a"), blob("B")]);
        assert_eq!(listing, b"B\na\nb.txt\n");
    }

    // Property-based tests
    use proptest::prelude::*;

    fn arb_entry_name() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9._-]{1,64}"
    }

    fn arb_tree_entry() -> impl Strategy<Value = TreeEntry> {
        (
            prop::sample::select(vec![
                file_modes::REGULAR,
                file_modes::EXECUTABLE,
                file_modes::DIRECTORY,
            ]),
            arb_entry_name(),
            prop::array::uniform20(any::<u8>()),
        )
            .prop_map(|(mode, name, hash_bytes)| {
                TreeEntry::new(mode, name, Hash::from_bytes(hash_bytes)).unwrap()
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        /// Encoding then decoding preserves every entry
        #[test]
        fn prop_tree_entry_roundtrip(entry in arb_tree_entry()) {
            let decoded = decode_tree(&entry.encode())?;
            prop_assert_eq!(decoded, vec![entry]);
        }

        /// Tree bytes do not depend on the order entries were collected in
        #[test]
        fn prop_tree_canonicalization_order_independent(
            entries in prop::collection::vec(arb_tree_entry(), 1..20)
        ) {
            let mut seen = std::collections::HashSet::new();
            let entries: Vec<_> = entries
                .into_iter()
                .filter(|e| seen.insert(e.name.clone()))
                .collect();

            let forward = encode_tree(entries.clone());
            let mut reversed = entries;
            reversed.reverse();
            prop_assert_eq!(forward, encode_tree(reversed));
        }

        /// Any strict prefix of a non-empty entry fails to parse
        #[test]
        fn prop_truncated_entry_rejected(
            entry in arb_tree_entry(),
            cut in 1usize..20,
        ) {
            let mut encoded = entry.encode();
            encoded.truncate(encoded.len() - cut);
            prop_assert!(decode_tree(&encoded).is_err());
        }
    }
}
