//! Output formatting for CLI commands.
//!
//! Provides abstraction layer for outputting results in text or JSON format.

use anyhow::Result;
use minigit_core::{Hash, TreeEntry};
use serde::Serialize;
use std::io::{self, Write};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writer for command output with format abstraction.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    /// Create a new OutputWriter.
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            stdout: io::stdout(),
        }
    }

    /// Write output using the configured format.
    ///
    /// The `data` parameter must be a serializable struct that includes
    /// `success: bool` and `result_code: u8` fields.
    ///
    /// The `text_fn` closure is called only in text mode to generate the
    /// human-readable output.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        self.write_bytes(data, || text_fn().into_bytes())
    }

    /// Like [`OutputWriter::write`], but text mode emits raw bytes, so
    /// non-UTF-8 blob content reaches stdout unchanged.
    pub fn write_bytes<T: Serialize>(
        &self,
        data: &T,
        bytes_fn: impl FnOnce() -> Vec<u8>,
    ) -> Result<()> {
        let mut handle = self.stdout.lock();
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                writeln!(handle, "{}", json)?;
            }
            OutputFormat::Text => {
                let bytes = bytes_fn();
                if !bytes.is_empty() {
                    handle.write_all(&bytes)?;
                }
            }
        }
        handle.flush()?;
        Ok(())
    }

    /// Write an error message to stderr.
    ///
    /// In JSON mode, writes a JSON error object with success=false.
    /// In text mode, writes the error chain directly.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code,
                    error: format!("{:#}", error),
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(io::stderr(), "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = writeln!(io::stderr(), "Error: {:#}", error);
            }
        }
    }
}

// ============================================================================
// Data Transfer Objects (DTOs) for JSON output
// ============================================================================

/// Error output structure.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

/// Output for `init` command.
#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub result_code: u8,
    pub git_dir: String,
}

/// Tree entry information for `ls-tree` and `cat-file`.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntryInfo {
    pub name: String,
    pub entry_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash>,
}

impl TreeEntryInfo {
    /// Build from a tree entry, keeping only the name when `name_only`.
    pub fn from_entry(entry: &TreeEntry, name_only: bool) -> Self {
        Self {
            name: entry.display_name().into_owned(),
            entry_type: entry.object_type().as_str().to_string(),
            mode: (!name_only).then(|| mode_text(entry)),
            hash: (!name_only).then_some(entry.hash),
        }
    }
}

/// Mode padded to six digits; a non-octal mode is shown as stored.
fn mode_text(entry: &TreeEntry) -> String {
    match entry.file_mode() {
        Some(mode) => format!("{:06o}", mode),
        None => String::from_utf8_lossy(&entry.mode).into_owned(),
    }
}

/// Render one `ls-tree` style line: `<mode> <type> <hash>\t<name>`.
///
/// The name is written as raw bytes.
pub fn tree_line(entry: &TreeEntry) -> Vec<u8> {
    let mut line = format!(
        "{} {} {}\t",
        mode_text(entry),
        entry.object_type(),
        entry.hash
    )
    .into_bytes();
    line.extend_from_slice(&entry.name);
    line.push(b'\n');
    line
}

/// Render a full `ls-tree` listing.
pub fn tree_listing(entries: &[TreeEntry]) -> Vec<u8> {
    entries.iter().flat_map(tree_line).collect()
}

/// Data variants for `cat-file` command.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CatFileData {
    Blob { size: u64, content: String },
    Tree { entries: Vec<TreeEntryInfo> },
}

/// Output for `cat-file` command.
#[derive(Debug, Serialize)]
pub struct CatFileOutput {
    pub success: bool,
    pub result_code: u8,
    pub hash: Hash,
    #[serde(flatten)]
    pub data: CatFileData,
}

/// Output for `hash-object` command.
#[derive(Debug, Serialize)]
pub struct HashObjectOutput {
    pub success: bool,
    pub result_code: u8,
    pub hash: Hash,
    pub written: bool,
    pub source: String,
}

/// Output for `ls-tree` command.
#[derive(Debug, Serialize)]
pub struct LsTreeOutput {
    pub success: bool,
    pub result_code: u8,
    pub hash: Hash,
    pub entries: Vec<TreeEntryInfo>,
}

/// Output for `write-tree` command.
#[derive(Debug, Serialize)]
pub struct WriteTreeOutput {
    pub success: bool,
    pub result_code: u8,
    pub hash: Hash,
}
