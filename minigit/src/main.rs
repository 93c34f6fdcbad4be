mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use minigit_core::{Hash, ObjectType, Repository, decode_tree, hash_object, name_listing};
use output::{
    CatFileData, CatFileOutput, HashObjectOutput, InitOutput, LsTreeOutput, OutputWriter,
    TreeEntryInfo, WriteTreeOutput, tree_listing,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// minigit - a minimal git-compatible object store
#[derive(Parser)]
#[command(name = "minigit")]
#[command(about = "Store and inspect git blob and tree objects", long_about = None)]
#[command(version)]
struct Cli {
    /// Repository root (defaults to MINIGIT_ROOT env var or the current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new repository
    Init,

    /// Print the content of an object
    CatFile {
        /// Hash of the object to pretty-print
        #[arg(short = 'p', value_name = "HASH")]
        object: String,
    },

    /// Compute the blob hash of a file, optionally storing it
    HashObject {
        /// Write the blob into the object store
        #[arg(short = 'w')]
        write: bool,

        /// Read the content from stdin instead of a file
        #[arg(long, conflicts_with = "path")]
        stdin: bool,

        /// File to hash
        #[arg(required_unless_present = "stdin")]
        path: Option<PathBuf>,
    },

    /// List the entries of a tree object
    LsTree {
        /// Print only entry names
        #[arg(long)]
        name_only: bool,

        /// Hash of the tree
        hash: String,
    },

    /// Store the working directory as a tree and print its hash
    WriteTree,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let output = OutputWriter::new(cli.json);

    // Determine repository root: CLI arg > MINIGIT_ROOT env var > current directory
    let root = cli
        .root
        .or_else(|| std::env::var("MINIGIT_ROOT").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    tracing::debug!(root = %root.display(), "resolved repository root");

    let result = match cli.command {
        Commands::Init => cmd_init(&root, &output),
        Commands::CatFile { object } => cmd_cat_file(&root, &object, &output),
        Commands::HashObject { write, stdin, path } => {
            cmd_hash_object(&root, write, stdin, path.as_deref(), &output)
        }
        Commands::LsTree { name_only, hash } => cmd_ls_tree(&root, &hash, name_only, &output),
        Commands::WriteTree => cmd_write_tree(&root, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.write_error(&err, 1);
            ExitCode::from(1)
        }
    }
}

/// Log to stderr, filtered by MINIGIT_LOG (default: warn).
fn init_logging() {
    let filter = EnvFilter::try_from_env("MINIGIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_repo(root: &Path) -> Result<Repository> {
    Repository::open(root)
        .with_context(|| format!("Failed to open repository at {}", root.display()))
}

fn cmd_init(root: &Path, output: &OutputWriter) -> Result<()> {
    let mut repo = Repository::new(root);
    repo.init()
        .with_context(|| format!("Failed to initialize repository at {}", root.display()))?;

    let git_dir = repo.git_dir().display().to_string();
    output.write(
        &InitOutput {
            success: true,
            result_code: 0,
            git_dir: git_dir.clone(),
        },
        || format!("Initialized git directory at {}\n", git_dir),
    )
}

fn cmd_cat_file(root: &Path, hash_str: &str, output: &OutputWriter) -> Result<()> {
    let repo = open_repo(root)?;

    let hash = Hash::from_hex(hash_str).with_context(|| format!("Invalid hash: {}", hash_str))?;

    let (object_type, payload) = repo
        .store()
        .read_object(&hash)
        .with_context(|| format!("Failed to read object {}", hash))?;

    match object_type {
        ObjectType::Blob => {
            let data = CatFileOutput {
                success: true,
                result_code: 0,
                hash,
                data: CatFileData::Blob {
                    size: payload.len() as u64,
                    content: String::from_utf8_lossy(&payload).into_owned(),
                },
            };
            output.write_bytes(&data, || payload)
        }
        ObjectType::Tree => {
            let entries = decode_tree(&payload)
                .with_context(|| format!("Failed to parse tree {}", hash))?;
            let data = CatFileOutput {
                success: true,
                result_code: 0,
                hash,
                data: CatFileData::Tree {
                    entries: entries
                        .iter()
                        .map(|e| TreeEntryInfo::from_entry(e, false))
                        .collect(),
                },
            };
            output.write_bytes(&data, || tree_listing(&entries))
        }
    }
}

fn cmd_hash_object(
    root: &Path,
    write: bool,
    stdin: bool,
    path: Option<&Path>,
    output: &OutputWriter,
) -> Result<()> {
    let (content, source) = if stdin {
        if atty::is(atty::Stream::Stdin) {
            anyhow::bail!("--stdin given but stdin is a terminal; pipe content in");
        }
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
        (buf, "<stdin>".to_string())
    } else {
        let path = path.context("No file given")?;
        let content = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        (content, path.display().to_string())
    };

    let hash = if write {
        let repo = open_repo(root)?;
        repo.write_blob_bytes(&content)
            .with_context(|| format!("Failed to write blob for {}", source))?
    } else {
        hash_object(ObjectType::Blob, &content)
    };

    output.write(
        &HashObjectOutput {
            success: true,
            result_code: 0,
            hash,
            written: write,
            source,
        },
        || format!("{}\n", hash),
    )
}

fn cmd_ls_tree(root: &Path, hash_str: &str, name_only: bool, output: &OutputWriter) -> Result<()> {
    let repo = open_repo(root)?;

    let hash = Hash::from_hex(hash_str).with_context(|| format!("Invalid hash: {}", hash_str))?;

    let entries = repo
        .tree_entries(&hash.to_hex())
        .with_context(|| format!("Failed to read tree {}", hash))?;

    let data = LsTreeOutput {
        success: true,
        result_code: 0,
        hash,
        entries: entries
            .iter()
            .map(|e| TreeEntryInfo::from_entry(e, name_only))
            .collect(),
    };

    output.write_bytes(&data, || {
        if name_only {
            name_listing(&entries)
        } else {
            tree_listing(&entries)
        }
    })
}

fn cmd_write_tree(root: &Path, output: &OutputWriter) -> Result<()> {
    let repo = open_repo(root)?;

    let hash = repo
        .write_tree(root)
        .with_context(|| format!("Failed to write tree for {}", root.display()))?;

    output.write(
        &WriteTreeOutput {
            success: true,
            result_code: 0,
            hash,
        },
        || format!("{}\n", hash),
    )
}
