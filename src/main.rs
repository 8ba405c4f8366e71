use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use walkdir::WalkDir;

use chunkmerge::{
    ActivityContext, ChunkOptions, Document, DocumentBatch, Overrides, PipelineConfig, Provider,
    SqliteStore, chunk_documents, estimate_tokens, load_documents, merge_and_chunk,
    merge_by_reference, merge_sources, store_documents,
};

// ── CLI ─────────────────────────────────────────────────────────────

/// Merge document collections and split them into overlapping chunks.
#[derive(Parser, Debug)]
#[command(name = "chunkmerge", version, about)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true, env = "CHUNKMERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum tokens per chunk (0 selects the defaults).
    #[arg(long, global = true, env = "CHUNKMERGE_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Tokens shared between consecutive chunks.
    #[arg(long, global = true, env = "CHUNKMERGE_OVERLAP")]
    overlap: Option<usize>,

    /// Paragraph separator the tokenizer splits on first.
    #[arg(long, global = true)]
    separator: Option<String>,

    /// SQLite database holding stored collections.
    #[arg(long, global = true, env = "CHUNKMERGE_STORE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Concatenate document lists in the order given
    Merge {
        /// JSON files (arrays of documents) or directories of them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Split oversized documents into overlapping chunks
    Chunk {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge, then chunk the merged list
    MergeChunk {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Persist a document list and print its reference
    Store { input: PathBuf },
    /// Load a stored collection by key
    Load {
        key: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge stored collections into a new one
    MergeRefs {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// List stored collections
    Refs,
    /// Run a registered activity with a JSON input file
    Invoke {
        /// Activity name, e.g. transform.Chunk
        activity: String,
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rough token estimate (~4 characters per token)
    Estimate { text: String },
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig::load(cli.config.as_deref())?.apply(Overrides {
        max_tokens: cli.max_tokens,
        overlap: cli.overlap,
        separator: cli.separator,
        store: cli.store,
    });
    debug!(?config, "resolved config");

    let start_time = Instant::now();

    match cli.command {
        Command::Merge { inputs, output } => {
            let batches = read_inputs(&inputs)?;
            let merged = merge_sources(&batches);
            write_json(&merged, output.as_deref())?;
            print_summary(&[
                ("Sources", batches.len()),
                ("Documents", merged.len()),
            ]);
        }
        Command::Chunk { input, output } => {
            let docs = read_documents(&input)?;
            let chunks = chunk_documents(&docs, &config.chunk);
            write_json(&chunks, output.as_deref())?;
            print_chunk_summary(&config.chunk, docs.len(), chunks.len());
        }
        Command::MergeChunk { inputs, output } => {
            let batches = read_inputs(&inputs)?;
            let chunks = merge_and_chunk(&batches, &config.chunk);
            let merged: usize = batches.iter().map(DocumentBatch::len).sum();
            write_json(&chunks, output.as_deref())?;
            print_chunk_summary(&config.chunk, merged, chunks.len());
        }
        Command::Store { input } => {
            let store = open_store(&config)?;
            let docs = read_documents(&input)?;
            let data_ref = store_documents(&ActivityContext::new("store"), &store, &docs)?;
            info!(key = %data_ref.key, count = data_ref.count, "stored collection");
            write_json(&data_ref, None)?;
        }
        Command::Load { key, output } => {
            let store = open_store(&config)?;
            let data_ref = store
                .find_ref(&key)?
                .with_context(|| format!("no stored collection with key {}", key))?;
            let docs = load_documents(&ActivityContext::new("load"), &store, &data_ref)?;
            write_json(&docs, output.as_deref())?;
        }
        Command::MergeRefs { keys } => {
            let store = open_store(&config)?;
            let mut refs = Vec::with_capacity(keys.len());
            for key in &keys {
                let data_ref = store
                    .find_ref(key)?
                    .with_context(|| format!("no stored collection with key {}", key))?;
                refs.push(data_ref);
            }
            let out = merge_by_reference(&ActivityContext::new("merge-refs"), &store, &refs)?;
            write_json(&out, None)?;
        }
        Command::Refs => {
            let store = open_store(&config)?;
            for data_ref in store.list_refs()? {
                println!(
                    "{}  {}  {} documents",
                    data_ref.key, data_ref.schema, data_ref.count
                );
            }
            let stats = store.stats()?;
            print_summary(&[
                ("Collections", stats.ref_count as usize),
                ("Documents", stats.document_count as usize),
                ("Payload bytes", stats.payload_bytes as usize),
            ]);
        }
        Command::Invoke {
            activity,
            input,
            output,
        } => {
            // MergeRefs needs somewhere to write; other activities don't touch the store
            let store = match config.store.path {
                Some(_) => open_store(&config)?,
                None => SqliteStore::new_in_memory()?,
            };
            let provider = Provider::transform(Arc::new(store));
            let payload: serde_json::Value = serde_json::from_str(
                &fs::read_to_string(&input)
                    .with_context(|| format!("Failed to read {}", input.display()))?,
            )
            .with_context(|| format!("Failed to parse {}", input.display()))?;

            let result = provider.invoke(&activity, &ActivityContext::new(&activity), payload)?;
            write_json(&result, output.as_deref())?;
        }
        Command::Estimate { text } => {
            println!("{}", estimate_tokens(&text));
        }
    }

    eprintln!("✓ Done [{:.2}s]", start_time.elapsed().as_secs_f64());
    Ok(())
}

fn open_store(config: &PipelineConfig) -> Result<SqliteStore> {
    match &config.store.path {
        Some(path) => SqliteStore::open(path)
            .with_context(|| format!("Failed to open store at {}", path.display())),
        None => bail!("no store configured; pass --store or set [store] path in the config"),
    }
}

/// Expand inputs into one batch per JSON file.
///
/// Directories are walked recursively for `*.json` files in name order.
fn read_inputs(inputs: &[PathBuf]) -> Result<Vec<DocumentBatch>> {
    let mut batches = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("Failed to walk {}", input.display()))?;
                let path = entry.path();
                if entry.file_type().is_file()
                    && path.extension().is_some_and(|ext| ext == "json")
                {
                    batches.push(read_batch(path)?);
                }
            }
        } else {
            batches.push(read_batch(input)?);
        }
    }
    Ok(batches)
}

fn read_batch(path: &Path) -> Result<DocumentBatch> {
    let docs = read_documents(path)?;
    debug!(path = %path.display(), count = docs.len(), "read documents");
    Ok(DocumentBatch::new(path.display().to_string(), docs))
}

fn read_documents(path: &Path) -> Result<Vec<Document>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse documents from {}", path.display()))
}

fn write_json<T: serde::Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

fn print_chunk_summary(options: &ChunkOptions, documents: usize, chunks: usize) {
    let resolved = options.resolved();
    eprintln!("=== Chunking Statistics ===");
    eprintln!("Max tokens/chunk:     {}", resolved.max_tokens);
    eprintln!("Overlap:              {}", resolved.overlap);
    print_summary(&[("Documents", documents), ("Chunks", chunks)]);
}

fn print_summary(rows: &[(&str, usize)]) {
    for (label, value) in rows {
        eprintln!("{:<22}{}", format!("{}:", label), value);
    }
}
