//! Edges command - rewrite edge endpoints and keys against vertex data

use anyhow::{Context, Result};
use clap::Args;
use smartifier_core::{run_edges, DataType, EdgeCollection, EdgeRunConfig, VertexFile};

use super::parse_data_type;
use crate::progress::{finish_phase, phase};
use crate::GlobalOptions;

/// Arguments for the edges command
#[derive(Args, Debug)]
pub struct EdgesArgs {
    /// Vertex data as <collection>:<path> (repeatable)
    #[arg(long = "vertices", value_name = "COLL:PATH")]
    vertices: Vec<String>,

    /// Edge data as <path>:<fromColl>:<toColl>[:<nr>:<newname>]... (repeatable)
    #[arg(long = "edges", required = true, value_name = "PATH:FROM:TO")]
    edges: Vec<String>,

    /// Data type, "csv" or "jsonl"
    #[arg(
        long = "type",
        short = 't',
        default_value = "csv",
        env = "SMARTIFIER_TYPE",
        value_parser = parse_data_type
    )]
    data_type: DataType,

    /// Limit RAM usage for the vertex table in MiB
    #[arg(long, short = 'm', default_value_t = 4096, env = "SMARTIFIER_MEMORY")]
    memory: usize,

    /// Column separator for csv type
    #[arg(long, short = 's', default_value_t = ',')]
    separator: char,

    /// Quote character for csv type
    #[arg(long, default_value_t = '"')]
    quote_char: char,

    /// Use the first <n> characters of the key as the smart graph attribute;
    /// no vertex data is needed then
    #[arg(long)]
    smart_index: Option<usize>,

    /// Number of worker threads for parallel edge files
    #[arg(long, default_value_t = 1, env = "SMARTIFIER_THREADS")]
    threads: usize,
}

/// Execute the edges command
pub fn execute(args: EdgesArgs, global: GlobalOptions) -> Result<()> {
    let vertices = args
        .vertices
        .iter()
        .map(|d| VertexFile::parse(d))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid --vertices option")?;
    let edges = args
        .edges
        .iter()
        .map(|d| EdgeCollection::parse(d))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid --edges option")?;

    let config = EdgeRunConfig {
        vertices,
        edges,
        data_type: args.data_type,
        separator: args.separator,
        quote_char: args.quote_char,
        memory_limit: args.memory * 1024 * 1024,
        smart_index: args.smart_index,
        threads: args.threads,
    };

    let pb = phase("Transforming edges...", global.quiet);
    let stats = run_edges(config).context("failed to transform edges")?;
    finish_phase(
        pb,
        &format!(
            "Transformed {} edge file{} in {} pass{}",
            stats.files,
            if stats.files == 1 { "" } else { "s" },
            stats.passes,
            if stats.passes == 1 { "" } else { "es" }
        ),
    );
    Ok(())
}
