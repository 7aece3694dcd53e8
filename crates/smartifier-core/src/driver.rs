//! Orchestration of vertex and edge transformation runs.
//!
//! Vertex mode is a single streaming pass from the input file to the output
//! file. Edge mode is an outer loop over vertex batches with an inner worker
//! pool sweeping all edge files once per batch; every edge file is rewritten
//! in full on every pass, and endpoints resolved in an earlier pass are
//! skipped by the already-transformed check.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::buffer::{BufferError, VertexBuffer, VertexFile};
use crate::edge::{self, EdgeCollection, EdgeError, EdgeOptions};
use crate::vertex::{self, CsvVertexLayout, VertexConfig};
use crate::DataType;

/// Errors from a transformation run.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not read header line in vertex file {}", .path.display())]
    HeaderUnreadable { path: PathBuf },

    #[error("invalid JSON on line {line} of {}: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        line: u64,
        source: serde_json::Error,
    },

    #[error("error writing {} at close time", .path.display())]
    CloseFailed { path: PathBuf },

    #[error("edge mode without vertex files requires a positive smart index")]
    MissingVertexFiles,

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Edge(#[from] EdgeError),

    #[error("could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Summary of a vertex run.
#[derive(Debug, Clone, Serialize)]
pub struct VertexStats {
    /// Data lines transformed.
    pub lines: u64,
}

/// Summary of an edge run.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeStats {
    /// Vertex batches processed (each one sweeps all edge files).
    pub passes: u64,
    /// Edge files per pass.
    pub files: usize,
    /// Total edge lines written, summed over all passes.
    pub lines: u64,
}

/// Transform one vertex file from `input` to `output`.
pub fn run_vertices(
    input: &Path,
    output: &Path,
    config: &VertexConfig,
) -> Result<VertexStats, DriverError> {
    let infile = File::open(input).map_err(|source| DriverError::Open {
        path: input.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(infile);
    let outfile = File::create(output).map_err(|source| DriverError::Open {
        path: output.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(outfile);

    let layout = match config.data_type {
        DataType::Csv => {
            let mut header = String::new();
            if reader.read_line(&mut header)? == 0 {
                return Err(DriverError::HeaderUnreadable {
                    path: input.to_path_buf(),
                });
            }
            let layout = CsvVertexLayout::from_header(
                header.trim_end_matches(['\r', '\n']),
                config,
                &input.display().to_string(),
            );
            writeln!(
                writer,
                "{}",
                layout.header_line(config.separator, config.quote_char)
            )?;
            Some(layout)
        }
        DataType::Jsonl => None,
    };

    let mut count: u64 = 0;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        count += 1;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        let out_line = match &layout {
            Some(layout) => layout.transform_line(config, trimmed, count),
            None => vertex::transform_jsonl_line(config, trimmed, count).map_err(|source| {
                DriverError::InvalidJson {
                    path: input.to_path_buf(),
                    line: count,
                    source,
                }
            })?,
        };
        writeln!(writer, "{out_line}")?;
        if count % 1_000_000 == 0 {
            info!("Have transformed {count} vertices");
        }
    }

    writer.flush().map_err(|_| DriverError::CloseFailed {
        path: output.to_path_buf(),
    })?;
    info!("Transformed {count} vertices into {}", output.display());
    Ok(VertexStats { lines: count })
}

/// Configuration of an edge run.
#[derive(Debug)]
pub struct EdgeRunConfig {
    pub vertices: Vec<VertexFile>,
    pub edges: Vec<EdgeCollection>,
    pub data_type: DataType,
    pub separator: char,
    pub quote_char: char,
    /// Translation table budget in bytes.
    pub memory_limit: usize,
    /// Derive endpoint attributes from key prefixes instead of vertex data.
    pub smart_index: Option<usize>,
    /// Worker pool size.
    pub threads: usize,
}

/// Transform all edge files, batching vertex data under the memory limit.
pub fn run_edges(config: EdgeRunConfig) -> Result<EdgeStats, DriverError> {
    if config.vertices.is_empty() && config.smart_index.unwrap_or(0) == 0 {
        return Err(DriverError::MissingVertexFiles);
    }

    let opts = EdgeOptions {
        data_type: config.data_type,
        separator: config.separator,
        quote_char: config.quote_char,
        smart_index: config.smart_index,
    };
    let mut buffer = VertexBuffer::new(
        config.vertices,
        config.data_type,
        config.separator,
        config.quote_char,
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let mut passes: u64 = 0;
    let mut lines: u64 = 0;
    loop {
        buffer.read_more(config.memory_limit)?;
        passes += 1;

        let table = buffer.table();
        let results: Vec<Result<u64, EdgeError>> = pool.install(|| {
            config
                .edges
                .par_iter()
                .map(|e| edge::transform_file(e, table, &opts))
                .collect()
        });
        // All files finish their pass before the first error is propagated.
        for result in results {
            lines += result?;
        }

        if buffer.is_done() {
            break;
        }
    }

    info!("Edge transformation finished after {passes} pass(es)");
    Ok(EdgeStats {
        passes,
        files: config.edges.len(),
        lines,
    })
}
