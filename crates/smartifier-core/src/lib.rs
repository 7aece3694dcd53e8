//! Smartifier core - transforms property graph data into smart graph format
//!
//! This crate provides the transformation engine behind the `smartifier2`
//! tool:
//! - CSV and JSONL line codecs that round-trip the importer's quoting rules
//! - Smart graph attribute derivation and vertex `_key` rewriting
//! - Edge endpoint resolution through a batched, memory-bounded translation
//!   table, with parallel processing of edge files
//! - In-place file replacement via `.out` siblings and atomic rename

pub mod buffer;
pub mod csv;
pub mod digest;
pub mod driver;
pub mod edge;
pub mod record;
pub mod translation;
pub mod vertex;

// Re-exports for convenience
pub use buffer::{BufferError, VertexBuffer, VertexFile};
pub use driver::{run_edges, run_vertices, DriverError, EdgeRunConfig, EdgeStats, VertexStats};
pub use edge::{EdgeCollection, EdgeError, EdgeOptions};
pub use translation::TranslationTable;
pub use vertex::{CsvVertexLayout, VertexConfig};

use std::fmt;
use std::str::FromStr;

/// Input data type of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Csv,
    Jsonl,
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" | "CSV" => Ok(DataType::Csv),
            "jsonl" | "JSONL" => Ok(DataType::Jsonl),
            other => Err(format!("unknown data type {other:?}, expected \"csv\" or \"jsonl\"")),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Csv => write!(f, "csv"),
            DataType::Jsonl => write!(f, "jsonl"),
        }
    }
}
