//! Vertex buffer: streams vertex files into the translation table in batches.
//!
//! Vertex files are read strictly in sequence. Each `read_more` call clears
//! the table and refills it until the memory estimate reaches the configured
//! limit or all files are exhausted; the driver sweeps all edge files once
//! per fill. This is how vertex sets larger than RAM are handled, at the
//! cost of re-reading every edge file once per batch.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::csv;
use crate::record;
use crate::translation::TranslationTable;
use crate::DataType;

/// Errors from filling the translation table.
#[derive(Error, Debug)]
pub enum BufferError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid vertex descriptor {descriptor:?}: expected <collection>:<path>")]
    BadDescriptor { descriptor: String },

    #[error("could not open {} for reading: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not read header line in vertex file {}", .path.display())]
    HeaderUnreadable { path: PathBuf },

    #[error("did not find _key column in vertex file {}", .path.display())]
    MissingKeyColumn { path: PathBuf },
}

/// One vertex file and the collection its keys belong to.
#[derive(Debug, Clone)]
pub struct VertexFile {
    pub collection: String,
    pub path: PathBuf,
}

impl VertexFile {
    /// Parse a descriptor `<collection>:<path>`.
    pub fn parse(descriptor: &str) -> Result<Self, BufferError> {
        let pos = descriptor.find(':').ok_or_else(|| BufferError::BadDescriptor {
            descriptor: descriptor.to_string(),
        })?;
        Ok(Self {
            collection: descriptor[..pos].to_string(),
            path: PathBuf::from(&descriptor[pos + 1..]),
        })
    }
}

struct OpenFile {
    reader: BufReader<File>,
    /// `_key` column, CSV only.
    key_pos: Option<usize>,
    count: u64,
}

/// Sequential reader over the configured vertex files, filling the
/// translation table batch by batch.
///
/// An empty buffer is done right from the start but still admits one
/// `read_more` call yielding an empty table; this carries the edge
/// transformation when only the smart-index rule is in play.
pub struct VertexBuffer {
    files: Vec<VertexFile>,
    table: TranslationTable,
    file_pos: usize,
    current: Option<OpenFile>,
    data_type: DataType,
    separator: char,
    quote_char: char,
}

impl VertexBuffer {
    pub fn new(files: Vec<VertexFile>, data_type: DataType, separator: char, quote_char: char) -> Self {
        Self {
            files,
            table: TranslationTable::new(),
            file_pos: 0,
            current: None,
            data_type,
            separator,
            quote_char,
        }
    }

    /// Whether all vertex files have been consumed.
    pub fn is_done(&self) -> bool {
        self.file_pos >= self.files.len()
    }

    /// The table filled by the last `read_more` call.
    pub fn table(&self) -> &TranslationTable {
        &self.table
    }

    /// Clear the table and refill it up to `mem_limit` bytes (estimated).
    pub fn read_more(&mut self, mem_limit: usize) -> Result<(), BufferError> {
        info!("Reading vertices...");
        self.table.clear();
        while self.file_pos < self.files.len() && self.table.mem_usage() < mem_limit {
            if self.current.is_none() {
                self.current = Some(self.open_next()?);
            }
            let cur = self.current.as_mut().unwrap();

            let mut line = String::new();
            if cur.reader.read_line(&mut line)? == 0 {
                self.current = None;
                self.file_pos += 1;
                continue;
            }
            cur.count += 1;
            let line = line.trim_end_matches(['\r', '\n']);

            let collection = &self.files[self.file_pos].collection;
            match self.data_type {
                DataType::Csv => {
                    let parts = csv::split(line, self.separator, self.quote_char);
                    let key_pos = cur.key_pos.expect("CSV vertex file without header state");
                    if let Some(field) = parts.get(key_pos) {
                        let key = csv::unquote(field, self.quote_char);
                        learn_smart_key(&mut self.table, collection, &key);
                    }
                }
                DataType::Jsonl => match record::parse_object(line) {
                    Ok(obj) => {
                        if let Some(Value::String(key)) = obj.get("_key") {
                            learn_smart_key(&mut self.table, collection, key);
                        }
                    }
                    Err(err) => {
                        warn!(
                            "skipping invalid JSON on line {} of {}: {err}",
                            cur.count,
                            self.files[self.file_pos].path.display()
                        );
                    }
                },
            }

            if cur.count % 1_000_000 == 0 {
                info!(
                    "Have read {} vertices (needs {} MB of RAM)",
                    cur.count,
                    self.table.mem_usage() / (1024 * 1024)
                );
            }
        }
        info!(
            "Have read {} MB of vertex data",
            self.table.mem_usage() / (1024 * 1024)
        );
        Ok(())
    }

    fn open_next(&self) -> Result<OpenFile, BufferError> {
        let vf = &self.files[self.file_pos];
        info!("Opening vertex file {} ...", vf.path.display());
        let file = File::open(&vf.path).map_err(|source| BufferError::Open {
            path: vf.path.clone(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        let key_pos = match self.data_type {
            DataType::Csv => {
                let mut header = String::new();
                if reader.read_line(&mut header)? == 0 {
                    return Err(BufferError::HeaderUnreadable {
                        path: vf.path.clone(),
                    });
                }
                let headers: Vec<String> =
                    csv::split(header.trim_end_matches(['\r', '\n']), self.separator, self.quote_char)
                        .iter()
                        .map(|h| csv::unquote(h, self.quote_char).into_owned())
                        .collect();
                Some(
                    csv::find_col(&headers, "_key").ok_or_else(|| BufferError::MissingKeyColumn {
                        path: vf.path.clone(),
                    })?,
                )
            }
            DataType::Jsonl => None,
        };

        Ok(OpenFile {
            reader,
            key_pos,
            count: 0,
        })
    }
}

/// Learn one smart key: intern the attribute before the colon and record
/// `collection/suffix` under it. Keys without a colon are not smart and are
/// skipped.
fn learn_smart_key(table: &mut TranslationTable, collection: &str, key: &str) {
    if let Some(cpos) = key.find(':') {
        let id = table.intern(&key[..cpos]);
        table.record_vertex(format!("{collection}/{}", &key[cpos + 1..]), id);
    }
}
