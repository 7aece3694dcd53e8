//! Edge record rewriting against a read-only translation table.
//!
//! Each edge file is rewritten in full to a `.out` sibling, then moved over
//! the original. Endpoint references resolve through the translation table
//! (or through the smart-index prefix rule when no vertex data is given);
//! references that do not resolve in the current pass are left untouched and
//! picked up by a later pass.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::csv;
use crate::record;
use crate::translation::TranslationTable;
use crate::vertex::truncate_chars;
use crate::DataType;

/// Errors from transforming a single edge file.
#[derive(Error, Debug)]
pub enum EdgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid edge descriptor {descriptor:?}: {reason}")]
    BadDescriptor { descriptor: String, reason: String },

    #[error("could not open {} for reading: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not read header line in edge file {}", .path.display())]
    HeaderUnreadable { path: PathBuf },

    #[error("did not find {column} column in edge file {}", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("invalid JSON on line {line} of {}: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        line: u64,
        source: serde_json::Error,
    },

    #[error("error writing {} at close time, not renaming over the original", .path.display())]
    CloseFailed { path: PathBuf },
}

/// One edge file together with its endpoint defaults and column renames.
#[derive(Debug, Clone)]
pub struct EdgeCollection {
    pub file_name: PathBuf,
    pub from_vert_coll: String,
    pub to_vert_coll: String,
    pub column_renames: Vec<(usize, String)>,
}

impl EdgeCollection {
    /// Parse a descriptor `<path>:<fromColl>:<toColl>[:<nr>:<newname>]*`.
    pub fn parse(descriptor: &str) -> Result<Self, EdgeError> {
        let bad = |reason: &str| EdgeError::BadDescriptor {
            descriptor: descriptor.to_string(),
            reason: reason.to_string(),
        };
        let p1 = descriptor
            .find(':')
            .ok_or_else(|| bad("expected <path>:<fromColl>:<toColl>"))?;
        let p2 = descriptor[p1 + 1..]
            .find(':')
            .map(|i| p1 + 1 + i)
            .ok_or_else(|| bad("expected <path>:<fromColl>:<toColl>"))?;
        let p3 = descriptor[p2 + 1..].find(':').map(|i| p2 + 1 + i);

        let mut column_renames = Vec::new();
        let to_end = match p3 {
            None => descriptor.len(),
            Some(p3) => {
                let parts: Vec<&str> = descriptor[p3 + 1..].split(':').collect();
                if parts.len() % 2 != 0 {
                    return Err(bad("column renames must come in <nr>:<newname> pairs"));
                }
                for pair in parts.chunks(2) {
                    let nr: usize = pair[0]
                        .parse()
                        .map_err(|_| bad("column rename index is not a number"))?;
                    column_renames.push((nr, pair[1].to_string()));
                }
                p3
            }
        };

        Ok(Self {
            file_name: PathBuf::from(&descriptor[..p1]),
            from_vert_coll: descriptor[p1 + 1..p2].to_string(),
            to_vert_coll: descriptor[p2 + 1..to_end].to_string(),
            column_renames,
        })
    }
}

/// Codec and resolution options shared by all edge files of a run.
#[derive(Debug, Clone)]
pub struct EdgeOptions {
    pub data_type: DataType,
    pub separator: char,
    pub quote_char: char,
    /// Derive the attribute from a key prefix instead of the table.
    pub smart_index: Option<usize>,
}

/// Result of rewriting one endpoint reference.
struct Endpoint {
    /// The (possibly rewritten) reference.
    value: String,
    /// The resolved smart graph attribute, empty on a table miss.
    att: String,
    /// Whether `value` differs from the raw input.
    changed: bool,
}

/// Apply the endpoint rules to one raw `collection/key` reference.
fn rewrite_endpoint(
    raw: &str,
    default_coll: &str,
    table: &TranslationTable,
    smart_index: Option<usize>,
) -> Endpoint {
    let (value, slash, changed) = match raw.find('/') {
        Some(pos) => (raw.to_string(), pos, false),
        None => (format!("{default_coll}/{raw}"), default_coll.len(), true),
    };

    let key = &value[slash + 1..];
    if let Some(cpos) = key.find(':') {
        // Already transformed.
        let att = key[..cpos].to_string();
        return Endpoint {
            value,
            att,
            changed,
        };
    }

    if let Some(n) = smart_index.filter(|&n| n > 0) {
        let att = truncate_chars(key, n);
        let new_value = format!("{}{att}:{key}", &value[..slash + 1]);
        return Endpoint {
            value: new_value,
            att,
            changed: true,
        };
    }

    match table.resolve(&value) {
        Some(att) => {
            let att = att.to_string();
            let new_value = format!("{}{att}:{}", &value[..slash + 1], &value[slash + 1..]);
            Endpoint {
                value: new_value,
                att,
                changed: true,
            }
        }
        None => {
            // Not known in this pass; a later batch may still resolve it.
            Endpoint {
                value,
                att: String::new(),
                changed,
            }
        }
    }
}

/// The smart edge key, or `None` when the key must stay as it is.
fn rewrite_edge_key(key: &str, from_att: &str, to_att: &str) -> Option<String> {
    if from_att.is_empty() || to_att.is_empty() || key.contains(':') {
        return None;
    }
    Some(format!("{from_att}:{key}:{to_att}"))
}

/// Rewrite one edge file in place (via a `.out` sibling and rename).
///
/// Returns the number of data lines written.
pub fn transform_file(
    e: &EdgeCollection,
    table: &TranslationTable,
    opts: &EdgeOptions,
) -> Result<u64, EdgeError> {
    info!("Transforming edges in {} ...", e.file_name.display());
    let input = File::open(&e.file_name).map_err(|source| EdgeError::Open {
        path: e.file_name.clone(),
        source,
    })?;
    let mut reader = BufReader::new(input);

    let out_path = out_path_for(&e.file_name);
    let mut writer = BufWriter::new(File::create(&out_path)?);

    let count = match opts.data_type {
        DataType::Csv => transform_csv(e, table, opts, &mut reader, &mut writer)?,
        DataType::Jsonl => transform_jsonl(e, table, opts, &mut reader, &mut writer)?,
    };

    writer.flush().map_err(|_| EdgeError::CloseFailed {
        path: out_path.clone(),
    })?;
    drop(writer);
    fs::rename(&out_path, &e.file_name)?;
    info!(
        "Have transformed {count} edges in {}, finished",
        e.file_name.display()
    );
    Ok(count)
}

fn out_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".out");
    PathBuf::from(os)
}

fn transform_csv(
    e: &EdgeCollection,
    table: &TranslationTable,
    opts: &EdgeOptions,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
) -> Result<u64, EdgeError> {
    let sep = opts.separator;
    let quo = opts.quote_char;
    let mut lines = reader.lines();

    let header_line = lines
        .next()
        .transpose()?
        .ok_or_else(|| EdgeError::HeaderUnreadable {
            path: e.file_name.clone(),
        })?;
    let mut headers: Vec<String> = csv::split(&header_line, sep, quo)
        .iter()
        .map(|h| csv::unquote(h, quo).into_owned())
        .collect();
    if headers.len() == 1 {
        warn!(
            "found only one column in header of {}, did you specify the right separator character?",
            e.file_name.display()
        );
    }
    for (nr, name) in &e.column_renames {
        if *nr < headers.len() {
            headers[*nr] = name.clone();
        }
    }
    writeln!(writer, "{}", csv::join_quoted(&headers, sep, quo))?;

    // _key is optional; _from and _to are not.
    let key_pos = csv::find_col(&headers, "_key");
    let from_pos = csv::find_col(&headers, "_from").ok_or_else(|| EdgeError::MissingColumn {
        path: e.file_name.clone(),
        column: "_from",
    })?;
    let to_pos = csv::find_col(&headers, "_to").ok_or_else(|| EdgeError::MissingColumn {
        path: e.file_name.clone(),
        column: "_to",
    })?;
    let ncols = headers.len();

    let mut count: u64 = 0;
    for line in lines {
        let line = line?;
        let mut parts = csv::split(&line, sep, quo);
        while parts.len() < ncols {
            parts.push(String::new());
        }

        let from = rewrite_endpoint(
            &csv::unquote(&parts[from_pos], quo),
            &e.from_vert_coll,
            table,
            opts.smart_index,
        );
        if from.changed {
            parts[from_pos] = csv::quote(&from.value, quo).into_owned();
        }
        let to = rewrite_endpoint(
            &csv::unquote(&parts[to_pos], quo),
            &e.to_vert_coll,
            table,
            opts.smart_index,
        );
        if to.changed {
            parts[to_pos] = csv::quote(&to.value, quo).into_owned();
        }

        if let Some(key_pos) = key_pos {
            let key = csv::unquote(&parts[key_pos], quo);
            if let Some(new_key) = rewrite_edge_key(&key, &from.att, &to.att) {
                parts[key_pos] = csv::quote(&new_key, quo).into_owned();
            }
        }

        writeln!(writer, "{}", csv::join(&parts, sep))?;
        count += 1;
        if count % 1_000_000 == 0 {
            info!(
                "Have transformed {count} edges in {} ...",
                e.file_name.display()
            );
        }
    }
    Ok(count)
}

fn transform_jsonl(
    e: &EdgeCollection,
    table: &TranslationTable,
    opts: &EdgeOptions,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
) -> Result<u64, EdgeError> {
    let mut count: u64 = 0;
    for line in reader.lines() {
        let line = line?;
        count += 1;
        let obj = record::parse_object(&line).map_err(|source| EdgeError::InvalidJson {
            path: e.file_name.clone(),
            line: count,
            source,
        })?;

        let from = jsonl_endpoint(&obj, "_from", &e.from_vert_coll, table, opts, &line);
        let to = jsonl_endpoint(&obj, "_to", &e.to_vert_coll, table, opts, &line);
        let from_att = from.as_ref().map(|ep| ep.att.as_str()).unwrap_or("");
        let to_att = to.as_ref().map(|ep| ep.att.as_str()).unwrap_or("");

        let key_value = obj.get("_key");
        let new_key = match key_value {
            Some(Value::String(key)) => rewrite_edge_key(key, from_att, to_att),
            _ => None,
        };

        let mut out = String::from("{");
        let mut written = false;
        if let Some(value) = key_value {
            match &new_key {
                Some(new_key) => record::push_string_field(&mut out, "_key", new_key),
                None => record::push_field(&mut out, "_key", value),
            }
            written = true;
        }
        for (name, ep) in [("_from", &from), ("_to", &to)] {
            if let Some(ep) = ep {
                if written {
                    out.push(',');
                }
                record::push_string_field(&mut out, name, &ep.value);
                written = true;
            }
        }
        for (name, value) in &obj {
            if name == "_key" || name == "_from" || name == "_to" {
                continue;
            }
            if written {
                out.push(',');
            }
            record::push_field(&mut out, name, value);
            written = true;
        }
        out.push('}');
        writeln!(writer, "{out}")?;

        if count % 1_000_000 == 0 {
            info!(
                "Have transformed {count} edges in {} ...",
                e.file_name.display()
            );
        }
    }
    Ok(count)
}

/// Read and rewrite one endpoint field of a JSONL edge record.
///
/// A missing or non-string endpoint is dropped from the output with a
/// warning.
fn jsonl_endpoint(
    obj: &Map<String, Value>,
    name: &str,
    default_coll: &str,
    table: &TranslationTable,
    opts: &EdgeOptions,
    line: &str,
) -> Option<Endpoint> {
    match obj.get(name) {
        Some(Value::String(s)) => Some(rewrite_endpoint(
            s,
            default_coll,
            table,
            opts.smart_index,
        )),
        _ => {
            warn!("found {name} entry which is not a string: {line}");
            None
        }
    }
}
