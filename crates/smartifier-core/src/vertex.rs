//! Vertex record rewriting.
//!
//! Derives the smart graph attribute value for each vertex and rewrites its
//! `_key` to the `attribute:original` form, in either codec. The CSV side is
//! header-driven: column positions are computed once per file and reused for
//! every line.

use serde_json::Value;
use tracing::warn;

use crate::csv;
use crate::digest::sha1_hex;
use crate::record;
use crate::DataType;

/// Options for a vertex transformation run.
#[derive(Debug, Clone)]
pub struct VertexConfig {
    /// Name of the smart graph attribute column/field.
    pub smart_graph_attribute: String,
    /// Input data type.
    pub data_type: DataType,
    /// Attribute to derive the smart graph attribute value from.
    pub smart_value: Option<String>,
    /// Truncate the derived value to this many characters.
    pub smart_index: Option<usize>,
    /// Hash the derived value with SHA-1 before truncation.
    pub hash_smart_value: bool,
    /// Fallback value when a record carries no smart graph attribute.
    pub smart_default: Option<String>,
    /// Whether `_key` is rewritten (and created when absent).
    pub write_key: bool,
    /// Take the original key from this column/attribute instead of `_key`.
    pub key_value: Option<String>,
    /// CSV column separator.
    pub separator: char,
    /// CSV quote character.
    pub quote_char: char,
    /// CSV column renames, 0-based index to new name.
    pub renames: Vec<(usize, String)>,
}

impl VertexConfig {
    pub fn new(smart_graph_attribute: impl Into<String>, data_type: DataType) -> Self {
        Self {
            smart_graph_attribute: smart_graph_attribute.into(),
            data_type,
            smart_value: None,
            smart_index: None,
            hash_smart_value: false,
            smart_default: None,
            write_key: true,
            key_value: None,
            separator: ',',
            quote_char: '"',
            renames: Vec::new(),
        }
    }
}

/// Column positions for one CSV vertex file, computed from its header.
#[derive(Debug)]
pub struct CsvVertexLayout {
    headers: Vec<String>,
    smart_attr_pos: usize,
    smart_value_pos: Option<usize>,
    key_pos: Option<usize>,
    key_value_pos: Option<usize>,
}

impl CsvVertexLayout {
    /// Parse the header line, apply column renames, and locate (or append)
    /// the smart graph attribute and `_key` columns.
    pub fn from_header(header_line: &str, config: &VertexConfig, file: &str) -> Self {
        let quo = config.quote_char;
        let mut headers: Vec<String> = csv::split(header_line, config.separator, quo)
            .iter()
            .map(|h| csv::unquote(h, quo).into_owned())
            .collect();
        if headers.len() == 1 {
            warn!("found only one column in header of {file}, did you specify the right separator character?");
        }
        for (nr, name) in &config.renames {
            if *nr < headers.len() {
                headers[*nr] = name.clone();
            }
        }

        let smart_attr_pos = match csv::find_col(&headers, &config.smart_graph_attribute) {
            Some(pos) => pos,
            None => {
                headers.push(config.smart_graph_attribute.clone());
                headers.len() - 1
            }
        };

        let smart_value_pos = config.smart_value.as_ref().and_then(|name| {
            let pos = csv::find_col(&headers, name);
            if pos.is_none() {
                warn!("could not find column {name:?} for the smart value in {file}, ignoring");
            }
            pos
        });

        let key_pos = if config.write_key {
            Some(match csv::find_col(&headers, "_key") {
                Some(pos) => pos,
                None => {
                    headers.push("_key".to_string());
                    headers.len() - 1
                }
            })
        } else {
            None
        };

        let key_value_pos = config.key_value.as_ref().and_then(|name| {
            let pos = csv::find_col(&headers, name);
            if pos.is_none() && config.write_key {
                warn!("could not find column {name:?} for the key value in {file}, ignoring");
            }
            pos
        });

        Self {
            headers,
            smart_attr_pos,
            smart_value_pos,
            key_pos,
            key_value_pos,
        }
    }

    /// The output header line, including any appended columns.
    pub fn header_line(&self, sep: char, quo: char) -> String {
        csv::join_quoted(&self.headers, sep, quo)
    }

    /// Rewrite one data line.
    pub fn transform_line(&self, config: &VertexConfig, line: &str, line_no: u64) -> String {
        let sep = config.separator;
        let quo = config.quote_char;
        let mut parts = csv::split(line, sep, quo);
        // Short rows are padded so appended columns always exist.
        while parts.len() < self.headers.len() {
            parts.push(String::new());
        }

        let att = match self.smart_value_pos {
            Some(pos) => {
                let mut att = csv::unquote(&parts[pos], quo).into_owned();
                if config.hash_smart_value {
                    att = sha1_hex(att.as_bytes());
                }
                if let Some(n) = config.smart_index {
                    if n > 0 {
                        att = truncate_chars(&att, n);
                    }
                }
                parts[self.smart_attr_pos] = csv::quote(&att, quo).into_owned();
                att
            }
            None => csv::unquote(&parts[self.smart_attr_pos], quo).into_owned(),
        };

        if let Some(key_pos) = self.key_pos {
            let source = self.key_value_pos.unwrap_or(key_pos);
            let key = csv::unquote(&parts[source], quo).into_owned();
            if let Some(new_key) = rewrite_key(&key, &att, line_no) {
                parts[key_pos] = csv::quote(&new_key, quo).into_owned();
            }
        }

        csv::join(&parts, sep)
    }
}

/// Rewrite one JSONL vertex record.
///
/// The emitted object starts with `_key` (when written) and the smart graph
/// attribute, followed by all other fields in their original order.
pub fn transform_jsonl_line(
    config: &VertexConfig,
    line: &str,
    line_no: u64,
) -> serde_json::Result<String> {
    let obj = record::parse_object(line)?;
    let sga = &config.smart_graph_attribute;
    let smart_default = config.smart_default.as_deref();

    let mut att = String::new();
    if let Some(sv) = &config.smart_value {
        att = record::smart_to_string(obj.get(sv), smart_default, line_no);
        if config.hash_smart_value {
            att = sha1_hex(att.as_bytes());
        }
        if let Some(n) = config.smart_index {
            if n > 0 {
                att = truncate_chars(&att, n);
            }
        }
    }
    if att.is_empty() {
        att = record::smart_to_string(obj.get(sga), smart_default, line_no);
    }

    let key_source = config.key_value.as_deref().unwrap_or("_key");
    let mut new_key = String::new();
    if let Some(Value::String(key)) = obj.get(key_source) {
        new_key = match rewrite_key(key, &att, line_no) {
            Some(rewritten) => rewritten,
            None => key.clone(),
        };
    }

    let mut out = String::from("{");
    if config.write_key || !new_key.is_empty() {
        record::push_string_field(&mut out, "_key", &new_key);
        out.push(',');
    }
    record::push_string_field(&mut out, sga, &att);
    for (name, value) in &obj {
        if name == "_key" || name == sga {
            continue;
        }
        out.push(',');
        record::push_field(&mut out, name, value);
    }
    out.push('}');
    Ok(out)
}

/// Compute the smart form of a vertex key, or `None` when it is already
/// correct.
///
/// A key without a colon always gets the attribute prefixed, even when the
/// attribute is empty, so a written key carries exactly one colon. A key
/// that is already smart is checked against the attribute; on mismatch the
/// prefix is replaced with a warning.
fn rewrite_key(key: &str, att: &str, line_no: u64) -> Option<String> {
    match key.find(':') {
        None => Some(format!("{att}:{key}")),
        Some(cpos) => {
            if &key[..cpos] == att {
                None
            } else {
                warn!(
                    "line {line_no}: key {key:?} is already smart, but with the wrong \
                     smart graph attribute (expected {att:?}), rewriting"
                );
                Some(format!("{att}:{}", &key[cpos + 1..]))
            }
        }
    }
}

/// First `n` characters of `s`.
pub(crate) fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
