//! Vertices command - rewrite vertex keys with the smart graph attribute

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use smartifier_core::{run_vertices, DataType, VertexConfig};
use tracing::debug;

use super::parse_data_type;
use crate::progress::{finish_phase, phase};
use crate::GlobalOptions;

/// Arguments for the vertices command
#[derive(Args, Debug)]
pub struct VerticesArgs {
    /// Input file
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Output file
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// Attribute name of the smart graph attribute
    #[arg(long, short = 'a')]
    smart_graph_attribute: String,

    /// Data type, "csv" or "jsonl"
    #[arg(
        long = "type",
        short = 't',
        default_value = "csv",
        env = "SMARTIFIER_TYPE",
        value_parser = parse_data_type
    )]
    data_type: DataType,

    /// Rewrite the _key column/attribute, as a smart graph needs it
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    write_key: bool,

    /// Limit RAM usage in MiB
    #[arg(long, short = 'm', default_value_t = 4096, env = "SMARTIFIER_MEMORY")]
    memory: usize,

    /// Attribute to derive the smart graph attribute value from
    #[arg(long)]
    smart_value: Option<String>,

    /// Take only this many characters from the beginning of the smart value
    #[arg(long)]
    smart_index: Option<usize>,

    /// Hash the smart value with SHA-1 before truncation
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    hash_smart_value: bool,

    /// Column separator for csv type
    #[arg(long, short = 's', default_value_t = ',')]
    separator: char,

    /// Quote character for csv type
    #[arg(long, default_value_t = '"')]
    quote_char: char,

    /// Smart graph attribute value for documents that carry none (JSONL)
    #[arg(long)]
    smart_default: Option<String>,

    /// Assign random smart values from 0..<nr>
    #[arg(long, value_name = "NR")]
    randomize_smart: Option<u64>,

    /// Rename column <nr> to <newname> before processing (CSV, repeatable)
    #[arg(long = "rename-column", value_name = "NR:NEWNAME", value_parser = parse_rename)]
    rename_column: Vec<(usize, String)>,

    /// Build the key from the column/attribute with this name
    #[arg(long)]
    key_value: Option<String>,
}

/// Parse a `--rename-column` value of the form `<nr>:<newname>`
fn parse_rename(s: &str) -> Result<(usize, String), String> {
    let (nr, name) = s
        .split_once(':')
        .ok_or_else(|| format!("expected <nr>:<newname>, got {s:?}"))?;
    let nr: usize = nr
        .parse()
        .map_err(|_| format!("column number in {s:?} is not a number"))?;
    if name.is_empty() {
        return Err(format!("empty column name in {s:?}"));
    }
    Ok((nr, name.to_string()))
}

/// Execute the vertices command
pub fn execute(args: VerticesArgs, global: GlobalOptions) -> Result<()> {
    if args.randomize_smart.is_some() {
        anyhow::bail!("--randomize-smart is not implemented");
    }
    debug!(
        "memory limit {} MiB (vertex mode streams line by line)",
        args.memory
    );

    let mut config = VertexConfig::new(args.smart_graph_attribute, args.data_type);
    config.smart_value = args.smart_value;
    config.smart_index = args.smart_index;
    config.hash_smart_value = args.hash_smart_value;
    config.smart_default = args.smart_default;
    config.write_key = args.write_key;
    config.key_value = args.key_value;
    config.separator = args.separator;
    config.quote_char = args.quote_char;
    config.renames = args.rename_column;

    let pb = phase("Transforming vertices...", global.quiet);
    let stats = run_vertices(&args.input, &args.output, &config)
        .with_context(|| format!("failed to transform vertices in {}", args.input.display()))?;
    finish_phase(pb, &format!("Transformed {} vertices", stats.lines));
    Ok(())
}
