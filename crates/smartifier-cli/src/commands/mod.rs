//! CLI command implementations

pub mod edges;
pub mod vertices;

use smartifier_core::DataType;

/// Parse the data type from a `--type` value
pub(crate) fn parse_data_type(s: &str) -> Result<DataType, String> {
    s.parse()
}
