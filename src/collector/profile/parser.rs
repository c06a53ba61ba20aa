//! Parser for the `key value` files written by the profile plugin.
//!
//! Format: one pair per line, key and value separated by the first space.
//! Example:
//! ```text
//! time 1700000030
//! CPUUtilization 98.20
//! ```

use std::collections::BTreeMap;

/// Error for a file that is not in `key value` format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A non-empty line without any space (1-based line number).
    MissingSeparator { line: usize },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingSeparator { line } => {
                write!(f, "line {}: expected 'key value'", line)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses file contents into a key -> value table.
///
/// Values are trimmed and kept as strings. A repeated key keeps its last
/// value. Blank lines are ignored.
pub fn parse_key_values(content: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let mut table = BTreeMap::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(' ') else {
            return Err(ParseError::MissingSeparator { line: idx + 1 });
        };
        table.insert(key.to_string(), value.trim().to_string());
    }

    Ok(table)
}
