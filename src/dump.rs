//! Simple event dump parsing
//!
//! A dump holds one event per line with whitespace-separated columns. Column 0
//! is the event timestamp; everything after it is carried along untouched.

use crate::error::{InspectError, Result};
use std::path::Path;
use tracing::debug;

/// A parsed dump line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpEntry {
    pub timestamp: u64,
    /// Remaining columns, opaque to the warp detector
    pub fields: Vec<String>,
}

/// Parse dump text into entries.
///
/// Blank lines are skipped. A malformed timestamp on any line aborts the whole
/// parse; there is no per-line recovery.
pub fn parse_dump(text: &str) -> Result<Vec<DumpEntry>> {
    let mut entries = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let mut columns = line.split_whitespace();
        let Some(first) = columns.next() else {
            continue;
        };

        let timestamp = first
            .parse::<u64>()
            .map_err(|source| InspectError::DumpParse {
                line: idx + 1,
                value: first.to_string(),
                source,
            })?;

        entries.push(DumpEntry {
            timestamp,
            fields: columns.map(str::to_string).collect(),
        });
    }

    Ok(entries)
}

/// Read and parse the dump at `path`
pub fn read_dump(path: &Path) -> Result<Vec<DumpEntry>> {
    let text = std::fs::read_to_string(path).map_err(|source| InspectError::DumpOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_dump(&text)?;
    debug!(path = %path.display(), entries = entries.len(), "parsed dump");
    Ok(entries)
}

/// Project the timestamp column, preserving order
pub fn timestamps(entries: &[DumpEntry]) -> Vec<u64> {
    entries.iter().map(|e| e.timestamp).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_order_and_extra_columns() {
        let entries = parse_dump("100 3 7\n110 4 9\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].timestamp, 100);
        assert_eq!(entries[0].fields, vec!["3", "7"]);
        assert_eq!(entries[1].timestamp, 110);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let entries = parse_dump("1\n\n   \n2\n").unwrap();
        assert_eq!(timestamps(&entries), vec![1, 2]);
    }

    #[test]
    fn test_single_bad_line_aborts_parse() {
        let err = parse_dump("10 a\n20 b\nbogus c\n30 d\n").unwrap_err();
        match err {
            InspectError::DumpParse { line, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(value, "bogus");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_timestamp_rejected() {
        assert!(parse_dump("-5\n").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_dump("").unwrap().is_empty());
    }

    #[test]
    fn test_read_dump_missing_file() {
        let err = read_dump(Path::new("/nonexistent/dump.txt")).unwrap_err();
        assert!(matches!(err, InspectError::DumpOpen { .. }));
    }
}
