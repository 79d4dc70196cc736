//! Coverage table: which source blocks each droplet XOR-combines.
//!
//! The table is stored as one row per droplet, for example:
//!
//! ```text
//! "droplet n188 blocks [20, 27]"
//! "droplet n135 blocks [27]"
//! ```
//!
//! The droplet id is the first `n<digits>` in the row and the coverage set is
//! the first bracketed, comma-separated list. Anything else on the row is
//! ignored, including CSV quoting.
//!
//! The same droplet id may appear on several rows; each row is treated as an
//! independent equation over that droplet's payload.
//!
//! Block indices must be below [`MAX_BLOCKS`].

use crate::error::{CoverageError, Result};
use regex_lite::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Upper bound on `N`: every block index is `< MAX_BLOCKS`.
///
/// 2^20 blocks of 256 bits is a 32 MiB message.
pub const MAX_BLOCKS: usize = 1 << 20;

/// One droplet's coverage set.
///
/// # Invariants
/// - `blocks` is non-empty
/// - `blocks` has no repeated index
/// - every index is below [`MAX_BLOCKS`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageEntry {
    droplet_id: u32,
    blocks: Vec<usize>,
}

impl CoverageEntry {
    /// Build an entry from already parsed values.
    ///
    /// # Errors
    /// `CoverageError::InvalidEntry` if `blocks` is empty, repeats an index,
    /// or names an index of `MAX_BLOCKS` or more.
    pub fn new(droplet_id: u32, blocks: Vec<usize>) -> Result<Self> {
        check_blocks(&blocks).map_err(|reason| CoverageError::InvalidEntry { droplet_id, reason })?;
        Ok(Self { droplet_id, blocks })
    }

    /// Parse one table row. `line` is only used in error reports.
    ///
    /// # Errors
    /// `CoverageError::MalformedCoverageRow` if the row has no droplet id, no
    /// bracketed list, a non-integer item, an index of `MAX_BLOCKS` or more,
    /// or a repeated index.
    pub fn parse_row(row: &str, line: usize) -> Result<Self> {
        let malformed = |reason: String| CoverageError::MalformedCoverageRow { line, reason };

        let droplet_id = droplet_pattern()
            .captures(row)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| malformed("no droplet id (n<digits>)".to_string()))?
            .as_str()
            .parse::<u32>()
            .map_err(|e| malformed(format!("droplet id: {e}")))?;

        let list = list_pattern()
            .captures(row)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| malformed("no bracketed block list".to_string()))?
            .as_str();

        let mut blocks = Vec::new();
        for item in list.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let block = item
                .parse::<usize>()
                .map_err(|_| malformed(format!("block index {item:?} is not a non-negative integer")))?;
            blocks.push(block);
        }
        check_blocks(&blocks).map_err(malformed)?;

        Ok(Self { droplet_id, blocks })
    }

    pub fn droplet_id(&self) -> u32 {
        self.droplet_id
    }

    /// Covered block indices, in table order.
    pub fn blocks(&self) -> &[usize] {
        &self.blocks
    }

    /// Size of the coverage set.
    pub fn degree(&self) -> usize {
        self.blocks.len()
    }
}

fn check_blocks(blocks: &[usize]) -> std::result::Result<(), String> {
    if blocks.is_empty() {
        return Err("coverage set is empty".to_string());
    }
    let mut seen = HashSet::with_capacity(blocks.len());
    for &block in blocks {
        if block >= MAX_BLOCKS {
            return Err(format!("block {block} is out of range (limit {MAX_BLOCKS})"));
        }
        if !seen.insert(block) {
            return Err(format!("block {block} listed twice"));
        }
    }
    Ok(())
}

fn droplet_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"n(\d+)").expect("droplet id pattern compiles"))
}

fn list_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[([^\]]*)\]").expect("block list pattern compiles"))
}

/// The full coverage metadata, immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageTable {
    entries: Vec<CoverageEntry>,
}

impl CoverageTable {
    pub fn new(entries: Vec<CoverageEntry>) -> Self {
        Self { entries }
    }

    /// Parse every non-blank line of a coverage file.
    ///
    /// # Errors
    /// The first `CoverageError::MalformedCoverageRow`, with its 1-based line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (idx, row) in text.lines().enumerate() {
            if row.trim().is_empty() {
                continue;
            }
            entries.push(CoverageEntry::parse_row(row, idx + 1)?);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CoverageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `N`: one past the largest block index referenced anywhere, or 0 for
    /// an empty table.
    pub fn block_count(&self) -> usize {
        self.entries
            .iter()
            .flat_map(|entry| entry.blocks.iter())
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn row_error(row: &str) -> String {
        match CoverageEntry::parse_row(row, 4) {
            Err(Error::Coverage(CoverageError::MalformedCoverageRow { line, reason })) => {
                assert_eq!(line, 4);
                reason
            }
            other => panic!("expected malformed row, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_row() {
        let entry = CoverageEntry::parse_row("\"droplet n188 blocks [20, 27]\"", 1).unwrap();
        assert_eq!(entry.droplet_id(), 188);
        assert_eq!(entry.blocks(), &[20, 27]);
        assert_eq!(entry.degree(), 2);

        let entry = CoverageEntry::parse_row("drop_n135 - blocks: [27]", 1).unwrap();
        assert_eq!(entry.droplet_id(), 135);
        assert_eq!(entry.blocks(), &[27]);
    }

    #[test]
    fn test_row_order_preserved() {
        let entry = CoverageEntry::parse_row("n3 [9,2,  5 ]", 1).unwrap();
        assert_eq!(entry.blocks(), &[9, 2, 5]);
    }

    #[test]
    fn test_malformed_rows() {
        assert!(row_error("droplet n12 blocks 3, 4").contains("bracketed"));
        assert!(row_error("droplet blocks [3, 4]").contains("droplet id"));
        assert!(row_error("droplet n12 blocks []").contains("empty"));
        assert!(row_error("droplet n12 blocks [3, x]").contains("\"x\""));
        assert!(row_error("droplet n12 blocks [3, -1]").contains("\"-1\""));
        assert!(row_error("droplet n12 blocks [3, 3]").contains("twice"));
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        assert!(row_error("n1 [18446744073709551615]").contains("out of range"));
        assert!(row_error("n1 [1, 4000000000000]").contains("out of range"));
        assert!(row_error(&format!("n1 [{MAX_BLOCKS}]")).contains("out of range"));

        let entry = CoverageEntry::parse_row(&format!("n1 [{}]", MAX_BLOCKS - 1), 4).unwrap();
        let table = CoverageTable::new(vec![entry]);
        assert_eq!(table.block_count(), MAX_BLOCKS);

        let err = CoverageTable::parse("n1 [0]\nn2 [18446744073709551615]\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Coverage(CoverageError::MalformedCoverageRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_table() {
        let text = "droplet n1 [0]\n\n\"droplet n188 [20, 27]\"\ndroplet n188 [20]\n";
        let table = CoverageTable::parse(text).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.block_count(), 28);
        // Repeated droplet ids are separate entries
        assert_eq!(table.entries()[1].droplet_id(), table.entries()[2].droplet_id());
    }

    #[test]
    fn test_parse_table_reports_line() {
        let err = CoverageTable::parse("n1 [0]\n\nn2 (1)\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Coverage(CoverageError::MalformedCoverageRow { line: 3, .. })
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = CoverageTable::parse("").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.block_count(), 0);
    }

    #[test]
    fn test_programmatic_entries() {
        assert!(CoverageEntry::new(1, vec![0, 4]).is_ok());
        assert!(matches!(
            CoverageEntry::new(1, vec![]),
            Err(Error::Coverage(CoverageError::InvalidEntry { droplet_id: 1, .. }))
        ));
        assert!(CoverageEntry::new(1, vec![2, 2]).is_err());
        assert!(matches!(
            CoverageEntry::new(1, vec![0, usize::MAX]),
            Err(Error::Coverage(CoverageError::InvalidEntry { droplet_id: 1, .. }))
        ));
    }
}
