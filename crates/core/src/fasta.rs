//! FASTA-like sequence file parsing.
//!
//! Droplets are stored one record per droplet:
//!
//! ```text
//! >droplet_n135_some_annotation
//! AAAACAGCGTGTGCGGGTACGTATACAAGCACGCGGGTCGGCTTGCTCGCGAACAAGCCGG
//! CTGGCAGGCGTGCCGGCTCGCAGGTGAGCCGGCTTGCTCACTAACAAGCTTGTACACAAGC
//! CGGTGAACAAGCATTGATGACC
//! ```
//!
//! The record name is the first whitespace-separated token of the header.
//! Sequence lines are concatenated. Blank lines and `;` comment lines are
//! skipped.

use crate::error::{RecordError, Result};
use regex_lite::Regex;
use std::sync::OnceLock;

/// One `>name` record and its concatenated sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// First token of the header line (without `>`)
    pub name: String,

    /// Sequence lines joined together
    pub sequence: String,

    /// 1-based line number of the header
    pub line: usize,
}

/// Parse every record in a sequence file.
///
/// # Errors
/// `RecordError::MalformedFasta` if sequence data appears before the first
/// header or a header has no name.
pub fn parse_fasta(text: &str) -> Result<Vec<SequenceRecord>> {
    let mut records = Vec::new();
    let mut current: Option<SequenceRecord> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('>') {
            let name = header.split_whitespace().next().ok_or_else(|| RecordError::MalformedFasta {
                line,
                reason: "header has no record name".to_string(),
            })?;
            if let Some(done) = current.take() {
                records.push(done);
            }
            current = Some(SequenceRecord {
                name: name.to_string(),
                sequence: String::new(),
                line,
            });
            continue;
        }

        match current.as_mut() {
            Some(record) => record.sequence.push_str(trimmed),
            None => {
                return Err(RecordError::MalformedFasta {
                    line,
                    reason: "sequence data before the first header".to_string(),
                }
                .into())
            }
        }
    }

    if let Some(done) = current {
        records.push(done);
    }

    Ok(records)
}

fn droplet_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^droplet_n(\d+)(?:_.*)?$").expect("droplet name pattern compiles"))
}

/// Extract the droplet number from a record name such as `droplet_n135_x`.
///
/// # Errors
/// `RecordError::MalformedDropletName` if the name does not follow the
/// `droplet_n<id>` convention or the number does not fit in a `u32`.
pub fn droplet_id_from_name(name: &str) -> Result<u32> {
    droplet_name_pattern()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .ok_or_else(|| {
            RecordError::MalformedDropletName {
                name: name.to_string(),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_multiline_records() {
        let text = ">droplet_n1_a first\nACGT\nTTGG\n\n>droplet_n2\n  CCAA  \n";
        let records = parse_fasta(text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "droplet_n1_a");
        assert_eq!(records[0].sequence, "ACGTTTGG");
        assert_eq!(records[0].line, 1);
        assert_eq!(records[1].name, "droplet_n2");
        assert_eq!(records[1].sequence, "CCAA");
        assert_eq!(records[1].line, 5);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_fasta("").unwrap().is_empty());
        assert!(parse_fasta("\n\n; comment only\n").unwrap().is_empty());
    }

    #[test]
    fn test_sequence_before_header() {
        let err = parse_fasta("ACGT\n>droplet_n1\nACGT\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Record(RecordError::MalformedFasta { line: 1, .. })
        ));
    }

    #[test]
    fn test_header_without_name() {
        let err = parse_fasta(">droplet_n1\nAC\n>   \nGT\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Record(RecordError::MalformedFasta { line: 3, .. })
        ));
    }

    #[test]
    fn test_droplet_id_from_name() {
        assert_eq!(droplet_id_from_name("droplet_n135_seq").unwrap(), 135);
        assert_eq!(droplet_id_from_name("droplet_n7").unwrap(), 7);

        for bad in ["droplet_135", "seq_n12", "droplet_nX", "droplet_n12x", "droplet_n99999999999"] {
            assert!(
                matches!(
                    droplet_id_from_name(bad),
                    Err(Error::Record(RecordError::MalformedDropletName { .. }))
                ),
                "{bad} should be rejected"
            );
        }
    }
}
