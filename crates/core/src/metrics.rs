//! Decode statistics.
//!
//! The decoder fills a [`DecodeStats`] as it runs so callers can see how the
//! message was recovered: how many blocks came straight from degree-1
//! droplets, how many were peeled, and how many passes it took.

use std::fmt;
use std::time::Duration;

/// Counters collected during one decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeStats {
    // === Input ===
    /// Droplets available to the decoder
    pub droplets: usize,

    /// Rows in the coverage table
    pub coverage_entries: usize,

    /// Droplets that no coverage row references
    pub unused_droplets: usize,

    /// Source blocks to resolve (`N`)
    pub block_count: usize,

    // === Resolution ===
    /// Blocks resolved directly from degree-1 droplets
    pub seeded: usize,

    /// Degree-1 droplets that repeated an already seeded block
    pub redundant_seeds: usize,

    /// Blocks resolved by peeling
    pub peeled: usize,

    /// Peel passes run
    pub passes: usize,

    /// Coverage rows checked against the resolved blocks
    pub verified: usize,

    // === Timing ===
    /// Wall time spent in the decoder
    pub elapsed: Duration,
}

impl DecodeStats {
    /// Total blocks resolved.
    pub fn resolved(&self) -> usize {
        self.seeded + self.peeled
    }

    /// Coverage rows per source block.
    ///
    /// Returns 0.0 if there are no blocks.
    pub fn overhead(&self) -> f64 {
        if self.block_count == 0 {
            0.0
        } else {
            self.coverage_entries as f64 / self.block_count as f64
        }
    }
}

impl fmt::Display for DecodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Decode Summary ===")?;
        writeln!(f, "Duration: {} us", self.elapsed.as_micros())?;
        writeln!(f)?;
        writeln!(f, "Droplets: {} ({} unused)", self.droplets, self.unused_droplets)?;
        writeln!(f, "Coverage rows: {} ({:.2} per block)", self.coverage_entries, self.overhead())?;
        writeln!(f, "Blocks: {}", self.block_count)?;
        writeln!(f)?;
        writeln!(f, "Seeded: {} ({} redundant)", self.seeded, self.redundant_seeds)?;
        writeln!(f, "Peeled: {} in {} passes", self.peeled, self.passes)?;
        if self.verified > 0 {
            writeln!(f, "Verified rows: {}", self.verified)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_and_overhead() {
        let stats = DecodeStats {
            coverage_entries: 30,
            block_count: 20,
            seeded: 4,
            peeled: 16,
            ..Default::default()
        };
        assert_eq!(stats.resolved(), 20);
        assert!((stats.overhead() - 1.5).abs() < f64::EPSILON);
        assert_eq!(DecodeStats::default().overhead(), 0.0);
    }

    #[test]
    fn test_summary_mentions_counts() {
        let stats = DecodeStats {
            seeded: 3,
            peeled: 7,
            passes: 2,
            ..Default::default()
        };
        let summary = stats.to_string();
        assert!(summary.contains("Peeled: 7 in 2 passes"));
        assert!(!summary.contains("Verified"));
    }
}
