//! Peeling decoder for XOR-only Luby-Transform droplets.
//!
//! Every coverage row is an equation over GF(2):
//!
//! ```text
//! payload(droplet) = block[b0] ^ block[b1] ^ ... ^ block[bk]
//! ```
//!
//! Decoding runs in two phases:
//! 1. **Seed**: degree-1 rows give their block directly.
//! 2. **Peel**: any row with exactly one unresolved block gives that block as
//!    the droplet payload XOR every resolved block in the row. Newly resolved
//!    blocks are usable by later rows in the same pass.
//!
//! # Ordering
//!
//! Rows are visited in ascending degree, ties kept in table order, so low
//! degree rows unlock blocks before the wide rows that need them. Order
//! changes how many passes are needed, never the result.
//!
//! # Termination
//!
//! Each pass either resolves at least one block or ends the decode, so at
//! most `N` passes run. The pass cap (`rows × N` unless configured) is a
//! second, explicit bound. Stopping with blocks still unresolved is
//! `DecodeError::InsufficientCoverage`, which lists every missing index.
//!
//! # Thread Safety
//!
//! The resolution map is owned by a single `decode` call. Decoders hold only
//! shared references and may be reused.

use crate::bitio::Bits;
use crate::coverage::{CoverageTable, MAX_BLOCKS};
use crate::droplet::DropletSet;
use crate::error::{DecodeError, Result};
use crate::message::assemble;
use crate::metrics::DecodeStats;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tuning for [`PeelingDecoder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// After solving, check every row's XOR against its droplet payload
    pub verify_consistency: bool,

    /// Override the pass cap (default: rows × blocks)
    pub max_passes: Option<usize>,

    /// Refuse tables describing more blocks than this (default: `MAX_BLOCKS`)
    pub max_blocks: Option<usize>,
}

/// A coverage row joined with its droplet payload.
#[derive(Debug)]
struct Equation<'a> {
    droplet_id: u32,
    blocks: &'a [usize],
    payload: &'a Bits,
    /// Row has no unresolved block left
    consumed: bool,
}

/// Block index → resolved payload.
///
/// # Invariants
/// - a slot is written at most once
/// - `resolved` counts the filled slots
#[derive(Debug)]
struct ResolutionMap {
    blocks: Vec<Option<Bits>>,
    resolved: usize,
}

impl ResolutionMap {
    fn new(total: usize) -> Self {
        Self {
            blocks: vec![None; total],
            resolved: 0,
        }
    }

    fn get(&self, block: usize) -> Option<&Bits> {
        self.blocks.get(block).and_then(Option::as_ref)
    }

    fn is_resolved(&self, block: usize) -> bool {
        self.get(block).is_some()
    }

    /// Fill an empty slot. Returns false, leaving the slot alone, if it was
    /// already filled.
    fn resolve(&mut self, block: usize, payload: Bits) -> bool {
        match self.blocks.get_mut(block) {
            Some(slot) if slot.is_none() => {
                *slot = Some(payload);
                self.resolved += 1;
                true
            }
            _ => false,
        }
    }

    fn is_complete(&self) -> bool {
        self.resolved == self.blocks.len()
    }

    fn remaining(&self) -> usize {
        self.blocks.len() - self.resolved
    }

    fn unresolved(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(block, _)| block)
            .collect()
    }

    /// All payloads in index order, or `None` if any block is missing.
    fn into_blocks(self) -> Option<Vec<Bits>> {
        self.blocks.into_iter().collect()
    }
}

/// Every source block, in index order.
#[derive(Debug, Clone)]
pub struct DecodedBlocks {
    blocks: Vec<Bits>,
    stats: DecodeStats,
}

impl DecodedBlocks {
    pub fn blocks(&self) -> &[Bits] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Bits> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Concatenate blocks `0..N` into the message bit string.
    pub fn into_bits(self) -> Bits {
        assemble(&self.blocks)
    }

    /// Split into the blocks and the statistics.
    pub fn into_parts(self) -> (Vec<Bits>, DecodeStats) {
        (self.blocks, self.stats)
    }
}

/// Resolves source blocks from droplets and a coverage table.
#[derive(Debug, Clone, Copy)]
pub struct PeelingDecoder<'a> {
    table: &'a CoverageTable,
    config: DecoderConfig,
}

impl<'a> PeelingDecoder<'a> {
    pub fn new(table: &'a CoverageTable, config: DecoderConfig) -> Self {
        Self { table, config }
    }

    /// Number of source blocks this table describes.
    pub fn block_count(&self) -> usize {
        self.table.block_count()
    }

    /// Largest `N` this decoder will allocate for.
    pub fn block_limit(&self) -> usize {
        self.config.max_blocks.unwrap_or(MAX_BLOCKS)
    }

    /// Maximum number of peel passes before giving up.
    pub fn pass_limit(&self) -> usize {
        self.config
            .max_passes
            .unwrap_or_else(|| self.table.len().saturating_mul(self.block_count()))
    }

    /// Resolve every block in `[0, N)`.
    ///
    /// # Errors
    /// - `DecodeError::EmptyCoverage` if the table has no rows
    /// - `DecodeError::TooManyBlocks` if `N` exceeds the block limit
    /// - `DecodeError::MissingDroplet` if a row names an unknown droplet
    /// - `DecodeError::ConflictingResolution` if two degree-1 droplets
    ///   disagree about the same block
    /// - `DecodeError::InsufficientCoverage` if peeling stalls
    /// - `DecodeError::InconsistentDroplet` if verification is on and a row
    ///   does not match the solution
    /// - `BitIoError::LengthMismatch` if payload widths differ
    pub fn decode(&self, droplets: &DropletSet) -> Result<DecodedBlocks> {
        let start = Instant::now();

        if self.table.is_empty() {
            return Err(DecodeError::EmptyCoverage.into());
        }

        let total = self.block_count();
        let limit = self.block_limit();
        if total > limit {
            return Err(DecodeError::TooManyBlocks { blocks: total, limit }.into());
        }

        let mut equations = self.equations(droplets)?;
        let mut state = ResolutionMap::new(total);
        let mut stats = DecodeStats {
            droplets: droplets.len(),
            coverage_entries: self.table.len(),
            unused_droplets: self.unused_droplets(droplets),
            block_count: total,
            ..Default::default()
        };

        if stats.unused_droplets > 0 {
            warn!(count = stats.unused_droplets, "droplets without coverage rows are ignored");
        }

        Self::seed(&mut equations, &mut state, &mut stats)?;
        self.peel(&mut equations, &mut state, &mut stats)?;

        if !state.is_complete() {
            let unresolved = state.unresolved();
            debug!(?unresolved, passes = stats.passes, "peeling stalled");
            return Err(DecodeError::InsufficientCoverage { unresolved, total }.into());
        }

        if self.config.verify_consistency {
            Self::verify(&equations, &state, &mut stats)?;
        }

        let unresolved_error = || DecodeError::InsufficientCoverage {
            unresolved: Vec::new(),
            total,
        };
        let blocks = state.into_blocks().ok_or_else(unresolved_error)?;

        stats.elapsed = start.elapsed();
        info!(
            blocks = total,
            seeded = stats.seeded,
            peeled = stats.peeled,
            passes = stats.passes,
            "decoded all source blocks"
        );

        Ok(DecodedBlocks { blocks, stats })
    }

    /// Join each coverage row with its droplet payload, lowest degree first.
    fn equations<'e>(&'e self, droplets: &'e DropletSet) -> Result<Vec<Equation<'e>>> {
        let mut equations = Vec::with_capacity(self.table.len());
        for entry in self.table.entries() {
            let droplet = droplets.get(entry.droplet_id()).ok_or(DecodeError::MissingDroplet {
                droplet_id: entry.droplet_id(),
            })?;
            equations.push(Equation {
                droplet_id: entry.droplet_id(),
                blocks: entry.blocks(),
                payload: droplet.payload(),
                consumed: false,
            });
        }
        // Stable: equal degrees keep table order
        equations.sort_by_key(|eq| eq.blocks.len());
        Ok(equations)
    }

    fn unused_droplets(&self, droplets: &DropletSet) -> usize {
        let referenced: HashSet<u32> = self.table.entries().iter().map(|e| e.droplet_id()).collect();
        droplets.iter().filter(|d| !referenced.contains(&d.id())).count()
    }

    /// Degree-1 rows resolve their block without any XOR.
    fn seed(equations: &mut [Equation<'_>], state: &mut ResolutionMap, stats: &mut DecodeStats) -> Result<()> {
        for eq in equations.iter_mut().filter(|eq| eq.blocks.len() == 1) {
            let block = eq.blocks[0];
            eq.consumed = true;

            match state.get(block) {
                Some(existing) if existing != eq.payload => {
                    return Err(DecodeError::ConflictingResolution {
                        block,
                        droplet_id: eq.droplet_id,
                    }
                    .into());
                }
                Some(_) => {
                    debug!(block, droplet = eq.droplet_id, "redundant seed");
                    stats.redundant_seeds += 1;
                }
                None => {
                    state.resolve(block, eq.payload.clone());
                    stats.seeded += 1;
                }
            }
        }

        debug!(seeded = stats.seeded, remaining = state.remaining(), "seed phase done");
        Ok(())
    }

    /// Repeat passes until complete, stalled, or out of passes.
    fn peel(&self, equations: &mut [Equation<'_>], state: &mut ResolutionMap, stats: &mut DecodeStats) -> Result<()> {
        let limit = self.pass_limit();

        while !state.is_complete() && stats.passes < limit {
            stats.passes += 1;
            let mut progress = 0;

            for eq in equations.iter_mut().filter(|eq| !eq.consumed) {
                let mut unknown = eq.blocks.iter().copied().filter(|&b| !state.is_resolved(b));
                let (Some(target), None) = (unknown.next(), unknown.next()) else {
                    // No unknowns: nothing left to learn. Several: wait.
                    if eq.blocks.iter().all(|&b| state.is_resolved(b)) {
                        eq.consumed = true;
                    }
                    continue;
                };

                let mut payload = eq.payload.clone();
                for known in eq.blocks.iter().filter_map(|&b| state.get(b)) {
                    payload.xor_assign(known)?;
                }

                state.resolve(target, payload);
                eq.consumed = true;
                stats.peeled += 1;
                progress += 1;
            }

            debug!(
                pass = stats.passes,
                resolved = progress,
                remaining = state.remaining(),
                "peel pass"
            );

            if progress == 0 {
                break;
            }
        }

        Ok(())
    }

    /// Check every row against the fully resolved blocks.
    fn verify(equations: &[Equation<'_>], state: &ResolutionMap, stats: &mut DecodeStats) -> Result<()> {
        for eq in equations {
            let mut acc = eq.payload.clone();
            for known in eq.blocks.iter().filter_map(|&b| state.get(b)) {
                acc.xor_assign(known)?;
            }
            if acc.count_ones() != 0 {
                return Err(DecodeError::InconsistentDroplet {
                    droplet_id: eq.droplet_id,
                }
                .into());
            }
            stats.verified += 1;
        }
        Ok(())
    }
}
