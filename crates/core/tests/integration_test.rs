//! Integration tests for the full decode pipeline.
//!
//! These tests run real stored droplets end to end: sequence file → bits →
//! droplet records → coverage table → peeling → text, and check the
//! recovered text against the known message fragments.

use dna_fountain_core::{
    decode_message,
    decoder::{DecoderConfig, PeelingDecoder},
    droplet::{DropletRecord, DropletSet, PAYLOAD_BITS},
    error::{DecodeError, Error},
    message::decode_text,
    symbol::encode_to_bits,
    CoverageTable,
};

/// Degree-1 droplet carrying the first block of the message.
const DROPLET_1: &str = "AAAAAAAAGACGGCTCACAAGTGAGCCAGCGGACAAGTCGGCGGGCAGGTACACAAATATATAAATGTATGAACTAACAAGCCAGTGGGCTGGCAGGCTCGCCGGTGAGTCGACAAGCCAGCAGGTATACAAGTGAGGCTATAT";

/// Covers block 27.
const DROPLET_135: &str = "AAAACAGCGTGTGCGGGTACGTATACAAGCACGCGGGTCGGCTTGCTCGCGAACAAGCCGGCTGGCAGGCGTGCCGGCTCGCAGGTGAGCCGGCTTGCTCACTAACAAGCTTGTACACAAGCCGGTGAACAAGCATTGATGACC";

/// Covers blocks 20 and 27.
const DROPLET_188: &str = "AAAACTCTAAGAAGGGAAAAAGACGGGTAATCAATAAGGTAACAGATCAACGGAGGAATCAATAAAACAATCAGTGAAGTAAGAAAGTGAGGGATTAATTAATAGGCGAAAAAAGTGATCAATCGGGAGAACAACCATGGTGCG";

/// Covers blocks 20 and 12.
const DROPLET_173: &str = "AAAACCTAAAGTAGCAAGATAGGGGGGTAGCTAAAAAACTAACTGAGAGATGAGAGAATTAAGAGAATAGCGAGCTAGTCAAAAAAAGAATAGGGAAATCAAAAAACCAAGTAGGAAGTCAAACAAAAAGACAAGGCCTCGGTC";

const BLOCK_0_TEXT: &str = "In the year 3074, humanity has t";
const BLOCK_12_TEXT: &str = "that wield the power to shape pl";
const BLOCK_20_TEXT: &str = "sprawling megacities, a young bi";
const BLOCK_27_TEXT: &str = "wers beyond imagination, or it c";

/// Sequence file with the four droplets, sequences wrapped over two lines.
fn fasta() -> String {
    [
        ("droplet_n1_seq", DROPLET_1),
        ("droplet_n135_seq", DROPLET_135),
        ("droplet_n188_seq", DROPLET_188),
        ("droplet_n173_seq", DROPLET_173),
    ]
    .iter()
    .map(|(name, seq)| format!(">{name}\n{}\n{}\n", &seq[..80], &seq[80..]))
    .collect()
}

fn payload_text(droplets: &DropletSet, id: u32) -> String {
    decode_text(droplets.get(id).unwrap().payload()).unwrap()
}

#[test]
fn test_symbol_codec_fixture() {
    let bits = encode_to_bits("AAGATCATTGGC").unwrap();
    assert_eq!(bits.to_string(), "000001001110001111010110");
}

#[test]
fn test_droplet_payload_lengths() {
    let droplets = DropletSet::from_fasta(&fasta()).unwrap();
    assert_eq!(droplets.len(), 4);

    for droplet in droplets.iter() {
        assert_eq!(droplet.bits().len(), 288);
        assert_eq!(droplet.payload().len(), PAYLOAD_BITS);
        // The index field counts droplets from zero
        assert_eq!(u32::from(droplet.index_field()) + 1, droplet.id());
    }
}

#[test]
fn test_degree_one_payloads_are_text() {
    let droplets = DropletSet::from_fasta(&fasta()).unwrap();
    assert_eq!(payload_text(&droplets, 1), BLOCK_0_TEXT);
    assert_eq!(payload_text(&droplets, 135), BLOCK_27_TEXT);
}

#[test]
fn test_manual_xor_chain() {
    let d135 = DropletRecord::from_sequence(135, DROPLET_135).unwrap();
    let d188 = DropletRecord::from_sequence(188, DROPLET_188).unwrap();
    let d173 = DropletRecord::from_sequence(173, DROPLET_173).unwrap();

    let block_27 = d135.payload().clone();
    let block_20 = block_27.xor(d188.payload()).unwrap();
    let block_12 = d173.payload().xor(&block_20).unwrap();

    assert_eq!(decode_text(&block_27).unwrap(), BLOCK_27_TEXT);
    assert_eq!(decode_text(&block_20).unwrap(), BLOCK_20_TEXT);
    assert_eq!(decode_text(&block_12).unwrap(), BLOCK_12_TEXT);
}

#[test]
fn test_full_pipeline_compact_indices() {
    let droplets = DropletSet::from_fasta(&fasta()).unwrap();
    // Same equations as the stored table, with the four blocks renumbered 0..4
    let coverage = CoverageTable::parse(
        "\"droplet n173 blocks [2, 1]\"\n\
         \"droplet n188 blocks [2, 3]\"\n\
         \"droplet n135 blocks [3]\"\n\
         \"droplet n1 blocks [0]\"\n",
    )
    .unwrap();

    let message = decode_message(&droplets, &coverage, DecoderConfig::default()).unwrap();

    assert_eq!(message.blocks.len(), 4);
    assert_eq!(
        message.text,
        [BLOCK_0_TEXT, BLOCK_12_TEXT, BLOCK_20_TEXT, BLOCK_27_TEXT].concat()
    );
    assert_eq!(message.stats.seeded, 2);
    assert_eq!(message.stats.peeled, 2);
}

#[test]
fn test_full_pipeline_verified() {
    let droplets = DropletSet::from_fasta(&fasta()).unwrap();
    let coverage = CoverageTable::parse("n1 [0]\nn135 [3]\nn188 [2,3]\nn173 [2,1]\n").unwrap();

    let config = DecoderConfig {
        verify_consistency: true,
        ..Default::default()
    };
    let message = decode_message(&droplets, &coverage, config).unwrap();
    assert_eq!(message.stats.verified, 4);
    assert!(message.text.starts_with(BLOCK_0_TEXT));
}

#[test]
fn test_stored_indices_report_missing_blocks() {
    let droplets = DropletSet::from_fasta(&fasta()).unwrap();
    let coverage =
        CoverageTable::parse("droplet n1 [0]\ndroplet n135 [27]\ndroplet n188 [20, 27]\ndroplet n173 [20, 12]\n")
            .unwrap();

    let err = PeelingDecoder::new(&coverage, DecoderConfig::default())
        .decode(&droplets)
        .unwrap_err();

    match err {
        Error::Decode(DecodeError::InsufficientCoverage { unresolved, total }) => {
            assert_eq!(total, 28);
            let expected: Vec<usize> = (0..28).filter(|b| ![0, 12, 20, 27].contains(b)).collect();
            assert_eq!(unresolved, expected);
        }
        other => panic!("expected insufficient coverage, got {other:?}"),
    }
}

#[test]
fn test_missing_sequence_aborts() {
    let droplets = DropletSet::from_fasta(&fasta()).unwrap();
    let coverage = CoverageTable::parse("n1 [0]\nn999 [0, 1]\n").unwrap();

    assert!(matches!(
        decode_message(&droplets, &coverage, DecoderConfig::default()),
        Err(Error::Decode(DecodeError::MissingDroplet { droplet_id: 999 }))
    ));
}
