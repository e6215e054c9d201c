//! Scoring policies and the pairwise scorer
//!
//! A policy bundles a substitution matrix over the TVR motif alphabet, gap
//! penalties, the log-compression base and the threshold above which a pair is
//! reported. Two policies exist; both de-weight the canonical motif so that
//! rarer, more diagnostic motifs drive the similarity.
//!
//! Alphabet is from Telogator2's `resources/kmers.tsv`; `A` is the unknown
//! motif letter.

use crate::aligner::{GapPenalties, PairwiseAligner};
use crate::cigar::{decode_cigar, Trace};
use crate::encode::log_compress;
use crate::error::{Result, TeloError};
use crate::matrix::{Override, ScoringMatrix};
use std::slice;

pub const SCORING_ALPHABET: &[u8] = b"ACDEFGHIKLMNPRSQTVWY";
pub const CANONICAL_LETTER: u8 = b'C';
pub const CANONICAL_INDEL_LETTER: u8 = b'T';
pub const DUBIOUS_LETTERS: &[u8] = b"VWY";

/// Total symbol -> weight table used for the normalizer
#[derive(Debug, Clone)]
pub struct SymbolWeights([Option<i32>; 256]);

impl SymbolWeights {
    /// Every alphabet symbol gets `default`, then `classes` override per symbol.
    pub fn new(alphabet: &[u8], default: i32, classes: &[(&[u8], i32)]) -> Self {
        let mut table = [None; 256];
        for &symbol in alphabet {
            table[symbol as usize] = Some(default);
        }
        for &(symbols, weight) in classes {
            for &symbol in symbols {
                table[symbol as usize] = Some(weight);
            }
        }
        SymbolWeights(table)
    }

    pub fn get(&self, symbol: u8) -> Option<i32> {
        self.0[symbol as usize]
    }
}

/// Similarity of one pair plus the trace that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct PairScore {
    pub similarity: f64,
    pub raw_score: i32,
    pub normalizer: i32,
    pub trace: Trace,
}

/// Order two sequences as (query, database).
///
/// The shorter sequence is the query; on equal length the lexicographically
/// smaller one is, so scoring is symmetric in its arguments.
pub fn query_and_database<'a>(seq1: &'a str, seq2: &'a str) -> (&'a str, &'a str) {
    if (seq1.len(), seq1) <= (seq2.len(), seq2) {
        (seq1, seq2)
    } else {
        (seq2, seq1)
    }
}

/// Capability set shared by the scoring policies
pub trait ScoringSystem: Send + Sync {
    /// Short policy name used in logs
    fn name(&self) -> &'static str;

    fn gap_penalties(&self) -> GapPenalties;

    fn compression_log_base(&self) -> f64;

    /// Pairs scoring strictly above this are reported
    fn score_log_threshold(&self) -> f64;

    /// Substitution matrix, built once at construction
    fn scoring_matrix(&self) -> &ScoringMatrix;

    /// Per-symbol weight used to compute the normalizer
    fn match_score_for_letter(&self, letter: u8) -> Option<i32>;

    fn encode_seq(&self, seq: &str) -> Result<String> {
        log_compress(seq, self.compression_log_base())
    }

    /// Maximum achievable score of `query` against itself
    fn normalizer(&self, query: &str) -> Result<i32> {
        query.bytes().try_fold(0i32, |total, c| {
            self.match_score_for_letter(c)
                .map(|w| total + w)
                .ok_or_else(|| unknown_symbol(c, query))
        })
    }

    /// Align two encoded sequences and normalize the raw score into [0, 1].
    fn score_seqs(
        &self,
        aligner: &dyn PairwiseAligner,
        seq1: &str,
        seq2: &str,
    ) -> Result<PairScore> {
        let (query, database) = query_and_database(seq1, seq2);
        let matrix = self.scoring_matrix();
        for seq in [query, database] {
            if let Some(c) = matrix.first_unknown(seq.as_bytes()) {
                return Err(unknown_symbol(c, seq));
            }
        }

        let normalizer = self.normalizer(query)?;
        if normalizer <= 0 {
            return Err(TeloError::InvalidInput(format!(
                "non-positive normalizer {normalizer} for {query}"
            )));
        }

        let raw = aligner.align_global(
            query.as_bytes(),
            database.as_bytes(),
            matrix,
            self.gap_penalties(),
        );

        Ok(PairScore {
            similarity: (raw.score as f64 / normalizer as f64).max(0.0),
            raw_score: raw.score,
            normalizer,
            trace: decode_cigar(&raw.cigar),
        })
    }
}

fn unknown_symbol(c: u8, seq: &str) -> TeloError {
    TeloError::UnknownSymbol {
        symbol: c as char,
        sequence: seq.to_string(),
    }
}

/// Policy 1: canonical self-match de-weighted, everything else uniform
#[derive(Debug, Clone)]
pub struct Scoring1 {
    matrix: ScoringMatrix,
    weights: SymbolWeights,
}

impl Scoring1 {
    pub const GAP_OPEN_PENALTY: i32 = 3;
    pub const GAP_EXTEND_PENALTY: i32 = 1;
    pub const MATCH_SCORE: i32 = 5;
    pub const CANONICAL_MATCH_SCORE: i32 = 1;
    pub const MISMATCH_SCORE: i32 = -4;
    pub const COMPRESSION_LOG_BASE: f64 = 5.0;
    pub const SCORE_LOG_THRESHOLD: f64 = 0.8;

    pub fn new() -> Result<Self> {
        let matrix = ScoringMatrix::build(
            SCORING_ALPHABET,
            Self::MATCH_SCORE,
            Self::MISMATCH_SCORE,
            &[Override::SelfMatch(
                CANONICAL_LETTER,
                Self::CANONICAL_MATCH_SCORE,
            )],
        )?;
        let weights = SymbolWeights::new(
            SCORING_ALPHABET,
            Self::MATCH_SCORE,
            &[(slice::from_ref(&CANONICAL_LETTER), Self::CANONICAL_MATCH_SCORE)],
        );
        Ok(Scoring1 { matrix, weights })
    }
}

impl ScoringSystem for Scoring1 {
    fn name(&self) -> &'static str {
        "scoring-1"
    }

    fn gap_penalties(&self) -> GapPenalties {
        GapPenalties {
            open: Self::GAP_OPEN_PENALTY,
            extend: Self::GAP_EXTEND_PENALTY,
        }
    }

    fn compression_log_base(&self) -> f64 {
        Self::COMPRESSION_LOG_BASE
    }

    fn score_log_threshold(&self) -> f64 {
        Self::SCORE_LOG_THRESHOLD
    }

    fn scoring_matrix(&self) -> &ScoringMatrix {
        &self.matrix
    }

    fn match_score_for_letter(&self, letter: u8) -> Option<i32> {
        self.weights.get(letter)
    }
}

/// Policy 2: policy 1 plus a softer canonical/indel-variant substitution and
/// reduced self-match for dubious motifs
#[derive(Debug, Clone)]
pub struct Scoring2 {
    matrix: ScoringMatrix,
    weights: SymbolWeights,
}

impl Scoring2 {
    pub const GAP_OPEN_PENALTY: i32 = 3;
    pub const GAP_EXTEND_PENALTY: i32 = 2;
    pub const MATCH_SCORE: i32 = 5;
    pub const CANONICAL_MATCH_SCORE: i32 = 1;
    /// Between the mismatch penalty and the canonical match score
    pub const CANONICAL_VS_INDEL_MISMATCH_SCORE: i32 = -1;
    pub const DUBIOUS_MATCH_SCORE: i32 = 2;
    pub const MISMATCH_SCORE: i32 = -4;
    pub const COMPRESSION_LOG_BASE: f64 = 4.0;
    pub const SCORE_LOG_THRESHOLD: f64 = 0.6;

    pub fn new() -> Result<Self> {
        let mut overrides = vec![
            Override::SelfMatch(CANONICAL_LETTER, Self::CANONICAL_MATCH_SCORE),
            // Canonical <-> indel variant is more likely sequencing error
            Override::Pair(
                CANONICAL_LETTER,
                CANONICAL_INDEL_LETTER,
                Self::CANONICAL_VS_INDEL_MISMATCH_SCORE,
            ),
        ];
        overrides.extend(
            DUBIOUS_LETTERS
                .iter()
                .map(|&d| Override::SelfMatch(d, Self::DUBIOUS_MATCH_SCORE)),
        );
        let matrix = ScoringMatrix::build(
            SCORING_ALPHABET,
            Self::MATCH_SCORE,
            Self::MISMATCH_SCORE,
            &overrides,
        )?;

        // Dubious letters keep the full match weight in the normalizer, so a
        // dubious-only self comparison lands below 1.0.
        let weights = SymbolWeights::new(
            SCORING_ALPHABET,
            Self::MATCH_SCORE,
            &[
                (DUBIOUS_LETTERS, Self::MATCH_SCORE),
                (slice::from_ref(&CANONICAL_LETTER), Self::CANONICAL_MATCH_SCORE),
            ],
        );
        Ok(Scoring2 { matrix, weights })
    }
}

impl ScoringSystem for Scoring2 {
    fn name(&self) -> &'static str {
        "scoring-2"
    }

    fn gap_penalties(&self) -> GapPenalties {
        GapPenalties {
            open: Self::GAP_OPEN_PENALTY,
            extend: Self::GAP_EXTEND_PENALTY,
        }
    }

    fn compression_log_base(&self) -> f64 {
        Self::COMPRESSION_LOG_BASE
    }

    fn score_log_threshold(&self) -> f64 {
        Self::SCORE_LOG_THRESHOLD
    }

    fn scoring_matrix(&self) -> &ScoringMatrix {
        &self.matrix
    }

    fn match_score_for_letter(&self, letter: u8) -> Option<i32> {
        self.weights.get(letter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aligner::BioAligner;

    #[test]
    fn test_query_and_database_order() {
        assert_eq!(query_and_database("CCD", "CD"), ("CD", "CCD"));
        assert_eq!(query_and_database("CD", "CCD"), ("CD", "CCD"));
        assert_eq!(query_and_database("CD", "CC"), ("CC", "CD"));
    }

    #[test]
    fn test_scoring1_matrix() {
        let s = Scoring1::new().unwrap();
        let m = s.scoring_matrix();
        assert_eq!(m.get(b'C', b'C'), Some(1));
        assert_eq!(m.get(b'D', b'D'), Some(5));
        assert_eq!(m.get(b'C', b'T'), Some(-4));
        assert_eq!(m.get(b'V', b'V'), Some(5));
    }

    #[test]
    fn test_scoring2_matrix() {
        let s = Scoring2::new().unwrap();
        let m = s.scoring_matrix();
        assert_eq!(m.get(b'C', b'C'), Some(1));
        assert_eq!(m.get(b'C', b'T'), Some(-1));
        assert_eq!(m.get(b'T', b'C'), Some(-1));
        assert_eq!(m.get(b'T', b'T'), Some(5));
        for &d in DUBIOUS_LETTERS {
            assert_eq!(m.get(d, d), Some(2));
        }
        assert_eq!(m.get(b'D', b'E'), Some(-4));
    }

    #[test]
    fn test_normalizer_by_class() {
        let s2 = Scoring2::new().unwrap();
        assert_eq!(s2.normalizer("CCD").unwrap(), 7);
        assert_eq!(s2.normalizer("VW").unwrap(), 10);
        assert!(matches!(
            s2.normalizer("CZ"),
            Err(TeloError::UnknownSymbol { symbol: 'Z', .. })
        ));
    }

    #[test]
    fn test_score_partial_match() {
        let s = Scoring1::new().unwrap();
        let score = s.score_seqs(&BioAligner, "GHKL", "GHK").unwrap();
        assert_eq!(score.raw_score, 12);
        assert_eq!(score.normalizer, 15);
        assert_eq!(score.similarity, 0.8);
    }

    #[test]
    fn test_negative_raw_score_floors_at_zero() {
        let s = Scoring1::new().unwrap();
        let score = s.score_seqs(&BioAligner, "GHK", "CCDDE").unwrap();
        assert!(score.raw_score < 0);
        assert_eq!(score.similarity, 0.0);
    }

    #[test]
    fn test_canonical_deweighting_shows_in_score() {
        let s = Scoring1::new().unwrap();
        // query CCCDD (lexicographically smaller), normalizer 13, raw 6
        let score = s.score_seqs(&BioAligner, "CCDDE", "CCCDD").unwrap();
        assert_eq!(score.normalizer, 13);
        assert_eq!(score.raw_score, 6);
    }

    #[test]
    fn test_dubious_self_match_below_one() {
        let s = Scoring2::new().unwrap();
        let score = s.score_seqs(&BioAligner, "VWY", "VWY").unwrap();
        assert_eq!(score.raw_score, 6);
        assert!((score.similarity - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_symbol_in_database() {
        let s = Scoring2::new().unwrap();
        let result = s.score_seqs(&BioAligner, "CD", "CDBB");
        assert!(matches!(
            result,
            Err(TeloError::UnknownSymbol { symbol: 'B', .. })
        ));
    }
}
