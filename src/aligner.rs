//! Global pairwise alignment backend
//!
//! The scorer only needs "score plus edit trace" from an aligner, so the
//! backend sits behind [`PairwiseAligner`]. [`BioAligner`] runs rust-bio's
//! affine-gap Needleman-Wunsch.

use bio::alignment::pairwise::Aligner;
use bio::alignment::AlignmentOperation;

use crate::cigar::{
    encode_cigar_op, CIGAR_DEL, CIGAR_DIFF, CIGAR_EQUAL, CIGAR_INS, CIGAR_REF_SKIP,
    CIGAR_SOFT_CLIP,
};
use crate::matrix::ScoringMatrix;

/// Gap penalties as positive costs.
///
/// A gap of length k costs `open + (k - 1) * extend`: the opening position is
/// charged `open`, every further position `extend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapPenalties {
    pub open: i32,
    pub extend: i32,
}

/// Raw aligner output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAlignment {
    pub score: i32,
    /// Compact trace words (`len << 4 | op`)
    pub cigar: Vec<u32>,
}

/// Global alignment of a query against a database sequence
pub trait PairwiseAligner: Send + Sync {
    fn align_global(
        &self,
        query: &[u8],
        database: &[u8],
        matrix: &ScoringMatrix,
        gaps: GapPenalties,
    ) -> RawAlignment;
}

/// rust-bio backed global aligner
#[derive(Debug, Clone, Copy, Default)]
pub struct BioAligner;

impl PairwiseAligner for BioAligner {
    fn align_global(
        &self,
        query: &[u8],
        database: &[u8],
        matrix: &ScoringMatrix,
        gaps: GapPenalties,
    ) -> RawAlignment {
        // rust-bio charges gap_open + k * gap_extend for a gap of length k
        let gap_open = -(gaps.open - gaps.extend);
        let gap_extend = -gaps.extend;
        let score = |a: u8, b: u8| matrix.score(a, b);

        let mut aligner =
            Aligner::with_capacity(query.len(), database.len(), gap_open, gap_extend, &score);
        let alignment = aligner.global(query, database);

        RawAlignment {
            score: alignment.score,
            cigar: compact_cigar(&alignment.operations),
        }
    }
}

/// Collapse rust-bio operations into run-length compact trace words.
///
/// `x` is the query: `Ins` consumes query only, `Del` database only. A
/// database-side clip maps to the reference-skip op.
pub fn compact_cigar(operations: &[AlignmentOperation]) -> Vec<u32> {
    let mut words = Vec::new();
    let mut current: Option<(u32, u32)> = None;

    for op in operations {
        let (code, len) = match *op {
            AlignmentOperation::Match => (CIGAR_EQUAL, 1),
            AlignmentOperation::Subst => (CIGAR_DIFF, 1),
            AlignmentOperation::Ins => (CIGAR_INS, 1),
            AlignmentOperation::Del => (CIGAR_DEL, 1),
            AlignmentOperation::Xclip(n) => (CIGAR_SOFT_CLIP, n as u32),
            AlignmentOperation::Yclip(n) => (CIGAR_REF_SKIP, n as u32),
        };
        if len == 0 {
            continue;
        }
        current = match current {
            Some((c, l)) if c == code => Some((c, l + len)),
            Some((c, l)) => {
                words.push(encode_cigar_op(c, l));
                Some((code, len))
            }
            None => Some((code, len)),
        };
    }
    if let Some((c, l)) = current {
        words.push(encode_cigar_op(c, l));
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cigar::decode_cigar;

    fn uniform() -> ScoringMatrix {
        ScoringMatrix::build(b"ACDEFGHIKLMNPRSQTVWY", 5, -4, &[]).unwrap()
    }

    #[test]
    fn test_compact_cigar_runs() {
        use AlignmentOperation::*;
        let words = compact_cigar(&[Match, Match, Subst, Ins, Ins, Del, Match]);
        assert_eq!(
            decode_cigar(&words),
            vec![
                (CIGAR_EQUAL, 2),
                (CIGAR_DIFF, 1),
                (CIGAR_INS, 2),
                (CIGAR_DEL, 1),
                (CIGAR_EQUAL, 1)
            ]
        );
    }

    #[test]
    fn test_identical_sequences() {
        let result = BioAligner.align_global(
            b"GHK",
            b"GHK",
            &uniform(),
            GapPenalties { open: 3, extend: 1 },
        );
        assert_eq!(result.score, 15);
        assert_eq!(decode_cigar(&result.cigar), vec![(CIGAR_EQUAL, 3)]);
    }

    #[test]
    fn test_trailing_gap_charged_open() {
        let result = BioAligner.align_global(
            b"GHK",
            b"GHKL",
            &uniform(),
            GapPenalties { open: 3, extend: 1 },
        );
        assert_eq!(result.score, 12);
        assert_eq!(
            decode_cigar(&result.cigar),
            vec![(CIGAR_EQUAL, 3), (CIGAR_DEL, 1)]
        );
    }

    #[test]
    fn test_long_gap_uses_extend() {
        // one gap of 3: 3 + 2 * 1
        let result = BioAligner.align_global(
            b"GHK",
            b"GHKLMN",
            &uniform(),
            GapPenalties { open: 3, extend: 1 },
        );
        assert_eq!(result.score, 15 - 5);
    }
}
