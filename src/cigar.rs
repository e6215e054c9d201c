/// Compact CIGAR traces and three-line alignment rendering
///
/// Trace words use the BAM layout: `len << 4 | op`. Operation codes follow
/// the SAM spec (section 1.4): M=0 I=1 D=2 N=3 S=4 H=5 P=6 '='=7 X=8.
use crate::error::{Result, TeloError};
use crate::scoring::query_and_database;

pub const CIGAR_MATCH: u32 = 0;
pub const CIGAR_INS: u32 = 1;
pub const CIGAR_DEL: u32 = 2;
pub const CIGAR_REF_SKIP: u32 = 3;
pub const CIGAR_SOFT_CLIP: u32 = 4;
pub const CIGAR_HARD_CLIP: u32 = 5;
pub const CIGAR_PAD: u32 = 6;
pub const CIGAR_EQUAL: u32 = 7;
pub const CIGAR_DIFF: u32 = 8;

/// Decoded trace: `(operation code, run length)` in alignment order
pub type Trace = Vec<(u32, u32)>;

/// Pack one operation into a compact trace word
pub fn encode_cigar_op(op: u32, len: u32) -> u32 {
    (len << 4) | (op & 0xf)
}

/// Split compact trace words into `(op, len)` pairs
pub fn decode_cigar(encoded: &[u32]) -> Trace {
    encoded.iter().map(|&word| (word & 0xf, word >> 4)).collect()
}

/// Single-letter SAM code for an operation, `?` for anything outside 0..=8
pub fn op_char(op: u32) -> char {
    match op {
        CIGAR_MATCH => 'M',
        CIGAR_INS => 'I',
        CIGAR_DEL => 'D',
        CIGAR_REF_SKIP => 'N',
        CIGAR_SOFT_CLIP => 'S',
        CIGAR_HARD_CLIP => 'H',
        CIGAR_PAD => 'P',
        CIGAR_EQUAL => '=',
        CIGAR_DIFF => 'X',
        _ => '?',
    }
}

/// Render a trace as a SAM-style CIGAR string (e.g. `3=1X2I`)
pub fn cigar_string(trace: &[(u32, u32)]) -> String {
    trace
        .iter()
        .map(|&(op, len)| format!("{len}{}", op_char(op)))
        .collect()
}

fn take(chars: &mut std::str::Chars<'_>, which: &str) -> Result<char> {
    chars.next().ok_or_else(|| {
        TeloError::TraceDesync(format!("trace consumes more {which} characters than exist"))
    })
}

/// Render a three-line alignment (query, marker line, database).
///
/// `seq1`/`seq2` are reordered into query/database exactly as the scorer
/// does, so the trace coordinates line up. Markers: `|` for match, `X` for an
/// explicit mismatch, blank opposite a gap. Soft-clipped query characters are
/// consumed without output.
pub fn format_alignment(seq1: &str, seq2: &str, trace: &[(u32, u32)]) -> Result<String> {
    let (query, database) = query_and_database(seq1, seq2);
    let mut q = query.chars();
    let mut d = database.chars();

    let mut top = String::with_capacity(database.len());
    let mut markers = String::with_capacity(database.len());
    let mut bottom = String::with_capacity(database.len());

    for &(op, len) in trace {
        match op {
            CIGAR_MATCH | CIGAR_EQUAL | CIGAR_DIFF => {
                let marker = if op == CIGAR_DIFF { 'X' } else { '|' };
                for _ in 0..len {
                    top.push(take(&mut q, "query")?);
                    markers.push(marker);
                    bottom.push(take(&mut d, "database")?);
                }
            }
            CIGAR_INS => {
                for _ in 0..len {
                    top.push(take(&mut q, "query")?);
                    markers.push(' ');
                    bottom.push('-');
                }
            }
            CIGAR_DEL | CIGAR_REF_SKIP => {
                for _ in 0..len {
                    top.push('-');
                    markers.push(' ');
                    bottom.push(take(&mut d, "database")?);
                }
            }
            CIGAR_SOFT_CLIP => {
                for _ in 0..len {
                    take(&mut q, "query")?;
                }
            }
            other => return Err(TeloError::UnsupportedCigarOp(other)),
        }
    }

    let leftover = q.count() + d.count();
    if leftover > 0 {
        return Err(TeloError::TraceDesync(format!(
            "trace leaves {leftover} characters unaligned"
        )));
    }

    let widths = (
        top.chars().count(),
        markers.chars().count(),
        bottom.chars().count(),
    );
    if widths.0 != widths.1 || widths.1 != widths.2 {
        return Err(TeloError::TraceDesync(format!(
            "alignment lines differ in length: {} / {} / {}",
            widths.0, widths.1, widths.2
        )));
    }

    Ok(format!("{top}\n{markers}\n{bottom}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_cigar() {
        let words = vec![encode_cigar_op(CIGAR_EQUAL, 3), encode_cigar_op(CIGAR_INS, 12)];
        assert_eq!(decode_cigar(&words), vec![(CIGAR_EQUAL, 3), (CIGAR_INS, 12)]);
        assert_eq!(decode_cigar(&[0x34]), vec![(CIGAR_SOFT_CLIP, 3)]);
    }

    #[test]
    fn test_cigar_string() {
        let trace = vec![(CIGAR_EQUAL, 3), (CIGAR_DIFF, 1), (CIGAR_DEL, 2)];
        assert_eq!(cigar_string(&trace), "3=1X2D");
    }

    #[test]
    fn test_format_match_and_gap() {
        let trace = vec![(CIGAR_EQUAL, 3), (CIGAR_DEL, 1)];
        let text = format_alignment("GHKL", "GHK", &trace).unwrap();
        assert_eq!(text, "GHK-\n||| \nGHKL");
    }

    #[test]
    fn test_format_mismatch_and_insertion() {
        // query CDE (shorter), database CFEE
        let trace = vec![
            (CIGAR_EQUAL, 1),
            (CIGAR_DIFF, 1),
            (CIGAR_EQUAL, 1),
            (CIGAR_DEL, 1),
        ];
        let text = format_alignment("CDE", "CFEE", &trace).unwrap();
        assert_eq!(text, "CDE-\n|X| \nCFEE");

        let text = format_alignment(
            "CDE",
            "CEKL",
            &[(CIGAR_MATCH, 1), (CIGAR_DEL, 2), (CIGAR_MATCH, 1), (CIGAR_INS, 1)],
        )
        .unwrap();
        assert_eq!(text, "C--DE\n|  | \nCEKL-");
    }

    #[test]
    fn test_ref_skip_renders_as_deletion() {
        let trace = vec![(CIGAR_EQUAL, 1), (CIGAR_REF_SKIP, 2), (CIGAR_EQUAL, 1)];
        let text = format_alignment("CDDE", "CE", &trace).unwrap();
        assert_eq!(text, "C--E\n|  |\nCDDE");
    }

    #[test]
    fn test_soft_clip_consumes_query_silently() {
        let trace = vec![(CIGAR_SOFT_CLIP, 1), (CIGAR_EQUAL, 2), (CIGAR_DEL, 2)];
        let text = format_alignment("CDE", "DEFG", &trace).unwrap();
        assert_eq!(text, "DE--\n||  \nDEFG");
    }

    #[test]
    fn test_unsupported_op() {
        let result = format_alignment("CD", "CD", &[(CIGAR_HARD_CLIP, 2)]);
        assert!(matches!(result, Err(TeloError::UnsupportedCigarOp(5))));
    }

    #[test]
    fn test_overrun_is_desync() {
        let result = format_alignment("CD", "CDE", &[(CIGAR_EQUAL, 3)]);
        assert!(matches!(result, Err(TeloError::TraceDesync(_))));
    }

    #[test]
    fn test_unconsumed_is_desync() {
        let result = format_alignment("CD", "CDE", &[(CIGAR_EQUAL, 2)]);
        assert!(matches!(result, Err(TeloError::TraceDesync(_))));
    }
}
