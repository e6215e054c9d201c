//! All-pairs comparison of two samples' alleles
//!
//! Pipeline:
//! 1. load alleles from both TSV files
//! 2. score every sample-1 allele against every sample-2 allele
//! 3. write the matrix (rows: sample 2, columns: sample 1)
//!
//! Cells are scored in parallel with rayon; results and high-scoring pair
//! reports are always emitted row-major (sample-2 index, then sample-1 index).

use crate::aligner::PairwiseAligner;
use crate::allele::{read_sample_files, Allele};
use crate::cigar::{format_alignment, Trace};
use crate::error::Result;
use crate::scoring::{PairScore, ScoringSystem};
use rayon::prelude::*;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A pair whose similarity exceeded the policy's logging threshold
#[derive(Debug, Clone, PartialEq)]
pub struct HighScoringPair<'a> {
    pub sample1: &'a Allele,
    pub sample2: &'a Allele,
    pub threshold: f64,
    pub score: f64,
    /// Three-line rendering of the alignment
    pub alignment: String,
}

/// Receives high-scoring pairs as they are found
pub trait PairReporter {
    fn high_scoring_pair(&mut self, pair: &HighScoringPair<'_>);
}

/// Reports pairs through the `log` facade at info level
#[derive(Debug, Default)]
pub struct LogReporter;

impl PairReporter for LogReporter {
    fn high_scoring_pair(&mut self, pair: &HighScoringPair<'_>) {
        log::info!(
            "Found score >{}: {} against {}; score: {:.3}",
            pair.threshold,
            pair.sample1.label(),
            pair.sample2.label(),
            pair.score
        );
        log::info!("  Alignment: \n{}", pair.alignment);
    }
}

/// Dense similarity matrix, `scores[j][i]` = sample-1 allele `i` vs sample-2 allele `j`
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    pub scores: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    /// (rows, columns) = (sample-2 alleles, sample-1 alleles)
    pub fn dims(&self) -> (usize, usize) {
        (
            self.scores.len(),
            self.scores.first().map(Vec::len).unwrap_or(0),
        )
    }
}

/// Score all pairs and report those above the policy threshold.
pub fn compute_matrix(
    scoring: &dyn ScoringSystem,
    aligner: &dyn PairwiseAligner,
    f1_alleles: &[Allele],
    f2_alleles: &[Allele],
    reporter: &mut dyn PairReporter,
) -> Result<SimilarityMatrix> {
    let cells: Vec<Vec<PairScore>> = f2_alleles
        .par_iter()
        .map(|f2a| {
            f1_alleles
                .iter()
                .map(|f1a| {
                    scoring.score_seqs(
                        aligner,
                        &f1a.tvr_consensus_encoded,
                        &f2a.tvr_consensus_encoded,
                    )
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let threshold = scoring.score_log_threshold();
    for (j, row) in cells.iter().enumerate() {
        for (i, cell) in row.iter().enumerate() {
            if cell.similarity > threshold {
                report_pair(
                    reporter,
                    &f1_alleles[i],
                    &f2_alleles[j],
                    threshold,
                    cell.similarity,
                    &cell.trace,
                )?;
            }
        }
    }

    Ok(SimilarityMatrix {
        scores: cells
            .into_iter()
            .map(|row| row.into_iter().map(|c| c.similarity).collect())
            .collect(),
    })
}

fn report_pair(
    reporter: &mut dyn PairReporter,
    f1a: &Allele,
    f2a: &Allele,
    threshold: f64,
    score: f64,
    trace: &Trace,
) -> Result<()> {
    let alignment = format_alignment(
        &f1a.tvr_consensus_encoded,
        &f2a.tvr_consensus_encoded,
        trace,
    )?;
    reporter.high_scoring_pair(&HighScoringPair {
        sample1: f1a,
        sample2: f2a,
        threshold,
        score,
        alignment,
    });
    Ok(())
}

/// Shortest round-trip float text that always keeps a fractional part
/// (`0.0`, `1.0`, `0.8`).
pub fn format_score(score: f64) -> String {
    format!("{score:?}")
}

/// Write the matrix as TSV: a header of sample-1 labels (leading empty cell),
/// then one row per sample-2 allele.
pub fn write_matrix<W: Write>(
    out: W,
    f1_alleles: &[Allele],
    f2_alleles: &[Allele],
    matrix: &SimilarityMatrix,
) -> Result<()> {
    let mut out = BufWriter::new(out);

    let mut header = String::new();
    for f1a in f1_alleles {
        header.push('\t');
        header.push_str(&f1a.label());
    }
    writeln!(out, "{header}")?;

    for (f2a, row) in f2_alleles.iter().zip(&matrix.scores) {
        let mut line = f2a.label();
        for &score in row {
            line.push('\t');
            line.push_str(&format_score(score));
        }
        writeln!(out, "{line}")?;
    }

    out.flush()?;
    Ok(())
}

fn load_and_score<P: AsRef<Path>, Q: AsRef<Path>>(
    scoring: &dyn ScoringSystem,
    aligner: &dyn PairwiseAligner,
    file1: P,
    file2: Q,
    reporter: &mut dyn PairReporter,
) -> Result<(Vec<Allele>, Vec<Allele>, SimilarityMatrix)> {
    let (f1_alleles, f2_alleles) = read_sample_files(scoring, file1, file2)?;
    log::info!(
        "Scoring {} x {} allele pairs with {}",
        f2_alleles.len(),
        f1_alleles.len(),
        scoring.name()
    );
    let matrix = compute_matrix(scoring, aligner, &f1_alleles, &f2_alleles, reporter)?;
    Ok((f1_alleles, f2_alleles, matrix))
}

/// Load, score and write to any sink.
pub fn compare_samples_to_writer<P: AsRef<Path>, Q: AsRef<Path>, W: Write>(
    scoring: &dyn ScoringSystem,
    aligner: &dyn PairwiseAligner,
    file1: P,
    file2: Q,
    out: W,
    reporter: &mut dyn PairReporter,
) -> Result<SimilarityMatrix> {
    let (f1_alleles, f2_alleles, matrix) =
        load_and_score(scoring, aligner, file1, file2, reporter)?;
    write_matrix(out, &f1_alleles, &f2_alleles, &matrix)?;
    Ok(matrix)
}

/// Load, score and write to `out_path`, replacing any existing file.
///
/// The table goes to a temp file beside `out_path` and is moved into place
/// only once complete; a failed run leaves no partial matrix behind.
pub fn compare_samples<P: AsRef<Path>, Q: AsRef<Path>, O: AsRef<Path>>(
    scoring: &dyn ScoringSystem,
    aligner: &dyn PairwiseAligner,
    file1: P,
    file2: Q,
    out_path: O,
    reporter: &mut dyn PairReporter,
) -> Result<SimilarityMatrix> {
    let out_path = out_path.as_ref();
    let (f1_alleles, f2_alleles, matrix) =
        load_and_score(scoring, aligner, file1, file2, reporter)?;

    let dir = match out_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    write_matrix(temp.as_file_mut(), &f1_alleles, &f2_alleles, &matrix)?;
    temp.persist(out_path).map_err(|e| e.error)?;

    Ok(matrix)
}
