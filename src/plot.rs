//! Terminal heatmap of a `compare` output table

use crate::error::{Result, TeloError};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Shade characters from lowest to highest similarity
const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// A comparison table read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    /// Sample-1 allele labels
    pub column_labels: Vec<String>,
    /// Sample-2 allele labels
    pub row_labels: Vec<String>,
    pub scores: Vec<Vec<f64>>,
}

/// Parse the TSV written by `compare`
pub fn read_comparison<R: BufRead>(reader: R) -> Result<ComparisonTable> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(TeloError::MalformedOutput {
                line: 1,
                msg: "empty file".to_string(),
            })
        }
    };
    let mut fields = header.split('\t');
    if fields.next() != Some("") {
        return Err(TeloError::MalformedOutput {
            line: 1,
            msg: "header must start with an empty cell".to_string(),
        });
    }
    let column_labels: Vec<String> = fields.map(str::to_string).collect();

    let mut row_labels = Vec::new();
    let mut scores = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        let line_no = i + 2;
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let label = fields.next().unwrap_or_default().to_string();
        let row = fields
            .map(|f| {
                f.parse::<f64>().map_err(|_| TeloError::MalformedOutput {
                    line: line_no,
                    msg: format!("non-numeric score '{f}'"),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        if row.len() != column_labels.len() {
            return Err(TeloError::MalformedOutput {
                line: line_no,
                msg: format!(
                    "expected {} scores, found {}",
                    column_labels.len(),
                    row.len()
                ),
            });
        }
        row_labels.push(label);
        scores.push(row);
    }

    Ok(ComparisonTable {
        column_labels,
        row_labels,
        scores,
    })
}

pub fn read_comparison_file<P: AsRef<Path>>(path: P) -> Result<ComparisonTable> {
    let file = File::open(path)?;
    read_comparison(BufReader::new(file))
}

/// Shade for a similarity in [0, 1]; out-of-range values clamp
pub fn shade(score: f64) -> char {
    let bucket = (score.clamp(0.0, 1.0) * SHADES.len() as f64) as usize;
    SHADES[bucket.min(SHADES.len() - 1)]
}

/// Draw one character per cell, rows labelled with sample-2 alleles and
/// columns keyed by index to a legend of sample-1 alleles.
pub fn render_heatmap<W: Write>(out: &mut W, table: &ComparisonTable) -> Result<()> {
    let label_width = table
        .row_labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);

    writeln!(out, "Columns:")?;
    for (i, label) in table.column_labels.iter().enumerate() {
        writeln!(out, "{i:>4}  {label}")?;
    }
    writeln!(out)?;

    let ruler: String = (0..table.column_labels.len())
        .map(|i| char::from(b'0' + (i % 10) as u8))
        .collect();
    writeln!(out, "{:label_width$}  {ruler}", "")?;

    for (label, row) in table.row_labels.iter().zip(&table.scores) {
        let cells: String = row.iter().map(|&s| shade(s)).collect();
        writeln!(out, "{label:<label_width$}  {cells}")?;
    }

    writeln!(out)?;
    let step = 1.0 / SHADES.len() as f64;
    let legend: Vec<String> = SHADES
        .iter()
        .enumerate()
        .map(|(i, c)| format!("'{c}' >= {:.1}", i as f64 * step))
        .collect();
    writeln!(out, "{}", legend.join("  "))?;
    Ok(())
}

/// Read a comparison file and draw it to `out`
pub fn plot_versus<P: AsRef<Path>, W: Write>(path: P, out: &mut W) -> Result<()> {
    let table = read_comparison_file(path)?;
    render_heatmap(out, &table)
}
