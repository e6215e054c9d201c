//! Allele records and TSV loading
//!
//! Input is per-allele TSV output from Telogator2 (or anything with the same
//! columns): a chromosome arm column (`#chr` or `chr`), `allele_id` and
//! `tvr_consensus` are required; rows whose optional `tvr_len` is exactly
//! `"0"` carry no TVR and are skipped.

use crate::error::{Result, TeloError};
use crate::scoring::ScoringSystem;
use csv::StringRecord;
use noodles::bgzf;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub const ARM_COLUMNS: [&str; 2] = ["#chr", "chr"];
pub const ALLELE_ID_COLUMN: &str = "allele_id";
pub const TVR_CONSENSUS_COLUMN: &str = "tvr_consensus";
pub const TVR_LEN_COLUMN: &str = "tvr_len";

/// One chromosome-arm TVR consensus call within a sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allele {
    pub arm: String,
    /// Opaque: numeric, or pattern-coded like `12i`
    pub allele_id: String,
    pub tvr_consensus: String,
    pub tvr_consensus_encoded: String,
}

impl Allele {
    /// Label used in the output table and logs: `(<allele_id>) <arm>`
    pub fn label(&self) -> String {
        format!("({}) {}", self.allele_id, self.arm)
    }
}

/// Open a TSV file, reading through BGZF when the extension says so
pub fn open_tsv_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let is_compressed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz" || ext == "bgz")
        .unwrap_or(false);

    if is_compressed {
        Ok(Box::new(BufReader::new(bgzf::io::reader::Reader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Column positions resolved once from the header row
struct ColumnMap {
    arm: Option<(usize, &'static str)>,
    allele_id: Option<usize>,
    tvr_consensus: Option<usize>,
    tvr_len: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        ColumnMap {
            arm: ARM_COLUMNS
                .iter()
                .find_map(|&name| find(name).map(|idx| (idx, name))),
            allele_id: find(ALLELE_ID_COLUMN),
            tvr_consensus: find(TVR_CONSENSUS_COLUMN),
            tvr_len: find(TVR_LEN_COLUMN),
        }
    }
}

fn required<'r>(
    record: &'r StringRecord,
    idx: Option<usize>,
    column: &str,
    source_name: &str,
    row: usize,
) -> Result<&'r str> {
    idx.and_then(|i| record.get(i))
        .ok_or_else(|| TeloError::MissingColumn {
            column: column.to_string(),
            source_name: source_name.to_string(),
            row,
        })
}

/// Parse alleles from TSV text, encoding each consensus with the policy's log base.
///
/// Any row failing validation aborts the whole read.
pub fn read_alleles<R: Read>(
    scoring: &dyn ScoringSystem,
    reader: R,
    source_name: &str,
) -> Result<Vec<Allele>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(reader);
    let columns = ColumnMap::from_headers(rdr.headers()?);

    let mut alleles = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // 1-based, counting the header as row 1
        let row = i + 2;

        let tvr_len = columns.tvr_len.and_then(|idx| record.get(idx));
        if tvr_len == Some("0") {
            log::debug!("{source_name}: skipping row {row} with tvr_len 0");
            continue;
        }

        let arm_column = columns.arm.map(|(_, name)| name).unwrap_or("#chr/chr");
        let arm = required(
            &record,
            columns.arm.map(|(idx, _)| idx),
            arm_column,
            source_name,
            row,
        )?;
        if arm.is_empty() {
            return Err(TeloError::MissingColumn {
                column: arm_column.to_string(),
                source_name: source_name.to_string(),
                row,
            });
        }
        let allele_id = required(
            &record,
            columns.allele_id,
            ALLELE_ID_COLUMN,
            source_name,
            row,
        )?;
        let tvr = required(
            &record,
            columns.tvr_consensus,
            TVR_CONSENSUS_COLUMN,
            source_name,
            row,
        )?;

        let tvr_consensus_encoded = scoring.encode_seq(tvr).map_err(|e| match e {
            TeloError::InvalidInput(msg) => {
                TeloError::InvalidInput(format!("{source_name} row {row}: {msg}"))
            }
            other => other,
        })?;

        alleles.push(Allele {
            arm: arm.to_string(),
            allele_id: allele_id.to_string(),
            tvr_consensus: tvr.to_string(),
            tvr_consensus_encoded,
        });
    }

    Ok(alleles)
}

/// Load every qualifying allele from one TSV file
pub fn read_allele_file<P: AsRef<Path>>(scoring: &dyn ScoringSystem, path: P) -> Result<Vec<Allele>> {
    let path = path.as_ref();
    let input = open_tsv_input(path)?;
    let alleles = read_alleles(scoring, input, &path.display().to_string())?;
    log::info!("Loaded {} alleles from {}", alleles.len(), path.display());
    Ok(alleles)
}

/// Load both samples of a comparison
pub fn read_sample_files<P: AsRef<Path>, Q: AsRef<Path>>(
    scoring: &dyn ScoringSystem,
    file1: P,
    file2: Q,
) -> Result<(Vec<Allele>, Vec<Allele>)> {
    let f1 = read_allele_file(scoring, file1)?;
    let f2 = read_allele_file(scoring, file2)?;
    Ok((f1, f2))
}
