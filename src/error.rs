//! Error types for teloscore

use thiserror::Error;

/// Result type alias for teloscore operations
pub type Result<T> = std::result::Result<T, TeloError>;

/// Everything that can abort a comparison run.
///
/// None of these are retried: every failure is a deterministic function of the
/// input, so the whole comparison stops rather than writing a partial matrix.
#[derive(Debug, Error)]
pub enum TeloError {
    /// Empty sequence handed to the encoder, or an inconsistent policy definition
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Required column absent (or empty) in an input row
    #[error("Missing column '{column}' in {source_name} (row {row})")]
    MissingColumn {
        column: String,
        source_name: String,
        row: usize,
    },

    /// Symbol outside the policy's motif alphabet
    #[error("Unknown symbol '{symbol}' in sequence {sequence}")]
    UnknownSymbol { symbol: char, sequence: String },

    /// Trace operation the formatter cannot render
    #[error("Unsupported CIGAR operation code {0}")]
    UnsupportedCigarOp(u32),

    /// Trace and sequences disagree about how many characters exist
    #[error("Alignment trace out of sync with sequences: {0}")]
    TraceDesync(String),

    /// A file given to `plot` is not a comparison matrix
    #[error("Malformed comparison output at line {line}: {msg}")]
    MalformedOutput { line: usize, msg: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
