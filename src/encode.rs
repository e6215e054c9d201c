/// Run-length log-compression of TVR motif strings
///
/// Each maximal run of a repeated symbol of length n is re-emitted
/// `1 + round(log_base(n))` times, so repeat-count noise in long motif runs
/// does not dominate alignment scores while motif order and identity survive.
use crate::error::{Result, TeloError};

/// Number of copies a run of length `run_len` is compressed to.
///
/// Rounding is half-to-even: under base 4 a run of 2 sits exactly on 0.5 and
/// compresses to a single copy.
pub fn compressed_run_length(run_len: usize, log_base: f64) -> usize {
    let exponent = (run_len as f64).ln() / log_base.ln();
    1 + exponent.round_ties_even() as usize
}

/// Log-compress `seq` with the given logarithm base.
pub fn log_compress(seq: &str, log_base: f64) -> Result<String> {
    if seq.is_empty() {
        return Err(TeloError::InvalidInput(
            "cannot encode an empty sequence".to_string(),
        ));
    }
    if log_base.is_nan() || log_base <= 1.0 {
        return Err(TeloError::InvalidInput(format!(
            "log base must be greater than 1, got {log_base}"
        )));
    }

    let mut encoded = String::with_capacity(seq.len());
    let mut chars = seq.chars().peekable();

    while let Some(current) = chars.next() {
        let mut run_len = 1usize;
        while chars.next_if_eq(&current).is_some() {
            run_len += 1;
        }
        for _ in 0..compressed_run_length(run_len, log_base) {
            encoded.push(current);
        }
    }

    Ok(encoded)
}
