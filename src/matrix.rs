/// Substitution matrices over the motif alphabet
///
/// A matrix starts from uniform match/mismatch scores and is then adjusted by
/// an ordered list of overrides; later overrides win.
use crate::error::{Result, TeloError};

/// Adjustment applied on top of the uniform base matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Override {
    /// Self-match score for one symbol
    SelfMatch(u8, i32),
    /// Cross score for two symbols, set in both directions
    Pair(u8, u8, i32),
}

/// Square substitution matrix indexed by alphabet position
#[derive(Debug, Clone)]
pub struct ScoringMatrix {
    alphabet: Vec<u8>,
    /// Byte -> alphabet position
    index: [Option<u8>; 256],
    scores: Vec<i32>,
}

impl ScoringMatrix {
    /// Build a matrix over `alphabet` with uniform scores, then apply `overrides` in order.
    pub fn build(
        alphabet: &[u8],
        match_score: i32,
        mismatch_score: i32,
        overrides: &[Override],
    ) -> Result<Self> {
        if alphabet.is_empty() || alphabet.len() > u8::MAX as usize {
            return Err(TeloError::InvalidInput(format!(
                "alphabet must hold 1..=255 symbols, got {}",
                alphabet.len()
            )));
        }

        let mut index = [None; 256];
        for (pos, &symbol) in alphabet.iter().enumerate() {
            if index[symbol as usize].replace(pos as u8).is_some() {
                return Err(TeloError::InvalidInput(format!(
                    "duplicate symbol '{}' in alphabet",
                    symbol as char
                )));
            }
        }

        let n = alphabet.len();
        let mut scores = vec![mismatch_score; n * n];
        for i in 0..n {
            scores[i * n + i] = match_score;
        }

        let mut matrix = ScoringMatrix {
            alphabet: alphabet.to_vec(),
            index,
            scores,
        };

        for ov in overrides {
            match *ov {
                Override::SelfMatch(symbol, score) => {
                    let i = matrix.position_of(symbol)?;
                    matrix.scores[i * n + i] = score;
                }
                Override::Pair(a, b, score) => {
                    let i = matrix.position_of(a)?;
                    let j = matrix.position_of(b)?;
                    matrix.scores[i * n + j] = score;
                    matrix.scores[j * n + i] = score;
                }
            }
        }

        Ok(matrix)
    }

    fn position_of(&self, symbol: u8) -> Result<usize> {
        self.index[symbol as usize]
            .map(usize::from)
            .ok_or_else(|| {
                TeloError::InvalidInput(format!(
                    "override symbol '{}' is not in the alphabet",
                    symbol as char
                ))
            })
    }

    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.index[symbol as usize].is_some()
    }

    /// Score for a pair of symbols, `None` if either is outside the alphabet
    pub fn get(&self, a: u8, b: u8) -> Option<i32> {
        let i = self.index[a as usize]? as usize;
        let j = self.index[b as usize]? as usize;
        Some(self.scores[i * self.alphabet.len() + j])
    }

    /// Score lookup for sequences already validated against the alphabet.
    /// Symbols outside it score `i32::MIN / 2`.
    pub fn score(&self, a: u8, b: u8) -> i32 {
        self.get(a, b).unwrap_or(i32::MIN / 2)
    }

    /// First symbol of `seq` that the matrix does not cover
    pub fn first_unknown(&self, seq: &[u8]) -> Option<u8> {
        seq.iter().copied().find(|&c| !self.contains(c))
    }
}
