// Library exports for teloscore
pub mod aligner;
pub mod allele;
pub mod cigar;
pub mod compare;
pub mod encode;
pub mod error;
pub mod matrix;
pub mod plot;
pub mod scoring;

pub use aligner::{BioAligner, GapPenalties, PairwiseAligner};
pub use allele::Allele;
pub use compare::{compare_samples, compare_samples_to_writer, LogReporter, PairReporter};
pub use error::{Result, TeloError};
pub use scoring::{Scoring1, Scoring2, ScoringSystem};
