use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use teloscore::compare::{compare_samples, LogReporter};
use teloscore::plot::plot_versus;
use teloscore::{BioAligner, Scoring1, Scoring2, ScoringSystem};

/// Scoring system selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScoringChoice {
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
}

impl ScoringChoice {
    fn build(self) -> teloscore::Result<Box<dyn ScoringSystem>> {
        Ok(match self {
            ScoringChoice::One => Box::new(Scoring1::new()?),
            ScoringChoice::Two => Box::new(Scoring2::new()?),
        })
    }
}

/// teloscore - telomeric allele comparison scoring for Telogator2 output
///
/// Scores every TVR allele of one sample against every allele of another to
/// find matching chromosome arms.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    /// Only log warnings and errors
    #[clap(long = "quiet", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two Telogator2 allele TSV files
    Compare {
        /// First Telogator2 TSV file
        f1: PathBuf,

        /// Second Telogator2 TSV file
        f2: PathBuf,

        /// Output file to write to. This will overwrite any existing file at this path!
        out: PathBuf,

        /// Scoring system to use
        #[clap(long = "scoring", value_enum, default_value = "2")]
        scoring: ScoringChoice,

        /// Number of threads for scoring (default: all cores)
        #[clap(short = 't', long = "threads")]
        threads: Option<usize>,
    },

    /// Draw a heatmap of a comparison output file
    Plot {
        /// Output from the compare command
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match args.command {
        Command::Compare {
            f1,
            f2,
            out,
            scoring,
            threads,
        } => {
            if let Some(n) = threads {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build_global()?;
            }

            let scoring = scoring.build()?;
            compare_samples(
                scoring.as_ref(),
                &BioAligner,
                &f1,
                &f2,
                &out,
                &mut LogReporter,
            )
            .with_context(|| {
                format!(
                    "Failed to compare {} against {}",
                    f1.display(),
                    f2.display()
                )
            })?;
            log::info!("Wrote comparison matrix to {}", out.display());
        }
        Command::Plot { file } => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            plot_versus(&file, &mut handle)
                .with_context(|| format!("Failed to plot {}", file.display()))?;
        }
    }

    Ok(())
}
