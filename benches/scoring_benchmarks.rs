/// Performance benchmarks for pairwise scoring and matrix assembly
///
/// Run with: cargo bench
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use teloscore::allele::Allele;
use teloscore::compare::{compute_matrix, HighScoringPair, PairReporter};
use teloscore::{BioAligner, Scoring2, ScoringSystem};

struct NullReporter;

impl PairReporter for NullReporter {
    fn high_scoring_pair(&mut self, _pair: &HighScoringPair<'_>) {}
}

/// Deterministic TVR-like string: long canonical stretches broken up by variant motifs
fn synthetic_tvr(seed: usize, len: usize) -> String {
    const MOTIFS: &[u8] = b"CCCCCCTDEFGHIKLMNPRSQVWY";
    let mut state = (seed as u64).wrapping_mul(2654435761).wrapping_add(1);
    let mut out = String::with_capacity(len);
    while out.len() < len {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let motif = MOTIFS[((state >> 33) % MOTIFS.len() as u64) as usize] as char;
        let run = 1 + ((state >> 13) % 12) as usize;
        for _ in 0..run.min(len - out.len()) {
            out.push(motif);
        }
    }
    out
}

fn synthetic_alleles(scoring: &dyn ScoringSystem, n: usize, offset: usize) -> Vec<Allele> {
    (0..n)
        .map(|i| {
            let tvr = synthetic_tvr(i + offset, 200 + (i * 37) % 400);
            Allele {
                arm: format!("chr{}p", i % 22 + 1),
                allele_id: i.to_string(),
                tvr_consensus_encoded: scoring.encode_seq(&tvr).unwrap(),
                tvr_consensus: tvr,
            }
        })
        .collect()
}

/// Benchmark: single pair scoring at increasing sequence length
fn bench_score_pair(c: &mut Criterion) {
    let scoring = Scoring2::new().unwrap();
    let mut group = c.benchmark_group("score_pair");

    for len in [100usize, 500, 2000].iter() {
        let a = scoring.encode_seq(&synthetic_tvr(1, *len)).unwrap();
        let b = scoring.encode_seq(&synthetic_tvr(2, *len)).unwrap();
        group.throughput(Throughput::Elements(*len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), len, |bench, _| {
            bench.iter(|| {
                scoring
                    .score_seqs(&BioAligner, black_box(&a), black_box(&b))
                    .unwrap()
            })
        });
    }
    group.finish();
}

/// Benchmark: full all-pairs matrix
fn bench_compute_matrix(c: &mut Criterion) {
    let scoring = Scoring2::new().unwrap();
    let mut group = c.benchmark_group("compute_matrix");
    group.sample_size(10);

    for n in [10usize, 40].iter() {
        let f1 = synthetic_alleles(&scoring, *n, 0);
        let f2 = synthetic_alleles(&scoring, *n, 1000);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            bench.iter(|| {
                compute_matrix(&scoring, &BioAligner, &f1, &f2, &mut NullReporter).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_score_pair, bench_compute_matrix);
criterion_main!(benches);
