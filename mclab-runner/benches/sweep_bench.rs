//! Criterion benchmarks for mclab-runner hot loops.
//!
//! Run with: `cargo bench -p mclab-runner`
//!
//! - Per-path metrics across an ensemble
//! - Volatility ladder sweep, parallel vs sequential

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mclab_core::{PathSimulator, SimulationParameters};
use mclab_runner::config::SimulationSection;
use mclab_runner::{EnsembleMetrics, ParamGrid, ParamSweep, SimulationConfig};

fn base_config(num_paths: usize) -> SimulationConfig {
    SimulationConfig::new(SimulationSection {
        initial_value: 100_000.0,
        num_paths,
        num_steps: 252,
        drift: 0.07,
        volatility: 0.2,
        seed: Some(42),
        parallel: true,
    })
}

fn bench_ensemble_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("ensemble_metrics");

    for size in [100, 1_000, 10_000].iter() {
        let params = SimulationParameters::new(100_000.0, *size, 252, 0.07, 0.2)
            .expect("valid benchmark parameters")
            .with_seed(7);
        let ensemble = PathSimulator::new(params).generate_paths_par();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(EnsembleMetrics::from_ensemble(black_box(&ensemble), 0.01)));
        });
    }

    group.finish();
}

fn bench_volatility_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("volatility_sweep");
    let grid = ParamGrid::volatility_ladder(&[0.05, 0.1, 0.2, 0.4]);
    let base = base_config(1_000);

    for parallel in [true, false] {
        let sweep = ParamSweep::new().with_parallelism(parallel);
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_function(label, |b| {
            b.iter(|| black_box(sweep.sweep(&grid, &base).expect("sweep succeeds")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ensemble_metrics, bench_volatility_sweep);
criterion_main!(benches);
