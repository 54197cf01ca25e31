//! Benchmarks for the event generators
//!
//! Measures rhythm distribution, grid walks and offline composition
//!
//! Run with: cargo bench --bench generator_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pulsegrid::config::Config;
use pulsegrid::euclid::distribute;
use pulsegrid::grid::{Grid, Position};
use pulsegrid::sampler::{self, DrunkParams};
use rand::rngs::StdRng;
use rand::SeedableRng;

const COMPOSITION: &str = r#"
[output]
seed = 3
length = 30.0

[[voice]]
kind = "euclid"
address = "/kick"
key = 36
events = 5
positions = 16
cycle = 2.0

[[voice]]
kind = "grid"
address = "/pixel"
rate = 0.01
source = { type = "gradient", rows = 64, cols = 64 }
walk = { type = "drunk", start = [32, 32], width = [2, 2], mode = "reflect" }

[[voice]]
kind = "ramp"
address = "/cutoff"
start = 0.0
end = 1.0
grain = 0.01
"#;

fn bench_distribute(c: &mut Criterion) {
    let mut group = c.benchmark_group("distribute");

    for positions in [8usize, 64, 512] {
        group.bench_with_input(
            BenchmarkId::from_parameter(positions),
            &positions,
            |b, &positions| b.iter(|| distribute(black_box(positions / 3 + 1), positions)),
        );
    }

    group.finish();
}

fn bench_walks(c: &mut Criterion) {
    let mut group = c.benchmark_group("walks");
    let grid = Grid::gradient(128, 128).unwrap();
    const SAMPLES: usize = 10_000;

    group.bench_function("raster_10k", |b| {
        b.iter(|| {
            sampler::raster(&grid, Some(SAMPLES), Position::new(0, 0), (0, 1), (1, 0))
                .unwrap()
                .map(|s| s.value[0])
                .sum::<f64>()
        })
    });

    group.bench_function("drunk_reflect_10k", |b| {
        let params = DrunkParams {
            width: (2, 2),
            mode: pulsegrid::boundary::BoundaryMode::Reflect,
            ..DrunkParams::default()
        };
        b.iter(|| {
            sampler::drunk(
                &grid,
                Some(SAMPLES),
                Position::new(64, 64),
                params,
                StdRng::seed_from_u64(1),
            )
            .unwrap()
            .map(|s| s.value[0])
            .sum::<f64>()
        })
    });

    group.bench_function("uniform_10k", |b| {
        b.iter(|| {
            sampler::uniform(&grid, Some(SAMPLES), StdRng::seed_from_u64(1))
                .unwrap()
                .map(|s| s.value[0])
                .sum::<f64>()
        })
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let config = Config::parse(COMPOSITION).unwrap();

    c.bench_function("render_30s_composition", |b| {
        b.iter(|| black_box(config.render().unwrap().len()))
    });
}

criterion_group!(benches, bench_distribute, bench_walks, bench_render);
criterion_main!(benches);
