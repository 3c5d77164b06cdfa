//! Benchmarks for `bounded_merge` over synthetic frontiers.
//!
//! Run:
//!   cargo bench --bench bounded_merge

#![allow(missing_docs)]

use std::fmt;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use bestfirst::{bounded_merge, ConditionResult, EngineResult, Index, Score, System, Working, WorkingConcreteSystem};

#[derive(Debug)]
struct Leaf {
    score: Score,
    index: Index,
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "leaf")
    }
}

impl Working for Leaf {
    fn generate_children(&self, _max_count: usize) -> EngineResult<Vec<System>> {
        Ok(Vec::new())
    }
    fn is_complete(&self) -> bool {
        true
    }
}

impl WorkingConcreteSystem for Leaf {
    fn score(&self) -> &Score {
        &self.score
    }
    fn index(&self) -> &Index {
        &self.index
    }
    fn update_score(&mut self, new_score: Score) -> EngineResult<()> {
        self.score = new_score;
        Ok(())
    }
}

fn leaf(ratio: f64, idx: u64) -> System {
    let score = Score::new()
        .extend_condition(ConditionResult::new("c", ratio).unwrap(), true)
        .unwrap()
        .commit()
        .unwrap();
    let index = Index::new().extend(idx).unwrap().commit().unwrap();
    System::WorkingConcrete(Box::new(Leaf { score, index }))
}

fn synthetic_frontier(len: usize, seed: u64) -> Vec<System> {
    let rng = fastrand::Rng::with_seed(seed);
    let mut frontier: Vec<System> = (0..len)
        .map(|i| leaf(rng.f64(), (seed * 1_000_000) + i as u64))
        .collect();
    frontier.sort_by(|a, b| b.cmp(a));
    frontier
}

fn bench_bounded_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_merge");

    for &num_frontiers in &[2usize, 4, 8] {
        for &frontier_len in &[16usize, 256] {
            let id = BenchmarkId::new(format!("k{num_frontiers}"), frontier_len);
            group.bench_with_input(id, &frontier_len, |b, &frontier_len| {
                b.iter_batched(
                    || {
                        (0..num_frontiers)
                            .map(|i| synthetic_frontier(frontier_len, i as u64))
                            .collect::<Vec<_>>()
                    },
                    |frontiers| {
                        let outcome = bounded_merge(frontiers, frontier_len, None).unwrap();
                        black_box(outcome.merged.len())
                    },
                    criterion::BatchSize::SmallInput,
                )
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_bounded_merge);
criterion_main!(benches);
