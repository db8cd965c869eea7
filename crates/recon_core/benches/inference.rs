//! Merge and inference benchmarks for recon_core.
//!
//! Run with: `cargo bench -p recon_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use recon_core::prelude::*;
use recon_test_utils::fixtures::{hidden, registry, unit, ALICE, BOB};

const TURNS: u32 = 100;
const BUILDS_PER_TURN: u64 = 4;

/// A long match where every other build is only discovered a turn later.
fn synthetic_match() -> Vec<(Vec<UnitFields>, Vec<ActionEvent>)> {
    let mut next_id = 1;
    let mut turns = Vec::new();
    for turn in 0..TURNS {
        let owner = if turn % 2 == 0 { ALICE } else { BOB };
        let mut visible = Vec::new();
        let mut actions = Vec::new();
        for _ in 0..BUILDS_PER_TURN {
            if next_id % 2 == 0 {
                actions.push(ActionEvent::Build(unit(next_id, owner, "Tank")));
            } else {
                visible.push(hidden(next_id));
            }
            next_id += 1;
        }
        turns.push((visible, actions));
    }
    turns
}

fn reconstruct_match(turns: &[(Vec<UnitFields>, Vec<ActionEvent>)]) -> UnitRegistry {
    let mut registry = registry();
    for (turn, (visible, actions)) in turns.iter().enumerate() {
        registry.merge(turn as u32, visible, actions);
    }
    infer(&mut registry, TURNS - 1);
    registry
}

/// Runs merge and inference benchmarks for the recon_core crate.
pub fn inference_benchmark(c: &mut Criterion) {
    let turns = synthetic_match();
    c.bench_function("merge_and_infer_100_turns", |b| {
        b.iter(|| black_box(reconstruct_match(black_box(&turns))));
    });

    let merged = reconstruct_match(&turns);
    let costs = CostResolver::standard();
    c.bench_function("aggregate_100_turns", |b| {
        b.iter(|| {
            let groups = aggregate(black_box(&merged), &costs, &ReportFilter::All);
            black_box(groups.map(Iterator::count))
        });
    });
}

criterion_group!(benches, inference_benchmark);
criterion_main!(benches);
