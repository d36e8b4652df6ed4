//! Benchmarks for playing complete matches through the engine facade.
//!
//! Every decision clones the snapshot, so these track the cost of the
//! snapshot-in, snapshot-out design end to end.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use trust_engine::core::{
    AllianceTarget, Choice, FixedClock, GameRng, GameSnapshot, Settings, StandoffDecision,
};
use trust_engine::rules::{Advance, PendingInput, TrustEngine};

/// Play to the end with a fixed strategy: random alliance targets, and
/// loyalty choices that alternate by step.
fn run_match(settings: &Settings, seed: u64) -> GameSnapshot {
    let mut engine = TrustEngine::with_sources(GameRng::new(seed), FixedClock(0));
    let roster = vec![""; usize::from(settings.participant_count)];
    let mut snap = engine
        .initialize_match(settings, &roster)
        .expect("valid settings");

    for step in 0u32..256 {
        let choice = if step % 3 == 0 {
            Choice::Betray
        } else {
            Choice::Loyal
        };
        let result = match engine.pending_input(&snap) {
            Some(PendingInput::Alliance { player, .. }) => {
                engine.submit_alliance_choice(&snap, player, AllianceTarget::Random)
            }
            Some(PendingInput::Loyalty { player, .. }) => {
                engine.submit_loyalty_choice(&snap, player, choice, None)
            }
            Some(PendingInput::TwoParty { player, .. }) => {
                engine.submit_two_party_choice(&snap, player, choice, Some(Choice::Loyal))
            }
            Some(PendingInput::Standoff { .. }) => {
                engine.submit_two_party_resolution(&snap, StandoffDecision::Split)
            }
            None => match engine.advance_phase(&snap).expect("legal transition") {
                Advance::Advanced(next) => Ok(next),
                Advance::Pending(_) | Advance::Finished => break,
            },
        };
        snap = result.expect("legal decision");
    }
    snap
}

fn bench_three_player(c: &mut Criterion) {
    let settings = Settings::multi_party(3);
    c.bench_function("full_match_3p", |b| {
        b.iter(|| black_box(run_match(black_box(&settings), black_box(42))));
    });
}

fn bench_five_player(c: &mut Criterion) {
    let settings = Settings::multi_party(5);
    c.bench_function("full_match_5p", |b| {
        b.iter(|| black_box(run_match(black_box(&settings), black_box(42))));
    });
}

fn bench_two_party(c: &mut Criterion) {
    let settings = Settings::two_party();
    c.bench_function("full_match_two_party", |b| {
        b.iter(|| black_box(run_match(black_box(&settings), black_box(42))));
    });
}

fn bench_checkpoint(c: &mut Criterion) {
    let snap = run_match(&Settings::multi_party(5), 7);
    c.bench_function("snapshot_json_round_trip", |b| {
        b.iter(|| {
            let json = black_box(&snap).to_json().expect("serializable");
            black_box(GameSnapshot::from_json(&json).expect("round trip"))
        });
    });
}

criterion_group!(
    benches,
    bench_three_player,
    bench_five_player,
    bench_two_party,
    bench_checkpoint
);
criterion_main!(benches);
