//! Property-based tests over randomly played matches.
//!
//! A match is driven by a seeded engine plus a byte stream: each pending
//! decision consumes one byte. Every transition is checked against the
//! invariants that must hold for any sequence of legal decisions.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use trust_engine::core::{
    AllianceChoice, AllianceTarget, Choice, FixedClock, GameRng, GameSnapshot, PlayerId, Settings,
    StandoffDecision, MAX_ALLIANCE_ATTEMPTS,
};
use trust_engine::log::LogEvent;
use trust_engine::rules::{find_mutual_pair, Advance, PendingInput, TrustEngine};

type Engine = TrustEngine<GameRng, FixedClock>;

const MAX_STEPS: usize = 400;

fn engine(seed: u64) -> Engine {
    TrustEngine::with_sources(GameRng::new(seed), FixedClock(0))
}

fn choice(byte: u8) -> Choice {
    if byte & 1 == 0 {
        Choice::Loyal
    } else {
        Choice::Betray
    }
}

/// One decision for whatever the snapshot is waiting on.
fn decide(engine: &mut Engine, snap: &GameSnapshot, pending: PendingInput, byte: u8) -> GameSnapshot {
    match pending {
        PendingInput::Alliance { player, .. } => {
            let others: Vec<PlayerId> = snap
                .active_ids()
                .into_iter()
                .filter(|&id| id != player)
                .collect();
            let target = if byte % 5 == 0 {
                AllianceTarget::Random
            } else {
                AllianceTarget::Player(others[usize::from(byte) % others.len()])
            };
            engine.submit_alliance_choice(snap, player, target).unwrap()
        }
        PendingInput::Loyalty { player, .. } => engine
            .submit_loyalty_choice(snap, player, choice(byte), None)
            .unwrap(),
        PendingInput::TwoParty { player, .. } => engine
            .submit_two_party_choice(snap, player, choice(byte), Some(choice(byte >> 1)))
            .unwrap(),
        PendingInput::Standoff { .. } => {
            let decision = if byte % 3 == 0 {
                StandoffDecision::Split
            } else {
                StandoffDecision::Continue
            };
            engine.submit_two_party_resolution(snap, decision).unwrap()
        }
    }
}

/// Invariants between consecutive snapshots.
fn check_step(prev: &GameSnapshot, next: &GameSnapshot) -> Result<(), TestCaseError> {
    for (before, after) in prev.players.iter().zip(&next.players) {
        prop_assert!(!before.lost_primary || after.lost_primary);
        prop_assert!(!before.lost_secondary || after.lost_secondary);
    }

    prop_assert!(prev.log.len() <= next.log.len());
    for (a, b) in prev.log.iter().zip(next.log.iter()) {
        prop_assert_eq!(a, b);
    }

    prop_assert_eq!(next.pot, next.contributions.values().sum::<u64>());
    prop_assert!(next.pot >= prev.pot);
    prop_assert!(next.alliance_attempt().unwrap_or(1) <= MAX_ALLIANCE_ATTEMPTS);
    Ok(())
}

/// Play until the match ends or the step cap is hit.
fn play(settings: &Settings, seed: u64, bytes: &[u8]) -> Result<GameSnapshot, TestCaseError> {
    let mut engine = engine(seed);
    let roster = vec![""; usize::from(settings.participant_count)];
    let mut snap = engine.initialize_match(settings, &roster).unwrap();
    let mut cursor = bytes.iter().copied().cycle();

    for _ in 0..MAX_STEPS {
        let next = match engine.pending_input(&snap) {
            Some(pending) => {
                let byte = cursor.next().unwrap_or(0);
                decide(&mut engine, &snap, pending, byte)
            }
            None => match engine.advance_phase(&snap).unwrap() {
                Advance::Advanced(next) => next,
                Advance::Finished => break,
                Advance::Pending(p) => {
                    return Err(TestCaseError::fail(format!("pending {p:?} not reported")))
                }
            },
        };
        check_step(&snap, &next)?;
        snap = next;
    }
    Ok(snap)
}

fn check_ended(snap: &GameSnapshot) -> Result<(), TestCaseError> {
    let winners = snap.winners();
    prop_assert!(!winners.is_empty());
    let mut distinct = winners.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    prop_assert_eq!(distinct.len(), winners.len());

    let engine = engine(0);
    let settlement = engine.settle(snap).unwrap();
    prop_assert_eq!(settlement.total_payout(), settlement.pool);
    prop_assert_eq!(settlement.pool, snap.contributions.values().sum::<u64>());
    let share = settlement.pool / winners.len() as u64;
    for entry in &settlement.entries {
        if winners.contains(&entry.player_id) {
            prop_assert!(entry.payout == share || entry.payout == share + 1);
        } else {
            prop_assert_eq!(entry.payout, 0);
            prop_assert_eq!(entry.forfeited, entry.contributed);
        }
    }

    for entry in snap.log.iter() {
        match &entry.event {
            LogEvent::NoAllianceRandomWinner { attempts, .. }
            | LogEvent::NoAlliancePrizeToEliminated4p { attempts, .. }
            | LogEvent::NoAlliancePrizeToEliminated5p { attempts, .. } => {
                prop_assert_eq!(*attempts, MAX_ALLIANCE_ATTEMPTS);
            }
            LogEvent::Alliance { attempt, .. } => {
                prop_assert!((1..=MAX_ALLIANCE_ATTEMPTS).contains(attempt));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Take the next phase, failing the case if there is none.
fn advanced(engine: &mut Engine, snap: &GameSnapshot) -> Result<GameSnapshot, TestCaseError> {
    match engine.advance_phase(snap).unwrap() {
        Advance::Advanced(next) => Ok(next),
        other => Err(TestCaseError::fail(format!("expected a transition, got {other:?}"))),
    }
}

/// Lowest `(i, j)` with `i < j` that chose each other, by exhaustive search.
fn brute_force_pair(n: u8, targets: &[u8]) -> Option<[PlayerId; 2]> {
    (1..=n)
        .flat_map(|i| (i + 1..=n).map(move |j| (i, j)))
        .find(|&(i, j)| {
            targets[usize::from(i - 1)] == j && targets[usize::from(j - 1)] == i
        })
        .map(|(i, j)| [PlayerId::new(i), PlayerId::new(j)])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Multi-party matches always end, settle exactly, and keep every
    /// per-step invariant.
    #[test]
    fn prop_multi_party_match_settles(
        count in 3u8..=5,
        seed in any::<u64>(),
        bytes in proptest::collection::vec(any::<u8>(), 1..48)
    ) {
        let settings = Settings::multi_party(count).with_buy_ins(3, 2);
        let snap = play(&settings, seed, &bytes)?;

        prop_assert!(snap.is_ended());
        check_ended(&snap)?;
    }

    /// Two-party pots only grow, and an ended match settles exactly.
    #[test]
    fn prop_two_party_pot_accounting(
        seed in any::<u64>(),
        bytes in proptest::collection::vec(any::<u8>(), 1..48)
    ) {
        let snap = play(&Settings::two_party(), seed, &bytes)?;

        prop_assert!(snap.pot >= Settings::two_party().total_buy_ins());
        if snap.is_ended() {
            check_ended(&snap)?;
        }
    }

    /// Resubmitting the same alliance choice changes nothing.
    #[test]
    fn prop_alliance_resubmission_is_idempotent(
        count in 3u8..=5,
        seed in any::<u64>(),
        pick in any::<u8>()
    ) {
        let mut engine = engine(seed);
        let roster = vec![""; usize::from(count)];
        let snap = engine.initialize_match(&Settings::multi_party(count), &roster).unwrap();
        let snap = advanced(&mut engine, &snap)?;

        let active = snap.active_ids();
        let player = active[0];
        let target = active[1 + usize::from(pick) % (active.len() - 1)];

        let once = engine
            .submit_alliance_choice(&snap, player, AllianceTarget::Player(target))
            .unwrap();
        let twice = engine
            .submit_alliance_choice(&once, player, AllianceTarget::Player(target))
            .unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Resubmitting the same loyalty choice changes nothing, and a
    /// different one replaces it.
    #[test]
    fn prop_loyalty_resubmission_is_idempotent(
        seed in any::<u64>(),
        byte in any::<u8>(),
        second_finalist in any::<bool>()
    ) {
        let mut engine = engine(seed);
        let snap = engine.initialize_match(&Settings::multi_party(3), &["", "", ""]).unwrap();
        let mut snap = advanced(&mut engine, &snap)?;
        for (player, target) in [(1, 2), (2, 1), (3, 1)] {
            snap = engine
                .submit_alliance_choice(
                    &snap,
                    PlayerId::new(player),
                    AllianceTarget::Player(PlayerId::new(target)),
                )
                .unwrap();
        }
        let snap = advanced(&mut engine, &snap)?;

        let finalists = snap.finalists().unwrap();
        let player = finalists[usize::from(second_finalist)];
        let once = engine.submit_loyalty_choice(&snap, player, choice(byte), None).unwrap();
        let twice = engine.submit_loyalty_choice(&once, player, choice(byte), None).unwrap();
        prop_assert_eq!(&once, &twice);

        let flipped = engine
            .submit_loyalty_choice(&once, player, choice(byte ^ 1), None)
            .unwrap();
        let direct = engine
            .submit_loyalty_choice(&snap, player, choice(byte ^ 1), None)
            .unwrap();
        prop_assert_eq!(flipped, direct);
    }

    /// Resubmitting the same two-party choice changes nothing, and a
    /// different one replaces it.
    #[test]
    fn prop_two_party_resubmission_is_idempotent(
        seed in any::<u64>(),
        byte in any::<u8>(),
        player in 1u8..=2
    ) {
        let mut engine = engine(seed);
        let snap = engine.initialize_match(&Settings::two_party(), &["", ""]).unwrap();
        let snap = advanced(&mut engine, &snap)?;
        let player = PlayerId::new(player);
        let prediction = Some(choice(byte >> 1));

        let once = engine
            .submit_two_party_choice(&snap, player, choice(byte), prediction)
            .unwrap();
        let twice = engine
            .submit_two_party_choice(&once, player, choice(byte), prediction)
            .unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.two_party_choices().len(), 1);

        let replaced = engine
            .submit_two_party_choice(&once, player, Choice::Loyal, Some(Choice::Betray))
            .unwrap();
        let direct = engine
            .submit_two_party_choice(&snap, player, Choice::Loyal, Some(Choice::Betray))
            .unwrap();
        prop_assert_eq!(replaced, direct);
    }

    /// The mutual-pair search agrees with exhaustive search.
    #[test]
    fn prop_mutual_pair_is_lowest(
        n in 3u8..=5,
        raw in proptest::collection::vec(any::<u8>(), 5)
    ) {
        // Each player targets someone other than themselves.
        let targets: Vec<u8> = (1..=n)
            .map(|i| {
                let offset = raw[usize::from(i - 1)] % (n - 1);
                (i + offset) % n + 1
            })
            .collect();
        let choices: Vec<AllianceChoice> = (1..=n)
            .map(|i| AllianceChoice {
                player_id: PlayerId::new(i),
                target_id: PlayerId::new(targets[usize::from(i - 1)]),
                was_random: false,
            })
            .collect();
        let active: Vec<PlayerId> = (1..=n).rev().map(PlayerId::new).collect();

        prop_assert_eq!(find_mutual_pair(&active, &choices), brute_force_pair(n, &targets));
    }
}
