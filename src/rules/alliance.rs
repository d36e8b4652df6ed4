//! Alliance rounds.
//!
//! Every active player names one other active player. Once all have chosen,
//! the first mutual pair in ascending id order becomes the finalists and
//! everyone else active is knocked out. Without a mutual pair the round is
//! retried, up to [`MAX_ALLIANCE_ATTEMPTS`] attempts, after which a
//! mode-dependent fallback picks the winners and ends the match.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::core::action::upsert;
use crate::core::{
    pick, AllianceChoice, AllianceTarget, Clock, EngineError, GameSnapshot, Phase, PlayerId,
    RandomSource, Result, ValidationError, MAX_ALLIANCE_ATTEMPTS,
};
use crate::log::LogEvent;

use super::recorder::Outcome;

/// Record one player's alliance choice, resolving the attempt once every
/// active player has chosen.
///
/// Choosing again before the attempt resolves replaces the earlier choice.
pub fn submit_alliance_choice(
    snapshot: &GameSnapshot,
    player: PlayerId,
    target: AllianceTarget,
    rng: &mut dyn RandomSource,
    clock: &dyn Clock,
) -> Result<GameSnapshot> {
    let (attempt, choices) = match &snapshot.phase {
        Phase::AllianceRound { attempt, choices } => (*attempt, choices),
        Phase::Ended { .. } => return Err(ValidationError::MatchEnded.into()),
        other => {
            return Err(ValidationError::WrongPhase {
                expected: "allianceRound",
                actual: other.kind(),
            }
            .into())
        }
    };

    if !snapshot.require_player(player)?.is_active() {
        return Err(ValidationError::NotActive(player).into());
    }

    let choice = match target {
        AllianceTarget::Player(target_id) => {
            if target_id == player {
                return Err(ValidationError::SelfTarget(player).into());
            }
            let eligible = snapshot.player(target_id).is_some_and(|p| p.is_active());
            if !eligible {
                return Err(ValidationError::IneligibleTarget {
                    player,
                    target: target_id,
                }
                .into());
            }
            AllianceChoice {
                player_id: player,
                target_id,
                was_random: false,
            }
        }
        AllianceTarget::Random => {
            let others: Vec<PlayerId> = snapshot
                .active_players()
                .map(|p| p.id)
                .filter(|&id| id != player)
                .collect();
            let target_id = *pick(rng, &others)
                .ok_or_else(|| EngineError::inconsistent("no other active player to ally with"))?;
            AllianceChoice {
                player_id: player,
                target_id,
                was_random: true,
            }
        }
    };

    let mut choices = choices.clone();
    upsert(&mut choices, choice, |c| c.player_id);
    debug!(
        player = %player,
        target = %choice.target_id,
        random = choice.was_random,
        attempt,
        "alliance choice recorded"
    );

    let mut next = snapshot.clone();
    next.phase = Phase::AllianceRound { attempt, choices };

    if all_chosen(&next) {
        resolve_attempt(&next, rng, clock)
    } else {
        Ok(next)
    }
}

/// Every active player has a choice in the current attempt.
pub(crate) fn all_chosen(snapshot: &GameSnapshot) -> bool {
    let choices = snapshot.alliance_choices();
    snapshot
        .active_players()
        .all(|p| choices.iter().any(|c| c.player_id == p.id))
}

/// First mutual pair `(i, j)`, `i < j`, scanning `active` in ascending id order.
pub fn find_mutual_pair(active: &[PlayerId], choices: &[AllianceChoice]) -> Option<[PlayerId; 2]> {
    let targets: FxHashMap<PlayerId, PlayerId> = choices
        .iter()
        .map(|c| (c.player_id, c.target_id))
        .collect();

    let mut ids = active.to_vec();
    ids.sort_unstable();

    for (n, &i) in ids.iter().enumerate() {
        for &j in &ids[n + 1..] {
            if targets.get(&i) == Some(&j) && targets.get(&j) == Some(&i) {
                return Some([i, j]);
            }
        }
    }
    None
}

/// Resolve a complete attempt: alliance, retry, or fallback.
pub(crate) fn resolve_attempt(
    snapshot: &GameSnapshot,
    rng: &mut dyn RandomSource,
    clock: &dyn Clock,
) -> Result<GameSnapshot> {
    let (attempt, choices) = match &snapshot.phase {
        Phase::AllianceRound { attempt, choices } => (*attempt, choices.as_slice()),
        other => {
            return Err(EngineError::inconsistent(format!(
                "cannot resolve an alliance attempt during {}",
                other.kind()
            )))
        }
    };

    let active = snapshot.active_ids();
    match find_mutual_pair(&active, choices) {
        Some(finalists) => form_alliance(snapshot, attempt, finalists, &active, choices, clock),
        None if attempt < MAX_ALLIANCE_ATTEMPTS => {
            debug!(attempt, "no mutual alliance, retrying");
            let mut next = snapshot.clone();
            next.phase = Phase::alliance(attempt + 1);
            Ok(next)
        }
        None => no_alliance_fallback(snapshot, choices, rng, clock),
    }
}

fn form_alliance(
    snapshot: &GameSnapshot,
    attempt: u8,
    finalists: [PlayerId; 2],
    active: &[PlayerId],
    choices: &[AllianceChoice],
    clock: &dyn Clock,
) -> Result<GameSnapshot> {
    let eliminated: Vec<PlayerId> = active
        .iter()
        .copied()
        .filter(|id| !finalists.contains(id))
        .collect();

    let mut lineage = snapshot.lineage.clone();
    lineage.eliminated_alliance_round = eliminated.first().copied();

    let round = match (snapshot.participant_count(), snapshot.round) {
        (3, _) => {
            lineage.eliminated_first_round = eliminated.first().copied();
            2
        }
        (4, _) | (5, 2) => {
            lineage.eliminated_initial.extend(eliminated.iter().copied());
            3
        }
        _ => 4,
    };

    info!(
        finalists = ?finalists,
        eliminated = ?eliminated,
        attempt,
        "alliance formed"
    );

    let mut outcome = Outcome::new(Phase::AllianceResolved {
        finalists,
        eliminated: eliminated.clone(),
    });
    for &id in &eliminated {
        outcome = outcome.knock_out(id);
    }
    outcome
        .lineage(lineage)
        .round(round)
        .log(LogEvent::Alliance {
            attempt,
            finalists,
            eliminated,
            alliance_choices: choices.to_vec(),
        })
        .commit(snapshot, clock)
}

fn no_alliance_fallback(
    snapshot: &GameSnapshot,
    choices: &[AllianceChoice],
    rng: &mut dyn RandomSource,
    clock: &dyn Clock,
) -> Result<GameSnapshot> {
    let attempts = MAX_ALLIANCE_ATTEMPTS;
    let alliance_choices = choices.to_vec();

    let (winners, event) = match (snapshot.participant_count(), snapshot.round) {
        (4, _) => {
            let winner = snapshot.lineage.eliminated_random_first_round.ok_or_else(|| {
                EngineError::inconsistent("4p fallback without a pre-game elimination")
            })?;
            let winners = vec![winner];
            let event = LogEvent::NoAlliancePrizeToEliminated4p {
                attempts,
                winners: winners.clone(),
                eliminated_random_first_round_id: winner,
                alliance_choices,
            };
            (winners, event)
        }
        (5, 2) => {
            let initial: SmallVec<[PlayerId; 3]> = snapshot.lineage.eliminated_initial.clone();
            if initial.len() != 2 {
                return Err(EngineError::inconsistent(format!(
                    "5p round-2 fallback expects 2 pre-game eliminations, found {}",
                    initial.len()
                )));
            }
            let winners = initial.to_vec();
            let event = LogEvent::NoAlliancePrizeToEliminated5p {
                attempts,
                winners: winners.clone(),
                eliminated_initial_ids: initial.to_vec(),
                alliance_choices,
            };
            (winners, event)
        }
        _ => {
            let active = snapshot.active_ids();
            let winner = *pick(rng, &active)
                .ok_or_else(|| EngineError::inconsistent("no active player to award"))?;
            let winners = vec![winner];
            let event = LogEvent::NoAllianceRandomWinner {
                attempts,
                winners: winners.clone(),
                alliance_choices,
            };
            (winners, event)
        }
    };

    info!(winners = ?winners, kind = event.kind(), "no alliance after final attempt");

    let mut outcome = Outcome::new(Phase::Ended {
        winners: winners.clone(),
    });
    for player in &snapshot.players {
        if !winners.contains(&player.id) {
            outcome = outcome.forfeit(player.id);
        }
    }
    outcome.log(event).commit(snapshot, clock)
}
