//! Two-party iterated rounds.
//!
//! Two players play repeated rounds over a shared pot. Each submits a
//! choice, and a loyal player also predicts the opponent.
//!
//! ## Payoffs
//!
//! - Both loyal: the pot grows by 2. Symmetric predictions cost 1 each;
//!   otherwise the player who predicted betrayal pays 2.
//! - One betrays, and the loyal player predicted loyalty: the betrayer takes
//!   the pot and the match ends.
//! - One betrays, and the loyal player foresaw it: the betrayal is cancelled
//!   and the betrayer pays 2.
//! - Both betray: the pot stands still and the pair decides to continue or
//!   split.

use tracing::{debug, info};

use crate::core::action::upsert;
use crate::core::{
    Choice, Clock, EngineError, GameSnapshot, Phase, PlayerId, Result, StandoffDecision,
    TwoPartyChoice, ValidationError,
};
use crate::log::{LogEvent, TwoPartyOutcome};

use super::recorder::Outcome;

/// Total paid into the pot by a round that grows it.
pub const ROUND_CONTRIBUTION: u64 = 2;

/// Store one player's choice for the current round.
///
/// A loyal choice requires a prediction; a prediction sent with a betrayal
/// is dropped.
pub fn submit_two_party_choice(
    snapshot: &GameSnapshot,
    player: PlayerId,
    choice: Choice,
    prediction: Option<Choice>,
) -> Result<GameSnapshot> {
    let (round, choices) = match &snapshot.phase {
        Phase::TwoPartyRound { round, choices } => (*round, choices),
        Phase::Ended { .. } => return Err(ValidationError::MatchEnded.into()),
        other => {
            return Err(ValidationError::WrongPhase {
                expected: "twoPartyRound",
                actual: other.kind(),
            }
            .into())
        }
    };

    snapshot.require_player(player)?;
    if choice == Choice::Loyal && prediction.is_none() {
        return Err(ValidationError::MissingPrediction(player).into());
    }

    let mut choices = choices.clone();
    upsert(
        &mut choices,
        TwoPartyChoice::new(player, choice, prediction),
        |c| c.player_id,
    );
    debug!(player = %player, round, "two-party choice recorded");

    let mut next = snapshot.clone();
    next.phase = Phase::TwoPartyRound { round, choices };
    Ok(next)
}

/// Both players have a stored choice.
pub(crate) fn all_chosen(snapshot: &GameSnapshot) -> bool {
    match &snapshot.phase {
        Phase::TwoPartyRound { choices, .. } => snapshot
            .players
            .iter()
            .all(|p| choices.iter().any(|c| c.player_id == p.id)),
        _ => false,
    }
}

/// Resolve a round in which both players have chosen.
pub(crate) fn resolve_round(snapshot: &GameSnapshot, clock: &dyn Clock) -> Result<GameSnapshot> {
    let (round, stored) = match &snapshot.phase {
        Phase::TwoPartyRound { round, choices } => (*round, choices),
        other => {
            return Err(EngineError::inconsistent(format!(
                "cannot resolve a two-party round during {}",
                other.kind()
            )))
        }
    };

    let [p1, p2] = snapshot.two_party_players()?;
    let choice_of = |id: PlayerId| {
        stored
            .iter()
            .find(|c| c.player_id == id)
            .copied()
            .ok_or_else(|| EngineError::inconsistent(format!("{id} has no two-party choice")))
    };
    let choices = [choice_of(p1)?, choice_of(p2)?];
    let [c1, c2] = choices;

    let (outcome, paid, next_phase) = match (c1.choice, c2.choice) {
        (Choice::Loyal, Choice::Loyal) => {
            let correct1 = predicted_loyal(&c1)?;
            let correct2 = predicted_loyal(&c2)?;
            let (outcome, paid) = match (correct1, correct2) {
                (true, true) => (TwoPartyOutcome::BothLoyalBothCorrect, [1, 1]),
                (true, false) => (TwoPartyOutcome::BothLoyalFirstCorrect, [0, ROUND_CONTRIBUTION]),
                (false, true) => (TwoPartyOutcome::BothLoyalSecondCorrect, [ROUND_CONTRIBUTION, 0]),
                (false, false) => (TwoPartyOutcome::BothLoyalBothWrong, [1, 1]),
            };
            (outcome, paid, Phase::two_party(round + 1))
        }
        (Choice::Betray, Choice::Loyal) | (Choice::Loyal, Choice::Betray) => {
            let (betrayer, loyal, betrayer_slot) = if c1.choice.is_betray() {
                (p1, c2, 0)
            } else {
                (p2, c1, 1)
            };
            if predicted_loyal(&loyal)? {
                (
                    TwoPartyOutcome::BetrayalSucceeded,
                    [0, 0],
                    Phase::Ended {
                        winners: vec![betrayer],
                    },
                )
            } else {
                let mut paid = [0, 0];
                paid[betrayer_slot] = ROUND_CONTRIBUTION;
                (
                    TwoPartyOutcome::BetrayalCancelled,
                    paid,
                    Phase::two_party(round + 1),
                )
            }
        }
        (Choice::Betray, Choice::Betray) => {
            debug!(round, "both betrayed, awaiting standoff decision");
            let mut next = snapshot.clone();
            next.phase = Phase::TwoPartyStandoff { round, choices };
            return Ok(next);
        }
    };

    let overflow = || EngineError::inconsistent(format!("pot overflows in round {round}"));
    let pot_before = snapshot.pot;
    let pot_after = pot_before
        .checked_add(paid[0] + paid[1])
        .ok_or_else(overflow)?;
    let mut contributions = snapshot.contributions.clone();
    contributions[p1] = contributions[p1].checked_add(paid[0]).ok_or_else(overflow)?;
    contributions[p2] = contributions[p2].checked_add(paid[1]).ok_or_else(overflow)?;

    info!(round, outcome = ?outcome, pot_before, pot_after, "two-party round resolved");

    Outcome::new(next_phase)
        .pot(pot_after, contributions)
        .log(LogEvent::TwoPartyRound {
            round,
            player1_id: p1,
            player2_id: p2,
            choices,
            contributions: paid,
            pot_before,
            pot_after,
            outcome,
        })
        .commit(snapshot, clock)
}

/// Settle a both-betray standoff: another round, or end and share the pot.
pub fn submit_two_party_resolution(
    snapshot: &GameSnapshot,
    decision: StandoffDecision,
    clock: &dyn Clock,
) -> Result<GameSnapshot> {
    let (round, choices) = match &snapshot.phase {
        Phase::TwoPartyStandoff { round, choices } => (*round, *choices),
        Phase::Ended { .. } => return Err(ValidationError::MatchEnded.into()),
        other => {
            return Err(ValidationError::WrongPhase {
                expected: "twoPartyStandoff",
                actual: other.kind(),
            }
            .into())
        }
    };

    let [p1, p2] = snapshot.two_party_players()?;
    let (outcome, next_phase) = match decision {
        StandoffDecision::Continue => (TwoPartyOutcome::BothBetrayContinue, Phase::two_party(round + 1)),
        StandoffDecision::Split => (
            TwoPartyOutcome::BothBetraySplit,
            Phase::Ended {
                winners: vec![p1, p2],
            },
        ),
    };

    info!(round, outcome = ?outcome, pot = snapshot.pot, "two-party standoff resolved");

    Outcome::new(next_phase)
        .log(LogEvent::TwoPartyRound {
            round,
            player1_id: p1,
            player2_id: p2,
            choices,
            contributions: [0, 0],
            pot_before: snapshot.pot,
            pot_after: snapshot.pot,
            outcome,
        })
        .commit(snapshot, clock)
}

fn predicted_loyal(choice: &TwoPartyChoice) -> Result<bool> {
    choice
        .prediction
        .map(|p| p == Choice::Loyal)
        .ok_or_else(|| {
            EngineError::inconsistent(format!("{} is loyal without a prediction", choice.player_id))
        })
}
