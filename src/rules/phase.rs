//! Phase controller.
//!
//! Answers "what happens next" from the snapshot alone: whose decision is
//! pending and for which resolver, or, when no decision is pending, which
//! transition [`advance_phase`] should run.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    Clock, EngineError, GameSnapshot, LoyaltyStage, Mode, Phase, PlayerId, RandomSource, Result,
};

use super::{alliance, loyalty, two_party};

/// A decision the match is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PendingInput {
    /// An alliance target from `player`.
    Alliance { player: PlayerId, attempt: u8 },
    /// A loyalty choice from a finalist.
    Loyalty { player: PlayerId, stage: LoyaltyStage },
    /// A two-party choice and prediction.
    TwoParty { player: PlayerId, round: u32 },
    /// The joint continue/split call after both betrayed.
    Standoff { round: u32 },
}

impl PendingInput {
    /// The player holding the device, if a single player decides.
    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Self::Alliance { player, .. }
            | Self::Loyalty { player, .. }
            | Self::TwoParty { player, .. } => Some(*player),
            Self::Standoff { .. } => None,
        }
    }
}

/// Result of [`advance_phase`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    /// A transition ran; here is the new snapshot.
    Advanced(GameSnapshot),
    /// Nothing to do until this decision arrives.
    Pending(PendingInput),
    /// The match is over.
    Finished,
}

/// The decision the match is waiting for, if any.
///
/// `None` means either the match has ended or a transition is ready for
/// [`advance_phase`].
#[must_use]
pub fn pending_input(snapshot: &GameSnapshot) -> Option<PendingInput> {
    match &snapshot.phase {
        Phase::AllianceRound { attempt, choices } => snapshot
            .active_players()
            .find(|p| !choices.iter().any(|c| c.player_id == p.id))
            .map(|p| PendingInput::Alliance {
                player: p.id,
                attempt: *attempt,
            }),
        Phase::LoyaltyRound {
            finalists,
            stage,
            choices,
        } => finalists
            .iter()
            .find(|f| !choices.iter().any(|c| c.player_id == **f))
            .map(|&player| PendingInput::Loyalty {
                player,
                stage: *stage,
            }),
        Phase::TwoPartyRound { round, choices } => snapshot
            .players
            .iter()
            .find(|p| !choices.iter().any(|c| c.player_id == p.id))
            .map(|p| PendingInput::TwoParty {
                player: p.id,
                round: *round,
            }),
        Phase::TwoPartyStandoff { round, .. } => Some(PendingInput::Standoff { round: *round }),
        Phase::Init | Phase::AllianceResolved { .. } | Phase::Ended { .. } => None,
    }
}

/// Setup position of the player who should hold the device.
///
/// Outside a pending decision this is the first active player.
#[must_use]
pub fn active_position(snapshot: &GameSnapshot) -> Option<usize> {
    if snapshot.is_ended() {
        return None;
    }
    match pending_input(snapshot).and_then(|p| p.player()) {
        Some(player) => snapshot.position_of(player),
        None => snapshot.players.iter().position(|p| p.is_active()),
    }
}

/// Run the transition the snapshot is ready for.
///
/// - `init` opens the first alliance (or two-party) round.
/// - `allianceResolved` opens the loyalty round for the mode and round.
/// - A round with every choice stored is resolved.
/// - Otherwise the pending decision is reported.
pub fn advance_phase(
    snapshot: &GameSnapshot,
    rng: &mut dyn RandomSource,
    clock: &dyn Clock,
) -> Result<Advance> {
    let next = match &snapshot.phase {
        Phase::Ended { .. } => return Ok(Advance::Finished),
        Phase::Init => {
            let mut next = snapshot.clone();
            next.phase = match snapshot.mode() {
                Mode::MultiParty => Phase::alliance(1),
                Mode::TwoPartyIterated => Phase::two_party(1),
            };
            next
        }
        Phase::AllianceResolved { finalists, .. } => {
            let stage = loyalty::stage_after_alliance(snapshot)?;
            let mut next = snapshot.clone();
            next.phase = Phase::loyalty(*finalists, stage);
            next
        }
        Phase::AllianceRound { .. } if alliance::all_chosen(snapshot) => {
            alliance::resolve_attempt(snapshot, rng, clock)?
        }
        Phase::LoyaltyRound { .. } if loyalty::all_chosen(snapshot) => {
            loyalty::resolve_loyalty(snapshot, rng, clock)?
        }
        Phase::TwoPartyRound { .. } if two_party::all_chosen(snapshot) => {
            two_party::resolve_round(snapshot, clock)?
        }
        _ => {
            return pending_input(snapshot).map(Advance::Pending).ok_or_else(|| {
                EngineError::inconsistent(format!(
                    "{} phase has no pending decision",
                    snapshot.phase.kind()
                ))
            })
        }
    };

    debug!(from = snapshot.phase.kind(), to = next.phase.kind(), "phase advanced");
    Ok(Advance::Advanced(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AllianceChoice, Choice, FixedClock, ScriptedRandom, Settings};
    use crate::rules::setup::initialize_match;

    fn id(n: u8) -> PlayerId {
        PlayerId::new(n)
    }

    fn init(settings: Settings, picks: &[usize]) -> (GameSnapshot, ScriptedRandom) {
        let mut rng = ScriptedRandom::new(picks.iter().copied());
        let roster = vec![""; usize::from(settings.participant_count)];
        let snap = initialize_match(&settings, &roster, &mut rng, &FixedClock(0)).unwrap();
        (snap, rng)
    }

    fn advanced(snap: &GameSnapshot, rng: &mut ScriptedRandom) -> GameSnapshot {
        match advance_phase(snap, rng, &FixedClock(0)).unwrap() {
            Advance::Advanced(next) => next,
            other => panic!("expected a transition, got {other:?}"),
        }
    }

    #[test]
    fn test_init_opens_alliance_round() {
        let (snap, mut rng) = init(Settings::multi_party(4), &[0]);
        assert_eq!(pending_input(&snap), None);
        assert_eq!(active_position(&snap), Some(1));

        let snap = advanced(&snap, &mut rng);
        assert_eq!(snap.alliance_attempt(), Some(1));
        assert_eq!(
            pending_input(&snap),
            Some(PendingInput::Alliance {
                player: id(2),
                attempt: 1
            })
        );
    }

    #[test]
    fn test_init_opens_two_party_round() {
        let (snap, mut rng) = init(Settings::two_party(), &[]);
        let snap = advanced(&snap, &mut rng);
        assert_eq!(
            pending_input(&snap),
            Some(PendingInput::TwoParty {
                player: id(1),
                round: 1
            })
        );
    }

    #[test]
    fn test_pending_skips_players_who_chose() {
        let (mut snap, _) = init(Settings::multi_party(3), &[]);
        snap.phase = Phase::AllianceRound {
            attempt: 2,
            choices: smallvec::smallvec![AllianceChoice {
                player_id: id(1),
                target_id: id(3),
                was_random: false,
            }],
        };
        assert_eq!(
            pending_input(&snap),
            Some(PendingInput::Alliance {
                player: id(2),
                attempt: 2
            })
        );
        assert_eq!(active_position(&snap), Some(1));
    }

    #[test]
    fn test_alliance_resolved_opens_loyalty() {
        let (mut snap, mut rng) = init(Settings::multi_party(3), &[]);
        snap.round = 2;
        snap.phase = Phase::AllianceResolved {
            finalists: [id(1), id(3)],
            eliminated: vec![id(2)],
        };

        let snap = advanced(&snap, &mut rng);
        assert_eq!(snap.loyalty_stage(), Some(LoyaltyStage::ThreePlayerFinal));
        assert_eq!(
            pending_input(&snap).and_then(|p| p.player()),
            Some(id(1))
        );
    }

    #[test]
    fn test_pending_when_choices_missing() {
        let (mut snap, mut rng) = init(Settings::multi_party(3), &[]);
        snap.phase = Phase::loyalty([id(1), id(2)], LoyaltyStage::ThreePlayerFinal);
        let snap = loyalty::submit_loyalty_choice(&snap, id(1), Choice::Loyal).unwrap();

        let result = advance_phase(&snap, &mut rng, &FixedClock(0)).unwrap();
        assert_eq!(
            result,
            Advance::Pending(PendingInput::Loyalty {
                player: id(2),
                stage: LoyaltyStage::ThreePlayerFinal
            })
        );
    }

    #[test]
    fn test_standoff_pending() {
        let (mut snap, _) = init(Settings::two_party(), &[]);
        let betray = crate::core::TwoPartyChoice::new(id(1), Choice::Betray, None);
        snap.phase = Phase::TwoPartyStandoff {
            round: 3,
            choices: [betray, crate::core::TwoPartyChoice::new(id(2), Choice::Betray, None)],
        };
        let pending = pending_input(&snap);
        assert_eq!(pending, Some(PendingInput::Standoff { round: 3 }));
        assert_eq!(pending.and_then(|p| p.player()), None);
    }

    #[test]
    fn test_ended_is_finished() {
        let (mut snap, mut rng) = init(Settings::multi_party(3), &[]);
        snap.phase = Phase::Ended {
            winners: vec![id(2)],
        };
        assert_eq!(
            advance_phase(&snap, &mut rng, &FixedClock(0)).unwrap(),
            Advance::Finished
        );
        assert_eq!(active_position(&snap), None);
    }
}
