//! Loyalty rounds.
//!
//! Both finalists choose loyalty or betrayal. The outcome depends on the
//! mode and stage:
//!
//! | Outcome      | 3p                   | 4p stage 1            | 4p stage 2                    | 5p round 3                  | 5p round 4                |
//! |--------------|----------------------|-----------------------|-------------------------------|-----------------------------|---------------------------|
//! | both loyal   | both win             | both win              | both win                      | both win                    | both win                  |
//! | one betrays  | betrayer wins        | betrayer wins         | betrayer wins, loyal out      | betrayer wins               | betrayer wins             |
//! | both betray  | round-1 loser wins   | the two eliminated return | random stage-1 finalist wins | all three eliminated return | alliance-round loser wins |
//!
//! Any loyal player facing a betrayer loses the secondary stake. Both
//! betraying costs both finalists the secondary stake; outside 3p they are
//! also eliminated.

use smallvec::SmallVec;
use tracing::{debug, info};

use crate::core::action::upsert;
use crate::core::{
    pick, Choice, Clock, EngineError, GameSnapshot, Lineage, LoyaltyChoice, LoyaltyStage, Phase,
    PlayerId, RandomSource, Result, ValidationError,
};
use crate::log::{LogEvent, LoyaltyOutcome};

use super::recorder::{Outcome, PlayerUpdate};

/// Store one finalist's choice. Resolution happens on the next advance.
pub fn submit_loyalty_choice(
    snapshot: &GameSnapshot,
    player: PlayerId,
    choice: Choice,
) -> Result<GameSnapshot> {
    let (finalists, stage, choices) = match &snapshot.phase {
        Phase::LoyaltyRound {
            finalists,
            stage,
            choices,
        } => (*finalists, *stage, choices),
        Phase::Ended { .. } => return Err(ValidationError::MatchEnded.into()),
        other => {
            return Err(ValidationError::WrongPhase {
                expected: "loyaltyRound",
                actual: other.kind(),
            }
            .into())
        }
    };

    snapshot.require_player(player)?;
    if !finalists.contains(&player) {
        return Err(ValidationError::NotAFinalist(player).into());
    }

    let mut choices = choices.clone();
    upsert(
        &mut choices,
        LoyaltyChoice {
            player_id: player,
            choice,
        },
        |c| c.player_id,
    );
    debug!(player = %player, stage = stage.number(), "loyalty choice recorded");

    let mut next = snapshot.clone();
    next.phase = Phase::LoyaltyRound {
        finalists,
        stage,
        choices,
    };
    Ok(next)
}

/// Both finalists have a stored choice.
pub(crate) fn all_chosen(snapshot: &GameSnapshot) -> bool {
    match &snapshot.phase {
        Phase::LoyaltyRound {
            finalists, choices, ..
        } => finalists
            .iter()
            .all(|f| choices.iter().any(|c| c.player_id == *f)),
        _ => false,
    }
}

/// Stage for the loyalty round that follows an alliance.
pub(crate) fn stage_after_alliance(snapshot: &GameSnapshot) -> Result<LoyaltyStage> {
    match (snapshot.participant_count(), snapshot.round) {
        (3, _) => Ok(LoyaltyStage::ThreePlayerFinal),
        (4, _) => Ok(LoyaltyStage::FourPlayerFinalists),
        (5, 3) => Ok(LoyaltyStage::FivePlayerFirst),
        (5, 4) => Ok(LoyaltyStage::FivePlayerFinal),
        (count, round) => Err(EngineError::inconsistent(format!(
            "no loyalty stage for {count} players in round {round}"
        ))),
    }
}

/// What a resolution decided, before it is turned into a log event.
struct Resolution {
    outcome: LoyaltyOutcome,
    winners: Vec<PlayerId>,
    returning: Vec<PlayerId>,
    from_pool: Vec<PlayerId>,
}

impl Resolution {
    fn ends(outcome: LoyaltyOutcome, winners: Vec<PlayerId>) -> Self {
        Self {
            outcome,
            winners,
            returning: Vec::new(),
            from_pool: Vec::new(),
        }
    }

    fn returns(outcome: LoyaltyOutcome, returning: Vec<PlayerId>) -> Self {
        Self {
            outcome,
            winners: Vec::new(),
            returning,
            from_pool: Vec::new(),
        }
    }

    fn event(
        self,
        stage: LoyaltyStage,
        finalists: [PlayerId; 2],
        choices: Vec<LoyaltyChoice>,
        lineage: &Lineage,
    ) -> LogEvent {
        match stage {
            LoyaltyStage::ThreePlayerFinal => LogEvent::Loyalty {
                finalists,
                choices,
                winners: self.winners,
                outcome: self.outcome,
            },
            LoyaltyStage::FourPlayerFinalists | LoyaltyStage::FourPlayerReturned { .. } => {
                LogEvent::Loyalty4p {
                    stage: stage.number(),
                    finalists,
                    choices,
                    winners: self.winners,
                    outcome: self.outcome,
                    returning_ids: self.returning,
                    from_finalist_pool: self.from_pool,
                }
            }
            LoyaltyStage::FivePlayerFirst | LoyaltyStage::FivePlayerFinal => LogEvent::Loyalty5p {
                stage: stage.number(),
                finalists,
                choices,
                winners: self.winners,
                outcome: self.outcome,
                returning_ids: self.returning,
                // Only the round-4 entry names the round-4 alliance loser.
                eliminated_alliance_round_id: match stage {
                    LoyaltyStage::FivePlayerFinal => lineage.eliminated_alliance_round,
                    _ => None,
                },
            },
        }
    }
}

/// Resolve a loyalty round whose finalists have both chosen.
pub(crate) fn resolve_loyalty(
    snapshot: &GameSnapshot,
    rng: &mut dyn RandomSource,
    clock: &dyn Clock,
) -> Result<GameSnapshot> {
    let (finalists, stage, stored) = match &snapshot.phase {
        Phase::LoyaltyRound {
            finalists,
            stage,
            choices,
        } => (*finalists, *stage, choices),
        other => {
            return Err(EngineError::inconsistent(format!(
                "cannot resolve loyalty during {}",
                other.kind()
            )))
        }
    };

    let [a, b] = finalists;
    if a == b {
        return Err(EngineError::inconsistent(format!("finalists are both {a}")));
    }
    for id in finalists {
        let active = snapshot.player(id).is_some_and(|p| p.is_active());
        if !active {
            return Err(EngineError::inconsistent(format!(
                "finalist {id} is not an active player"
            )));
        }
    }

    let choice_of = |id: PlayerId| {
        stored
            .iter()
            .find(|c| c.player_id == id)
            .map(|c| c.choice)
            .ok_or_else(|| EngineError::inconsistent(format!("{id} has no loyalty choice")))
    };
    let (choice_a, choice_b) = (choice_of(a)?, choice_of(b)?);
    let choices = vec![
        LoyaltyChoice {
            player_id: a,
            choice: choice_a,
        },
        LoyaltyChoice {
            player_id: b,
            choice: choice_b,
        },
    ];

    let mut lineage = snapshot.lineage.clone();
    let (outcome, resolution) = match (choice_a, choice_b) {
        (Choice::Loyal, Choice::Loyal) => (
            Outcome::new(Phase::Ended {
                winners: finalists.to_vec(),
            }),
            Resolution::ends(LoyaltyOutcome::BothLoyal, finalists.to_vec()),
        ),
        (Choice::Betray, Choice::Loyal) | (Choice::Loyal, Choice::Betray) => {
            let (betrayer, loyal) = if choice_a.is_betray() { (a, b) } else { (b, a) };
            let mut outcome = Outcome::new(Phase::Ended {
                winners: vec![betrayer],
            })
            .update(loyal, PlayerUpdate::LoseSecondary);
            if matches!(stage, LoyaltyStage::FourPlayerReturned { .. }) {
                outcome = outcome.update(loyal, PlayerUpdate::Eliminate);
            }
            (
                outcome,
                Resolution::ends(LoyaltyOutcome::SingleBetrayal, vec![betrayer]),
            )
        }
        (Choice::Betray, Choice::Betray) => {
            both_betray(finalists, stage, &mut lineage, rng)?
        }
    };

    info!(
        finalists = ?finalists,
        stage = stage.number(),
        outcome = ?resolution.outcome,
        winners = ?resolution.winners,
        "loyalty round resolved"
    );

    let event = resolution.event(stage, finalists, choices, &snapshot.lineage);
    outcome.lineage(lineage).log(event).commit(snapshot, clock)
}

fn both_betray(
    finalists: [PlayerId; 2],
    stage: LoyaltyStage,
    lineage: &mut Lineage,
    rng: &mut dyn RandomSource,
) -> Result<(Outcome, Resolution)> {
    let missing = |what: &str| EngineError::inconsistent(format!("both betrayed but {what} is unknown"));

    let resolved = match stage {
        LoyaltyStage::ThreePlayerFinal => {
            let winner = lineage
                .eliminated_first_round
                .ok_or_else(|| missing("the round-1 loser"))?;
            let outcome = Outcome::new(Phase::Ended {
                winners: vec![winner],
            })
            .update(finalists[0], PlayerUpdate::LoseSecondary)
            .update(finalists[1], PlayerUpdate::LoseSecondary);
            (
                outcome,
                Resolution::ends(LoyaltyOutcome::BothBetrayFirstRoundLoserWins, vec![winner]),
            )
        }
        LoyaltyStage::FourPlayerFinalists => {
            let random_loser = lineage
                .eliminated_random_first_round
                .ok_or_else(|| missing("the pre-game elimination"))?;
            let alliance_loser = lineage
                .eliminated_alliance_round
                .ok_or_else(|| missing("the alliance-round loser"))?;
            let returning = [random_loser, alliance_loser];

            let next = Phase::loyalty(
                returning,
                LoyaltyStage::FourPlayerReturned {
                    original_finalists: finalists,
                },
            );
            let outcome = betray_out(Outcome::new(next), finalists)
                .update(random_loser, PlayerUpdate::Return)
                .update(alliance_loser, PlayerUpdate::Return)
                .round(4);
            (
                outcome,
                Resolution::returns(
                    LoyaltyOutcome::BothBetrayFinalistsReturnedPlayers,
                    returning.to_vec(),
                ),
            )
        }
        LoyaltyStage::FourPlayerReturned { original_finalists } => {
            let winner = *pick(rng, &original_finalists)
                .ok_or_else(|| missing("the stage-1 finalist pool"))?;
            let outcome = betray_out(
                Outcome::new(Phase::Ended {
                    winners: vec![winner],
                }),
                finalists,
            );
            let mut resolution =
                Resolution::ends(LoyaltyOutcome::BothBetrayRandomOriginalFinalist, vec![winner]);
            resolution.from_pool = original_finalists.to_vec();
            (outcome, resolution)
        }
        LoyaltyStage::FivePlayerFirst => {
            let returning: SmallVec<[PlayerId; 3]> = lineage.eliminated_initial.clone();
            if returning.len() != 3 {
                return Err(EngineError::inconsistent(format!(
                    "expected 3 eliminated players to return, found {}",
                    returning.len()
                )));
            }
            lineage.eliminated_alliance_round = None;

            let mut outcome = betray_out(Outcome::new(Phase::alliance(1)), finalists);
            for &id in &returning {
                outcome = outcome.update(id, PlayerUpdate::Return);
            }
            (
                outcome,
                Resolution::returns(
                    LoyaltyOutcome::BothBetrayAllEliminatedReturn,
                    returning.to_vec(),
                ),
            )
        }
        LoyaltyStage::FivePlayerFinal => {
            let winner = lineage
                .eliminated_alliance_round
                .ok_or_else(|| missing("the alliance-round loser"))?;
            let outcome = betray_out(
                Outcome::new(Phase::Ended {
                    winners: vec![winner],
                }),
                finalists,
            );
            (
                outcome,
                Resolution::ends(LoyaltyOutcome::BothBetrayAllianceLoserWins, vec![winner]),
            )
        }
    };

    Ok(resolved)
}

fn betray_out(outcome: Outcome, finalists: [PlayerId; 2]) -> Outcome {
    outcome.betrayed_out(finalists[0]).betrayed_out(finalists[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FixedClock, ScriptedRandom, Settings};
    use crate::rules::setup::initialize_match;

    fn id(n: u8) -> PlayerId {
        PlayerId::new(n)
    }

    /// 3p match already at the loyalty round: 1 and 2 allied, 3 out.
    fn three_player_final() -> GameSnapshot {
        let mut rng = ScriptedRandom::default();
        let mut snap = initialize_match(
            &Settings::multi_party(3),
            &["A", "B", "C"],
            &mut rng,
            &FixedClock(0),
        )
        .unwrap();
        if let Some(p) = snap.player_mut(id(3)) {
            p.eliminated = true;
            p.lost_primary = true;
        }
        snap.lineage.eliminated_first_round = Some(id(3));
        snap.lineage.eliminated_alliance_round = Some(id(3));
        snap.round = 2;
        snap.phase = Phase::loyalty([id(1), id(2)], LoyaltyStage::ThreePlayerFinal);
        snap
    }

    fn play(snap: &GameSnapshot, a: Choice, b: Choice) -> GameSnapshot {
        let mut rng = ScriptedRandom::default();
        let [fa, fb] = snap.finalists().unwrap();
        let snap = submit_loyalty_choice(snap, fa, a).unwrap();
        let snap = submit_loyalty_choice(&snap, fb, b).unwrap();
        assert!(all_chosen(&snap));
        resolve_loyalty(&snap, &mut rng, &FixedClock(0)).unwrap()
    }

    #[test]
    fn test_submit_stores_without_resolving() {
        let snap = three_player_final();
        let snap = submit_loyalty_choice(&snap, id(1), Choice::Loyal).unwrap();

        assert_eq!(snap.loyalty_choices().len(), 1);
        assert!(!all_chosen(&snap));
        assert!(snap.log.is_empty());
    }

    #[test]
    fn test_non_finalist_rejected() {
        let snap = three_player_final();
        let err = submit_loyalty_choice(&snap, id(3), Choice::Betray).unwrap_err();
        assert_eq!(err.as_validation(), Some(&ValidationError::NotAFinalist(id(3))));
    }

    #[test]
    fn test_both_loyal_split() {
        let snap = play(&three_player_final(), Choice::Loyal, Choice::Loyal);
        assert_eq!(snap.winners(), &[id(1), id(2)]);
        assert!(!snap.player(id(1)).unwrap().lost_secondary);
    }

    #[test]
    fn test_single_betrayal() {
        let snap = play(&three_player_final(), Choice::Loyal, Choice::Betray);
        assert_eq!(snap.winners(), &[id(2)]);
        let loyal = snap.player(id(1)).unwrap();
        assert!(loyal.lost_secondary);
        assert!(!loyal.eliminated);
    }

    #[test]
    fn test_three_player_both_betray() {
        let snap = play(&three_player_final(), Choice::Betray, Choice::Betray);
        assert_eq!(snap.winners(), &[id(3)]);
        for f in [id(1), id(2)] {
            let p = snap.player(f).unwrap();
            assert!(p.lost_secondary);
            assert!(!p.eliminated);
        }
        match &snap.log.last().unwrap().event {
            LogEvent::Loyalty { outcome, choices, .. } => {
                assert_eq!(*outcome, LoyaltyOutcome::BothBetrayFirstRoundLoserWins);
                assert_eq!(choices.len(), 2);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_missing_lineage_is_inconsistent() {
        let mut snap = three_player_final();
        snap.lineage.eliminated_first_round = None;
        let snap = submit_loyalty_choice(&snap, id(1), Choice::Betray).unwrap();
        let snap = submit_loyalty_choice(&snap, id(2), Choice::Betray).unwrap();

        let err = resolve_loyalty(&snap, &mut ScriptedRandom::default(), &FixedClock(0)).unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_eliminated_finalist_is_inconsistent() {
        let mut snap = three_player_final();
        snap.phase = Phase::loyalty([id(1), id(3)], LoyaltyStage::ThreePlayerFinal);
        let snap = submit_loyalty_choice(&snap, id(1), Choice::Loyal).unwrap();
        let snap = submit_loyalty_choice(&snap, id(3), Choice::Loyal).unwrap();

        let err = resolve_loyalty(&snap, &mut ScriptedRandom::default(), &FixedClock(0)).unwrap_err();
        assert!(matches!(err, EngineError::InconsistentState(_)));
    }

    #[test]
    fn test_stage_after_alliance() {
        let mut snap = three_player_final();
        assert_eq!(
            stage_after_alliance(&snap).unwrap(),
            LoyaltyStage::ThreePlayerFinal
        );

        snap.settings.participant_count = 5;
        snap.round = 3;
        assert_eq!(
            stage_after_alliance(&snap).unwrap(),
            LoyaltyStage::FivePlayerFirst
        );
        snap.round = 4;
        assert_eq!(
            stage_after_alliance(&snap).unwrap(),
            LoyaltyStage::FivePlayerFinal
        );
        snap.round = 2;
        assert!(stage_after_alliance(&snap).is_err());
    }
}
