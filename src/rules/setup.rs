//! Match initialization.
//!
//! Builds the roster, then applies the pre-game random eliminations:
//!
//! - 4 players: one player out, round starts at 2.
//! - 5 players: two distinct players out (first two of a random
//!   permutation), round starts at 2.
//! - 3 players and two-party: nobody out, round 1.

use smallvec::SmallVec;
use tracing::info;

use crate::core::{
    Clock, GameSnapshot, Lineage, Mode, Phase, Player, PlayerId, PlayerMap, RandomSource, Result,
    Settings, ValidationError,
};
use crate::log::{GameLog, LogEvent};

use super::recorder::Outcome;

/// Build a fresh snapshot from settings and a roster of names.
///
/// The roster must have exactly `participant_count` names. Blank names
/// become `Player <id>`.
pub fn initialize_match<S: AsRef<str>>(
    settings: &Settings,
    roster: &[S],
    rng: &mut dyn RandomSource,
    clock: &dyn Clock,
) -> Result<GameSnapshot> {
    settings.validate()?;

    let count = usize::from(settings.participant_count);
    if roster.len() != count {
        return Err(ValidationError::RosterSize {
            expected: count,
            actual: roster.len(),
        }
        .into());
    }

    let players: Vec<Player> = roster
        .iter()
        .enumerate()
        .map(|(i, name)| Player::new(PlayerId::from_position(i), name.as_ref()))
        .collect();

    let blank = GameSnapshot {
        players,
        settings: settings.clone(),
        phase: Phase::Init,
        round: 1,
        lineage: Lineage::default(),
        pot: settings.total_buy_ins(),
        contributions: PlayerMap::with_value(count, settings.stake_per_player()),
        log: GameLog::new(),
    };

    let snapshot = match (settings.mode, count) {
        (Mode::MultiParty, 4) => {
            let out = PlayerId::from_position(rng.pick_index(count));
            info!(player = %out, "random pre-game elimination");

            let lineage = Lineage {
                eliminated_random_first_round: Some(out),
                eliminated_initial: SmallVec::from_slice(&[out]),
                ..Lineage::default()
            };
            Outcome::new(Phase::Init)
                .knock_out(out)
                .lineage(lineage)
                .round(2)
                .log(LogEvent::RandomElimination4p {
                    eliminated_player_id: out,
                })
                .commit(&blank, clock)?
        }
        (Mode::MultiParty, 5) => {
            let out: SmallVec<[PlayerId; 3]> = rng
                .permutation(count)
                .into_iter()
                .take(2)
                .map(PlayerId::from_position)
                .collect();
            info!(players = ?out, "random pre-game eliminations");

            let mut outcome = Outcome::new(Phase::Init);
            for &id in &out {
                outcome = outcome.knock_out(id);
            }
            outcome
                .lineage(Lineage {
                    eliminated_initial: out.clone(),
                    ..Lineage::default()
                })
                .round(2)
                .log(LogEvent::RandomElimination5p {
                    eliminated_player_ids: out.to_vec(),
                })
                .commit(&blank, clock)?
        }
        _ => blank,
    };

    info!(
        participants = count,
        mode = ?settings.mode,
        round = snapshot.round,
        "match initialized"
    );
    Ok(snapshot)
}
