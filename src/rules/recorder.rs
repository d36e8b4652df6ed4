//! Outcome recording: folds a resolution into a new snapshot.
//!
//! Resolvers never touch a snapshot directly. They describe what happened
//! as an [`Outcome`] (a batch of [`PlayerUpdate`]s, the next phase, and at
//! most one log event) and the recorder commits it in one step. A resolver
//! that fails part-way leaves the caller's snapshot untouched.

use crate::core::{
    Clock, EngineError, GameSnapshot, Lineage, Phase, PlayerId, PlayerMap, Result,
};
use crate::log::LogEvent;

/// A single flag change on one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerUpdate {
    Eliminate,
    LosePrimary,
    LoseSecondary,
    /// Back into play. Loss flags are kept.
    Return,
}

/// Everything one resolution changes.
#[derive(Clone, Debug)]
#[must_use]
pub struct Outcome {
    phase: Phase,
    updates: Vec<(PlayerId, PlayerUpdate)>,
    round: Option<u8>,
    lineage: Option<Lineage>,
    pot: Option<(u64, PlayerMap<u64>)>,
    event: Option<LogEvent>,
}

impl Outcome {
    /// An outcome that moves the match to `phase`.
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            updates: Vec::new(),
            round: None,
            lineage: None,
            pot: None,
            event: None,
        }
    }

    pub fn update(mut self, player: PlayerId, update: PlayerUpdate) -> Self {
        self.updates.push((player, update));
        self
    }

    /// Eliminated, primary stake lost.
    pub fn knock_out(self, player: PlayerId) -> Self {
        self.update(player, PlayerUpdate::Eliminate)
            .update(player, PlayerUpdate::LosePrimary)
    }

    /// Eliminated, both stakes lost.
    pub fn forfeit(self, player: PlayerId) -> Self {
        self.knock_out(player)
            .update(player, PlayerUpdate::LoseSecondary)
    }

    /// Secondary stake lost and eliminated.
    pub fn betrayed_out(self, player: PlayerId) -> Self {
        self.update(player, PlayerUpdate::LoseSecondary)
            .update(player, PlayerUpdate::Eliminate)
    }

    pub fn round(mut self, round: u8) -> Self {
        self.round = Some(round);
        self
    }

    pub fn lineage(mut self, lineage: Lineage) -> Self {
        self.lineage = Some(lineage);
        self
    }

    pub fn pot(mut self, pot: u64, contributions: PlayerMap<u64>) -> Self {
        self.pot = Some((pot, contributions));
        self
    }

    pub fn log(mut self, event: LogEvent) -> Self {
        self.event = Some(event);
        self
    }

    /// Apply to a copy of `snapshot`, stamping the log entry with `clock`.
    pub fn commit(self, snapshot: &GameSnapshot, clock: &dyn Clock) -> Result<GameSnapshot> {
        let mut next = snapshot.clone();

        for (id, update) in self.updates {
            let player = next
                .player_mut(id)
                .ok_or_else(|| EngineError::inconsistent(format!("outcome names unknown {id}")))?;
            match update {
                PlayerUpdate::Eliminate => player.eliminated = true,
                PlayerUpdate::LosePrimary => player.lost_primary = true,
                PlayerUpdate::LoseSecondary => player.lost_secondary = true,
                PlayerUpdate::Return => player.eliminated = false,
            }
        }

        if let Some(round) = self.round {
            next.round = round;
        }
        if let Some(lineage) = self.lineage {
            next.lineage = lineage;
        }
        if let Some((pot, contributions)) = self.pot {
            next.pot = pot;
            next.contributions = contributions;
        }
        if let Some(event) = self.event {
            next.log.append(clock.now_millis(), event);
        }

        next.phase = self.phase;
        Ok(next)
    }
}
