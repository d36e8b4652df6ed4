//! Error types for the rule engine.
//!
//! Two kinds of failure exist:
//!
//! - [`ValidationError`]: a submitted decision is ineligible. The snapshot is
//!   untouched; the caller re-prompts the same player.
//! - [`EngineError::InconsistentState`]: the snapshot lacks data a resolver
//!   needs. Not recoverable; the caller offers a fresh match.
//!
//! "No mutual alliance" and "both betray" are rule branches, never errors.

use thiserror::Error;

use super::config::Mode;
use super::player::PlayerId;

/// A decision that cannot be accepted in the current snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Participant count does not fit the mode.
    #[error("{participant_count} participants cannot play {mode:?}")]
    InvalidSettings { participant_count: u8, mode: Mode },

    /// The stakes of all players together do not fit in a `u64`.
    #[error("buy-ins of {primary} + {secondary} for {participant_count} players overflow the pot")]
    StakeOverflow {
        participant_count: u8,
        primary: u64,
        secondary: u64,
    },

    /// Roster length differs from the configured participant count.
    #[error("roster has {actual} names but settings expect {expected}")]
    RosterSize { expected: usize, actual: usize },

    /// No player with this id.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// The operation does not apply to the current phase.
    #[error("expected {expected} phase, match is in {actual}")]
    WrongPhase {
        expected: &'static str,
        actual: &'static str,
    },

    /// The match already has winners.
    #[error("match has ended")]
    MatchEnded,

    /// The chooser is eliminated.
    #[error("{0} is not an active player")]
    NotActive(PlayerId),

    /// A player named themselves.
    #[error("{0} cannot ally with themselves")]
    SelfTarget(PlayerId),

    /// Alliance target is not an active player.
    #[error("{target} is not an eligible alliance target for {player}")]
    IneligibleTarget { player: PlayerId, target: PlayerId },

    /// Only finalists choose in a loyalty round.
    #[error("{0} is not a finalist")]
    NotAFinalist(PlayerId),

    /// A loyal two-party choice must predict the opponent.
    #[error("{0} chose loyalty without a prediction")]
    MissingPrediction(PlayerId),
}

/// Any failure an engine operation can report.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Recoverable: re-prompt the same player.
    #[error("invalid decision: {0}")]
    Validation(#[from] ValidationError),

    /// Unrecoverable: only a hard reset to a fresh match helps.
    #[error("inconsistent game state: {0}")]
    InconsistentState(String),

    /// Snapshot could not be written or read back.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] serde_json::Error),
}

impl EngineError {
    /// Shorthand for an `InconsistentState` error.
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::InconsistentState(message.into())
    }

    /// The validation failure, if that is what this is.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the caller can recover by re-prompting.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;
