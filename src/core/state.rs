//! Match state: the snapshot every operation reads and replaces.
//!
//! ## GameSnapshot
//!
//! The aggregate root. Holds the roster, the settings, the current
//! [`Phase`], the elimination [`Lineage`], the pot, and the log.
//!
//! ## Phase
//!
//! A tagged variant per phase. Each variant carries only the fields that are
//! meaningful while it is current, so "which fields are valid right now" is
//! answered by the type.
//!
//! Snapshots are values: operations take `&GameSnapshot` and return a new
//! one. The log is an `im::Vector`, so the clone each transition makes is
//! cheap.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::action::{AllianceChoice, LoyaltyChoice, TwoPartyChoice};
use super::config::{Mode, Settings};
use super::error::{EngineError, Result, ValidationError};
use super::player::{Player, PlayerId, PlayerMap};
use crate::log::GameLog;

/// Which loyalty round is being played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LoyaltyStage {
    /// 3p: the only loyalty round.
    ThreePlayerFinal,
    /// 4p: the alliance finalists.
    FourPlayerFinalists,
    /// 4p: the two returned players, after both stage-1 finalists betrayed.
    FourPlayerReturned { original_finalists: [PlayerId; 2] },
    /// 5p round 3, first loyalty round.
    FivePlayerFirst,
    /// 5p round 4, after the returned players formed a new alliance.
    FivePlayerFinal,
}

impl LoyaltyStage {
    /// Stage index as logged: 1 or 2.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::ThreePlayerFinal | Self::FourPlayerFinalists | Self::FivePlayerFirst => 1,
            Self::FourPlayerReturned { .. } | Self::FivePlayerFinal => 2,
        }
    }
}

/// The current phase and its phase-local data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Phase {
    /// Roster built, pre-game eliminations applied; nothing chosen yet.
    Init,

    /// Active players are naming alliance targets.
    AllianceRound {
        /// 1..=3.
        attempt: u8,
        choices: SmallVec<[AllianceChoice; 3]>,
    },

    /// A mutual alliance formed; waiting to open the loyalty round.
    AllianceResolved {
        finalists: [PlayerId; 2],
        eliminated: Vec<PlayerId>,
    },

    /// Finalists are choosing loyalty or betrayal.
    LoyaltyRound {
        finalists: [PlayerId; 2],
        stage: LoyaltyStage,
        choices: SmallVec<[LoyaltyChoice; 2]>,
    },

    /// Two-party iterated round in progress.
    TwoPartyRound {
        round: u32,
        choices: SmallVec<[TwoPartyChoice; 2]>,
    },

    /// Both players betrayed; waiting for the continue/split decision.
    TwoPartyStandoff {
        round: u32,
        choices: [TwoPartyChoice; 2],
    },

    /// Terminal.
    Ended { winners: Vec<PlayerId> },
}

impl Phase {
    /// Name used in diagnostics and errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::AllianceRound { .. } => "allianceRound",
            Self::AllianceResolved { .. } => "allianceResolved",
            Self::LoyaltyRound { .. } => "loyaltyRound",
            Self::TwoPartyRound { .. } => "twoPartyRound",
            Self::TwoPartyStandoff { .. } => "twoPartyStandoff",
            Self::Ended { .. } => "ended",
        }
    }

    /// Fresh alliance round.
    #[must_use]
    pub fn alliance(attempt: u8) -> Self {
        Self::AllianceRound {
            attempt,
            choices: SmallVec::new(),
        }
    }

    /// Fresh loyalty round.
    #[must_use]
    pub fn loyalty(finalists: [PlayerId; 2], stage: LoyaltyStage) -> Self {
        Self::LoyaltyRound {
            finalists,
            stage,
            choices: SmallVec::new(),
        }
    }

    /// Fresh two-party round.
    #[must_use]
    pub fn two_party(round: u32) -> Self {
        Self::TwoPartyRound {
            round,
            choices: SmallVec::new(),
        }
    }
}

/// Who was eliminated when, kept for the fallback and return rules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lineage {
    /// 4p: the pre-game random elimination.
    pub eliminated_random_first_round: Option<PlayerId>,

    /// 4p/5p: every player out before the first loyalty round.
    pub eliminated_initial: SmallVec<[PlayerId; 3]>,

    /// Loser of the most recent alliance round.
    pub eliminated_alliance_round: Option<PlayerId>,

    /// 3p: the alliance-round loser.
    pub eliminated_first_round: Option<PlayerId>,
}

/// Complete match state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Setup order; `players[i].id == i + 1`.
    pub players: Vec<Player>,
    pub settings: Settings,
    pub phase: Phase,
    pub round: u8,
    pub lineage: Lineage,
    /// Prize pool. Fixed at the total buy-ins in multi-party mode.
    pub pot: u64,
    /// Stake each player has put into the pot.
    pub contributions: PlayerMap<u64>,
    pub log: GameLog,
}

impl GameSnapshot {
    /// Look up a player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.position()).filter(|p| p.id == id)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.position()).filter(|p| p.id == id)
    }

    /// Look up a player or fail validation.
    pub fn require_player(&self, id: PlayerId) -> std::result::Result<&Player, ValidationError> {
        self.player(id).ok_or(ValidationError::UnknownPlayer(id))
    }

    /// Non-eliminated players in setup order.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }

    /// Ids of the non-eliminated players in setup order.
    #[must_use]
    pub fn active_ids(&self) -> Vec<PlayerId> {
        self.active_players().map(|p| p.id).collect()
    }

    /// Setup position of a player.
    #[must_use]
    pub fn position_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.settings.mode
    }

    #[must_use]
    pub fn participant_count(&self) -> u8 {
        self.settings.participant_count
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended { .. })
    }

    /// Winners; empty until the match ends.
    #[must_use]
    pub fn winners(&self) -> &[PlayerId] {
        match &self.phase {
            Phase::Ended { winners } => winners.as_slice(),
            _ => &[],
        }
    }

    /// The two finalists, while an alliance reveal or loyalty round is current.
    #[must_use]
    pub fn finalists(&self) -> Option<[PlayerId; 2]> {
        match &self.phase {
            Phase::AllianceResolved { finalists, .. } | Phase::LoyaltyRound { finalists, .. } => {
                Some(*finalists)
            }
            _ => None,
        }
    }

    /// Current alliance attempt, during an alliance round.
    #[must_use]
    pub fn alliance_attempt(&self) -> Option<u8> {
        match &self.phase {
            Phase::AllianceRound { attempt, .. } => Some(*attempt),
            _ => None,
        }
    }

    /// Alliance choices stored for the current attempt.
    #[must_use]
    pub fn alliance_choices(&self) -> &[AllianceChoice] {
        match &self.phase {
            Phase::AllianceRound { choices, .. } => choices.as_slice(),
            _ => &[],
        }
    }

    /// Current loyalty stage, during a loyalty round.
    #[must_use]
    pub fn loyalty_stage(&self) -> Option<LoyaltyStage> {
        match &self.phase {
            Phase::LoyaltyRound { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Loyalty choices stored so far.
    #[must_use]
    pub fn loyalty_choices(&self) -> &[LoyaltyChoice] {
        match &self.phase {
            Phase::LoyaltyRound { choices, .. } => choices.as_slice(),
            _ => &[],
        }
    }

    /// Current two-party round number.
    #[must_use]
    pub fn two_party_round(&self) -> Option<u32> {
        match &self.phase {
            Phase::TwoPartyRound { round, .. } | Phase::TwoPartyStandoff { round, .. } => Some(*round),
            _ => None,
        }
    }

    /// Two-party choices stored for the current round.
    #[must_use]
    pub fn two_party_choices(&self) -> &[TwoPartyChoice] {
        match &self.phase {
            Phase::TwoPartyRound { choices, .. } => choices.as_slice(),
            Phase::TwoPartyStandoff { choices, .. } => choices.as_slice(),
            _ => &[],
        }
    }

    /// Both two-party players in setup order.
    pub(crate) fn two_party_players(&self) -> Result<[PlayerId; 2]> {
        match self.players.as_slice() {
            [a, b] => Ok([a.id, b.id]),
            other => Err(EngineError::inconsistent(format!(
                "two-party match has {} players",
                other.len()
            ))),
        }
    }

    /// Serialize to JSON for checkpointing.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a checkpoint written by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
