//! Match configuration.
//!
//! `Settings` is fixed once a match starts. The display layer builds one
//! with the builder methods (or deserializes it from JSON) and hands it to
//! the initializer, which validates it.

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Alliance attempts allowed before the no-alliance fallback fires.
pub const MAX_ALLIANCE_ATTEMPTS: u8 = 3;

/// Which rule set the match plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// 3 to 5 participants: alliances, then loyalty/betrayal.
    #[default]
    MultiParty,
    /// Exactly 2 participants: iterated trust rounds over a growing pot.
    TwoPartyIterated,
}

/// Match settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Number of players (2 for two-party, 3-5 for multi-party).
    pub participant_count: u8,

    /// Stake lost on early elimination.
    pub primary_buy_in: u64,

    /// Stake lost when punished in a betrayal outcome.
    pub secondary_buy_in: u64,

    pub mode: Mode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            participant_count: 3,
            primary_buy_in: 1,
            secondary_buy_in: 1,
            mode: Mode::MultiParty,
        }
    }
}

impl Settings {
    /// Multi-party match with `participant_count` players.
    #[must_use]
    pub fn multi_party(participant_count: u8) -> Self {
        Self {
            participant_count,
            ..Self::default()
        }
    }

    /// Two-party iterated match.
    #[must_use]
    pub fn two_party() -> Self {
        Self {
            participant_count: 2,
            mode: Mode::TwoPartyIterated,
            ..Self::default()
        }
    }

    /// Set both buy-ins.
    #[must_use]
    pub fn with_buy_ins(mut self, primary: u64, secondary: u64) -> Self {
        self.primary_buy_in = primary;
        self.secondary_buy_in = secondary;
        self
    }

    /// Combined stake each player puts in.
    #[must_use]
    pub fn stake_per_player(&self) -> u64 {
        self.primary_buy_in.saturating_add(self.secondary_buy_in)
    }

    /// Total of all buy-ins for the match.
    #[must_use]
    pub fn total_buy_ins(&self) -> u64 {
        self.stake_per_player()
            .saturating_mul(u64::from(self.participant_count))
    }

    /// Exact total of all buy-ins, or `None` if it overflows.
    #[must_use]
    pub fn checked_total_buy_ins(&self) -> Option<u64> {
        self.primary_buy_in
            .checked_add(self.secondary_buy_in)?
            .checked_mul(u64::from(self.participant_count))
    }

    /// Check the participant count against the mode, and that the pot
    /// can hold every stake.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let ok = match self.mode {
            Mode::MultiParty => (3..=5).contains(&self.participant_count),
            Mode::TwoPartyIterated => self.participant_count == 2,
        };
        if !ok {
            return Err(ValidationError::InvalidSettings {
                participant_count: self.participant_count,
                mode: self.mode,
            });
        }

        if self.checked_total_buy_ins().is_none() {
            return Err(ValidationError::StakeOverflow {
                participant_count: self.participant_count,
                primary: self.primary_buy_in,
                secondary: self.secondary_buy_in,
            });
        }
        Ok(())
    }
}
