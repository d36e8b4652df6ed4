//! Typed log events.
//!
//! Each variant is one kind of audit record. Serialized with a `type` tag
//! and camelCase fields, which is the shape the display layer renders.

use serde::{Deserialize, Serialize};

use crate::core::{AllianceChoice, LoyaltyChoice, PlayerId, TwoPartyChoice};

/// How a loyalty round was settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoyaltyOutcome {
    /// Both loyal: the finalists split the prize.
    BothLoyal,
    /// Exactly one betrayed and takes the prize.
    SingleBetrayal,
    /// 3p: both betrayed, the alliance-round loser wins.
    BothBetrayFirstRoundLoserWins,
    /// 4p stage 1: both betrayed, the two eliminated players return.
    BothBetrayFinalistsReturnedPlayers,
    /// 4p stage 2: both betrayed, random winner among the stage-1 finalists.
    BothBetrayRandomOriginalFinalist,
    /// 5p round 3: both betrayed, all three eliminated players return.
    BothBetrayAllEliminatedReturn,
    /// 5p round 4: both betrayed, the preceding alliance-round loser wins.
    BothBetrayAllianceLoserWins,
}

/// How a two-party round was settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TwoPartyOutcome {
    #[serde(rename = "bothLoyal_bothPredictedLoyal_correct")]
    BothLoyalBothCorrect,
    #[serde(rename = "bothLoyal_p1Correct_p2Wrong")]
    BothLoyalFirstCorrect,
    #[serde(rename = "bothLoyal_p2Correct_p1Wrong")]
    BothLoyalSecondCorrect,
    #[serde(rename = "bothLoyal_bothPredictedBetray_wrong")]
    BothLoyalBothWrong,
    #[serde(rename = "loyalVsBetray_betrayalSuccess")]
    BetrayalSucceeded,
    #[serde(rename = "loyalVsBetray_betrayalCancelled")]
    BetrayalCancelled,
    #[serde(rename = "bothBetray_continue")]
    BothBetrayContinue,
    #[serde(rename = "bothBetray_split")]
    BothBetraySplit,
}

impl TwoPartyOutcome {
    /// Whether this outcome ends the match.
    #[must_use]
    pub fn ends_match(self) -> bool {
        matches!(self, Self::BetrayalSucceeded | Self::BothBetraySplit)
    }
}

/// One audit record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LogEvent {
    /// 4p pre-game: one player eliminated at random.
    RandomElimination4p { eliminated_player_id: PlayerId },

    /// 5p pre-game: two distinct players eliminated at random.
    RandomElimination5p { eliminated_player_ids: Vec<PlayerId> },

    /// A mutual alliance formed.
    Alliance {
        attempt: u8,
        finalists: [PlayerId; 2],
        eliminated: Vec<PlayerId>,
        alliance_choices: Vec<AllianceChoice>,
    },

    /// Attempts exhausted; a random active player wins.
    NoAllianceRandomWinner {
        attempts: u8,
        winners: Vec<PlayerId>,
        alliance_choices: Vec<AllianceChoice>,
    },

    /// 4p attempts exhausted; the pre-game random elimination wins.
    NoAlliancePrizeToEliminated4p {
        attempts: u8,
        winners: Vec<PlayerId>,
        eliminated_random_first_round_id: PlayerId,
        alliance_choices: Vec<AllianceChoice>,
    },

    /// 5p round-2 attempts exhausted; both pre-game eliminations win.
    NoAlliancePrizeToEliminated5p {
        attempts: u8,
        winners: Vec<PlayerId>,
        eliminated_initial_ids: Vec<PlayerId>,
        alliance_choices: Vec<AllianceChoice>,
    },

    /// 3p loyalty round.
    Loyalty {
        finalists: [PlayerId; 2],
        choices: Vec<LoyaltyChoice>,
        winners: Vec<PlayerId>,
        outcome: LoyaltyOutcome,
    },

    /// 4p loyalty round (stage 1 or the returned-players stage 2).
    Loyalty4p {
        stage: u8,
        finalists: [PlayerId; 2],
        choices: Vec<LoyaltyChoice>,
        winners: Vec<PlayerId>,
        outcome: LoyaltyOutcome,
        returning_ids: Vec<PlayerId>,
        from_finalist_pool: Vec<PlayerId>,
    },

    /// 5p loyalty round (round 3 part 1, or round 4).
    Loyalty5p {
        stage: u8,
        finalists: [PlayerId; 2],
        choices: Vec<LoyaltyChoice>,
        winners: Vec<PlayerId>,
        outcome: LoyaltyOutcome,
        returning_ids: Vec<PlayerId>,
        eliminated_alliance_round_id: Option<PlayerId>,
    },

    /// One two-party round.
    TwoPartyRound {
        round: u32,
        player1_id: PlayerId,
        player2_id: PlayerId,
        choices: [TwoPartyChoice; 2],
        contributions: [u64; 2],
        pot_before: u64,
        pot_after: u64,
        outcome: TwoPartyOutcome,
    },
}

impl LogEvent {
    /// The serialized `type` tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RandomElimination4p { .. } => "randomElimination4p",
            Self::RandomElimination5p { .. } => "randomElimination5p",
            Self::Alliance { .. } => "alliance",
            Self::NoAllianceRandomWinner { .. } => "noAllianceRandomWinner",
            Self::NoAlliancePrizeToEliminated4p { .. } => "noAlliancePrizeToEliminated4p",
            Self::NoAlliancePrizeToEliminated5p { .. } => "noAlliancePrizeToEliminated5p",
            Self::Loyalty { .. } => "loyalty",
            Self::Loyalty4p { .. } => "loyalty4p",
            Self::Loyalty5p { .. } => "loyalty5p",
            Self::TwoPartyRound { .. } => "twoPartyRound",
        }
    }

    /// Winners named by this event, if it ends the match.
    #[must_use]
    pub fn winners(&self) -> &[PlayerId] {
        match self {
            Self::NoAllianceRandomWinner { winners, .. }
            | Self::NoAlliancePrizeToEliminated4p { winners, .. }
            | Self::NoAlliancePrizeToEliminated5p { winners, .. }
            | Self::Loyalty { winners, .. }
            | Self::Loyalty4p { winners, .. }
            | Self::Loyalty5p { winners, .. } => winners,
            _ => &[],
        }
    }
}
