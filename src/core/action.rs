//! Player decisions: what the display layer submits on each tap.
//!
//! - [`AllianceTarget`]: who a player wants to ally with, or `Random`.
//! - [`Choice`]: loyal or betray, with an optional [`Choice`] prediction in
//!   the two-party variant.
//! - [`StandoffDecision`]: the joint call after a two-party both-betray round.
//!
//! The `*Choice` records are what the snapshot stores once a decision is
//! accepted.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Loyalty or betrayal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Choice {
    Loyal,
    Betray,
}

impl Choice {
    #[must_use]
    pub fn is_betray(self) -> bool {
        self == Choice::Betray
    }
}

/// Alliance request as submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AllianceTarget {
    /// A specific active player.
    Player(PlayerId),
    /// Let the engine pick uniformly among the other active players.
    Random,
}

/// Stored alliance choice for one player in the current attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllianceChoice {
    pub player_id: PlayerId,
    pub target_id: PlayerId,
    /// The target was drawn by the engine.
    pub was_random: bool,
}

/// Stored loyalty decision of one finalist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyChoice {
    pub player_id: PlayerId,
    pub choice: Choice,
}

/// Stored two-party decision.
///
/// `prediction` is `Some` exactly when `choice` is `Loyal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoPartyChoice {
    pub player_id: PlayerId,
    pub choice: Choice,
    pub prediction: Option<Choice>,
}

impl TwoPartyChoice {
    /// Build a choice, dropping a prediction attached to a betrayal.
    #[must_use]
    pub fn new(player_id: PlayerId, choice: Choice, prediction: Option<Choice>) -> Self {
        let prediction = match choice {
            Choice::Loyal => prediction,
            Choice::Betray => None,
        };
        Self {
            player_id,
            choice,
            prediction,
        }
    }
}

/// Joint decision after both players betrayed in a two-party round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StandoffDecision {
    /// Play another round over the same pot.
    Continue,
    /// End the match and share the pot.
    Split,
}

/// Insert or replace the entry for the same player, keeping its position.
pub(crate) fn upsert<T, A>(choices: &mut smallvec::SmallVec<A>, entry: T, key: impl Fn(&T) -> PlayerId)
where
    A: smallvec::Array<Item = T>,
{
    let id = key(&entry);
    match choices.iter_mut().find(|c| key(c) == id) {
        Some(existing) => *existing = entry,
        None => choices.push(entry),
    }
}
