//! Prize settlement for an ended match.
//!
//! The pool is the pot: every stake put in, never more. Winners share it
//! evenly; any indivisible remainder goes one unit at a time to winners in
//! setup order. Non-winners forfeit what they contributed.

use serde::{Deserialize, Serialize};

use crate::core::{GameSnapshot, PlayerId};

/// One player's line in the settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementEntry {
    pub player_id: PlayerId,
    pub contributed: u64,
    pub forfeited: u64,
    pub payout: u64,
}

impl SettlementEntry {
    /// Payout minus contribution.
    #[must_use]
    pub fn net(&self) -> i128 {
        i128::from(self.payout) - i128::from(self.contributed)
    }
}

/// How the pool is divided.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub pool: u64,
    /// Setup order.
    pub entries: Vec<SettlementEntry>,
}

impl Settlement {
    #[must_use]
    pub fn total_payout(&self) -> u64 {
        self.entries.iter().map(|e| e.payout).sum()
    }

    #[must_use]
    pub fn entry(&self, player: PlayerId) -> Option<&SettlementEntry> {
        self.entries.iter().find(|e| e.player_id == player)
    }
}

/// Settle an ended match. `None` while the match is still running.
#[must_use]
pub fn settle(snapshot: &GameSnapshot) -> Option<Settlement> {
    let winners = snapshot.winners();
    if winners.is_empty() {
        return None;
    }

    let pool = snapshot.pot;
    let count = winners.len() as u64;
    let share = pool / count;
    let mut remainder = pool % count;

    let entries = snapshot
        .players
        .iter()
        .map(|player| {
            let contributed = snapshot.contributions.get(player.id).copied().unwrap_or(0);
            if winners.contains(&player.id) {
                let bonus = u64::from(remainder > 0);
                remainder -= bonus;
                SettlementEntry {
                    player_id: player.id,
                    contributed,
                    forfeited: 0,
                    payout: share + bonus,
                }
            } else {
                SettlementEntry {
                    player_id: player.id,
                    contributed,
                    forfeited: contributed,
                    payout: 0,
                }
            }
        })
        .collect();

    Some(Settlement { pool, entries })
}
