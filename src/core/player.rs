//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Stable player identifier. Ids are assigned `1..=N` in setup order when a
//! match is initialized and are never reused or renumbered.
//!
//! ## Player
//!
//! One roster entry: the name plus the three stake flags the rules engine
//! folds outcomes into.
//!
//! ## PlayerMap
//!
//! Per-player data storage backed by `Vec` for O(1) access by `PlayerId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Stable player identifier (1-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Id of the player at a 0-based setup position.
    #[must_use]
    pub const fn from_position(position: usize) -> Self {
        Self(position as u8 + 1)
    }

    /// 0-based setup position of this player.
    #[must_use]
    pub const fn position(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }

    /// Iterate over all player IDs for a match with `player_count` players.
    ///
    /// ```
    /// use trust_engine::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(3).collect();
    /// assert_eq!(players, vec![PlayerId::new(1), PlayerId::new(2), PlayerId::new(3)]);
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count).map(PlayerId::from_position)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// A roster entry.
///
/// `lost_primary` and `lost_secondary` only ever go from `false` to `true`.
/// `eliminated` may flip back to `false` when a rule returns a player to
/// play; the lost flags survive the return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub eliminated: bool,
    pub lost_primary: bool,
    pub lost_secondary: bool,
}

impl Player {
    /// Create a player with all flags cleared.
    ///
    /// A blank name falls back to `Player <id>`.
    pub fn new(id: PlayerId, name: &str) -> Self {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            id.to_string()
        } else {
            trimmed.to_string()
        };

        Self {
            id,
            name,
            eliminated: false,
            lost_primary: false,
            lost_secondary: false,
        }
    }

    /// Not eliminated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.eliminated
    }
}

/// Per-player data storage with O(1) access.
///
/// Backed by a `Vec<T>` with one entry per player, in setup order.
///
/// ## Example
///
/// ```
/// use trust_engine::core::{PlayerId, PlayerMap};
///
/// let mut stakes: PlayerMap<u64> = PlayerMap::with_value(3, 2);
/// stakes[PlayerId::new(2)] += 1;
/// assert_eq!(stakes[PlayerId::new(2)], 3);
/// assert_eq!(stakes.values().sum::<u64>(), 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        let data = PlayerId::all(player_count).map(factory).collect();
        Self { data }
    }

    /// Create a new PlayerMap with all entries set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Get the number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.position())
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.data.get_mut(player.position())
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId::from_position(i), v))
    }

    /// Iterate over the values in setup order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.position()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.position()]
    }
}
