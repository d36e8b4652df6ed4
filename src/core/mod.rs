//! Core engine types: players, settings, decisions, RNG, clock, snapshot, errors.
//!
//! This module holds the data the rules operate on. It knows nothing about
//! how rounds resolve; that lives in [`crate::rules`].

pub mod player;
pub mod rng;
pub mod clock;
pub mod config;
pub mod action;
pub mod error;
pub mod state;

pub use player::{Player, PlayerId, PlayerMap};
pub use rng::{pick, GameRng, GameRngState, RandomSource, ScriptedRandom};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Mode, Settings, MAX_ALLIANCE_ATTEMPTS};
pub use action::{
    AllianceChoice, AllianceTarget, Choice, LoyaltyChoice, StandoffDecision, TwoPartyChoice,
};
pub use error::{EngineError, Result, ValidationError};
pub use state::{GameSnapshot, Lineage, LoyaltyStage, Phase};
