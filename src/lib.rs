//! # trust-engine
//!
//! Rule engine for "Trust", a pass-the-device party game for 2 to 5 players.
//!
//! ## Design Principles
//!
//! 1. **Snapshots In, Snapshots Out**: every operation is a total function of
//!    `(snapshot, decision)` returning a new snapshot. The engine holds no
//!    match state of its own.
//!
//! 2. **Phase As a Type**: the current phase is a tagged variant carrying only
//!    the fields valid while it is current.
//!
//! 3. **Injected Nondeterminism**: every random choice goes through a
//!    [`RandomSource`](core::RandomSource) and every timestamp through a
//!    [`Clock`](core::Clock), so matches replay exactly under test.
//!
//! ## Architecture
//!
//! - **Resolvers**: alliance, loyalty, and two-party rounds each resolve in
//!   their own module, describing the result as an
//!   [`Outcome`](rules::Outcome) that the recorder commits in one step.
//!
//! - **Persistent Log**: the audit log is an `im::Vector`, so the snapshot
//!   clone every transition makes stays cheap.
//!
//! ## Modules
//!
//! - `core`: ids, players, settings, decisions, RNG, clock, snapshot, errors
//! - `log`: typed, timestamped, append-only event log
//! - `rules`: initializer, resolvers, phase controller, settlement, engine
//! - `python`: PyO3 bindings (feature `python`)

pub mod core;
pub mod log;
pub mod rules;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use crate::core::{
    AllianceChoice, AllianceTarget, Choice, Clock, EngineError, FixedClock, GameRng,
    GameRngState, GameSnapshot, Lineage, LoyaltyChoice, LoyaltyStage, Mode, Phase, Player,
    PlayerId, PlayerMap, RandomSource, Result, ScriptedRandom, Settings, StandoffDecision,
    SystemClock, TwoPartyChoice, ValidationError, MAX_ALLIANCE_ATTEMPTS,
};

pub use crate::log::{GameLog, LogEntry, LogEvent, LoyaltyOutcome, TwoPartyOutcome};

pub use crate::rules::{
    Advance, PendingInput, Settlement, SettlementEntry, TrustEngine,
};
