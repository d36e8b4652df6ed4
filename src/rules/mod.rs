//! The rule set: initializer, resolvers, outcome recorder, phase controller.
//!
//! Each resolver is a function of `(snapshot, decision)` that returns a new
//! snapshot. [`TrustEngine`] bundles them behind one facade that owns the
//! random source and the clock.

pub mod setup;
pub mod alliance;
pub mod loyalty;
pub mod two_party;
pub mod recorder;
pub mod phase;
pub mod settlement;
pub mod engine;

pub use setup::initialize_match;
pub use alliance::{find_mutual_pair, submit_alliance_choice};
pub use loyalty::submit_loyalty_choice;
pub use two_party::{submit_two_party_choice, submit_two_party_resolution, ROUND_CONTRIBUTION};
pub use recorder::{Outcome, PlayerUpdate};
pub use phase::{active_position, advance_phase, pending_input, Advance, PendingInput};
pub use settlement::{settle, Settlement, SettlementEntry};
pub use engine::TrustEngine;
