//! The rule engine facade.
//!
//! `TrustEngine` owns the injected [`RandomSource`] and [`Clock`] and exposes
//! every operation as `(&GameSnapshot, decision) -> GameSnapshot`. The engine
//! keeps no match state of its own: the caller holds the snapshot and
//! replaces it with whatever each call returns.
//!
//! ```
//! use trust_engine::core::{AllianceTarget, FixedClock, PlayerId, ScriptedRandom, Settings};
//! use trust_engine::rules::{Advance, TrustEngine};
//!
//! let mut engine = TrustEngine::with_sources(ScriptedRandom::default(), FixedClock(0));
//! let snap = engine
//!     .initialize_match(&Settings::multi_party(3), &["A", "B", "C"])
//!     .unwrap();
//! let Advance::Advanced(snap) = engine.advance_phase(&snap).unwrap() else {
//!     panic!("init always advances");
//! };
//!
//! let p = PlayerId::new;
//! let snap = engine.submit_alliance_choice(&snap, p(1), AllianceTarget::Player(p(2))).unwrap();
//! let snap = engine.submit_alliance_choice(&snap, p(2), AllianceTarget::Player(p(1))).unwrap();
//! let snap = engine.submit_alliance_choice(&snap, p(3), AllianceTarget::Player(p(1))).unwrap();
//! assert_eq!(snap.finalists(), Some([p(1), p(2)]));
//! ```

use tracing::warn;

use crate::core::{
    AllianceTarget, Choice, Clock, GameRng, GameSnapshot, Mode, PlayerId, RandomSource, Result,
    Settings, StandoffDecision, SystemClock,
};

use super::phase::{self, Advance, PendingInput};
use super::settlement::{self, Settlement};
use super::{alliance, loyalty, setup, two_party};

/// Rule engine over a random source and a clock.
#[derive(Clone, Debug)]
pub struct TrustEngine<R: RandomSource = GameRng, C: Clock = SystemClock> {
    rng: R,
    clock: C,
}

impl TrustEngine {
    /// Seeded engine on the wall clock.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_sources(GameRng::new(seed), SystemClock)
    }

    /// Engine seeded from OS entropy, for real matches.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::with_sources(GameRng::from_entropy(), SystemClock)
    }
}

impl Default for TrustEngine {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: RandomSource, C: Clock> TrustEngine<R, C> {
    /// Engine over explicit sources.
    pub fn with_sources(rng: R, clock: C) -> Self {
        Self { rng, clock }
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Build a fresh match. The roster must have one name per participant.
    pub fn initialize_match<S: AsRef<str>>(
        &mut self,
        settings: &Settings,
        roster: &[S],
    ) -> Result<GameSnapshot> {
        warn_on_err(
            "initialize_match",
            setup::initialize_match(settings, roster, &mut self.rng, &self.clock),
        )
    }

    /// Record an alliance choice; resolves the attempt once all active
    /// players have chosen.
    pub fn submit_alliance_choice(
        &mut self,
        snapshot: &GameSnapshot,
        player: PlayerId,
        target: AllianceTarget,
    ) -> Result<GameSnapshot> {
        warn_on_err(
            "submit_alliance_choice",
            alliance::submit_alliance_choice(snapshot, player, target, &mut self.rng, &self.clock),
        )
    }

    /// Record a loyalty choice. In a two-party match this is a two-party
    /// choice and `prediction` is required when loyal; otherwise it is
    /// ignored.
    pub fn submit_loyalty_choice(
        &mut self,
        snapshot: &GameSnapshot,
        player: PlayerId,
        choice: Choice,
        prediction: Option<Choice>,
    ) -> Result<GameSnapshot> {
        match snapshot.mode() {
            Mode::TwoPartyIterated => self.submit_two_party_choice(snapshot, player, choice, prediction),
            Mode::MultiParty => warn_on_err(
                "submit_loyalty_choice",
                loyalty::submit_loyalty_choice(snapshot, player, choice),
            ),
        }
    }

    /// Record a two-party choice and prediction.
    pub fn submit_two_party_choice(
        &mut self,
        snapshot: &GameSnapshot,
        player: PlayerId,
        choice: Choice,
        prediction: Option<Choice>,
    ) -> Result<GameSnapshot> {
        warn_on_err(
            "submit_two_party_choice",
            two_party::submit_two_party_choice(snapshot, player, choice, prediction),
        )
    }

    /// Continue or split after a both-betray two-party round.
    pub fn submit_two_party_resolution(
        &mut self,
        snapshot: &GameSnapshot,
        decision: StandoffDecision,
    ) -> Result<GameSnapshot> {
        warn_on_err(
            "submit_two_party_resolution",
            two_party::submit_two_party_resolution(snapshot, decision, &self.clock),
        )
    }

    /// Run the transition the snapshot is ready for, or report what it is
    /// waiting on.
    pub fn advance_phase(&mut self, snapshot: &GameSnapshot) -> Result<Advance> {
        warn_on_err(
            "advance_phase",
            phase::advance_phase(snapshot, &mut self.rng, &self.clock),
        )
    }

    /// The decision the match is waiting for.
    #[must_use]
    pub fn pending_input(&self, snapshot: &GameSnapshot) -> Option<PendingInput> {
        phase::pending_input(snapshot)
    }

    /// Prize division for an ended match.
    #[must_use]
    pub fn settle(&self, snapshot: &GameSnapshot) -> Option<Settlement> {
        settlement::settle(snapshot)
    }
}

fn warn_on_err<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        warn!(operation, recoverable = err.is_recoverable(), error = %err, "operation failed");
    }
    result
}
