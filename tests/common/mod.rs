//! Shared match harness for integration tests.
//!
//! `Table` drives a match the way a display layer would: it holds the
//! snapshot, submits decisions, and advances phases. Randomness is scripted
//! and the clock is fixed, so every match is reproducible.

#![allow(dead_code)]

use trust_engine::core::{
    AllianceTarget, Choice, FixedClock, GameSnapshot, Player, PlayerId, ScriptedRandom, Settings,
    StandoffDecision,
};
use trust_engine::log::LogEvent;
use trust_engine::rules::{Advance, TrustEngine};

pub const NOW: u64 = 1_700_000_000_000;

pub fn id(n: u8) -> PlayerId {
    PlayerId::new(n)
}

pub struct Table {
    pub engine: TrustEngine<ScriptedRandom, FixedClock>,
    pub snap: GameSnapshot,
}

impl Table {
    /// Initialize with scripted picks and advance past `init`.
    pub fn start(settings: Settings, picks: &[usize]) -> Self {
        let mut engine =
            TrustEngine::with_sources(ScriptedRandom::new(picks.iter().copied()), FixedClock(NOW));
        let names: Vec<String> = (1..=settings.participant_count)
            .map(|i| format!("P{i}"))
            .collect();
        let snap = engine.initialize_match(&settings, &names).unwrap();
        let mut table = Self { engine, snap };
        table.advance();
        table
    }

    pub fn advance(&mut self) {
        match self.engine.advance_phase(&self.snap).unwrap() {
            Advance::Advanced(next) => self.snap = next,
            other => panic!("expected a transition from {}, got {other:?}", self.snap.phase.kind()),
        }
    }

    pub fn ally(&mut self, player: u8, target: u8) {
        self.snap = self
            .engine
            .submit_alliance_choice(&self.snap, id(player), AllianceTarget::Player(id(target)))
            .unwrap();
    }

    pub fn ally_random(&mut self, player: u8) {
        self.snap = self
            .engine
            .submit_alliance_choice(&self.snap, id(player), AllianceTarget::Random)
            .unwrap();
    }

    /// Each `(player, target)` in order.
    pub fn alliances(&mut self, pairs: &[(u8, u8)]) {
        for &(player, target) in pairs {
            self.ally(player, target);
        }
    }

    pub fn loyalty(&mut self, player: u8, choice: Choice) {
        self.snap = self
            .engine
            .submit_loyalty_choice(&self.snap, id(player), choice, None)
            .unwrap();
    }

    /// Both finalists choose, then the round is revealed.
    pub fn loyalty_round(&mut self, first: Choice, second: Choice) {
        let [a, b] = self.snap.finalists().expect("loyalty round has finalists");
        self.loyalty(a.0, first);
        self.loyalty(b.0, second);
        self.advance();
    }

    pub fn two_party(&mut self, player: u8, choice: Choice, prediction: Option<Choice>) {
        self.snap = self
            .engine
            .submit_two_party_choice(&self.snap, id(player), choice, prediction)
            .unwrap();
    }

    pub fn standoff(&mut self, decision: StandoffDecision) {
        self.snap = self
            .engine
            .submit_two_party_resolution(&self.snap, decision)
            .unwrap();
    }

    pub fn player(&self, n: u8) -> &Player {
        self.snap.player(id(n)).expect("player exists")
    }

    pub fn winners(&self) -> Vec<u8> {
        self.snap.winners().iter().map(|w| w.0).collect()
    }

    pub fn last_event(&self) -> &LogEvent {
        &self.snap.log.last().expect("log has entries").event
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.snap.log.iter().map(|e| e.event.kind()).collect()
    }
}
