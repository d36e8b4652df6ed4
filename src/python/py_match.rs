//! Match bindings for Python.

use pyo3::prelude::*;

use crate::core::{AllianceTarget, GameSnapshot, PlayerId, Settings, StandoffDecision};
use crate::rules::{Advance, TrustEngine};

use super::py_core::{engine_err, json_err, parse_choice, parse_mode, PyPlayerId};

/// A match in progress: the engine plus the current snapshot.
///
/// Every decision method replaces the snapshot on success and leaves it
/// untouched on failure.
#[pyclass(name = "Match")]
pub struct PyMatch {
    engine: TrustEngine,
    snapshot: GameSnapshot,
}

#[pymethods]
impl PyMatch {
    /// Start a match.
    ///
    /// # Arguments
    /// - names: one name per participant (2 for two-party, 3-5 otherwise)
    /// - mode: "multiParty" or "twoPartyIterated"
    /// - primary_buy_in / secondary_buy_in: stakes per player
    /// - seed: RNG seed; omit for an entropy-seeded match
    #[new]
    #[pyo3(signature = (
        names,
        mode = "multiParty",
        primary_buy_in = 1,
        secondary_buy_in = 1,
        seed = None
    ))]
    fn new(
        names: Vec<String>,
        mode: &str,
        primary_buy_in: u64,
        secondary_buy_in: u64,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let settings = Settings {
            participant_count: u8::try_from(names.len()).unwrap_or(u8::MAX),
            primary_buy_in,
            secondary_buy_in,
            mode: parse_mode(mode)?,
        };
        let mut engine = seed.map_or_else(TrustEngine::from_entropy, TrustEngine::new);
        let snapshot = engine
            .initialize_match(&settings, &names)
            .map_err(engine_err)?;
        Ok(Self { engine, snapshot })
    }

    /// Restore a checkpoint written by `snapshot_json`.
    #[staticmethod]
    #[pyo3(signature = (json, seed = None))]
    fn from_json(json: &str, seed: Option<u64>) -> PyResult<Self> {
        let snapshot = GameSnapshot::from_json(json).map_err(engine_err)?;
        let engine = seed.map_or_else(TrustEngine::from_entropy, TrustEngine::new);
        Ok(Self { engine, snapshot })
    }

    /// Run the next transition. Returns False when waiting on a decision
    /// or when the match is over.
    fn advance(&mut self) -> PyResult<bool> {
        match self.engine.advance_phase(&self.snapshot).map_err(engine_err)? {
            Advance::Advanced(next) => {
                self.snapshot = next;
                Ok(true)
            }
            Advance::Pending(_) | Advance::Finished => Ok(false),
        }
    }

    /// Name an alliance target; `None` lets the engine pick.
    #[pyo3(signature = (player, target = None))]
    fn choose_ally(&mut self, player: u8, target: Option<u8>) -> PyResult<()> {
        let target = target.map_or(AllianceTarget::Random, |t| {
            AllianceTarget::Player(PlayerId::new(t))
        });
        self.snapshot = self
            .engine
            .submit_alliance_choice(&self.snapshot, PlayerId::new(player), target)
            .map_err(engine_err)?;
        Ok(())
    }

    /// Choose "loyal" or "betray". Two-party loyal choices need a prediction.
    #[pyo3(signature = (player, choice, prediction = None))]
    fn choose_loyalty(&mut self, player: u8, choice: &str, prediction: Option<&str>) -> PyResult<()> {
        let choice = parse_choice(choice)?;
        let prediction = prediction.map(parse_choice).transpose()?;
        self.snapshot = self
            .engine
            .submit_loyalty_choice(&self.snapshot, PlayerId::new(player), choice, prediction)
            .map_err(engine_err)?;
        Ok(())
    }

    /// After a two-party both-betray round: split the pot, or play on.
    fn resolve_standoff(&mut self, split: bool) -> PyResult<()> {
        let decision = if split {
            StandoffDecision::Split
        } else {
            StandoffDecision::Continue
        };
        self.snapshot = self
            .engine
            .submit_two_party_resolution(&self.snapshot, decision)
            .map_err(engine_err)?;
        Ok(())
    }

    /// The pending decision as JSON, or None.
    fn pending(&self) -> PyResult<Option<String>> {
        self.engine
            .pending_input(&self.snapshot)
            .map(|p| serde_json::to_string(&p).map_err(json_err))
            .transpose()
    }

    /// Player who should hold the device.
    fn holder(&self) -> Option<PyPlayerId> {
        self.engine
            .pending_input(&self.snapshot)
            .and_then(|p| p.player())
            .map(PyPlayerId)
    }

    #[getter]
    fn phase(&self) -> &'static str {
        self.snapshot.phase.kind()
    }

    #[getter]
    fn round(&self) -> u8 {
        self.snapshot.round
    }

    #[getter]
    fn pot(&self) -> u64 {
        self.snapshot.pot
    }

    #[getter]
    fn winners(&self) -> Vec<u8> {
        self.snapshot.winners().iter().map(|w| w.0).collect()
    }

    #[getter]
    fn is_ended(&self) -> bool {
        self.snapshot.is_ended()
    }

    /// Full snapshot as JSON.
    fn snapshot_json(&self) -> PyResult<String> {
        self.snapshot.to_json().map_err(engine_err)
    }

    /// Log entries as a JSON array.
    fn log_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.snapshot.log).map_err(json_err)
    }

    /// Settlement as JSON once the match has ended.
    fn settlement_json(&self) -> PyResult<Option<String>> {
        self.engine
            .settle(&self.snapshot)
            .map(|s| serde_json::to_string(&s).map_err(json_err))
            .transpose()
    }

    fn __repr__(&self) -> String {
        format!(
            "Match(phase={}, round={}, players={})",
            self.snapshot.phase.kind(),
            self.snapshot.round,
            self.snapshot.players.len()
        )
    }
}
