//! Core type bindings for Python.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::core::{Choice, EngineError, Mode, PlayerId};

/// Python wrapper for PlayerId.
#[pyclass(name = "PlayerId")]
#[derive(Clone, Debug)]
pub struct PyPlayerId(pub PlayerId);

#[pymethods]
impl PyPlayerId {
    /// Create a player ID (1-based).
    #[new]
    fn new(id: u8) -> Self {
        Self(PlayerId::new(id))
    }

    /// Setup position (0-based).
    fn position(&self) -> usize {
        self.0.position()
    }

    /// Get the raw ID value.
    #[getter]
    fn id(&self) -> u8 {
        self.0 .0
    }

    fn __repr__(&self) -> String {
        format!("PlayerId({})", self.0 .0)
    }

    fn __eq__(&self, other: &Self) -> bool {
        self.0 == other.0
    }

    fn __hash__(&self) -> u64 {
        u64::from(self.0 .0)
    }
}

/// Validation failures become `ValueError`; anything else `RuntimeError`.
pub(crate) fn engine_err(err: EngineError) -> PyErr {
    if err.is_recoverable() {
        PyErr::new::<PyValueError, _>(err.to_string())
    } else {
        PyErr::new::<PyRuntimeError, _>(err.to_string())
    }
}

pub(crate) fn parse_choice(value: &str) -> PyResult<Choice> {
    match value {
        "loyal" => Ok(Choice::Loyal),
        "betray" => Ok(Choice::Betray),
        other => Err(PyErr::new::<PyValueError, _>(format!(
            "choice must be 'loyal' or 'betray', got {other:?}"
        ))),
    }
}

pub(crate) fn parse_mode(value: &str) -> PyResult<Mode> {
    match value {
        "multiParty" => Ok(Mode::MultiParty),
        "twoPartyIterated" => Ok(Mode::TwoPartyIterated),
        other => Err(PyErr::new::<PyValueError, _>(format!(
            "mode must be 'multiParty' or 'twoPartyIterated', got {other:?}"
        ))),
    }
}

pub(crate) fn json_err(err: serde_json::Error) -> PyErr {
    PyErr::new::<PyValueError, _>(err.to_string())
}
