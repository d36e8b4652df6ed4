//! Python bindings for the trust rule engine.
//!
//! # Quick Start
//!
//! ```python
//! import trust_engine as te
//!
//! m = te.Match(["Ada", "Bo", "Cy"], seed=42)
//! m.advance()                      # init -> first alliance round
//! m.choose_ally(1, 2)
//! m.choose_ally(2, 1)
//! m.choose_ally(3)                 # random target
//! m.advance()                      # open the loyalty round
//! m.choose_loyalty(1, "loyal")
//! m.choose_loyalty(2, "betray")
//! m.advance()                      # reveal
//! print(m.winners, m.log_json())
//! ```

use pyo3::prelude::*;

mod py_core;
mod py_match;

pub use py_core::*;
pub use py_match::*;

/// trust_engine: rule engine for the Trust party game.
#[pymodule]
fn trust_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPlayerId>()?;
    m.add_class::<PyMatch>()?;
    Ok(())
}
