//! Process-wide cache of built analyzers, keyed by circuit name.
//!
//! Building an [`Analyzer`] triangulates the circuit and walks every
//! reachable lattice point, which is too expensive to repeat on every move
//! request. Look the circuit up under a read lock first, and only pay the
//! build cost (under a write lock) on a miss.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;

use crate::circuit::{patatoid, Circuit, CircuitData};
use crate::{log_additional, log_main};

use super::triangulate::{Analyzer, AnalyzerError};

lazy_static! {
    static ref ANALYZERS: RwLock<HashMap<String, Arc<Analyzer>>> = RwLock::new(HashMap::new());
}

/// Errors raised while resolving a named circuit to an [`Analyzer`].
#[derive(Debug)]
pub enum RegistryError {
    /// No built-in or previously registered circuit has this name.
    UnknownCircuit(String),
    Analyzer(AnalyzerError),
    Circuit(crate::circuit::CircuitError),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::UnknownCircuit(name) => write!(f, "unknown circuit {:?}", name),
            RegistryError::Analyzer(e) => write!(f, "{}", e),
            RegistryError::Circuit(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<AnalyzerError> for RegistryError {
    fn from(e: AnalyzerError) -> Self {
        RegistryError::Analyzer(e)
    }
}

impl From<crate::circuit::CircuitError> for RegistryError {
    fn from(e: crate::circuit::CircuitError) -> Self {
        RegistryError::Circuit(e)
    }
}

/// Returns the cached analyzer for `name`, building and inserting it on a
/// cache miss. `None` resolves to the built-in Patatoid circuit.
pub fn get_analyzer(name: Option<&str>) -> Result<Arc<Analyzer>, RegistryError> {
    let key = name.unwrap_or(crate::config::DEFAULT_CIRCUIT_NAME).to_string();

    if let Some(analyzer) = ANALYZERS.read().unwrap().get(&key) {
        log_additional!(crate::verbose::EVENT_ANALYZER_CACHE, "cache hit", circuit = key.as_str());
        return Ok(Arc::clone(analyzer));
    }

    let mut analyzers = ANALYZERS.write().unwrap();
    // Another writer may have built it while we waited for the lock.
    if let Some(analyzer) = analyzers.get(&key) {
        return Ok(Arc::clone(analyzer));
    }

    log_main!(crate::verbose::EVENT_ANALYZER_CACHE, "cache miss, building analyzer", circuit = key.as_str());
    let data = circuit_data_for(&key)?;
    let circuit = Circuit::build(&data)?;
    let analyzer = Arc::new(Analyzer::build(circuit)?);
    analyzers.insert(key.clone(), Arc::clone(&analyzer));
    Ok(analyzer)
}

/// Registers a circuit loaded from a `.ckt` file under its own name,
/// building its analyzer eagerly. Returns the existing analyzer if one was
/// already cached under that name.
pub fn register_circuit(data: CircuitData) -> Result<Arc<Analyzer>, RegistryError> {
    let key = data.name.clone();
    if let Some(analyzer) = ANALYZERS.read().unwrap().get(&key) {
        return Ok(Arc::clone(analyzer));
    }
    let mut analyzers = ANALYZERS.write().unwrap();
    if let Some(analyzer) = analyzers.get(&key) {
        return Ok(Arc::clone(analyzer));
    }
    let circuit = Circuit::build(&data)?;
    let analyzer = Arc::new(Analyzer::build(circuit)?);
    analyzers.insert(key, Arc::clone(&analyzer));
    Ok(analyzer)
}

fn circuit_data_for(name: &str) -> Result<CircuitData, RegistryError> {
    if name == crate::config::DEFAULT_CIRCUIT_NAME {
        Ok(patatoid())
    } else {
        Err(RegistryError::UnknownCircuit(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_circuit_resolves_and_caches() {
        let a = get_analyzer(None).unwrap();
        let b = get_analyzer(Some(crate::config::DEFAULT_CIRCUIT_NAME)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unknown_circuit_is_an_error() {
        assert!(matches!(get_analyzer(Some("does-not-exist")), Err(RegistryError::UnknownCircuit(_))));
    }
}
