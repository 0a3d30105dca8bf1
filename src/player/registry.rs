//! Computer player factory registry, keyed by strategy name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::analyzer::Analyzer;

use super::player::Player;
use super::strategies::{AStarPlayer, FixedDepthPlayer, MonteCarloPlayer};

type Factory = fn(String, Arc<Analyzer>) -> Arc<dyn Player>;

lazy_static! {
    static ref COMPUTER_PLAYERS: HashMap<&'static str, Factory> = {
        let mut m: HashMap<&'static str, Factory> = HashMap::new();
        m.insert("FixedDepthPlayer", (|name, analyzer| Arc::new(FixedDepthPlayer::new(name, analyzer)) as Arc<dyn Player>) as Factory);
        m.insert("MonteCarloPlayer", (|name, analyzer| Arc::new(MonteCarloPlayer::new(name, analyzer)) as Arc<dyn Player>) as Factory);
        m.insert("AStarPlayer", (|name, analyzer| Arc::new(AStarPlayer::new(name, analyzer)) as Arc<dyn Player>) as Factory);
        m
    };
}

/// Raised when a computer player kind has no registered strategy.
#[derive(Debug)]
pub struct UnknownPlayerKind(pub String);

impl fmt::Display for UnknownPlayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown computer player kind {:?}", self.0)
    }
}

impl std::error::Error for UnknownPlayerKind {}

/// Builds a named computer player by its registered strategy kind.
pub fn build_computer_player(kind: &str, name: impl Into<String>, analyzer: Arc<Analyzer>) -> Result<Arc<dyn Player>, UnknownPlayerKind> {
    COMPUTER_PLAYERS.get(kind).map(|factory| factory(name.into(), analyzer)).ok_or_else(|| UnknownPlayerKind(kind.to_string()))
}

/// The strategy kinds available for computer players.
pub fn registered_kinds() -> Vec<&'static str> {
    let mut kinds: Vec<&'static str> = COMPUTER_PLAYERS.keys().copied().collect();
    kinds.sort_unstable();
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::get_analyzer;

    #[test]
    fn all_three_strategies_are_registered() {
        assert_eq!(registered_kinds(), vec!["AStarPlayer", "FixedDepthPlayer", "MonteCarloPlayer"]);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let analyzer = get_analyzer(None).unwrap();
        assert!(build_computer_player("NoSuchPlayer", "x", analyzer).is_err());
    }
}
