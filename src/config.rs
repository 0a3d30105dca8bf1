//! # Config Module
//!
//! Named constants governing circuit geometry, AI search depth and
//! concurrency tuning. Grouped here instead of scattered `const`s so that
//! gameplay balance can be read (and tuned) in one place.

use std::f64::consts::PI;

/// Maximum number of laps any circuit may declare.
pub const MAX_NUM_LAPS: u32 = 10;

/// Speed may increase by at most this much per turn.
pub const PLUS_SPEED: f64 = 1.0;
/// Speed may decrease by at most this much per turn.
pub const MINUS_SPEED: f64 = 1.0;
/// Maximum yaw change allowed per turn, with a one-degree buffer so that
/// floating point search boxes do not clip otherwise-legal moves.
pub const TURN_ANGLE: f64 = PI / 4.0 + 0.0175;

/// Offset applied when cutting the road ring at the starting line, as a
/// fraction of one grid cell. Must stay strictly below `1.0 / 3.0`.
pub const CUT_OFFSET_FACTOR: f64 = 0.1;
/// Extra path length added to compensate for offsetting the finish point
/// away from the starting line.
pub const CUT_EXTRA_LENGTH: f64 = CUT_OFFSET_FACTOR * 3.0;

/// FixedDepthPlayer minimax depth. A depth of 2 expands moves 3 times:
/// direct moves, one ply of lookahead, two plies of lookahead.
pub const FIXED_DEPTH_MAX_DEPTH: u32 = 2;

/// MonteCarloPlayer rollout depth per simulated game.
pub const MONTECARLO_MAX_DEPTH: u32 = 6;
/// Random rollouts performed by each worker thread.
pub const MONTECARLO_ROLLOUTS_PER_THREAD: u32 = 300;
/// Worker threads spawned per move decision.
pub const MONTECARLO_NUM_THREADS: usize = 8;

/// Hybrid-A* yaw quantization: one bucket per 15 degrees.
pub const ASTAR_YAW_RESOLUTION: f64 = 12.0 / PI;
/// Hybrid-A* speed quantization: one bucket per 0.5 units.
pub const ASTAR_SPEED_RESOLUTION: f64 = 1.0 / 0.5;
/// Scales the admissible-but-loose heuristic down so the search explores
/// fewer states at the cost of solution optimality.
pub const ASTAR_FACTOR: f64 = 1.5;
/// Converts a remaining-distance heuristic into an equivalent round count.
pub const ASTAR_LENGTH_TO_LAP_FACTOR: f64 = 0.25 * ASTAR_FACTOR;
/// Search depth at which a popped node is accepted as the answer even if
/// still running.
pub const ASTAR_MAX_DEPTH: u32 = 8;
/// Below this fractional-round threshold a finished state's heuristic is
/// treated as exactly on the line rather than slightly past it.
pub const ASTAR_EPSILON: f64 = 1e-3;

/// Score assigned to a crashed terminal state before the crash penalty.
pub const CRASH_SCORE: f64 = 1e6;
/// Score assigned to a finished terminal state before subtracting rounds.
pub const MINIMUM_SCORE: f64 = -1e6;

/// How long a human player may sit idle before being force-stopped, in
/// seconds.
pub const HUMAN_TURN_TIMEOUT_SECS: u64 = 90;
/// Poll interval while waiting for a human move, in seconds. Keeping this
/// short lets the timeout be enforced without a dedicated timer thread.
pub const HUMAN_POLL_INTERVAL_SECS: u64 = 2;

/// Default circuit loaded when no name is given.
pub const DEFAULT_CIRCUIT_NAME: &str = "Patatoid";
