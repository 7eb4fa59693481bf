//! Shot selection for 8-ball: decide what shot to take from a resting board.
//!
//! The AI is a generate-and-test search over candidate shots. Every decision runs
//! the same pipeline:
//!
//! ```text
//! GENERATE   shot_space      magnitudes × evenly spaced angles (+ cue-ball placement)
//!     ↓
//! FILTER     shot_verifier   drop shots the player cannot physically take
//!     ↓
//! SIMULATE   search          forward-simulate each survivor to a resting board
//!   + SCORE                  board_evaluator + complexity (+ easy-shot bonus)
//!     ↓
//! LOOKAHEAD  search          optional: rescore the top K by the opponent's best reply
//!     ↓
//! SELECT     strategy        highest-ranked shot
//! ```
//!
//! # Modules
//!
//! - [`shot_verifier`] - Reachability: can the stick and the player's body clear the
//!   table, and is the back-swing cone free of balls
//! - [`complexity`] - Per-shot tally of collisions and travel, turned into a penalty
//!   for messy shots
//! - [`board_evaluator`] - Heuristic value of a resting board for one player
//! - [`weights`] / [`config`] - Tunable weights and search parameters
//! - [`shot_space`] - Candidate generation, cue-ball re-spotting and easy-shot bias
//! - [`ranking`] - Bounded, deterministic top-K collection
//! - [`search`] - The parallel simulate-and-score stage and the look-ahead ply
//! - [`strategy`] - The closed set of AI variants behind [`PoolAi`]
//! - [`decision`] - Background worker that runs one decision at a time
//!
//! # Determinism
//!
//! A decision is a pure function of the board and the configuration: the candidate
//! order is fixed, the only randomness is a [`rand_pcg::Pcg32`] seeded from the config
//! and the board's shot index, and ranking ties resolve to the lower candidate index.
//! Running the search on more threads never changes the chosen shot.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cueai_engine::{Ball, BoardState, Player};
//! use cueai_evaluator::{PoolAi, StrategyKind, config::AiConfig};
//! use glam::DVec2;
//!
//! let board = Arc::new(BoardState::new(
//!     Ball::cue(DVec2::new(1.5, 1.8)),
//!     vec![Ball::new(1, DVec2::new(3.0, 1.8)), Ball::new(8, DVec2::new(5.0, 1.0))],
//!     Player::Player1,
//! )?);
//!
//! let ai = PoolAi::new(StrategyKind::Greedy, AiConfig::default())?;
//! let decision = ai.decide(&board)?;
//! println!("{} (score {:?})", decision.shot, decision.score);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use cueai_engine::SimulationError;

pub use self::{
    decision::DecisionWorker,
    strategy::{Decision, PoolAi, ShotSelector, StrategyKind},
};

pub mod board_evaluator;
pub mod complexity;
pub mod config;
pub mod decision;
pub mod ranking;
pub mod search;
pub mod shot_space;
pub mod shot_verifier;
pub mod strategy;
pub mod weights;

#[cfg(test)]
mod test_support;

/// Failures of a single decision.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SearchError {
    #[display("no shot magnitudes configured")]
    EmptyMagnitudes,
    #[display("shot magnitude {value} must be finite and positive")]
    InvalidMagnitude { value: f64 },
    #[display("angle count must be at least 1")]
    EmptyAngles,
    #[display("top-K size must be at least 1")]
    ZeroTopK,
    #[display("no legal cue-ball spot found in {attempts} attempts")]
    NoRespotPosition { attempts: u32 },
    #[display("search produced no candidates")]
    NoCandidates,
    #[display("failed to build search thread pool: {message}")]
    ThreadPool { message: String },
    #[display("simulation failed: {_0}")]
    Simulation(SimulationError),
}

impl From<SimulationError> for SearchError {
    fn from(err: SimulationError) -> Self {
        SearchError::Simulation(err)
    }
}

/// Failures of the background [`DecisionWorker`] handoff.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DecisionError {
    #[display("a decision is already outstanding")]
    Outstanding,
    #[display("no decision has been requested")]
    NotRequested,
    #[display("decision worker stopped")]
    WorkerStopped,
    #[display("decision failed: {_0}")]
    Search(SearchError),
}

impl From<SearchError> for DecisionError {
    fn from(err: SearchError) -> Self {
        DecisionError::Search(err)
    }
}
