//! Billiards table model and physics collaborators for the shot-selection AI.
//!
//! This crate holds everything the AI reads but does not decide:
//!
//! - [`core`] - Table geometry, balls, shots and immutable [`BoardState`]s with
//!   their turn and outcome rules
//! - [`physics`] - The [`Simulator`] contract, contact-event observers and a
//!   deterministic built-in [`TableSimulator`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use cueai_engine::{Ball, BoardState, Player, Shot, Simulator, StepParams, TableSimulator};
//! use glam::DVec2;
//!
//! let board = Arc::new(
//!     BoardState::new(
//!         Ball::cue(DVec2::new(1.5, 1.8)),
//!         vec![Ball::new(1, DVec2::new(3.0, 1.8)), Ball::new(8, DVec2::new(5.0, 1.0))],
//!         Player::Player1,
//!     )
//!     .unwrap(),
//! );
//!
//! let mut simulator = TableSimulator::new();
//! simulator.load(&board);
//! simulator.shoot(&Shot::new(0.0, 40.0)).unwrap();
//! let report = simulator.simulate_until_still(&StepParams::STANDARD, &mut ()).unwrap();
//! assert!(report.settled);
//! let after = simulator.current_board_state().unwrap();
//! assert_eq!(after.shot_index(), 1);
//! ```

pub use self::{core::*, physics::*};

pub mod core;
pub mod physics;

/// Structural problems found while building a [`BoardState`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    #[display("cue ball must be numbered 0, got {number}")]
    InvalidCueBall { number: u8 },
    #[display("object ball number {number} is outside 1..=15")]
    InvalidBallNumber { number: u8 },
    #[display("ball {number} appears more than once")]
    DuplicateBall { number: u8 },
    #[display("board has no 8-ball")]
    MissingEightBall,
    #[display("initial board cannot start with the 8-ball pocketed")]
    EightBallPocketedAtStart,
    #[display("a board derived from a shot cannot be renumbered")]
    DerivedBoardRenumbered,
    #[display("shot index overflowed")]
    ShotIndexOverflow,
}

/// Failures reported by a [`Simulator`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SimulationError {
    #[display("no board loaded into the simulator")]
    NoBoardLoaded,
    #[display("cue ball is off the table and the shot carries no placement")]
    MissingCueBallPlacement,
    #[display("cue ball missing from the simulated table")]
    MissingCueBall,
    #[display("simulated board is invalid: {_0}")]
    InvalidBoard(BoardError),
}

impl From<BoardError> for SimulationError {
    fn from(err: BoardError) -> Self {
        SimulationError::InvalidBoard(err)
    }
}
