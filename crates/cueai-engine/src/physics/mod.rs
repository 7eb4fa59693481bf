//! Forward simulation of a shot to a resting board.
//!
//! The AI never integrates ball motion itself. It drives a [`Simulator`] through
//! `load` / `shoot` / `simulate_until_still` / `current_board_state`, and observes the
//! shot through a [`ContactObserver`] that the simulator notifies on every begin-contact
//! event.

use std::sync::Arc;

use glam::DVec2;

use crate::{BoardState, Shot, SimulationError};

pub use self::table_simulator::*;

mod table_simulator;

/// Integration parameters for one simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    /// Seconds advanced per step.
    pub time_step: f64,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    /// Step budget for [`Simulator::simulate_until_still`].
    pub max_steps: u32,
    /// Consecutive still steps required before the table counts as resting.
    pub still_steps: u32,
}

impl StepParams {
    /// 60 Hz with 8 velocity and 3 position iterations, capped at 15 simulated seconds.
    pub const STANDARD: Self = Self {
        time_step: 1.0 / 60.0,
        velocity_iterations: 8,
        position_iterations: 3,
        max_steps: 15 * 60,
        still_steps: 3,
    };
}

impl Default for StepParams {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A ball involved in a contact event, as seen at the moment of contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallContact {
    pub number: u8,
    pub position: DVec2,
}

/// Receives contact telemetry while a shot is simulated.
///
/// All methods default to doing nothing, and `()` is the observer that ignores
/// everything.
pub trait ContactObserver {
    /// Two balls started touching.
    fn on_ball_ball_contact(&mut self, _first: BallContact, _second: BallContact) {}

    /// A ball started touching a rail.
    fn on_ball_wall_contact(&mut self, _ball: BallContact) {}

    /// A ball dropped into a pocket (or left the table bed) and was removed.
    fn on_ball_pocketed(&mut self, _ball: BallContact) {}
}

impl ContactObserver for () {}

/// How a call to [`Simulator::simulate_until_still`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleReport {
    pub steps: u32,
    /// `false` if the step budget ran out while balls were still moving.
    pub settled: bool,
}

/// The physics collaborator the AI drives.
///
/// Implementations must be deterministic: the same board and shot always produce the
/// same resting board. One instance is never shared between concurrently evaluated
/// candidates; parallel search clones one per worker.
pub trait Simulator {
    /// Replaces the simulated table with the balls of `board`.
    fn load(&mut self, board: &Arc<BoardState>);

    /// Strikes the cue ball, placing it first if it is off the table.
    fn shoot(&mut self, shot: &Shot) -> Result<(), SimulationError>;

    /// Advances one step, notifying `observer` of contacts.
    ///
    /// Returns `true` while any ball is still moving.
    fn step(
        &mut self,
        params: &StepParams,
        observer: &mut dyn ContactObserver,
    ) -> Result<bool, SimulationError>;

    /// The resting board derived from the loaded board, linked back to it.
    fn current_board_state(&self) -> Result<BoardState, SimulationError>;

    /// Steps until the table has been still for [`StepParams::still_steps`]
    /// consecutive steps, or until [`StepParams::max_steps`] is reached.
    ///
    /// Hitting the step budget is not an error: the state at cutoff is treated as
    /// resting.
    fn simulate_until_still(
        &mut self,
        params: &StepParams,
        observer: &mut dyn ContactObserver,
    ) -> Result<SettleReport, SimulationError> {
        let mut still = 0;
        for steps in 1..=params.max_steps {
            if self.step(params, observer)? {
                still = 0;
            } else {
                still += 1;
                if still >= params.still_steps {
                    return Ok(SettleReport {
                        steps,
                        settled: true,
                    });
                }
            }
        }
        tracing::warn!(
            max_steps = params.max_steps,
            "simulation cut off before the table came to rest"
        );
        Ok(SettleReport {
            steps: params.max_steps,
            settled: false,
        })
    }
}
