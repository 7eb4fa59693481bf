//! Deterministic stand-in for the physics engine.
//!
//! [`ScriptedSimulator`] resolves a shot geometrically instead of integrating motion:
//! the cue ball stops where it is (or at its placement), and the nearest object ball
//! within [`AIM_TOLERANCE`] degrees of the aim line is hit. Shots of at least
//! [`POT_MAGNITUDE`] pocket the ball they hit.

use std::sync::Arc;

use cueai_engine::{
    Ball, BallContact, BoardState, ContactObserver, Shot, SimulationError, Simulator,
    StepParams,
    geometry::{angle_difference, angle_towards},
};

pub(crate) const AIM_TOLERANCE: f64 = 1.0;
pub(crate) const POT_MAGNITUDE: f64 = 100.0;

#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedSimulator {
    board: Option<Arc<BoardState>>,
    cue: Option<Ball>,
    shot: Option<Shot>,
    reported: bool,
}

impl ScriptedSimulator {
    fn target(&self) -> Option<&Ball> {
        let board = self.board.as_ref()?;
        let cue = self.cue?;
        let shot = self.shot?;
        board
            .balls()
            .iter()
            .filter(|b| !b.pocketed)
            .filter(|b| {
                angle_difference(angle_towards(cue.position, b.position), shot.angle)
                    <= AIM_TOLERANCE
            })
            .min_by(|a, b| {
                cue.position
                    .distance(a.position)
                    .total_cmp(&cue.position.distance(b.position))
            })
    }
}

impl Simulator for ScriptedSimulator {
    fn load(&mut self, board: &Arc<BoardState>) {
        self.board = Some(Arc::clone(board));
        self.cue = None;
        self.shot = None;
        self.reported = false;
    }

    fn shoot(&mut self, shot: &Shot) -> Result<(), SimulationError> {
        let board = self.board.as_ref().ok_or(SimulationError::NoBoardLoaded)?;
        let mut cue = *board.cue_ball();
        if cue.pocketed {
            let position = shot
                .cue_ball_position
                .ok_or(SimulationError::MissingCueBallPlacement)?;
            cue = Ball::cue(position);
        }
        self.cue = Some(cue);
        self.shot = Some(*shot);
        Ok(())
    }

    fn step(
        &mut self,
        _params: &StepParams,
        observer: &mut dyn ContactObserver,
    ) -> Result<bool, SimulationError> {
        if self.reported {
            return Ok(false);
        }
        self.reported = true;
        let (Some(cue), Some(shot)) = (self.cue, self.shot) else {
            return Ok(false);
        };
        if let Some(target) = self.target().copied() {
            let cue_contact = BallContact {
                number: cue.number,
                position: cue.position,
            };
            let target_contact = BallContact {
                number: target.number,
                position: target.position,
            };
            observer.on_ball_ball_contact(cue_contact, target_contact);
            if shot.magnitude >= POT_MAGNITUDE {
                observer.on_ball_pocketed(target_contact);
            }
        }
        Ok(false)
    }

    fn current_board_state(&self) -> Result<BoardState, SimulationError> {
        let board = self.board.as_ref().ok_or(SimulationError::NoBoardLoaded)?;
        let cue = self.cue.ok_or(SimulationError::MissingCueBall)?;
        let shot = self.shot.ok_or(SimulationError::MissingCueBall)?;
        let target = self.target().map(|b| b.number);
        let potted = target.filter(|_| shot.magnitude >= POT_MAGNITUDE);
        let balls = board
            .balls()
            .iter()
            .map(|ball| {
                if Some(ball.number) == potted {
                    ball.pocketed()
                } else {
                    *ball
                }
            })
            .collect();
        Ok(BoardState::after_shot(
            Arc::clone(board),
            cue,
            balls,
            target,
        )?)
    }
}
