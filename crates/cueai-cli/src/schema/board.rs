use cueai_engine::{Ball, BoardError, BoardState, Player};
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Board description read by `choose-shot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardFile {
    pub turn: Player,
    #[serde(default)]
    pub shot_index: u32,
    pub cue_ball: CueBallEntry,
    pub balls: Vec<BallEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CueBallEntry {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub pocketed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallEntry {
    pub number: u8,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub pocketed: bool,
}

impl BoardFile {
    pub(crate) fn to_board_state(&self) -> Result<BoardState, BoardError> {
        let cue = self.cue_ball;
        let mut cue_ball = Ball::cue(DVec2::new(cue.x, cue.y));
        cue_ball.pocketed = cue.pocketed;
        let balls = self
            .balls
            .iter()
            .map(|entry| {
                let mut ball = Ball::new(entry.number, DVec2::new(entry.x, entry.y));
                ball.pocketed = entry.pocketed;
                ball
            })
            .collect();
        BoardState::new(cue_ball, balls, self.turn)
            .and_then(|board| board.with_shot_index(self.shot_index))
    }
}
