use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::BoardError;

use super::ball::{Ball, BallGroup, CUE_BALL, EIGHT_BALL, GROUP_SIZE, MAX_BALL_NUMBER, Player};

/// Whether the game is still running, and who won if not.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ongoing,
    Player1Win,
    Player2Win,
}

impl Outcome {
    #[must_use]
    pub const fn won_by(player: Player) -> Self {
        match player {
            Player::Player1 => Outcome::Player1Win,
            Player::Player2 => Outcome::Player2Win,
        }
    }

    #[must_use]
    pub const fn winner(self) -> Option<Player> {
        match self {
            Outcome::Ongoing => None,
            Outcome::Player1Win => Some(Player::Player1),
            Outcome::Player2Win => Some(Player::Player2),
        }
    }
}

/// An immutable snapshot of the table between shots.
///
/// Every derived field (pocketed counts, whose turn it is, foul flag, outcome) is
/// computed once at construction from the ball set and the previous board, and never
/// changes afterwards. Simulating a shot always produces a new board linked back to the
/// board it was shot from.
///
/// Balls missing from the object ball list are treated as already off the table when
/// deciding whether a player has cleared their group, so partial layouts work.
#[derive(Debug, Clone)]
pub struct BoardState {
    cue_ball: Ball,
    balls: Vec<Ball>,
    eight_index: usize,
    previous: Option<Arc<BoardState>>,
    turn: Player,
    shot_index: u32,
    first_contact: Option<u8>,
    solids_pocketed: usize,
    stripes_pocketed: usize,
    foul: bool,
    outcome: Outcome,
}

impl BoardState {
    /// Builds a board with no history, where `turn` is about to shoot.
    ///
    /// Object balls are stored ordered by number.
    pub fn new(cue_ball: Ball, balls: Vec<Ball>, turn: Player) -> Result<Self, BoardError> {
        let (balls, eight_index) = validate(&cue_ball, balls)?;
        if balls[eight_index].pocketed {
            return Err(BoardError::EightBallPocketedAtStart);
        }
        let (solids_pocketed, stripes_pocketed) = count_pocketed(&balls);
        Ok(Self {
            cue_ball,
            balls,
            eight_index,
            previous: None,
            turn,
            shot_index: 0,
            first_contact: None,
            solids_pocketed,
            stripes_pocketed,
            foul: false,
            outcome: Outcome::Ongoing,
        })
    }

    /// Sets how many shots were taken before this board, so rules that only apply to
    /// the break are skipped for a layout taken from the middle of a game.
    ///
    /// Only boards built with [`BoardState::new`] can be renumbered; a board produced by
    /// [`BoardState::after_shot`] keeps the index derived from its predecessor.
    pub fn with_shot_index(mut self, shot_index: u32) -> Result<Self, BoardError> {
        if self.previous.is_some() {
            return Err(BoardError::DerivedBoardRenumbered);
        }
        self.shot_index = shot_index;
        Ok(self)
    }

    /// Builds the board that results from shooting on `previous`.
    ///
    /// `first_contact` is the object ball the cue ball touched first during the shot.
    pub fn after_shot(
        previous: Arc<BoardState>,
        cue_ball: Ball,
        balls: Vec<Ball>,
        first_contact: Option<u8>,
    ) -> Result<Self, BoardError> {
        let shot_index = previous
            .shot_index
            .checked_add(1)
            .ok_or(BoardError::ShotIndexOverflow)?;
        let (balls, eight_index) = validate(&cue_ball, balls)?;
        let (solids_pocketed, stripes_pocketed) = count_pocketed(&balls);

        let mut this = Self {
            cue_ball,
            balls,
            eight_index,
            turn: previous.turn,
            shot_index,
            first_contact,
            solids_pocketed,
            stripes_pocketed,
            foul: false,
            outcome: Outcome::Ongoing,
            previous: None,
        };
        this.foul = this.compute_foul(&previous);
        this.turn = this.compute_turn(&previous);
        this.outcome = this.compute_outcome(&previous);
        this.previous = Some(previous);
        Ok(this)
    }

    fn compute_foul(&self, previous: &BoardState) -> bool {
        if self.cue_ball.pocketed {
            return true;
        }
        let Some(first) = self.first_contact else {
            return true;
        };
        if previous.shot_index == 0 {
            return false;
        }
        let shooter = previous.turn;
        match BallGroup::of(first) {
            BallGroup::Eight => !previous.has_cleared_group(shooter),
            group => group.owner() != Some(shooter),
        }
    }

    fn compute_turn(&self, previous: &BoardState) -> Player {
        let shooter = previous.turn;
        let keeps_table = if previous.shot_index == 0 {
            !self.cue_ball.pocketed
        } else {
            !self.foul && self.pocketed_count(shooter) > previous.pocketed_count(shooter)
        };
        if keeps_table {
            shooter
        } else {
            shooter.opponent()
        }
    }

    fn compute_outcome(&self, previous: &BoardState) -> Outcome {
        if !self.eight_ball().pocketed {
            return Outcome::Ongoing;
        }
        let shooter = previous.turn;
        if self.foul || !previous.has_cleared_group(shooter) {
            Outcome::won_by(shooter.opponent())
        } else {
            Outcome::won_by(shooter)
        }
    }

    #[must_use]
    pub fn cue_ball(&self) -> &Ball {
        &self.cue_ball
    }

    /// Object balls (everything but the cue ball), ordered by number.
    #[must_use]
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    #[must_use]
    pub fn ball(&self, number: u8) -> Option<&Ball> {
        if number == CUE_BALL {
            return Some(&self.cue_ball);
        }
        self.balls
            .binary_search_by_key(&number, |b| b.number)
            .ok()
            .map(|i| &self.balls[i])
    }

    #[must_use]
    pub fn eight_ball(&self) -> &Ball {
        &self.balls[self.eight_index]
    }

    /// Cue ball followed by every object ball.
    pub fn all_balls(&self) -> impl Iterator<Item = &Ball> + '_ {
        std::iter::once(&self.cue_ball).chain(&self.balls)
    }

    /// Every ball still on the table, the cue ball included.
    pub fn balls_on_table(&self) -> impl Iterator<Item = &Ball> + '_ {
        self.all_balls().filter(|b| !b.pocketed)
    }

    /// Unpocketed balls of `player`'s group.
    pub fn remaining_balls(&self, player: Player) -> impl Iterator<Item = &Ball> + '_ {
        self.balls.iter().filter(move |b| b.is_remaining_for(player))
    }

    /// The board this one was shot from.
    #[must_use]
    pub fn previous(&self) -> Option<&Arc<BoardState>> {
        self.previous.as_ref()
    }

    /// The player about to shoot.
    #[must_use]
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// The player whose shot produced this board.
    #[must_use]
    pub fn shooter(&self) -> Option<Player> {
        self.previous.as_ref().map(|p| p.turn)
    }

    /// Number of shots taken before this board.
    #[must_use]
    pub fn shot_index(&self) -> u32 {
        self.shot_index
    }

    /// Object ball the cue ball touched first during the shot that produced this board.
    #[must_use]
    pub fn first_contact(&self) -> Option<u8> {
        self.first_contact
    }

    /// Balls of `player`'s group pocketed so far, over every turn.
    #[must_use]
    pub fn pocketed_count(&self, player: Player) -> usize {
        match player {
            Player::Player1 => self.solids_pocketed,
            Player::Player2 => self.stripes_pocketed,
        }
    }

    #[must_use]
    pub fn has_cleared_group(&self, player: Player) -> bool {
        self.remaining_balls(player).next().is_none()
    }

    /// Returns `true` if the shot that produced this board was a foul (scratch).
    #[must_use]
    pub fn is_foul(&self) -> bool {
        self.foul
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.outcome.is_ongoing()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shot #{} ({:?} to shoot, {:?})", self.shot_index, self.turn, self.outcome)?;
        if let Some(first) = self.first_contact {
            writeln!(f, "First contact: {first}")?;
        }
        for ball in self.all_balls() {
            write!(
                f,
                "Ball {:2}: [x: {:.3}, y: {:.3}]",
                ball.number, ball.position.x, ball.position.y
            )?;
            if ball.pocketed {
                write!(f, " pocketed")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn validate(cue_ball: &Ball, mut balls: Vec<Ball>) -> Result<(Vec<Ball>, usize), BoardError> {
    if cue_ball.number != CUE_BALL {
        return Err(BoardError::InvalidCueBall {
            number: cue_ball.number,
        });
    }
    if let Some(ball) = balls
        .iter()
        .find(|b| b.number == CUE_BALL || b.number > MAX_BALL_NUMBER)
    {
        return Err(BoardError::InvalidBallNumber {
            number: ball.number,
        });
    }
    balls.sort_by_key(|b| b.number);
    if let Some(pair) = balls.windows(2).find(|w| w[0].number == w[1].number) {
        return Err(BoardError::DuplicateBall {
            number: pair[0].number,
        });
    }
    let eight_index = balls
        .binary_search_by_key(&EIGHT_BALL, |b| b.number)
        .map_err(|_| BoardError::MissingEightBall)?;
    Ok((balls, eight_index))
}

fn count_pocketed(balls: &[Ball]) -> (usize, usize) {
    let count = |player: Player| {
        balls
            .iter()
            .filter(|b| b.pocketed && b.group().owner() == Some(player))
            .count()
    };
    let solids = count(Player::Player1);
    let stripes = count(Player::Player2);
    debug_assert!(solids <= GROUP_SIZE && stripes <= GROUP_SIZE);
    (solids, stripes)
}
