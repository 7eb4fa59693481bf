use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Number of the cue ball.
pub const CUE_BALL: u8 = 0;
/// Number of the 8-ball.
pub const EIGHT_BALL: u8 = 8;
/// Highest object ball number.
pub const MAX_BALL_NUMBER: u8 = 15;
/// Balls in each player's group.
pub const GROUP_SIZE: usize = 7;

/// One of the two players.
///
/// Player 1 owns the solids (1-7) and player 2 owns the stripes (9-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Player {
    Player1,
    Player2,
}

impl Player {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Player::Player1 => Player::Player2,
            Player::Player2 => Player::Player1,
        }
    }

    /// The group of object balls this player must pocket before the 8-ball.
    #[must_use]
    pub const fn group(self) -> BallGroup {
        match self {
            Player::Player1 => BallGroup::Solids,
            Player::Player2 => BallGroup::Stripes,
        }
    }
}

/// Which set a ball number belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum BallGroup {
    Cue,
    Solids,
    Eight,
    Stripes,
}

impl BallGroup {
    #[must_use]
    pub const fn of(number: u8) -> Self {
        match number {
            CUE_BALL => BallGroup::Cue,
            EIGHT_BALL => BallGroup::Eight,
            1..EIGHT_BALL => BallGroup::Solids,
            _ => BallGroup::Stripes,
        }
    }

    /// The player owning this group, if any.
    #[must_use]
    pub const fn owner(self) -> Option<Player> {
        match self {
            BallGroup::Solids => Some(Player::Player1),
            BallGroup::Stripes => Some(Player::Player2),
            BallGroup::Cue | BallGroup::Eight => None,
        }
    }
}

/// A single ball as seen at rest.
///
/// The ball number is its identity; a board holds at most one ball per number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub number: u8,
    pub position: DVec2,
    /// Orientation of the ball, carried along for display only.
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub pocketed: bool,
}

impl Ball {
    #[must_use]
    pub const fn new(number: u8, position: DVec2) -> Self {
        Self {
            number,
            position,
            angle: 0.0,
            pocketed: false,
        }
    }

    #[must_use]
    pub const fn cue(position: DVec2) -> Self {
        Self::new(CUE_BALL, position)
    }

    #[must_use]
    pub const fn pocketed(mut self) -> Self {
        self.pocketed = true;
        self
    }

    #[must_use]
    pub const fn group(&self) -> BallGroup {
        BallGroup::of(self.number)
    }

    #[must_use]
    pub const fn is_cue(&self) -> bool {
        self.number == CUE_BALL
    }

    /// Returns `true` if this is an unpocketed ball of `player`'s group.
    #[must_use]
    pub fn is_remaining_for(&self, player: Player) -> bool {
        !self.pocketed && self.group().owner() == Some(player)
    }
}
