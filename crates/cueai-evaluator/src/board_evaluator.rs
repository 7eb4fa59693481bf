//! Board heuristic: how good a resting board is for one player.
//!
//! # Scoring
//!
//! A finished game scores `±win`. Any other board scores the sum of:
//!
//! 1. **Progress** - `pocketed · own^a - pocketed · opp^b`, where `own` and `opp` are the
//!    balls each side pocketed during the shot that produced the board. The exponents make
//!    multi-ball shots worth more than the sum of single pots, and the opponent's exponent
//!    is the larger one so gifting balls hurts more than pocketing helps.
//! 2. **Possession** - `±possession` depending on who shoots next.
//! 3. **Proximity** - for every remaining object ball, `distance_per_ball · min(1, 1/d)`
//!    where `d` is the distance to the nearest pocket. Own balls add, opponent balls
//!    subtract. The 8-ball only counts for a player who has cleared their group.
//! 4. **Scratch** - `±scratch` charged against whoever shot a foul.
//!
//! The score is always from the perspective player's point of view; negate it to read
//! it from the other side.

use cueai_engine::{Ball, BallGroup, BoardState, Player, TableGeometry};

use crate::weights::HeuristicWeights;

/// Scores resting boards with a fixed set of weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardEvaluator {
    weights: HeuristicWeights,
    table: TableGeometry,
}

impl BoardEvaluator {
    #[must_use]
    pub fn new(weights: HeuristicWeights, table: TableGeometry) -> Self {
        Self { weights, table }
    }

    #[must_use]
    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }

    /// Scores `board` as seen by `perspective`.
    ///
    /// # Arguments
    ///
    /// * `board` - Resting board, usually produced by simulating a candidate shot
    /// * `perspective` - Player whose goodness is measured
    ///
    /// # Returns
    ///
    /// `±win` for a finished game, otherwise an unbounded score where higher is better
    /// for `perspective`.
    #[must_use]
    pub fn score(&self, board: &BoardState, perspective: Player) -> f64 {
        let w = &self.weights;
        if let Some(winner) = board.outcome().winner() {
            return if winner == perspective { w.win } else { -w.win };
        }
        let opponent = perspective.opponent();

        let mut score = self.progress(board, perspective);

        score += if board.turn() == perspective {
            w.possession
        } else {
            -w.possession
        };

        for ball in board.balls().iter().filter(|b| !b.pocketed) {
            let owner = match ball.group() {
                BallGroup::Eight => {
                    if board.has_cleared_group(perspective) {
                        score += self.ball_proximity(ball);
                    }
                    if board.has_cleared_group(opponent) {
                        score -= self.ball_proximity(ball);
                    }
                    continue;
                }
                group => group.owner(),
            };
            if owner == Some(perspective) {
                score += self.ball_proximity(ball);
            } else {
                score -= self.ball_proximity(ball);
            }
        }

        if board.is_foul() {
            match board.shooter() {
                Some(shooter) if shooter == perspective => score -= w.scratch,
                Some(_) => score += w.scratch,
                None => {}
            }
        }

        score
    }

    fn progress(&self, board: &BoardState, perspective: Player) -> f64 {
        let Some(previous) = board.previous() else {
            return 0.0;
        };
        let w = &self.weights;
        let delta = |player: Player| {
            let now = board.pocketed_count(player);
            let before = previous.pocketed_count(player);
            count_to_f64(now.saturating_sub(before))
        };
        w.pocketed * delta(perspective).powf(w.own_pocket_exponent)
            - w.pocketed * delta(perspective.opponent()).powf(w.opponent_pocket_exponent)
    }

    /// Proximity-to-pocket contribution of one ball, scaled by `distance_per_ball`.
    #[must_use]
    pub fn ball_proximity(&self, ball: &Ball) -> f64 {
        self.weights.distance_per_ball
            * proximity_term(self.table.distance_to_nearest_pocket(ball.position))
    }
}

impl Default for BoardEvaluator {
    fn default() -> Self {
        Self::new(HeuristicWeights::default(), TableGeometry::STANDARD)
    }
}

#[expect(clippy::cast_precision_loss)]
fn count_to_f64(count: usize) -> f64 {
    count as f64
}

/// Reciprocal distance capped at `1.0`.
///
/// ```
/// use cueai_evaluator::board_evaluator::proximity_term;
///
/// assert_eq!(proximity_term(0.0), 1.0);
/// assert_eq!(proximity_term(0.5), 1.0);
/// assert_eq!(proximity_term(4.0), 0.25);
/// ```
#[must_use]
pub fn proximity_term(distance: f64) -> f64 {
    if distance <= 1.0 { 1.0 } else { 1.0 / distance }
}
