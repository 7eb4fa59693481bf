//! Complexity tracking: how messy a simulated shot was.
//!
//! A [`ComplexityTracker`] is created fresh for each simulated shot and handed to the
//! simulator as its [`ContactObserver`]. It counts collisions and accumulates how far each
//! ball travelled between contact events, then condenses that into a single
//! non-positive [`score`](ComplexityTracker::score) that rewards clean shots: few
//! collisions, few rail contacts, pocketed balls that went in without bouncing around,
//! and a table that was not scattered.
//!
//! Travel is measured as straight-line segments between recorded positions (shot start,
//! each contact, final rest), which undercounts curved paths but needs nothing from the
//! simulator beyond its contact events.

use cueai_engine::{
    BallContact, BoardState, CUE_BALL, ContactObserver, MAX_BALL_NUMBER, Shot,
};
use glam::DVec2;

use crate::weights::HeuristicWeights;

const SLOTS: usize = MAX_BALL_NUMBER as usize + 1;

/// Per-shot collision and travel accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexityTracker {
    last_position: [Option<DVec2>; SLOTS],
    travel: [f64; SLOTS],
    collisions: [u32; SLOTS],
    rail_collisions: [u32; SLOTS],
    total_collisions: u32,
    total_rail_collisions: u32,
    distance_before_contact: Option<f64>,
    /// Bitmask of balls pocketed during the shot.
    pocketed: u16,
}

impl ComplexityTracker {
    /// Starts tracking a shot about to be taken on `board`.
    ///
    /// When the cue ball is off the table its reference position is the shot's
    /// placement.
    #[must_use]
    pub fn new(board: &BoardState, shot: &Shot) -> Self {
        let mut last_position = [None; SLOTS];
        for ball in board.balls_on_table() {
            last_position[usize::from(ball.number)] = Some(ball.position);
        }
        if board.cue_ball().pocketed {
            last_position[usize::from(CUE_BALL)] = shot.cue_ball_position;
        }
        Self {
            last_position,
            travel: [0.0; SLOTS],
            collisions: [0; SLOTS],
            rail_collisions: [0; SLOTS],
            total_collisions: 0,
            total_rail_collisions: 0,
            distance_before_contact: None,
            pocketed: 0,
        }
    }

    fn record(&mut self, ball: BallContact) {
        let slot = usize::from(ball.number);
        if let Some(last) = self.last_position[slot] {
            self.travel[slot] += last.distance(ball.position);
        }
        self.last_position[slot] = Some(ball.position);
    }

    /// Adds the final leg from each ball's last recorded position to where it came to
    /// rest on `board`.
    pub fn finish(&mut self, board: &BoardState) {
        for ball in board.balls_on_table() {
            self.record(BallContact {
                number: ball.number,
                position: ball.position,
            });
        }
    }

    #[must_use]
    pub fn total_collisions(&self) -> u32 {
        self.total_collisions
    }

    #[must_use]
    pub fn rail_collisions(&self) -> u32 {
        self.total_rail_collisions
    }

    /// Distance the ball `number` travelled so far.
    #[must_use]
    pub fn travel(&self, number: u8) -> f64 {
        self.travel[usize::from(number)]
    }

    /// Cue-ball travel up to its first contact with another ball.
    #[must_use]
    pub fn distance_before_contact(&self) -> Option<f64> {
        self.distance_before_contact
    }

    fn pocketed_object_balls(&self) -> impl Iterator<Item = usize> + '_ {
        (1..SLOTS).filter(|slot| self.pocketed & (1 << slot) != 0)
    }

    /// Simplicity heuristic; `0.0` for a shot that touched nothing and went nowhere,
    /// more negative the messier the shot.
    ///
    /// Distances are measured in table diagonals so the weights do not depend on the
    /// unit of length.
    #[must_use]
    pub fn score(&self, weights: &HeuristicWeights, diagonal: f64) -> f64 {
        let rail_excess = (f64::from(self.total_rail_collisions) - weights.rail_allowance).max(0.0);
        let pocketed_collisions: u32 = self
            .pocketed_object_balls()
            .map(|slot| self.collisions[slot])
            .sum();
        let pocketed_rails: u32 = self
            .pocketed_object_balls()
            .map(|slot| self.rail_collisions[slot])
            .sum();
        let spread: f64 = self.travel.iter().map(|t| (t / diagonal).powi(2)).sum();
        let approach = self
            .distance_before_contact
            .unwrap_or(self.travel[usize::from(CUE_BALL)]);

        -weights.total_collisions * f64::from(self.total_collisions)
            - weights.rail_collisions * rail_excess.powf(weights.rail_exponent)
            - weights.pocketed_ball_collisions * f64::from(pocketed_collisions)
            - weights.pocketed_rail_collisions * f64::from(pocketed_rails)
            - weights.total_distance * spread
            - weights.distance_before_contact * approach / diagonal
    }
}

impl ContactObserver for ComplexityTracker {
    fn on_ball_ball_contact(&mut self, first: BallContact, second: BallContact) {
        self.total_collisions += 1;
        for ball in [first, second] {
            self.collisions[usize::from(ball.number)] += 1;
            self.record(ball);
        }
        if self.distance_before_contact.is_none()
            && (first.number == CUE_BALL || second.number == CUE_BALL)
        {
            self.distance_before_contact = Some(self.travel[usize::from(CUE_BALL)]);
        }
    }

    fn on_ball_wall_contact(&mut self, ball: BallContact) {
        self.total_collisions += 1;
        self.total_rail_collisions += 1;
        self.rail_collisions[usize::from(ball.number)] += 1;
        self.record(ball);
    }

    fn on_ball_pocketed(&mut self, ball: BallContact) {
        self.record(ball);
        let slot = usize::from(ball.number);
        self.pocketed |= 1 << slot;
        self.last_position[slot] = None;
    }
}

#[cfg(test)]
mod tests {
    use cueai_engine::{Ball, Player, TableGeometry};

    use super::*;

    fn board() -> BoardState {
        BoardState::new(
            Ball::cue(DVec2::new(1.0, 1.0)),
            vec![
                Ball::new(3, DVec2::new(2.0, 1.0)),
                Ball::new(8, DVec2::new(4.0, 2.0)),
                Ball::new(10, DVec2::new(5.0, 3.0)),
            ],
            Player::Player1,
        )
        .unwrap()
    }

    fn at(number: u8, x: f64, y: f64) -> BallContact {
        BallContact {
            number,
            position: DVec2::new(x, y),
        }
    }

    #[test]
    fn test_untouched_shot_scores_zero() {
        let board = board();
        let tracker = ComplexityTracker::new(&board, &Shot::new(0.0, 1.0));
        let weights = HeuristicWeights::default();
        assert_eq!(tracker.score(&weights, TableGeometry::STANDARD.diagonal()), 0.0);
    }

    #[test]
    fn test_score_strictly_decreases_with_collisions() {
        let board = board();
        let weights = HeuristicWeights::default();
        let diagonal = TableGeometry::STANDARD.diagonal();
        let mut tracker = ComplexityTracker::new(&board, &Shot::new(0.0, 1.0));
        let mut last = tracker.score(&weights, diagonal);
        for _ in 0..6 {
            // contacts at rest positions add no travel
            tracker.on_ball_ball_contact(at(3, 2.0, 1.0), at(10, 5.0, 3.0));
            let score = tracker.score(&weights, diagonal);
            assert!(score < last, "{score} should be below {last}");
            last = score;
        }
        assert_eq!(tracker.total_collisions(), 6);
    }

    #[test]
    fn test_rail_penalty_starts_after_allowance() {
        let board = board();
        let weights = HeuristicWeights {
            total_collisions: 0.0,
            ..HeuristicWeights::default()
        };
        let diagonal = TableGeometry::STANDARD.diagonal();
        let mut tracker = ComplexityTracker::new(&board, &Shot::new(0.0, 1.0));
        for _ in 0..3 {
            tracker.on_ball_wall_contact(at(10, 5.0, 3.0));
        }
        assert_eq!(tracker.score(&weights, diagonal), 0.0);
        tracker.on_ball_wall_contact(at(10, 5.0, 3.0));
        assert!((tracker.score(&weights, diagonal) + weights.rail_collisions).abs() < 1e-9);
    }

    #[test]
    fn test_travel_and_distance_before_contact() {
        let board = board();
        let mut tracker = ComplexityTracker::new(&board, &Shot::new(0.0, 1.0));
        tracker.on_ball_ball_contact(at(0, 1.8, 1.0), at(3, 2.0, 1.0));
        assert!((tracker.distance_before_contact().unwrap() - 0.8).abs() < 1e-12);

        tracker.on_ball_pocketed(at(3, 3.0, 1.0));
        tracker.on_ball_pocketed(at(0, 1.8, 1.5));
        assert!((tracker.travel(3) - 1.0).abs() < 1e-12);
        assert!((tracker.travel(0) - 1.3).abs() < 1e-12);
    }

    #[test]
    fn test_collisions_of_pocketed_balls_cost_extra() {
        let board = board();
        let weights = HeuristicWeights::default();
        let diagonal = TableGeometry::STANDARD.diagonal();

        let mut clean = ComplexityTracker::new(&board, &Shot::new(0.0, 1.0));
        clean.on_ball_ball_contact(at(0, 1.0, 1.0), at(10, 5.0, 3.0));
        let mut messy = clean.clone();
        clean.on_ball_pocketed(at(3, 2.0, 1.0));
        messy.on_ball_pocketed(at(10, 5.0, 3.0));

        let difference = clean.score(&weights, diagonal) - messy.score(&weights, diagonal);
        assert!((difference - weights.pocketed_ball_collisions).abs() < 1e-9);
    }

    #[test]
    fn test_off_table_cue_uses_placement() {
        let board = BoardState::new(
            Ball::cue(DVec2::ZERO).pocketed(),
            vec![Ball::new(8, DVec2::new(4.0, 2.0))],
            Player::Player2,
        )
        .unwrap();
        let shot = Shot::new(0.0, 1.0).with_cue_ball_position(DVec2::new(2.0, 2.0));
        let mut tracker = ComplexityTracker::new(&board, &shot);
        tracker.on_ball_ball_contact(at(0, 3.5, 2.0), at(8, 4.0, 2.0));
        assert!((tracker.distance_before_contact().unwrap() - 1.5).abs() < 1e-12);
    }
}
