//! Candidate generation: the angle × magnitude grid the search walks.
//!
//! Every candidate strikes the cue ball from the same position. When the cue ball is off
//! the table, a legal spot is drawn once per decision by rejection sampling and fixed into
//! every candidate as its placement.
//!
//! The biased variant adds a bonus to candidates aimed (almost) straight at one of the
//! mover's own balls with a clear path to it, favouring simple pots.

use arrayvec::ArrayVec;
use cueai_engine::{
    BoardState, GROUP_SIZE, Shot, TableGeometry,
    geometry::{angle_difference, angle_towards},
};
use glam::DVec2;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{SearchError, shot_verifier::ShotVerifier, weights::HeuristicWeights};

/// Keeps re-spotted cue balls this far inside the cushions.
const RESPOT_MARGIN: f64 = 0.5;

/// One shot to evaluate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Position in generation order, used to break score ties.
    pub index: usize,
    pub shot: Shot,
    /// Easy-shot bonus added to the candidate's score.
    pub bonus: f64,
}

/// The full candidate set for one board.
#[derive(Debug, Clone)]
pub struct ShotSpace {
    cue_position: DVec2,
    placement: Option<DVec2>,
    candidates: Vec<Candidate>,
}

impl ShotSpace {
    /// Builds the cross product of `magnitudes` and `angle_count` evenly spaced angles.
    ///
    /// # Arguments
    ///
    /// * `board` - Board the shot is taken on
    /// * `magnitudes` - Shot strengths
    /// * `angle_count` - Number of aim angles over the full circle
    /// * `rng` - Source for the cue-ball spot when it is off the table
    /// * `respot_attempts` - Rejection-sampling budget for that spot
    /// * `table` - Table dimensions
    pub fn generate<R>(
        board: &BoardState,
        magnitudes: &[f64],
        angle_count: u32,
        rng: &mut R,
        respot_attempts: u32,
        table: &TableGeometry,
    ) -> Result<Self, SearchError>
    where
        R: Rng + ?Sized,
    {
        if magnitudes.is_empty() {
            return Err(SearchError::EmptyMagnitudes);
        }
        if angle_count == 0 {
            return Err(SearchError::EmptyAngles);
        }

        let placement = if board.cue_ball().pocketed {
            Some(respot_cue_ball(board, table, rng, respot_attempts)?)
        } else {
            None
        };
        let cue_position = placement.unwrap_or(board.cue_ball().position);

        let candidates = magnitudes
            .iter()
            .flat_map(|&magnitude| angle_grid(angle_count).map(move |angle| (angle, magnitude)))
            .enumerate()
            .map(|(index, (angle, magnitude))| {
                let shot = Shot::new(angle, magnitude);
                Candidate {
                    index,
                    shot: match placement {
                        Some(position) => shot.with_cue_ball_position(position),
                        None => shot,
                    },
                    bonus: 0.0,
                }
            })
            .collect();

        Ok(Self {
            cue_position,
            placement,
            candidates,
        })
    }

    /// Adds easy-shot bonuses for the player to move on `board`.
    #[must_use]
    pub fn with_easy_shot_bias(
        mut self,
        board: &BoardState,
        verifier: &ShotVerifier,
        weights: &HeuristicWeights,
    ) -> Self {
        let easy = easy_shot_angles(board, self.cue_position, verifier);
        if easy.is_empty() {
            return self;
        }
        for candidate in &mut self.candidates {
            candidate.bonus = easy_shot_bonus(candidate.shot.angle, &easy, weights);
        }
        self
    }

    /// Where every candidate strikes the cue ball from.
    #[must_use]
    pub fn cue_position(&self) -> DVec2 {
        self.cue_position
    }

    /// The spot chosen for an off-table cue ball.
    #[must_use]
    pub fn placement(&self) -> Option<DVec2> {
        self.placement
    }

    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// `count` evenly spaced angles in `[0, 360)`, starting at 0.
///
/// ```
/// use cueai_evaluator::shot_space::angle_grid;
///
/// let angles: Vec<f64> = angle_grid(4).collect();
/// assert_eq!(angles, [0.0, 90.0, 180.0, 270.0]);
/// ```
pub fn angle_grid(count: u32) -> impl Iterator<Item = f64> + Clone {
    let step = 360.0 / f64::from(count.max(1));
    (0..count).map(move |i| f64::from(i) * step)
}

/// Deterministic generator for one decision on `board`.
#[must_use]
pub fn decision_rng(seed: u64, board: &BoardState) -> Pcg32 {
    Pcg32::seed_from_u64(seed.wrapping_add(u64::from(board.shot_index())))
}

/// Returns `true` if a cue ball at `position` would not overlap any ball on `board`.
#[must_use]
pub fn is_free_spot(board: &BoardState, position: DVec2, table: &TableGeometry) -> bool {
    let min_distance_sq = (table.ball_radius * 2.0).powi(2);
    board
        .balls()
        .iter()
        .filter(|b| !b.pocketed)
        .all(|b| b.position.distance_squared(position) > min_distance_sq)
}

/// Draws a legal spot for an off-table cue ball.
///
/// Gives up after `attempts` rejected draws.
pub fn respot_cue_ball<R>(
    board: &BoardState,
    table: &TableGeometry,
    rng: &mut R,
    attempts: u32,
) -> Result<DVec2, SearchError>
where
    R: Rng + ?Sized,
{
    let inset = table.ball_radius + RESPOT_MARGIN;
    let min = DVec2::splat(inset);
    let max = DVec2::new(table.width - inset, table.height - inset);
    if min.x > max.x || min.y > max.y {
        return Err(SearchError::NoRespotPosition { attempts: 0 });
    }
    for _ in 0..attempts {
        let position = DVec2::new(
            rng.random_range(min.x..=max.x),
            rng.random_range(min.y..=max.y),
        );
        if is_free_spot(board, position, table) {
            return Ok(position);
        }
    }
    Err(SearchError::NoRespotPosition { attempts })
}

/// Aim angles from `cue_position` straight at each ball the mover may legally pot,
/// keeping only those with a clear path.
///
/// The mover's targets are their remaining group balls, or the 8-ball once the group is
/// cleared.
#[must_use]
pub fn easy_shot_angles(
    board: &BoardState,
    cue_position: DVec2,
    verifier: &ShotVerifier,
) -> ArrayVec<f64, { GROUP_SIZE + 1 }> {
    let mover = board.turn();
    let eight = board.eight_ball();
    let targets = board
        .remaining_balls(mover)
        .chain((board.has_cleared_group(mover) && !eight.pocketed).then_some(eight));

    let mut angles = ArrayVec::new();
    for target in targets {
        let angle = angle_towards(cue_position, target.position);
        let length = cue_position.distance(target.position);
        if verifier.check_clear_path(cue_position, angle, length, board.balls(), &[target.number])
        {
            angles.push(angle);
        }
    }
    angles
}

/// Bonus for aiming at `angle` given the easy-shot angles.
#[must_use]
pub fn easy_shot_bonus(angle: f64, easy: &[f64], weights: &HeuristicWeights) -> f64 {
    let closest = easy
        .iter()
        .map(|&e| angle_difference(angle, e))
        .fold(f64::INFINITY, f64::min);
    if closest <= weights.great_shot_tolerance {
        weights.great_shot
    } else if closest <= weights.good_shot_tolerance {
        weights.good_shot
    } else {
        0.0
    }
}
