//! Tunable heuristic constants.
//!
//! None of these values has a derivation behind it; they were tuned by playing games.
//! They are plain configuration so experiments can override any subset from JSON
//! without touching code:
//!
//! ```
//! use cueai_evaluator::weights::HeuristicWeights;
//!
//! let weights: HeuristicWeights = serde_json::from_str(r#"{ "possession": 40.0 }"#).unwrap();
//! assert_eq!(weights.possession, 40.0);
//! assert_eq!(weights.scratch, HeuristicWeights::default().scratch);
//! ```

use serde::{Deserialize, Serialize};

/// Weights for the complexity tracker, the board heuristic and the easy-shot bias.
///
/// Every complexity weight is a penalty magnitude: the term it scales is subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicWeights {
    /// Penalty per collision of any kind.
    pub total_collisions: f64,
    /// Penalty scale for rail contacts beyond [`Self::rail_allowance`].
    pub rail_collisions: f64,
    /// Rail contacts per shot that carry no penalty.
    pub rail_allowance: f64,
    /// Exponent applied to the rail contacts beyond the allowance.
    pub rail_exponent: f64,
    /// Penalty per collision suffered by a ball that ends up pocketed.
    pub pocketed_ball_collisions: f64,
    /// Penalty per rail contact of a ball that ends up pocketed.
    pub pocketed_rail_collisions: f64,
    /// Penalty on the sum of squared per-ball travel, in table diagonals.
    pub total_distance: f64,
    /// Penalty on cue-ball travel before the first contact, in table diagonals.
    pub distance_before_contact: f64,

    /// Bonus for owning the next shot.
    pub possession: f64,
    /// Scale of the pocketing progress terms.
    pub pocketed: f64,
    /// Exponent on the mover's newly pocketed count.
    pub own_pocket_exponent: f64,
    /// Exponent on the opponent's newly pocketed count.
    pub opponent_pocket_exponent: f64,
    /// Scale of the per-ball proximity-to-pocket term.
    pub distance_per_ball: f64,
    /// Penalty for a foul, charged to the shooter.
    pub scratch: f64,
    /// Score of a won game; a lost game scores its negation.
    pub win: f64,

    /// Factor applied to the complexity score before it joins the board score.
    pub complexity: f64,
    /// Bonus for aiming within [`Self::great_shot_tolerance`] of an easy shot.
    pub great_shot: f64,
    /// Bonus for aiming within [`Self::good_shot_tolerance`] of an easy shot.
    pub good_shot: f64,
    /// Degrees.
    pub great_shot_tolerance: f64,
    /// Degrees.
    pub good_shot_tolerance: f64,
}

impl HeuristicWeights {
    pub const DEFAULT: Self = Self {
        total_collisions: 0.7,
        rail_collisions: 50.0,
        rail_allowance: 3.0,
        rail_exponent: 2.7,
        pocketed_ball_collisions: 2.5,
        pocketed_rail_collisions: 4.0,
        total_distance: 0.5,
        distance_before_contact: 1.1,

        possession: 55.0,
        pocketed: 6.7,
        own_pocket_exponent: 1.4,
        opponent_pocket_exponent: 1.6,
        distance_per_ball: 1.0,
        scratch: 50.0,
        win: 1000.0,

        complexity: 0.2,
        great_shot: 3.4,
        good_shot: 2.8,
        great_shot_tolerance: 0.5,
        good_shot_tolerance: 1.0,
    };
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}
