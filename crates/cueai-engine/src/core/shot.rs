use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{geometry, table::TableGeometry};

/// A shot: strike the cue ball along `angle` with impulse `magnitude`.
///
/// `cue_ball_position` is only used when the cue ball is off the table (ball in hand);
/// the shooter places the cue ball there before striking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    /// Aim direction in degrees, counter-clockwise from +x.
    pub angle: f64,
    pub magnitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cue_ball_position: Option<DVec2>,
}

impl Shot {
    #[must_use]
    pub const fn new(angle: f64, magnitude: f64) -> Self {
        Self {
            angle,
            magnitude,
            cue_ball_position: None,
        }
    }

    #[must_use]
    pub const fn with_cue_ball_position(mut self, position: DVec2) -> Self {
        self.cue_ball_position = Some(position);
        self
    }

    /// `magnitude · (cos angle, sin angle)`.
    ///
    /// ```
    /// use cueai_engine::Shot;
    ///
    /// let force = Shot::new(90.0, 2.0).force_vector();
    /// assert!(force.x.abs() < 1e-12);
    /// assert!((force.y - 2.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn force_vector(&self) -> DVec2 {
        geometry::direction(self.angle) * self.magnitude
    }

    /// The direction the player stands in, opposite the aim.
    #[must_use]
    pub fn backswing_angle(&self) -> f64 {
        geometry::normalize_angle(self.angle + 180.0)
    }

    /// A soft straight shot used when no decision could be made.
    ///
    /// When the cue ball is off the table it is placed on the head spot.
    #[must_use]
    pub fn safe_default(cue_off_table: bool, magnitude: f64, table: &TableGeometry) -> Self {
        let shot = Self::new(180.0, magnitude);
        if cue_off_table {
            shot.with_cue_ball_position(DVec2::new(table.width * 0.75, table.height / 2.0))
        } else {
            shot
        }
    }
}

impl fmt::Display for Shot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "angle: {:.2} deg, magnitude: {:.1}", self.angle, self.magnitude)?;
        if let Some(pos) = self.cue_ball_position {
            write!(f, ", cue ball at ({:.3}, {:.3})", pos.x, pos.y)?;
        }
        Ok(())
    }
}
