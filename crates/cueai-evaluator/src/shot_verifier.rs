//! Reachability: could a person standing at the table actually take this shot?
//!
//! The player stands behind the cue ball on the back-swing line (the aim direction
//! turned by 180°). A shot is rejected when:
//!
//! - **the stick does not clear the table**: the back-swing ray leaves the table bed
//!   farther than `max_reach` from the cue ball, so the stick tip is still over the bed;
//! - **the body does not clear the table**: the outer edge of the player's body, offset
//!   by `player_half_width` to the side of the stick line, is strictly inside the bed.
//!   With `h = sqrt(reach² + half_width²)` that point lies `h` away from the cue ball at
//!   `back_swing - acos(reach / h)`;
//! - **a ball is in the way**: some object ball sits inside a 15° cone around the
//!   back-swing line, within `h` of the cue ball.
//!
//! All checks are pure functions of the shot, the cue-ball position and the ball layout.
//! Reflecting the layout through the table centre and turning the shot by 180° gives the
//! same answer, since the table is point-symmetric.

use cueai_engine::{
    Ball, Shot, TableGeometry,
    geometry::{
        angle_difference, angle_towards, direction, ray_intersects_circle, ray_point_distance,
    },
};
use glam::DVec2;

/// Half of the clearance cone around the back-swing line, in degrees.
pub const CONE_HALF_ANGLE: f64 = 7.5;

/// Decides whether candidate shots are physically reachable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotVerifier {
    table: TableGeometry,
}

impl ShotVerifier {
    #[must_use]
    pub fn new(table: TableGeometry) -> Self {
        Self { table }
    }

    /// Distance from the cue ball to the player's body edge.
    fn body_reach(&self) -> f64 {
        self.table.max_reach.hypot(self.table.player_half_width)
    }

    /// Outer edge of the player's body.
    #[must_use]
    pub fn body_extension(&self, shot: &Shot, cue_position: DVec2) -> DVec2 {
        let reach = self.body_reach();
        let offset = (self.table.max_reach / reach).acos().to_degrees();
        cue_position + direction(shot.backswing_angle() - offset) * reach
    }

    /// Returns `true` if the stick, held at full reach, ends on or beyond the bed edge.
    ///
    /// The back-swing ray is clipped against the bed; a ray that never crosses the bed
    /// (cue ball placed outside it) is clear.
    #[must_use]
    pub fn stick_clears_table(&self, shot: &Shot, cue_position: DVec2) -> bool {
        self.table
            .bounds()
            .ray_exit_distance(cue_position, direction(shot.backswing_angle()))
            .is_none_or(|exit| exit <= self.table.max_reach)
    }

    /// Returns `true` if the shot can be taken from `cue_position`.
    ///
    /// # Arguments
    ///
    /// * `shot` - Candidate shot
    /// * `cue_position` - Where the cue ball sits (or will be placed) when struck
    /// * `balls` - Object balls on the board; pocketed ones are ignored
    #[must_use]
    pub fn is_reachable(&self, shot: &Shot, cue_position: DVec2, balls: &[Ball]) -> bool {
        if !self.stick_clears_table(shot, cue_position) {
            return false;
        }
        if self
            .table
            .bounds()
            .contains_strictly(self.body_extension(shot, cue_position))
        {
            return false;
        }
        self.is_cone_clear(
            cue_position,
            shot.backswing_angle(),
            CONE_HALF_ANGLE,
            self.body_reach(),
            balls,
            &[],
        )
    }

    /// Returns `true` if a ball rolling from `origin` along `angle` for `length` would
    /// touch none of `balls` except those numbered in `skip`.
    ///
    /// A ball is in the way when its centre comes within one ball diameter of the path.
    #[must_use]
    pub fn check_clear_path(
        &self,
        origin: DVec2,
        angle: f64,
        length: f64,
        balls: &[Ball],
        skip: &[u8],
    ) -> bool {
        let dir = direction(angle);
        let diameter = self.table.ball_radius * 2.0;
        !candidates(balls, skip).any(|ball| {
            let along = (ball.position - origin).dot(dir);
            along <= length + diameter
                && ray_point_distance(origin, dir, ball.position).is_some_and(|d| d < diameter)
        })
    }

    /// Returns `true` if no ball lies in the cone of half-angle `half_angle` around
    /// `axis`, with its apex at `apex`, out to `length`.
    ///
    /// A ball counts as inside when its centre is within the cone, or within one ball
    /// radius of either edge ray. Only balls ahead of the apex are considered.
    #[must_use]
    pub fn is_cone_clear(
        &self,
        apex: DVec2,
        axis: f64,
        half_angle: f64,
        length: f64,
        balls: &[Ball],
        skip: &[u8],
    ) -> bool {
        let radius = self.table.ball_radius;
        let axis_dir = direction(axis);
        let edges = [direction(axis - half_angle), direction(axis + half_angle)];
        !candidates(balls, skip).any(|ball| {
            let offset = ball.position - apex;
            if axis_dir.dot(offset) <= 0.0 || offset.length() - radius > length {
                return false;
            }
            angle_difference(angle_towards(apex, ball.position), axis) <= half_angle
                || edges
                    .iter()
                    .any(|&edge| ray_intersects_circle(apex, edge, ball.position, radius))
        })
    }
}

impl Default for ShotVerifier {
    fn default() -> Self {
        Self::new(TableGeometry::STANDARD)
    }
}

fn candidates<'a>(balls: &'a [Ball], skip: &'a [u8]) -> impl Iterator<Item = &'a Ball> + 'a {
    balls
        .iter()
        .filter(move |b| !b.pocketed && !b.is_cue() && !skip.contains(&b.number))
}
