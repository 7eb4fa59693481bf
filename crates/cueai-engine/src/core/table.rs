use arrayvec::ArrayVec;
use glam::DVec2;

use super::geometry::Rect;

/// Number of pockets on a standard table.
pub const POCKET_COUNT: usize = 6;

/// Fixed physical dimensions of the table and the player, in feet.
///
/// These are process-wide constants; use [`TableGeometry::STANDARD`] unless a test
/// needs a differently shaped table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableGeometry {
    pub width: f64,
    pub height: f64,
    pub ball_radius: f64,
    pub pocket_radius: f64,
    /// How far the player can reach back from the cue ball.
    pub max_reach: f64,
    /// Lateral offset of the player's body edge from the stick line.
    pub player_half_width: f64,
    /// Extra gap left in a rail on each side of a pocket mouth.
    pub pocket_gap_margin: f64,
    /// How far the side pockets sit beyond the rail line.
    pub side_pocket_offset: f64,
}

impl TableGeometry {
    /// A 7-foot bar table.
    pub const STANDARD: Self = Self {
        width: 76.0 / 12.0,
        height: 43.0 / 12.0,
        ball_radius: 0.093_75,
        pocket_radius: 0.171_875,
        max_reach: 3.5,
        player_half_width: 1.0,
        pocket_gap_margin: 0.05,
        side_pocket_offset: 0.1,
    };

    /// The table bed the player stands around.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(DVec2::ZERO, DVec2::new(self.width, self.height))
    }

    /// The area enclosed by the rail cushions.
    #[must_use]
    pub fn cushion_bounds(&self) -> Rect {
        let inset = self.pocket_radius;
        Rect::new(
            DVec2::splat(inset),
            DVec2::new(self.width - inset, self.height - inset),
        )
    }

    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }

    /// Pocket centres, bottom row left to right, then top row left to right.
    #[must_use]
    pub fn pockets(&self) -> ArrayVec<DVec2, POCKET_COUNT> {
        let r = self.pocket_radius;
        let (w, h) = (self.width, self.height);
        let mut pockets = ArrayVec::new();
        pockets.push(DVec2::new(r, r));
        pockets.push(DVec2::new(w / 2.0, r - self.side_pocket_offset));
        pockets.push(DVec2::new(w - r, r));
        pockets.push(DVec2::new(r, h - r));
        pockets.push(DVec2::new(w / 2.0, h - r + self.side_pocket_offset));
        pockets.push(DVec2::new(w - r, h - r));
        pockets
    }

    /// Distance from `position` to the closest pocket centre.
    ///
    /// ```
    /// use cueai_engine::TableGeometry;
    ///
    /// let table = TableGeometry::STANDARD;
    /// let corner = table.pockets()[0];
    /// assert_eq!(table.distance_to_nearest_pocket(corner), 0.0);
    /// ```
    #[must_use]
    pub fn distance_to_nearest_pocket(&self, position: DVec2) -> f64 {
        self.pockets()
            .iter()
            .map(|pocket| pocket.distance(position))
            .fold(f64::INFINITY, f64::min)
    }

    /// Returns `true` if a rail is open at `position` because a pocket mouth is there.
    ///
    /// `along_x` selects the rail direction: horizontal rails (top and bottom) open when
    /// the x coordinate is near a pocket on that rail, vertical rails when y is.
    #[must_use]
    pub fn is_pocket_gap(&self, position: DVec2, along_x: bool, rail_y_or_x: f64) -> bool {
        let gap = self.pocket_radius + self.pocket_gap_margin;
        let tolerance = self.pocket_radius + self.side_pocket_offset;
        self.pockets().iter().any(|pocket| {
            if along_x {
                (pocket.y - rail_y_or_x).abs() <= tolerance && (pocket.x - position.x).abs() < gap
            } else {
                (pocket.x - rail_y_or_x).abs() <= tolerance && (pocket.y - position.y).abs() < gap
            }
        })
    }
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pockets_are_point_symmetric_about_center() {
        let table = TableGeometry::STANDARD;
        let center = table.bounds().center();
        let pockets = table.pockets();
        for pocket in &pockets {
            let mirrored = center * 2.0 - *pocket;
            assert!(pockets.iter().any(|p| p.distance(mirrored) < 1e-12));
        }
    }

    #[test]
    fn test_pocket_gaps_only_near_pockets() {
        let table = TableGeometry::STANDARD;
        let bottom = table.pocket_radius;
        assert!(table.is_pocket_gap(DVec2::new(table.width / 2.0, bottom), true, bottom));
        assert!(table.is_pocket_gap(DVec2::new(0.2, bottom), true, bottom));
        assert!(!table.is_pocket_gap(DVec2::new(1.5, bottom), true, bottom));

        let left = table.pocket_radius;
        assert!(table.is_pocket_gap(DVec2::new(left, 0.25), false, left));
        // No side pocket on the short rails.
        assert!(!table.is_pocket_gap(DVec2::new(left, table.height / 2.0), false, left));
    }

    #[test]
    fn test_distance_to_nearest_pocket_from_center() {
        let table = TableGeometry::STANDARD;
        let center = table.bounds().center();
        let expected = center.distance(table.pockets()[1]);
        assert!((table.distance_to_nearest_pocket(center) - expected).abs() < 1e-12);
    }
}
