//! Foot trajectory collision tests.
//!
//! A segment collides with a box when it crosses one of the box's side planes
//! (pushed out by the outer danger margin) inside that face, or crosses the
//! plane just under the top surface inside the margin-expanded footprint.

use super::obstacle::Obstacle;
use crate::core::{Axis, Point, Segment3};
use crate::error::{Error, Result};
use crate::pose::LegId;

/// Top plane sits this far under the top surface so a foot resting on the
/// box does not register as a hit
const TOP_PLANE_INSET: f64 = 0.1;

impl Obstacle {
    /// Whether a straight foot segment passes through the box
    pub fn intersects(&self, segment: &Segment3) -> bool {
        let o = self.outer_danger_margin;
        let within = |v: f64, lo: f64, hi: f64| lo <= v && v <= hi;

        for x in [self.max.x + o, self.min.x - o] {
            if let Some(p) = segment.intersect_plane(Axis::X, x)
                && within(p.y, self.min.y, self.max.y)
                && within(p.z, self.min.z, self.max.z)
            {
                return true;
            }
        }
        for y in [self.max.y + o, self.min.y - o] {
            if let Some(p) = segment.intersect_plane(Axis::Y, y)
                && within(p.x, self.min.x, self.max.x)
                && within(p.z, self.min.z, self.max.z)
            {
                return true;
            }
        }
        if let Some(p) = segment.intersect_plane(Axis::Z, self.max.z - TOP_PLANE_INSET)
            && within(p.x, self.min.x - o, self.max.x + o)
            && within(p.y, self.min.y - o, self.max.y + o)
        {
            return true;
        }
        false
    }
}

/// Check every leg's recorded trajectory against every obstacle
pub fn check_trajectories(foot_history: &[[Point; 4]], obstacles: &[Obstacle]) -> Result<()> {
    for pair in foot_history.windows(2) {
        for leg in LegId::ALL {
            let segment = Segment3::new(pair[0][leg.index()], pair[1][leg.index()]);
            if segment.start == segment.end {
                continue;
            }
            if obstacles.iter().any(|o| o.intersects(&segment)) {
                return Err(Error::CollisionDetected { leg });
            }
        }
    }
    Ok(())
}
