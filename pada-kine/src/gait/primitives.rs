//! Gait primitives built on the pose model mutators.
//!
//! Every primitive is a short, fixed sequence of pose model mutations. None of
//! them roll back on their own; the composer runs them on a scratch copy of the
//! model and discards it on failure.

use log::{debug, warn};

use super::forwarder::TrotPace;
use crate::config::{GaitConfig, KineConfig};
use crate::core::{Line2, Point, move_towards, rotate_about, round_to};
use crate::error::Result;
use crate::pose::{LegId, MoveKind, PoseModel};

/// Diagonal leg pairs that lift together in a trot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagonalPair {
    /// Legs 1 and 3
    OneThree,
    /// Legs 2 and 4
    TwoFour,
}

impl DiagonalPair {
    pub fn legs(self) -> [LegId; 2] {
        match self {
            DiagonalPair::OneThree => [LegId::One, LegId::Three],
            DiagonalPair::TwoFour => [LegId::Two, LegId::Four],
        }
    }

    pub fn other(self) -> DiagonalPair {
        match self {
            DiagonalPair::OneThree => DiagonalPair::TwoFour,
            DiagonalPair::TwoFour => DiagonalPair::OneThree,
        }
    }
}

/// Leg order for one-legged walking forward
pub const FORWARD_ORDER: [LegId; 4] = [LegId::One, LegId::Three, LegId::Four, LegId::Two];

/// Leg order for one-legged walking backward
pub const BACKWARD_ORDER: [LegId; 4] = [LegId::Three, LegId::One, LegId::Two, LegId::Four];

/// Leg order for one-legged strafing left
pub const STRAFE_LEFT_ORDER: [LegId; 4] = [LegId::Four, LegId::Two, LegId::Three, LegId::One];

/// Leg order for one-legged strafing right
pub const STRAFE_RIGHT_ORDER: [LegId; 4] = [LegId::Two, LegId::Four, LegId::One, LegId::Three];

/// Gait primitives with their configured distances
#[derive(Clone, Debug)]
pub struct GaitPrimitives {
    gait: GaitConfig,
    mount_offset: f64,
    stance_height: f64,
}

impl GaitPrimitives {
    pub fn new(config: &KineConfig) -> Self {
        Self {
            gait: config.gait.clone(),
            mount_offset: config.geometry.mount_offset,
            stance_height: config.stance.vertical,
        }
    }

    pub fn config(&self) -> &GaitConfig {
        &self.gait
    }

    /// Point the hip centroid should occupy while `leg` is lifted
    ///
    /// Found `margin` away from the intersection of the foot diagonals, toward
    /// the foot opposite `leg`.
    pub fn support_point(&self, model: &PoseModel, leg: LegId) -> Point {
        let flat = |p: Point| Point::new(p.x, p.y, 0.0);
        let d1 = Line2::new(model.foot(LegId::One), model.foot(LegId::Three));
        let d2 = Line2::new(model.foot(LegId::Two), model.foot(LegId::Four));
        let center = match d1.intersection(&d2) {
            Some(p) => p,
            None => {
                warn!("Foot diagonals are parallel; using the foot centroid");
                flat(model.foot_centroid())
            }
        };
        let opposite = flat(model.foot(leg.opposite()));
        move_towards(center, opposite, self.gait.margin).rounded(2)
    }

    /// Shift the body over the support triangle that remains when `leg` lifts
    pub fn compensate(&self, model: &mut PoseModel, leg: LegId) -> Result<()> {
        let target = self.support_point(model, leg);
        let centroid = model.body_centroid();
        model.move_body(
            round_to(target.x - centroid.x, 2),
            round_to(target.y - centroid.y, 2),
            0.0,
        )
    }

    /// Compensate, then lift `leg` while translating it, then lower it
    pub fn single_leg_step(&self, model: &mut PoseModel, leg: LegId, dx: f64, dy: f64) -> Result<()> {
        let lift = self.gait.single_lift;
        self.compensate(model, leg)?;
        model.move_foot(leg, dx, dy, lift)?;
        model.move_foot(leg, 0.0, 0.0, -lift)
    }

    /// Step each leg in `order` by (dx, dy), then recenter
    pub fn walk_one_legged(&self, model: &mut PoseModel, dx: f64, dy: f64, order: &[LegId]) -> Result<()> {
        debug!("One-legged walk ({:.1}, {:.1}) order {:?}", dx, dy, order);
        for &leg in order {
            self.single_leg_step(model, leg, dx, dy)?;
        }
        model.recenter_body()
    }

    /// Base step length and lift height of a trot pace
    pub fn stride(&self, pace: TrotPace) -> (f64, f64) {
        match pace {
            TrotPace::Walk => (self.gait.trot_step, self.gait.pair_lift),
            TrotPace::Run => (self.gait.run_step, self.gait.run_lift),
        }
    }

    /// Trot half-step: shift the body by half the step, then swing one pair
    ///
    /// Running steps are recorded as [`MoveKind::Run`] so the command loop
    /// paces them at the run speed.
    pub fn trot(&self, model: &mut PoseModel, pair: DiagonalPair, dx: f64, dy: f64, pace: TrotPace) -> Result<()> {
        let (_, lift) = self.stride(pace);
        let legs = pair.legs();
        let start = model.history().len();
        model.move_body(round_to(dx / 2.0, 1), round_to(dy / 2.0, 1), 0.0)?;
        model.move_legs(&legs, dx, dy, lift)?;
        model.move_legs(&legs, 0.0, 0.0, -lift)?;
        if pace == TrotPace::Run {
            model.retag_since(start, MoveKind::Run);
        }
        Ok(())
    }

    /// Climb onto (positive `dz`) or down from (negative) a step of height `dz`
    ///
    /// Pairs 2-4 and 1-3 alternate through the configured climb steps. Each
    /// pair lifts by half the pair lift, swings forward and plants, then the
    /// body follows. Front legs 4 and 1 change level on the first two steps,
    /// rear legs 2 and 3 on the last two, and the body rises by `dz` at the end.
    pub fn climb_two_legged(&self, model: &mut PoseModel, dz: f64) -> Result<()> {
        let lift = round_to(self.gait.pair_lift / 2.0, 1);
        let count = self.gait.climb_steps.len();
        debug!("Climb {:+.1} over {} steps", dz, count);
        for (i, &step) in self.gait.climb_steps.iter().enumerate() {
            let pair = if i % 2 == 0 { DiagonalPair::TwoFour } else { DiagonalPair::OneThree };
            let legs = pair.legs();
            let changes_level = |leg: LegId| match leg {
                LegId::Four => i == 0,
                LegId::One => i == 1,
                LegId::Two | LegId::Three => i + 2 >= count,
            };
            let vertical = |base: f64, extra: f64| -> Vec<(LegId, Point)> {
                legs.iter()
                    .map(|&leg| {
                        let rise = if changes_level(leg) { base + extra } else { base };
                        (leg, Point::new(0.0, 0.0, rise))
                    })
                    .collect()
            };

            model.move_feet(&vertical(lift, dz.max(0.0)))?;
            model.move_legs(&legs, 0.0, step, 0.0)?;
            model.move_feet(&vertical(-lift, dz.min(0.0)))?;
            model.move_body(0.0, self.gait.climb_body_shift(i), 0.0)?;
        }
        model.move_body(0.0, 0.0, dz)
    }

    /// Center used by turns: midpoint of hips 2 and 4
    fn turn_center(model: &PoseModel) -> Point {
        let h2 = model.hip(LegId::Two);
        let h4 = model.hip(LegId::Four);
        Point::new(
            round_to((h2.x + h4.x) / 2.0, 2),
            round_to((h2.y + h4.y) / 2.0, 2),
            0.0,
        )
    }

    /// Horizontal deltas that rotate the given feet about `center`
    fn rotation_deltas(model: &PoseModel, legs: &[LegId], center: Point, angle_deg: f64, dz: f64) -> Vec<(LegId, Point)> {
        legs.iter()
            .map(|&leg| {
                let foot = model.foot(leg);
                let moved = rotate_about(foot, center, angle_deg.to_radians()).rounded(2);
                (leg, Point::new(moved.x - foot.x, moved.y - foot.y, dz))
            })
            .collect()
    }

    /// Step the feet around the turn center, pair 2-4 first
    ///
    /// Positive angles rotate the feet counter-clockwise relative to the body.
    pub fn turn_feet(&self, model: &mut PoseModel, angle_deg: f64) -> Result<()> {
        let lift = self.gait.pair_lift;
        let center = Self::turn_center(model);
        for pair in [DiagonalPair::TwoFour, DiagonalPair::OneThree] {
            let legs = pair.legs();
            let deltas = Self::rotation_deltas(model, &legs, center, angle_deg, lift);
            model.move_feet(&deltas)?;
            model.move_legs(&legs, 0.0, 0.0, -lift)?;
        }
        Ok(())
    }

    /// Turn the body over planted feet
    ///
    /// The body frame is fixed, so the feet counter-rotate in it. Positive
    /// angles turn the body clockwise seen from above.
    pub fn turn_body(&self, model: &mut PoseModel, angle_deg: f64) -> Result<()> {
        let center = Self::turn_center(model);
        let deltas = Self::rotation_deltas(model, &LegId::ALL, center, angle_deg, 0.0);
        model.slide_feet(&deltas)
    }

    /// Turn in place: step the feet by -angle, then turn the body by +angle
    ///
    /// The stance ends where it started relative to the body.
    pub fn turn_move(&self, model: &mut PoseModel, angle_deg: f64) -> Result<()> {
        self.turn_feet(model, -angle_deg)?;
        self.turn_body(model, angle_deg)
    }

    /// Turn in place one compensated leg at a time
    ///
    /// Each foot steps by -angle around the turn center, the body returns to
    /// where it started, then turns by +angle over the planted feet.
    pub fn turn_one_legged(&self, model: &mut PoseModel, angle_deg: f64) -> Result<()> {
        let center = Self::turn_center(model);
        let origin = model.body_centroid();
        for &leg in &FORWARD_ORDER {
            let foot = model.foot(leg);
            let moved = rotate_about(foot, center, (-angle_deg).to_radians()).rounded(2);
            self.single_leg_step(model, leg, moved.x - foot.x, moved.y - foot.y)?;
        }
        let centroid = model.body_centroid();
        model.move_body(
            round_to(origin.x - centroid.x, 2),
            round_to(origin.y - centroid.y, 2),
            0.0,
        )?;
        self.turn_body(model, angle_deg)
    }

    /// Widen (positive) or narrow (negative) the stance
    pub fn reposition(&self, model: &mut PoseModel, dx: f64, dy: f64) -> Result<()> {
        let lift = self.gait.pair_lift;
        for pair in [DiagonalPair::TwoFour, DiagonalPair::OneThree] {
            let legs = pair.legs();
            let deltas: Vec<_> = legs
                .iter()
                .map(|&leg| {
                    let (sx, sy) = leg.quadrant();
                    (leg, Point::new(sx * dx, sy * dy, lift))
                })
                .collect();
            model.move_feet(&deltas)?;
            model.move_legs(&legs, 0.0, 0.0, -lift)?;
        }
        Ok(())
    }

    /// Pitch the body from `current_deg` to `target_deg` (positive is nose up)
    ///
    /// Front and rear hips swing in opposite senses on a circle of radius
    /// equal to the mount offset.
    pub fn look_vertical(&self, model: &mut PoseModel, current_deg: f64, target_deg: f64) -> Result<()> {
        let m = self.mount_offset;
        let (cur, tgt) = (current_deg.to_radians(), target_deg.to_radians());
        let dy = m * tgt.cos() - m * cur.cos();
        let dz = m * tgt.sin() - m * cur.sin();
        let front = Point::new(0.0, dy, dz);
        model.move_hips(&[
            (LegId::One, front),
            (LegId::Two, -front),
            (LegId::Three, -front),
            (LegId::Four, front),
        ])
    }

    /// Recenter, then restore the configured body height
    pub fn reset_stance(&self, model: &mut PoseModel) -> Result<()> {
        model.recenter_body()?;
        let dz = round_to(self.stance_height - model.body_height(), 2);
        model.move_body(0.0, 0.0, dz)
    }
}
