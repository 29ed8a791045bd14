//! Leg inverse kinematics.
//!
//! The leg is a yaw joint followed by a planar chain: proximal link `a`,
//! distal link `b` and an optional toe link `c`, all in the vertical plane
//! selected by the yaw. The yaw axis sits `d` away from the shoulder.
//!
//! With three links the system is redundant, so the solver sweeps the wrist
//! orientation, solves the `a`/`b` triangle for each sample and keeps the
//! candidate whose end-effector pitch (alpha + beta + gamma) is closest to the
//! configured ideal surface angle.

use log::trace;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

use super::cache::{PlanarAngles, PlanarKey, PlanarOutcome, SolutionCache};
use super::constraints::{LegLimits, LegType};
use crate::config::{KineConfig, LegGeometry, SweepConfig};
use crate::core::{Point, round_to, wrap_degrees};
use crate::error::{Error, Result};
use crate::pose::LegId;

/// Maximum per-axis error accepted when rebuilding a target from angles
const RECONSTRUCTION_TOLERANCE: f64 = 0.01;

/// Slack for the rounding applied to reach and drop before solving
const FK_TOLERANCE: f64 = RECONSTRUCTION_TOLERANCE + 1e-9;

/// Joint angles of one leg (radians, internal convention)
///
/// `tetta` is the body-frame heading from hip to foot. Beta is negative when
/// the knee is bent. Gamma is zero for the two-link model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    pub tetta: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// IK solver shared by every leg of a pose model
#[derive(Clone, Debug)]
pub struct LegSolver {
    geometry: LegGeometry,
    sweep: SweepConfig,
    limits: LegLimits,
    cache: SolutionCache,
}

impl LegSolver {
    /// Create a solver with a fresh memo table
    pub fn new(config: &KineConfig) -> Self {
        Self::with_cache(config, SolutionCache::new())
    }

    /// Create a solver backed by an existing memo table
    ///
    /// The table must only ever be shared between solvers built from the same
    /// configuration.
    pub fn with_cache(config: &KineConfig, cache: SolutionCache) -> Self {
        Self {
            geometry: config.geometry.clone(),
            sweep: config.sweep.clone(),
            limits: config.limits.clone(),
            cache,
        }
    }

    pub fn geometry(&self) -> &LegGeometry {
        &self.geometry
    }

    pub fn cache(&self) -> &SolutionCache {
        &self.cache
    }

    /// Solve joint angles placing `leg`'s foot at `foot` from hip point `hip`
    ///
    /// # Errors
    /// - [`Error::Unreachable`] when no geometric solution exists
    /// - [`Error::ConstraintViolated`] when solutions exist but none fits the
    ///   leg type's limits
    pub fn solve(&self, hip: Point, foot: Point, leg: LegId) -> Result<JointAngles> {
        let leg_type = leg.leg_type();
        let limits = self.limits.for_type(leg_type);

        let tetta = hip.heading_to(&foot);
        let local_yaw = wrap_degrees(tetta.to_degrees() - leg.mount_yaw_deg());
        limits.check_yaw(local_yaw)?;
        let coupled = limits.is_coupled(local_yaw);

        let (sin_t, cos_t) = tetta.sin_cos();
        let shoulder = hip.translated(self.geometry.d * cos_t, self.geometry.d * sin_t, 0.0);
        let reach = round_to(foot.distance_xy(&shoulder), 2);
        let drop = round_to(foot.z - hip.z, 2);

        if reach.hypot(drop) > self.geometry.max_reach() {
            return Err(Error::Unreachable { reach, drop });
        }

        let key = PlanarKey::new(reach, drop, leg_type, coupled);
        let outcome = self
            .cache
            .get_or_insert_with(key, || self.solve_planar(reach, drop, leg_type, coupled));

        let planar = match outcome {
            PlanarOutcome::Solved(planar) => planar,
            PlanarOutcome::Unreachable => return Err(Error::Unreachable { reach, drop }),
            PlanarOutcome::Violated { joint, value } => {
                return Err(Error::ConstraintViolated { joint, value });
            }
        };

        let angles = JointAngles {
            tetta,
            alpha: planar.alpha,
            beta: planar.beta,
            gamma: planar.gamma,
        };

        // Catches feet inside the yaw offset circle, where the planar solution
        // points away from the target
        let rebuilt = self.foot_position(hip, &angles);
        if !rebuilt.within(&foot, FK_TOLERANCE) {
            trace!(
                "leg {}: reconstruction {} misses target {}",
                leg, rebuilt, foot
            );
            return Err(Error::Unreachable { reach, drop });
        }

        Ok(angles)
    }

    /// Uncached planar solve in the leg's sagittal plane
    ///
    /// `reach` is the horizontal distance from the shoulder to the foot and
    /// `drop` the foot height relative to the hip.
    pub fn solve_planar(
        &self,
        reach: f64,
        drop: f64,
        leg_type: LegType,
        coupled: bool,
    ) -> PlanarOutcome {
        match self.geometry.c {
            Some(c) => self.solve_three_link(reach, drop, c, leg_type, coupled),
            None => self.solve_two_link(reach, drop, leg_type, coupled),
        }
    }

    fn solve_three_link(
        &self,
        dx: f64,
        dy: f64,
        c: f64,
        leg_type: LegType,
        coupled: bool,
    ) -> PlanarOutcome {
        let a = self.geometry.a;
        let b = self.geometry.b;
        let limits = self.limits.for_type(leg_type);
        let ideal = self.sweep.ideal_surface_deg;

        let mut best: Option<(f64, PlanarAngles)> = None;
        let mut best_rejected: Option<(f64, &'static str, f64)> = None;

        let step = self.sweep.step_deg.max(1) as usize;
        for ksi_deg in (self.sweep.min_deg..self.sweep.max_deg).step_by(step) {
            let ksi = f64::from(ksi_deg).to_radians();
            let wrist_x = dx + c * (FRAC_PI_2 + ksi).cos();
            let wrist_y = dy + c * (FRAC_PI_2 + ksi).sin();
            let dist = wrist_x.hypot(wrist_y);
            if dist > a + b || dist < (a - b).abs() || dist == 0.0 {
                continue;
            }

            let Some((alpha, beta)) = triangle(a, b, dist, wrist_y.atan2(wrist_x)) else {
                continue;
            };

            let knee_x = a * alpha.cos();
            let knee_y = a * alpha.sin();
            let knee_to_foot = (dx - knee_x).hypot(dy - knee_y);
            let cos_c = ((b * b + c * c - knee_to_foot * knee_to_foot) / (2.0 * b * c)).clamp(-1.0, 1.0);
            let angle_c = cos_c.acos();

            for sign in [-1.0, 1.0] {
                let gamma = sign * (PI - angle_c);
                let ankle_x = knee_x + b * (alpha + beta).cos();
                let ankle_y = knee_y + b * (alpha + beta).sin();
                let toe_x = ankle_x + c * (alpha + beta + gamma).cos();
                let toe_y = ankle_y + c * (alpha + beta + gamma).sin();
                if (toe_x - dx).abs() > RECONSTRUCTION_TOLERANCE
                    || (toe_y - dy).abs() > RECONSTRUCTION_TOLERANCE
                {
                    continue;
                }

                let (alpha_deg, beta_deg, gamma_deg) =
                    (alpha.to_degrees(), beta.to_degrees(), gamma.to_degrees());
                let cost = (alpha_deg + beta_deg + gamma_deg - ideal).powi(2);

                match limits.check_planar(alpha_deg, beta_deg, Some(gamma_deg), coupled) {
                    Ok(()) => {
                        if best.is_none_or(|(best_cost, _)| cost < best_cost) {
                            best = Some((cost, PlanarAngles { alpha, beta, gamma }));
                        }
                    }
                    Err((joint, value)) => {
                        if best_rejected.is_none_or(|(best_cost, _, _)| cost < best_cost) {
                            best_rejected = Some((cost, joint, value));
                        }
                    }
                }
            }
        }

        match (best, best_rejected) {
            (Some((_, angles)), _) => PlanarOutcome::Solved(angles),
            (None, Some((_, joint, value))) => {
                trace!(
                    "{} leg: reach {:.2} drop {:.2} rejected by {} = {:.2}",
                    leg_type.as_str(),
                    dx,
                    dy,
                    joint,
                    value
                );
                PlanarOutcome::Violated { joint, value }
            }
            (None, None) => PlanarOutcome::Unreachable,
        }
    }

    fn solve_two_link(&self, dx: f64, dy: f64, leg_type: LegType, coupled: bool) -> PlanarOutcome {
        let a = self.geometry.a;
        let b = self.geometry.b;
        let dist = dx.hypot(dy);
        if dist > a + b || dist < (a - b).abs() || dist == 0.0 {
            return PlanarOutcome::Unreachable;
        }
        let Some((alpha, beta)) = triangle(a, b, dist, dy.atan2(dx)) else {
            return PlanarOutcome::Unreachable;
        };

        let limits = self.limits.for_type(leg_type);
        match limits.check_planar(alpha.to_degrees(), beta.to_degrees(), None, coupled) {
            Ok(()) => PlanarOutcome::Solved(PlanarAngles {
                alpha,
                beta,
                gamma: 0.0,
            }),
            Err((joint, value)) => PlanarOutcome::Violated { joint, value },
        }
    }

    /// Forward kinematics: foot point for the given hip point and angles
    pub fn foot_position(&self, hip: Point, angles: &JointAngles) -> Point {
        let g = &self.geometry;
        let c = g.c.unwrap_or(0.0);
        let knee = angles.alpha;
        let ankle = angles.alpha + angles.beta;
        let toe = ankle + angles.gamma;

        let planar_x = g.a * knee.cos() + g.b * ankle.cos() + c * toe.cos();
        let planar_z = g.a * knee.sin() + g.b * ankle.sin() + c * toe.sin();
        let radial = g.d + planar_x;
        let (sin_t, cos_t) = angles.tetta.sin_cos();

        Point::new(
            hip.x + radial * cos_t,
            hip.y + radial * sin_t,
            hip.z + planar_z,
        )
    }
}

/// Law-of-cosines solve of the `a`/`b` triangle with the far vertex at
/// distance `dist` and heading `heading`. Returns (alpha, beta) with the knee
/// bent downward.
fn triangle(a: f64, b: f64, dist: f64, heading: f64) -> Option<(f64, f64)> {
    let cos_alpha = (a * a + dist * dist - b * b) / (2.0 * a * dist);
    let cos_beta = (a * a + b * b - dist * dist) / (2.0 * a * b);
    if !(-1.0..=1.0).contains(&cos_alpha) || !(-1.0..=1.0).contains(&cos_beta) {
        return None;
    }
    let alpha = cos_alpha.acos() + heading;
    let beta = -(PI - cos_beta.acos());
    Some((alpha, beta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solver() -> LegSolver {
        LegSolver::new(&KineConfig::default())
    }

    const HIP: Point = Point::new(3.8, 3.8, 14.0);

    #[test]
    fn test_default_stance_solution() {
        let s = solver();
        let angles = s.solve(HIP, Point::new(15.0, 15.0, 0.0), LegId::One).unwrap();
        assert_relative_eq!(angles.tetta.to_degrees(), 45.0, epsilon = 1e-9);
        assert_relative_eq!(angles.alpha.to_degrees(), 47.85, epsilon = 0.01);
        assert_relative_eq!(angles.beta.to_degrees(), -114.69, epsilon = 0.01);
        assert_relative_eq!(angles.gamma.to_degrees(), -30.16, epsilon = 0.01);
    }

    #[test]
    fn test_solution_reconstructs_target() {
        let s = solver();
        for &(x, y, z) in &[(15.0, 15.0, 0.0), (20.0, 20.0, 0.0), (9.0, 9.0, 0.0), (15.0, 15.0, -10.0)] {
            let foot = Point::new(x, y, z);
            let angles = s.solve(HIP, foot, LegId::One).unwrap();
            assert!(s.foot_position(HIP, &angles).within(&foot, 0.01));
        }
    }

    #[test]
    fn test_far_target_is_unreachable() {
        let s = solver();
        let result = s.solve(HIP, Point::new(40.0, 40.0, 0.0), LegId::One);
        assert!(matches!(result, Err(Error::Unreachable { .. })));
    }

    #[test]
    fn test_limits_reject_geometric_solution() {
        let s = solver();
        let k = 11.7 / 2f64.sqrt();
        let result = s.solve(HIP, Point::new(3.8 + k, 3.8 + k, 12.0), LegId::One);
        assert!(matches!(result, Err(Error::ConstraintViolated { .. })));
    }

    #[test]
    fn test_yaw_rejected_before_solving() {
        let s = solver();
        // Heading of about 121 degrees is 76 degrees from leg 1's mount direction
        let result = s.solve(HIP, Point::new(3.8 - 6.0, 3.8 + 10.0, 0.0), LegId::One);
        assert!(matches!(
            result,
            Err(Error::ConstraintViolated { joint: "yaw", .. })
        ));
        assert_eq!(s.cache().misses(), 0);
    }

    #[test]
    fn test_cache_hits_for_symmetric_legs() {
        let s = solver();
        s.solve(HIP, Point::new(15.0, 15.0, 0.0), LegId::One).unwrap();
        s.solve(
            Point::new(-3.8, 3.8, 14.0),
            Point::new(-15.0, 15.0, 0.0),
            LegId::Four,
        )
        .unwrap();
        assert_eq!(s.cache().misses(), 1);
        assert_eq!(s.cache().hits(), 1);
    }

    #[test]
    fn test_two_link_variant() {
        let mut config = KineConfig::default();
        config.geometry.c = None;
        config.limits.front.alpha.max = 90.0;
        config.limits.front.beta.min = -170.0;
        let s = LegSolver::new(&config);
        let foot = Point::new(3.8 + 14.0, 3.8, 3.0);
        let angles = s.solve(Point::new(3.8, 3.8, 14.0), foot, LegId::One).unwrap();
        assert_eq!(angles.gamma, 0.0);
        assert!(
            s.foot_position(Point::new(3.8, 3.8, 14.0), &angles)
                .within(&foot, 0.01)
        );
    }
}
