//! Kinematic pose model.
//!
//! Owns the four legs and records one snapshot per primitive mutation. Every
//! mutator solves all affected legs first and commits only when every solve
//! succeeds, so a failed move leaves the model untouched.

use log::{debug, trace};

use super::convert::{ServoPose, to_servo};
use super::leg::{Leg, LegId};
use super::snapshot::{MoveKind, PoseSnapshot};
use crate::config::{KineConfig, ServoMapConfig, StanceConfig};
use crate::core::{Point, round_to};
use crate::error::Result;
use crate::ik::{JointAngles, LegSolver};

/// Four legs plus the snapshot history of the command being composed
#[derive(Clone, Debug)]
pub struct PoseModel {
    solver: LegSolver,
    servo_map: ServoMapConfig,
    stance: StanceConfig,
    legs: [Leg; 4],
    history: Vec<PoseSnapshot>,
    foot_history: Vec<[Point; 4]>,
}

impl PoseModel {
    /// Build the configured neutral stance with a fresh solver
    pub fn new(config: &KineConfig) -> Result<Self> {
        Self::with_solver(config, LegSolver::new(config))
    }

    /// Build the configured neutral stance around an existing solver
    ///
    /// Hips sit at (±m, ±m, vertical), feet at (±hx, ±hy, 0), one per quadrant.
    pub fn with_solver(config: &KineConfig, solver: LegSolver) -> Result<Self> {
        let m = config.geometry.mount_offset;
        let stance = config.stance.clone();
        let place = |leg: LegId| -> Result<Leg> {
            let (sx, sy) = leg.quadrant();
            let hip = Point::new(sx * m, sy * m, stance.vertical);
            let foot = Point::new(sx * stance.horizontal_x, sy * stance.horizontal_y, 0.0);
            Leg::new(leg, hip, foot, &solver)
        };
        let legs = [
            place(LegId::One)?,
            place(LegId::Two)?,
            place(LegId::Three)?,
            place(LegId::Four)?,
        ];

        let mut model = Self {
            solver,
            servo_map: config.servo_map.clone(),
            stance,
            legs,
            history: Vec::new(),
            foot_history: Vec::new(),
        };
        model.record(MoveKind::Init);
        debug!("Pose model ready at height {:.2}", model.body_height());
        Ok(model)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn leg(&self, leg: LegId) -> &Leg {
        &self.legs[leg.index()]
    }

    pub fn legs(&self) -> &[Leg; 4] {
        &self.legs
    }

    pub fn hip(&self, leg: LegId) -> Point {
        self.leg(leg).hip()
    }

    pub fn foot(&self, leg: LegId) -> Point {
        self.leg(leg).foot()
    }

    pub fn feet(&self) -> [Point; 4] {
        self.legs.each_ref().map(Leg::foot)
    }

    pub fn hips(&self) -> [Point; 4] {
        self.legs.each_ref().map(Leg::hip)
    }

    pub fn solver(&self) -> &LegSolver {
        &self.solver
    }

    pub fn stance(&self) -> &StanceConfig {
        &self.stance
    }

    /// Latest joint angles, kept between commands
    pub fn current_pose(&self) -> [JointAngles; 4] {
        self.legs.each_ref().map(Leg::angles)
    }

    /// Latest pose in servo convention
    pub fn current_servo_pose(&self) -> ServoPose {
        to_servo(&self.current_pose(), &self.servo_map)
    }

    pub fn to_servo(&self, snapshot: &PoseSnapshot) -> ServoPose {
        to_servo(&snapshot.angles, &self.servo_map)
    }

    pub fn foot_centroid(&self) -> Point {
        Point::centroid(self.feet().iter())
    }

    /// Centroid of the hip points
    pub fn body_centroid(&self) -> Point {
        Point::centroid(self.hips().iter())
    }

    /// Mean hip height above the mean foot height
    pub fn body_height(&self) -> f64 {
        self.body_centroid().z - self.foot_centroid().z
    }

    /// Snapshots since the last `begin_command`, seed included
    pub fn history(&self) -> &[PoseSnapshot] {
        &self.history
    }

    /// Foot points recorded alongside each snapshot
    pub fn foot_history(&self) -> &[[Point; 4]] {
        &self.foot_history
    }

    /// Total joint travel of the recorded history
    ///
    /// Sum over consecutive snapshots of the largest per-servo change, in
    /// servo degrees.
    pub fn sequence_cost(&self) -> f64 {
        let poses: Vec<ServoPose> = self.history.iter().map(|s| self.to_servo(s)).collect();
        poses
            .windows(2)
            .map(|pair| pair[0].max_abs_diff(&pair[1]))
            .sum()
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Reset the history and seed it with the current pose
    pub fn begin_command(&mut self) {
        self.history.clear();
        self.foot_history.clear();
        self.record(MoveKind::Init);
    }

    /// Take the snapshots composed since `begin_command`, seed excluded
    ///
    /// The history is re-seeded, so a second call returns nothing.
    pub fn drain(&mut self) -> Vec<PoseSnapshot> {
        let composed = self.history.drain(..).skip(1).collect();
        self.begin_command();
        composed
    }

    /// Relabel every snapshot recorded from index `start` on
    pub fn retag_since(&mut self, start: usize, kind: MoveKind) {
        for snapshot in self.history.iter_mut().skip(start) {
            snapshot.kind = kind.clone();
        }
    }

    fn record(&mut self, kind: MoveKind) {
        trace!("snapshot {} #{}", kind.label(), self.history.len());
        self.history.push(PoseSnapshot {
            kind,
            angles: self.current_pose(),
        });
        self.foot_history.push(self.feet());
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Solve the given (hip, foot) targets and commit them all, or nothing
    fn commit(&mut self, targets: &[(LegId, Point, Point)], kind: MoveKind) -> Result<()> {
        let mut solved = Vec::with_capacity(targets.len());
        for &(leg, hip, foot) in targets {
            solved.push(self.leg(leg).relocated(hip, foot, &self.solver)?);
        }
        for leg in solved {
            let index = leg.id().index();
            self.legs[index] = leg;
        }
        self.record(kind);
        Ok(())
    }

    /// Move a single foot by a delta
    pub fn move_foot(&mut self, leg: LegId, dx: f64, dy: f64, dz: f64) -> Result<()> {
        let target = self.foot(leg).translated(dx, dy, dz);
        self.commit(&[(leg, self.hip(leg), target)], MoveKind::Foot { leg })
    }

    /// Move several feet at once, each by its own delta
    pub fn move_feet(&mut self, deltas: &[(LegId, Point)]) -> Result<()> {
        let targets: Vec<_> = deltas
            .iter()
            .map(|&(leg, d)| (leg, self.hip(leg), self.foot(leg) + d))
            .collect();
        let legs = deltas.iter().map(|&(leg, _)| leg).collect();
        self.commit(&targets, MoveKind::Feet { legs })
    }

    /// Move several feet by the same delta
    pub fn move_legs(&mut self, legs: &[LegId], dx: f64, dy: f64, dz: f64) -> Result<()> {
        let delta = Point::new(dx, dy, dz);
        let deltas: Vec<_> = legs.iter().map(|&leg| (leg, delta)).collect();
        self.move_feet(&deltas)
    }

    /// Slide planted feet relative to the body without lifting them
    ///
    /// Recorded as a body move: the footprint stays put on the ground and the
    /// body turns or shifts above it.
    pub fn slide_feet(&mut self, deltas: &[(LegId, Point)]) -> Result<()> {
        let targets: Vec<_> = deltas
            .iter()
            .map(|&(leg, d)| (leg, self.hip(leg), self.foot(leg) + d))
            .collect();
        self.commit(&targets, MoveKind::Body)
    }

    /// Translate all four hip points; feet stay planted
    ///
    /// A zero delta records nothing.
    pub fn move_body(&mut self, dx: f64, dy: f64, dz: f64) -> Result<()> {
        if dx == 0.0 && dy == 0.0 && dz == 0.0 {
            return Ok(());
        }
        let targets: Vec<_> = LegId::ALL
            .iter()
            .map(|&leg| (leg, self.hip(leg).translated(dx, dy, dz), self.foot(leg)))
            .collect();
        self.commit(&targets, MoveKind::Body)
    }

    /// Move individual hip points, recorded as one body move
    pub fn move_hips(&mut self, deltas: &[(LegId, Point)]) -> Result<()> {
        let targets: Vec<_> = deltas
            .iter()
            .map(|&(leg, d)| (leg, self.hip(leg) + d, self.foot(leg)))
            .collect();
        self.commit(&targets, MoveKind::Body)
    }

    /// Bring the hip centroid over the foot centroid
    pub fn recenter_body(&mut self) -> Result<()> {
        let offset = self.foot_centroid() - self.body_centroid();
        self.move_body(round_to(offset.x, 2), round_to(offset.y, 2), 0.0)
    }
}
