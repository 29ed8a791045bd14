//! Iterative-deepening plan search.
//!
//! Candidate plans are every sequence over a small alphabet of moves, tried
//! shortest first. Each candidate is simulated on a copy of the pose model;
//! plans the solver rejects, that collide, or that land a foot on an obstacle
//! edge are recorded so that no longer plan sharing the prefix is tried.
//! Successful plans are scored by total joint travel and the cheapest wins.

use log::{debug, info, trace};
use std::collections::HashSet;
use std::fmt;

use super::collision::check_trajectories;
use super::obstacle::{Obstacle, ground_height};
use crate::config::KineConfig;
use crate::core::Point;
use crate::error::{Error, Result};
use crate::gait::GaitPrimitives;
use crate::pose::{LegId, PoseModel};

/// One move primitive available to the planner
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlanMove {
    /// Step every foot forward by the distance, one leg at a time
    Advance(f64),
    /// Raise the body
    Raise(f64),
    /// Lower the body
    Lower(f64),
}

impl fmt::Display for PlanMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanMove::Advance(n) => write!(f, "advance {}", n),
            PlanMove::Raise(n) => write!(f, "raise {}", n),
            PlanMove::Lower(n) => write!(f, "lower {}", n),
        }
    }
}

/// A move together with the foot targets it produced
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedMove {
    pub movement: PlanMove,
    /// Foot points after the move, in leg order
    pub targets: [Point; 4],
}

/// Outcome of simulating one plan
#[derive(Clone, Debug)]
pub struct Simulation {
    /// Foot centroid reached the target region
    pub reached: bool,
    /// Total joint travel in servo degrees
    pub cost: f64,
    /// Moves actually executed; the rest are skipped once the target is reached
    pub moves: Vec<PlannedMove>,
    /// Final model state
    pub model: PoseModel,
}

/// Best successful plan of a search
#[derive(Clone, Debug)]
pub struct Attempt {
    pub plan: Vec<PlannedMove>,
    pub cost: f64,
    /// Number of candidates simulated
    pub evaluated: usize,
}

/// Obstacle-aware planner
#[derive(Clone, Debug)]
pub struct Planner {
    primitives: GaitPrimitives,
    obstacles: Vec<Obstacle>,
    lift: f64,
}

impl Planner {
    pub fn new(config: &KineConfig, obstacles: Vec<Obstacle>) -> Self {
        Self {
            primitives: GaitPrimitives::new(config),
            obstacles,
            lift: config.gait.single_lift,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Region test: foot centroid at or beyond the target on both axes
    fn reached(model: &PoseModel, target: (f64, f64)) -> bool {
        let c = model.foot_centroid();
        c.x >= target.0 && c.y >= target.1
    }

    /// Foot targets for an advance, lifted onto any obstacle underfoot
    fn advance_targets(&self, model: &PoseModel, distance: f64) -> Result<[Point; 4]> {
        let mut targets = model.feet();
        for target in targets.iter_mut() {
            target.y += distance;
            target.z = ground_height(&self.obstacles, target.x, target.y)?;
        }
        Ok(targets)
    }

    /// Compensated step of one leg to an absolute target
    ///
    /// Stepping up climbs first and then swings; stepping down swings first
    /// and then descends past the start height.
    fn step_to(&self, model: &mut PoseModel, leg: LegId, target: Point) -> Result<()> {
        let foot = model.foot(leg);
        let (dx, dy, dz) = (target.x - foot.x, target.y - foot.y, target.z - foot.z);
        self.primitives.compensate(model, leg)?;
        if dz >= 0.0 {
            model.move_foot(leg, 0.0, 0.0, self.lift + dz)?;
            model.move_foot(leg, dx, dy, 0.0)?;
            model.move_foot(leg, 0.0, 0.0, -self.lift)
        } else {
            model.move_foot(leg, dx, dy, self.lift)?;
            model.move_foot(leg, 0.0, 0.0, -self.lift + dz)
        }
    }

    fn apply(&self, model: &mut PoseModel, movement: PlanMove) -> Result<[Point; 4]> {
        match movement {
            PlanMove::Advance(distance) => {
                let targets = self.advance_targets(model, distance)?;
                for leg in LegId::ALL {
                    self.step_to(model, leg, targets[leg.index()])?;
                }
                model.recenter_body()?;
            }
            PlanMove::Raise(height) => model.move_body(0.0, 0.0, height)?,
            PlanMove::Lower(height) => model.move_body(0.0, 0.0, -height)?,
        }
        Ok(model.feet())
    }

    /// Run a plan on a copy of `start`
    ///
    /// # Errors
    /// Solver failures, unsafe footholds and trajectory collisions.
    pub fn simulate(&self, start: &PoseModel, plan: &[PlanMove], target: (f64, f64)) -> Result<Simulation> {
        let mut model = start.clone();
        model.begin_command();

        let mut moves = Vec::with_capacity(plan.len());
        let mut reached = false;
        for &movement in plan {
            let targets = self.apply(&mut model, movement)?;
            moves.push(PlannedMove { movement, targets });
            if Self::reached(&model, target) {
                reached = true;
                break;
            }
        }

        check_trajectories(model.foot_history(), &self.obstacles)?;

        Ok(Simulation {
            reached,
            cost: model.sequence_cost(),
            moves,
            model,
        })
    }

    /// Cheapest plan of at most `max_length` moves reaching `target`
    ///
    /// # Errors
    /// [`Error::PlanExhausted`] when no candidate reaches the target.
    pub fn search(
        &self,
        start: &PoseModel,
        alphabet: &[PlanMove],
        target: (f64, f64),
        max_length: usize,
    ) -> Result<Attempt> {
        let mut failed: HashSet<Vec<usize>> = HashSet::new();
        let mut complete: HashSet<Vec<usize>> = HashSet::new();
        let mut best: Option<(f64, Vec<PlannedMove>)> = None;
        let mut evaluated = 0usize;

        if alphabet.is_empty() {
            return Err(Error::PlanExhausted { evaluated });
        }

        for length in 1..=max_length {
            let mut indices = vec![0usize; length];
            loop {
                let pruned = (1..length).any(|n| {
                    let prefix = &indices[..n];
                    failed.contains(prefix) || complete.contains(prefix)
                });

                if !pruned {
                    let plan: Vec<PlanMove> = indices.iter().map(|&i| alphabet[i]).collect();
                    evaluated += 1;
                    match self.simulate(start, &plan, target) {
                        Ok(sim) if sim.reached && sim.cost > 0.0 => {
                            debug!("Plan {} reached target, cost {:.1}", describe(&plan), sim.cost);
                            complete.insert(indices.clone());
                            if best.as_ref().is_none_or(|(cost, _)| sim.cost < *cost) {
                                best = Some((sim.cost, sim.moves));
                            }
                        }
                        Ok(sim) => {
                            if sim.reached {
                                complete.insert(indices.clone());
                            }
                            trace!("Plan {} fell short", describe(&plan));
                        }
                        Err(err) => {
                            trace!("Plan {} rejected: {}", describe(&plan), err);
                            failed.insert(indices.clone());
                        }
                    }
                }

                if !next_combination(&mut indices, alphabet.len()) {
                    break;
                }
            }
        }

        match best {
            Some((cost, plan)) => {
                info!(
                    "Best plan of {} evaluated: {} moves, cost {:.1}",
                    evaluated,
                    plan.len(),
                    cost
                );
                Ok(Attempt {
                    plan,
                    cost,
                    evaluated,
                })
            }
            None => Err(Error::PlanExhausted { evaluated }),
        }
    }
}

/// Odometer increment over `base`; false after the last combination
fn next_combination(indices: &mut [usize], base: usize) -> bool {
    for digit in indices.iter_mut().rev() {
        *digit += 1;
        if *digit < base {
            return true;
        }
        *digit = 0;
    }
    false
}

fn describe(plan: &[PlanMove]) -> String {
    let parts: Vec<String> = plan.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}
