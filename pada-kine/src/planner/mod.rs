//! Obstacle model, trajectory collision tests and plan search.

mod collision;
mod obstacle;
mod search;

pub use collision::check_trajectories;
pub use obstacle::{Obstacle, ground_height, load_obstacles, parse_obstacles};
pub use search::{Attempt, PlanMove, PlannedMove, Planner, Simulation};
