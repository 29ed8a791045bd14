//! Geometry primitives.

mod line;
mod math;
mod point;

pub use line::{Axis, Line2, Segment3, move_towards, rotate_about};
pub use math::{round_to, wrap_degrees, wrap_radians};
pub use point::Point;
