//! Axis-aligned obstacle boxes.

use std::fs;
use std::path::Path;

use crate::config::ObstacleConfig;
use crate::core::Point;
use crate::error::{Error, Result};

/// Box obstacle with its safety clearances
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub min: Point,
    pub max: Point,
    /// Minimum foot distance from an edge when landing on top
    pub danger_margin: f64,
    /// Outward offset of the collision planes
    pub outer_danger_margin: f64,
}

impl Obstacle {
    /// Box spanning two opposite corners, in any order
    pub fn new(a: Point, b: Point, margins: &ObstacleConfig) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
            danger_margin: margins.danger_margin,
            outer_danger_margin: margins.outer_danger_margin,
        }
    }

    /// Parse one `x1,y1,z1,x2,y2,z2` line
    pub fn parse_line(line: &str, margins: &ObstacleConfig) -> Result<Self> {
        let values = line
            .split(',')
            .map(|field| {
                field.trim().parse::<f64>().map_err(|e| {
                    Error::InvalidObstacle(format!("'{}' in '{}': {}", field.trim(), line, e))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        let &[x1, y1, z1, x2, y2, z2] = values.as_slice() else {
            return Err(Error::InvalidObstacle(format!(
                "expected 6 values, got {} in '{}'",
                values.len(),
                line
            )));
        };
        Ok(Self::new(
            Point::new(x1, y1, z1),
            Point::new(x2, y2, z2),
            margins,
        ))
    }

    /// Whether (x, y) lies over the box footprint
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        self.min.x <= x && x <= self.max.x && self.min.y <= y && y <= self.max.y
    }

    /// Ground height for a foot landing at (x, y)
    ///
    /// `None` when the foot misses the box. Landing closer than the danger
    /// margin to any edge is an error.
    pub fn foot_drop(&self, x: f64, y: f64) -> Result<Option<f64>> {
        if !self.contains_xy(x, y) {
            return Ok(None);
        }
        let edges = [
            ("min x edge", x - self.min.x),
            ("max x edge", self.max.x - x),
            ("min y edge", y - self.min.y),
            ("max y edge", self.max.y - y),
        ];
        for (edge, distance) in edges {
            if distance < self.danger_margin {
                return Err(Error::UnsafeFoothold {
                    x,
                    y,
                    reason: format!("{:.2} from {}", distance, edge),
                });
            }
        }
        Ok(Some(self.max.z))
    }
}

/// Parse obstacle CSV text, skipping blank lines and `#` comments
pub fn parse_obstacles(text: &str, margins: &ObstacleConfig) -> Result<Vec<Obstacle>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| Obstacle::parse_line(line, margins))
        .collect()
}

/// Load obstacles from a CSV file
pub fn load_obstacles<P: AsRef<Path>>(path: P, margins: &ObstacleConfig) -> Result<Vec<Obstacle>> {
    let text = fs::read_to_string(path)?;
    parse_obstacles(&text, margins)
}

/// Ground height at (x, y) over a set of obstacles; 0 when none is underfoot
pub fn ground_height(obstacles: &[Obstacle], x: f64, y: f64) -> Result<f64> {
    let mut height = 0.0_f64;
    for obstacle in obstacles {
        if let Some(top) = obstacle.foot_drop(x, y)? {
            height = height.max(top);
        }
    }
    Ok(height)
}
