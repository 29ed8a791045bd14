//! Joint-angle limits per leg type.
//!
//! All ranges are in degrees. Yaw is leg-local: the body-frame heading of the
//! foot minus the leg's mounting direction, wrapped to (-180, 180].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Front legs (1 and 4) and rear legs (2 and 3) carry separate limit sets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LegType {
    Front,
    Rear,
}

impl LegType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegType::Front => "front",
            LegType::Rear => "rear",
        }
    }
}

/// Closed interval `[min, max]` in degrees
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct AngleRange {
    pub min: f64,
    pub max: f64,
}

impl AngleRange {
    #[inline]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.min <= self.max) {
            return Err(Error::InvalidConfig(format!(
                "{}: min {} exceeds max {}",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// "When |yaw| exceeds `yaw`, alpha may not exceed `alpha`"
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct YawPitchCoupling {
    /// Yaw magnitude above which the coupling applies (degrees)
    pub yaw: f64,
    /// Maximum hip pitch while coupled (degrees)
    pub alpha: f64,
}

/// Limit set for one leg type
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AngleConstraints {
    /// Leg-local yaw
    #[serde(default = "default_yaw")]
    pub yaw: AngleRange,
    /// Hip pitch
    #[serde(default = "default_alpha")]
    pub alpha: AngleRange,
    /// Knee
    #[serde(default = "default_beta")]
    pub beta: AngleRange,
    /// Ankle, ignored by the two-link model
    #[serde(default = "default_gamma")]
    pub gamma: Option<AngleRange>,
    /// Window for beta + gamma
    #[serde(default = "default_knee_ankle")]
    pub knee_ankle: Option<AngleRange>,
    /// Off by default; the cap must sit below `alpha.max` to have any effect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaw_pitch: Option<YawPitchCoupling>,
}

impl Default for AngleConstraints {
    fn default() -> Self {
        Self {
            yaw: default_yaw(),
            alpha: default_alpha(),
            beta: default_beta(),
            gamma: default_gamma(),
            knee_ankle: default_knee_ankle(),
            yaw_pitch: None,
        }
    }
}

fn default_yaw() -> AngleRange {
    AngleRange::new(-65.0, 65.0)
}
fn default_alpha() -> AngleRange {
    AngleRange::new(-35.0, 55.0)
}
fn default_beta() -> AngleRange {
    AngleRange::new(-115.0, -20.0)
}
fn default_gamma() -> Option<AngleRange> {
    Some(AngleRange::new(-110.0, 0.0))
}
fn default_knee_ankle() -> Option<AngleRange> {
    Some(AngleRange::new(-190.0, -90.0))
}

impl AngleConstraints {
    /// Check every range is ordered
    pub fn validate(&self, label: &str) -> Result<()> {
        self.yaw.validate(&format!("{label}.yaw"))?;
        self.alpha.validate(&format!("{label}.alpha"))?;
        self.beta.validate(&format!("{label}.beta"))?;
        if let Some(gamma) = &self.gamma {
            gamma.validate(&format!("{label}.gamma"))?;
        }
        if let Some(window) = &self.knee_ankle {
            window.validate(&format!("{label}.knee_ankle"))?;
        }
        if let Some(coupling) = &self.yaw_pitch
            && coupling.alpha >= self.alpha.max
        {
            return Err(Error::InvalidConfig(format!(
                "{label}.yaw_pitch: alpha cap {} must be below alpha.max {}",
                coupling.alpha, self.alpha.max
            )));
        }
        Ok(())
    }

    /// Yaw check, run before any planar solving
    pub fn check_yaw(&self, yaw_deg: f64) -> Result<()> {
        if self.yaw.contains(yaw_deg) {
            Ok(())
        } else {
            Err(Error::ConstraintViolated {
                joint: "yaw",
                value: yaw_deg,
            })
        }
    }

    /// Whether the yaw-vs-pitch coupling is active at this yaw
    pub fn is_coupled(&self, yaw_deg: f64) -> bool {
        self.yaw_pitch
            .map(|c| yaw_deg.abs() > c.yaw)
            .unwrap_or(false)
    }

    /// Planar joint check
    ///
    /// Returns the name and value of the first violated limit. `gamma_deg` is
    /// `None` for the two-link model.
    pub fn check_planar(
        &self,
        alpha_deg: f64,
        beta_deg: f64,
        gamma_deg: Option<f64>,
        coupled: bool,
    ) -> std::result::Result<(), (&'static str, f64)> {
        if !self.alpha.contains(alpha_deg) {
            return Err(("alpha", alpha_deg));
        }
        if coupled
            && let Some(coupling) = self.yaw_pitch
            && alpha_deg > coupling.alpha
        {
            return Err(("yaw_pitch", alpha_deg));
        }
        if !self.beta.contains(beta_deg) {
            return Err(("beta", beta_deg));
        }
        if let Some(gamma_deg) = gamma_deg {
            if let Some(range) = &self.gamma
                && !range.contains(gamma_deg)
            {
                return Err(("gamma", gamma_deg));
            }
            if let Some(window) = &self.knee_ankle
                && !window.contains(beta_deg + gamma_deg)
            {
                return Err(("knee_ankle", beta_deg + gamma_deg));
            }
        }
        Ok(())
    }
}

/// Front and rear limit sets
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct LegLimits {
    #[serde(default)]
    pub front: AngleConstraints,
    #[serde(default)]
    pub rear: AngleConstraints,
}

impl LegLimits {
    pub fn for_type(&self, leg_type: LegType) -> &AngleConstraints {
        match leg_type {
            LegType::Front => &self.front,
            LegType::Rear => &self.rear,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.front.validate("limits.front")?;
        self.rear.validate("limits.rear")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains_bounds() {
        let r = AngleRange::new(-10.0, 10.0);
        assert!(r.contains(-10.0));
        assert!(r.contains(10.0));
        assert!(!r.contains(10.01));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut c = AngleConstraints::default();
        assert!(c.validate("front").is_ok());
        c.beta = AngleRange::new(0.0, -10.0);
        match c.validate("front") {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("front.beta")),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_yaw_check() {
        let c = AngleConstraints::default();
        assert!(c.check_yaw(0.0).is_ok());
        assert!(c.check_yaw(65.0).is_ok());
        assert!(matches!(
            c.check_yaw(70.0),
            Err(Error::ConstraintViolated { joint: "yaw", .. })
        ));
    }

    #[test]
    fn test_default_has_no_coupling() {
        let c = AngleConstraints::default();
        assert_eq!(c.yaw_pitch, None);
        assert!(!c.is_coupled(60.0));
        assert!(!c.is_coupled(-60.0));
    }

    #[test]
    fn test_validate_rejects_inert_coupling() {
        let mut c = AngleConstraints::default();
        c.yaw_pitch = Some(YawPitchCoupling {
            yaw: 45.0,
            alpha: 75.0,
        });
        match c.validate("rear") {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("rear.yaw_pitch")),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }

        c.yaw_pitch = Some(YawPitchCoupling {
            yaw: 45.0,
            alpha: 40.0,
        });
        assert!(c.validate("rear").is_ok());
    }

    #[test]
    fn test_coupling() {
        let mut c = AngleConstraints::default();
        c.yaw_pitch = Some(YawPitchCoupling {
            yaw: 30.0,
            alpha: 20.0,
        });
        assert!(!c.is_coupled(30.0));
        assert!(c.is_coupled(-31.0));
        assert!(c.check_planar(25.0, -60.0, Some(-40.0), false).is_ok());
        assert_eq!(
            c.check_planar(25.0, -60.0, Some(-40.0), true),
            Err(("yaw_pitch", 25.0))
        );
    }

    #[test]
    fn test_planar_windows() {
        let c = AngleConstraints::default();
        assert_eq!(c.check_planar(60.0, -60.0, Some(-40.0), false), Err(("alpha", 60.0)));
        assert_eq!(c.check_planar(30.0, -10.0, Some(-40.0), false), Err(("beta", -10.0)));
        assert_eq!(c.check_planar(30.0, -60.0, Some(5.0), false), Err(("gamma", 5.0)));
        assert_eq!(
            c.check_planar(30.0, -100.0, Some(-100.0), false),
            Err(("knee_ankle", -200.0))
        );
        // gamma limits do not apply to the two-link model
        assert!(c.check_planar(30.0, -60.0, None, false).is_ok());
    }
}
