//! Multi-phase trot state machine.
//!
//! A held walking command arrives as a stream of identical command events.
//! The forwarder turns that stream into alternating half-steps so the caller
//! never tracks the phase:
//!
//! ```text
//! idle    --G--> phase-1   pair 1-3 by F
//! phase-1 --G--> phase-2   pair 2-4 by 2F
//! phase-2 --G--> phase-1   pair 1-3 by 2F
//! phase-1 --*--> idle      pair 2-4 by F
//! phase-2 --*--> idle      pair 1-3 by F
//! ```

use super::primitives::DiagonalPair;

/// Pacing of a trot: same primitive, different stride, lift and speed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrotPace {
    Walk,
    Run,
}

/// Trot gaits: a direction at a pace
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrotGait {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    RunForward,
    RunBackward,
    RunLeft,
    RunRight,
}

impl TrotGait {
    /// Unit step direction (x, y)
    pub fn direction(self) -> (f64, f64) {
        match self {
            TrotGait::Forward | TrotGait::RunForward => (0.0, 1.0),
            TrotGait::Backward | TrotGait::RunBackward => (0.0, -1.0),
            TrotGait::StrafeLeft | TrotGait::RunLeft => (-1.0, 0.0),
            TrotGait::StrafeRight | TrotGait::RunRight => (1.0, 0.0),
        }
    }

    pub fn pace(self) -> TrotPace {
        match self {
            TrotGait::Forward
            | TrotGait::Backward
            | TrotGait::StrafeLeft
            | TrotGait::StrafeRight => TrotPace::Walk,
            TrotGait::RunForward
            | TrotGait::RunBackward
            | TrotGait::RunLeft
            | TrotGait::RunRight => TrotPace::Run,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GaitPhase {
    Idle,
    PhaseOne,
    PhaseTwo,
}

/// One half-step to execute: which pair swings and by how many base steps
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrotStep {
    pub gait: TrotGait,
    pub pair: DiagonalPair,
    /// Multiple of the configured step length (1 or 2)
    pub scale: f64,
}

impl TrotStep {
    /// Step delta for a base step length
    pub fn delta(&self, step: f64) -> (f64, f64) {
        let (ux, uy) = self.gait.direction();
        (ux * step * self.scale, uy * step * self.scale)
    }
}

/// Phase tracker; at most one gait is out of idle at a time
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Forwarder {
    active: Option<(TrotGait, GaitPhase)>,
}

impl Forwarder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase of a given gait
    pub fn phase(&self, gait: TrotGait) -> GaitPhase {
        match self.active {
            Some((active, phase)) if active == gait => phase,
            _ => GaitPhase::Idle,
        }
    }

    /// Gait currently out of idle, if any
    pub fn active(&self) -> Option<TrotGait> {
        self.active.map(|(gait, _)| gait)
    }

    /// Step that takes the active gait back to idle, if one is active
    pub fn exit(&mut self) -> Option<TrotStep> {
        let (gait, phase) = self.active.take()?;
        let pair = match phase {
            GaitPhase::PhaseOne => DiagonalPair::TwoFour,
            GaitPhase::PhaseTwo => DiagonalPair::OneThree,
            GaitPhase::Idle => return None,
        };
        Some(TrotStep {
            gait,
            pair,
            scale: 1.0,
        })
    }

    /// Steps for a receipt of `gait`
    ///
    /// A different active gait is exited first, so this yields one or two
    /// steps.
    pub fn advance(&mut self, gait: TrotGait) -> Vec<TrotStep> {
        let mut steps = Vec::with_capacity(2);
        if self.active().is_some_and(|active| active != gait) {
            steps.extend(self.exit());
        }
        let (next, pair, scale) = match self.phase(gait) {
            GaitPhase::Idle => (GaitPhase::PhaseOne, DiagonalPair::OneThree, 1.0),
            GaitPhase::PhaseOne => (GaitPhase::PhaseTwo, DiagonalPair::TwoFour, 2.0),
            GaitPhase::PhaseTwo => (GaitPhase::PhaseOne, DiagonalPair::OneThree, 2.0),
        };
        self.active = Some((gait, next));
        steps.push(TrotStep { gait, pair, scale });
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_gait_alternates_phases() {
        let mut f = Forwarder::new();
        let g = TrotGait::Forward;

        let s = f.advance(g);
        assert_eq!(s.len(), 1);
        assert_eq!((s[0].pair, s[0].scale), (DiagonalPair::OneThree, 1.0));
        assert_eq!(f.phase(g), GaitPhase::PhaseOne);

        let s = f.advance(g);
        assert_eq!((s[0].pair, s[0].scale), (DiagonalPair::TwoFour, 2.0));
        assert_eq!(f.phase(g), GaitPhase::PhaseTwo);

        let s = f.advance(g);
        assert_eq!((s[0].pair, s[0].scale), (DiagonalPair::OneThree, 2.0));
        assert_eq!(f.phase(g), GaitPhase::PhaseOne);

        let exit = f.exit().unwrap();
        assert_eq!((exit.pair, exit.scale), (DiagonalPair::TwoFour, 1.0));
        assert_eq!(f.phase(g), GaitPhase::Idle);
        assert!(f.exit().is_none());
    }

    #[test]
    fn test_exit_from_phase_two() {
        let mut f = Forwarder::new();
        f.advance(TrotGait::Backward);
        f.advance(TrotGait::Backward);
        let exit = f.exit().unwrap();
        assert_eq!(exit.pair, DiagonalPair::OneThree);
        assert_eq!(exit.delta(4.0), (0.0, -4.0));
    }

    #[test]
    fn test_switching_gait_exits_first() {
        let mut f = Forwarder::new();
        f.advance(TrotGait::Forward);
        let steps = f.advance(TrotGait::StrafeRight);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].gait, TrotGait::Forward);
        assert_eq!(steps[0].pair, DiagonalPair::TwoFour);
        assert_eq!(steps[1].gait, TrotGait::StrafeRight);
        assert_eq!(steps[1].delta(4.0), (4.0, 0.0));
        assert_eq!(f.phase(TrotGait::Forward), GaitPhase::Idle);
        assert_eq!(f.phase(TrotGait::StrafeRight), GaitPhase::PhaseOne);
    }

    #[test]
    fn test_walk_to_run_exits_walk() {
        let mut f = Forwarder::new();
        f.advance(TrotGait::Forward);
        f.advance(TrotGait::Forward);
        let steps = f.advance(TrotGait::RunForward);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].gait.pace(), TrotPace::Walk);
        assert_eq!(steps[0].pair, DiagonalPair::OneThree);
        assert_eq!(steps[1].gait.pace(), TrotPace::Run);
        assert_eq!(steps[1].delta(5.0), (0.0, 5.0));
        assert_eq!(f.active(), Some(TrotGait::RunForward));
    }
}
