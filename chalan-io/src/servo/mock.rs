//! Mock servo bus for hardware-free runs and tests
//!
//! Every read moves each servo a fixed fraction of its remaining distance to
//! the last issued pose. The bus can be scripted to stop moving a number of
//! reads after each issue, which is how a servo stuck under load looks from
//! the outside. Clones share state, so a test can keep a handle while the
//! command loop owns the bus.

use super::ServoBus;
use crate::error::Result;
use log::{debug, info};
use pada_kine::ServoPose;
use parking_lot::Mutex;
use std::sync::Arc;

const DEFAULT_FRACTION: f64 = 0.6;

#[derive(Debug)]
struct MockState {
    current: ServoPose,
    target: ServoPose,
    fraction: f64,
    stall_after: Option<usize>,
    reads_since_issue: usize,
    torque: bool,
    issued: Vec<(ServoPose, u32)>,
    torque_events: Vec<bool>,
}

/// Simulated servo bus
#[derive(Clone, Debug)]
pub struct MockServoBus {
    state: Arc<Mutex<MockState>>,
}

impl MockServoBus {
    /// Bus with servos resting at `initial`, torque on
    pub fn new(initial: ServoPose) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                current: initial,
                target: initial,
                fraction: DEFAULT_FRACTION,
                stall_after: None,
                reads_since_issue: 0,
                torque: true,
                issued: Vec::new(),
                torque_events: Vec::new(),
            })),
        }
    }

    /// Share of the remaining distance covered per read, clamped to (0, 1]
    pub fn set_fraction(&mut self, fraction: f64) {
        self.state.lock().fraction = fraction.clamp(f64::EPSILON, 1.0);
    }

    /// Stop moving after `reads` reads following each issue; `None` never stalls
    pub fn stall_after(&mut self, reads: Option<usize>) {
        self.state.lock().stall_after = reads;
    }

    /// Every `(pose, rate)` issued so far
    pub fn issued(&self) -> Vec<(ServoPose, u32)> {
        self.state.lock().issued.clone()
    }

    /// Torque switches in order; `false` for disable
    pub fn torque_events(&self) -> Vec<bool> {
        self.state.lock().torque_events.clone()
    }

    pub fn torque_enabled(&self) -> bool {
        self.state.lock().torque
    }

    /// Current servo angles without advancing the simulation
    pub fn peek(&self) -> ServoPose {
        self.state.lock().current
    }
}

impl Default for MockServoBus {
    fn default() -> Self {
        Self::new(ServoPose::default())
    }
}

impl ServoBus for MockServoBus {
    fn current_angles(&mut self) -> Result<ServoPose> {
        let mut state = self.state.lock();
        state.reads_since_issue += 1;
        let stalled = state
            .stall_after
            .is_some_and(|reads| state.reads_since_issue > reads);

        if state.torque && !stalled {
            let step = state.target.minus(&state.current);
            let fraction = state.fraction;
            let mut next = state.current.0;
            for (value, delta) in next.iter_mut().zip(step.0.iter()) {
                *value += delta * fraction;
            }
            state.current = ServoPose(next);
        }
        Ok(state.current)
    }

    fn issue(&mut self, pose: &ServoPose, rate: u32) -> Result<()> {
        let mut state = self.state.lock();
        debug!("Mock bus: pose issued at rate {}", rate);
        state.target = *pose;
        state.reads_since_issue = 0;
        state.issued.push((*pose, rate));
        Ok(())
    }

    fn disable_torque(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        info!("Mock bus: torque disabled");
        state.torque = false;
        state.torque_events.push(false);
        Ok(())
    }

    fn enable_torque(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        info!("Mock bus: torque enabled");
        state.torque = true;
        state.target = state.current;
        state.torque_events.push(true);
        Ok(())
    }
}
