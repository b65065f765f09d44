//! Rate dividers for the two scheduling contexts.
//!
//! The sampling tick owns a [`ControlGate`] that releases the lower-priority
//! control task every `CONTROL_DIVIDER` ticks while airborne. The main loop runs
//! a [`Pacer`]: four counters off one base tick, fired cooperatively in a fixed
//! order.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use heapless::Vec;

use crate::config::Dividers;
use crate::state::FlightState;

/// Fires once every `threshold` polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDivider {
    threshold: u32,
    count: u32,
}

impl RateDivider {
    pub const fn new(threshold: u32) -> Self {
        Self {
            threshold,
            count: 0,
        }
    }

    /// Check the counter, reset it if due, then count this poll.
    pub fn poll(&mut self) -> bool {
        let due = self.count >= self.threshold;
        if due {
            self.count = 0;
        }
        self.count = self.count.saturating_add(1);
        due
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

// ── Control gate ──────────────────────────────────────────────────────────────

/// Slow sub-counter on the sampling tick.
///
/// Only the sampling task calls [`ControlGate::on_sample_tick`]. The gate starts
/// suspended and stays frozen until the first yaw calibration succeeds.
pub struct ControlGate {
    divider: u32,
    counter: AtomicU32,
    suspended: AtomicBool,
}

impl ControlGate {
    pub const fn new(divider: u32) -> Self {
        Self {
            divider,
            counter: AtomicU32::new(0),
            suspended: AtomicBool::new(true),
        }
    }

    /// Returns true when the control task should run for this tick.
    pub fn on_sample_tick(&self, state: FlightState) -> bool {
        if self.suspended.load(Ordering::Acquire) {
            return false;
        }
        let count = self.counter.load(Ordering::Relaxed);
        let fire = count >= self.divider && state.control_enabled();
        let next = if fire { 1 } else { count.saturating_add(1) };
        self.counter.store(next, Ordering::Relaxed);
        fire
    }

    pub fn suspend(&self) {
        self.suspended.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.suspended.store(false, Ordering::Release);
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Acquire)
    }
}

// ── Pacer ─────────────────────────────────────────────────────────────────────

/// Main-loop jobs, in the order the pacer checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacerTask {
    AltitudeAverage,
    Display,
    FlightLogic,
    Telemetry,
}

pub struct Pacer {
    altitude_average: RateDivider,
    display: RateDivider,
    flight_logic: RateDivider,
    telemetry: RateDivider,
}

impl Pacer {
    pub fn new(dividers: &Dividers) -> Self {
        debug!(
            "pacer dividers: altitude {} display {} logic {} telemetry {}",
            dividers.altitude_average,
            dividers.display,
            dividers.flight_logic,
            dividers.telemetry
        );
        Self {
            altitude_average: RateDivider::new(dividers.altitude_average),
            display: RateDivider::new(dividers.display),
            flight_logic: RateDivider::new(dividers.flight_logic),
            telemetry: RateDivider::new(dividers.telemetry),
        }
    }

    /// One base tick. Returns the due jobs in execution order; the caller runs
    /// each to completion before starting the next.
    pub fn poll(&mut self) -> Vec<PacerTask, 4> {
        let mut due = Vec::new();
        let slots = [
            (&mut self.altitude_average, PacerTask::AltitudeAverage),
            (&mut self.display, PacerTask::Display),
            (&mut self.flight_logic, PacerTask::FlightLogic),
            (&mut self.telemetry, PacerTask::Telemetry),
        ];
        for (divider, task) in slots {
            if divider.poll() {
                // Four slots, four tasks: cannot overflow.
                let _ = due.push(task);
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use std::vec::Vec as StdVec;

    /// First fire after `threshold + 1` polls, then every `threshold`.
    #[test]
    fn test_rate_divider_period() {
        let mut d = RateDivider::new(3);
        let fired: StdVec<usize> = (0..12).filter(|_| d.poll()).collect();
        assert_eq!(fired, [3, 6, 9]);
    }

    /// The gate fires every divider ticks while flying.
    #[test]
    fn test_control_gate_fires_on_divider() {
        let gate = ControlGate::new(30);
        gate.resume();
        let fired: StdVec<usize> = (0..100)
            .filter(|_| gate.on_sample_tick(FlightState::Flying))
            .collect();
        assert_eq!(fired, [30, 60, 90]);
    }

    /// A new gate is frozen: it neither counts nor fires until resumed.
    #[test]
    fn test_control_gate_starts_suspended() {
        let gate = ControlGate::new(5);
        assert!(gate.is_suspended());
        for _ in 0..20 {
            assert!(!gate.on_sample_tick(FlightState::Flying));
        }
        gate.resume();
        let fired: StdVec<usize> = (0..11)
            .filter(|_| gate.on_sample_tick(FlightState::Flying))
            .collect();
        assert_eq!(fired, [5, 10], "First release waits a full period after resume.");
    }

    /// Grounded states never release the control task.
    #[test]
    fn test_control_gate_closed_on_ground() {
        let gate = ControlGate::new(5);
        gate.resume();
        for state in [
            FlightState::Startup,
            FlightState::Landed,
            FlightState::Calibrating,
        ] {
            for _ in 0..20 {
                assert!(!gate.on_sample_tick(state), "{:?} must not run the PID", state);
            }
        }
        // The counter kept running, so the first airborne tick fires at once.
        assert!(gate.on_sample_tick(FlightState::Landing));
    }

    /// A suspended gate neither counts nor fires.
    #[test]
    fn test_control_gate_suspend() {
        let gate = ControlGate::new(2);
        gate.suspend();
        assert!(gate.is_suspended());
        for _ in 0..10 {
            assert!(!gate.on_sample_tick(FlightState::Flying));
        }
        gate.resume();
        assert!(!gate.on_sample_tick(FlightState::Flying));
        assert!(!gate.on_sample_tick(FlightState::Flying));
        assert!(gate.on_sample_tick(FlightState::Flying), "Counting restarts after resume.");
    }

    /// Due jobs come back in check order and at their own rates.
    #[test]
    fn test_pacer_order_and_rates() {
        let dividers = SchedulerConfig::DEFAULT.dividers().unwrap();
        let mut pacer = Pacer::new(&dividers);
        let mut counts = [0usize; 4];
        let mut saw_all_together = false;

        for _ in 0..6000 {
            let due = pacer.poll();
            for pair in due.windows(2) {
                assert!(
                    (pair[0] as u8) < (pair[1] as u8),
                    "Jobs must come back in check order."
                );
            }
            if due.len() == 4 {
                saw_all_together = true;
            }
            for task in due {
                counts[task as usize] += 1;
            }
        }

        // Thresholds 10 / 60 / 30 / 300 over 6000 base ticks.
        assert_eq!(counts, [599, 99, 199, 19]);
        assert!(saw_all_together, "All four share a tick every 300 polls.");
    }
}
