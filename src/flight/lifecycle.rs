//! Flight lifecycle state machine.
//!
//! Ticked by the pacer at the flight-logic rate. Each state has its own
//! transition function; CALIBRATING runs the blocking reference seek and, on
//! success, hands the same tick on to FLYING.

use crate::config::FlightConfig;
use crate::control::shortest_yaw_error;
use crate::error::CalibrationError;
use crate::io::{OperatorInput, Rotor, Rotors};
use crate::scheduler::ControlGate;
use crate::state::{DutyCycles, FlightState, FlightStatus, Readings, Setpoints};

const MAX_HEIGHT: i16 = 100;
const FULL_TURN: i16 = 360;

pub struct FlightLifecycle {
    state: FlightState,
    targets: Setpoints,
    is_calibrated: bool,
    config: FlightConfig,
}

impl FlightLifecycle {
    pub const fn new(config: FlightConfig) -> Self {
        Self {
            state: FlightState::Startup,
            targets: Setpoints { height: 0, yaw: 0 },
            is_calibrated: false,
            config,
        }
    }

    pub fn state(&self) -> FlightState {
        self.state
    }

    pub fn targets(&self) -> Setpoints {
        self.targets
    }

    pub fn is_calibrated(&self) -> bool {
        self.is_calibrated
    }

    /// The next tick runs the blocking reference seek.
    pub fn calibration_pending(&self) -> bool {
        self.state == FlightState::Calibrating
    }

    /// Advance one lifecycle tick.
    ///
    /// `calibrate` runs the yaw reference seek; it is only called from
    /// CALIBRATING, with the control gate suspended. The gate stays suspended
    /// until a seek succeeds.
    pub fn tick<R, C>(
        &mut self,
        input: OperatorInput,
        readings: Readings,
        rotors: &mut R,
        gate: &ControlGate,
        calibrate: C,
    ) -> FlightState
    where
        R: Rotors + ?Sized,
        C: FnOnce(&mut R) -> Result<u32, CalibrationError>,
    {
        let previous = self.state;
        self.state = match previous {
            FlightState::Startup => self.on_startup(input, rotors),
            FlightState::Landed => self.on_landed(input, rotors),
            FlightState::Calibrating => self.on_calibrating(input, rotors, gate, calibrate),
            FlightState::Flying => self.on_flying(input),
            FlightState::Landing => self.on_landing(readings, rotors),
        };
        if self.state != previous {
            info!("flight state {} -> {}", previous.as_str(), self.state.as_str());
        }
        self.state
    }

    /// Publish state and targets. Grounded states also zero the duty record.
    pub fn publish(&self, status: &mut FlightStatus) {
        status.state = self.state;
        status.targets = self.targets;
        if !self.state.control_enabled() {
            status.duty = DutyCycles::ZERO;
        }
    }

    // ── Per-state transitions ─────────────────────────────────────────────────

    fn on_startup<R: Rotors + ?Sized>(&mut self, input: OperatorInput, rotors: &mut R) -> FlightState {
        ground(rotors);
        // Refuse to arm with the switch already up at power-on.
        if input.flight_mode {
            FlightState::Startup
        } else {
            FlightState::Landed
        }
    }

    fn on_landed<R: Rotors + ?Sized>(&mut self, input: OperatorInput, rotors: &mut R) -> FlightState {
        ground(rotors);
        if !input.flight_mode {
            return FlightState::Landed;
        }
        rotors.enable_outputs();
        if self.is_calibrated {
            FlightState::Flying
        } else {
            FlightState::Calibrating
        }
    }

    fn on_calibrating<R, C>(
        &mut self,
        input: OperatorInput,
        rotors: &mut R,
        gate: &ControlGate,
        calibrate: C,
    ) -> FlightState
    where
        R: Rotors + ?Sized,
        C: FnOnce(&mut R) -> Result<u32, CalibrationError>,
    {
        rotors.enable_outputs();
        gate.suspend();
        let result = calibrate(&mut *rotors);

        match result {
            Ok(_) => {
                gate.resume();
                self.is_calibrated = true;
                self.on_flying(input)
            }
            Err(e) => {
                warn!("calibration failed: {}", e);
                ground(rotors);
                FlightState::Landed
            }
        }
    }

    fn on_flying(&mut self, input: OperatorInput) -> FlightState {
        let step = self.config.height_step;
        if input.up {
            self.targets.height = (self.targets.height + step).min(MAX_HEIGHT);
        }
        if input.down {
            self.targets.height = (self.targets.height - step).max(0);
        }

        let step = self.config.yaw_step;
        if input.right {
            self.targets.yaw = (self.targets.yaw + step).rem_euclid(FULL_TURN);
        }
        if input.left {
            self.targets.yaw = (self.targets.yaw - step).rem_euclid(FULL_TURN);
        }

        if input.flight_mode {
            FlightState::Flying
        } else {
            FlightState::Landing
        }
    }

    fn on_landing<R: Rotors + ?Sized>(&mut self, readings: Readings, rotors: &mut R) -> FlightState {
        self.targets.yaw = 0;
        let yaw_error = shortest_yaw_error(readings.yaw, self.targets.yaw);
        if yaw_error.abs() < self.config.landing_yaw_tolerance {
            self.targets.height = (self.targets.height - self.config.landing_height_step).max(0);
        }

        if readings.height < self.config.landed_height {
            ground(rotors);
            FlightState::Landed
        } else {
            FlightState::Landing
        }
    }
}

impl Default for FlightLifecycle {
    fn default() -> Self {
        Self::new(FlightConfig::DEFAULT)
    }
}

/// Stop both rotors and cut the outputs.
fn ground<R: Rotors + ?Sized>(rotors: &mut R) {
    rotors.set_duty_cycle(Rotor::Main, 0);
    rotors.set_duty_cycle(Rotor::Tail, 0);
    rotors.disable_outputs();
}
