//! Rig tuning: rates, gains, steps and limits.
//!
//! Everything is fixed at compile time. The structs group the constants the way
//! the tasks consume them and validate the combinations that can go wrong.

use crate::error::ConfigError;

// ── Rates ─────────────────────────────────────────────────────────────────────

/// Sampling tick: one ADC conversion per tick (fastest rate in the system).
pub const SAMPLE_RATE_HZ: u32 = 300;
/// PID recomputation rate, divided from the sampling tick.
pub const CONTROLLER_RATE_HZ: u32 = 10;
/// Sampling ticks per PID recomputation.
pub const CONTROL_DIVIDER: u32 = SAMPLE_RATE_HZ / CONTROLLER_RATE_HZ;
/// Base rate of the cooperative main-loop pacer.
pub const PACER_RATE_HZ: u32 = 6000;
pub const ALTITUDE_AVERAGE_RATE_HZ: u32 = 600;
pub const DISPLAY_RATE_HZ: u32 = 100;
pub const FLIGHT_LOGIC_RATE_HZ: u32 = 200;
pub const TELEMETRY_RATE_HZ: u32 = 20;

// ── PID ───────────────────────────────────────────────────────────────────────

pub const ALT_KP: i32 = 15;
pub const ALT_KI: i32 = 40;
pub const ALT_KD: i32 = 0;
pub const YAW_KP: i32 = 80;
pub const YAW_KI: i32 = 120;
pub const YAW_KD: i32 = 0;

/// Gains are scaled up by this factor so they stay integers.
pub const CONTROLLER_RESPONSE_SCALE: i32 = 10;
/// Integrator bound in percent, before response scaling.
pub const MAX_ERROR_SUM: i32 = 100;

/// Duty cycle window the core ever commands while flying.
pub const DUTY_MIN_PERCENT: u8 = 5;
pub const DUTY_MAX_PERCENT: u8 = 85;

// ── Sensors ───────────────────────────────────────────────────────────────────

pub const SAMPLE_BUFFER_LEN: usize = 10;
/// ADC counts between ground level and full height.
pub const ALTITUDE_ADC_RANGE: i32 = 1500;

pub const YAW_TICKS_PER_REVOLUTION: u16 = 448;

// ── Calibration ───────────────────────────────────────────────────────────────

/// Tail duty while seeking the yaw reference.
pub const REFERENCE_SEEK_DUTY: u8 = 45;
pub const REFERENCE_POLL_INTERVAL_US: u32 = 100;
pub const REFERENCE_SEEK_TIMEOUT_MS: u32 = 10_000;

// ── Flight logic ──────────────────────────────────────────────────────────────

pub const HEIGHT_STEP: i16 = 10;
pub const YAW_STEP: i16 = 15;
pub const LANDING_HEIGHT_STEP: i16 = 6;
/// Yaw error (degrees) under which the landing descent may start.
pub const LANDING_YAW_TOLERANCE: i16 = 3;
/// Altitude (percent) under which the rig counts as landed.
pub const LANDED_HEIGHT: i16 = 2;

/// Gains and invocation rate for one PID loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidGains {
    pub kp: i32,
    pub ki: i32,
    pub kd: i32,
    /// Rate constant the gains were tuned against. The rig tuned against the
    /// control divider (sampling ticks per PID update), not the update rate in Hz.
    pub rate: i32,
}

impl PidGains {
    pub const ALTITUDE: Self = Self {
        kp: ALT_KP,
        ki: ALT_KI,
        kd: ALT_KD,
        rate: CONTROL_DIVIDER as i32,
    };

    pub const YAW: Self = Self {
        kp: YAW_KP,
        ki: YAW_KI,
        kd: YAW_KD,
        rate: CONTROL_DIVIDER as i32,
    };
}

/// Divider thresholds derived from [`SchedulerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dividers {
    /// Sampling ticks per control update.
    pub control: u32,
    pub altitude_average: u32,
    pub display: u32,
    pub flight_logic: u32,
    pub telemetry: u32,
}

/// Every rate in the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerConfig {
    pub sample_rate_hz: u32,
    pub controller_rate_hz: u32,
    pub pacer_rate_hz: u32,
    pub altitude_average_rate_hz: u32,
    pub display_rate_hz: u32,
    pub flight_logic_rate_hz: u32,
    pub telemetry_rate_hz: u32,
}

impl SchedulerConfig {
    pub const DEFAULT: Self = Self {
        sample_rate_hz: SAMPLE_RATE_HZ,
        controller_rate_hz: CONTROLLER_RATE_HZ,
        pacer_rate_hz: PACER_RATE_HZ,
        altitude_average_rate_hz: ALTITUDE_AVERAGE_RATE_HZ,
        display_rate_hz: DISPLAY_RATE_HZ,
        flight_logic_rate_hz: FLIGHT_LOGIC_RATE_HZ,
        telemetry_rate_hz: TELEMETRY_RATE_HZ,
    };

    /// Derive the divider thresholds, rejecting zero and over-fast rates.
    pub fn dividers(&self) -> Result<Dividers, ConfigError> {
        Ok(Dividers {
            control: divider(self.sample_rate_hz, self.controller_rate_hz)?,
            altitude_average: divider(self.pacer_rate_hz, self.altitude_average_rate_hz)?,
            display: divider(self.pacer_rate_hz, self.display_rate_hz)?,
            flight_logic: divider(self.pacer_rate_hz, self.flight_logic_rate_hz)?,
            telemetry: divider(self.pacer_rate_hz, self.telemetry_rate_hz)?,
        })
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn divider(base_hz: u32, rate_hz: u32) -> Result<u32, ConfigError> {
    if base_hz == 0 || rate_hz == 0 {
        return Err(ConfigError::ZeroRate);
    }
    if rate_hz > base_hz {
        return Err(ConfigError::RateAboveBase { rate_hz, base_hz });
    }
    Ok(base_hz / rate_hz)
}

/// Bounds on the blocking yaw reference seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationConfig {
    pub seek_duty: u8,
    pub poll_interval_us: u32,
    pub timeout_ms: u32,
}

impl CalibrationConfig {
    pub const DEFAULT: Self = Self {
        seek_duty: REFERENCE_SEEK_DUTY,
        poll_interval_us: REFERENCE_POLL_INTERVAL_US,
        timeout_ms: REFERENCE_SEEK_TIMEOUT_MS,
    };

    /// Number of reference polls that fit in the timeout (at least one).
    pub fn max_polls(&self) -> u32 {
        let interval = self.poll_interval_us.max(1);
        (self.timeout_ms.saturating_mul(1000) / interval).max(1)
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Steps and thresholds used by the lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlightConfig {
    pub height_step: i16,
    pub yaw_step: i16,
    pub landing_height_step: i16,
    pub landing_yaw_tolerance: i16,
    pub landed_height: i16,
}

impl FlightConfig {
    pub const DEFAULT: Self = Self {
        height_step: HEIGHT_STEP,
        yaw_step: YAW_STEP,
        landing_height_step: LANDING_HEIGHT_STEP,
        landing_yaw_tolerance: LANDING_YAW_TOLERANCE,
        landed_height: LANDED_HEIGHT,
    };
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
