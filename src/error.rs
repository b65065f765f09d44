//! Error types for configuration and calibration failures.
//!
//! The rig is a closed control system: sensor anomalies, windup and missed
//! encoder edges are handled structurally and never surface here. What is left
//! is misconfiguration (caught at boot) and the reference seek timing out.

use core::fmt;

/// Rejected configuration, raised before any control loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A PID controller was given an invocation rate of zero.
    ZeroPidRate,
    /// A scheduler rate was zero.
    ZeroRate,
    /// A divided rate is faster than the tick it is divided from.
    RateAboveBase { rate_hz: u32, base_hz: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPidRate => f.write_str("PID invocation rate must be non-zero"),
            Self::ZeroRate => f.write_str("scheduler rate must be non-zero"),
            Self::RateAboveBase { rate_hz, base_hz } => {
                write!(f, "rate {} Hz exceeds base tick {} Hz", rate_hz, base_hz)
            }
        }
    }
}

/// Failure of the yaw reference seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// The reference sensor never reported home within the poll budget.
    Timeout { polls: u32 },
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { polls } => {
                write!(f, "yaw reference not found after {} polls", polls)
            }
        }
    }
}
