#![cfg_attr(not(test), no_std)]

//! heli_rig_controller - flight-control core for the tethered helicopter rig
//!
//! Everything in here is hardware independent and builds on the host. The
//! firmware binary (`firmware` feature) binds it to the STM32 peripherals.
//!
//! - `control`: fixed-point PID, altitude sample averager, quadrature yaw decoder
//! - `flight`: lifecycle state machine and the PID control loop
//! - `scheduler`: control gate on the sampling tick and the cooperative pacer
//! - `state`: the cross-context flight status snapshot
//! - `io`: actuator/sensor seams, input debouncers, telemetry lines

// Must stay first so the other modules see the logging macros.
mod fmt;

pub mod config;
pub mod control;
pub mod error;
pub mod flight;
pub mod io;
pub mod scheduler;
pub mod state;

pub use error::{CalibrationError, ConfigError};
pub use state::{FlightState, FlightStatus, SharedStatus};
