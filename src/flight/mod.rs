//! Flight logic: the lifecycle state machine and the closed loop it gates.

pub mod control;
pub mod lifecycle;

pub use control::{duty_from_response, ControlLoop};
pub use lifecycle::FlightLifecycle;
