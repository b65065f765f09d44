//! Fixed-point PID engine.
//!
//! Gains are integers pre-multiplied by [`CONTROLLER_RESPONSE_SCALE`]; the
//! response comes back in the same scale and the caller divides it down to a
//! duty cycle. All arithmetic saturates.

use crate::config::{PidGains, CONTROLLER_RESPONSE_SCALE, MAX_ERROR_SUM};
use crate::error::ConfigError;

/// Integrator bound in response scale.
pub const MAX_ACCUMULATED_ERROR: i32 = MAX_ERROR_SUM * CONTROLLER_RESPONSE_SCALE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidController {
    kp: i32,
    ki: i32,
    kd: i32,
    rate: i32,
    accumulated_error: i32,
    previous_error: i32,
}

impl PidController {
    /// Zero rate is rejected: it divides the integral term.
    pub fn new(rate: i32, kp: i32, ki: i32, kd: i32) -> Result<Self, ConfigError> {
        if rate == 0 {
            return Err(ConfigError::ZeroPidRate);
        }
        Ok(Self {
            kp,
            ki,
            kd,
            rate,
            accumulated_error: 0,
            previous_error: 0,
        })
    }

    pub fn from_gains(gains: PidGains) -> Result<Self, ConfigError> {
        Self::new(gains.rate, gains.kp, gains.ki, gains.kd)
    }

    /// Compute the scaled response for one control tick.
    pub fn update(&mut self, error: i32) -> i32 {
        let proportional = self.kp.saturating_mul(error);

        let tentative = self.accumulated_error.saturating_add(error);
        self.accumulated_error = tentative.clamp(-MAX_ACCUMULATED_ERROR, MAX_ACCUMULATED_ERROR);
        // Factor of two kept from the tuned rig.
        let integral = self
            .ki
            .saturating_mul(self.accumulated_error)
            / self.rate.saturating_mul(2);

        let derivative = self
            .kd
            .saturating_mul(error.saturating_sub(self.previous_error))
            .saturating_mul(self.rate);
        self.previous_error = error;

        proportional.saturating_add(integral).saturating_add(derivative)
    }

    pub fn accumulated_error(&self) -> i32 {
        self.accumulated_error
    }

    pub fn previous_error(&self) -> i32 {
        self.previous_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A zero invocation rate fails at construction.
    #[test]
    fn test_pid_zero_rate_rejected() {
        assert_eq!(PidController::new(0, 1, 1, 1), Err(ConfigError::ZeroPidRate));
    }

    /// Zero error from a fresh controller never drifts away from zero.
    #[test]
    fn test_pid_zero_error_no_drift() {
        let mut pid = PidController::new(30, 15, 40, 7).unwrap();
        for _ in 0..100 {
            assert_eq!(pid.update(0), 0, "Response to zero error should be zero.");
        }
        assert_eq!(pid.accumulated_error(), 0);
    }

    /// Constant error accumulates by the error each tick and the response rises.
    #[test]
    fn test_pid_constant_error_accumulates() {
        let mut pid = PidController::new(10, 15, 40, 0).unwrap();
        let mut last = i32::MIN;
        for tick in 1..=5 {
            let response = pid.update(10);
            assert_eq!(
                pid.accumulated_error(),
                10 * tick,
                "Accumulator should grow by the error each tick."
            );
            // 15 * 10 + 40 * acc / 20
            assert_eq!(response, 150 + 2 * 10 * tick);
            assert!(response > last, "Response should strictly increase.");
            last = response;
        }
    }

    /// The accumulator clamps at the bound in both directions.
    #[test]
    fn test_pid_integral_clamping() {
        let mut pid = PidController::new(30, 0, 1, 0).unwrap();
        for _ in 0..50 {
            pid.update(100);
            assert!(pid.accumulated_error() <= MAX_ACCUMULATED_ERROR);
        }
        assert_eq!(
            pid.accumulated_error(),
            MAX_ACCUMULATED_ERROR,
            "Accumulator should be clamped to the bound."
        );

        for _ in 0..50 {
            pid.update(-250);
            assert!(pid.accumulated_error() >= -MAX_ACCUMULATED_ERROR);
        }
        assert_eq!(pid.accumulated_error(), -MAX_ACCUMULATED_ERROR);

        // Once clamped, an error back toward zero unwinds immediately.
        pid.update(5);
        assert_eq!(pid.accumulated_error(), -MAX_ACCUMULATED_ERROR + 5);
    }

    /// Derivative scales the error step by the rate and tracks the previous error.
    #[test]
    fn test_pid_derivative_term() {
        let mut pid = PidController::new(10, 0, 0, 2).unwrap();
        assert_eq!(pid.update(5), 2 * 5 * 10);
        assert_eq!(pid.previous_error(), 5);
        assert_eq!(pid.update(5), 0, "No change in error, no derivative.");
        assert_eq!(pid.update(2), 2 * -3 * 10);
    }

    /// Extreme inputs saturate instead of overflowing.
    #[test]
    fn test_pid_saturates() {
        let mut pid = PidController::new(1, i32::MAX, 0, i32::MAX).unwrap();
        assert_eq!(pid.update(i32::MAX), i32::MAX);
        let mut pid = PidController::new(1, i32::MAX, 0, 0).unwrap();
        assert_eq!(pid.update(i32::MIN), i32::MIN);
    }
}
