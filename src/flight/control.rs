use crate::config::{PidGains, CONTROLLER_RESPONSE_SCALE, DUTY_MAX_PERCENT, DUTY_MIN_PERCENT};
use crate::control::{shortest_yaw_error, PidController};
use crate::error::ConfigError;
use crate::io::{Rotor, Rotors};
use crate::state::{DutyCycles, Readings, Setpoints};

/// Scale a PID response down to percent and clamp it to the flying window.
pub fn duty_from_response(response: i32) -> u8 {
    let percent = response / CONTROLLER_RESPONSE_SCALE;
    percent.clamp(DUTY_MIN_PERCENT as i32, DUTY_MAX_PERCENT as i32) as u8
}

/// Altitude loop on the main rotor, yaw loop on the tail.
#[derive(Debug, Clone)]
pub struct ControlLoop {
    altitude: PidController,
    yaw: PidController,
}

impl ControlLoop {
    pub fn new(altitude: PidGains, yaw: PidGains) -> Result<Self, ConfigError> {
        debug!(
            "control gains: altitude {}/{}/{} yaw {}/{}/{} rate {}",
            altitude.kp,
            altitude.ki,
            altitude.kd,
            yaw.kp,
            yaw.ki,
            yaw.kd,
            altitude.rate
        );
        Ok(Self {
            altitude: PidController::from_gains(altitude)?,
            yaw: PidController::from_gains(yaw)?,
        })
    }

    /// One control tick.
    pub fn update(&mut self, targets: Setpoints, readings: Readings) -> DutyCycles {
        let height_error = targets.height as i32 - readings.height as i32;
        let yaw_error = shortest_yaw_error(readings.yaw, targets.yaw) as i32;

        DutyCycles {
            main: duty_from_response(self.altitude.update(height_error)),
            tail: duty_from_response(self.yaw.update(yaw_error)),
        }
    }

    /// Run one tick and write both duty cycles.
    pub fn drive<R>(&mut self, targets: Setpoints, readings: Readings, rotors: &mut R) -> DutyCycles
    where
        R: Rotors + ?Sized,
    {
        let duty = self.update(targets, readings);
        rotors.set_duty_cycle(Rotor::Main, duty.main);
        rotors.set_duty_cycle(Rotor::Tail, duty.tail);
        duty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::mock::{MockRotors, RotorEvent};

    fn rig_loop() -> ControlLoop {
        ControlLoop::new(PidGains::ALTITUDE, PidGains::YAW).unwrap()
    }

    /// Responses are scaled down and held inside [5, 85].
    #[test]
    fn test_duty_from_response_clamps() {
        assert_eq!(duty_from_response(0), 5);
        assert_eq!(duty_from_response(-4000), 5);
        assert_eq!(duty_from_response(313), 31);
        assert_eq!(duty_from_response(849), 84);
        assert_eq!(duty_from_response(10_000), 85);
    }

    /// First tick from rest against known setpoints.
    #[test]
    fn test_first_tick_duty() {
        let mut control = rig_loop();
        let duty = control.update(
            Setpoints { height: 20, yaw: 10 },
            Readings { height: 0, yaw: 0 },
        );
        // Altitude: 15*20 + 40*20/60 = 313. Yaw: 80*10 + 120*10/60 = 820.
        assert_eq!(duty, DutyCycles { main: 31, tail: 82 });
    }

    /// A target just across zero is a small negative error, not a big positive one.
    #[test]
    fn test_yaw_loop_uses_short_way() {
        let mut control = rig_loop();
        let duty = control.update(
            Setpoints { height: 0, yaw: 350 },
            Readings { height: 0, yaw: 0 },
        );
        assert_eq!(duty.tail, 5, "Negative response clamps to the floor.");
    }

    /// Drive writes main then tail.
    #[test]
    fn test_drive_writes_both_rotors() {
        let mut control = rig_loop();
        let mut rotors = MockRotors::default();
        let duty = control.drive(
            Setpoints { height: 20, yaw: 10 },
            Readings { height: 0, yaw: 0 },
            &mut rotors,
        );
        assert_eq!(
            rotors.events,
            [
                RotorEvent::Duty(Rotor::Main, duty.main),
                RotorEvent::Duty(Rotor::Tail, duty.tail),
            ]
        );
    }

    /// A zero rate in either loop is refused.
    #[test]
    fn test_zero_rate_rejected() {
        let bad = PidGains {
            rate: 0,
            ..PidGains::YAW
        };
        assert_eq!(
            ControlLoop::new(PidGains::ALTITUDE, bad).unwrap_err(),
            ConfigError::ZeroPidRate
        );
    }
}
