use embassy_executor::task;

use heli_rig_controller::flight::ControlLoop;
use heli_rig_controller::io::SharedRotors;
use heli_rig_controller::state::Readings;

use crate::drivers::PwmRotors;
use crate::{CONTROL_SIGNAL, STATUS, YAW};

/// PID update, medium priority. Released by the sampling gate at 10 Hz.
#[task]
pub async fn control_task(mut control: ControlLoop, rotors: &'static SharedRotors<PwmRotors>) {
    let mut rotors = rotors;

    loop {
        CONTROL_SIGNAL.wait().await;

        let status = STATUS.get();
        if !status.state.control_enabled() {
            continue;
        }

        // Heading straight from the decoder, not the pacer's copy.
        let readings = Readings {
            height: status.readings.height,
            yaw: YAW.angle(),
        };
        let duty = control.drive(status.targets, readings, &mut rotors);

        STATUS.update(|s| {
            s.readings.yaw = readings.yaw;
            if s.state.control_enabled() {
                s.duty = duty;
            }
        });
    }
}
