use embassy_executor::task;
use embassy_time::{Duration, Ticker};

use heli_rig_controller::config::SAMPLE_RATE_HZ;

use crate::drivers::AltitudeSensor;
use crate::{AVERAGER, CONTROL_GATE, CONTROL_SIGNAL, STATUS};

/// Sampling tick, 300 Hz, high priority.
/// One conversion into the averager, then the control gate.
#[task]
pub async fn sampling_task(mut sensor: AltitudeSensor) {
    let mut ticker = Ticker::every(Duration::from_hz(SAMPLE_RATE_HZ as u64));

    loop {
        ticker.next().await;

        AVERAGER.push(sensor.read() as u32);

        if CONTROL_GATE.on_sample_tick(STATUS.state()) {
            CONTROL_SIGNAL.signal(());
        }
    }
}
