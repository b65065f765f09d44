use defmt::{debug, info};
use embassy_executor::task;
use embassy_stm32::gpio::{AnyPin, Output};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{block_for, Duration, Ticker, Timer};

use heli_rig_controller::config::{CalibrationConfig, Dividers, DISPLAY_RATE_HZ, PACER_RATE_HZ};
use heli_rig_controller::control::Altimeter;
use heli_rig_controller::flight::FlightLifecycle;
use heli_rig_controller::io::{OperatorPanel, SharedRotors};
use heli_rig_controller::scheduler::{Pacer, PacerTask};
use heli_rig_controller::state::{FlightStatus, Readings};

use crate::drivers::{PanelPins, PwmRotors, ReferencePin};
use crate::{AVERAGER, CONTROL_GATE, STATUS, YAW};

pub struct PacerResources {
    pub panel: PanelPins,
    pub reference: ReferencePin,
    pub led: Output<'static, AnyPin>,
    pub rotors: &'static SharedRotors<PwmRotors>,
}

/// Cooperative main loop, thread mode, 6 kHz base tick.
/// Altitude average, display, flight logic and telemetry in that order.
#[task]
pub async fn pacer_task(
    mut res: PacerResources,
    dividers: Dividers,
    calibration: CalibrationConfig,
    telemetry_tx: Sender<'static, CriticalSectionRawMutex, FlightStatus, 1>,
) {
    // Ground level is whatever the first full buffer reads.
    while !AVERAGER.is_primed() {
        Timer::after(Duration::from_millis(5)).await;
    }
    let altimeter = Altimeter::new(AVERAGER.read_average());
    info!("ground level {} counts", altimeter.ground_level());

    let mut pacer = Pacer::new(&dividers);
    let mut panel = OperatorPanel::new(res.panel.levels());
    let mut lifecycle = FlightLifecycle::default();
    let mut readings = Readings::default();
    let mut display_count: u32 = 0;
    let poll_interval = Duration::from_micros(calibration.poll_interval_us as u64);

    let mut ticker = Ticker::every(Duration::from_hz(PACER_RATE_HZ as u64));

    loop {
        ticker.next().await;

        for job in pacer.poll() {
            match job {
                PacerTask::AltitudeAverage => {
                    readings.height = altimeter.height_percent(AVERAGER.read_average());
                    readings.yaw = YAW.angle();
                    STATUS.update(|s| s.readings = readings);
                }

                PacerTask::Display => {
                    let status = STATUS.get();
                    res.led.set_level(status.state.control_enabled().into());

                    // Snapshot once a second.
                    display_count = display_count.wrapping_add(1);
                    if display_count % DISPLAY_RATE_HZ == 0 {
                        debug!("{}", status);
                    }
                }

                PacerTask::FlightLogic => {
                    let input = panel.poll(res.panel.levels());
                    readings.yaw = YAW.angle();
                    let seeking = lifecycle.calibration_pending();

                    let mut rotors = res.rotors;
                    let reference = &mut res.reference;
                    lifecycle.tick(input, readings, &mut rotors, &CONTROL_GATE, |rotors| {
                        // Blocks the pacer only; sampling and encoder tasks
                        // preempt from their interrupt executors.
                        YAW.find_initial_position(rotors, reference, &calibration, || {
                            block_for(poll_interval)
                        })
                    });

                    STATUS.update(|s| lifecycle.publish(s));

                    // The seek blocked for up to the calibration timeout. Skip
                    // the missed base ticks instead of replaying them.
                    if seeking {
                        ticker.reset();
                    }
                }

                PacerTask::Telemetry => {
                    // Drop the frame if the writer is still busy.
                    let _ = telemetry_tx.try_send(STATUS.get());
                }
            }
        }
    }
}
