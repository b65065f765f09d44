use embassy_executor::task;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;

use heli_rig_controller::io::telemetry::format_report;
use heli_rig_controller::state::FlightStatus;

use crate::usb::UsbSerial;

/// USB console writer. The pacer posts a snapshot at 20 Hz; lines are only
/// written while a host holds the port open.
#[task]
pub async fn telemetry_task(
    mut usb_serial: UsbSerial<'static>,
    status_rx: Receiver<'static, CriticalSectionRawMutex, FlightStatus, 1>,
) {
    loop {
        let status = status_rx.receive().await;

        if !usb_serial.dtr() {
            continue;
        }
        for line in format_report(&status) {
            if usb_serial.write_packet(line.as_bytes()).await.is_err() {
                break;
            }
        }
    }
}
