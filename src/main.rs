#![no_std]
#![no_main]

mod board;
mod drivers;
mod tasks;
mod usb;

use cortex_m_rt::entry;
use defmt::{info, unwrap};
use embassy_executor::{Executor, InterruptExecutor};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use heli_rig_controller::config::{
    CalibrationConfig, PidGains, SchedulerConfig, CONTROL_DIVIDER, SAMPLE_BUFFER_LEN,
    YAW_TICKS_PER_REVOLUTION,
};
use heli_rig_controller::control::{SharedAverager, YawDecoder};
use heli_rig_controller::flight::ControlLoop;
use heli_rig_controller::io::SharedRotors;
use heli_rig_controller::scheduler::ControlGate;
use heli_rig_controller::state::{FlightStatus, SharedStatus};

use crate::board::Board;
use crate::drivers::PwmRotors;
use crate::tasks::pacer::PacerResources;

// ── Shared state ──────────────────────────────────────────────────────────────
pub static STATUS: SharedStatus = SharedStatus::new();
pub static AVERAGER: SharedAverager<SAMPLE_BUFFER_LEN> = SharedAverager::new();
pub static YAW: YawDecoder = YawDecoder::new(YAW_TICKS_PER_REVOLUTION);
pub static CONTROL_GATE: ControlGate = ControlGate::new(CONTROL_DIVIDER);

/// Sampling gate -> control task.
pub static CONTROL_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

//  Cap=1: the console only wants the latest snapshot.
static TELEMETRY_CHAN: Channel<CriticalSectionRawMutex, FlightStatus, 1> = Channel::new();

static ROTORS: StaticCell<SharedRotors<PwmRotors>> = StaticCell::new();

// ── Executors ─────────────────────────────────────────────────────────────────
//  High: sampling + encoder. Medium: control. Thread mode: pacer + USB.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_MED: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn UART4() {
    EXECUTOR_HIGH.on_interrupt()
}

#[interrupt]
unsafe fn UART5() {
    EXECUTOR_MED.on_interrupt()
}

// ── Main ──────────────────────────────────────────────────────────────────────
#[entry]
fn main() -> ! {
    info!("heli rig controller starting");

    // 1. Configuration: refuse to fly on a bad table.
    let dividers = unwrap!(SchedulerConfig::DEFAULT.dividers());
    let control = unwrap!(ControlLoop::new(PidGains::ALTITUDE, PidGains::YAW));
    let calibration = CalibrationConfig::DEFAULT;
    info!("dividers {}", dividers);

    // 2. Board init (168 MHz PLL), rotors stopped and disabled
    let board = Board::init();
    let rotors: &'static SharedRotors<PwmRotors> = ROTORS.init(SharedRotors::new(board.rotors));

    // 3. USB (CDC-ACM telemetry console)
    let (usb_dev, usb_serial) = usb::init(board.usb);

    // 4. High priority: sampling tick and encoder edges
    interrupt::UART4.set_priority(Priority::P6);
    let spawner = EXECUTOR_HIGH.start(interrupt::UART4);
    unwrap!(spawner.spawn(tasks::sampling::sampling_task(board.altitude)));
    unwrap!(spawner.spawn(tasks::encoder::encoder_task(board.phase_a, board.phase_b)));

    // 5. Medium priority: PID update
    interrupt::UART5.set_priority(Priority::P7);
    let spawner = EXECUTOR_MED.start(interrupt::UART5);
    unwrap!(spawner.spawn(tasks::control::control_task(control, rotors)));

    // 6. Thread mode: pacer, USB device, console writer
    let pacer = PacerResources {
        panel: board.panel,
        reference: board.reference,
        led: board.led,
        rotors,
    };
    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        unwrap!(spawner.spawn(usb::usb_task(usb_dev)));
        unwrap!(spawner.spawn(tasks::telemetry::telemetry_task(
            usb_serial,
            TELEMETRY_CHAN.receiver(),
        )));
        unwrap!(spawner.spawn(tasks::pacer::pacer_task(
            pacer,
            dividers,
            calibration,
            TELEMETRY_CHAN.sender(),
        )));
    })
}
