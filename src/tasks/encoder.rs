use embassy_executor::task;
use embassy_futures::select::select;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::peripherals::{PB6, PB7};

use heli_rig_controller::control::Phases;

use crate::YAW;

/// Quadrature edges, high priority. Latches both lines on any edge of either.
#[task]
pub async fn encoder_task(mut phase_a: ExtiInput<'static, PB6>, mut phase_b: ExtiInput<'static, PB7>) {
    YAW.prime(Phases::new(phase_a.is_high(), phase_b.is_high()));

    loop {
        select(phase_a.wait_for_any_edge(), phase_b.wait_for_any_edge()).await;
        YAW.on_edge(Phases::new(phase_a.is_high(), phase_b.is_high()));
    }
}
