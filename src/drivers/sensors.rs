use embassy_stm32::adc::Adc;
use embassy_stm32::gpio::{AnyPin, Input};
use embassy_stm32::peripherals::{ADC1, PC0};

use heli_rig_controller::io::{RawLevels, ReferenceSensor};

/// Tether altitude potentiometer.
pub struct AltitudeSensor {
    adc: Adc<'static, ADC1>,
    pin: PC0,
}

impl AltitudeSensor {
    pub fn new(adc: Adc<'static, ADC1>, pin: PC0) -> Self {
        Self { adc, pin }
    }

    /// One blocking conversion, 12-bit.
    pub fn read(&mut self) -> u16 {
        self.adc.read(&mut self.pin)
    }
}

/// Yaw index sensor, pulled low at the reference heading.
pub struct ReferencePin {
    pin: Input<'static, AnyPin>,
}

impl ReferencePin {
    pub fn new(pin: Input<'static, AnyPin>) -> Self {
        Self { pin }
    }
}

impl ReferenceSensor for ReferencePin {
    fn is_home(&mut self) -> bool {
        self.pin.is_low()
    }
}

pub struct PanelPins {
    pub up: Input<'static, AnyPin>,
    pub down: Input<'static, AnyPin>,
    pub left: Input<'static, AnyPin>,
    pub right: Input<'static, AnyPin>,
    pub flight_switch: Input<'static, AnyPin>,
}

impl PanelPins {
    pub fn levels(&self) -> RawLevels {
        RawLevels {
            up: self.up.is_high(),
            down: self.down.is_high(),
            left: self.left.is_high(),
            right: self.right.is_high(),
            flight_switch: self.flight_switch.is_high(),
        }
    }
}
