use embassy_stm32::adc::Adc;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{AnyPin, Input, Level, Output, OutputType, Pin, Pull, Speed};
use embassy_stm32::peripherals::{PA11, PA12, PB6, PB7, USB_OTG_FS};
use embassy_stm32::rcc::*;
use embassy_stm32::time::{hz, Hertz as TimeHertz};
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::timer::CountingMode;
use embassy_stm32::Config;
use embassy_time::Delay;

use crate::drivers::{AltitudeSensor, PanelPins, PwmRotors, ReferencePin};

/// Rotor PWM carrier frequency.
const ROTOR_PWM_HZ: u32 = 250;

pub struct UsbPins {
    pub otg: USB_OTG_FS,
    pub dp: PA12,
    pub dm: PA11,
}

/// Every peripheral the rig uses, configured and named.
///
/// | Signal            | Pin  | Notes                  |
/// |-------------------|------|------------------------|
/// | altitude ADC      | PC0  | ADC1 IN10              |
/// | yaw phase A / B   | PB6 / PB7 | EXTI6 / EXTI7     |
/// | yaw reference     | PC4  | low at home            |
/// | main / tail rotor | PB0 / PB1 | TIM3 CH3 / CH4    |
/// | UP / DOWN         | PB12 / PB13 | idle low         |
/// | LEFT / RIGHT      | PB14 / PB15 | idle high        |
/// | flight switch     | PC8  | high = fly             |
/// | status LED        | PC13 |                        |
pub struct Board {
    pub altitude: AltitudeSensor,
    pub phase_a: ExtiInput<'static, PB6>,
    pub phase_b: ExtiInput<'static, PB7>,
    pub reference: ReferencePin,
    pub panel: PanelPins,
    pub rotors: PwmRotors,
    pub led: Output<'static, AnyPin>,
    pub usb: UsbPins,
}

impl Board {
    pub fn init() -> Self {
        let p = embassy_stm32::init(clock_config());

        let adc = Adc::new(p.ADC1, &mut Delay);
        let altitude = AltitudeSensor::new(adc, p.PC0);

        let phase_a = ExtiInput::new(Input::new(p.PB6, Pull::None), p.EXTI6);
        let phase_b = ExtiInput::new(Input::new(p.PB7, Pull::None), p.EXTI7);
        let reference = ReferencePin::new(Input::new(p.PC4.degrade(), Pull::Up));

        let panel = PanelPins {
            up: Input::new(p.PB12.degrade(), Pull::Down),
            down: Input::new(p.PB13.degrade(), Pull::Down),
            left: Input::new(p.PB14.degrade(), Pull::Up),
            right: Input::new(p.PB15.degrade(), Pull::Up),
            flight_switch: Input::new(p.PC8.degrade(), Pull::Down),
        };

        let main_rotor = PwmPin::new_ch3(p.PB0, OutputType::PushPull);
        let tail_rotor = PwmPin::new_ch4(p.PB1, OutputType::PushPull);
        let pwm = SimplePwm::new(
            p.TIM3,
            None,
            None,
            Some(main_rotor),
            Some(tail_rotor),
            hz(ROTOR_PWM_HZ),
            CountingMode::EdgeAlignedUp,
        );
        let rotors = PwmRotors::new(pwm);

        let led = Output::new(p.PC13.degrade(), Level::Low, Speed::Low);

        Self {
            altitude,
            phase_a,
            phase_b,
            reference,
            panel,
            rotors,
            led,
            usb: UsbPins {
                otg: p.USB_OTG_FS,
                dp: p.PA12,
                dm: p.PA11,
            },
        }
    }
}

/// 8 MHz crystal, 168 MHz core, 48 MHz for USB.
fn clock_config() -> Config {
    let mut config = Config::default();
    config.rcc.hse = Some(Hse {
        freq: TimeHertz(8_000_000),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll_src = PllSource::HSE;
    config.rcc.pll = Some(Pll {
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL168,
        divp: Some(PllPDiv::DIV2),
        divq: Some(PllQDiv::DIV7),
        divr: None,
    });
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV4;
    config.rcc.apb2_pre = APBPrescaler::DIV2;
    config
}
