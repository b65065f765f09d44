use embassy_stm32::peripherals::TIM3;
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_stm32::timer::Channel;

use heli_rig_controller::io::{Rotor, Rotors};

/// Main rotor on TIM3 CH3, tail rotor on TIM3 CH4.
pub struct PwmRotors {
    pwm: SimplePwm<'static, TIM3>,
}

impl PwmRotors {
    pub fn new(mut pwm: SimplePwm<'static, TIM3>) -> Self {
        pwm.set_duty(Channel::Ch3, 0);
        pwm.set_duty(Channel::Ch4, 0);
        Self { pwm }
    }

    fn channel(rotor: Rotor) -> Channel {
        match rotor {
            Rotor::Main => Channel::Ch3,
            Rotor::Tail => Channel::Ch4,
        }
    }
}

impl Rotors for PwmRotors {
    fn set_duty_cycle(&mut self, rotor: Rotor, percent: u8) {
        let max = self.pwm.get_max_duty() as u32;
        let duty = max * percent.min(100) as u32 / 100;
        self.pwm.set_duty(Self::channel(rotor), duty as u16);
    }

    fn enable_outputs(&mut self) {
        self.pwm.enable(Channel::Ch3);
        self.pwm.enable(Channel::Ch4);
    }

    fn disable_outputs(&mut self) {
        self.pwm.disable(Channel::Ch3);
        self.pwm.disable(Channel::Ch4);
    }
}
