//! Seams to the peripherals the core drives but never touches directly.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

pub mod input;
pub mod telemetry;

pub use input::{ButtonEvent, Debouncer, OperatorInput, OperatorPanel, RawLevels};

/// One of the two rotor PWM channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotor {
    Main,
    Tail,
}

/// PWM outputs for both rotors.
pub trait Rotors {
    /// `percent` is 0..=100 of the PWM period.
    fn set_duty_cycle(&mut self, rotor: Rotor, percent: u8);
    fn enable_outputs(&mut self);
    fn disable_outputs(&mut self);
}

impl<T: Rotors + ?Sized> Rotors for &mut T {
    fn set_duty_cycle(&mut self, rotor: Rotor, percent: u8) {
        (**self).set_duty_cycle(rotor, percent)
    }

    fn enable_outputs(&mut self) {
        (**self).enable_outputs()
    }

    fn disable_outputs(&mut self) {
        (**self).disable_outputs()
    }
}

/// Rotor outputs shared between the lifecycle and the control task.
///
/// Each call takes the lock for that call only, so a long-running caller such
/// as the reference seek never holds a critical section across its polls.
pub struct SharedRotors<R> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<R>>,
}

impl<R> SharedRotors<R> {
    pub const fn new(rotors: R) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(rotors)),
        }
    }
}

impl<R: Rotors> Rotors for &SharedRotors<R> {
    fn set_duty_cycle(&mut self, rotor: Rotor, percent: u8) {
        self.inner
            .lock(|r| r.borrow_mut().set_duty_cycle(rotor, percent))
    }

    fn enable_outputs(&mut self) {
        self.inner.lock(|r| r.borrow_mut().enable_outputs())
    }

    fn disable_outputs(&mut self) {
        self.inner.lock(|r| r.borrow_mut().disable_outputs())
    }
}

/// The yaw index sensor read during calibration.
pub trait ReferenceSensor {
    fn is_home(&mut self) -> bool;
}
