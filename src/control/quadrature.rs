//! Quadrature yaw decoder.
//!
//! Every edge on either encoder line latches the (A, B) pair and looks up the
//! move from the previous pair. The tick lives in an atomic: only the encoder
//! task writes it, everybody else reads it lock-free and may be one edge stale.

use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use crate::config::CalibrationConfig;
use crate::error::CalibrationError;
use crate::io::{ReferenceSensor, Rotor, Rotors};

/// Tick delta indexed by `prevA prevB curA curB`. No-change and double-toggle
/// entries are zero: a missed edge, not a fault.
const TRANSITIONS: [i8; 16] = [
    0, 1, -1, 0, //
    -1, 0, 0, 1, //
    1, 0, 0, -1, //
    0, -1, 1, 0,
];

/// Levels of the two encoder phase lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Phases {
    pub a: bool,
    pub b: bool,
}

impl Phases {
    pub const fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    const fn bits(self) -> u8 {
        ((self.a as u8) << 1) | self.b as u8
    }

    const fn from_bits(bits: u8) -> Self {
        Self {
            a: bits & 0b10 != 0,
            b: bits & 0b01 != 0,
        }
    }
}

/// Tick change for one latched transition.
pub fn transition_delta(previous: Phases, current: Phases) -> i8 {
    TRANSITIONS[((previous.bits() << 2) | current.bits()) as usize]
}

pub struct YawDecoder {
    ticks_per_revolution: u16,
    tick: AtomicU16,
    previous: AtomicU8,
}

impl YawDecoder {
    pub const fn new(ticks_per_revolution: u16) -> Self {
        assert!(ticks_per_revolution > 0, "encoder needs at least one tick");
        Self {
            ticks_per_revolution,
            tick: AtomicU16::new(0),
            previous: AtomicU8::new(0),
        }
    }

    /// Latch the line levels without counting a move, e.g. right after boot.
    pub fn prime(&self, phases: Phases) {
        self.previous.store(phases.bits(), Ordering::Relaxed);
    }

    /// Handle one edge on either phase line. Returns the applied delta.
    pub fn on_edge(&self, current: Phases) -> i8 {
        let previous = Phases::from_bits(self.previous.load(Ordering::Relaxed));
        let delta = transition_delta(previous, current);
        self.previous.store(current.bits(), Ordering::Relaxed);
        if delta != 0 {
            self.advance(delta as i32);
        }
        delta
    }

    fn advance(&self, delta: i32) {
        let total = self.ticks_per_revolution as i32;
        let tick = self.tick.load(Ordering::Relaxed) as i32;
        let next = (tick + delta).rem_euclid(total);
        self.tick.store(next as u16, Ordering::Relaxed);
    }

    pub fn tick(&self) -> u16 {
        self.tick.load(Ordering::Relaxed)
    }

    pub fn ticks_per_revolution(&self) -> u16 {
        self.ticks_per_revolution
    }

    /// Degrees in [0, 360), truncated.
    pub fn angle(&self) -> i16 {
        (self.tick() as u32 * 360 / self.ticks_per_revolution as u32) as i16
    }

    /// Declare the current position as the reference.
    pub fn reset(&self) {
        self.tick.store(0, Ordering::Relaxed);
    }

    /// Spin the tail at the seek duty until the reference sensor reports home,
    /// then zero the tick and stop the tail.
    ///
    /// Blocks the caller; `pause` runs between polls and must leave interrupts
    /// enabled so the encoder keeps counting. Gives up after
    /// [`CalibrationConfig::max_polls`] polls, leaving the tick untouched.
    pub fn find_initial_position<R, S, P>(
        &self,
        rotors: &mut R,
        reference: &mut S,
        config: &CalibrationConfig,
        mut pause: P,
    ) -> Result<u32, CalibrationError>
    where
        R: Rotors + ?Sized,
        S: ReferenceSensor + ?Sized,
        P: FnMut(),
    {
        let max_polls = config.max_polls();
        rotors.set_duty_cycle(Rotor::Tail, config.seek_duty);

        let mut polls = 0u32;
        let found = loop {
            polls += 1;
            if reference.is_home() {
                break true;
            }
            if polls >= max_polls {
                break false;
            }
            pause();
        };

        if found {
            self.reset();
        }
        rotors.set_duty_cycle(Rotor::Tail, 0);

        if found {
            debug!("yaw reference found after {} polls", polls);
            Ok(polls)
        } else {
            Err(CalibrationError::Timeout { polls })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::mock::{MockReference, MockRotors, RotorEvent};

    const FORWARD: [Phases; 4] = [
        Phases::new(false, true),
        Phases::new(true, true),
        Phases::new(true, false),
        Phases::new(false, false),
    ];

    fn spin(decoder: &YawDecoder, steps: usize, forward: bool) {
        for i in 0..steps {
            let phase = if forward {
                FORWARD[i % 4]
            } else {
                // Reverse walk of the same cycle: 10, 11, 01, 00
                FORWARD[(2 + 4 - (i % 4)) % 4]
            };
            decoder.on_edge(phase);
        }
    }

    /// Each single-line step moves one tick in the direction of rotation.
    #[test]
    fn test_forward_and_reverse_steps() {
        let decoder = YawDecoder::new(448);
        spin(&decoder, 8, true);
        assert_eq!(decoder.tick(), 8, "Eight forward edges, eight ticks.");

        let decoder = YawDecoder::new(448);
        spin(&decoder, 3, false);
        assert_eq!(decoder.tick(), 445, "Reverse from zero wraps to the top.");
    }

    /// The tick never leaves [0, total) and the angle follows direction.
    #[test]
    fn test_tick_stays_in_range_and_angle_monotonic() {
        let decoder = YawDecoder::new(448);
        let mut last_angle = decoder.angle();
        for i in 0..447 {
            decoder.on_edge(FORWARD[i % 4]);
            assert!(decoder.tick() < 448);
            let angle = decoder.angle();
            assert!(angle >= last_angle, "Angle should not drop while spinning forward.");
            last_angle = angle;
        }
        assert_eq!(decoder.tick(), 447);
        assert_eq!(decoder.angle(), 359);

        decoder.on_edge(FORWARD[447 % 4]);
        assert_eq!(decoder.tick(), 0, "A full revolution wraps back to zero.");
        assert_eq!(decoder.angle(), 0);
    }

    /// No change and simultaneous double toggles are zero movement.
    #[test]
    fn test_no_change_and_double_toggle_ignored() {
        let decoder = YawDecoder::new(448);
        assert_eq!(decoder.on_edge(Phases::new(false, false)), 0);
        assert_eq!(decoder.on_edge(Phases::new(true, true)), 0, "00 to 11 skips a state.");
        assert_eq!(decoder.on_edge(Phases::new(false, false)), 0, "11 to 00 skips a state.");
        assert_eq!(decoder.tick(), 0);
    }

    /// Every table entry is one of -1, 0, +1 and single toggles are non-zero.
    #[test]
    fn test_transition_table_shape() {
        for prev in 0..4u8 {
            for cur in 0..4u8 {
                let delta = transition_delta(Phases::from_bits(prev), Phases::from_bits(cur));
                let toggled = (prev ^ cur).count_ones();
                match toggled {
                    1 => assert!(delta == 1 || delta == -1),
                    _ => assert_eq!(delta, 0),
                }
            }
        }
    }

    /// Priming latches levels without counting.
    #[test]
    fn test_prime_does_not_move() {
        let decoder = YawDecoder::new(448);
        decoder.prime(Phases::new(true, false));
        assert_eq!(decoder.tick(), 0);
        assert_eq!(decoder.on_edge(Phases::new(false, false)), 1);
    }

    /// Angle truncates toward zero.
    #[test]
    fn test_angle_conversion() {
        let decoder = YawDecoder::new(448);
        spin(&decoder, 224, true);
        assert_eq!(decoder.angle(), 180);
        decoder.on_edge(FORWARD[224 % 4]);
        // 225 * 360 / 448 = 180.8
        assert_eq!(decoder.angle(), 180);
    }

    /// A found reference zeroes the tick and stops the tail.
    #[test]
    fn test_find_initial_position_success() {
        let decoder = YawDecoder::new(448);
        spin(&decoder, 17, true);
        let mut rotors = MockRotors::default();
        let mut reference = MockReference::home_after(5);
        let mut pauses = 0;

        let polls = decoder
            .find_initial_position(
                &mut rotors,
                &mut reference,
                &CalibrationConfig::DEFAULT,
                || pauses += 1,
            )
            .unwrap();

        assert_eq!(polls, 5);
        assert_eq!(pauses, 4, "Pause between polls, not after the last.");
        assert_eq!(decoder.tick(), 0, "Reference position should be tick zero.");
        assert_eq!(
            rotors.events,
            [
                RotorEvent::Duty(Rotor::Tail, CalibrationConfig::DEFAULT.seek_duty),
                RotorEvent::Duty(Rotor::Tail, 0),
            ]
        );
    }

    /// A missing reference times out, stops the tail and keeps the tick.
    #[test]
    fn test_find_initial_position_timeout() {
        let decoder = YawDecoder::new(448);
        spin(&decoder, 9, true);
        let config = CalibrationConfig {
            seek_duty: 45,
            poll_interval_us: 1000,
            timeout_ms: 20,
        };
        let mut rotors = MockRotors::default();
        let mut reference = MockReference::never();

        let result = decoder.find_initial_position(&mut rotors, &mut reference, &config, || {});

        assert_eq!(result, Err(CalibrationError::Timeout { polls: 20 }));
        assert_eq!(reference.polls, 20);
        assert_eq!(decoder.tick(), 9, "Tick must not be zeroed on timeout.");
        assert_eq!(rotors.events.last(), Some(&RotorEvent::Duty(Rotor::Tail, 0)));
    }
}
