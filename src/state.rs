//! Shared state types for inter-context communication.
//!
//! All types are `Copy`; [`SharedStatus`] hands out whole snapshots so readers
//! never see a record half-updated by a higher-priority task.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlightState {
    #[default]
    Startup,
    Landed,
    Calibrating,
    Flying,
    Landing,
}

impl FlightState {
    /// PID loops may only run (and wind up) while airborne.
    pub fn control_enabled(self) -> bool {
        matches!(self, Self::Flying | Self::Landing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "STARTUP",
            Self::Landed => "LANDED",
            Self::Calibrating => "CALIBRATING",
            Self::Flying => "FLYING",
            Self::Landing => "LANDING",
        }
    }
}

// ── Data types ────────────────────────────────────────────────────────────────

/// Last commanded duty cycles, percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycles {
    pub main: u8,
    pub tail: u8,
}

impl DutyCycles {
    pub const ZERO: Self = Self { main: 0, tail: 0 };
}

/// What the lifecycle wants: height percent and yaw degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Setpoints {
    pub height: i16,
    pub yaw: i16,
}

/// What the sensors say: height percent and yaw degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readings {
    pub height: i16,
    pub yaw: i16,
}

/// Everything the tasks exchange, and what telemetry reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlightStatus {
    pub state: FlightState,
    pub targets: Setpoints,
    pub readings: Readings,
    pub duty: DutyCycles,
}

impl FlightStatus {
    pub const POWER_UP: Self = Self {
        state: FlightState::Startup,
        targets: Setpoints { height: 0, yaw: 0 },
        readings: Readings { height: 0, yaw: 0 },
        duty: DutyCycles::ZERO,
    };
}

// ── Shared cell ───────────────────────────────────────────────────────────────

/// [`FlightStatus`] guarded by a critical section.
///
/// Written by the lifecycle task, the averaging task and the control task; read
/// by the sampling gate and telemetry. Every read-modify-write happens inside
/// [`SharedStatus::update`].
pub struct SharedStatus {
    inner: Mutex<CriticalSectionRawMutex, Cell<FlightStatus>>,
}

impl SharedStatus {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(FlightStatus::POWER_UP)),
        }
    }

    pub fn get(&self) -> FlightStatus {
        self.inner.lock(|s| s.get())
    }

    pub fn state(&self) -> FlightState {
        self.inner.lock(|s| s.get().state)
    }

    /// Atomic read-modify-write; returns the stored result.
    pub fn update<F>(&self, f: F) -> FlightStatus
    where
        F: FnOnce(&mut FlightStatus),
    {
        self.inner.lock(|s| {
            let mut status = s.get();
            f(&mut status);
            s.set(status);
            status
        })
    }
}

impl Default for SharedStatus {
    fn default() -> Self {
        Self::new()
    }
}
