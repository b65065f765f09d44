//! Operator panel: four push buttons and the flight-mode switch.
//!
//! Every input runs through a [`Debouncer`]. The pacer polls the panel once per
//! lifecycle tick and hands the resulting [`OperatorInput`] to the state machine.

/// Consecutive opposite-level polls before a debouncer changes state.
pub const DEBOUNCE_POLLS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    Pushed,
    Released,
    NoChange,
}

/// Per-input debounce state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    /// Electrical level when idle.
    normal: bool,
    state: bool,
    count: u8,
    changed: bool,
}

impl Debouncer {
    pub const fn new(normal: bool) -> Self {
        Self {
            normal,
            state: normal,
            count: 0,
            changed: false,
        }
    }

    /// Start from a sampled level instead of idle. No change is reported for
    /// the seed itself.
    pub const fn seeded(normal: bool, level: bool) -> Self {
        Self {
            normal,
            state: level,
            count: 0,
            changed: false,
        }
    }

    /// Feed one raw level sample.
    pub fn update(&mut self, level: bool) {
        if level == self.state {
            self.count = 0;
            return;
        }
        self.count += 1;
        if self.count >= DEBOUNCE_POLLS {
            self.state = level;
            self.changed = true;
            self.count = 0;
        }
    }

    /// Report the last change once, then [`ButtonEvent::NoChange`].
    pub fn check(&mut self) -> ButtonEvent {
        if !self.changed {
            return ButtonEvent::NoChange;
        }
        self.changed = false;
        if self.state == self.normal {
            ButtonEvent::Released
        } else {
            ButtonEvent::Pushed
        }
    }

    /// Debounced "away from idle".
    pub fn is_active(&self) -> bool {
        self.state != self.normal
    }
}

/// Raw pin levels sampled in one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawLevels {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub flight_switch: bool,
}

/// Debounced operator commands for one lifecycle tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperatorInput {
    /// Pressed since the previous poll.
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Flight-mode switch is in the fly position.
    pub flight_mode: bool,
}

impl OperatorInput {
    /// Switch state only, no presses.
    pub const fn switch(flight_mode: bool) -> Self {
        Self {
            up: false,
            down: false,
            left: false,
            right: false,
            flight_mode,
        }
    }
}

pub struct OperatorPanel {
    up: Debouncer,
    down: Debouncer,
    left: Debouncer,
    right: Debouncer,
    flight_switch: Debouncer,
}

impl OperatorPanel {
    /// UP and DOWN idle low, LEFT and RIGHT idle high, the switch reads high
    /// in the fly position.
    ///
    /// Every debouncer is seeded from `initial`, so a switch already up at
    /// power-on reads as up from the first poll.
    pub const fn new(initial: RawLevels) -> Self {
        Self {
            up: Debouncer::seeded(false, initial.up),
            down: Debouncer::seeded(false, initial.down),
            left: Debouncer::seeded(true, initial.left),
            right: Debouncer::seeded(true, initial.right),
            flight_switch: Debouncer::seeded(false, initial.flight_switch),
        }
    }

    pub fn poll(&mut self, levels: RawLevels) -> OperatorInput {
        self.up.update(levels.up);
        self.down.update(levels.down);
        self.left.update(levels.left);
        self.right.update(levels.right);
        self.flight_switch.update(levels.flight_switch);
        // The switch edge is not needed; clear it so it never goes stale.
        let _ = self.flight_switch.check();

        OperatorInput {
            up: self.up.check() == ButtonEvent::Pushed,
            down: self.down.check() == ButtonEvent::Pushed,
            left: self.left.check() == ButtonEvent::Pushed,
            right: self.right.check() == ButtonEvent::Pushed,
            flight_mode: self.flight_switch.is_active(),
        }
    }
}
