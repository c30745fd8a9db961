//! Interrupt and halt inputs.
//!
//! Every input goes through two stages before the dispatcher sees it. At
//! the end of each bus cycle the live input is sampled into `latched`; at
//! the start of the next cycle `latched` is copied to `active`. Decisions
//! are made on `active` only, so a change made between cycles is visible
//! one full cycle later.
//!
//! HALT, FIRQ and IRQ are level sensitive. NMI is edge triggered: only a
//! rising input (asserted after being released) sets the latch, and only
//! once NMI is armed. The latch then stays set until the interrupt is
//! taken.

/// One boolean per input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signals {
    pub halt: bool,
    pub nmi: bool,
    pub firq: bool,
    pub irq: bool,
}

impl Signals {
    pub const NONE: Self = Self {
        halt: false,
        nmi: false,
        firq: false,
        irq: false,
    };

    /// True if any interrupt (not HALT) is asserted.
    #[must_use]
    pub const fn any_interrupt(self) -> bool {
        self.nmi || self.firq || self.irq
    }
}

/// Live inputs plus their latched and active shadows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterruptLines {
    /// Levels as driven by the rest of the machine.
    pub input: Signals,
    /// Sampled at the end of the last bus cycle.
    pub latched: Signals,
    /// Seen by the dispatcher during the current cycle.
    pub active: Signals,
    /// NMI edges are ignored until S has been loaded.
    nmi_armed: bool,
    /// NMI input level at the previous sample, for edge detection.
    nmi_previous: bool,
}

impl InterruptLines {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: Signals::NONE,
            latched: Signals::NONE,
            active: Signals::NONE,
            nmi_armed: false,
            nmi_previous: false,
        }
    }

    /// Start of a bus cycle.
    pub fn promote(&mut self) {
        self.active = self.latched;
    }

    /// End of a bus cycle.
    pub fn sample(&mut self) {
        let rising = self.input.nmi && !self.nmi_previous;
        self.nmi_previous = self.input.nmi;
        if rising && self.nmi_armed {
            self.latched.nmi = true;
        }
        self.latched.halt = self.input.halt;
        self.latched.firq = self.input.firq;
        self.latched.irq = self.input.irq;
    }

    /// Forget every sampled interrupt and disarm NMI. Live inputs are left
    /// alone, and HALT keeps tracking its input so a CPU held in reset
    /// stays held.
    pub fn clear(&mut self) {
        let halt = Signals {
            halt: self.input.halt,
            ..Signals::NONE
        };
        self.latched = halt;
        self.active = halt;
        self.nmi_armed = false;
        self.nmi_previous = self.input.nmi;
    }

    /// Drop a taken NMI so the same edge is not serviced twice.
    pub fn acknowledge_nmi(&mut self) {
        self.latched.nmi = false;
        self.active.nmi = false;
    }

    pub fn arm_nmi(&mut self) {
        self.nmi_armed = true;
    }

    #[must_use]
    pub const fn nmi_armed(&self) -> bool {
        self.nmi_armed
    }
}
