//! 6809 condition code register (CC).
//!
//! Bit layout, high to low: `E F H I N Z V C`.

/// Carry - set on carry out of (or borrow into) the top bit.
pub const C: u8 = 0x01;

/// Overflow - set when a signed result does not fit.
pub const V: u8 = 0x02;

/// Zero - set when the result is zero.
pub const Z: u8 = 0x04;

/// Negative - copy of the result's top bit.
pub const N: u8 = 0x08;

/// IRQ mask - when set, IRQ is ignored.
pub const I: u8 = 0x10;

/// Half carry - carry out of bit 3, set only by ADD and ADC.
pub const H: u8 = 0x20;

/// FIRQ mask - when set, FIRQ is ignored.
pub const F: u8 = 0x40;

/// Entire - a stacked frame holds every register, not just PC and CC.
pub const E: u8 = 0x80;

/// Condition code register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cc(pub u8);

impl Cc {
    /// Check if a flag is set.
    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Set a flag.
    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    /// Clear a flag.
    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// Set or clear a flag based on condition.
    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Update N and Z from an 8-bit result.
    pub fn update_nz8(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }

    /// Update N and Z from a 16-bit result.
    pub fn update_nz16(&mut self, value: u16) {
        self.set_if(N, value & 0x8000 != 0);
        self.set_if(Z, value == 0);
    }
}
