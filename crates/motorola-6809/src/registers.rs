//! 6809 CPU registers.

use crate::flags::{Cc, F, I};

/// One of the two 8-bit accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Acc {
    A,
    B,
}

/// A 16-bit register an instruction loads, stores or compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Word {
    D,
    X,
    Y,
    U,
    S,
}

/// One of the two stack pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stack {
    /// Hardware stack, used by interrupts and subroutine calls.
    S,
    /// User stack.
    U,
}

impl Stack {
    /// The stack that PSHx/PULx bit 6 refers to: the *other* one.
    #[must_use]
    pub const fn other(self) -> Word {
        match self {
            Stack::S => Word::U,
            Stack::U => Word::S,
        }
    }
}

/// A single byte moved by a push or pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Part {
    Cc,
    A,
    B,
    Dp,
    XHi,
    XLo,
    YHi,
    YLo,
    UHi,
    ULo,
    SHi,
    SLo,
    PcHi,
    PcLo,
}

/// 6809 CPU register set.
///
/// - A, B: 8-bit accumulators, together the 16-bit D
/// - X, Y: 16-bit index registers
/// - U, S: user and hardware stack pointers (pre-decrement on push)
/// - PC: program counter
/// - DP: direct page, high byte of every direct-mode address
/// - CC: condition codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    /// Combined accumulator, A in the high byte.
    pub d: u16,
    pub x: u16,
    pub y: u16,
    pub u: u16,
    pub s: u16,
    pub pc: u16,
    pub dp: u8,
    pub cc: Cc,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Create registers in their power-on state.
    ///
    /// Only DP and the I/F masks are defined by the reset sequence; the
    /// rest are zeroed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            d: 0,
            x: 0,
            y: 0,
            u: 0,
            s: 0,
            pc: 0,
            dp: 0,
            cc: Cc(I | F),
        }
    }

    #[must_use]
    pub const fn a(&self) -> u8 {
        (self.d >> 8) as u8
    }

    #[must_use]
    pub const fn b(&self) -> u8 {
        self.d as u8
    }

    pub fn set_a(&mut self, value: u8) {
        self.d = (self.d & 0x00FF) | (u16::from(value) << 8);
    }

    pub fn set_b(&mut self, value: u8) {
        self.d = (self.d & 0xFF00) | u16::from(value);
    }

    #[must_use]
    pub const fn acc(&self, acc: Acc) -> u8 {
        match acc {
            Acc::A => self.a(),
            Acc::B => self.b(),
        }
    }

    pub fn set_acc(&mut self, acc: Acc, value: u8) {
        match acc {
            Acc::A => self.set_a(value),
            Acc::B => self.set_b(value),
        }
    }

    #[must_use]
    pub const fn word(&self, reg: Word) -> u16 {
        match reg {
            Word::D => self.d,
            Word::X => self.x,
            Word::Y => self.y,
            Word::U => self.u,
            Word::S => self.s,
        }
    }

    /// Write a 16-bit register. Writing S this way does not arm NMI; the
    /// CPU does that for instruction-driven loads.
    pub fn set_word(&mut self, reg: Word, value: u16) {
        match reg {
            Word::D => self.d = value,
            Word::X => self.x = value,
            Word::Y => self.y = value,
            Word::U => self.u = value,
            Word::S => self.s = value,
        }
    }

    /// Index register selected by bits 6-5 of an indexed postbyte.
    #[must_use]
    pub const fn index(&self, postbyte: u8) -> u16 {
        match (postbyte >> 5) & 3 {
            0 => self.x,
            1 => self.y,
            2 => self.u,
            _ => self.s,
        }
    }

    pub fn set_index(&mut self, postbyte: u8, value: u16) {
        match (postbyte >> 5) & 3 {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.u = value,
            _ => self.s = value,
        }
    }

    /// Decrement a stack pointer and return the address to write.
    pub fn push(&mut self, stack: Stack) -> u16 {
        let sp = match stack {
            Stack::S => &mut self.s,
            Stack::U => &mut self.u,
        };
        *sp = sp.wrapping_sub(1);
        *sp
    }

    /// Return the address to read and increment the stack pointer.
    pub fn pull(&mut self, stack: Stack) -> u16 {
        let sp = match stack {
            Stack::S => &mut self.s,
            Stack::U => &mut self.u,
        };
        let addr = *sp;
        *sp = sp.wrapping_add(1);
        addr
    }

    #[must_use]
    pub const fn stack(&self, stack: Stack) -> u16 {
        match stack {
            Stack::S => self.s,
            Stack::U => self.u,
        }
    }

    #[must_use]
    pub const fn part(&self, part: Part) -> u8 {
        match part {
            Part::Cc => self.cc.0,
            Part::A => self.a(),
            Part::B => self.b(),
            Part::Dp => self.dp,
            Part::XHi => (self.x >> 8) as u8,
            Part::XLo => self.x as u8,
            Part::YHi => (self.y >> 8) as u8,
            Part::YLo => self.y as u8,
            Part::UHi => (self.u >> 8) as u8,
            Part::ULo => self.u as u8,
            Part::SHi => (self.s >> 8) as u8,
            Part::SLo => self.s as u8,
            Part::PcHi => (self.pc >> 8) as u8,
            Part::PcLo => self.pc as u8,
        }
    }

    pub fn set_part(&mut self, part: Part, value: u8) {
        let hi = |r: u16| (r & 0x00FF) | (u16::from(value) << 8);
        let lo = |r: u16| (r & 0xFF00) | u16::from(value);
        match part {
            Part::Cc => self.cc = Cc(value),
            Part::A => self.set_a(value),
            Part::B => self.set_b(value),
            Part::Dp => self.dp = value,
            Part::XHi => self.x = hi(self.x),
            Part::XLo => self.x = lo(self.x),
            Part::YHi => self.y = hi(self.y),
            Part::YLo => self.y = lo(self.y),
            Part::UHi => self.u = hi(self.u),
            Part::ULo => self.u = lo(self.u),
            Part::SHi => self.s = hi(self.s),
            Part::SLo => self.s = lo(self.s),
            Part::PcHi => self.pc = hi(self.pc),
            Part::PcLo => self.pc = lo(self.pc),
        }
    }

    /// Read a register by its TFR/EXG nibble.
    ///
    /// 8-bit registers are zero-extended. Undefined codes read `$FFFF`.
    #[must_use]
    pub const fn transfer_source(&self, code: u8) -> u16 {
        match code & 0x0F {
            0x0 => self.d,
            0x1 => self.x,
            0x2 => self.y,
            0x3 => self.u,
            0x4 => self.s,
            0x5 => self.pc,
            0x8 => self.a() as u16,
            0x9 => self.b() as u16,
            0xA => self.cc.0 as u16,
            0xB => self.dp as u16,
            _ => 0xFFFF,
        }
    }

    /// Write a register by its TFR/EXG nibble.
    ///
    /// 8-bit destinations take the low byte. Undefined codes are ignored.
    pub fn transfer_dest(&mut self, code: u8, value: u16) {
        match code & 0x0F {
            0x0 => self.d = value,
            0x1 => self.x = value,
            0x2 => self.y = value,
            0x3 => self.u = value,
            0x4 => self.s = value,
            0x5 => self.pc = value,
            0x8 => self.set_a(value as u8),
            0x9 => self.set_b(value as u8),
            0xA => self.cc = Cc(value as u8),
            0xB => self.dp = value as u8,
            _ => {}
        }
    }
}
