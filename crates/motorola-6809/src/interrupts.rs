//! Interrupt sequencing.
//!
//! Hardware interrupts are considered between instructions (`label-b`) and
//! again after the frame is stacked (`dispatch-irq`), which is also where
//! CWAI waits. Priority is NMI, then FIRQ, then IRQ.

use crate::cpu::{Mc6809, State};
use crate::flags::{F, I};
use crate::microcode::{Action, MicroOp};
use crate::opcodes::Software;
use crate::registers::{Part, Stack};

/// Interrupt and reset vectors, lowest address first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Vector {
    Swi3,
    Swi2,
    Firq,
    Irq,
    Swi,
    Nmi,
    Reset,
}

impl Vector {
    /// Address of the big-endian handler pointer.
    #[must_use]
    pub const fn address(self) -> u16 {
        match self {
            Vector::Swi3 => 0xFFF2,
            Vector::Swi2 => 0xFFF4,
            Vector::Firq => 0xFFF6,
            Vector::Irq => 0xFFF8,
            Vector::Swi => 0xFFFA,
            Vector::Nmi => 0xFFFC,
            Vector::Reset => 0xFFFE,
        }
    }

    /// CC bits set on entry to the handler.
    #[must_use]
    pub const fn mask(self) -> u8 {
        match self {
            Vector::Irq => I,
            Vector::Firq | Vector::Swi | Vector::Nmi | Vector::Reset => I | F,
            Vector::Swi2 | Vector::Swi3 => 0,
        }
    }
}

impl Software {
    #[must_use]
    pub const fn vector(self) -> Vector {
        match self {
            Software::Swi => Vector::Swi,
            Software::Swi2 => Vector::Swi2,
            Software::Swi3 => Vector::Swi3,
            Software::Reset => Vector::Reset,
        }
    }
}

const ENTIRE_FRAME: [MicroOp; 9] = [
    MicroOp::Push(Stack::S, Part::ULo),
    MicroOp::Push(Stack::S, Part::UHi),
    MicroOp::Push(Stack::S, Part::YLo),
    MicroOp::Push(Stack::S, Part::YHi),
    MicroOp::Push(Stack::S, Part::XLo),
    MicroOp::Push(Stack::S, Part::XHi),
    MicroOp::Push(Stack::S, Part::Dp),
    MicroOp::Push(Stack::S, Part::B),
    MicroOp::Push(Stack::S, Part::A),
];

impl Mc6809 {
    /// Queue an interrupt frame on S: PC, then (if `entire`) U Y X DP B A,
    /// then CC with E reflecting which.
    pub(crate) fn queue_frame(&mut self, entire: bool) {
        self.queue.extend(&[
            MicroOp::Exec(Action::MarkEntire(entire)),
            MicroOp::Dummy,
            MicroOp::Push(Stack::S, Part::PcLo),
            MicroOp::Push(Stack::S, Part::PcHi),
        ]);
        if entire {
            self.queue.extend(&ENTIRE_FRAME);
        }
        self.queue.push(MicroOp::Push(Stack::S, Part::Cc));
    }

    /// `label-b`: stack a frame for the highest-priority active interrupt,
    /// if any. Returns false when the next instruction should be fetched.
    pub(crate) fn begin_interrupt(&mut self) -> bool {
        let active = self.lines.active;
        let cc = self.regs.cc;
        let entire = if active.nmi {
            true
        } else if active.firq && !cc.is_set(F) {
            false
        } else if active.irq && !cc.is_set(I) {
            true
        } else {
            return false;
        };
        self.queue.extend(&[MicroOp::PeekPc, MicroOp::PeekPc]);
        self.queue_frame(entire);
        self.state = State::DispatchIrq;
        true
    }

    /// `dispatch-irq`: vector to whichever interrupt is still active after
    /// stacking. Returns false if none is, leaving the CPU to wait.
    pub(crate) fn dispatch_interrupt(&mut self) -> bool {
        let active = self.lines.active;
        let cc = self.regs.cc;
        let vector = if active.nmi {
            self.lines.acknowledge_nmi();
            Vector::Nmi
        } else if active.firq && !cc.is_set(F) {
            Vector::Firq
        } else if active.irq && !cc.is_set(I) {
            Vector::Irq
        } else {
            return false;
        };
        self.take_interrupt(vector);
        self.state = State::LabelA;
        true
    }

    /// Mask, then fetch the handler address from the vector.
    pub(crate) fn take_interrupt(&mut self, vector: Vector) {
        log::trace!(
            "{vector:?} from ${:04X}, vector ${:04X}",
            self.regs.pc,
            vector.address()
        );
        self.regs.cc.set(vector.mask());
        self.ea = vector.address();
        self.queue.extend(&[
            MicroOp::Dummy,
            MicroOp::ReadPointer(0),
            MicroOp::ReadPointer(1),
            MicroOp::Exec(Action::Jump),
            MicroOp::Dummy,
        ]);
    }
}
