//! Effective address sequencing.
//!
//! Direct and extended modes are fixed fetch sequences. Indexed mode is
//! driven by the postbyte:
//!
//! ```text
//! 0RRnnnnn          n,R     5-bit signed offset
//! 1RRI0000          ,R+     (no indirect form)
//! 1RRI0001          ,R++
//! 1RRI0010          ,-R     (no indirect form)
//! 1RRI0011          ,--R
//! 1RRI0100          ,R
//! 1RRI0101          B,R
//! 1RRI0110          A,R     (0111 is an undocumented duplicate)
//! 1RRI1000          n8,R
//! 1RRI1001          n16,R
//! 1RRI1010          undocumented: PC | $FF
//! 1RRI1011          D,R
//! 1RRI1100          n8,PCR
//! 1RRI1101          n16,PCR
//! 1RRI1110          undocumented: $FFFF
//! 1RRI1111          [n16]
//! ```
//!
//! `RR` picks X, Y, U or S. `I` adds a pointer fetch from the computed
//! address. The undocumented forms still take the cycles of their
//! neighbours.

use crate::cpu::Mc6809;
use crate::microcode::{Action, MicroOp};
use crate::opcodes::{Instruction, Mode};

/// Sign-extend the low five bits of an indexed postbyte.
#[must_use]
pub(crate) fn offset5(postbyte: u8) -> u16 {
    let value = u16::from(postbyte & 0x1F);
    if value & 0x10 != 0 { value | 0xFFE0 } else { value }
}

#[must_use]
pub(crate) fn offset8(value: u16) -> u16 {
    i16::from(value as u8 as i8) as u16
}

impl Mc6809 {
    /// Queue everything after the opcode fetch: address calculation, then
    /// the instruction body. Indexed mode defers the body until the
    /// postbyte is known.
    pub(crate) fn begin(&mut self, instr: Instruction) {
        match instr.mode {
            Mode::Direct => self.queue.extend(&[MicroOp::FetchDirect, MicroOp::Dummy]),
            Mode::Extended => self.queue.extend(&[
                MicroOp::FetchAddress,
                MicroOp::FetchAddress,
                MicroOp::Dummy,
            ]),
            Mode::Indexed => {
                self.queue.push(MicroOp::FetchPostbyte);
                return;
            }
            Mode::Inherent | Mode::Immediate | Mode::Relative => {}
        }
        self.queue_body(instr);
    }

    /// Runs right after the postbyte fetch. Register-only forms resolve
    /// `ea` now; forms with offset bytes resolve it once those are fetched.
    pub(crate) fn queue_indexed(&mut self) {
        use MicroOp::{Dummy, Exec, FetchAddress, FetchOperand, PeekPc, PeekPcNext, ReadPointer};

        let postbyte = self.postbyte;
        let base = self.regs.index(postbyte);

        if postbyte & 0x80 == 0 {
            self.ea = base.wrapping_add(offset5(postbyte));
            self.queue.extend(&[PeekPc, Dummy]);
            self.queue_body(self.instr);
            return;
        }

        match postbyte & 0x0F {
            0x0 => {
                self.ea = base;
                self.regs.set_index(postbyte, base.wrapping_add(1));
                self.queue.extend(&[PeekPc, Dummy, Dummy]);
            }
            0x1 => {
                self.ea = base;
                self.regs.set_index(postbyte, base.wrapping_add(2));
                self.queue.extend(&[PeekPc, Dummy, Dummy, Dummy]);
            }
            0x2 => {
                self.ea = base.wrapping_sub(1);
                self.regs.set_index(postbyte, self.ea);
                self.queue.extend(&[PeekPc, Dummy, Dummy]);
            }
            0x3 => {
                self.ea = base.wrapping_sub(2);
                self.regs.set_index(postbyte, self.ea);
                self.queue.extend(&[PeekPc, Dummy, Dummy, Dummy]);
            }
            0x4 => {
                self.ea = base;
                self.queue.push(PeekPc);
            }
            0x5 => {
                self.ea = base.wrapping_add(offset8(u16::from(self.regs.b())));
                self.queue.extend(&[PeekPc, Dummy]);
            }
            0x6 | 0x7 => {
                self.ea = base.wrapping_add(offset8(u16::from(self.regs.a())));
                self.queue.extend(&[PeekPc, Dummy]);
            }
            0x8 => self.queue.extend(&[FetchOperand, Exec(Action::IndexOffset8), Dummy]),
            0x9 => self.queue.extend(&[
                FetchOperand,
                FetchOperand,
                Exec(Action::IndexOffset16),
                Dummy,
                Dummy,
                Dummy,
            ]),
            0xA => {
                self.ea = self.regs.pc | 0x00FF;
                self.queue.extend(&[PeekPc, Dummy, Dummy, Dummy]);
            }
            0xB => {
                self.ea = base.wrapping_add(self.regs.d);
                self.queue.extend(&[PeekPc, PeekPcNext, Dummy, Dummy, Dummy]);
            }
            0xC => self.queue.extend(&[FetchOperand, Exec(Action::PcOffset8), Dummy]),
            0xD => self.queue.extend(&[
                FetchOperand,
                FetchOperand,
                Exec(Action::PcOffset16),
                PeekPc,
                Dummy,
                Dummy,
                Dummy,
            ]),
            0xE => {
                self.ea = 0xFFFF;
                self.queue.extend(&[PeekPc, Dummy, Dummy, Dummy]);
            }
            _ => self.queue.extend(&[FetchAddress, FetchAddress, Dummy]),
        }

        if postbyte & 0x10 != 0 {
            self.queue.extend(&[ReadPointer(0), ReadPointer(1), Exec(Action::Indirect), Dummy]);
        }
        self.queue_body(self.instr);
    }

    /// Offset forms whose operand has just been fetched into `data`.
    pub(crate) fn resolve_offset(&mut self, action: Action) {
        let base = self.regs.index(self.postbyte);
        let pc = self.regs.pc;
        self.ea = match action {
            Action::IndexOffset8 => base.wrapping_add(offset8(self.data)),
            Action::IndexOffset16 => base.wrapping_add(self.data),
            Action::PcOffset8 | Action::BranchTarget8 => pc.wrapping_add(offset8(self.data)),
            Action::PcOffset16 | Action::BranchTarget16 => pc.wrapping_add(self.data),
            Action::Indirect => self.data,
            _ => self.ea,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_bit_offsets() {
        assert_eq!(offset5(0x1F), 0xFFFF);
        assert_eq!(offset5(0x7F), 0xFFFF);
        assert_eq!(offset5(0x10), 0xFFF0);
        assert_eq!(offset5(0x0F), 0x000F);
    }

    #[test]
    fn eight_bit_offsets_ignore_high_byte() {
        assert_eq!(offset8(0x1280), 0xFF80);
        assert_eq!(offset8(0x007F), 0x007F);
    }
}
