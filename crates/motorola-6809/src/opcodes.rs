//! Opcode decoding.
//!
//! Every (page, byte) pair maps to one [`Instruction`]: a tagged operation
//! plus its addressing mode. The full table is built once at compile time
//! from the row/column structure of the 6809 opcode map, so the dispatcher
//! matches on `Op` instead of numeric ranges.
//!
//! Undefined page-2 and page-3 slots decode to the page-0 instruction with
//! the same byte, which is what the silicon does.

use crate::flags::{Cc, C, N, V, Z};
use crate::registers::{Acc, Stack, Word};

/// How the operand of an instruction is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    Inherent,
    Immediate,
    Direct,
    Indexed,
    Extended,
    Relative,
}

/// Read-modify-write operations on a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unary {
    Neg,
    Com,
    Lsr,
    Ror,
    Asr,
    Asl,
    Rol,
    Dec,
    Inc,
    Tst,
    Clr,
    /// Illegal: NEG when carry is clear, COM when it is set.
    XNc,
    /// Illegal: DEC that also sets carry.
    XDec,
    /// Illegal: CLR that leaves carry alone.
    XClr,
}

/// Two-operand 8-bit accumulator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Binary {
    Sub,
    Cmp,
    Sbc,
    And,
    Bit,
    Ld,
    Eor,
    Adc,
    Or,
    Add,
}

impl Binary {
    /// CMP and BIT only set flags.
    #[must_use]
    pub const fn writes_back(self) -> bool {
        !matches!(self, Binary::Cmp | Binary::Bit)
    }
}

/// 16-bit arithmetic with a memory or immediate operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WordOp {
    Sub,
    Add,
    Cmp,
}

/// Branch conditions, in opcode order (`$20`-`$2F`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cond {
    Always,
    Never,
    Hi,
    Ls,
    Hs,
    Lo,
    Ne,
    Eq,
    Vc,
    Vs,
    Pl,
    Mi,
    Ge,
    Lt,
    Gt,
    Le,
}

impl Cond {
    #[must_use]
    pub const fn from_nibble(nibble: u8) -> Self {
        match nibble & 0x0F {
            0x0 => Cond::Always,
            0x1 => Cond::Never,
            0x2 => Cond::Hi,
            0x3 => Cond::Ls,
            0x4 => Cond::Hs,
            0x5 => Cond::Lo,
            0x6 => Cond::Ne,
            0x7 => Cond::Eq,
            0x8 => Cond::Vc,
            0x9 => Cond::Vs,
            0xA => Cond::Pl,
            0xB => Cond::Mi,
            0xC => Cond::Ge,
            0xD => Cond::Lt,
            0xE => Cond::Gt,
            _ => Cond::Le,
        }
    }

    /// Evaluate the condition against the flags.
    #[must_use]
    pub const fn holds(self, cc: Cc) -> bool {
        let c = cc.is_set(C);
        let v = cc.is_set(V);
        let z = cc.is_set(Z);
        let n = cc.is_set(N);
        match self {
            Cond::Always => true,
            Cond::Never => false,
            Cond::Hi => !c && !z,
            Cond::Ls => c || z,
            Cond::Hs => !c,
            Cond::Lo => c,
            Cond::Ne => !z,
            Cond::Eq => z,
            Cond::Vc => !v,
            Cond::Vs => v,
            Cond::Pl => !n,
            Cond::Mi => n,
            Cond::Ge => n == v,
            Cond::Lt => n != v,
            Cond::Gt => !z && n == v,
            Cond::Le => z || n != v,
        }
    }
}

/// Where a unary operation reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Target {
    Memory,
    Acc(Acc),
}

/// Software interrupt flavours, including the illegal reset opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Software {
    Swi,
    Swi2,
    Swi3,
    /// `$3E`: stacks like SWI and vectors through RESET.
    Reset,
}

/// A decoded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Op {
    /// `$10`/`$11`: select page 2 or 3 for the next byte.
    Prefix(u8),
    Unary(Unary, Target),
    Alu(Binary, Acc),
    Store(Acc),
    /// Illegal STA/STB immediate: the operand byte is skipped.
    StoreImmediate(Acc),
    Arith16(WordOp, Word),
    Load16(Word),
    Store16(Word),
    /// Illegal STX/STU/STY/STS immediate.
    Store16Immediate(Word),
    Jmp,
    Jsr,
    Bsr,
    Lbsr,
    Lbra,
    Branch(Cond),
    LongBranch(Cond),
    Lea(Word),
    Push(Stack),
    Pull(Stack),
    Rts,
    Abx,
    Rti,
    Cwai,
    Mul,
    Software(Software),
    Sync,
    Nop,
    Daa,
    Orcc,
    Andcc,
    /// `$38`: ANDCC with one more idle cycle.
    AndccSlow,
    Sex,
    Exg,
    Tfr,
    /// `$18`: CC shifted left, keeping only H and Z.
    ShiftCc,
    /// Locks the CPU until reset.
    Hcf,
}

/// An operation and how its operand is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    pub op: Op,
    pub mode: Mode,
}

impl Instruction {
    pub const NOP: Self = Self::new(Op::Nop, Mode::Inherent);

    #[must_use]
    pub const fn new(op: Op, mode: Mode) -> Self {
        Self { op, mode }
    }
}

/// Decoded instructions for pages 0, 2 and 3, 256 entries each.
static TABLE: [Instruction; 768] = build_table();

/// Look up an opcode. `page` is 0, 2 or 3; anything else is treated as 0.
#[must_use]
pub fn decode(page: u8, opcode: u8) -> Instruction {
    let row = match page {
        2 => 256,
        3 => 512,
        _ => 0,
    };
    TABLE[row + usize::from(opcode)]
}

const fn build_table() -> [Instruction; 768] {
    let mut table = [Instruction::NOP; 768];
    let mut i = 0;
    while i < 256 {
        let byte = i as u8;
        table[i] = page0(byte);
        table[256 + i] = page2(byte);
        table[512 + i] = page3(byte);
        i += 1;
    }
    table
}

const fn unary_column(column: u8) -> Unary {
    match column {
        0x0 | 0x1 => Unary::Neg,
        0x2 => Unary::XNc,
        0x3 => Unary::Com,
        0x4 | 0x5 => Unary::Lsr,
        0x6 => Unary::Ror,
        0x7 => Unary::Asr,
        0x8 => Unary::Asl,
        0x9 => Unary::Rol,
        0xA => Unary::Dec,
        0xB => Unary::XDec,
        0xC => Unary::Inc,
        0xD => Unary::Tst,
        0xE => Unary::XClr,
        _ => Unary::Clr,
    }
}

/// Rows `$0x`, `$6x`, `$7x`. Column E is JMP instead of XCLR.
const fn memory_row(column: u8, mode: Mode) -> Instruction {
    if column == 0xE {
        Instruction::new(Op::Jmp, mode)
    } else {
        Instruction::new(Op::Unary(unary_column(column), Target::Memory), mode)
    }
}

const fn page0(byte: u8) -> Instruction {
    let column = byte & 0x0F;
    match byte >> 4 {
        0x0 => memory_row(column, Mode::Direct),
        0x1 => row1(byte),
        0x2 => Instruction::new(Op::Branch(Cond::from_nibble(column)), Mode::Relative),
        0x3 => row3(byte),
        0x4 => Instruction::new(Op::Unary(unary_column(column), Target::Acc(Acc::A)), Mode::Inherent),
        0x5 => Instruction::new(Op::Unary(unary_column(column), Target::Acc(Acc::B)), Mode::Inherent),
        0x6 => memory_row(column, Mode::Indexed),
        0x7 => memory_row(column, Mode::Extended),
        _ => accumulator_block(byte),
    }
}

const fn row1(byte: u8) -> Instruction {
    use Mode::{Immediate, Inherent, Relative};
    match byte {
        0x10 => Instruction::new(Op::Prefix(2), Inherent),
        0x11 => Instruction::new(Op::Prefix(3), Inherent),
        0x13 => Instruction::new(Op::Sync, Inherent),
        0x14 | 0x15 => Instruction::new(Op::Hcf, Inherent),
        0x16 => Instruction::new(Op::Lbra, Relative),
        0x17 => Instruction::new(Op::Lbsr, Relative),
        0x18 => Instruction::new(Op::ShiftCc, Inherent),
        0x19 => Instruction::new(Op::Daa, Inherent),
        0x1A => Instruction::new(Op::Orcc, Immediate),
        0x1C => Instruction::new(Op::Andcc, Immediate),
        0x1D => Instruction::new(Op::Sex, Inherent),
        0x1E => Instruction::new(Op::Exg, Immediate),
        0x1F => Instruction::new(Op::Tfr, Immediate),
        // $12 NOP, $1B illegal NOP
        _ => Instruction::NOP,
    }
}

const fn row3(byte: u8) -> Instruction {
    use Mode::{Immediate, Indexed, Inherent};
    match byte {
        0x30 => Instruction::new(Op::Lea(Word::X), Indexed),
        0x31 => Instruction::new(Op::Lea(Word::Y), Indexed),
        0x32 => Instruction::new(Op::Lea(Word::S), Indexed),
        0x33 => Instruction::new(Op::Lea(Word::U), Indexed),
        0x34 => Instruction::new(Op::Push(Stack::S), Immediate),
        0x35 => Instruction::new(Op::Pull(Stack::S), Immediate),
        0x36 => Instruction::new(Op::Push(Stack::U), Immediate),
        0x37 => Instruction::new(Op::Pull(Stack::U), Immediate),
        0x38 => Instruction::new(Op::AndccSlow, Immediate),
        0x39 => Instruction::new(Op::Rts, Inherent),
        0x3A => Instruction::new(Op::Abx, Inherent),
        0x3B => Instruction::new(Op::Rti, Inherent),
        0x3C => Instruction::new(Op::Cwai, Immediate),
        0x3D => Instruction::new(Op::Mul, Inherent),
        0x3E => Instruction::new(Op::Software(Software::Reset), Inherent),
        _ => Instruction::new(Op::Software(Software::Swi), Inherent),
    }
}

/// Addressing mode from bits 5-4 of an opcode in `$80`-`$FF`.
const fn block_mode(byte: u8) -> Mode {
    match (byte >> 4) & 3 {
        0 => Mode::Immediate,
        1 => Mode::Direct,
        2 => Mode::Indexed,
        _ => Mode::Extended,
    }
}

/// `$80`-`$FF`: A-side in `$8x`-`$Bx`, B-side in `$Cx`-`$Fx`.
const fn accumulator_block(byte: u8) -> Instruction {
    let b_side = byte & 0x40 != 0;
    let acc = if b_side { Acc::B } else { Acc::A };
    let mode = block_mode(byte);
    let immediate = matches!(mode, Mode::Immediate);
    let op = match byte & 0x0F {
        0x0 => Op::Alu(Binary::Sub, acc),
        0x1 => Op::Alu(Binary::Cmp, acc),
        0x2 => Op::Alu(Binary::Sbc, acc),
        0x3 if b_side => Op::Arith16(WordOp::Add, Word::D),
        0x3 => Op::Arith16(WordOp::Sub, Word::D),
        0x4 => Op::Alu(Binary::And, acc),
        0x5 => Op::Alu(Binary::Bit, acc),
        0x6 => Op::Alu(Binary::Ld, acc),
        0x7 if immediate => Op::StoreImmediate(acc),
        0x7 => Op::Store(acc),
        0x8 => Op::Alu(Binary::Eor, acc),
        0x9 => Op::Alu(Binary::Adc, acc),
        0xA => Op::Alu(Binary::Or, acc),
        0xB => Op::Alu(Binary::Add, acc),
        0xC if b_side => Op::Load16(Word::D),
        0xC => Op::Arith16(WordOp::Cmp, Word::X),
        0xD if b_side && immediate => return Instruction::new(Op::Hcf, Mode::Inherent),
        0xD if b_side => Op::Store16(Word::D),
        0xD if immediate => return Instruction::new(Op::Bsr, Mode::Relative),
        0xD => Op::Jsr,
        0xE if b_side => Op::Load16(Word::U),
        0xE => Op::Load16(Word::X),
        _ => {
            let reg = if b_side { Word::U } else { Word::X };
            if immediate {
                Op::Store16Immediate(reg)
            } else {
                Op::Store16(reg)
            }
        }
    };
    Instruction::new(op, mode)
}

const fn page2(byte: u8) -> Instruction {
    let mode = block_mode(byte);
    let immediate = matches!(mode, Mode::Immediate);
    match byte {
        0x10 => Instruction::new(Op::Prefix(2), Mode::Inherent),
        0x11 => Instruction::new(Op::Prefix(3), Mode::Inherent),
        0x20..=0x2F => Instruction::new(Op::LongBranch(Cond::from_nibble(byte)), Mode::Relative),
        0x3F => Instruction::new(Op::Software(Software::Swi2), Mode::Inherent),
        0x80..=0xBF => match byte & 0x0F {
            0x3 => Instruction::new(Op::Arith16(WordOp::Cmp, Word::D), mode),
            0xC => Instruction::new(Op::Arith16(WordOp::Cmp, Word::Y), mode),
            0xE => Instruction::new(Op::Load16(Word::Y), mode),
            0xF if immediate => Instruction::new(Op::Store16Immediate(Word::Y), mode),
            0xF => Instruction::new(Op::Store16(Word::Y), mode),
            _ => page0(byte),
        },
        0xC0..=0xFF => match byte & 0x0F {
            0xE => Instruction::new(Op::Load16(Word::S), mode),
            0xF if immediate => Instruction::new(Op::Store16Immediate(Word::S), mode),
            0xF => Instruction::new(Op::Store16(Word::S), mode),
            _ => page0(byte),
        },
        _ => page0(byte),
    }
}

const fn page3(byte: u8) -> Instruction {
    let mode = block_mode(byte);
    match byte {
        0x10 => Instruction::new(Op::Prefix(2), Mode::Inherent),
        0x11 => Instruction::new(Op::Prefix(3), Mode::Inherent),
        0x3F => Instruction::new(Op::Software(Software::Swi3), Mode::Inherent),
        0x80..=0xBF => match byte & 0x0F {
            0x3 => Instruction::new(Op::Arith16(WordOp::Cmp, Word::U), mode),
            0xC => Instruction::new(Op::Arith16(WordOp::Cmp, Word::S), mode),
            _ => page0(byte),
        },
        _ => page0(byte),
    }
}
