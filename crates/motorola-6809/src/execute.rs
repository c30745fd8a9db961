//! Instruction bodies.
//!
//! `queue_body` lays down the bus cycles an instruction makes once its
//! address is known; `operate` is the zero-cycle step where the result is
//! computed and registers change. Cycle totals, opcode fetch included:
//!
//! | Instruction | Imm | Dir | Ext | Idx |
//! |---|---|---|---|---|
//! | LDA/ADDA/...     | 2 | 4 | 5 | 4+ |
//! | STA              | - | 4 | 5 | 4+ |
//! | LDD/LDX/LDU      | 3 | 5 | 6 | 5+ |
//! | SUBD/ADDD/CMPX   | 4 | 6 | 7 | 6+ |
//! | NEG/INC/CLR/...  | - | 6 | 7 | 6+ |
//! | TST              | - | 6 | 7 | 6+ |
//! | JMP              | - | 3 | 4 | 3+ |
//! | JSR              | - | 7 | 8 | 7+ |
//!
//! Page-2/3 forms add one cycle for the prefix.

use crate::addressing::offset8;
use crate::alu;
use crate::cpu::{Mc6809, State};
use crate::flags::{Cc, E, H, Z};
use crate::microcode::{Action, MicroOp};
use crate::opcodes::{Instruction, Mode, Op, Target, Unary, WordOp};
use crate::registers::{Part, Stack, Word};

impl Mc6809 {
    pub(crate) fn queue_body(&mut self, instr: Instruction) {
        use MicroOp::{
            Dummy, Exec, FetchOperand, PeekEa, PeekPc, PeekStack, Pull, Push, Read, WriteByte,
            WriteHigh, WriteLow, WritePc,
        };
        const OPERATE: MicroOp = MicroOp::Exec(Action::Operate);

        let immediate = instr.mode == Mode::Immediate;
        let operand8 = if immediate { FetchOperand } else { Read(0) };
        let operand16: [MicroOp; 2] = if immediate {
            [FetchOperand, FetchOperand]
        } else {
            [Read(0), Read(1)]
        };
        let q = &mut self.queue;

        match instr.op {
            Op::Prefix(_) | Op::Nop => q.push(PeekPc),
            Op::Unary(Unary::Tst, Target::Memory) => q.extend(&[Read(0), Dummy, Dummy, OPERATE]),
            Op::Unary(_, Target::Memory) => q.extend(&[Read(0), Dummy, OPERATE, WriteByte]),
            Op::Unary(_, Target::Acc(_)) | Op::Daa | Op::Sex => q.extend(&[PeekPc, OPERATE]),
            Op::Alu(..) => q.extend(&[operand8, OPERATE]),
            Op::Store(_) => q.extend(&[OPERATE, WriteByte]),
            Op::StoreImmediate(_) => q.extend(&[FetchOperand, OPERATE]),
            Op::Arith16(..) => {
                q.extend(&operand16);
                q.extend(&[Dummy, OPERATE]);
            }
            Op::Load16(_) => {
                q.extend(&operand16);
                q.push(OPERATE);
            }
            Op::Store16(_) => q.extend(&[OPERATE, WriteHigh, WriteLow]),
            Op::Store16Immediate(_) => q.extend(&[FetchOperand, OPERATE, WritePc]),
            Op::Jmp => q.push(OPERATE),
            Op::Jsr => q.extend(&[
                PeekEa,
                Dummy,
                Push(Stack::S, Part::PcLo),
                Push(Stack::S, Part::PcHi),
                OPERATE,
            ]),
            Op::Bsr => q.extend(&[
                FetchOperand,
                Exec(Action::BranchTarget8),
                Dummy,
                PeekEa,
                Dummy,
                Push(Stack::S, Part::PcLo),
                Push(Stack::S, Part::PcHi),
                OPERATE,
            ]),
            Op::Lbsr => q.extend(&[
                FetchOperand,
                FetchOperand,
                Exec(Action::BranchTarget16),
                Dummy,
                Dummy,
                PeekEa,
                Dummy,
                Push(Stack::S, Part::PcLo),
                Push(Stack::S, Part::PcHi),
                OPERATE,
            ]),
            Op::Lbra => q.extend(&[FetchOperand, FetchOperand, Dummy, Dummy, OPERATE]),
            Op::Branch(_) => q.extend(&[FetchOperand, Dummy, OPERATE]),
            // Taken long branches add a dummy cycle from `operate`.
            Op::LongBranch(_) => q.extend(&[FetchOperand, FetchOperand, Dummy, OPERATE]),
            Op::Lea(_) => q.extend(&[Dummy, OPERATE]),
            Op::Push(stack) => q.extend(&[FetchOperand, Dummy, Dummy, PeekStack(stack), OPERATE]),
            Op::Pull(_) => q.extend(&[FetchOperand, Dummy, Dummy, OPERATE]),
            Op::Rts => q.extend(&[
                PeekPc,
                Pull(Stack::S, Part::PcHi),
                Pull(Stack::S, Part::PcLo),
                Dummy,
            ]),
            Op::Abx => q.extend(&[PeekPc, Dummy, OPERATE]),
            Op::Rti => q.extend(&[PeekPc, Pull(Stack::S, Part::Cc), OPERATE]),
            Op::Cwai => {
                q.extend(&[FetchOperand, OPERATE, PeekPc]);
                self.queue_frame(true);
                self.queue.push(Exec(Action::Enter(State::DispatchIrq)));
            }
            Op::Mul => {
                q.push(PeekPc);
                q.extend(&[Dummy; 8]);
                q.extend(&[OPERATE, Dummy]);
            }
            Op::Software(kind) => {
                q.push(PeekPc);
                self.queue_frame(true);
                self.queue.push(Exec(Action::Vector(kind.vector())));
            }
            Op::Sync => q.extend(&[PeekPc, Exec(Action::Enter(State::Sync))]),
            Op::Orcc | Op::Andcc => q.extend(&[FetchOperand, OPERATE, PeekPc]),
            Op::AndccSlow => q.extend(&[FetchOperand, OPERATE, PeekPc, Dummy]),
            Op::Exg => {
                q.push(FetchOperand);
                q.extend(&[Dummy; 6]);
                q.push(OPERATE);
            }
            Op::Tfr => {
                q.push(FetchOperand);
                q.extend(&[Dummy; 4]);
                q.push(OPERATE);
            }
            Op::ShiftCc => q.extend(&[PeekPc, OPERATE, Dummy]),
            Op::Hcf => q.push(Exec(Action::Enter(State::Hcf))),
        }
    }

    /// Compute the decoded instruction's result from `data`/`ea`.
    pub(crate) fn operate(&mut self) {
        let cc = self.regs.cc;
        match self.instr.op {
            Op::Unary(op, target) => {
                let value = match target {
                    Target::Memory => self.data as u8,
                    Target::Acc(acc) => self.regs.acc(acc),
                };
                let r = alu::unary(op, cc, value);
                self.regs.cc = r.cc;
                match target {
                    Target::Memory => self.result = u16::from(r.value),
                    Target::Acc(acc) => self.regs.set_acc(acc, r.value),
                }
            }
            Op::Alu(op, acc) => {
                let r = alu::binary(op, cc, self.regs.acc(acc), self.data as u8);
                self.regs.cc = r.cc;
                if op.writes_back() {
                    self.regs.set_acc(acc, r.value);
                }
            }
            Op::Store(acc) => {
                let r = alu::logic8(cc, self.regs.acc(acc));
                self.regs.cc = r.cc;
                self.result = u16::from(r.value);
            }
            Op::StoreImmediate(_) => self.regs.cc = alu::discard(cc),
            Op::Arith16(op, reg) => {
                let r = alu::word(op, cc, self.regs.word(reg), self.data);
                self.regs.cc = r.cc;
                if op != WordOp::Cmp {
                    self.load_word(reg, r.value);
                }
            }
            Op::Load16(reg) => {
                let r = alu::logic16(cc, self.data);
                self.regs.cc = r.cc;
                self.load_word(reg, r.value);
            }
            Op::Store16(reg) => {
                let r = alu::logic16(cc, self.regs.word(reg));
                self.regs.cc = r.cc;
                self.result = r.value;
            }
            Op::Store16Immediate(reg) => {
                self.result = self.regs.word(reg);
                self.regs.cc = alu::discard(cc);
            }
            Op::Jmp | Op::Jsr | Op::Bsr | Op::Lbsr => self.regs.pc = self.ea,
            Op::Lbra => self.regs.pc = self.regs.pc.wrapping_add(self.data),
            Op::Branch(cond) => {
                if cond.holds(cc) {
                    self.regs.pc = self.regs.pc.wrapping_add(offset8(self.data));
                }
            }
            Op::LongBranch(cond) => {
                if cond.holds(cc) {
                    self.regs.pc = self.regs.pc.wrapping_add(self.data);
                    self.queue.push(MicroOp::Dummy);
                }
            }
            Op::Lea(reg) => {
                if matches!(reg, Word::X | Word::Y) {
                    self.regs.cc.set_if(Z, self.ea == 0);
                }
                self.load_word(reg, self.ea);
            }
            Op::Push(stack) => self.queue_push_list(stack, self.data as u8),
            Op::Pull(stack) => self.queue_pull_list(stack, self.data as u8),
            Op::Rti => {
                if cc.is_set(E) {
                    self.queue.extend(&RTI_ENTIRE);
                }
                self.queue.extend(&[
                    MicroOp::Pull(Stack::S, Part::PcHi),
                    MicroOp::Pull(Stack::S, Part::PcLo),
                    MicroOp::Dummy,
                ]);
            }
            Op::Cwai | Op::Andcc | Op::AndccSlow => self.regs.cc = Cc(cc.0 & self.data as u8),
            Op::Orcc => self.regs.cc = Cc(cc.0 | self.data as u8),
            Op::Mul => {
                let r = alu::mul(cc, self.regs.a(), self.regs.b());
                self.regs.cc = r.cc;
                self.regs.d = r.value;
            }
            Op::Daa => {
                let r = alu::daa(cc, self.regs.a());
                self.regs.cc = r.cc;
                self.regs.set_a(r.value);
            }
            Op::Sex => {
                let r = alu::sex(cc, self.regs.b());
                self.regs.cc = r.cc;
                self.regs.d = r.value;
            }
            Op::Exg => {
                let postbyte = self.data as u8;
                let (first, second) = (postbyte >> 4, postbyte & 0x0F);
                let a = self.regs.transfer_source(first);
                let b = self.regs.transfer_source(second);
                self.transfer(first, b);
                self.transfer(second, a);
            }
            Op::Tfr => {
                let postbyte = self.data as u8;
                let value = self.regs.transfer_source(postbyte >> 4);
                self.transfer(postbyte & 0x0F, value);
            }
            Op::ShiftCc => self.regs.cc = Cc((cc.0 << 1) & (H | Z)),
            Op::Abx => self.regs.x = self.regs.x.wrapping_add(u16::from(self.regs.b())),
            Op::Prefix(_) | Op::Nop | Op::Rts | Op::Software(_) | Op::Sync | Op::Hcf => {}
        }
    }

    /// Load a 16-bit register from an instruction. Any load of S arms NMI.
    fn load_word(&mut self, reg: Word, value: u16) {
        self.regs.set_word(reg, value);
        if reg == Word::S {
            self.lines.arm_nmi();
        }
    }

    fn transfer(&mut self, code: u8, value: u16) {
        self.regs.transfer_dest(code, value);
        if code & 0x0F == 0x4 {
            self.lines.arm_nmi();
        }
    }

    /// PSHx: PC first, CC last, so the frame reads upward in the same
    /// order as an interrupt frame.
    fn queue_push_list(&mut self, stack: Stack, postbyte: u8) {
        let (other_hi, other_lo) = other_stack_parts(stack);
        let order = [
            (0x80, Part::PcLo),
            (0x80, Part::PcHi),
            (0x40, other_lo),
            (0x40, other_hi),
            (0x20, Part::YLo),
            (0x20, Part::YHi),
            (0x10, Part::XLo),
            (0x10, Part::XHi),
            (0x08, Part::Dp),
            (0x04, Part::B),
            (0x02, Part::A),
            (0x01, Part::Cc),
        ];
        for (bit, part) in order {
            if postbyte & bit != 0 {
                self.queue.push(MicroOp::Push(stack, part));
            }
        }
    }

    /// PULx: CC first, PC last, then one read of the final stack address.
    fn queue_pull_list(&mut self, stack: Stack, postbyte: u8) {
        let (other_hi, other_lo) = other_stack_parts(stack);
        let order = [
            (0x01, Part::Cc),
            (0x02, Part::A),
            (0x04, Part::B),
            (0x08, Part::Dp),
            (0x10, Part::XHi),
            (0x10, Part::XLo),
            (0x20, Part::YHi),
            (0x20, Part::YLo),
            (0x40, other_hi),
            (0x40, other_lo),
            (0x80, Part::PcHi),
            (0x80, Part::PcLo),
        ];
        for (bit, part) in order {
            if postbyte & bit != 0 {
                self.queue.push(MicroOp::Pull(stack, part));
            }
        }
        self.queue.push(MicroOp::PeekStack(stack));
    }
}

/// The register PSHS/PULS bit 6 moves is U; for PSHU/PULU it is S.
fn other_stack_parts(stack: Stack) -> (Part, Part) {
    match stack.other() {
        Word::S => (Part::SHi, Part::SLo),
        _ => (Part::UHi, Part::ULo),
    }
}

const RTI_ENTIRE: [MicroOp; 9] = [
    MicroOp::Pull(Stack::S, Part::A),
    MicroOp::Pull(Stack::S, Part::B),
    MicroOp::Pull(Stack::S, Part::Dp),
    MicroOp::Pull(Stack::S, Part::XHi),
    MicroOp::Pull(Stack::S, Part::XLo),
    MicroOp::Pull(Stack::S, Part::YHi),
    MicroOp::Pull(Stack::S, Part::YLo),
    MicroOp::Pull(Stack::S, Part::UHi),
    MicroOp::Pull(Stack::S, Part::ULo),
];
