//! 6809 CPU implementation.
//!
//! Cycle-accurate emulation where each `tick()` performs exactly one bus
//! access. Between instructions the CPU walks a small set of dispatcher
//! states (reset, halt checks, interrupt arbitration, SYNC, CWAI, HCF);
//! inside an instruction it drains a queue of micro-ops. Both live in the
//! CPU struct, so execution can stop after any bus cycle and resume later,
//! or be saved with [`Mc6809::snapshot`] and restored elsewhere.

use emu_core::{Bus, Cpu, Observable, Ticks, Value};

use crate::error::SnapshotError;
use crate::flags::{C, E, F, H, I, N, V, Z};
use crate::hooks::{HookAction, Hooks};
use crate::interrupts::Vector;
use crate::lines::InterruptLines;
use crate::microcode::{Action, MicroOp, MicroOpQueue};
use crate::opcodes::{self, Instruction, Op};
use crate::registers::{Part, Registers};

/// Address driven during cycles with no valid memory access.
const DUMMY_ADDRESS: u16 = 0xFFFF;

/// Dispatcher state: where execution picks up on the next bus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum State {
    /// Reset requested; registers are initialised on the next cycle.
    Reset,
    /// Waiting for HALT to drop before fetching the reset vector.
    ResetCheckHalt,
    /// Instruction boundary: idle while HALT is active.
    LabelA,
    /// Instruction boundary: check for interrupts.
    LabelB,
    /// Frame stacked; vector to the highest-priority active interrupt.
    DispatchIrq,
    /// CWAI waiting: check for an interrupt, else idle one cycle.
    CwaiCheckHalt,
    /// Fetching and executing an instruction.
    NextInstruction,
    /// SYNC waiting for any interrupt input.
    Sync,
    /// SYNC waiting with HALT active.
    SyncCheckHalt,
    /// Locked by an HCF opcode until reset.
    Hcf,
}

impl State {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            State::Reset => "reset",
            State::ResetCheckHalt => "reset-check-halt",
            State::LabelA => "label-a",
            State::LabelB => "label-b",
            State::DispatchIrq => "dispatch-irq",
            State::CwaiCheckHalt => "cwai-check-halt",
            State::NextInstruction => "next-instruction",
            State::Sync => "sync",
            State::SyncCheckHalt => "sync-check-halt",
            State::Hcf => "hcf",
        }
    }
}

/// Why `run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// The cycle budget was used up.
    Budget,
    /// The instruction hook asked to stop before an opcode fetch.
    Breakpoint,
}

/// Result of [`Mc6809::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Bus cycles performed.
    pub cycles: u64,
    pub stop: Stop,
}

/// Everything needed to resume a CPU between any two bus cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub regs: Registers,
    pub lines: InterruptLines,
    pub state: State,
    pub queue: MicroOpQueue,
    pub instr: Instruction,
    pub page: u8,
    pub postbyte: u8,
    pub ea: u16,
    pub data: u16,
    pub result: u16,
    pub hooked: bool,
    pub total_cycles: Ticks,
}

/// Outcome of one micro-op.
enum Step {
    Cycle,
    Internal,
    Break,
}

/// Outcome of one `clock` call.
enum Tick {
    Cycle,
    Break,
}

/// The Motorola 6809 CPU.
///
/// Implements cycle-accurate execution where each `tick()` advances
/// exactly one CPU cycle. The 6809 performs one bus access per cycle,
/// including its "don't care" cycles, which read `$FFFF`.
#[derive(Debug)]
pub struct Mc6809 {
    /// CPU registers.
    pub regs: Registers,

    /// Interrupt and halt inputs.
    pub(crate) lines: InterruptLines,

    /// Current dispatcher state.
    pub(crate) state: State,

    /// Remaining steps of the current instruction or interrupt sequence.
    pub(crate) queue: MicroOpQueue,

    /// Instruction being executed.
    pub(crate) instr: Instruction,

    /// Opcode page selected by a prefix (0, 2 or 3).
    page: u8,

    /// Indexed-mode postbyte.
    pub(crate) postbyte: u8,

    /// Effective address.
    pub(crate) ea: u16,

    /// Operand bytes, shifted in most significant first.
    pub(crate) data: u16,

    /// Value an instruction is about to write.
    pub(crate) result: u16,

    /// The instruction hook has already seen this fetch.
    hooked: bool,

    /// Total cycles executed.
    total_cycles: Ticks,

    hooks: Hooks,
}

impl Default for Mc6809 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mc6809 {
    /// Create a new 6809. The first ticks run the reset sequence.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            lines: InterruptLines::new(),
            state: State::Reset,
            queue: MicroOpQueue::new(),
            instr: Instruction::NOP,
            page: 0,
            postbyte: 0,
            ea: 0,
            data: 0,
            result: 0,
            hooked: false,
            total_cycles: Ticks::ZERO,
            hooks: Hooks::default(),
        }
    }

    // =========================================================================
    // Public control
    // =========================================================================

    /// Run until `budget` bus cycles have been performed or the instruction
    /// hook asks to stop.
    pub fn run<B: Bus>(&mut self, bus: &mut B, budget: u64) -> RunOutcome {
        let mut cycles = 0;
        while cycles < budget {
            match self.clock(bus) {
                Tick::Cycle => cycles += 1,
                Tick::Break => {
                    return RunOutcome {
                        cycles,
                        stop: Stop::Breakpoint,
                    };
                }
            }
        }
        RunOutcome {
            cycles,
            stop: Stop::Budget,
        }
    }

    /// Run one instruction, including any interrupt entry that follows it.
    ///
    /// Returns after the CPU is ready to fetch a new opcode, or as soon as
    /// it is waiting (SYNC, CWAI, HALT, HCF), or on a breakpoint. Returns
    /// the number of bus cycles used.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u64 {
        let mut cycles = 0;
        loop {
            match self.clock(bus) {
                Tick::Cycle => cycles += 1,
                Tick::Break => return cycles,
            }
            if self.at_instruction_boundary() || self.is_waiting() {
                return cycles;
            }
        }
    }

    /// Re-enter the reset sequence.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.page = 0;
        self.hooked = false;
        self.state = State::Reset;
    }

    /// Jump to `pc`, abandoning any partly executed instruction.
    pub fn set_pc(&mut self, pc: u16) {
        self.regs.pc = pc;
        self.queue.clear();
        self.queue.push(MicroOp::FetchOpcode);
        self.page = 0;
        self.hooked = false;
        self.state = State::NextInstruction;
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    pub fn set_halt(&mut self, level: bool) {
        self.lines.input.halt = level;
    }

    pub fn set_nmi(&mut self, level: bool) {
        self.lines.input.nmi = level;
    }

    pub fn set_firq(&mut self, level: bool) {
        self.lines.input.firq = level;
    }

    pub fn set_irq(&mut self, level: bool) {
        self.lines.input.irq = level;
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn lines(&self) -> &InterruptLines {
        &self.lines
    }

    #[must_use]
    pub fn nmi_armed(&self) -> bool {
        self.lines.nmi_armed()
    }

    /// True once an HCF opcode has locked the CPU.
    #[must_use]
    pub fn is_hcf(&self) -> bool {
        self.state == State::Hcf
    }

    #[must_use]
    pub fn total_cycles(&self) -> Ticks {
        self.total_cycles
    }

    /// True when the next tick starts a fresh instruction fetch.
    #[must_use]
    pub fn at_instruction_boundary(&self) -> bool {
        self.state == State::NextInstruction
            && self.page == 0
            && self.queue.current() == Some(MicroOp::FetchOpcode)
    }

    /// True while the CPU idles waiting for an input to change.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        match self.state {
            State::Sync | State::SyncCheckHalt | State::CwaiCheckHalt | State::Hcf => true,
            State::LabelA | State::ResetCheckHalt => {
                self.queue.is_empty() && self.lines.active.halt
            }
            _ => false,
        }
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    /// Install a hook called before each instruction.
    pub fn set_instruction_hook(&mut self, hook: impl FnMut(&Registers) -> HookAction + 'static) {
        self.hooks.instruction = Some(Box::new(hook));
    }

    /// Install a hook called after each instruction.
    pub fn set_instruction_posthook(&mut self, hook: impl FnMut(&Registers) + 'static) {
        self.hooks.posthook = Some(Box::new(hook));
    }

    /// Install a hook called on every operand read.
    pub fn set_read_hook(&mut self, hook: impl FnMut(u16, u8) + 'static) {
        self.hooks.read = Some(Box::new(hook));
    }

    /// Install a hook called on every operand write.
    pub fn set_write_hook(&mut self, hook: impl FnMut(u16, u8) + 'static) {
        self.hooks.write = Some(Box::new(hook));
    }

    pub fn clear_hooks(&mut self) {
        self.hooks = Hooks::default();
    }

    // =========================================================================
    // Save states
    // =========================================================================

    /// Capture the complete execution state. Hooks are not included.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            regs: self.regs,
            lines: self.lines,
            state: self.state,
            queue: self.queue.clone(),
            instr: self.instr,
            page: self.page,
            postbyte: self.postbyte,
            ea: self.ea,
            data: self.data,
            result: self.result,
            hooked: self.hooked,
            total_cycles: self.total_cycles,
        }
    }

    /// Resume from a snapshot. Installed hooks are kept.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<(), SnapshotError> {
        if !snapshot.queue.is_consistent() {
            return Err(SnapshotError::CorruptQueue);
        }
        if !matches!(snapshot.page, 0 | 2 | 3) {
            return Err(SnapshotError::InvalidPage(snapshot.page));
        }
        self.regs = snapshot.regs;
        self.lines = snapshot.lines;
        self.state = snapshot.state;
        self.queue = snapshot.queue;
        self.instr = snapshot.instr;
        self.page = snapshot.page;
        self.postbyte = snapshot.postbyte;
        self.ea = snapshot.ea;
        self.data = snapshot.data;
        self.result = snapshot.result;
        self.hooked = snapshot.hooked;
        self.total_cycles = snapshot.total_cycles;
        Ok(())
    }

    // =========================================================================
    // Bus cycle primitives
    // =========================================================================

    /// One read cycle. Interrupt inputs are promoted before and sampled
    /// after every access, dummy cycles included.
    fn read<B: Bus>(&mut self, bus: &mut B, address: u16) -> u8 {
        self.lines.promote();
        let value = bus.read(address);
        self.lines.sample();
        self.total_cycles += Ticks::new(1);
        value
    }

    fn write<B: Bus>(&mut self, bus: &mut B, address: u16, value: u8) {
        self.lines.promote();
        bus.write(address, value);
        self.lines.sample();
        self.total_cycles += Ticks::new(1);
    }

    fn idle<B: Bus>(&mut self, bus: &mut B) {
        let _ = self.read(bus, DUMMY_ADDRESS);
    }

    fn fetch<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = self.read(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    fn read_operand<B: Bus>(&mut self, bus: &mut B, address: u16) -> u8 {
        let value = self.read(bus, address);
        if let Some(hook) = self.hooks.read.as_mut() {
            hook(address, value);
        }
        value
    }

    fn write_operand<B: Bus>(&mut self, bus: &mut B, address: u16, value: u8) {
        self.write(bus, address, value);
        if let Some(hook) = self.hooks.write.as_mut() {
            hook(address, value);
        }
    }

    // =========================================================================
    // Dispatcher
    // =========================================================================

    /// Advance to the end of the next bus cycle. Zero-cycle work that
    /// follows the cycle (register updates, state transitions) is done
    /// before returning, so the CPU is always observed between cycles.
    fn clock<B: Bus>(&mut self, bus: &mut B) -> Tick {
        let mut cycled = false;
        loop {
            if let Some(op) = self.queue.current() {
                if cycled && op.uses_bus() {
                    return Tick::Cycle;
                }
                self.queue.advance();
                match self.perform(op, bus) {
                    Step::Cycle => cycled = true,
                    Step::Internal => {}
                    Step::Break => {
                        self.queue.rewind();
                        return Tick::Break;
                    }
                }
                continue;
            }

            match self.state {
                State::Reset => self.begin_reset(),
                State::ResetCheckHalt => {
                    if self.lines.active.halt {
                        return self.idle_cycle(bus, cycled);
                    }
                    log::debug!("6809 leaving reset, fetching vector");
                    self.ea = Vector::Reset.address();
                    self.queue.extend(&[
                        MicroOp::ReadPointer(0),
                        MicroOp::ReadPointer(1),
                        MicroOp::Exec(Action::Jump),
                        MicroOp::Dummy,
                    ]);
                    self.state = State::LabelA;
                }
                State::LabelA => {
                    if self.lines.active.halt {
                        return self.idle_cycle(bus, cycled);
                    }
                    self.state = State::LabelB;
                }
                State::LabelB => {
                    if !self.begin_interrupt() {
                        self.queue.push(MicroOp::FetchOpcode);
                        self.state = State::NextInstruction;
                    }
                }
                State::NextInstruction => {
                    self.retire();
                    self.state = State::LabelA;
                }
                State::DispatchIrq => {
                    if !self.dispatch_interrupt() {
                        self.state = State::CwaiCheckHalt;
                    }
                }
                State::CwaiCheckHalt => {
                    if cycled {
                        return Tick::Cycle;
                    }
                    if !self.lines.active.halt && self.dispatch_interrupt() {
                        continue;
                    }
                    self.idle(bus);
                    return Tick::Cycle;
                }
                State::Sync => {
                    if cycled {
                        return Tick::Cycle;
                    }
                    self.idle(bus);
                    if self.lines.active.any_interrupt() {
                        log::trace!("SYNC released at ${:04X}", self.regs.pc);
                        self.state = State::LabelB;
                    } else if self.lines.active.halt {
                        self.state = State::SyncCheckHalt;
                    }
                    return Tick::Cycle;
                }
                State::SyncCheckHalt => {
                    if cycled {
                        return Tick::Cycle;
                    }
                    self.idle(bus);
                    if !self.lines.active.halt {
                        self.state = State::Sync;
                    }
                    return Tick::Cycle;
                }
                State::Hcf => return self.idle_cycle(bus, cycled),
            }
        }
    }

    /// A cycle spent waiting, unless this tick already had its cycle.
    fn idle_cycle<B: Bus>(&mut self, bus: &mut B, cycled: bool) -> Tick {
        if !cycled {
            self.idle(bus);
        }
        Tick::Cycle
    }

    fn begin_reset(&mut self) {
        log::debug!("6809 reset");
        self.queue.clear();
        self.regs.dp = 0;
        self.regs.cc.set(I | F);
        self.lines.clear();
        self.page = 0;
        self.hooked = false;
        self.state = State::ResetCheckHalt;
    }

    /// End of an instruction.
    fn retire(&mut self) {
        if let Some(hook) = self.hooks.posthook.as_mut() {
            hook(&self.regs);
        }
    }

    /// Leave the instruction stream for a wait or lock state.
    fn enter(&mut self, state: State) {
        match state {
            State::Hcf => log::warn!(
                "HCF at ${:04X}: CPU locked until reset",
                self.regs.pc.wrapping_sub(1)
            ),
            _ => log::trace!("{} at ${:04X}", state.name(), self.regs.pc),
        }
        self.state = state;
        self.retire();
    }

    fn perform<B: Bus>(&mut self, op: MicroOp, bus: &mut B) -> Step {
        match op {
            MicroOp::FetchOpcode => return self.fetch_opcode(bus),
            MicroOp::FetchOperand => {
                let byte = self.fetch(bus);
                self.data = (self.data << 8) | u16::from(byte);
            }
            MicroOp::FetchAddress => {
                let byte = self.fetch(bus);
                self.ea = (self.ea << 8) | u16::from(byte);
            }
            MicroOp::FetchDirect => {
                let byte = self.fetch(bus);
                self.ea = u16::from_be_bytes([self.regs.dp, byte]);
            }
            MicroOp::FetchPostbyte => {
                self.postbyte = self.fetch(bus);
                self.queue_indexed();
            }
            MicroOp::PeekPc => {
                let _ = self.read(bus, self.regs.pc);
            }
            MicroOp::PeekPcNext => {
                let _ = self.read(bus, self.regs.pc.wrapping_add(1));
            }
            MicroOp::PeekEa => {
                let _ = self.read(bus, self.ea);
            }
            MicroOp::PeekStack(stack) => {
                let _ = self.read(bus, self.regs.stack(stack));
            }
            MicroOp::Dummy => self.idle(bus),
            MicroOp::Read(offset) => {
                let byte = self.read_operand(bus, self.ea.wrapping_add(u16::from(offset)));
                self.data = (self.data << 8) | u16::from(byte);
            }
            MicroOp::ReadPointer(offset) => {
                let byte = self.read(bus, self.ea.wrapping_add(u16::from(offset)));
                self.data = (self.data << 8) | u16::from(byte);
            }
            MicroOp::WriteByte => self.write_operand(bus, self.ea, self.result as u8),
            MicroOp::WriteHigh => self.write_operand(bus, self.ea, (self.result >> 8) as u8),
            MicroOp::WriteLow => {
                self.write_operand(bus, self.ea.wrapping_add(1), self.result as u8);
            }
            MicroOp::WritePc => {
                self.write_operand(bus, self.regs.pc, self.result as u8);
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            MicroOp::Push(stack, part) => {
                let address = self.regs.push(stack);
                self.write(bus, address, self.regs.part(part));
            }
            MicroOp::Pull(stack, part) => {
                let address = self.regs.pull(stack);
                let byte = self.read(bus, address);
                self.regs.set_part(part, byte);
                if matches!(part, Part::SHi | Part::SLo) {
                    self.lines.arm_nmi();
                }
            }
            MicroOp::Exec(action) => {
                self.act(action);
                return Step::Internal;
            }
        }
        Step::Cycle
    }

    fn fetch_opcode<B: Bus>(&mut self, bus: &mut B) -> Step {
        if self.page == 0 && !self.hooked {
            self.hooked = true;
            if let Some(hook) = self.hooks.instruction.as_mut() {
                if hook(&self.regs) == HookAction::Break {
                    return Step::Break;
                }
            }
        }

        let byte = self.fetch(bus);
        let instr = opcodes::decode(self.page, byte);
        if let Op::Prefix(page) = instr.op {
            // Only the first prefix counts; later ones just cost a cycle.
            if self.page == 0 {
                self.page = page;
            }
            self.queue.push(MicroOp::FetchOpcode);
            return Step::Cycle;
        }

        self.page = 0;
        self.hooked = false;
        self.instr = instr;
        self.begin(instr);
        Step::Cycle
    }

    fn act(&mut self, action: Action) {
        match action {
            Action::Operate => self.operate(),
            Action::IndexOffset8
            | Action::IndexOffset16
            | Action::PcOffset8
            | Action::PcOffset16
            | Action::Indirect
            | Action::BranchTarget8
            | Action::BranchTarget16 => self.resolve_offset(action),
            Action::MarkEntire(entire) => self.regs.cc.set_if(E, entire),
            Action::Vector(vector) => self.take_interrupt(vector),
            Action::Jump => self.regs.pc = self.data,
            Action::Enter(state) => self.enter(state),
        }
    }
}

impl Cpu for Mc6809 {
    type Registers = Registers;

    /// One bus cycle. A breakpoint raised by the instruction hook makes
    /// this a no-op; use [`Mc6809::run`] to observe it.
    fn tick<B: Bus>(&mut self, bus: &mut B) {
        let _ = self.clock(bus);
    }

    fn pc(&self) -> u32 {
        u32::from(self.regs.pc)
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    /// HALT holding the CPU, or HCF.
    fn is_halted(&self) -> bool {
        self.is_hcf()
            || (self.lines.active.halt
                && matches!(
                    self.state,
                    State::LabelA | State::ResetCheckHalt | State::SyncCheckHalt
                ))
    }

    fn set_irq(&mut self, level: bool) {
        self.lines.input.irq = level;
    }

    fn set_nmi(&mut self, level: bool) {
        self.lines.input.nmi = level;
    }

    fn reset(&mut self) {
        Mc6809::reset(self);
    }
}

impl Observable for Mc6809 {
    fn query(&self, path: &str) -> Option<Value> {
        let cc = self.regs.cc;
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a().into()),
            "b" => Some(self.regs.b().into()),
            "d" => Some(self.regs.d.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "u" => Some(self.regs.u.into()),
            "s" => Some(self.regs.s.into()),
            "dp" => Some(self.regs.dp.into()),
            "cc" => Some(cc.0.into()),
            "flags.c" => Some(cc.is_set(C).into()),
            "flags.v" => Some(cc.is_set(V).into()),
            "flags.z" => Some(cc.is_set(Z).into()),
            "flags.n" => Some(cc.is_set(N).into()),
            "flags.i" => Some(cc.is_set(I).into()),
            "flags.h" => Some(cc.is_set(H).into()),
            "flags.f" => Some(cc.is_set(F).into()),
            "flags.e" => Some(cc.is_set(E).into()),
            "state" => Some(self.state.name().into()),
            "cycle" => Some(self.total_cycles.get().into()),
            "halted" => Some(self.is_halted().into()),
            "hcf" => Some(self.is_hcf().into()),
            "nmi_armed" => Some(self.nmi_armed().into()),
            "lines.halt" => Some(self.lines.input.halt.into()),
            "lines.nmi" => Some(self.lines.input.nmi.into()),
            "lines.firq" => Some(self.lines.input.firq.into()),
            "lines.irq" => Some(self.lines.input.irq.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc",
            "a",
            "b",
            "d",
            "x",
            "y",
            "u",
            "s",
            "dp",
            "cc",
            "flags.c",
            "flags.v",
            "flags.z",
            "flags.n",
            "flags.i",
            "flags.h",
            "flags.f",
            "flags.e",
            "state",
            "cycle",
            "halted",
            "hcf",
            "nmi_armed",
            "lines.halt",
            "lines.nmi",
            "lines.firq",
            "lines.irq",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    #[test]
    fn test_lda_immediate() {
        let mut cpu = Mc6809::new();
        let mut bus = SimpleBus::new();

        // LDA #$42
        bus.load(0x1000, &[0x86, 0x42]);
        cpu.set_pc(0x1000);

        // Cycle 1: fetch opcode
        cpu.tick(&mut bus);
        assert_eq!(cpu.regs.a(), 0x00);
        // Cycle 2: fetch operand, load
        cpu.tick(&mut bus);

        assert_eq!(cpu.regs.a(), 0x42);
        assert_eq!(cpu.regs.pc, 0x1002);
        assert!(cpu.at_instruction_boundary());
        assert_eq!(bus.cycles(), 2);
    }

    #[test]
    fn test_sta_direct() {
        let mut cpu = Mc6809::new();
        let mut bus = SimpleBus::new();

        cpu.regs.set_a(0x55);
        cpu.regs.dp = 0x20;
        // STA <$10
        bus.load(0x1000, &[0x97, 0x10]);
        cpu.set_pc(0x1000);

        assert_eq!(cpu.step(&mut bus), 4);
        assert_eq!(bus.peek(0x2010), 0x55);
    }

    #[test]
    fn reset_fetches_vector() {
        let mut cpu = Mc6809::new();
        let mut bus = SimpleBus::new();
        bus.load(0xFFFE, &[0xC0, 0x00]);
        cpu.regs.dp = 0x12;
        cpu.regs.cc = crate::Cc(0);

        cpu.step(&mut bus);

        assert_eq!(cpu.regs.pc, 0xC000);
        assert_eq!(cpu.regs.dp, 0);
        assert!(cpu.regs.cc.is_set(I) && cpu.regs.cc.is_set(F));
        assert!(!cpu.nmi_armed());
        assert_eq!(cpu.state(), State::NextInstruction);
    }

    #[test]
    fn set_pc_abandons_partial_instruction() {
        let mut cpu = Mc6809::new();
        let mut bus = SimpleBus::new();
        // LDX $2000 interrupted after two cycles
        bus.load(0x1000, &[0xBE, 0x20, 0x00]);
        bus.load(0x3000, &[0x86, 0x01]);
        cpu.set_pc(0x1000);
        cpu.run(&mut bus, 2);

        cpu.set_pc(0x3000);
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.a(), 0x01);
        assert_eq!(cpu.regs.x, 0x0000);
        assert_eq!(cpu.regs.pc, 0x3002);
    }

    #[test]
    fn observable_paths_resolve() {
        let cpu = Mc6809::new();
        for path in cpu.query_paths() {
            assert!(cpu.query(path).is_some(), "{path}");
        }
        assert_eq!(cpu.query("state"), Some(Value::from("reset")));
        assert_eq!(cpu.query("flags.i"), Some(Value::Bool(true)));
        assert_eq!(cpu.query("bogus"), None);
    }
}
