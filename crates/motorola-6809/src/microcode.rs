//! Micro-operation definitions for cycle-accurate 6809 execution.
//!
//! Each instruction is broken down into a sequence of micro-operations.
//! Every [`MicroOp`] except `Exec` is exactly one bus cycle. `Exec` runs an
//! internal [`Action`] with no bus traffic; actions may queue further
//! micro-ops, which is how data-dependent sequences (long branches, PSHx,
//! RTI) grow once their operand is known.
//!
//! The queue lives in the CPU, not on the call stack, so execution can stop
//! between any two bus cycles and carry on later.

use crate::cpu::State;
use crate::interrupts::Vector;
use crate::registers::{Part, Stack};

/// A single step of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MicroOp {
    /// Read opcode at PC, increment PC, decode. Prefix bytes queue another
    /// fetch; anything else queues the instruction.
    FetchOpcode,

    /// Read byte at PC, increment PC, shift into `data`.
    FetchOperand,

    /// Read byte at PC, increment PC, shift into `ea`.
    FetchAddress,

    /// Read byte at PC, increment PC, `ea = DP:byte`.
    FetchDirect,

    /// Read indexed postbyte at PC, increment PC, queue the address
    /// calculation it selects.
    FetchPostbyte,

    /// Read at PC without consuming the byte.
    PeekPc,

    /// Read at PC + 1 without consuming anything.
    PeekPcNext,

    /// Read at `ea`, result ignored.
    PeekEa,

    /// Read at the current stack pointer, result ignored.
    PeekStack(Stack),

    /// Cycle with no valid memory address (read of `$FFFF`).
    Dummy,

    /// Operand read at `ea + offset`, shifted into `data`.
    Read(u8),

    /// Pointer read at `ea + offset` (indirection or vector), shifted into
    /// `data`. Not reported to watch hooks.
    ReadPointer(u8),

    /// Write low byte of `result` to `ea`.
    WriteByte,

    /// Write high byte of `result` to `ea`.
    WriteHigh,

    /// Write low byte of `result` to `ea + 1`.
    WriteLow,

    /// Write low byte of `result` to PC, increment PC.
    WritePc,

    /// Pre-decrement the stack and write one register byte.
    Push(Stack, Part),

    /// Read one register byte and post-increment the stack.
    Pull(Stack, Part),

    /// Internal step, no bus cycle.
    Exec(Action),
}

impl MicroOp {
    /// True for every step that occupies a bus cycle.
    #[must_use]
    pub const fn uses_bus(self) -> bool {
        !matches!(self, MicroOp::Exec(_))
    }
}

/// Internal steps scheduled between bus cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// Apply the decoded instruction's effect.
    Operate,
    /// `ea = R + (i8)data`.
    IndexOffset8,
    /// `ea = R + data`.
    IndexOffset16,
    /// `ea = PC + (i8)data`.
    PcOffset8,
    /// `ea = PC + data`.
    PcOffset16,
    /// `ea = data`, after an indirect pointer read.
    Indirect,
    /// BSR target: `ea = PC + (i8)data`.
    BranchTarget8,
    /// LBSR target: `ea = PC + data`.
    BranchTarget16,
    /// Set or clear E before CC is stacked.
    MarkEntire(bool),
    /// Mask interrupts and queue the vector fetch.
    Vector(Vector),
    /// `PC = data`, after a vector fetch.
    Jump,
    /// Leave normal instruction flow for SYNC, CWAI or HCF.
    Enter(State),
}

const CAPACITY: usize = 32;

/// Queue of pending micro-operations.
/// Fixed size to avoid allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MicroOpQueue {
    ops: [MicroOp; CAPACITY],
    len: u8,
    pos: u8,
}

impl Default for MicroOpQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MicroOpQueue {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ops: [MicroOp::Dummy; CAPACITY],
            len: 0,
            pos: 0,
        }
    }

    /// Clear the queue and start fresh.
    pub fn clear(&mut self) {
        self.len = 0;
        self.pos = 0;
    }

    /// Push a micro-op onto the queue.
    pub fn push(&mut self, op: MicroOp) {
        // Space is reclaimed once a sequence fully drains.
        if self.pos >= self.len {
            self.clear();
        }
        debug_assert!(usize::from(self.len) < CAPACITY, "MicroOp queue overflow");
        if let Some(slot) = self.ops.get_mut(usize::from(self.len)) {
            *slot = op;
            self.len += 1;
        }
    }

    pub fn extend(&mut self, ops: &[MicroOp]) {
        for &op in ops {
            self.push(op);
        }
    }

    /// Get the current micro-op, if any.
    #[must_use]
    pub fn current(&self) -> Option<MicroOp> {
        if self.pos < self.len {
            Some(self.ops[usize::from(self.pos)])
        } else {
            None
        }
    }

    /// Advance to the next micro-op.
    pub fn advance(&mut self) {
        if self.pos < self.len {
            self.pos += 1;
        }
    }

    /// Step back onto the micro-op just advanced past.
    pub fn rewind(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// Check if queue is empty (all ops consumed).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.len
    }

    /// Ops still to run.
    #[must_use]
    pub fn pending(&self) -> &[MicroOp] {
        let end = usize::from(self.len).min(CAPACITY);
        let start = usize::from(self.pos).min(end);
        &self.ops[start..end]
    }

    /// A queue restored from outside is usable only if its cursor is in
    /// range.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.pos <= self.len && usize::from(self.len) <= CAPACITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_order() {
        let mut q = MicroOpQueue::new();
        q.extend(&[MicroOp::FetchOperand, MicroOp::Dummy, MicroOp::Exec(Action::Operate)]);
        assert_eq!(q.current(), Some(MicroOp::FetchOperand));
        q.advance();
        assert_eq!(q.pending(), &[MicroOp::Dummy, MicroOp::Exec(Action::Operate)]);
        q.advance();
        q.advance();
        assert!(q.is_empty());
        assert_eq!(q.current(), None);
    }

    #[test]
    fn push_after_drain_reuses_space() {
        let mut q = MicroOpQueue::new();
        for _ in 0..CAPACITY {
            q.push(MicroOp::Dummy);
            q.advance();
        }
        q.push(MicroOp::PeekPc);
        assert_eq!(q.pending(), &[MicroOp::PeekPc]);
    }

    #[test]
    fn rewind_replays_the_last_op() {
        let mut q = MicroOpQueue::new();
        q.push(MicroOp::FetchOpcode);
        q.advance();
        q.rewind();
        assert_eq!(q.current(), Some(MicroOp::FetchOpcode));
    }

    #[test]
    fn only_exec_is_free() {
        assert!(MicroOp::Dummy.uses_bus());
        assert!(MicroOp::Push(Stack::S, Part::Cc).uses_bus());
        assert!(!MicroOp::Exec(Action::Jump).uses_bus());
    }
}
