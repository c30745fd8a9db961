//! Cycle-accurate Motorola 6809 CPU emulator.
//!
//! The 6809 performs one bus access per cycle, including its internal
//! "don't care" cycles. Each `tick()` advances exactly one cycle, and
//! execution can be suspended between any two cycles: the dispatcher
//! state, the queue of pending micro-ops and every intermediate operand
//! live in [`Mc6809`], so [`Mc6809::snapshot`] captures a resumable CPU
//! even in the middle of an instruction or interrupt entry.

mod addressing;
pub mod alu;
mod cpu;
mod error;
mod execute;
pub mod flags;
mod hooks;
mod interrupts;
mod lines;
mod microcode;
pub mod opcodes;
mod registers;

pub use cpu::{Mc6809, RunOutcome, Snapshot, State, Stop};
pub use error::SnapshotError;
pub use flags::Cc;
pub use hooks::{HookAction, InstructionHook, PostHook, WatchHook};
pub use interrupts::Vector;
pub use lines::{InterruptLines, Signals};
pub use microcode::{Action, MicroOp, MicroOpQueue};
pub use registers::{Acc, Part, Registers, Stack, Word};
