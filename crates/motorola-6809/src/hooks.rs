//! Optional instrumentation hooks.
//!
//! Hooks observe; they never drive the bus. An uninstalled hook costs a
//! branch and nothing else.

use std::fmt;

use crate::registers::Registers;

/// What the instruction hook wants the CPU to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Fetch and execute the instruction.
    Continue,
    /// Return from `run` before the opcode fetch. The hook is not asked
    /// again for the same fetch when execution resumes.
    Break,
}

/// Called once before each instruction's first opcode fetch.
pub type InstructionHook = Box<dyn FnMut(&Registers) -> HookAction>;

/// Called once after each instruction completes.
pub type PostHook = Box<dyn FnMut(&Registers)>;

/// Called with `(address, value)` for each operand read or write.
pub type WatchHook = Box<dyn FnMut(u16, u8)>;

#[derive(Default)]
pub(crate) struct Hooks {
    pub instruction: Option<InstructionHook>,
    pub posthook: Option<PostHook>,
    pub read: Option<WatchHook>,
    pub write: Option<WatchHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("instruction", &self.instruction.is_some())
            .field("posthook", &self.posthook.is_some())
            .field("read", &self.read.is_some())
            .field("write", &self.write.is_some())
            .finish()
    }
}
