//! CPU core trait.

use crate::Bus;

/// A CPU core.
///
/// CPUs execute instructions and access memory through a bus. The bus is
/// passed into `tick` rather than owned, so the same bus can be shared with
/// other components and a CPU can never run without one.
///
/// Interrupt inputs are levels. A core decides itself whether it reacts to
/// an edge or to the level, and when the change becomes visible.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Advance the CPU by one bus cycle.
    fn tick<B: Bus>(&mut self, bus: &mut B);

    /// Returns the current program counter.
    ///
    /// Returns `u32` so cores with wider address buses share the trait.
    /// Narrower CPUs zero-extend.
    fn pc(&self) -> u32;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is not executing instructions.
    fn is_halted(&self) -> bool;

    /// Drive the maskable interrupt request input.
    fn set_irq(&mut self, level: bool);

    /// Drive the non-maskable interrupt input.
    fn set_nmi(&mut self, level: bool);

    /// Reset the CPU to its initial state.
    fn reset(&mut self);
}
