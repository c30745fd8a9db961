//! Core traits and types for cycle-accurate emulation.
//!
//! A CPU advances one bus cycle per tick. Every memory access, including
//! the ones the silicon only performs for timing, goes through [`Bus`] so
//! the rest of the machine sees each cycle.

mod bus;
mod cpu;
mod observable;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
