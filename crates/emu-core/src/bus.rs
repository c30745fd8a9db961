//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// Components access memory and peripherals through this trait. The bus
/// handles address decoding and routing to the appropriate device.
///
/// Each call is one bus cycle. A CPU that needs a cycle purely for timing
/// still calls `read` (conventionally at `$FFFF`) and discards the result,
/// so peripherals that count cycles stay in step.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// Flat 64 KiB RAM with no decoding.
///
/// Useful for tests and for running bare CPU programs. Counts every access
/// so callers can check cycle totals without instrumenting the CPU.
#[derive(Debug, Clone)]
pub struct SimpleBus {
    ram: Box<[u8; 0x10000]>,
    cycles: u64,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    /// Create a bus with all 64 KiB zeroed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
            cycles: 0,
        }
    }

    /// Copy `data` into RAM starting at `address`, wrapping at `$FFFF`.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read a byte without counting a cycle.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    /// Write a byte without counting a cycle.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }

    /// Number of bus cycles seen so far.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.cycles += 1;
        self.ram[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.cycles += 1;
        self.ram[usize::from(address)] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_wraps_at_top_of_memory() {
        let mut bus = SimpleBus::new();
        bus.load(0xFFFF, &[0x12, 0x34]);
        assert_eq!(bus.peek(0xFFFF), 0x12);
        assert_eq!(bus.peek(0x0000), 0x34);
        assert_eq!(bus.cycles(), 0);
    }

    #[test]
    fn every_access_counts_a_cycle() {
        let mut bus = SimpleBus::new();
        bus.write(0x1000, 0xAA);
        assert_eq!(bus.read(0x1000), 0xAA);
        let _ = bus.read(0xFFFF);
        assert_eq!(bus.cycles(), 3);
    }
}
