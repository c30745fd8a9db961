//! Suspending and resuming between arbitrary bus cycles.
//!
//! A program with loops, stack traffic, a subroutine, SWI and a burst of
//! IRQ is run in one go, one cycle at a time, and split across a
//! serialized snapshot. All three must end in the same state.

use emu_core::SimpleBus;
use motorola_6809::{Mc6809, Snapshot, SnapshotError};

const TOTAL: u64 = 300;
const IRQ_ON: u64 = 100;
const IRQ_OFF: u64 = 140;

fn machine() -> (Mc6809, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(
        0x1000,
        &[
            0x10, 0xCE, 0x80, 0x00, // LDS #$8000
            0x1C, 0xEF, // ANDCC #$EF
            0x8E, 0x20, 0x00, // LDX #$2000
            0x86, 0x05, // LDA #5
            0xA7, 0x80, // loop: STA ,X+
            0x4A, // DECA
            0x26, 0xFB, // BNE loop
            0x34, 0x16, // PSHS X,B,A
            0xBD, 0x10, 0x20, // JSR $1020
            0x3D, // MUL
            0x3F, // SWI
            0x20, 0xFE, // BRA *
        ],
    );
    bus.load(0x1020, &[0x31, 0x23, 0x39]); // LEAY 3,Y; RTS
    bus.load(0x3000, &[0x3B]); // SWI: RTI
    bus.load(0x3200, &[0x3B]); // IRQ: RTI
    bus.load(0xFFF8, &[0x32, 0x00]);
    bus.load(0xFFFA, &[0x30, 0x00]);
    bus.load(0xFFFE, &[0x10, 0x00]);
    (Mc6809::new(), bus)
}

/// Run cycles `from..to` of the script, `chunk` cycles per `run` call.
fn script(cpu: &mut Mc6809, bus: &mut SimpleBus, from: u64, to: u64, chunk: u64) {
    let mut t = from;
    while t < to {
        if t == IRQ_ON {
            cpu.set_irq(true);
        }
        if t == IRQ_OFF {
            cpu.set_irq(false);
        }
        let mark = [IRQ_ON, IRQ_OFF, to]
            .into_iter()
            .filter(|&m| m > t)
            .min()
            .unwrap_or(to);
        let n = chunk.min(mark - t);
        assert_eq!(cpu.run(bus, n).cycles, n);
        t += n;
    }
}

fn assert_same_memory(a: &SimpleBus, b: &SimpleBus) {
    for addr in 0..=0xFFFF_u16 {
        assert_eq!(a.peek(addr), b.peek(addr), "memory at ${addr:04X}");
    }
}

#[test]
fn test_single_cycles_match_one_run() {
    let (mut whole, mut whole_bus) = machine();
    script(&mut whole, &mut whole_bus, 0, TOTAL, TOTAL);

    let (mut single, mut single_bus) = machine();
    script(&mut single, &mut single_bus, 0, TOTAL, 1);

    assert_eq!(whole.snapshot(), single.snapshot());
    assert_eq!(whole.total_cycles().get(), TOTAL);
    assert_same_memory(&whole_bus, &single_bus);

    // The program really did something.
    assert_eq!(whole_bus.peek(0x2000), 0x05);
    assert_eq!(whole_bus.peek(0x2004), 0x01);
}

#[test]
fn test_restore_from_serialized_snapshot() {
    let (mut reference, mut reference_bus) = machine();
    script(&mut reference, &mut reference_bus, 0, TOTAL, TOTAL);
    let expected = reference.snapshot();

    for split in 1..160 {
        let (mut first, mut bus) = machine();
        script(&mut first, &mut bus, 0, split, TOTAL);

        let json = serde_json::to_string(&first.snapshot()).unwrap();
        let snapshot: Snapshot = serde_json::from_str(&json).unwrap();

        let mut second = Mc6809::new();
        second.restore(snapshot).unwrap();
        script(&mut second, &mut bus, split, TOTAL, TOTAL);

        assert_eq!(second.snapshot(), expected, "split at cycle {split}");
        assert_same_memory(&bus, &reference_bus);
    }
}

#[test]
fn test_restore_rejects_bad_page() {
    let (mut cpu, mut bus) = machine();
    cpu.run(&mut bus, 10);
    let mut snapshot = cpu.snapshot();
    snapshot.page = 1;
    assert_eq!(cpu.restore(snapshot), Err(SnapshotError::InvalidPage(1)));
}

#[test]
fn test_restore_rejects_corrupt_queue() {
    let (mut cpu, mut bus) = machine();
    cpu.run(&mut bus, 10);
    let before = cpu.snapshot();

    let mut value = serde_json::to_value(cpu.snapshot()).unwrap();
    value["queue"]["pos"] = serde_json::json!(40);
    let snapshot: Snapshot = serde_json::from_value(value).unwrap();

    assert_eq!(cpu.restore(snapshot), Err(SnapshotError::CorruptQueue));
    assert_eq!(cpu.snapshot(), before, "failed restore changes nothing");
}
