//! Reset, hardware interrupts, SYNC, CWAI, HALT and hooks.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use emu_core::{Cpu, SimpleBus};
use motorola_6809::flags::{E, F, I, N};
use motorola_6809::{Cc, HookAction, Mc6809, State, Stop};

const ORIGIN: u16 = 0x1000;

fn setup(program: &[u8]) -> (Mc6809, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(ORIGIN, program);
    bus.load(0xFFF6, &[0x31, 0x00]); // FIRQ
    bus.load(0xFFF8, &[0x32, 0x00]); // IRQ
    bus.load(0xFFFA, &[0x20, 0x00]); // SWI
    bus.load(0xFFFC, &[0x30, 0x00]); // NMI
    bus.load(0xFFFE, &[0x10, 0x00]); // RESET
    let mut cpu = Mc6809::new();
    cpu.set_pc(ORIGIN);
    (cpu, bus)
}

#[test]
fn test_reset_sequence() {
    let mut bus = SimpleBus::new();
    bus.load(0xFFFE, &[0x12, 0x34]);
    let mut cpu = Mc6809::new();
    cpu.regs.dp = 0x55;
    cpu.regs.cc = Cc(0);

    let outcome = cpu.run(&mut bus, 3);

    assert_eq!(outcome.cycles, 3);
    assert_eq!(outcome.stop, Stop::Budget);
    assert_eq!(cpu.regs.pc, 0x1234);
    assert_eq!(cpu.regs.dp, 0x00);
    assert_eq!(cpu.regs.cc, Cc(I | F));
    assert!(!cpu.nmi_armed());
    assert!(cpu.at_instruction_boundary());
}

#[test]
fn test_reset_waits_for_halt_release() {
    let mut bus = SimpleBus::new();
    bus.load(0xFFFE, &[0x12, 0x34]);
    let mut cpu = Mc6809::new();
    cpu.set_halt(true);

    let outcome = cpu.run(&mut bus, 10);
    assert_eq!(outcome.cycles, 10);
    assert_eq!(cpu.state(), State::ResetCheckHalt);
    assert_eq!(cpu.regs.pc, 0x0000);
    assert!(cpu.is_waiting());
    assert!(cpu.is_halted());
    assert_eq!(cpu.step(&mut bus), 1);

    // Two cycles for the release to reach the dispatcher, three to vector.
    cpu.set_halt(false);
    cpu.run(&mut bus, 5);
    assert_eq!(cpu.regs.pc, 0x1234);
    assert!(cpu.at_instruction_boundary());
}

#[test]
fn test_reset_while_halted_holds_vector_fetch() {
    let (mut cpu, mut bus) = setup(&[0x12; 4]);
    bus.load(0xFFFE, &[0x56, 0x78]);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x1001);

    cpu.set_halt(true);
    cpu.reset();
    cpu.run(&mut bus, 10);
    assert_eq!(cpu.state(), State::ResetCheckHalt);
    assert_eq!(cpu.regs.pc, 0x1001);
    assert_eq!(cpu.regs.dp, 0x00);

    cpu.set_halt(false);
    cpu.run(&mut bus, 5);
    assert_eq!(cpu.regs.pc, 0x5678);
}

#[test]
fn test_halt_stops_at_instruction_boundary() {
    // NOP; NOP; NOP; ...
    let (mut cpu, mut bus) = setup(&[0x12; 16]);
    cpu.step(&mut bus);
    cpu.set_halt(true);

    cpu.run(&mut bus, 20);
    let held = cpu.regs.pc;
    assert!(cpu.is_halted());
    assert!(cpu.is_waiting());
    assert_eq!(cpu.state(), State::LabelA);

    cpu.run(&mut bus, 20);
    assert_eq!(cpu.regs.pc, held);

    cpu.set_halt(false);
    cpu.run(&mut bus, 10);
    assert!(!cpu.is_halted());
    assert!(cpu.regs.pc > held);
}

#[test]
fn test_nmi_ignored_until_s_loaded() {
    let (mut cpu, mut bus) = setup(&[
        0x12, // NOP
        0x12, // NOP
        0x10, 0xCE, 0x80, 0x00, // LDS #$8000
        0x12, // NOP
        0x12, // NOP
    ]);
    bus.load(0x3000, &[0x20, 0xFE]); // BRA *

    cpu.set_nmi(true);
    cpu.step(&mut bus);
    cpu.set_nmi(false);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x1002, "edge before LDS is dropped");

    cpu.step(&mut bus);
    assert!(cpu.nmi_armed());

    cpu.set_nmi(true);
    assert_eq!(cpu.step(&mut bus), 2 + 19);
    assert_eq!(cpu.regs.pc, 0x3000);
    assert_eq!(cpu.regs.s, 0x7FF4);
    assert_eq!(bus.peek(0x7FFE), 0x10);
    assert_eq!(bus.peek(0x7FFF), 0x07);
    assert_eq!(bus.peek(0x7FF4) & E, E);
    assert!(cpu.regs.cc.is_set(I) && cpu.regs.cc.is_set(F));

    // Held high: no second edge, no second entry.
    cpu.run(&mut bus, 100);
    assert_eq!(cpu.regs.s, 0x7FF4);
}

#[test]
fn test_interrupt_priority() {
    let (mut cpu, mut bus) = setup(&[
        0x10, 0xCE, 0x80, 0x00, // LDS #$8000
        0x1C, 0xAF, // ANDCC #$AF
        0x20, 0xFE, // BRA *
    ]);
    bus.load(0x3000, &[0x3B]); // RTI
    bus.load(0x3100, &[0x3B]);
    bus.load(0x3200, &[0x3B]);

    cpu.step(&mut bus);
    cpu.step(&mut bus);

    // FIRQ beats IRQ and stacks only PC and CC.
    cpu.set_irq(true);
    cpu.set_firq(true);
    assert_eq!(cpu.step(&mut bus), 3 + 10);
    assert_eq!(cpu.regs.pc, 0x3100);
    assert_eq!(cpu.regs.s, 0x7FFD);
    assert!(!cpu.regs.cc.is_set(E));
    assert!(cpu.regs.cc.is_set(I) && cpu.regs.cc.is_set(F));
    cpu.set_firq(false);

    // RTI unmasks; IRQ is still pending.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x3200);
    assert_eq!(cpu.regs.s, 0x7FF4);
    assert!(cpu.regs.cc.is_set(E));
    assert!(cpu.regs.cc.is_set(I));
    assert!(!cpu.regs.cc.is_set(F));
    cpu.set_irq(false);

    assert_eq!(cpu.step(&mut bus), 15);
    assert_eq!(cpu.regs.pc, 0x1006);
    assert_eq!(cpu.regs.s, 0x8000);

    // NMI beats everything.
    cpu.set_irq(true);
    cpu.set_firq(true);
    cpu.set_nmi(true);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x3000);
}

#[test]
fn test_nmi_then_firq_then_irq() {
    let (mut cpu, mut bus) = setup(&[
        0x10, 0xCE, 0x80, 0x00, // LDS #$8000
        0x1C, 0xAF, // ANDCC #$AF
        0x20, 0xFE, // BRA *
    ]);
    bus.load(0x3000, &[0x3B]);
    bus.load(0x3100, &[0x3B]);
    bus.load(0x3200, &[0x3B]);
    cpu.step(&mut bus);
    cpu.step(&mut bus);

    cpu.set_nmi(true);
    cpu.set_firq(true);
    cpu.set_irq(true);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x3000);

    // RTI restores the unmasked CC; FIRQ is next.
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x3100);
    cpu.set_firq(false);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 0x3200);
}

#[test]
fn test_masked_irq_is_ignored() {
    // BRA *
    let (mut cpu, mut bus) = setup(&[0x20, 0xFE]);
    let s = cpu.regs.s;
    cpu.set_irq(true);
    for _ in 0..10 {
        assert_eq!(cpu.step(&mut bus), 3);
    }
    assert_eq!(cpu.regs.pc, 0x1000);
    assert_eq!(cpu.regs.s, s);
}

#[test]
fn test_swi_stack_layout() {
    let (mut cpu, mut bus) = setup(&[
        0x10, 0xCE, 0x80, 0x00, // LDS #$8000
        0x8E, 0x11, 0x22, // LDX #$1122
        0x10, 0x8E, 0x33, 0x44, // LDY #$3344
        0xCE, 0x55, 0x66, // LDU #$5566
        0x86, 0x12, // LDA #$12
        0x1F, 0x8B, // TFR A,DP
        0x86, 0xAA, // LDA #$AA
        0xC6, 0xBB, // LDB #$BB
        0x3F, // SWI
    ]);

    for _ in 0..8 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.step(&mut bus), 19);

    let frame: Vec<u8> = (0x7FF4..=0x7FFF).map(|a| bus.peek(a)).collect();
    assert_eq!(
        frame,
        vec![0xD8, 0xAA, 0xBB, 0x12, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x10, 0x17]
    );
    assert_eq!(cpu.regs.pc, 0x2000);
    assert_eq!(cpu.regs.cc, Cc(E | F | I | N));
}

#[test]
fn test_swi2_leaves_masks() {
    // LDS #$8000; ANDCC #$AF; SWI2
    let (mut cpu, mut bus) = setup(&[0x10, 0xCE, 0x80, 0x00, 0x1C, 0xAF, 0x10, 0x3F]);
    bus.load(0xFFF4, &[0x40, 0x00]);
    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    assert_eq!(cpu.regs.pc, 0x4000);
    assert!(!cpu.regs.cc.is_set(I));
    assert!(!cpu.regs.cc.is_set(F));
}

#[test]
fn test_cwai_waits_then_takes_irq() {
    let (mut cpu, mut bus) = setup(&[
        0x10, 0xCE, 0x80, 0x00, // LDS #$8000
        0x3C, 0xEF, // CWAI #$EF
    ]);
    bus.load(0x3200, &[0x20, 0xFE]); // BRA *

    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.state(), State::CwaiCheckHalt);
    assert_eq!(cpu.regs.s, 0x7FF4, "frame stacked before waiting");

    cpu.run(&mut bus, 50);
    assert_eq!(cpu.state(), State::CwaiCheckHalt);
    assert_eq!(cpu.regs.pc, 0x1006);

    cpu.set_irq(true);
    cpu.run(&mut bus, 20);
    assert!((0x3200..=0x3202).contains(&cpu.regs.pc));
    assert_eq!(cpu.regs.s, 0x7FF4, "no second frame");
    let stacked = Cc(bus.peek(0x7FF4));
    assert!(stacked.is_set(E));
    assert!(!stacked.is_set(I));
    assert!(cpu.regs.cc.is_set(I));
}

#[test]
fn test_cwai_wait_is_stable_between_cycles() {
    let (mut cpu, mut bus) = setup(&[
        0x10, 0xCE, 0x80, 0x00, // LDS #$8000
        0x3C, 0xEF, // CWAI #$EF
    ]);
    cpu.step(&mut bus);
    cpu.step(&mut bus);

    for _ in 0..5 {
        cpu.run(&mut bus, 1);
        assert_eq!(cpu.state(), State::CwaiCheckHalt);
        assert!(cpu.is_waiting());
        assert_eq!(cpu.step(&mut bus), 1);
        assert_eq!(cpu.state().name(), "cwai-check-halt");
    }

    // Two cycles to latch and promote IRQ, four to vector.
    cpu.set_irq(true);
    let mut cycles = 0;
    for _ in 0..10 {
        if !cpu.is_waiting() {
            break;
        }
        cycles += cpu.step(&mut bus);
    }
    assert_eq!(cycles, 6);
    assert_eq!(cpu.regs.pc, 0x3200);
    assert!(cpu.at_instruction_boundary());
}

#[test]
fn test_sync_resumes_on_masked_irq() {
    // SYNC; NOP; BRA *
    let (mut cpu, mut bus) = setup(&[0x13, 0x12, 0x20, 0xFE]);
    let s = cpu.regs.s;

    cpu.step(&mut bus);
    assert_eq!(cpu.state(), State::Sync);
    cpu.run(&mut bus, 50);
    assert_eq!(cpu.state(), State::Sync);
    assert_eq!(cpu.regs.pc, 0x1001);

    cpu.set_irq(true);
    cpu.run(&mut bus, 10);
    assert_ne!(cpu.state(), State::Sync);
    assert!((0x1002..=0x1004).contains(&cpu.regs.pc));
    assert_eq!(cpu.regs.s, s, "masked: nothing stacked");
}

#[test]
fn test_instruction_hook_breakpoint() {
    let (mut cpu, mut bus) = setup(&[0x12; 16]);
    cpu.set_instruction_hook(|regs| {
        if regs.pc == 0x1004 {
            HookAction::Break
        } else {
            HookAction::Continue
        }
    });

    let outcome = cpu.run(&mut bus, 100);
    assert_eq!(outcome.stop, Stop::Breakpoint);
    assert_eq!(outcome.cycles, 8);
    assert_eq!(cpu.regs.pc, 0x1004);

    // Resuming does not stop at the same fetch again.
    let outcome = cpu.run(&mut bus, 10);
    assert_eq!(outcome.stop, Stop::Budget);
    assert_eq!(cpu.regs.pc, 0x1009);
}

#[test]
fn test_posthook_counts_instructions() {
    let (mut cpu, mut bus) = setup(&[0x12, 0x86, 0x01, 0x3D]);
    let count = Rc::new(Cell::new(0u32));
    let seen = Rc::clone(&count);
    cpu.set_instruction_posthook(move |_| seen.set(seen.get() + 1));

    for _ in 0..3 {
        cpu.step(&mut bus);
    }
    assert_eq!(count.get(), 3);

    cpu.clear_hooks();
    cpu.step(&mut bus);
    assert_eq!(count.get(), 3);
}

#[test]
fn test_read_and_write_watch() {
    // LDA $2000; STA $2001
    let (mut cpu, mut bus) = setup(&[0xB6, 0x20, 0x00, 0xB7, 0x20, 0x01]);
    bus.poke(0x2000, 0x5A);
    let reads = Rc::new(RefCell::new(Vec::new()));
    let writes = Rc::new(RefCell::new(Vec::new()));
    let r = Rc::clone(&reads);
    let w = Rc::clone(&writes);
    cpu.set_read_hook(move |addr, value| r.borrow_mut().push((addr, value)));
    cpu.set_write_hook(move |addr, value| w.borrow_mut().push((addr, value)));

    cpu.step(&mut bus);
    cpu.step(&mut bus);

    assert_eq!(*reads.borrow(), vec![(0x2000, 0x5A)]);
    assert_eq!(*writes.borrow(), vec![(0x2001, 0x5A)]);
}

#[test]
fn test_cpu_trait_reset() {
    let (mut cpu, mut bus) = setup(&[0x14]);
    cpu.step(&mut bus);
    assert!(Cpu::is_halted(&cpu));

    Cpu::reset(&mut cpu);
    for _ in 0..3 {
        cpu.tick(&mut bus);
    }
    assert_eq!(Cpu::pc(&cpu), 0x1000);
    assert!(!Cpu::is_halted(&cpu));
}
