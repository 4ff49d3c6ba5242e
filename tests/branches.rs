use b32_rs::exec::IntExecutor;
use b32_rs::isa::b32::B32Decoder;
use b32_rs::{Compare, Cpu, Memory, Reg};

#[test]
fn compare_sets_equal_only_on_match() {
    let mut cpu = Cpu::new();
    cpu.set_reg(Reg::A, 5);
    cpu.compare(Reg::A, 5);
    assert_eq!(cpu.cmp, Compare::EQUAL);

    cpu.set_reg(Reg::A, 3);
    cpu.compare(Reg::A, 5);
    assert_eq!(cpu.cmp, Compare::NOT_EQUAL | Compare::LESS);

    cpu.compare(Reg::A, 2);
    assert_eq!(cpu.cmp, Compare::NOT_EQUAL | Compare::GREATER);
}

#[test]
fn compare_flags_are_never_equal_and_ordered() {
    let mut cpu = Cpu::new();
    for reg_val in [0i32, 1, 254, 255] {
        for imm in [0u16, 1, 254, 255] {
            cpu.set_reg(Reg::B, reg_val);
            cpu.compare(Reg::B, imm);
            let eq = cpu.cmp.contains(Compare::EQUAL);
            assert_ne!(eq, cpu.cmp.contains(Compare::NOT_EQUAL));
            assert!(!(eq && cpu.cmp.intersects(Compare::LESS | Compare::GREATER)));
        }
    }
}

#[test]
fn cmpd_compares_the_composite_register() {
    let mut mem = Memory::new(0x20);
    let mut cpu = Cpu::new();
    cpu.reset(0, 0);
    cpu.set_reg(Reg::D, 0x0102);
    // CMPD #$0102
    mem.load(0, &[0x09, 0x01, 0x02]).unwrap();
    cpu.step(&mut mem, &B32Decoder::new(), &IntExecutor).unwrap();
    assert_eq!(cpu.cmp, Compare::EQUAL);
    assert_eq!(cpu.ip, 3);
}

#[test]
fn jumps_are_relative_to_load_address() {
    let base = 0x1000u16;
    let mut mem = Memory::new(0x2000);
    let mut cpu = Cpu::new();
    cpu.reset(base, base);

    // 0: JMP @6
    // 3: INCA          [skipped]
    // 4: INCA          [skipped]
    // 5: INCA          [skipped]
    // 6: INCB
    mem.load(base, &[0x0A, 0x00, 0x06, 0x0F, 0x0F, 0x0F, 0x10]).unwrap();

    let dec = B32Decoder::new();
    let exec = IntExecutor;
    cpu.step(&mut mem, &dec, &exec).unwrap();
    assert_eq!(cpu.ip, base + 6);
    cpu.step(&mut mem, &dec, &exec).unwrap();
    assert_eq!(cpu.regs.b, 1);
    assert_eq!(cpu.regs.a, 0);
}

#[test]
fn conditional_jumps_follow_their_flag() {
    let dec = B32Decoder::new();
    let exec = IntExecutor;
    // (opcode, flags, taken)
    let cases = [
        (0x0Bu8, Compare::EQUAL, true),
        (0x0B, Compare::NOT_EQUAL | Compare::LESS, false),
        (0x0C, Compare::NOT_EQUAL | Compare::GREATER, true),
        (0x0C, Compare::EQUAL, false),
        (0x0D, Compare::NOT_EQUAL | Compare::GREATER, true),
        (0x0D, Compare::NOT_EQUAL | Compare::LESS, false),
        (0x0E, Compare::NOT_EQUAL | Compare::LESS, true),
        (0x0E, Compare::EQUAL, false),
    ];
    for (opcode, flags, taken) in cases {
        let mut mem = Memory::new(0x100);
        let mut cpu = Cpu::new();
        cpu.reset(0x40, 0x40);
        cpu.cmp = flags;
        mem.load(0x40, &[opcode, 0x00, 0x20]).unwrap();
        cpu.step(&mut mem, &dec, &exec).unwrap();
        let expect = if taken { 0x60 } else { 0x43 };
        assert_eq!(cpu.ip, expect, "opcode {opcode:#04x} with {flags:?}");
    }
}

#[test]
fn compare_leaves_overflow_alone() {
    let mut cpu = Cpu::new();
    cpu.set_reg(Reg::A, 300);
    cpu.compare(Reg::A, 0);
    assert!(cpu.overflow);
}
