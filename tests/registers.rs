use b32_rs::exec::IntExecutor;
use b32_rs::isa::b32::B32Decoder;
use b32_rs::{Cpu, Memory, Reg};

#[test]
fn eight_bit_writes_wrap_and_flag_overflow() {
    let mut cpu = Cpu::new();

    cpu.set_reg(Reg::A, 260);
    assert_eq!(cpu.regs.a, 4);
    assert!(cpu.overflow);

    cpu.set_reg(Reg::A, -1);
    assert_eq!(cpu.regs.a, 255);
    assert!(!cpu.overflow);

    cpu.set_reg(Reg::B, -257);
    assert_eq!(cpu.regs.b, 255);
    assert!(!cpu.overflow);
    assert_eq!(cpu.get_reg(Reg::D), 0xFFFF);
}

#[test]
fn d_write_splits_into_a_and_b() {
    let mut cpu = Cpu::new();
    cpu.set_reg(Reg::D, 300);
    assert_eq!(cpu.regs.a, 1);
    assert_eq!(cpu.regs.b, 44);
    assert_eq!(cpu.get_reg(Reg::D), 300);
    assert!(!cpu.overflow);

    cpu.set_reg(Reg::D, 70000);
    assert_eq!(cpu.get_reg(Reg::D), (70000u32 - 65536) as u16);
    assert!(cpu.overflow);
}

#[test]
fn x_and_y_are_independent_sixteen_bit() {
    let mut cpu = Cpu::new();
    cpu.set_reg(Reg::X, 65536);
    assert_eq!(cpu.regs.x, 0);
    assert!(cpu.overflow);
    cpu.set_reg(Reg::Y, -1);
    assert_eq!(cpu.regs.y, 0xFFFF);
    assert!(!cpu.overflow);
    assert_eq!(cpu.regs.x, 0);
    assert_eq!(cpu.get_reg(Reg::D), 0);
}

#[test]
fn inc_and_dec_go_through_the_same_wrap_rule() {
    let mut mem = Memory::new(0x20);
    let mut cpu = Cpu::new();
    cpu.reset(0, 0);
    cpu.set_reg(Reg::A, 255);
    cpu.set_reg(Reg::X, 0);

    // INCA ; DECX ; INCD ; DECB
    mem.load(0, &[0x0F, 0x16, 0x13, 0x15]).unwrap();

    let dec = B32Decoder::new();
    let exec = IntExecutor;

    cpu.step(&mut mem, &dec, &exec).unwrap();
    assert_eq!(cpu.regs.a, 0);
    assert!(cpu.overflow);

    cpu.step(&mut mem, &dec, &exec).unwrap();
    assert_eq!(cpu.regs.x, 0xFFFF);
    assert!(!cpu.overflow);

    cpu.step(&mut mem, &dec, &exec).unwrap();
    assert_eq!(cpu.get_reg(Reg::D), 1);

    cpu.step(&mut mem, &dec, &exec).unwrap();
    assert_eq!(cpu.regs.b, 0);
    assert_eq!(cpu.regs.a, 0);
    assert_eq!(cpu.ip, 4);
}

#[test]
fn carry_is_never_touched() {
    let mut cpu = Cpu::new();
    cpu.set_reg(Reg::A, 1000);
    cpu.set_reg(Reg::D, -5);
    cpu.compare(Reg::D, 3);
    assert!(!cpu.carry);
    assert_eq!(cpu.snapshot().cy, 0);
}
