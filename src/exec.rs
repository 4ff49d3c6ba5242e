use crate::cpu::{Compare, Cpu, Reg, Step, Trap};
use crate::decoder::{Decoded, Op};
use crate::memory::Bus;

pub trait Executor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<Step, Trap>;
}

/// Executes decoded instructions. IP has already been advanced past the
/// instruction when `exec` runs.
pub struct IntExecutor;
impl Executor for IntExecutor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Decoded) -> Result<Step, Trap> {
        let imm = d.operand;
        match d.op {
            Op::Lda => cpu.set_reg(Reg::A, imm as i32),
            Op::Ldb => cpu.set_reg(Reg::B, imm as i32),
            Op::Ldx => cpu.set_reg(Reg::X, imm as i32),
            Op::Ldy => cpu.set_reg(Reg::Y, imm as i32),
            Op::StaX => {
                let addr = cpu.regs.x;
                bus.write_u8(addr, cpu.regs.a)
                    .map_err(|source| Trap::Bus { addr, source })?;
            }
            Op::End => return Ok(Step::End),
            Op::Cmpa => cpu.compare(Reg::A, imm),
            Op::Cmpb => cpu.compare(Reg::B, imm),
            Op::Cmpx => cpu.compare(Reg::X, imm),
            Op::Cmpy => cpu.compare(Reg::Y, imm),
            Op::Cmpd => cpu.compare(Reg::D, imm),
            Op::Jmp => cpu.jump(imm),
            Op::Jeq => jump_if(cpu, Compare::EQUAL, imm),
            Op::Jne => jump_if(cpu, Compare::NOT_EQUAL, imm),
            Op::Jgt => jump_if(cpu, Compare::GREATER, imm),
            Op::Jlt => jump_if(cpu, Compare::LESS, imm),
            Op::Inca => add(cpu, Reg::A, 1),
            Op::Incb => add(cpu, Reg::B, 1),
            Op::Incx => add(cpu, Reg::X, 1),
            Op::Incy => add(cpu, Reg::Y, 1),
            Op::Incd => add(cpu, Reg::D, 1),
            Op::Deca => add(cpu, Reg::A, -1),
            Op::Decb => add(cpu, Reg::B, -1),
            Op::Decx => add(cpu, Reg::X, -1),
            Op::Decy => add(cpu, Reg::Y, -1),
            Op::Decd => add(cpu, Reg::D, -1),
        }
        Ok(Step::Executed)
    }
}

fn jump_if(cpu: &mut Cpu, flag: Compare, offset: u16) {
    if cpu.cmp.contains(flag) {
        cpu.jump(offset);
    }
}

fn add(cpu: &mut Cpu, reg: Reg, delta: i32) {
    let v = cpu.get_reg(reg) as i32 + delta;
    cpu.set_reg(reg, v);
}
