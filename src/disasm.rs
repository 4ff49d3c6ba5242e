use crate::decoder::Decoded;
use crate::instructions::AddrMode;

/// Renders a decoded instruction in assembler syntax. Jump targets print as
/// program offsets since labels are gone after assembly.
pub fn fmt_decoded(d: &Decoded) -> String {
    let mn = d.op.mnemonic();
    match d.op.mode() {
        AddrMode::Implied => mn.to_string(),
        AddrMode::IndirectX => format!("{mn} ,X"),
        AddrMode::Imm8 => format!("{mn} #${:02X}", d.operand),
        AddrMode::Imm16 => format!("{mn} #${:04X}", d.operand),
        AddrMode::Addr16 => format!("{mn} @{:#06x}", d.operand),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Op;

    #[test]
    fn formats_each_operand_mode() {
        let f = |op, operand| fmt_decoded(&Decoded { op, operand });
        assert_eq!(f(Op::Inca, 0), "INCA");
        assert_eq!(f(Op::StaX, 0), "STA ,X");
        assert_eq!(f(Op::Cmpb, 0x7), "CMPB #$07");
        assert_eq!(f(Op::Ldx, 0xA000), "LDX #$A000");
        assert_eq!(f(Op::Jne, 0x12), "JNE @0x0012");
    }
}
