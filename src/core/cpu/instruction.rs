use std::fmt;

/// A two-operand instruction's decoded `mode|reg` fields, for both the
/// source and the destination (§4.2's 4-bit format).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoOperand {
    pub src_mode: u8,
    pub src_reg: usize,
    pub dst_mode: u8,
    pub dst_reg: usize,
}

/// A single-operand instruction's decoded `mode|reg` field (§4.4's shifts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneOperand {
    pub mode: u8,
    pub reg: usize,
}

/// The instruction set this simulator dispatches, already carrying its
/// decoded operand descriptors (§9: "a single pure decoder function so
/// every semantic acts on an already-parsed record").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Halt,
    Asr(OneOperand),
    Asl(OneOperand),
    Br(i8),
    Bne(i8),
    Beq(i8),
    Sob { reg: usize, offset: u8 },
    Mov(TwoOperand),
    Cmp(TwoOperand),
    Add(TwoOperand),
    Sub(TwoOperand),
}

impl Decoded {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Decoded::Halt => "HALT",
            Decoded::Asr(_) => "ASR",
            Decoded::Asl(_) => "ASL",
            Decoded::Br(_) => "BR",
            Decoded::Bne(_) => "BNE",
            Decoded::Beq(_) => "BEQ",
            Decoded::Sob { .. } => "SOB",
            Decoded::Mov(_) => "MOV",
            Decoded::Cmp(_) => "CMP",
            Decoded::Add(_) => "ADD",
            Decoded::Sub(_) => "SUB",
        }
    }
}

/// An instruction word that matched none of the dispatcher's prefixes
/// (§4.2, §7 "Decode error").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeError(pub u16);

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown opcode {:06o}", self.0)
    }
}

impl std::error::Error for DecodeError {}

fn two_operand(word: u16) -> TwoOperand {
    TwoOperand {
        src_mode: ((word >> 9) & 0x7) as u8,
        src_reg: ((word >> 6) & 0x7) as usize,
        dst_mode: ((word >> 3) & 0x7) as u8,
        dst_reg: (word & 0x7) as usize,
    }
}

fn one_operand(word: u16) -> OneOperand {
    OneOperand {
        mode: ((word >> 3) & 0x7) as u8,
        reg: (word & 0x7) as usize,
    }
}

/// Decodes a 16-bit instruction word by matching the longest prefix first
/// (§4.2). Pure: no side effects, no register or memory access.
pub fn decode(word: u16) -> Result<Decoded, DecodeError> {
    if word == 0 {
        return Ok(Decoded::Halt);
    }
    if (word >> 6) == 0o062 {
        return Ok(Decoded::Asr(one_operand(word)));
    }
    if (word >> 6) == 0o063 {
        return Ok(Decoded::Asl(one_operand(word)));
    }
    if (word >> 8) == 0o001 {
        return Ok(Decoded::Br((word & 0xFF) as u8 as i8));
    }
    if (word >> 8) == 0o002 {
        return Ok(Decoded::Bne((word & 0xFF) as u8 as i8));
    }
    if (word >> 8) == 0o003 {
        return Ok(Decoded::Beq((word & 0xFF) as u8 as i8));
    }
    if (word >> 9) == 0o077 {
        return Ok(Decoded::Sob {
            reg: ((word >> 6) & 0x7) as usize,
            offset: (word & 0x3F) as u8,
        });
    }
    match word >> 12 {
        0o001 => Ok(Decoded::Mov(two_operand(word))),
        0o002 => Ok(Decoded::Cmp(two_operand(word))),
        0o006 => Ok(Decoded::Add(two_operand(word))),
        0o016 => Ok(Decoded::Sub(two_operand(word))),
        _ => Err(DecodeError(word)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_halt() {
        assert_eq!(decode(0o000000), Ok(Decoded::Halt));
    }

    #[test]
    fn decodes_mov_immediate_to_register() {
        let decoded = decode(0o012700).unwrap();
        assert_eq!(
            decoded,
            Decoded::Mov(TwoOperand { src_mode: 2, src_reg: 7, dst_mode: 0, dst_reg: 0 })
        );
    }

    #[test]
    fn decodes_sob() {
        let decoded = decode(0o077001).unwrap();
        assert_eq!(decoded, Decoded::Sob { reg: 0, offset: 1 });
    }

    #[test]
    fn decodes_branches() {
        assert_eq!(decode(0o000402).unwrap(), Decoded::Br(2));
        assert_eq!(decode(0o001001).unwrap(), Decoded::Bne(1));
        assert_eq!(decode(0o001401).unwrap(), Decoded::Beq(1));
    }

    #[test]
    fn decodes_negative_branch_offset() {
        // top 8 bits = 001 (BR), low byte 0x80 = -128 signed
        assert_eq!(decode(0o000600).unwrap(), Decoded::Br(-128));
    }

    #[test]
    fn decodes_shifts() {
        assert_eq!(decode(0o006200).unwrap(), Decoded::Asr(OneOperand { mode: 0, reg: 0 }));
        assert_eq!(decode(0o006310).unwrap(), Decoded::Asl(OneOperand { mode: 1, reg: 0 }));
    }

    #[test]
    fn rejects_unknown_opcode() {
        assert_eq!(decode(0o177777), Err(DecodeError(0o177777)));
    }
}
