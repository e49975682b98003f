//! Structural validation reused by tooling and VM loaders.

use crate::bytecode::instructions::decode_instructions;
use crate::{CodeError, CodeResult};

/// Basic structural validation of an instruction stream.
///
/// Every byte must decode, and every jump must land on an instruction
/// boundary or exactly at the end of the stream. Program semantics are not
/// checked.
///
/// # Errors
/// The first `UnknownOpcode`, `TruncatedOperand` or `InvalidJumpTarget`.
pub fn validate(bytes: &[u8]) -> CodeResult<()> {
    let mut boundaries = Vec::new();
    let mut jumps = Vec::new();

    for instr in decode_instructions(bytes) {
        let instr = instr?;
        boundaries.push(instr.offset);
        if instr.opcode.is_jump() {
            if let Some(&target) = instr.operands.first() {
                jumps.push((instr.offset, target));
            }
        }
    }

    // boundaries is sorted: offsets only grow
    for (offset, target) in jumps {
        if target != bytes.len() && boundaries.binary_search(&target).is_err() {
            return Err(CodeError::InvalidJumpTarget { offset, target });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{codec::make, opcode::Opcode};

    #[test]
    fn accepts_well_formed_stream() {
        let bytes = [
            make(Opcode::True, &[]),
            make(Opcode::JumpNotTruthy, &[7]),
            make(Opcode::Constant, &[0]),
            make(Opcode::Jump, &[10]),
            make(Opcode::Pop, &[]),
        ]
        .concat();
        assert_eq!(validate(&bytes), Ok(()));

        let mut to_end = bytes.clone();
        to_end[8..10].copy_from_slice(&11u16.to_be_bytes());
        assert_eq!(validate(&to_end), Ok(()));

        let mut into_operand = bytes;
        into_operand[8..10].copy_from_slice(&8u16.to_be_bytes());
        assert_eq!(validate(&into_operand), Err(CodeError::InvalidJumpTarget { offset: 7, target: 8 }));
        assert_eq!(validate(&[]), Ok(()));
    }

    #[test]
    fn jump_to_end_of_stream_is_allowed() {
        let bytes = make(Opcode::Jump, &[3]);
        assert_eq!(validate(&bytes), Ok(()));
    }

    #[test]
    fn rejects_jump_into_an_operand() {
        let bytes = [make(Opcode::Constant, &[0]), make(Opcode::Jump, &[1])].concat();
        assert_eq!(validate(&bytes), Err(CodeError::InvalidJumpTarget { offset: 3, target: 1 }));
    }

    #[test]
    fn rejects_jump_past_the_end() {
        let bytes = make(Opcode::Jump, &[40]);
        assert_eq!(validate(&bytes), Err(CodeError::InvalidJumpTarget { offset: 0, target: 40 }));
    }

    #[test]
    fn surfaces_decode_errors() {
        assert_eq!(validate(&[0x42]), Err(CodeError::UnknownOpcode { opcode: 0x42 }));
        assert!(matches!(
            validate(&[Opcode::Jump.byte()]),
            Err(CodeError::TruncatedOperand { needed: 2, available: 0, .. })
        ));
    }
}
