//! monkey-code — the Monkey bytecode instruction layer
//!
//! Provides:
//! - `Opcode` + `Definition` : the closed instruction set and its static registry (`lookup`)
//! - `encode` / `make` / `decode_operands` : big-endian instruction codec
//! - `Instructions` : growable instruction buffer (emit, back-patching, iteration)
//! - `disassemble` : textual listing, one instruction per line
//! - `assemble` : the inverse of `disassemble`
//! - `validate` : structural walk (opcodes, truncation, jump targets)
//! - Errors `CodeError` + alias `CodeResult<T>`
//!
//! Binary format:
//! ```text
//! instruction = opcode:u8 operand*
//! operand     = big-endian unsigned, width fixed per opcode (see `Definition`)
//! stream      = instruction*   (no header, no padding, no length prefix)
//! ```
//!
//! Features:
//! - `serde` (default) : derives on `Opcode` and `DecodedInstruction`
//! - `tracing` (default) : events on decode/assembly failures

#![deny(missing_docs)]

/* ─────────────────────────── Public modules ─────────────────────────── */

/// Instruction set, codec, disassembler, assembler and validation.
pub mod bytecode;

/// Re-exports the textual disassembler.
pub use bytecode::disasm as disasm;
/// Re-exports the minimal assembler.
pub use bytecode::asm as asm;
/// Re-exports the validation helpers.
pub use bytecode::helpers as helpers;

pub use bytecode::{
    asm::assemble,
    codec::{decode_operands, encode, make, read_operand, read_u16, Operand, Operands},
    disasm::{disassemble, disassemble_with, format_instruction, DisasmOptions, UnknownOpcodePolicy},
    helpers::validate,
    instructions::{decode_instructions, DecodedInstruction, InstructionIter, Instructions},
    opcode::{lookup, Definition, Opcode},
};

/* ─────────────────────────── Errors ─────────────────────────── */

/// Result alias shared by the crate.
pub type CodeResult<T> = core::result::Result<T, CodeError>;

/// Errors raised while encoding, decoding or assembling instructions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    /// Byte has no entry in the opcode registry.
    #[error("opcode {opcode} undefined")]
    UnknownOpcode {
        /// Raw byte found in the stream.
        opcode: u8,
    },

    /// Operand count disagrees with the opcode definition.
    #[error("operand len {got} does not match defined {expected}")]
    OperandArityMismatch {
        /// Mnemonic of the offending instruction.
        mnemonic: &'static str,
        /// Operand count declared by the definition.
        expected: usize,
        /// Operand count supplied or parsed.
        got: usize,
    },

    /// Fewer bytes remain than the declared operand width.
    #[error("truncated operand for {mnemonic}: need {needed} bytes, {available} available")]
    TruncatedOperand {
        /// Mnemonic of the offending instruction.
        mnemonic: &'static str,
        /// Declared width of the operand being read.
        needed: usize,
        /// Bytes left in the stream.
        available: usize,
    },

    /// Operand value is not representable in its declared width.
    #[error("operand {value} does not fit in {width} byte(s) for {mnemonic}")]
    OperandOverflow {
        /// Mnemonic of the offending instruction.
        mnemonic: &'static str,
        /// Value that was supplied.
        value: u64,
        /// Declared width in bytes.
        width: usize,
    },

    /// Operand width the big-endian codec cannot handle.
    #[error("operand width {width} for {mnemonic} is outside 1..=8 bytes")]
    UnsupportedWidth {
        /// Mnemonic of the offending definition.
        mnemonic: &'static str,
        /// Declared width in bytes.
        width: usize,
    },

    /// Jump operand does not land on an instruction boundary.
    #[error("jump at {offset:04} targets {target}, which is not an instruction boundary")]
    InvalidJumpTarget {
        /// Offset of the jump instruction.
        offset: usize,
        /// Decoded target operand.
        target: usize,
    },

    /// No single-operand instruction starts at the given position.
    #[error("no patchable instruction at position {position}")]
    NotPatchable {
        /// Position passed to `patch_operand`.
        position: usize,
    },

    /// Malformed assembler input.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based source line.
        line: usize,
        /// Short description.
        message: String,
    },
}

impl CodeError {
    /// Builds an assembler syntax error.
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        CodeError::Syntax { line, message: message.into() }
    }
}

/* ─────────────────────────── Prelude ─────────────────────────── */

/// Convenience prelude for compiler back-ends and VM loops.
pub mod prelude {
    /// Frequently used items.
    pub use super::{
        decode_instructions, decode_operands, disassemble, encode, lookup, make, read_operand, read_u16,
        CodeError, CodeResult, Definition, Instructions, Opcode, Operands,
    };
}

/* ─────────────────────────── Tests ─────────────────────────── */
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_stable() {
        assert_eq!(CodeError::UnknownOpcode { opcode: 255 }.to_string(), "opcode 255 undefined");
        assert_eq!(
            CodeError::OperandArityMismatch { mnemonic: "OpConstant", expected: 1, got: 2 }.to_string(),
            "operand len 2 does not match defined 1"
        );
        assert_eq!(CodeError::syntax(3, "boom").to_string(), "line 3: boom");
    }

    #[test]
    fn prelude_covers_a_compile_and_fetch_cycle() -> CodeResult<()> {
        use crate::prelude::*;

        let mut ins = Instructions::new();
        ins.push(Opcode::Constant, &[7])?;
        let def = lookup(ins.as_bytes()[0])?;
        let (operands, read) = decode_operands(def, &ins.as_bytes()[1..])?;
        assert_eq!(operands.as_slice(), &[7]);
        assert_eq!(read, 2);
        Ok(())
    }
}
