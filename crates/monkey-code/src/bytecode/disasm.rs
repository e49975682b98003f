//! Textual disassembly of raw instruction streams.
//!
//! One line per instruction: `"{offset:04} {mnemonic} {operand}..."`.
//! Decoding problems become `"{offset:04} ERROR: ..."` lines instead of
//! aborting the listing.

use core::fmt::Write;

use crate::bytecode::{
    codec::{decode_operands, Operand},
    opcode::{lookup, Definition},
};
use crate::{CodeError, CodeResult};

/// What to do after an unknown opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownOpcodePolicy {
    /// Report it and resume at the next byte.
    #[default]
    Skip,
    /// Report it and stop the listing.
    Halt,
}

/// Options accepted by [`disassemble_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisasmOptions {
    /// Recovery after an unknown opcode.
    pub unknown_opcode: UnknownOpcodePolicy,
}

/// Disassembles `bytes` with default options.
pub fn disassemble(bytes: &[u8]) -> String {
    disassemble_with(bytes, DisasmOptions::default())
}

/// Disassembles `bytes`.
pub fn disassemble_with(bytes: &[u8], opts: DisasmOptions) -> String {
    let mut out = String::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let def = match lookup(bytes[offset]) {
            Ok(def) => def,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(offset, opcode = bytes[offset], "unknown opcode in instruction stream");
                error_line(&mut out, offset, &err);
                match opts.unknown_opcode {
                    UnknownOpcodePolicy::Skip => {
                        offset += 1;
                        continue;
                    }
                    UnknownOpcodePolicy::Halt => break,
                }
            }
        };

        match decode_operands(def, &bytes[offset + 1..]) {
            Ok((operands, read)) => {
                match format_instruction(def, &operands) {
                    Ok(text) => {
                        let _ = writeln!(out, "{offset:04} {text}");
                    }
                    Err(err) => error_line(&mut out, offset, &err),
                }
                offset += 1 + read;
            }
            Err(err) => {
                // The rest of the stream is the broken operand.
                error_line(&mut out, offset, &err);
                break;
            }
        }
    }

    out
}

/// Renders `mnemonic operand...` for one instruction.
///
/// # Errors
/// `OperandArityMismatch` if `operands` disagrees with the definition.
pub fn format_instruction(def: &Definition, operands: &[Operand]) -> CodeResult<String> {
    if operands.len() != def.operand_count() {
        return Err(CodeError::OperandArityMismatch {
            mnemonic: def.name,
            expected: def.operand_count(),
            got: operands.len(),
        });
    }

    let mut text = String::from(def.name);
    for operand in operands {
        let _ = write!(text, " {operand}");
    }
    Ok(text)
}

fn error_line(out: &mut String, offset: usize, err: &CodeError) {
    let _ = writeln!(out, "{offset:04} ERROR: {err}");
}
