//! Instruction encoding and operand decoding.
//!
//! Operands are unsigned big-endian integers. Widths come from the registry
//! and the loops below never special-case a particular width.

use byteorder::{BigEndian, ByteOrder};
use smallvec::SmallVec;

use crate::bytecode::opcode::{Definition, Opcode};
use crate::{CodeError, CodeResult};

/// Decoded operand value.
pub type Operand = usize;

/// Operands of one instruction (inline up to two).
pub type Operands = SmallVec<[Operand; 2]>;

/// Encodes `op` and its operands into a fresh instruction.
///
/// # Errors
/// - `OperandArityMismatch` if `operands.len()` differs from the definition.
/// - `OperandOverflow` if a value does not fit in its declared width.
/// - `UnsupportedWidth` if the definition declares a width outside `1..=8`.
pub fn encode(op: Opcode, operands: &[Operand]) -> CodeResult<Vec<u8>> {
    let def = op.definition();
    if operands.len() != def.operand_count() {
        return Err(CodeError::OperandArityMismatch {
            mnemonic: def.name,
            expected: def.operand_count(),
            got: operands.len(),
        });
    }

    for &width in def.operand_widths {
        check_width(def.name, width)?;
    }

    let mut instruction = vec![0u8; def.width()];
    instruction[0] = op.byte();

    let mut offset = 1;
    for (&value, &width) in operands.iter().zip(def.operand_widths) {
        write_operand(def, &mut instruction[offset..offset + width], value)?;
        offset += width;
    }

    Ok(instruction)
}

/// Like [`encode`], for code generators where a bad operand list is a bug.
///
/// # Panics
/// When [`encode`] fails: the generator and the instruction set disagree.
#[must_use]
pub fn make(op: Opcode, operands: &[Operand]) -> Vec<u8> {
    match encode(op, operands) {
        Ok(instruction) => instruction,
        Err(err) => panic!("cannot encode {op}: {err}"),
    }
}

/// Decodes the operands of `def` from `bytes`, which starts right after the opcode.
///
/// Returns the operands in declaration order and the number of bytes read.
///
/// # Errors
/// - `TruncatedOperand` if `bytes` is shorter than the declared widths.
/// - `UnsupportedWidth` if the definition declares a width outside `1..=8`.
pub fn decode_operands(def: &Definition, bytes: &[u8]) -> CodeResult<(Operands, usize)> {
    let mut operands = Operands::with_capacity(def.operand_count());
    let mut offset = 0;

    for &width in def.operand_widths {
        check_width(def.name, width)?;
        let Some(raw) = bytes.get(offset..offset + width) else {
            return Err(CodeError::TruncatedOperand {
                mnemonic: def.name,
                needed: width,
                available: bytes.len().saturating_sub(offset),
            });
        };
        operands.push(read_raw(def.name, raw)?);
        offset += width;
    }

    Ok((operands, offset))
}

/// Reads one big-endian operand of `width` bytes from the front of `bytes`.
///
/// Single-operand fast path for VM loops; trailing bytes are ignored.
///
/// # Errors
/// - `UnsupportedWidth` if `width` is outside `1..=8`.
/// - `TruncatedOperand` if `bytes` is shorter than `width`.
pub fn read_operand(bytes: &[u8], width: usize) -> CodeResult<Operand> {
    const NAME: &str = "operand";
    check_width(NAME, width)?;
    let raw = bytes.get(..width).ok_or(CodeError::TruncatedOperand {
        mnemonic: NAME,
        needed: width,
        available: bytes.len(),
    })?;
    read_raw(NAME, raw)
}

/// Reads a 2-byte big-endian operand (VM fast path).
///
/// # Panics
/// If `bytes` holds fewer than two bytes.
#[must_use]
pub fn read_u16(bytes: &[u8]) -> u16 {
    BigEndian::read_u16(bytes)
}

fn write_operand(def: &Definition, out: &mut [u8], value: Operand) -> CodeResult<()> {
    let width = out.len();
    check_width(def.name, width)?;
    let value = value as u64;
    if width < 8 && value >> (8 * width) != 0 {
        return Err(CodeError::OperandOverflow { mnemonic: def.name, value, width });
    }
    BigEndian::write_uint(out, value, width);
    Ok(())
}

fn read_raw(mnemonic: &'static str, raw: &[u8]) -> CodeResult<Operand> {
    let value = BigEndian::read_uint(raw, raw.len());
    Operand::try_from(value).map_err(|_| CodeError::OperandOverflow {
        mnemonic,
        value,
        width: raw.len(),
    })
}

// byteorder's uint helpers only cover 1..=8 bytes.
fn check_width(mnemonic: &'static str, width: usize) -> CodeResult<()> {
    if width == 0 || width > 8 {
        return Err(CodeError::UnsupportedWidth { mnemonic, width });
    }
    Ok(())
}
