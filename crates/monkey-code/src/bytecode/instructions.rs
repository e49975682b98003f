//! Growable instruction buffer and a decoding iterator over raw streams.

use core::{fmt, iter::FusedIterator};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::bytecode::{
    codec::{decode_operands, encode, Operand, Operands},
    disasm::disassemble,
    opcode::Opcode,
};
use crate::{CodeError, CodeResult};

/// Body of a compiled function: concatenated instructions, nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Instructions {
    bytes: Vec<u8>,
}

impl Instructions {
    /// Create an empty buffer.
    pub fn new() -> Self { Self { bytes: Vec::new() } }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    /// Consume into the raw bytes.
    pub fn into_vec(self) -> Vec<u8> { self.bytes }

    /// Length in bytes.
    pub fn len(&self) -> usize { self.bytes.len() }

    /// True when nothing has been emitted.
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Encodes and appends one instruction, returning its position.
    ///
    /// # Errors
    /// See [`encode`].
    pub fn push(&mut self, op: Opcode, operands: &[Operand]) -> CodeResult<usize> {
        let instruction = encode(op, operands)?;
        let position = self.bytes.len();
        self.bytes.extend_from_slice(&instruction);
        Ok(position)
    }

    /// Panicking variant of [`Instructions::push`] for code generators.
    ///
    /// # Panics
    /// If the operands do not match the opcode definition.
    pub fn emit(&mut self, op: Opcode, operands: &[Operand]) -> usize {
        match self.push(op, operands) {
            Ok(position) => position,
            Err(err) => panic!("cannot emit {op}: {err}"),
        }
    }

    /// Appends another buffer.
    pub fn extend_from(&mut self, other: &Instructions) {
        self.bytes.extend_from_slice(&other.bytes);
    }

    /// Drops everything from `position` on (e.g. a trailing `OpPop`).
    pub fn truncate(&mut self, position: usize) {
        self.bytes.truncate(position);
    }

    /// Rewrites the operand of the single-operand instruction at `position`.
    ///
    /// Used to back-patch jump targets once they are known.
    ///
    /// # Errors
    /// - `NotPatchable` if no single-operand instruction starts at `position`.
    /// - `OperandOverflow` if `operand` does not fit.
    pub fn patch_operand(&mut self, position: usize, operand: Operand) -> CodeResult<()> {
        let not_patchable = CodeError::NotPatchable { position };
        let op = self
            .bytes
            .get(position)
            .and_then(|&b| Opcode::from_byte(b))
            .ok_or_else(|| not_patchable.clone())?;
        if op.definition().operand_count() != 1 {
            return Err(not_patchable);
        }
        let instruction = encode(op, &[operand])?;
        let target = self
            .bytes
            .get_mut(position..position + instruction.len())
            .ok_or(not_patchable)?;
        target.copy_from_slice(&instruction);
        Ok(())
    }

    /// Iterates over decoded instructions.
    pub fn iter(&self) -> InstructionIter<'_> { decode_instructions(&self.bytes) }
}

impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&disassemble(&self.bytes))
    }
}

impl AsRef<[u8]> for Instructions {
    fn as_ref(&self) -> &[u8] { &self.bytes }
}

impl From<Vec<u8>> for Instructions {
    fn from(bytes: Vec<u8>) -> Self { Self { bytes } }
}

impl From<Instructions> for Vec<u8> {
    fn from(ins: Instructions) -> Self { ins.bytes }
}

impl FromIterator<Vec<u8>> for Instructions {
    fn from_iter<I: IntoIterator<Item = Vec<u8>>>(iter: I) -> Self {
        Self { bytes: iter.into_iter().flatten().collect() }
    }
}

impl<'a> IntoIterator for &'a Instructions {
    type Item = CodeResult<DecodedInstruction>;
    type IntoIter = InstructionIter<'a>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

/// One instruction decoded from a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DecodedInstruction {
    /// Byte offset of the opcode.
    pub offset: usize,
    /// Instruction kind.
    pub opcode: Opcode,
    /// Operands in declaration order.
    pub operands: Operands,
    /// Bytes taken by the whole instruction.
    pub width: usize,
}

impl DecodedInstruction {
    /// Offset of the next instruction.
    pub fn next_offset(&self) -> usize { self.offset + self.width }
}

/// Walks a byte stream instruction by instruction.
///
/// Yields at most one error, then stops.
#[derive(Debug, Clone)]
pub struct InstructionIter<'a> {
    bytes: &'a [u8],
    offset: usize,
    done: bool,
}

/// Iterates over the instructions of a raw stream.
pub fn decode_instructions(bytes: &[u8]) -> InstructionIter<'_> {
    InstructionIter { bytes, offset: 0, done: false }
}

impl InstructionIter<'_> {
    /// Offset of the next instruction to decode.
    pub fn offset(&self) -> usize { self.offset }

    fn fail(&mut self, err: CodeError) -> Option<CodeResult<DecodedInstruction>> {
        #[cfg(feature = "tracing")]
        tracing::debug!(offset = self.offset, %err, "instruction decoding stopped");
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for InstructionIter<'_> {
    type Item = CodeResult<DecodedInstruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.bytes.len() {
            return None;
        }
        let opcode = match Opcode::try_from(self.bytes[self.offset]) {
            Ok(op) => op,
            Err(err) => return self.fail(err),
        };
        match decode_operands(opcode.definition(), &self.bytes[self.offset + 1..]) {
            Ok((operands, read)) => {
                let instr = DecodedInstruction { offset: self.offset, opcode, operands, width: 1 + read };
                self.offset += instr.width;
                Some(Ok(instr))
            }
            Err(err) => self.fail(err),
        }
    }
}

impl FusedIterator for InstructionIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::codec::make;
    use pretty_assertions::assert_eq;

    #[test]
    fn push_returns_positions() -> CodeResult<()> {
        let mut ins = Instructions::new();
        assert_eq!(ins.push(Opcode::Constant, &[1])?, 0);
        assert_eq!(ins.push(Opcode::Add, &[])?, 3);
        assert_eq!(ins.push(Opcode::Jump, &[0])?, 4);
        assert_eq!(ins.len(), 7);
        Ok(())
    }

    #[test]
    fn collects_from_made_instructions() {
        let ins: Instructions = [make(Opcode::True, &[]), make(Opcode::Bang, &[])].into_iter().collect();
        assert_eq!(ins.as_bytes(), &[6, 12]);
    }

    #[test]
    fn back_patches_jump_targets() -> CodeResult<()> {
        let mut ins = Instructions::new();
        ins.push(Opcode::True, &[])?;
        let jump = ins.push(Opcode::JumpNotTruthy, &[9999])?;
        ins.push(Opcode::Constant, &[0])?;
        let after = ins.len();
        ins.patch_operand(jump, after)?;
        assert_eq!(ins.as_bytes(), &[6, 13, 0, 7, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn patching_needs_a_single_operand_instruction() -> CodeResult<()> {
        let mut ins = Instructions::new();
        ins.push(Opcode::Pop, &[])?;
        assert_eq!(ins.patch_operand(0, 1), Err(CodeError::NotPatchable { position: 0 }));
        assert_eq!(ins.patch_operand(10, 1), Err(CodeError::NotPatchable { position: 10 }));
        Ok(())
    }

    #[test]
    fn patching_a_truncated_tail_fails() {
        let mut ins = Instructions::from(vec![Opcode::Jump.byte(), 0]);
        assert_eq!(ins.patch_operand(0, 1), Err(CodeError::NotPatchable { position: 0 }));
    }

    #[test]
    fn iterates_decoded_instructions() -> CodeResult<()> {
        let mut ins = Instructions::new();
        ins.push(Opcode::Constant, &[65535])?;
        ins.push(Opcode::Minus, &[])?;
        let decoded = ins.iter().collect::<CodeResult<Vec<_>>>()?;
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].operands.as_slice(), &[65535]);
        assert_eq!(decoded[0].next_offset(), 3);
        assert_eq!(decoded[1].opcode, Opcode::Minus);
        assert_eq!(decoded[1].offset, 3);
        assert!(decoded[1].operands.is_empty());
        Ok(())
    }

    #[test]
    fn iterator_stops_after_first_error() {
        let stream = [Opcode::Add.byte(), 0xEE, Opcode::Add.byte()];
        let mut it = decode_instructions(&stream);
        assert!(matches!(it.next(), Some(Ok(DecodedInstruction { opcode: Opcode::Add, .. }))));
        assert_eq!(it.next(), Some(Err(CodeError::UnknownOpcode { opcode: 0xEE })));
        assert_eq!(it.next(), None);
        assert_eq!(it.offset(), 1);
    }

    #[test]
    fn display_is_the_disassembly() {
        let ins = Instructions::from(make(Opcode::Constant, &[2]));
        assert_eq!(ins.to_string(), "0000 OpConstant 2\n");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn decoded_instruction_serializes() -> CodeResult<()> {
        let ins = Instructions::from(make(Opcode::Jump, &[3]));
        let first = ins.iter().next().expect("one instruction")?;
        let json = serde_json::to_string(&first).expect("serializable");
        assert_eq!(json, r#"{"offset":0,"opcode":"Jump","operands":[3],"width":3}"#);
        Ok(())
    }
}
