//! Bytecode building blocks.
//!
//! `opcode` is the leaf (registry); `codec` turns opcodes and operands into
//! bytes and back; everything else walks byte streams through those two.

/// Opcode enumeration and the static definition registry.
pub mod opcode;
/// Big-endian operand encoding/decoding.
pub mod codec;
/// Instruction buffer and decoding iterator.
pub mod instructions;
pub mod disasm;
pub mod asm;
pub mod helpers;

pub use codec::{decode_operands, encode, make, read_operand, read_u16, Operand, Operands};
pub use instructions::{DecodedInstruction, InstructionIter, Instructions};
pub use opcode::{lookup, Definition, Opcode};
