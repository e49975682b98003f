//! Opcode byte values and their definitions.
//!
//! The registry is a `static` table indexed by opcode byte. It is built at
//! compile time and never mutated, so it can be shared across threads.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{CodeError, CodeResult};

/// Instruction kinds understood by the compiler and the VM.
///
/// Discriminants are the wire bytes; they are part of the binary contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Opcode {
    /// Push `constants[idx]` (operand: u16 constant index).
    Constant = 0,
    /// Pop two values, push their sum.
    Add = 1,
    /// Discard the top of the stack.
    Pop = 2,
    /// Pop two values, push `lhs - rhs`.
    Sub = 3,
    /// Pop two values, push their product.
    Mul = 4,
    /// Pop two values, push `lhs / rhs`.
    Div = 5,
    /// Push `true`.
    True = 6,
    /// Push `false`.
    False = 7,
    /// Pop two values, push `lhs == rhs`.
    Equal = 8,
    /// Pop two values, push `lhs != rhs`.
    NotEqual = 9,
    /// Pop two values, push `lhs > rhs`.
    GreaterThan = 10,
    /// Arithmetic negation of the top of the stack.
    Minus = 11,
    /// Logical negation of the top of the stack.
    Bang = 12,
    /// Pop; jump to the operand offset if the value is not truthy.
    JumpNotTruthy = 13,
    /// Jump to the operand offset.
    Jump = 14,
}

/// Name and operand layout of one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Definition {
    /// Mnemonic used by the disassembler and the assembler.
    pub name: &'static str,
    /// Byte width of each operand, in encoding order.
    pub operand_widths: &'static [usize],
}

impl Definition {
    const fn new(name: &'static str, operand_widths: &'static [usize]) -> Self {
        Self { name, operand_widths }
    }

    /// Number of operands.
    pub const fn operand_count(&self) -> usize {
        self.operand_widths.len()
    }

    /// Sum of all operand widths.
    pub fn operands_width(&self) -> usize {
        self.operand_widths.iter().sum()
    }

    /// Full encoded size: opcode byte plus operands.
    pub fn width(&self) -> usize {
        1 + self.operands_width()
    }
}

const U16: &[usize] = &[2];
const NONE: &[usize] = &[];

/// Indexed by opcode byte.
static DEFINITIONS: [Definition; Opcode::COUNT] = [
    Definition::new("OpConstant", U16),
    Definition::new("OpAdd", NONE),
    Definition::new("OpPop", NONE),
    Definition::new("OpSub", NONE),
    Definition::new("OpMul", NONE),
    Definition::new("OpDiv", NONE),
    Definition::new("OpTrue", NONE),
    Definition::new("OpFalse", NONE),
    Definition::new("OpEqual", NONE),
    Definition::new("OpNotEqual", NONE),
    Definition::new("OpGreaterThan", NONE),
    Definition::new("OpMinus", NONE),
    Definition::new("OpBang", NONE),
    Definition::new("OpJumpNotTruthy", U16),
    Definition::new("OpJump", U16),
];

impl Opcode {
    /// Number of opcodes in the instruction set.
    pub const COUNT: usize = 15;

    /// Every opcode, in byte order.
    pub const ALL: [Opcode; Opcode::COUNT] = [
        Opcode::Constant,
        Opcode::Add,
        Opcode::Pop,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::True,
        Opcode::False,
        Opcode::Equal,
        Opcode::NotEqual,
        Opcode::GreaterThan,
        Opcode::Minus,
        Opcode::Bang,
        Opcode::JumpNotTruthy,
        Opcode::Jump,
    ];

    /// Wire byte of the opcode.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Parses an opcode from its wire byte.
    #[must_use]
    pub const fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => Opcode::Constant,
            1 => Opcode::Add,
            2 => Opcode::Pop,
            3 => Opcode::Sub,
            4 => Opcode::Mul,
            5 => Opcode::Div,
            6 => Opcode::True,
            7 => Opcode::False,
            8 => Opcode::Equal,
            9 => Opcode::NotEqual,
            10 => Opcode::GreaterThan,
            11 => Opcode::Minus,
            12 => Opcode::Bang,
            13 => Opcode::JumpNotTruthy,
            14 => Opcode::Jump,
            _ => return None,
        })
    }

    /// Finds an opcode by mnemonic (case-insensitive, e.g. `OpConstant`).
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }

    /// Registry entry for this opcode.
    #[must_use]
    pub fn definition(self) -> &'static Definition {
        &DEFINITIONS[self as usize]
    }

    /// Mnemonic, e.g. `OpJump`.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        self.definition().name
    }

    /// Encoded size of the instruction.
    #[must_use]
    pub fn width(self) -> usize {
        self.definition().width()
    }

    /// True for instructions whose operand is a jump target offset.
    #[must_use]
    pub const fn is_jump(self) -> bool {
        matches!(self, Opcode::Jump | Opcode::JumpNotTruthy)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl TryFrom<u8> for Opcode {
    type Error = CodeError;

    fn try_from(b: u8) -> CodeResult<Self> {
        Opcode::from_byte(b).ok_or(CodeError::UnknownOpcode { opcode: b })
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> Self {
        op.byte()
    }
}

/// Looks up the definition of a raw opcode byte.
///
/// # Errors
/// `CodeError::UnknownOpcode` when the byte is not part of the instruction set.
pub fn lookup(op: u8) -> CodeResult<&'static Definition> {
    Opcode::try_from(op).map(Opcode::definition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_values_are_stable() {
        assert_eq!(Opcode::Constant as u8, 0);
        assert_eq!(Opcode::Pop as u8, 2);
        assert_eq!(Opcode::GreaterThan as u8, 10);
        assert_eq!(Opcode::JumpNotTruthy as u8, 13);
        assert_eq!(Opcode::Jump as u8, 14);
    }

    #[test]
    fn all_is_in_byte_order_and_matches_from_byte() {
        for (ix, op) in Opcode::ALL.into_iter().enumerate() {
            assert_eq!(op.byte() as usize, ix);
            assert_eq!(Opcode::from_byte(op.byte()), Some(op));
        }
        assert_eq!(Opcode::from_byte(Opcode::COUNT as u8), None);
        assert_eq!(Opcode::from_byte(u8::MAX), None);
    }

    #[test]
    fn registry_entries_match_mnemonics() {
        assert_eq!(Opcode::Constant.definition().name, "OpConstant");
        assert_eq!(Opcode::Bang.definition().name, "OpBang");
        assert_eq!(Opcode::JumpNotTruthy.definition().name, "OpJumpNotTruthy");
        for op in Opcode::ALL {
            assert_eq!(op.mnemonic(), format!("Op{op:?}"));
        }
    }

    #[test]
    fn operand_layouts() {
        for op in [Opcode::Constant, Opcode::Jump, Opcode::JumpNotTruthy] {
            assert_eq!(op.definition().operand_widths, &[2]);
            assert_eq!(op.width(), 3);
        }
        for op in Opcode::ALL.into_iter().filter(|op| op.definition().operand_count() == 0) {
            assert_eq!(op.width(), 1);
        }
        // the codec reads operands as at most a u64
        for op in Opcode::ALL {
            assert!(op.definition().operand_widths.iter().all(|w| (1..=8).contains(w)));
        }
    }

    #[test]
    fn lookup_unknown_byte_fails() {
        assert_eq!(lookup(200), Err(CodeError::UnknownOpcode { opcode: 200 }));
        assert_eq!(lookup(0).map(|d| d.name), Ok("OpConstant"));
    }

    #[test]
    fn mnemonic_parsing_is_case_insensitive() {
        assert_eq!(Opcode::from_mnemonic("OpJump"), Some(Opcode::Jump));
        assert_eq!(Opcode::from_mnemonic("opgreaterthan"), Some(Opcode::GreaterThan));
        assert_eq!(Opcode::from_mnemonic("OpNope"), None);
    }

    #[test]
    fn jumps_are_classified() {
        assert!(Opcode::Jump.is_jump());
        assert!(Opcode::JumpNotTruthy.is_jump());
        assert!(!Opcode::Constant.is_jump());
    }
}
