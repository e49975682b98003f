//! Shared inputs for the Monkey benchmarks.

use monkey_code::{Instructions, Opcode};

/// Stream sizes (in instructions) used by the suites.
pub const SIZES: &[usize] = &[64, 1024, 16 * 1024];

/// `n` instructions rotating through constant load, add, conditional jump and pop.
pub fn synthetic(n: usize) -> Instructions {
    let mut ins = Instructions::new();
    for i in 0..n {
        match i % 4 {
            0 => ins.emit(Opcode::Constant, &[i % 65_536]),
            1 => ins.emit(Opcode::Add, &[]),
            2 => ins.emit(Opcode::JumpNotTruthy, &[0]),
            _ => ins.emit(Opcode::Pop, &[]),
        };
    }
    ins
}
