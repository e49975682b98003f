//! Minimal assembler: the inverse of [`disassemble`](crate::disassemble).
//!
//! Accepted syntax, one instruction per line:
//!
//! ```text
//! ; comments start with a semicolon
//! 0000 OpConstant 1      ; a leading offset column is ignored
//! OpConstant 2
//! opadd                  ; mnemonics are case-insensitive
//! ```

use crate::bytecode::{
    codec::Operands,
    instructions::Instructions,
    opcode::Opcode,
};
use crate::{CodeError, CodeResult};

/// Assembles `source` into an instruction buffer.
///
/// # Errors
/// `Syntax` with the 1-based line for unknown mnemonics, malformed
/// operands, or operands the codec rejects (arity, overflow).
pub fn assemble(source: &str) -> CodeResult<Instructions> {
    let mut ins = Instructions::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.split_once(';').map_or(raw_line, |(code, _)| code).trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace().peekable();
        if tokens.peek().is_some_and(|t| t.bytes().all(|b| b.is_ascii_digit())) {
            tokens.next();
        }

        let mnemonic = tokens
            .next()
            .ok_or_else(|| fail(CodeError::syntax(line_no, "missing mnemonic")))?;
        let op = Opcode::from_mnemonic(mnemonic)
            .ok_or_else(|| fail(CodeError::syntax(line_no, format!("unknown mnemonic `{mnemonic}`"))))?;

        let operands = tokens
            .map(|tok| {
                tok.parse::<usize>()
                    .map_err(|_| fail(CodeError::syntax(line_no, format!("invalid operand `{tok}`"))))
            })
            .collect::<CodeResult<Operands>>()?;

        ins.push(op, &operands)
            .map_err(|err| fail(CodeError::syntax(line_no, err.to_string())))?;
    }

    Ok(ins)
}

fn fail(err: CodeError) -> CodeError {
    #[cfg(feature = "tracing")]
    tracing::debug!(%err, "assembly failed");
    err
}
