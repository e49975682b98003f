// crates/monkey-tools/src/bin/monkey-disasm.rs
//! Monkey bytecode disassembler.
//!
//! Examples:
//!   monkey-disasm main.mbc
//!   echo "00 00 01 00 00 02 01 02" | monkey-disasm - --hex
//!   monkey-disasm main.mbc --json | jq
//!
//! Useful options:
//!   --hex              : inputs are hex text instead of raw bytes
//!   --json             : print decoded instructions as JSON
//!   --validate         : fail if the stream is structurally invalid
//!   --halt-on-unknown  : stop the listing at the first unknown opcode
//!   --emit <f>         : write the listing to a file (single input)
//!   --time             : report processing time

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use serde::Serialize;

use monkey_tools::{
    decode_instructions, disassemble_with, init_tracing, parse_hex, read_input, validate,
    version_banner, write_text, DecodedInstruction, DisasmOptions, UnknownOpcodePolicy,
};

#[derive(Parser, Debug)]
#[command(name = "monkey-disasm", version, about = "Monkey bytecode disassembler (bytes -> text/JSON)")]
struct Cli {
    /// Bytecode file(s), or '-' for stdin (single)
    inputs: Vec<String>,

    /// Inputs are hex text (e.g. `00 ff fe`)
    #[arg(long)]
    hex: bool,

    /// Print decoded instructions as JSON
    #[arg(long)]
    json: bool,

    /// Fail on unknown opcodes, truncated operands and bad jump targets
    #[arg(long)]
    validate: bool,

    /// Stop the listing at the first unknown opcode instead of skipping it
    #[arg(long)]
    halt_on_unknown: bool,

    /// Write the listing to this file (single input)
    #[arg(long)]
    emit: Option<PathBuf>,

    /// Display name when the input is '-'
    #[arg(long, default_value = "<stdin>")]
    stdin_name: String,

    /// Report processing time
    #[arg(long)]
    time: bool,

    /// Debug logs (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct ListingJson<'a> {
    file: &'a str,
    len: usize,
    instructions: Vec<DecodedInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<()> {
    color_eyre::install().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("{}", version_banner("monkey-disasm"));

    if cli.inputs.is_empty() {
        return Err(anyhow!("no input. Example: monkey-disasm main.mbc"));
    }
    if cli.inputs.len() > 1 && cli.emit.is_some() {
        return Err(anyhow!("--emit needs a single input"));
    }
    if cli.inputs.len() > 1 && cli.inputs.iter().any(|i| i == "-") {
        return Err(anyhow!("'-' (stdin) cannot be combined with other inputs"));
    }

    for inp in &cli.inputs {
        let (raw, name) = read_input(inp, &cli.stdin_name)?;
        let bytes = if cli.hex {
            let text = String::from_utf8(raw).with_context(|| format!("{name}: hex input is not UTF-8"))?;
            parse_hex(&text).with_context(|| format!("{name}: bad hex input"))?
        } else {
            raw
        };
        process_one(&bytes, &name, &cli)?;
    }

    Ok(())
}

fn process_one(bytes: &[u8], name: &Utf8Path, cli: &Cli) -> Result<()> {
    let t0 = Instant::now();

    if cli.validate {
        validate(bytes).with_context(|| format!("validation failed: {name}"))?;
        tracing::debug!(%name, len = bytes.len(), "stream is structurally valid");
    }

    if cli.json {
        let mut listing = ListingJson { file: name.as_str(), len: bytes.len(), instructions: Vec::new(), error: None };
        for instr in decode_instructions(bytes) {
            match instr {
                Ok(instr) => listing.instructions.push(instr),
                Err(err) => listing.error = Some(err.to_string()),
            }
        }
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        let opts = DisasmOptions {
            unknown_opcode: if cli.halt_on_unknown { UnknownOpcodePolicy::Halt } else { UnknownOpcodePolicy::Skip },
        };
        let txt = disassemble_with(bytes, opts);
        if let Some(file) = &cli.emit {
            let out = Utf8PathBuf::from_path_buf(file.clone()).map_err(|_| anyhow!("--emit path is not UTF-8"))?;
            write_text(&out, &txt)?;
            eprintln!("listing -> {out}");
        } else {
            if cli.inputs.len() > 1 {
                println!("== {name} ==");
            }
            print!("{txt}");
        }
    }

    if cli.time {
        eprintln!("{name}: {} µs", t0.elapsed().as_micros());
    }

    Ok(())
}
