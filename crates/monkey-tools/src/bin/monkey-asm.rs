// crates/monkey-tools/src/bin/monkey-asm.rs
//! Monkey assembler: text listing -> bytecode.
//!
//! Basic usage:
//!   monkey-asm prog.masm -o prog.mbc
//!   monkey-disasm prog.mbc | monkey-asm -          (prints hex)
//!
//! Useful flags:
//!   --check   : dry-run, writes nothing
//!   --disasm  : print the listing of the assembled bytes
//!   --time    : report assembly time

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use camino::Utf8PathBuf;
use clap::{ArgAction, Parser};

use monkey_tools::{
    assemble, disassemble_with, init_tracing, read_input, to_hex, validate, version_banner,
    write_bytes, DisasmOptions,
};

#[derive(Parser, Debug)]
#[command(name = "monkey-asm", version, about = "Monkey assembler (text -> bytecode)")]
struct Cli {
    /// Source listing, or '-' for stdin
    input: String,

    /// Output bytecode file; prints hex to stdout when absent
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Assemble and validate only
    #[arg(long, action = ArgAction::SetTrue)]
    check: bool,

    /// Print the listing of the assembled bytes
    #[arg(long, action = ArgAction::SetTrue)]
    disasm: bool,

    /// Display name when the input is '-'
    #[arg(long, default_value = "<stdin>")]
    stdin_name: String,

    /// Report assembly time
    #[arg(long, action = ArgAction::SetTrue)]
    time: bool,

    /// Debug logs (RUST_LOG takes precedence)
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
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
    tracing::debug!("{}", version_banner("monkey-asm"));

    let t0 = Instant::now();
    let (raw, name) = read_input(&cli.input, &cli.stdin_name)?;
    let src = String::from_utf8(raw).with_context(|| format!("{name}: source is not UTF-8"))?;

    let ins = assemble(&src).with_context(|| format!("assembly failed: {name}"))?;
    validate(ins.as_bytes()).with_context(|| format!("invalid program: {name}"))?;
    tracing::debug!(%name, len = ins.len(), "assembled");

    if cli.disasm {
        print!("{}", disassemble_with(ins.as_bytes(), DisasmOptions::default()));
    }

    if !cli.check {
        match &cli.out {
            Some(file) => {
                let out = Utf8PathBuf::from_path_buf(file.clone()).map_err(|_| anyhow!("--out path is not UTF-8"))?;
                write_bytes(&out, ins.as_bytes())?;
                eprintln!("{} bytes -> {out}", ins.len());
            }
            None if !cli.disasm => println!("{}", to_hex(ins.as_bytes())),
            None => {}
        }
    }

    if cli.time {
        eprintln!("{name}: {} µs", t0.elapsed().as_micros());
    }

    Ok(())
}
