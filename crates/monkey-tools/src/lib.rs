//! monkey-tools — shared helpers for the Monkey bytecode CLIs.
//!
//! - I/O    : `read_input` (file or `-` for stdin), `write_text`, `write_bytes`
//! - Hex    : `parse_hex`, `to_hex` (for pasting bytecode in and out of terminals)
//! - Logs   : `init_tracing` (feature `tracing`, honours `RUST_LOG`)
//!
//! Everything returns `anyhow::Result`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_must_use)]
#![cfg_attr(not(debug_assertions), warn(missing_docs))]

use std::fs;
use std::io::{self, Read, Write};

use anyhow::{anyhow, bail, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

pub use monkey_code::{
    assemble, decode_instructions, disassemble_with, validate, DecodedInstruction, DisasmOptions,
    UnknownOpcodePolicy,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version banner for logs.
pub fn version_banner(tool: &str) -> String {
    format!("{tool} — monkey-tools {VERSION}")
}

/* ------------------------------------------------------------------------- */
/* I/O utils                                                                 */
/* ------------------------------------------------------------------------- */

/// Reads a file, or stdin when `arg` is `-`. Returns the bytes and a display name.
pub fn read_input(arg: &str, stdin_name: &str) -> Result<(Vec<u8>, Utf8PathBuf)> {
    if arg == "-" {
        let mut v = Vec::new();
        io::stdin().read_to_end(&mut v).context("reading stdin")?;
        Ok((v, Utf8PathBuf::from(stdin_name)))
    } else {
        let p = Utf8PathBuf::from(arg);
        let v = fs::read(&p).with_context(|| format!("reading {p}"))?;
        Ok((v, p))
    }
}

/// Writes UTF-8 text, creating parent directories.
pub fn write_text(path: &Utf8Path, s: &str) -> Result<()> {
    write_bytes(path, s.as_bytes())
}

/// Writes raw bytes, creating parent directories.
pub fn write_bytes(path: &Utf8Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {parent}"))?;
    }
    let mut f = fs::File::create(path).with_context(|| format!("creating {path}"))?;
    f.write_all(bytes).with_context(|| format!("writing {path}"))?;
    Ok(())
}

/* ------------------------------------------------------------------------- */
/* Hex                                                                       */
/* ------------------------------------------------------------------------- */

/// Parses hex text such as `00 ff fe`, `0x00,0xff` or `00fffe`.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for token in text.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            bail!("invalid hex in `{token}`");
        }
        if digits.len() % 2 != 0 {
            bail!("odd number of hex digits in `{token}`");
        }
        for pair in digits.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(pair).map_err(|_| anyhow!("invalid hex in `{token}`"))?;
            let byte = u8::from_str_radix(pair, 16).with_context(|| format!("invalid hex in `{token}`"))?;
            out.push(byte);
        }
    }
    Ok(out)
}

/// Formats bytes as space-separated lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ")
}

/* ------------------------------------------------------------------------- */
/* Logs                                                                      */
/* ------------------------------------------------------------------------- */

/// Installs a stderr `tracing` subscriber. `RUST_LOG` wins over `verbose`.
#[cfg(feature = "tracing")]
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// No-op without the `tracing` feature.
#[cfg(not(feature = "tracing"))]
pub fn init_tracing(verbose: bool) {
    let _ = verbose;
}
