//! codec.rs — hot paths of the instruction layer
//!
//! Run:
//!   cargo bench -p monkey-benches --bench codec
//!   cargo bench -p monkey-benches --bench codec -- --save-baseline main
//!
//! Synthetic streams only: constant loads, arithmetic and jumps in a fixed
//! rotation, sized in instructions.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use monkey_benches::{synthetic, SIZES};
use monkey_code::{decode_instructions, disassemble, encode, Opcode};
use monkey_object::{Hashable, Str};

fn bench_encode(c: &mut Criterion) {
    let mut g = c.benchmark_group("codec/encode");
    for op in [Opcode::Constant, Opcode::Add, Opcode::Jump] {
        let operands: Vec<usize> = op.definition().operand_widths.iter().map(|_| 65_534).collect();
        g.bench_with_input(BenchmarkId::from_parameter(op), &operands, |b, operands| {
            b.iter(|| encode(black_box(op), black_box(operands)));
        });
    }
    g.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut g = c.benchmark_group("codec/decode_stream");
    for &n in SIZES {
        let ins = synthetic(n);
        g.throughput(Throughput::Bytes(ins.len() as u64));
        g.bench_with_input(BenchmarkId::from_parameter(n), &ins, |b, ins| {
            b.iter(|| decode_instructions(black_box(ins.as_bytes())).filter(Result::is_ok).count());
        });
    }
    g.finish();
}

fn bench_disassemble(c: &mut Criterion) {
    let mut g = c.benchmark_group("disasm");
    for &n in SIZES {
        let ins = synthetic(n);
        g.throughput(Throughput::Bytes(ins.len() as u64));
        g.bench_with_input(BenchmarkId::from_parameter(n), &ins, |b, ins| {
            b.iter(|| disassemble(black_box(ins.as_bytes())));
        });
    }
    g.finish();
}

fn bench_hash_key(c: &mut Criterion) {
    let s = Str::new("the quick brown fox jumps over the lazy dog");
    c.bench_function("object/string_hash_key", |b| b.iter(|| black_box(&s).hash_key()));
}

criterion_group!(benches, bench_encode, bench_decode, bench_disassemble, bench_hash_key);
criterion_main!(benches);
